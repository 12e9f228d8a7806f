//! Spectral weight: Lorentzian broadening of the band energy, the diamond
//! Fermi-arc masks, and stacking of externally supplied arrays.

use std::f64::consts::PI;
use std::time::Instant;

use log::debug;
use ndarray::{Array3, Axis, Zip};
use num_complex::Complex64;
use tbhall_arcs::ReferenceArcs;
use tbhall_compute::ComputeBackend;

use crate::error::ModelError;
use crate::types::{BandEnergy, FermiArcMasks, MomentumGrid, SpectralWeight};

/// `A = -(1/π) · Im[1 / (ω + iη - E)]`.
///
/// Strictly positive for `η > 0`. With `η = 0` the value is zero off
/// resonance and `NaN` where `E = ω`.
pub fn lorentzian_weight(omega: f64, eta: f64, energy: f64) -> f64 {
    let g = Complex64::new(omega - energy, eta).inv();
    -g.im / PI
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Diamond masks on `grid`.
///
/// The outline marks points where `|kx| + |ky|` equals π to two decimals.
/// With `filter` set the filter keeps everything on or inside the diamond;
/// otherwise it is all ones.
pub fn fermi_arc_masks(grid: &MomentumGrid, filter: bool) -> FermiArcMasks {
    let edge = round2(PI);
    let taxicab = Zip::from(grid.kx())
        .and(grid.ky())
        .map_collect(|&kx, &ky| round2(kx.abs() + ky.abs()));

    let filter = if filter {
        taxicab.mapv(|d| if d <= edge { 1.0 } else { 0.0 })
    } else {
        taxicab.mapv(|_| 1.0)
    };
    let outline = taxicab.mapv(|d| if d == edge { 1.0 } else { 0.0 });

    FermiArcMasks { filter, outline }
}

/// Broadened spectral weight for every slice of `energies`, multiplied by
/// `masks.filter`.
pub fn spectral_weight(
    backend: &dyn ComputeBackend,
    energies: &BandEnergy,
    masks: &FermiArcMasks,
    omega: f64,
    eta: f64,
) -> Result<SpectralWeight, ModelError> {
    let dim = energies.slice_dim();
    if masks.filter.dim() != dim {
        return Err(ModelError::ShapeMismatch {
            expected: masks.filter.dim(),
            found: dim,
        });
    }

    let start = Instant::now();
    let e = energies.as_array();
    let filter = &masks.filter;
    let fill = |s: usize, r: usize, c: usize| {
        lorentzian_weight(omega, eta, e[[s, r, c]]) * filter[[r, c]]
    };
    let values = backend.parallel_slice_fill(energies.len(), dim.0, dim.1, &fill)?;

    debug!(
        "spectral weight: {} slices, omega {omega}, eta {eta} in {:.1?}",
        energies.len(),
        start.elapsed()
    );
    Ok(SpectralWeight::new(values))
}

/// Stack reference arrays in label order.
///
/// Every array must sit on a `resolution × resolution` grid.
pub fn from_reference(
    arcs: &ReferenceArcs,
    resolution: usize,
) -> Result<SpectralWeight, ModelError> {
    arcs.ensure_grid(resolution)?;
    let mut values = Array3::zeros((arcs.len(), resolution, resolution));
    for (mut slice, (_, array)) in values.axis_iter_mut(Axis(0)).zip(arcs) {
        slice.assign(array);
    }
    Ok(SpectralWeight::new(values))
}
