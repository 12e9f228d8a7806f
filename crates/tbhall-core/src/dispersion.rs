//! Tight-binding dispersion and its momentum derivatives.
//!
//! ```text
//! E0(kx, ky) = -2t (cos kx + cos ky)
//!              - 2t' (cos(kx + ky) + cos(kx - ky))
//!              - 2t'' (cos 2kx + cos 2ky)
//! E(kx, ky; μ) = E0(kx, ky) - μ
//! ```
//!
//! The point functions are pure and propagate NaN/inf inputs unchanged. The
//! grid functions evaluate them over a [`MomentumGrid`].

use log::debug;
use ndarray::{Array2, Zip};
use std::time::Instant;
use tbhall_compute::ComputeBackend;

use crate::error::ModelError;
use crate::types::{BandEnergy, DispersionDerivatives, HoppingParameters, MomentumGrid};

/// Momentum derivatives of `E` at a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointDerivatives {
    pub dx: f64,
    pub dxx: f64,
    pub dy: f64,
    pub dyy: f64,
    pub dxy: f64,
}

/// Bare band energy `E0` at one momentum (μ = 0).
pub fn bare_energy_at(h: &HoppingParameters, kx: f64, ky: f64) -> f64 {
    -2.0 * h.t * (kx.cos() + ky.cos())
        - 2.0 * h.t_prime * ((kx + ky).cos() + (kx - ky).cos())
        - 2.0 * h.t_double_prime * ((2.0 * kx).cos() + (2.0 * ky).cos())
}

/// Band energy `E0 - μ` at one momentum.
pub fn band_energy_at(h: &HoppingParameters, kx: f64, ky: f64, mu: f64) -> f64 {
    bare_energy_at(h, kx, ky) - mu
}

/// Closed-form first and second derivatives of `E` at one momentum.
pub fn derivatives_at(h: &HoppingParameters, kx: f64, ky: f64) -> PointDerivatives {
    let (t, tp, tpp) = (h.t, h.t_prime, h.t_double_prime);
    let (sum, diff) = (kx + ky, kx - ky);

    PointDerivatives {
        dx: 2.0 * (t * kx.sin() + tp * (diff.sin() + sum.sin()) + 2.0 * tpp * (2.0 * kx).sin()),
        dxx: 2.0 * (t * kx.cos() + tp * (diff.cos() + sum.cos()) + 4.0 * tpp * (2.0 * kx).cos()),
        dy: 2.0 * (t * ky.sin() + tp * (sum.sin() - diff.sin()) + 2.0 * tpp * (2.0 * ky).sin()),
        dyy: 2.0 * (t * ky.cos() + tp * (sum.cos() + diff.cos()) + 4.0 * tpp * (2.0 * ky).cos()),
        dxy: 2.0 * tp * (sum.cos() - diff.cos()),
    }
}

/// `E0` over the whole grid.
pub fn bare_energy(h: &HoppingParameters, grid: &MomentumGrid) -> Array2<f64> {
    Zip::from(grid.kx())
        .and(grid.ky())
        .map_collect(|&kx, &ky| bare_energy_at(h, kx, ky))
}

/// Band energy for every μ, shape `(mus.len(), R, R)`.
///
/// `E0` is evaluated once; each μ-slice is a shifted copy filled by the
/// backend.
pub fn band_energy(
    backend: &dyn ComputeBackend,
    h: &HoppingParameters,
    grid: &MomentumGrid,
    mus: &[f64],
) -> Result<BandEnergy, ModelError> {
    let start = Instant::now();
    let e0 = bare_energy(h, grid);
    let (rows, cols) = e0.dim();

    let fill = |s: usize, r: usize, c: usize| e0[[r, c]] - mus[s];
    let values = backend.parallel_slice_fill(mus.len(), rows, cols, &fill)?;

    debug!(
        "band energy: {} slices of {}x{} in {:.1?}",
        mus.len(),
        rows,
        cols,
        start.elapsed()
    );
    Ok(BandEnergy::new(values))
}

/// All five derivative arrays over the grid.
pub fn derivatives(h: &HoppingParameters, grid: &MomentumGrid) -> DispersionDerivatives {
    let start = Instant::now();
    let points = Zip::from(grid.kx())
        .and(grid.ky())
        .map_collect(|&kx, &ky| derivatives_at(h, kx, ky));

    let out = DispersionDerivatives {
        dx: points.mapv(|d| d.dx),
        dxx: points.mapv(|d| d.dxx),
        dy: points.mapv(|d| d.dy),
        dyy: points.mapv(|d| d.dyy),
        dxy: points.mapv(|d| d.dxy),
    };
    debug!("derivatives: {:?} grid in {:.1?}", grid.dim(), start.elapsed());
    out
}
