//! Transport coefficients from spectral weight and band velocities.
//!
//! Per chemical potential, with `A` the spectral weight:
//!
//! | Quantity | Expression |
//! |----------|------------|
//! | σxx | `2e²π Σ (∂E/∂kx)² A²` |
//! | σyy | `2e²π Σ (∂E/∂ky)² A²` |
//! | σxy | `2(-e)³ (π²/3) Σ (c1 + c2 + c3) A³` |
//! | density | `norm Σ f(E)` |
//! | n_H | `norm σxx σyy / (e σxy)` |
//!
//! where `c1 = -2 ∂xE ∂yE ∂xyE`, `c2 = (∂xE)² ∂yyE`, `c3 = (∂yE)² ∂xxE`,
//! `f(E) = 2 / (1 + exp(βE))` and `norm = 1/R²`.
//!
//! Each slice is reduced independently, so every backend returns the same
//! sums.

use std::f64::consts::PI;
use std::time::Instant;

use log::{debug, warn};
use ndarray::{Array1, Array2, Zip};
use tbhall_compute::ComputeBackend;

use crate::error::ModelError;
use crate::types::{
    BandEnergy, DispersionDerivatives, SpectralWeight, TransportCoefficients, BETA,
    ELEMENTARY_CHARGE,
};

/// Reject weights or derivative arrays that are not all on the same grid.
///
/// The grid is taken from `derivatives.dx`; the other four derivative arrays
/// and every weight slice must match it.
pub fn check_shapes(
    weights: &SpectralWeight,
    derivatives: &DispersionDerivatives,
) -> Result<(), ModelError> {
    let expected = derivatives.dim();
    let d = derivatives;
    let shapes = [
        d.dxx.dim(),
        d.dy.dim(),
        d.dyy.dim(),
        d.dxy.dim(),
        weights.slice_dim(),
    ];
    if let Some(&found) = shapes.iter().find(|&&s| s != expected) {
        return Err(ModelError::ShapeMismatch { expected, found });
    }
    Ok(())
}

fn sigma_longitudinal(
    backend: &dyn ComputeBackend,
    weights: &SpectralWeight,
    velocity: &Array2<f64>,
) -> Array1<f64> {
    let prefactor = 2.0 * ELEMENTARY_CHARGE * ELEMENTARY_CHARGE * PI;
    let reduce = |s: usize| {
        let sum = Zip::from(velocity)
            .and(weights.slice(s))
            .fold(0.0, |acc, &v, &a| acc + v * v * a * a);
        prefactor * sum
    };
    Array1::from(backend.parallel_reduce(weights.len(), &reduce))
}

/// Longitudinal conductivity along x for each slice.
pub fn sigma_xx(
    backend: &dyn ComputeBackend,
    weights: &SpectralWeight,
    derivatives: &DispersionDerivatives,
) -> Result<Array1<f64>, ModelError> {
    check_shapes(weights, derivatives)?;
    Ok(sigma_longitudinal(backend, weights, &derivatives.dx))
}

/// Longitudinal conductivity along y for each slice.
pub fn sigma_yy(
    backend: &dyn ComputeBackend,
    weights: &SpectralWeight,
    derivatives: &DispersionDerivatives,
) -> Result<Array1<f64>, ModelError> {
    check_shapes(weights, derivatives)?;
    Ok(sigma_longitudinal(backend, weights, &derivatives.dy))
}

/// Hall conductivity for each slice.
pub fn sigma_xy(
    backend: &dyn ComputeBackend,
    weights: &SpectralWeight,
    derivatives: &DispersionDerivatives,
) -> Result<Array1<f64>, ModelError> {
    check_shapes(weights, derivatives)?;

    let d = derivatives;
    let curvature = Zip::from(&d.dx)
        .and(&d.dy)
        .and(&d.dxx)
        .and(&d.dyy)
        .and(&d.dxy)
        .map_collect(|&dx, &dy, &dxx, &dyy, &dxy| {
            -2.0 * dx * dy * dxy + dx * dx * dyy + dy * dy * dxx
        });

    let prefactor = 2.0 * (-ELEMENTARY_CHARGE).powi(3) * PI * PI / 3.0;
    let reduce = |s: usize| {
        let sum = Zip::from(&curvature)
            .and(weights.slice(s))
            .fold(0.0, |acc, &c, &a| acc + c * a * a * a);
        prefactor * sum
    };
    Ok(Array1::from(backend.parallel_reduce(weights.len(), &reduce)))
}

/// Spin-degenerate occupation `2 / (1 + exp(βE))`.
///
/// Evaluated through whichever logistic form keeps the exponent
/// non-positive, so it never overflows for any finite `E`.
pub fn occupation(energy: f64) -> f64 {
    let x = BETA * energy;
    if x > 0.0 {
        let z = (-x).exp();
        2.0 * z / (1.0 + z)
    } else {
        2.0 / (1.0 + x.exp())
    }
}

/// Electrons per site for each energy slice.
pub fn density(backend: &dyn ComputeBackend, energies: &BandEnergy, norm: f64) -> Array1<f64> {
    let reduce = |s: usize| {
        let sum = energies.slice(s).fold(0.0, |acc, &e| acc + occupation(e));
        norm * sum
    };
    Array1::from(backend.parallel_reduce(energies.len(), &reduce))
}

/// `norm · σxx · σyy / (e · σxy)`.
///
/// Not guarded: `σxy = 0` gives `±inf`, and all-zero conductivities give
/// `NaN`.
pub fn hall_number(norm: f64, sigma_xx: f64, sigma_yy: f64, sigma_xy: f64) -> f64 {
    norm * sigma_xx * sigma_yy / (ELEMENTARY_CHARGE * sigma_xy)
}

/// Every transport coefficient for every slice.
///
/// `energies` feeds the density; `weights` feeds the conductivities. Both
/// must hold the same number of slices.
pub fn transport(
    backend: &dyn ComputeBackend,
    energies: &BandEnergy,
    weights: &SpectralWeight,
    derivatives: &DispersionDerivatives,
    norm: f64,
) -> Result<Vec<TransportCoefficients>, ModelError> {
    if energies.len() != weights.len() {
        return Err(ModelError::SliceCountMismatch {
            energies: energies.len(),
            weights: weights.len(),
        });
    }

    let start = Instant::now();
    let sxx = sigma_xx(backend, weights, derivatives)?;
    let syy = sigma_yy(backend, weights, derivatives)?;
    let sxy = sigma_xy(backend, weights, derivatives)?;
    let dens = density(backend, energies, norm);

    let out: Vec<TransportCoefficients> = (0..weights.len())
        .map(|i| {
            let hall = hall_number(norm, sxx[i], syy[i], sxy[i]);
            if !hall.is_finite() {
                warn!("Hall number at slice {i} is {hall} (sigma_xy = {:e})", sxy[i]);
            }
            TransportCoefficients {
                sigma_xx: sxx[i],
                sigma_yy: syy[i],
                sigma_xy: sxy[i],
                density: dens[i],
                hall_number: hall,
            }
        })
        .collect();

    debug!("transport: {} slices in {:.1?}", out.len(), start.elapsed());
    Ok(out)
}
