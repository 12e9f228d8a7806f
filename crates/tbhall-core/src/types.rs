//! Core types shared across the tbhall pipeline.
//!
//! This module defines the parameter types that describe a model (hoppings,
//! momentum grid, chemical-potential sweep) and the containers each stage
//! hands to the next.

use std::f64::consts::PI;

use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

/// Inverse temperature used by the occupation function. Large enough to act
/// as the zero-temperature step on the energy scale of `t`.
pub const BETA: f64 = 100.0;

/// Momentum points per axis when none is given.
pub const DEFAULT_RESOLUTION: usize = 600;

/// Largest number of chemical potentials a range sweep may expand to.
pub const MAX_SWEEP_LEN: usize = 1 << 20;

/// Nearest, next-nearest and third-nearest neighbour hopping amplitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoppingParameters {
    /// Nearest-neighbour hopping t.
    pub t: f64,
    /// Diagonal hopping t′.
    pub t_prime: f64,
    /// Straight second-neighbour hopping t″.
    pub t_double_prime: f64,
}

impl HoppingParameters {
    /// Hoppings the reference spectral-weight data was generated with.
    pub const REFERENCE: Self = Self {
        t: 1.0,
        t_prime: -0.3,
        t_double_prime: 0.2,
    };

    pub fn new(t: f64, t_prime: f64, t_double_prime: f64) -> Self {
        Self {
            t,
            t_prime,
            t_double_prime,
        }
    }

    /// Plain nearest-neighbour square lattice.
    pub fn nearest_neighbour(t: f64) -> Self {
        Self::new(t, 0.0, 0.0)
    }
}

impl From<[f64; 3]> for HoppingParameters {
    fn from([t, t_prime, t_double_prime]: [f64; 3]) -> Self {
        Self::new(t, t_prime, t_double_prime)
    }
}

/// Square grid of momenta covering the first Brillouin zone.
///
/// Both axes sample `[-π, π]` with the endpoints included, and the arrays
/// follow meshgrid layout: `kx[[i, j]] = k[j]`, `ky[[i, j]] = k[i]`.
#[derive(Debug, Clone)]
pub struct MomentumGrid {
    axis: Array1<f64>,
    kx: Array2<f64>,
    ky: Array2<f64>,
}

impl MomentumGrid {
    pub fn new(resolution: usize) -> Result<Self, ModelError> {
        if resolution == 0 {
            return Err(ModelError::InvalidResolution(resolution));
        }
        let axis = Array1::linspace(-PI, PI, resolution);
        let kx = Array2::from_shape_fn((resolution, resolution), |(_, j)| axis[j]);
        let ky = Array2::from_shape_fn((resolution, resolution), |(i, _)| axis[i]);
        Ok(Self { axis, kx, ky })
    }

    pub fn resolution(&self) -> usize {
        self.axis.len()
    }

    /// The 1-D momentum samples shared by both axes.
    pub fn axis(&self) -> &Array1<f64> {
        &self.axis
    }

    pub fn kx(&self) -> &Array2<f64> {
        &self.kx
    }

    pub fn ky(&self) -> &Array2<f64> {
        &self.ky
    }

    pub fn dim(&self) -> (usize, usize) {
        self.kx.dim()
    }

    /// Brillouin-zone normalisation `1 / R²`.
    pub fn norm(&self) -> f64 {
        let r = self.resolution() as f64;
        1.0 / (r * r)
    }
}

/// Chemical-potential values to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChemicalPotentialSweep {
    /// Half-open arithmetic progression `start, start + step, ...` below
    /// `stop` (above it for negative steps).
    Range { start: f64, stop: f64, step: f64 },
    /// Explicit values, in evaluation order.
    List(Vec<f64>),
}

impl ChemicalPotentialSweep {
    /// Expand the sweep, rejecting empty, zero-step and non-finite sweeps.
    pub fn values(&self) -> Result<Vec<f64>, ModelError> {
        match self {
            Self::Range { start, stop, step } => {
                if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
                    return Err(ModelError::InvalidSweep(format!(
                        "range bounds must be finite (start {start}, stop {stop}, step {step})"
                    )));
                }
                if *step == 0.0 {
                    return Err(ModelError::InvalidSweep("step must be non-zero".into()));
                }
                let count = ((stop - start) / step).ceil();
                if count < 1.0 {
                    return Err(ModelError::InvalidSweep(format!(
                        "range from {start} to {stop} with step {step} is empty"
                    )));
                }
                if count > MAX_SWEEP_LEN as f64 {
                    return Err(ModelError::InvalidSweep(format!(
                        "range from {start} to {stop} with step {step} has {count:e} points, \
                         more than {MAX_SWEEP_LEN}"
                    )));
                }
                Ok((0..count as usize)
                    .map(|i| start + i as f64 * step)
                    .collect())
            }
            Self::List(values) => {
                if values.is_empty() {
                    return Err(ModelError::InvalidSweep("value list is empty".into()));
                }
                if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                    return Err(ModelError::InvalidSweep(format!(
                        "value list contains non-finite entry {bad}"
                    )));
                }
                Ok(values.clone())
            }
        }
    }
}

/// Band energy `E(kx, ky; μ)` for every μ, shape `(M, R, R)`.
#[derive(Debug, Clone)]
pub struct BandEnergy {
    values: Array3<f64>,
}

/// Spectral weight `A(kx, ky; μ)` for every μ (or reference label), shape
/// `(M, R, R)`.
#[derive(Debug, Clone)]
pub struct SpectralWeight {
    values: Array3<f64>,
}

macro_rules! slice_stack {
    ($name:ident) => {
        impl $name {
            pub fn new(values: Array3<f64>) -> Self {
                Self { values }
            }

            /// Number of μ-slices.
            pub fn len(&self) -> usize {
                self.values.len_of(Axis(0))
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Shape of one slice.
            pub fn slice_dim(&self) -> (usize, usize) {
                let (_, rows, cols) = self.values.dim();
                (rows, cols)
            }

            pub fn slice(&self, index: usize) -> ArrayView2<'_, f64> {
                self.values.index_axis(Axis(0), index)
            }

            pub fn as_array(&self) -> &Array3<f64> {
                &self.values
            }

            pub fn into_array(self) -> Array3<f64> {
                self.values
            }
        }
    };
}

slice_stack!(BandEnergy);
slice_stack!(SpectralWeight);

/// First and second momentum derivatives of the band energy. Independent of
/// μ, so one set serves the whole sweep.
#[derive(Debug, Clone)]
pub struct DispersionDerivatives {
    pub dx: Array2<f64>,
    pub dxx: Array2<f64>,
    pub dy: Array2<f64>,
    pub dyy: Array2<f64>,
    pub dxy: Array2<f64>,
}

impl DispersionDerivatives {
    pub fn dim(&self) -> (usize, usize) {
        self.dx.dim()
    }
}

/// The diamond `|kx| + |ky| = π` as two 0/1 masks.
#[derive(Debug, Clone)]
pub struct FermiArcMasks {
    /// 1 inside and on the diamond when filtering is enabled; all ones
    /// otherwise.
    pub filter: Array2<f64>,
    /// 1 on the diamond boundary only.
    pub outline: Array2<f64>,
}

/// Transport output for one chemical potential.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransportCoefficients {
    pub sigma_xx: f64,
    pub sigma_yy: f64,
    pub sigma_xy: f64,
    /// Electrons per site, in `[0, 2]`.
    pub density: f64,
    /// `norm · σxx · σyy / (e · σxy)`; may be `±inf` or `NaN`.
    pub hall_number: f64,
}

/// One point of a doping-vs-Hall-number curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HallPoint {
    pub mu: f64,
    /// Reference configuration the point came from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub doping: f64,
    pub hall_number: f64,
}

pub type HallCurve = Vec<HallPoint>;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_grid_meshgrid_layout() {
        let grid = MomentumGrid::new(3).unwrap();
        assert_eq!(grid.dim(), (3, 3));
        assert_abs_diff_eq!(grid.kx()[[0, 0]], -PI);
        assert_abs_diff_eq!(grid.kx()[[0, 2]], PI);
        assert_abs_diff_eq!(grid.kx()[[2, 1]], 0.0);
        assert_abs_diff_eq!(grid.ky()[[2, 0]], PI);
        assert_abs_diff_eq!(grid.ky()[[0, 2]], -PI);
        assert_abs_diff_eq!(grid.norm(), 1.0 / 9.0);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert!(matches!(
            MomentumGrid::new(0),
            Err(ModelError::InvalidResolution(0))
        ));
    }

    #[test]
    fn test_range_follows_half_open_semantics() {
        let sweep = ChemicalPotentialSweep::Range {
            start: -1.0,
            stop: 1.0,
            step: 0.5,
        };
        let values = sweep.values().unwrap();
        assert_eq!(values, vec![-1.0, -0.5, 0.0, 0.5]);

        let descending = ChemicalPotentialSweep::Range {
            start: 1.0,
            stop: 0.0,
            step: -0.25,
        };
        assert_eq!(descending.values().unwrap(), vec![1.0, 0.75, 0.5, 0.25]);
    }

    #[test]
    fn test_range_partial_last_step() {
        let sweep = ChemicalPotentialSweep::Range {
            start: 0.0,
            stop: 1.0,
            step: 0.3,
        };
        let values = sweep.values().unwrap();
        assert_eq!(values.len(), 4);
        assert_abs_diff_eq!(values[3], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_sweeps_rejected() {
        let bad = [
            ChemicalPotentialSweep::Range { start: 0.0, stop: 1.0, step: 0.0 },
            ChemicalPotentialSweep::Range { start: 1.0, stop: 0.0, step: 0.1 },
            ChemicalPotentialSweep::Range { start: 0.0, stop: f64::INFINITY, step: 0.1 },
            ChemicalPotentialSweep::Range { start: -1.0, stop: 1.0, step: 1e-300 },
            ChemicalPotentialSweep::List(vec![]),
            ChemicalPotentialSweep::List(vec![0.0, f64::NAN]),
        ];
        for sweep in &bad {
            assert!(
                matches!(sweep.values(), Err(ModelError::InvalidSweep(_))),
                "{sweep:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_oversized_range_rejected_before_allocating() {
        let sweep = ChemicalPotentialSweep::Range {
            start: -4.0,
            stop: 4.0,
            step: 1e-300,
        };
        match sweep.values() {
            Err(ModelError::InvalidSweep(msg)) => {
                assert!(msg.contains(&MAX_SWEEP_LEN.to_string()), "message: {msg}");
            }
            other => panic!("expected InvalidSweep, got {other:?}"),
        }

        let largest = ChemicalPotentialSweep::Range {
            start: 0.0,
            stop: MAX_SWEEP_LEN as f64,
            step: 1.0,
        };
        assert_eq!(largest.values().unwrap().len(), MAX_SWEEP_LEN);
    }

    #[test]
    fn test_transport_serializes_non_finite_as_null() {
        let coeffs = TransportCoefficients {
            sigma_xx: 1.0,
            sigma_yy: 1.0,
            sigma_xy: 0.0,
            density: 1.0,
            hall_number: f64::INFINITY,
        };
        let json = serde_json::to_value(coeffs).unwrap();
        assert!(json["hall_number"].is_null());
        assert_eq!(json["density"], 1.0);
    }
}
