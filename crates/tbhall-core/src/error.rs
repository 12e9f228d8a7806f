//! Error type for model construction and the transport pipeline.

use tbhall_arcs::ArcError;
use tbhall_compute::ComputeError;
use thiserror::Error;

/// Errors raised while building a [`Model`](crate::model::Model) or running
/// one of its stages.
///
/// A singular Hall ratio is deliberately absent: dividing by a vanishing
/// σxy produces IEEE `±inf`/`NaN` in the result instead.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Broadening must be finite and positive, got {0}")]
    InvalidBroadening(f64),

    #[error("Frequency must be finite, got {0}")]
    InvalidFrequency(f64),

    #[error("Grid resolution must be at least 1, got {0}")]
    InvalidResolution(usize),

    #[error("Invalid chemical-potential sweep: {0}")]
    InvalidSweep(String),

    #[error("Array of shape {found:?} does not match the {expected:?} momentum grid")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("{energies} band-energy slices but {weights} spectral-weight slices")]
    SliceCountMismatch { energies: usize, weights: usize },

    #[error("Reference data has {labels} configurations but {fillings} fillings are defined")]
    ReferenceMismatch { labels: usize, fillings: usize },

    #[error("Reference data error: {0}")]
    Arcs(#[from] ArcError),

    #[error("Compute backend error: {0}")]
    Compute(#[from] ComputeError),
}
