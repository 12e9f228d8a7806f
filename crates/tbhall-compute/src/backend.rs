//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait isolates the physics code in `tbhall-core`
//! from how the per-μ work is scheduled. Implementations must evaluate each
//! slice independently and return results in index order, so that every
//! backend produces bit-identical output.

use ndarray::Array3;
use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to start thread pool: {0}")]
    ThreadPool(String),

    #[error("Shape error: {0}")]
    ShapeError(String),
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub threads: usize,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Cpu,
    Serial,
}

/// Fill function for one element of a slice stack: `(slice, row, col) -> value`.
pub type SliceFillFn<'a> = dyn Fn(usize, usize, usize) -> f64 + Send + Sync + 'a;

/// Reduction function producing one scalar per slice index.
pub type SliceReduceFn<'a> = dyn Fn(usize) -> f64 + Send + Sync + 'a;

/// Abstraction over compute backends.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Build a `(slices, rows, cols)` array where every element is produced
    /// by `fill_fn`.
    ///
    /// This is the entry point for the band-energy and spectral-weight stacks:
    /// each μ-slice can be computed independently of the others.
    fn parallel_slice_fill(
        &self,
        slices: usize,
        rows: usize,
        cols: usize,
        fill_fn: &SliceFillFn<'_>,
    ) -> Result<Array3<f64>, ComputeError>;

    /// Evaluate `reduce_fn` for every index in `0..count`, returning the
    /// scalars in index order.
    fn parallel_reduce(&self, count: usize, reduce_fn: &SliceReduceFn<'_>) -> Vec<f64>;
}
