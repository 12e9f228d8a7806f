//! Single-threaded backend.
//!
//! Useful for deterministic debugging and for builds without the `cpu`
//! feature. Produces the same values as [`CpuBackend`](crate::CpuBackend)
//! since every slice is evaluated in isolation.

use ndarray::Array3;

use crate::backend::{
    BackendType, ComputeBackend, ComputeError, DeviceInfo, SliceFillFn, SliceReduceFn,
};

/// Backend that evaluates every slice on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Serial (1 thread)".into(),
            backend_type: BackendType::Serial,
            threads: 1,
        }
    }

    fn parallel_slice_fill(
        &self,
        slices: usize,
        rows: usize,
        cols: usize,
        fill_fn: &SliceFillFn<'_>,
    ) -> Result<Array3<f64>, ComputeError> {
        let data: Vec<f64> = (0..slices * rows * cols)
            .map(|idx| {
                let m = idx / (rows * cols);
                let rem = idx % (rows * cols);
                fill_fn(m, rem / cols, rem % cols)
            })
            .collect();

        Array3::from_shape_vec((slices, rows, cols), data)
            .map_err(|e| ComputeError::ShapeError(e.to_string()))
    }

    fn parallel_reduce(&self, count: usize, reduce_fn: &SliceReduceFn<'_>) -> Vec<f64> {
        (0..count).map(reduce_fn).collect()
    }
}
