//! CPU compute backend using Rayon for shared-memory parallelism.

use ndarray::Array3;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::backend::{
    BackendType, ComputeBackend, ComputeError, DeviceInfo, SliceFillFn, SliceReduceFn,
};

/// CPU backend that parallelises the μ axis across threads via Rayon.
///
/// Runs on Rayon's global pool unless built with
/// [`with_threads`](CpuBackend::with_threads).
pub struct CpuBackend {
    pool: Option<ThreadPool>,
}

impl CpuBackend {
    /// Create a new CPU backend on the global Rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Create a CPU backend with its own pool of `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        Ok(Self {
            pool: Some(pool),
        })
    }

    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn run<R: Send>(&self, work: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        let threads = self.num_threads();
        DeviceInfo {
            name: format!("CPU ({} threads)", threads),
            backend_type: BackendType::Cpu,
            threads,
        }
    }

    fn parallel_slice_fill(
        &self,
        slices: usize,
        rows: usize,
        cols: usize,
        fill_fn: &SliceFillFn<'_>,
    ) -> Result<Array3<f64>, ComputeError> {
        let plane = rows * cols;
        let data: Vec<f64> = self.run(|| {
            (0..slices * plane)
                .into_par_iter()
                .map(|idx| {
                    let m = idx / plane;
                    let rem = idx % plane;
                    fill_fn(m, rem / cols, rem % cols)
                })
                .collect()
        });

        Array3::from_shape_vec((slices, rows, cols), data)
            .map_err(|e| ComputeError::ShapeError(e.to_string()))
    }

    fn parallel_reduce(&self, count: usize, reduce_fn: &SliceReduceFn<'_>) -> Vec<f64> {
        self.run(|| (0..count).into_par_iter().map(reduce_fn).collect())
    }
}
