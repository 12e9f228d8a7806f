//! # tbhall Compute
//!
//! Compute backend abstraction for the tbhall pipeline. Every stage of the
//! pipeline produces one independent result per chemical-potential value, so
//! the backends here only need to know how to spread that outer axis across
//! workers.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Notes |
//! |---------|-------------|-------|
//! | CPU (Rayon) | `cpu` (default) | Parallel over the μ axis |
//! | Serial | always | Single-threaded reference path |

pub mod backend;
pub mod serial;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo};
pub use serial::SerialBackend;

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;

use std::sync::Arc;

/// Default backend for this build: Rayon when the `cpu` feature is on,
/// otherwise the serial fallback.
pub fn default_backend() -> Arc<dyn ComputeBackend> {
    #[cfg(feature = "cpu")]
    {
        Arc::new(CpuBackend::new())
    }
    #[cfg(not(feature = "cpu"))]
    {
        Arc::new(SerialBackend)
    }
}
