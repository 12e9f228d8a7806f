//! Flattening utility for non-core tooling.
//!
//! Rewrites each 2-D array as a row-major 1-D `.npy` file named
//! `Akw_<label>.npy`, for readers that only handle one-dimensional data.

use std::path::{Path, PathBuf};

use log::info;
use ndarray::Array1;
use ndarray_npy::write_npy;

use crate::provider::{ArcError, ReferenceArcs};

/// Write every array of `arcs` into `save_dir` as a flat `.npy` file.
///
/// Returns the paths written, in label order.
pub fn flatten_arcs(arcs: &ReferenceArcs, save_dir: &Path) -> Result<Vec<PathBuf>, ArcError> {
    std::fs::create_dir_all(save_dir)?;

    let mut written = Vec::with_capacity(arcs.len());
    for (label, array) in arcs {
        let flat: Array1<f64> = array.iter().copied().collect();
        let path = save_dir.join(format!("Akw_{}.npy", label));
        write_npy(&path, &flat).map_err(|source| ArcError::Write {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }

    info!("flattened {} arrays into {}", written.len(), save_dir.display());
    Ok(written)
}
