//! Directory of `.npy` spectral-weight files.
//!
//! Each file holds one 2-D `f64` array sampled on the reference momentum
//! grid. The configuration label is the last underscore-delimited token of
//! the file stem, so `Akw_N32.npy` and `fermi_arc_N32.npy` both load as
//! `N32`. A stem without underscores is used whole.

use std::path::{Path, PathBuf};

use log::debug;
use ndarray::Array2;
use ndarray_npy::read_npy;

use crate::label::ArcLabel;
use crate::provider::{ArcError, ArcSource, ReferenceArcs, REFERENCE_GRID};

/// Spectral weight stored as one `.npy` file per configuration.
pub struct NpyArcDirectory {
    name: String,
    directory: PathBuf,
    resolution: usize,
}

impl NpyArcDirectory {
    /// Source reading every `*.npy` in `directory`, expecting the
    /// [`REFERENCE_GRID`] shape.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        Self {
            name: format!("npy directory {}", directory.display()),
            directory,
            resolution: REFERENCE_GRID,
        }
    }

    /// Override the expected square grid size.
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Files the source will read, sorted by path.
    pub fn files(&self) -> Result<Vec<PathBuf>, ArcError> {
        let escaped = glob::Pattern::escape(&self.directory.to_string_lossy());
        let pattern = format!("{}/*.npy", escaped);
        let mut files = Vec::new();
        for entry in glob::glob(&pattern)? {
            files.push(entry?);
        }
        files.sort();
        Ok(files)
    }
}

/// Extract the configuration label from a data file path.
pub fn label_from_path(path: &Path) -> Result<ArcLabel, ArcError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ArcError::BadFileName(path.to_path_buf()))?;
    let token = stem.rsplit('_').next().unwrap_or(stem);
    if token.is_empty() {
        return Err(ArcError::BadFileName(path.to_path_buf()));
    }
    Ok(ArcLabel::new(token))
}

impl ArcSource for NpyArcDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_all(&self) -> Result<ReferenceArcs, ArcError> {
        let files = self.files()?;
        if files.is_empty() {
            return Err(ArcError::NoData(self.directory.clone()));
        }

        let mut entries = Vec::with_capacity(files.len());
        for path in files {
            let label = label_from_path(&path)?;
            let array: Array2<f64> = read_npy(&path).map_err(|source| ArcError::Read {
                path: path.clone(),
                source,
            })?;
            debug!("loaded {} from {} ({:?})", label, path.display(), array.dim());
            entries.push((label, array));
        }

        let arcs = ReferenceArcs::new(entries)?;
        arcs.ensure_grid(self.resolution)?;
        Ok(arcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_last_underscore_token() {
        let label = label_from_path(Path::new("/data/fermi_arc_data/Akw_N32.npy")).unwrap();
        assert_eq!(label.as_str(), "N32");

        let label = label_from_path(Path::new("spectral_weight_U8_N12.npy")).unwrap();
        assert_eq!(label.as_str(), "N12");
    }

    #[test]
    fn test_label_without_underscore_uses_stem() {
        let label = label_from_path(Path::new("N16.npy")).unwrap();
        assert_eq!(label.as_str(), "N16");
    }

    #[test]
    fn test_trailing_underscore_is_rejected() {
        let err = label_from_path(Path::new("Akw_.npy")).unwrap_err();
        assert!(matches!(err, ArcError::BadFileName(_)));
    }
}
