//! Reference spectral-weight provider trait.
//!
//! All sources of externally supplied spectral weight implement
//! [`ArcSource`], which returns every labelled configuration at once as a
//! [`ReferenceArcs`] collection.

use std::collections::btree_map::{self, BTreeMap};
use std::path::PathBuf;

use ndarray::Array2;
use ndarray_npy::{ReadNpyError, WriteNpyError};
use thiserror::Error;

use crate::label::ArcLabel;

/// Side length of the momentum grid the reference data is sampled on.
pub const REFERENCE_GRID: usize = 200;

/// Errors from reference data sources.
#[derive(Debug, Error)]
pub enum ArcError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ReadNpyError,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: WriteNpyError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to list data directory: {0}")]
    Listing(#[from] glob::GlobError),

    #[error("No spectral-weight files found in {0}")]
    NoData(PathBuf),

    #[error("Cannot derive a configuration label from {0}")]
    BadFileName(PathBuf),

    #[error("Duplicate configuration label '{0}'")]
    DuplicateLabel(String),

    #[error("Array for '{label}' has shape {found:?}, expected {expected:?}")]
    UnexpectedShape {
        label: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Spectral weight per labelled configuration, all sharing one grid shape.
///
/// Iteration follows [`ArcLabel`] natural order, which is the order the
/// model facade pairs configurations with fillings.
#[derive(Debug, Clone, Default)]
pub struct ReferenceArcs {
    arrays: BTreeMap<ArcLabel, Array2<f64>>,
}

impl ReferenceArcs {
    /// Build a collection, rejecting duplicate labels and mixed shapes.
    pub fn new<L, I>(entries: I) -> Result<Self, ArcError>
    where
        L: Into<ArcLabel>,
        I: IntoIterator<Item = (L, Array2<f64>)>,
    {
        let mut arrays = BTreeMap::new();
        let mut shape: Option<(usize, usize)> = None;

        for (label, array) in entries {
            let label = label.into();
            let found = array.dim();
            match shape {
                Some(expected) if expected != found => {
                    return Err(ArcError::UnexpectedShape {
                        label: label.to_string(),
                        expected,
                        found,
                    });
                }
                _ => shape = Some(found),
            }
            if arrays.contains_key(&label) {
                return Err(ArcError::DuplicateLabel(label.to_string()));
            }
            arrays.insert(label, array);
        }

        Ok(Self { arrays })
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Shared `(rows, cols)` of every array, `None` when empty.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.arrays.values().next().map(|a| a.dim())
    }

    pub fn labels(&self) -> Vec<String> {
        self.arrays.keys().map(|l| l.to_string()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&Array2<f64>> {
        self.arrays.get(&ArcLabel::from(label))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ArcLabel, Array2<f64>> {
        self.arrays.iter()
    }

    /// Check every array against an expected square grid.
    pub fn ensure_grid(&self, resolution: usize) -> Result<(), ArcError> {
        let expected = (resolution, resolution);
        for (label, array) in &self.arrays {
            if array.dim() != expected {
                return Err(ArcError::UnexpectedShape {
                    label: label.to_string(),
                    expected,
                    found: array.dim(),
                });
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ReferenceArcs {
    type Item = (&'a ArcLabel, &'a Array2<f64>);
    type IntoIter = btree_map::Iter<'a, ArcLabel, Array2<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Provides externally supplied spectral weight.
///
/// Implementations include on-disk `.npy` directories and in-memory arrays.
pub trait ArcSource: Send + Sync {
    /// Human-readable description of the source.
    fn name(&self) -> &str;

    /// Load every labelled configuration.
    fn load_all(&self) -> Result<ReferenceArcs, ArcError>;
}
