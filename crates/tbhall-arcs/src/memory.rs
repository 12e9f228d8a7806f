//! In-memory reference source.
//!
//! Wraps arrays that are already loaded, e.g. fixtures in tests or data
//! produced by another tool in the same process.

use crate::provider::{ArcError, ArcSource, ReferenceArcs};

/// Spectral weight held in memory.
pub struct InMemoryArcs {
    name: String,
    arcs: ReferenceArcs,
}

impl InMemoryArcs {
    pub fn new(name: impl Into<String>, arcs: ReferenceArcs) -> Self {
        Self {
            name: name.into(),
            arcs,
        }
    }
}

impl ArcSource for InMemoryArcs {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_all(&self) -> Result<ReferenceArcs, ArcError> {
        if self.arcs.is_empty() {
            return Err(ArcError::NoData(self.name.clone().into()));
        }
        Ok(self.arcs.clone())
    }
}
