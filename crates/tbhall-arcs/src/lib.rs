//! # tbhall Arcs
//!
//! Externally measured or simulated spectral weight ("Fermi arcs") for the
//! tbhall pipeline. Every data source implements the
//! [`ArcSource`](provider::ArcSource) trait and hands back a
//! [`ReferenceArcs`](provider::ReferenceArcs) collection: one 2-D array per
//! labelled configuration, all on the same momentum grid.
//!
//! ## Available sources
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | Directory of `.npy` files | [`npy`] | `<prefix>_<label>.npy`, 200×200 `f64` |
//! | In-memory arrays | [`memory`] | Test doubles, pre-loaded data |
//!
//! The [`flatten`] module rewrites a collection as 1-D `.npy` files for
//! tools that cannot read 2-D arrays.

pub mod flatten;
pub mod label;
pub mod memory;
pub mod npy;
pub mod provider;

pub use flatten::flatten_arcs;
pub use label::ArcLabel;
pub use memory::InMemoryArcs;
pub use npy::NpyArcDirectory;
pub use provider::{ArcError, ArcSource, ReferenceArcs, REFERENCE_GRID};
