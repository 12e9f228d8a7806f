//! # tbhall Core
//!
//! Hall number, carrier density and conductivities of a two-dimensional
//! tight-binding band, the square-lattice model used for hole-doped
//! cuprates.
//!
//! ## Pipeline
//!
//! Data flows strictly forward; every stage returns new arrays.
//!
//! 1. [`dispersion`]: band energy `E(kx, ky; μ)` and its momentum derivatives.
//! 2. [`spectral`]: Lorentzian spectral weight, the diamond Fermi-arc masks,
//!    or reference arrays from `tbhall-arcs`.
//! 3. [`transport`]: σxx, σyy, σxy, density and Hall number per μ.
//! 4. [`model`]: the [`Model`](model::Model) facade tying 1–3 together.
//!
//! ## Modules
//!
//! - [`types`]: parameters and stage outputs.
//! - [`error`]: [`ModelError`](error::ModelError).
//!
//! ```no_run
//! use tbhall_core::model::{Model, ModelParams};
//! use tbhall_core::types::{ChemicalPotentialSweep, HoppingParameters};
//!
//! let params = ModelParams::new(
//!     HoppingParameters::new(1.0, -0.3, 0.2),
//!     0.1,
//!     ChemicalPotentialSweep::Range { start: -4.0, stop: 4.0, step: 0.05 },
//! );
//! let model = Model::synthetic(&params)?;
//! for point in model.hall_curve() {
//!     println!("{:.3} {:.3}", point.doping, point.hall_number);
//! }
//! # Ok::<(), tbhall_core::error::ModelError>(())
//! ```

pub mod dispersion;
pub mod error;
pub mod model;
pub mod spectral;
pub mod transport;
pub mod types;

pub use error::ModelError;
pub use model::{Model, ModelBuilder, ModelParams, ModelSource};
