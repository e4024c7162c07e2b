//! Core types for the Eddy viscous-diffusion workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! box-structured storage every other crate builds on: axis and face
//! identifiers, index boxes, box arrays, periodicity, multi-component
//! field storage, the level-indexed collection, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod box_array;
pub mod error;
pub mod fab;
pub mod field;
pub mod id;
pub mod index;
pub mod levels;
pub mod periodicity;

pub use box_array::{BoxArray, DistributionMapping};
pub use error::{BoundaryError, ConfigError, DiffusionError, SolveError};
pub use fab::Fab;
pub use field::LevelField;
pub use id::{Axis, DomainFace, Side, SPACEDIM};
pub use index::{BoxIter, Centering, IndexBox, IntVect};
pub use levels::LevelVec;
pub use periodicity::Periodicity;
