//! Mesh hierarchy and embedded-boundary geometry for Eddy.
//!
//! The diffusion core reads mesh structure through two read-only
//! interfaces defined here:
//!
//! - [`MeshHierarchy`]: per-level [`Geometry`], box decomposition, and
//!   distribution mapping.
//! - [`EbFactory`]: per-level cut-cell classification ([`FabType`]) and
//!   boundary normals for an embedded obstacle.
//!
//! # Backends
//!
//! - [`StaticHierarchy`]: fixed levels built once with ratio-2 refinement.
//! - [`RegularFactory`]: no embedded boundary.
//! - [`CylinderFactory`]: a z-aligned cylindrical obstacle.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod eb;
pub mod error;
pub mod geometry;
pub mod hierarchy;

#[cfg(test)]
pub(crate) mod compliance;

pub use eb::{CylinderFactory, EbFactory, FabType, RegularFactory};
pub use error::MeshError;
pub use geometry::Geometry;
pub use hierarchy::{MeshHierarchy, StaticHierarchy, StaticHierarchyBuilder};
