//! Implicit viscous diffusion for Eddy.
//!
//! [`DiffusionEquation`] solves
//! `alpha * a * phi - beta * div(b * grad(phi)) = rhs` with `alpha = 1`,
//! `beta = dt`, `a` the density, and `b` the viscosity averaged to faces,
//! for all three velocity components at once on every level of a mesh
//! hierarchy. The pieces it is built from are public:
//!
//! - [`boundary`]: physical face tags to operator boundary types.
//! - [`coefficients`]: face averaging and operator coefficient setup.
//! - [`eb_velocity`]: wall velocity of a rotating embedded obstacle.
//! - [`system`]: right-hand side and solution boundary data.
//! - [`config`]: the `diffusion.*` runtime options.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod coefficients;
pub mod config;
pub mod eb_velocity;
pub mod equation;
pub mod system;

pub use boundary::{translate_domain_bc, BoundaryTags, FaceTags, PhysicalBc};
pub use coefficients::{assemble_coefficients, average_cellcenter_to_face};
pub use config::{DiffusionConfig, ParamTable};
pub use eb_velocity::{fill_eb_velocity, rotating_wall_velocity};
pub use equation::{DiffusionEquation, DiffusionSetup};
pub use system::{assemble_rhs, assemble_solution};
