//! Linear-operator and solver interfaces for Eddy.
//!
//! The diffusion core configures a [`ViscousOperator`] and drives a
//! [`MultigridSolver`] without knowing how either is implemented. This
//! crate defines both traits, the boundary-condition vocabulary they
//! share ([`LinOpBcType`], [`DomainBc`]), solver settings, and a
//! reference backend:
//!
//! - [`ReferenceOperator`]: seven-point finite-volume stencil.
//! - [`BiCgStabSolver`]: residual correction with a Jacobi-preconditioned
//!   BiCGStab (or weighted Jacobi) inner solve.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bc;
pub mod bicgstab;
pub mod operator;
pub mod reference;
pub mod solver;

pub use bc::{DomainBc, LinOpBcType};
pub use bicgstab::BiCgStabSolver;
pub use operator::{LpInfo, ViscousOperator};
pub use reference::ReferenceOperator;
pub use solver::{BottomSolver, MultigridSolver, SolveReport, SolverSettings};
