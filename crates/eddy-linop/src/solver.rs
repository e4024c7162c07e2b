//! The [`MultigridSolver`] trait and solver settings.

use crate::operator::ViscousOperator;
use eddy_core::{LevelField, SolveError};
use std::fmt;

/// Strategy for the coarsest-level solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BottomSolver {
    /// The solver's built-in default (BiCGStab).
    #[default]
    Default,
    /// Relaxation sweeps only.
    Smoother,
    /// An external algebraic multigrid library.
    Hypre,
}

impl BottomSolver {
    /// Resolve a configuration name. Unrecognized names give
    /// [`BottomSolver::Default`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "smoother" => Self::Smoother,
            "hypre" => Self::Hypre,
            _ => Self::Default,
        }
    }
}

impl fmt::Display for BottomSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Smoother => write!(f, "smoother"),
            Self::Hypre => write!(f, "hypre"),
        }
    }
}

/// Iteration caps, verbosity, and bottom-solver choice for one solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverSettings {
    /// Progress verbosity of the outer cycle.
    pub verbose: i32,
    /// Progress verbosity of the bottom solve.
    pub cg_verbose: i32,
    /// Maximum outer cycles.
    pub max_iter: usize,
    /// Maximum full-multigrid cycles before the outer cycles start.
    pub max_fmg_iter: usize,
    /// Maximum iterations of each bottom solve.
    pub cg_max_iter: usize,
    /// Bottom-solve strategy.
    pub bottom_solver: BottomSolver,
    /// Refill the solution's ghost cells from boundary data on return.
    pub final_fill_bc: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            verbose: 0,
            cg_verbose: 0,
            max_iter: 100,
            max_fmg_iter: 0,
            cg_max_iter: 100,
            bottom_solver: BottomSolver::Default,
            final_fill_bc: false,
        }
    }
}

/// Outcome of a converged solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveReport {
    /// Outer cycles performed, summed over levels.
    pub iterations: usize,
    /// Max-norm residual before the first cycle.
    pub initial_residual: f64,
    /// Max-norm residual on return.
    pub final_residual: f64,
    /// Levels solved.
    pub levels: usize,
}

/// An iterative solver for `L(sol) = rhs` across all levels of an
/// operator.
///
/// A fresh solver is made for every solve by cloning a configured
/// prototype, so implementations may keep per-solve scratch state.
///
/// # Contract
///
/// - `sol` and `rhs` hold one field per operator level, level 0 first.
/// - On entry `sol` holds the initial guess; on `Ok` it holds a solution
///   whose max-norm residual is at most `max(rtol * r0, atol)`, where
///   `r0` is the initial residual.
/// - On `Err` the contents of `sol` are unspecified.
pub trait MultigridSolver: Clone + Send {
    /// Apply iteration caps, verbosity, and bottom-solver choice.
    fn configure(&mut self, settings: &SolverSettings);

    /// Solve for `sol` given `rhs`.
    fn solve(
        &mut self,
        op: &dyn ViscousOperator,
        sol: &mut [LevelField],
        rhs: &[LevelField],
        rtol: f64,
        atol: f64,
    ) -> Result<SolveReport, SolveError>;
}
