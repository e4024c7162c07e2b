//! Error types for the Eddy diffusion workspace.
//!
//! Organized by failure source: boundary-tag translation, configuration,
//! the linear solve, and the top-level [`DiffusionError`] that the
//! diffusion core returns to its driver.

use crate::id::DomainFace;
use std::error::Error;
use std::fmt;

/// Errors translating physical boundary tags into operator types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundaryError {
    /// A domain face carries a tag with no operator equivalent.
    InvalidTag {
        /// The offending face.
        face: DomainFace,
        /// The raw tag value.
        tag: i32,
    },
    /// The tag array for a face is too small to hold the sampled entry.
    MissingFaceData {
        /// The face whose data is missing.
        face: DomainFace,
    },
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTag { face, tag } => {
                write!(f, "wrong bc type {tag} on domain face {face}")
            }
            Self::MissingFaceData { face } => {
                write!(f, "no boundary tag data for domain face {face}")
            }
        }
    }
}

impl Error for BoundaryError {}

/// Errors loading or validating runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A value could not be parsed into the expected type.
    InvalidValue {
        /// Fully-qualified key (`prefix.key`).
        key: String,
        /// The raw text.
        value: String,
        /// What was expected.
        expected: &'static str,
    },
    /// A value parsed but lies outside its permitted range.
    OutOfRange {
        /// Fully-qualified key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A line of an inputs file is not `key = value`.
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "{key} = '{value}': expected {expected}"),
            Self::OutOfRange { key, reason } => write!(f, "{key} out of range: {reason}"),
            Self::Malformed { line, text } => {
                write!(f, "line {line}: expected 'key = value', got '{text}'")
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors from the linear solve.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveError {
    /// The iteration caps were reached before the tolerance was met.
    NotConverged {
        /// Iterations performed.
        iterations: usize,
        /// Final max-norm residual.
        residual: f64,
        /// Residual that would have counted as converged.
        target: f64,
    },
    /// The iteration broke down (e.g. a zero or non-finite inner product).
    Breakdown {
        /// Level on which the breakdown occurred.
        level: usize,
        /// Description of the breakdown.
        reason: String,
    },
    /// Solution and right-hand side cover different numbers of levels.
    LevelCountMismatch {
        /// Levels the operator was defined on.
        expected: usize,
        /// Levels supplied.
        got: usize,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConverged {
                iterations,
                residual,
                target,
            } => write!(
                f,
                "failed to converge after {iterations} iterations: \
                 residual {residual:e} > {target:e}"
            ),
            Self::Breakdown { level, reason } => {
                write!(f, "solver breakdown on level {level}: {reason}")
            }
            Self::LevelCountMismatch { expected, got } => {
                write!(f, "expected {expected} levels, got {got}")
            }
        }
    }
}

impl Error for SolveError {}

/// Top-level error returned by the diffusion core.
#[derive(Clone, Debug, PartialEq)]
pub enum DiffusionError {
    /// Boundary-tag translation failed at construction.
    Boundary(BoundaryError),
    /// Configuration was invalid.
    Config(ConfigError),
    /// The linear solve failed.
    Solve(SolveError),
    /// The mesh hierarchy was inconsistent with the supplied inputs.
    Mesh {
        /// Description of the inconsistency.
        reason: String,
    },
    /// The operation exists but is not supported in this version.
    Unsupported {
        /// Name of the operation.
        operation: &'static str,
    },
}

impl fmt::Display for DiffusionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary(e) => write!(f, "boundary conditions: {e}"),
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Solve(e) => write!(f, "diffusion solve: {e}"),
            Self::Mesh { reason } => write!(f, "mesh: {reason}"),
            Self::Unsupported { operation } => write!(f, "{operation}: not yet implemented"),
        }
    }
}

impl Error for DiffusionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Boundary(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Solve(e) => Some(e),
            Self::Mesh { .. } | Self::Unsupported { .. } => None,
        }
    }
}

impl From<BoundaryError> for DiffusionError {
    fn from(e: BoundaryError) -> Self {
        Self::Boundary(e)
    }
}

impl From<ConfigError> for DiffusionError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SolveError> for DiffusionError {
    fn from(e: SolveError) -> Self {
        Self::Solve(e)
    }
}
