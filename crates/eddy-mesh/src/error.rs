//! Error types for mesh construction.

use eddy_core::{Axis, IndexBox};
use std::fmt;

/// Errors arising from geometry or hierarchy construction.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The level-0 domain contains no cells.
    EmptyDomain,
    /// Physical extents are not strictly increasing along an axis.
    InvalidExtents {
        /// The offending axis.
        axis: Axis,
    },
    /// `max_grid_size` was zero.
    ZeroGridSize,
    /// A refined region is not covered by the next-coarser level.
    RegionNotNested {
        /// Level the region was meant to form.
        level: usize,
        /// The region in that level's index space.
        region: IndexBox,
    },
    /// `max_level` is below the number of refined levels requested.
    MaxLevelTooSmall {
        /// Requested maximum level.
        max_level: usize,
        /// Finest level actually built.
        finest_level: usize,
    },
    /// A query named a level that does not exist.
    LevelOutOfRange {
        /// The requested level.
        level: usize,
        /// The maximum valid level.
        max_level: usize,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain => write!(f, "domain must have at least one cell"),
            Self::InvalidExtents { axis } => {
                write!(f, "prob_hi must exceed prob_lo along {axis}")
            }
            Self::ZeroGridSize => write!(f, "max_grid_size must be at least 1"),
            Self::RegionNotNested { level, region } => {
                write!(f, "level {level} region {region} is not covered by level {}", level - 1)
            }
            Self::MaxLevelTooSmall {
                max_level,
                finest_level,
            } => write!(f, "max_level {max_level} is below finest level {finest_level}"),
            Self::LevelOutOfRange { level, max_level } => {
                write!(f, "level {level} out of range 0..={max_level}")
            }
        }
    }
}

impl std::error::Error for MeshError {}
