//! The mesh hierarchy interface and a static implementation.

use crate::error::MeshError;
use crate::geometry::Geometry;
use eddy_core::{BoxArray, DistributionMapping, IndexBox};

/// Read-only view of a block-structured mesh hierarchy.
///
/// Level 0 is the coarsest level and covers the whole domain. Levels
/// `0..=finest_level()` carry boxes; levels above the finest level up to
/// `max_level()` may exist with empty box arrays so that per-level
/// storage can be sized once for the largest hierarchy.
///
/// # Contract
///
/// - `finest_level() <= max_level()`.
/// - `geom`, `box_array`, and `distribution_map` accept every level in
///   `0..=max_level()` and panic otherwise.
/// - `box_array(l).len() == distribution_map(l).len()` for every level.
/// - The refinement ratio between consecutive levels is 2.
///
/// # Object Safety
///
/// This trait is object-safe. The diffusion core holds an
/// `Arc<dyn MeshHierarchy>` so that the hierarchy can be shared with the
/// driver that owns it.
pub trait MeshHierarchy: Send + Sync + 'static {
    /// Largest level index storage is sized for.
    fn max_level(&self) -> usize;

    /// Largest level index that currently carries boxes.
    fn finest_level(&self) -> usize;

    /// Geometry of `level`.
    fn geom(&self, level: usize) -> &Geometry;

    /// Box decomposition of `level`.
    fn box_array(&self, level: usize) -> &BoxArray;

    /// Owner of each box of `level`.
    fn distribution_map(&self, level: usize) -> &DistributionMapping;

    /// Number of levels that carry boxes (`finest_level() + 1`).
    fn num_active_levels(&self) -> usize {
        self.finest_level() + 1
    }
}

/// A hierarchy built once from a fixed set of refined regions.
#[derive(Clone, Debug)]
pub struct StaticHierarchy {
    geoms: Vec<Geometry>,
    grids: Vec<BoxArray>,
    dmaps: Vec<DistributionMapping>,
    finest_level: usize,
}

/// Builder for [`StaticHierarchy`].
///
/// Only the level-0 geometry is required. Defaults: `max_grid_size`
/// 32, one rank, no refined levels, `max_level` equal to the finest
/// level built.
#[derive(Clone, Debug)]
pub struct StaticHierarchyBuilder {
    geom: Geometry,
    max_grid_size: usize,
    nranks: usize,
    refined: Vec<IndexBox>,
    max_level: Option<usize>,
}

impl StaticHierarchy {
    /// Single-level hierarchy covering `geom`'s domain.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ZeroGridSize`] if `max_grid_size` is zero.
    pub fn uniform(geom: Geometry, max_grid_size: usize) -> Result<Self, MeshError> {
        Self::builder(geom).max_grid_size(max_grid_size).build()
    }

    /// Start building a hierarchy over the level-0 `geom`.
    pub fn builder(geom: Geometry) -> StaticHierarchyBuilder {
        StaticHierarchyBuilder {
            geom,
            max_grid_size: 32,
            nranks: 1,
            refined: Vec::new(),
            max_level: None,
        }
    }
}

impl StaticHierarchyBuilder {
    /// Longest box edge, in cells.
    pub fn max_grid_size(mut self, n: usize) -> Self {
        self.max_grid_size = n;
        self
    }

    /// Number of ranks boxes are dealt to.
    pub fn nranks(mut self, n: usize) -> Self {
        self.nranks = n;
        self
    }

    /// Add a refined level covering `region`, given in the new level's
    /// index space. Levels are added in order.
    pub fn refine_region(mut self, region: IndexBox) -> Self {
        self.refined.push(region);
        self
    }

    /// Size storage for levels up to `max_level`.
    pub fn max_level(mut self, max_level: usize) -> Self {
        self.max_level = Some(max_level);
        self
    }

    /// Build the hierarchy.
    ///
    /// # Errors
    ///
    /// - [`MeshError::ZeroGridSize`] if `max_grid_size` is zero.
    /// - [`MeshError::RegionNotNested`] if a refined region is not
    ///   covered by the refined boxes of the level below it.
    /// - [`MeshError::MaxLevelTooSmall`] if `max_level` is below the
    ///   number of refined regions.
    pub fn build(self) -> Result<StaticHierarchy, MeshError> {
        if self.max_grid_size == 0 {
            return Err(MeshError::ZeroGridSize);
        }
        let finest_level = self.refined.len();
        let max_level = self.max_level.unwrap_or(finest_level);
        if max_level < finest_level {
            return Err(MeshError::MaxLevelTooSmall {
                max_level,
                finest_level,
            });
        }

        let mut geoms = vec![self.geom.clone()];
        let mut grids = vec![BoxArray::chop(self.geom.domain(), self.max_grid_size)];
        for (i, region) in self.refined.iter().enumerate() {
            let level = i + 1;
            let coarse_refined = grids[i].refine(2);
            let covered: usize = coarse_refined
                .iter()
                .filter_map(|b| b.intersect(region))
                .map(|b| b.num_points())
                .sum();
            if region.is_empty() || covered != region.num_points() {
                return Err(MeshError::RegionNotNested {
                    level,
                    region: *region,
                });
            }
            geoms.push(geoms[i].refine(2));
            grids.push(BoxArray::chop(region, self.max_grid_size));
        }
        for level in finest_level + 1..=max_level {
            geoms.push(geoms[level - 1].refine(2));
            grids.push(BoxArray::new(Vec::new()));
        }
        let dmaps = grids
            .iter()
            .map(|ba| DistributionMapping::round_robin(ba.len(), self.nranks))
            .collect();

        Ok(StaticHierarchy {
            geoms,
            grids,
            dmaps,
            finest_level,
        })
    }
}

impl MeshHierarchy for StaticHierarchy {
    fn max_level(&self) -> usize {
        self.geoms.len() - 1
    }

    fn finest_level(&self) -> usize {
        self.finest_level
    }

    fn geom(&self, level: usize) -> &Geometry {
        &self.geoms[level]
    }

    fn box_array(&self, level: usize) -> &BoxArray {
        &self.grids[level]
    }

    fn distribution_map(&self, level: usize) -> &DistributionMapping {
        &self.dmaps[level]
    }
}
