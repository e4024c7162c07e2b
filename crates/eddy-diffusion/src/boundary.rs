//! Translation of physical boundary tags into operator boundary types.
//!
//! The driver describes each domain face with a two-dimensional array of
//! integer tags spanning the face plus `nghost` cells on every side. The
//! tag sampled at the domain's low corner decides the operator type for
//! the whole face; periodic axes ignore their tags.

use eddy_core::{Axis, BoundaryError, DomainFace, IndexBox, Side};
use eddy_linop::{DomainBc, LinOpBcType};
use eddy_mesh::Geometry;
use std::fmt;

/// Physical boundary kinds the driver tags domain faces with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhysicalBc {
    /// No condition assigned.
    Undefined,
    /// Pressure inflow.
    PressureInflow,
    /// Pressure outflow.
    PressureOutflow,
    /// Mass inflow.
    MassInflow,
    /// No-slip wall.
    NoSlipWall,
}

impl PhysicalBc {
    /// Every known kind.
    pub const ALL: [PhysicalBc; 5] = [
        Self::Undefined,
        Self::PressureInflow,
        Self::PressureOutflow,
        Self::MassInflow,
        Self::NoSlipWall,
    ];

    /// The integer tag written into face arrays.
    pub fn tag(self) -> i32 {
        match self {
            Self::Undefined => 1,
            Self::PressureInflow => 10,
            Self::PressureOutflow => 11,
            Self::MassInflow => 20,
            Self::NoSlipWall => 100,
        }
    }

    /// The kind for an integer tag, if any.
    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Operator type the velocity solve uses for this kind, or `None`
    /// if the kind cannot bound a diffusion solve.
    pub fn linop_type(self) -> Option<LinOpBcType> {
        match self {
            Self::PressureInflow | Self::PressureOutflow => Some(LinOpBcType::Neumann),
            Self::MassInflow | Self::NoSlipWall => Some(LinOpBcType::Dirichlet),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for PhysicalBc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::PressureInflow => write!(f, "pressure inflow"),
            Self::PressureOutflow => write!(f, "pressure outflow"),
            Self::MassInflow => write!(f, "mass inflow"),
            Self::NoSlipWall => write!(f, "no-slip wall"),
        }
    }
}

/// Tags covering one domain face, row-major over the two tangential
/// axes (first tangential axis fastest).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceTags {
    dims: [usize; 2],
    tags: Vec<i32>,
}

impl FaceTags {
    /// Wrap an existing tag array of `dims[0] * dims[1]` entries.
    ///
    /// # Panics
    ///
    /// Panics if `tags.len()` does not match `dims`.
    pub fn new(dims: [usize; 2], tags: Vec<i32>) -> Self {
        assert_eq!(tags.len(), dims[0] * dims[1], "tag array does not match dims");
        Self { dims, tags }
    }

    /// A face of `domain` normal to `axis`, padded by `nghost` cells on
    /// each side, carrying `tag` everywhere.
    pub fn uniform(domain: &IndexBox, axis: Axis, nghost: usize, tag: i32) -> Self {
        let dims = tangential(axis).map(|t| domain.length(t) + 2 * nghost);
        Self {
            dims,
            tags: vec![tag; dims[0] * dims[1]],
        }
    }

    /// Extent along the two tangential axes.
    pub fn dims(&self) -> [usize; 2] {
        self.dims
    }

    /// Tag at tangential position `(a, b)`, or `None` outside the array.
    pub fn get(&self, a: usize, b: usize) -> Option<i32> {
        if a < self.dims[0] && b < self.dims[1] {
            self.tags.get(b * self.dims[0] + a).copied()
        } else {
            None
        }
    }

    /// Overwrite the tag at `(a, b)`. Out-of-range positions are ignored.
    pub fn set(&mut self, a: usize, b: usize, tag: i32) {
        if a < self.dims[0] && b < self.dims[1] {
            self.tags[b * self.dims[0] + a] = tag;
        }
    }
}

/// Tag arrays for all six faces of the level-0 domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryTags {
    faces: [FaceTags; 6],
}

impl BoundaryTags {
    /// Faces in [`DomainFace::ALL`] order.
    pub fn new(faces: [FaceTags; 6]) -> Self {
        Self { faces }
    }

    /// Every face of `domain` tagged with `kind`.
    pub fn uniform(domain: &IndexBox, nghost: usize, kind: PhysicalBc) -> Self {
        Self::from_face_kinds(domain, nghost, [kind; 6])
    }

    /// One uniform kind per face, in [`DomainFace::ALL`] order.
    pub fn from_face_kinds(domain: &IndexBox, nghost: usize, kinds: [PhysicalBc; 6]) -> Self {
        Self {
            faces: std::array::from_fn(|i| {
                FaceTags::uniform(domain, DomainFace::ALL[i].axis, nghost, kinds[i].tag())
            }),
        }
    }

    /// Tags of one face.
    pub fn face(&self, face: DomainFace) -> &FaceTags {
        &self.faces[face_slot(face)]
    }

    /// Mutable tags of one face.
    pub fn face_mut(&mut self, face: DomainFace) -> &mut FaceTags {
        &mut self.faces[face_slot(face)]
    }
}

fn face_slot(face: DomainFace) -> usize {
    2 * face.axis.index()
        + match face.side {
            Side::Lo => 0,
            Side::Hi => 1,
        }
}

fn tangential(axis: Axis) -> [Axis; 2] {
    match axis {
        Axis::X => [Axis::Y, Axis::Z],
        Axis::Y => [Axis::X, Axis::Z],
        Axis::Z => [Axis::X, Axis::Y],
    }
}

/// Operator boundary types for the domain of `geom`.
///
/// Periodic axes map to [`LinOpBcType::Periodic`] on both faces. Every
/// other face samples its tag array at `(nghost, nghost)`, the first
/// valid cell of the domain.
///
/// # Errors
///
/// [`BoundaryError::MissingFaceData`] if a non-periodic face's array does
/// not reach the sampled entry, and [`BoundaryError::InvalidTag`] if the
/// tag has no operator equivalent.
pub fn translate_domain_bc(
    geom: &Geometry,
    tags: &BoundaryTags,
    nghost: usize,
) -> Result<DomainBc, BoundaryError> {
    let mut bc = DomainBc::periodic();
    for face in DomainFace::ALL {
        if geom.is_periodic(face.axis) {
            continue;
        }
        let tag = tags
            .face(face)
            .get(nghost, nghost)
            .ok_or(BoundaryError::MissingFaceData { face })?;
        let ty = PhysicalBc::from_tag(tag)
            .and_then(PhysicalBc::linop_type)
            .ok_or_else(|| {
                log::error!("wrong bc type {tag} on domain face {face}");
                BoundaryError::InvalidTag { face, tag }
            })?;
        let d = face.axis.index();
        match face.side {
            Side::Lo => bc.lo[d] = ty,
            Side::Hi => bc.hi[d] = ty,
        }
    }
    Ok(bc)
}
