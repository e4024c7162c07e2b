//! Periodic image shifts used by ghost-cell exchange.

use crate::id::{Axis, SPACEDIM};
use crate::index::{IndexBox, IntVect};
use smallvec::{smallvec, SmallVec};

/// Per-axis period lengths of a level's domain, in index points.
///
/// A non-periodic axis has no period. [`shifts`](Self::shifts) enumerates
/// every image offset (including the identity) that ghost exchange must
/// consider when pulling data across periodic boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Periodicity {
    period: [Option<i32>; SPACEDIM],
}

impl Periodicity {
    /// No periodic axes.
    pub fn non_periodic() -> Self {
        Self {
            period: [None; SPACEDIM],
        }
    }

    /// Periodicity of a cell-centred `domain` with the given periodic axes.
    pub fn new(domain: &IndexBox, periodic: [bool; SPACEDIM]) -> Self {
        let mut period = [None; SPACEDIM];
        for axis in Axis::ALL {
            if periodic[axis.index()] {
                period[axis.index()] = Some(domain.length(axis) as i32);
            }
        }
        Self { period }
    }

    /// Period length along `axis`, if periodic.
    pub fn period(&self, axis: Axis) -> Option<i32> {
        self.period[axis.index()]
    }

    /// Returns `true` if `axis` is periodic.
    pub fn is_periodic(&self, axis: Axis) -> bool {
        self.period[axis.index()].is_some()
    }

    /// Returns `true` if any axis is periodic.
    pub fn is_any_periodic(&self) -> bool {
        self.period.iter().any(Option::is_some)
    }

    /// All image offsets, identity first.
    pub fn shifts(&self) -> SmallVec<[IntVect; 27]> {
        let mut out: SmallVec<[IntVect; 27]> = smallvec![[0, 0, 0]];
        for axis in Axis::ALL {
            let Some(len) = self.period[axis.index()] else {
                continue;
            };
            let existing = out.len();
            for idx in 0..existing {
                for sign in [-1, 1] {
                    let mut s = out[idx];
                    s[axis.index()] = sign * len;
                    out.push(s);
                }
            }
        }
        out
    }
}

impl Default for Periodicity {
    fn default() -> Self {
        Self::non_periodic()
    }
}
