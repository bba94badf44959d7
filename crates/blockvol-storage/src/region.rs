//! Half-open integer boxes and the canonical scan order.
//!
//! Every bulk traversal in this crate visits cells in the same order: x varies
//! fastest, then z, then y. The flat cell index of a
//! [`VolumeBuffer`](crate::VolumeBuffer) follows the same convention, so
//! walking a region front to back touches memory sequentially.

use std::fmt;

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box of block positions, `min` inclusive, `max` exclusive.
///
/// Invariant: `min <= max` on every axis. A region with `min == max` on any
/// axis is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRegion {
    min: IVec3,
    max: IVec3,
}

impl BlockRegion {
    /// Creates the region `[min, max)`. Components of `max` below `min` are
    /// clamped up, producing an empty region on that axis.
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Creates the region starting at `origin` with the given extent.
    ///
    /// Returns `None` if any component of `size` is negative or the far corner
    /// does not fit in `i32`.
    pub fn from_origin_size(origin: IVec3, size: IVec3) -> Option<Self> {
        if size.cmplt(IVec3::ZERO).any() {
            return None;
        }
        let max = IVec3::new(
            origin.x.checked_add(size.x)?,
            origin.y.checked_add(size.y)?,
            origin.z.checked_add(size.z)?,
        );
        Some(Self { min: origin, max })
    }

    /// Creates the smallest region containing both corners, inclusive.
    ///
    /// Returns `None` if a corner sits at `i32::MAX` on some axis, since the
    /// exclusive upper bound would not be representable.
    pub fn from_corners_inclusive(a: IVec3, b: IVec3) -> Option<Self> {
        let far = a.max(b);
        let max = IVec3::new(
            far.x.checked_add(1)?,
            far.y.checked_add(1)?,
            far.z.checked_add(1)?,
        );
        Some(Self { min: a.min(b), max })
    }

    /// Inclusive lower corner.
    pub fn min(&self) -> IVec3 {
        self.min
    }

    /// Exclusive upper corner.
    pub fn max(&self) -> IVec3 {
        self.max
    }

    /// Extent along each axis, saturating at `i32::MAX`.
    pub fn size(&self) -> IVec3 {
        self.max.saturating_sub(self.min)
    }

    /// Number of positions in the region, saturating at `usize::MAX`.
    pub fn volume(&self) -> usize {
        self.checked_volume().unwrap_or(usize::MAX)
    }

    /// Number of positions in the region, or `None` if it does not fit in
    /// `usize`.
    pub fn checked_volume(&self) -> Option<usize> {
        let [x, y, z] = self.extent();
        let volume = x.checked_mul(y)?.checked_mul(z)?;
        usize::try_from(volume).ok()
    }

    /// Exact extent per axis. Never overflows, unlike [`size`](Self::size).
    fn extent(&self) -> [u64; 3] {
        let axis = |max: i32, min: i32| (i64::from(max) - i64::from(min)) as u64;
        [
            axis(self.max.x, self.min.x),
            axis(self.max.y, self.min.y),
            axis(self.max.z, self.min.z),
        ]
    }

    /// Returns `true` if the region holds no positions.
    pub fn is_empty(&self) -> bool {
        self.min.cmpeq(self.max).any()
    }

    /// Returns `true` if `pos` lies inside the region.
    pub fn contains(&self, pos: IVec3) -> bool {
        pos.cmpge(self.min).all() && pos.cmplt(self.max).all()
    }

    /// Returns `true` if every position of `other` lies inside `self`.
    ///
    /// An empty `other` is contained in anything.
    pub fn contains_region(&self, other: &BlockRegion) -> bool {
        other.is_empty() || (other.min.cmpge(self.min).all() && other.max.cmple(self.max).all())
    }

    /// Overlap of two regions. Disjoint regions yield an empty region anchored
    /// at the clamped lower corner.
    pub fn intersection(&self, other: &BlockRegion) -> BlockRegion {
        BlockRegion::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Offset of `pos` in scan order, or `None` if it lies outside or the
    /// offset does not fit in `usize`.
    pub fn index_of(&self, pos: IVec3) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let [sx, _, sz] = self.extent();
        let [dx, dy, dz] = BlockRegion::new(self.min, pos).extent();
        let index = dy
            .checked_mul(sx)?
            .checked_mul(sz)?
            .checked_add(dz.checked_mul(sx)?)?
            .checked_add(dx)?;
        usize::try_from(index).ok()
    }

    /// Iterates every position in scan order.
    pub fn iter(&self) -> RegionIter {
        RegionIter {
            region: *self,
            next: (!self.is_empty()).then_some(self.min),
        }
    }
}

impl fmt::Display for BlockRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}

impl IntoIterator for BlockRegion {
    type Item = IVec3;
    type IntoIter = RegionIter;

    fn into_iter(self) -> RegionIter {
        self.iter()
    }
}

impl IntoIterator for &BlockRegion {
    type Item = IVec3;
    type IntoIter = RegionIter;

    fn into_iter(self) -> RegionIter {
        self.iter()
    }
}

/// Scan-order iterator over a [`BlockRegion`].
#[derive(Clone, Debug)]
pub struct RegionIter {
    region: BlockRegion,
    next: Option<IVec3>,
}

impl Iterator for RegionIter {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        let current = self.next?;
        let (min, max) = (self.region.min, self.region.max);
        let mut step = current;
        step.x += 1;
        if step.x == max.x {
            step.x = min.x;
            step.z += 1;
            if step.z == max.z {
                step.z = min.z;
                step.y += 1;
            }
        }
        self.next = (step.y < max.y).then_some(step);
        Some(current)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
