//! Zero-copy views over another volume.
//!
//! A view owns no cells. It holds its backing volume by value (often a
//! `&mut` or `&` borrow of a buffer) and remaps coordinates on every access.
//! Views implement [`BlockVolume`] themselves, so they stack: each layer adds
//! one bounds check and at most one coordinate transform.

use glam::IVec3;

use crate::error::VolumeError;
use crate::region::BlockRegion;
use crate::state::Cause;
use crate::transform::DiscreteTransform;
use crate::volume::{BlockVolume, MutableBlockVolume, out_of_bounds};

// ---------------------------------------------------------------------------
// Downsize
// ---------------------------------------------------------------------------

/// Restricts a volume to a sub-region.
///
/// The view's domain is `[min, max)` intersected with the backing domain.
/// Accesses outside it fail at the view even where the backing volume would
/// accept them.
#[derive(Clone, Debug)]
pub struct DownsizeView<V> {
    volume: V,
    region: BlockRegion,
}

impl<V: BlockVolume> DownsizeView<V> {
    pub fn new(volume: V, min: IVec3, max: IVec3) -> Self {
        let region = BlockRegion::new(min, max).intersection(&volume.region());
        Self { volume, region }
    }

    pub fn inner(&self) -> &V {
        &self.volume
    }

    pub fn into_inner(self) -> V {
        self.volume
    }
}

impl<V: BlockVolume> BlockVolume for DownsizeView<V> {
    type State = V::State;

    fn region(&self) -> BlockRegion {
        self.region
    }

    fn get_block(&self, pos: IVec3) -> Result<V::State, VolumeError> {
        if !self.region.contains(pos) {
            return Err(out_of_bounds(pos, self.region));
        }
        self.volume.get_block(pos)
    }
}

impl<V: MutableBlockVolume> MutableBlockVolume for DownsizeView<V> {
    fn set_block(
        &mut self,
        pos: IVec3,
        state: V::State,
        cause: Option<&Cause>,
    ) -> Result<bool, VolumeError> {
        if !self.region.contains(pos) {
            return Err(out_of_bounds(pos, self.region));
        }
        self.volume.set_block(pos, state, cause)
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Presents a volume through a [`DiscreteTransform`].
///
/// Backing position `p` appears at `transform.apply(p)` on the view. The
/// view's domain is the image of the backing domain, and every access maps
/// back through the cached inverse.
#[derive(Clone, Debug)]
pub struct TransformView<V> {
    volume: V,
    transform: DiscreteTransform,
    inverse: DiscreteTransform,
    region: BlockRegion,
}

impl<V: BlockVolume> TransformView<V> {
    /// Wraps `volume`, presenting it through `transform`.
    ///
    /// # Errors
    ///
    /// [`VolumeError::TransformOutOfRange`] if the image of the backing
    /// domain does not fit in `i32` coordinates.
    pub fn new(volume: V, transform: DiscreteTransform) -> Result<Self, VolumeError> {
        let backing = volume.region();
        let region = transform
            .apply_region(&backing)
            .ok_or(VolumeError::TransformOutOfRange(backing))?;
        Ok(Self {
            volume,
            transform,
            inverse: transform.inverse(),
            region,
        })
    }

    /// Backing → view mapping.
    pub fn mapping(&self) -> &DiscreteTransform {
        &self.transform
    }

    pub fn inner(&self) -> &V {
        &self.volume
    }

    pub fn into_inner(self) -> V {
        self.volume
    }

    fn backing_pos(&self, pos: IVec3) -> Result<IVec3, VolumeError> {
        if !self.region.contains(pos) {
            return Err(out_of_bounds(pos, self.region));
        }
        self.inverse
            .apply(pos)
            .ok_or_else(|| out_of_bounds(pos, self.region))
    }
}

impl<V: BlockVolume> BlockVolume for TransformView<V> {
    type State = V::State;

    fn region(&self) -> BlockRegion {
        self.region
    }

    fn get_block(&self, pos: IVec3) -> Result<V::State, VolumeError> {
        let backing = self.backing_pos(pos)?;
        self.volume.get_block(backing)
    }
}

impl<V: MutableBlockVolume> MutableBlockVolume for TransformView<V> {
    fn set_block(
        &mut self,
        pos: IVec3,
        state: V::State,
        cause: Option<&Cause>,
    ) -> Result<bool, VolumeError> {
        let backing = self.backing_pos(pos)?;
        self.volume.set_block(backing, state, cause)
    }
}

// ---------------------------------------------------------------------------
// Read-only
// ---------------------------------------------------------------------------

/// Identity view that rejects all writes.
///
/// `set_block` fails with [`VolumeError::UnsupportedOperation`] before any
/// bounds check, whatever the backing volume allows.
#[derive(Clone, Debug)]
pub struct ReadOnlyView<V> {
    volume: V,
}

impl<V: BlockVolume> ReadOnlyView<V> {
    pub fn new(volume: V) -> Self {
        Self { volume }
    }

    pub fn inner(&self) -> &V {
        &self.volume
    }
}

impl<V: BlockVolume> BlockVolume for ReadOnlyView<V> {
    type State = V::State;

    fn region(&self) -> BlockRegion {
        self.volume.region()
    }

    fn get_block(&self, pos: IVec3) -> Result<V::State, VolumeError> {
        self.volume.get_block(pos)
    }
}

impl<V: BlockVolume> MutableBlockVolume for ReadOnlyView<V> {
    fn set_block(
        &mut self,
        _pos: IVec3,
        _state: V::State,
        _cause: Option<&Cause>,
    ) -> Result<bool, VolumeError> {
        Err(VolumeError::UnsupportedOperation(
            "set_block on a read-only view",
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
