//! The volume capability shared by buffers, snapshots, and views.
//!
//! [`BlockVolume`] is read access over a [`BlockRegion`];
//! [`MutableBlockVolume`] adds writes. Views wrap any `V: BlockVolume` by
//! value, and the blanket impls for `&V` and `&mut V` let a view borrow its
//! backing volume so the borrow checker bounds the view's lifetime.

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::error::VolumeError;
use crate::region::BlockRegion;
use crate::state::{BlockState, Cause};
use crate::transform::DiscreteTransform;
use crate::view::{DownsizeView, ReadOnlyView, TransformView};
use crate::worker::VolumeWorker;

/// Requested storage strategy for [`VolumeBuffer::copy`](crate::VolumeBuffer::copy).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    /// Independent cell array, single-owner access.
    Standard,
    /// Copy usable from several threads at once. Not implemented.
    ThreadSafe,
}

/// Read access to a 3D region of block states.
pub trait BlockVolume {
    /// The block-state type stored in this volume.
    type State: BlockState;

    /// The addressable domain.
    fn region(&self) -> BlockRegion;

    /// Returns the state at `pos`.
    ///
    /// # Errors
    ///
    /// [`VolumeError::OutOfBounds`] if `pos` is outside [`region`](Self::region).
    fn get_block(&self, pos: IVec3) -> Result<Self::State, VolumeError>;

    /// Inclusive lower corner of the domain.
    fn block_min(&self) -> IVec3 {
        self.region().min()
    }

    /// Exclusive upper corner of the domain.
    fn block_max(&self) -> IVec3 {
        self.region().max()
    }

    fn block_size(&self) -> IVec3 {
        self.region().size()
    }

    fn contains_block(&self, pos: IVec3) -> bool {
        self.region().contains(pos)
    }

    /// Restricts this volume to `[min, max)` intersected with its own domain.
    fn downsize(self, min: IVec3, max: IVec3) -> DownsizeView<Self>
    where
        Self: Sized,
    {
        DownsizeView::new(self, min, max)
    }

    /// Views this volume through `transform`. Positions on the view map back
    /// to the volume through the inverse transform.
    ///
    /// # Errors
    ///
    /// [`VolumeError::TransformOutOfRange`] if the transformed domain leaves
    /// the `i32` coordinate range.
    fn transform(self, transform: DiscreteTransform) -> Result<TransformView<Self>, VolumeError>
    where
        Self: Sized,
    {
        TransformView::new(self, transform)
    }

    /// Wraps this volume so every write is rejected.
    fn read_only(self) -> ReadOnlyView<Self>
    where
        Self: Sized,
    {
        ReadOnlyView::new(self)
    }

    /// Binds a bulk worker to this volume and `cause`.
    fn into_worker(self, cause: Cause) -> VolumeWorker<Self>
    where
        Self: Sized,
    {
        VolumeWorker::new(self, cause)
    }
}

/// Write access on top of [`BlockVolume`].
pub trait MutableBlockVolume: BlockVolume {
    /// Stores `state` at `pos`, forwarding `cause` unchanged.
    ///
    /// Returns `Ok(true)` if the stored value changed and `Ok(false)` if the
    /// cell already held `state`. On error nothing is written.
    ///
    /// # Errors
    ///
    /// [`VolumeError::OutOfBounds`] outside the domain,
    /// [`VolumeError::UnsupportedOperation`] on read-only volumes, and
    /// [`VolumeError::Palette`] when no id can be produced for `state`.
    fn set_block(
        &mut self,
        pos: IVec3,
        state: Self::State,
        cause: Option<&Cause>,
    ) -> Result<bool, VolumeError>;
}

impl<V: BlockVolume + ?Sized> BlockVolume for &V {
    type State = V::State;

    fn region(&self) -> BlockRegion {
        (**self).region()
    }

    fn get_block(&self, pos: IVec3) -> Result<V::State, VolumeError> {
        (**self).get_block(pos)
    }
}

impl<V: BlockVolume + ?Sized> BlockVolume for &mut V {
    type State = V::State;

    fn region(&self) -> BlockRegion {
        (**self).region()
    }

    fn get_block(&self, pos: IVec3) -> Result<V::State, VolumeError> {
        (**self).get_block(pos)
    }
}

impl<V: MutableBlockVolume + ?Sized> MutableBlockVolume for &mut V {
    fn set_block(
        &mut self,
        pos: IVec3,
        state: V::State,
        cause: Option<&Cause>,
    ) -> Result<bool, VolumeError> {
        (**self).set_block(pos, state, cause)
    }
}

/// Builds the out-of-bounds error for `pos` against `region`.
pub(crate) fn out_of_bounds(pos: IVec3, region: BlockRegion) -> VolumeError {
    VolumeError::OutOfBounds {
        position: pos,
        region,
    }
}
