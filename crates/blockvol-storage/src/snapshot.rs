//! Frozen, shareable block volumes.
//!
//! An [`ImmutableSnapshot`] points at the same cell allocation as the buffer
//! it came from. Reads are a pointer dereference. The source buffer clones
//! the array on its next write (`Arc::make_mut`), so neither side ever sees
//! the other's changes after the snapshot is taken.

use std::fmt;
use std::sync::Arc;

use glam::IVec3;

use crate::buffer::VolumeBuffer;
use crate::error::VolumeError;
use crate::palette::{BlockPalette, PaletteId};
use crate::region::BlockRegion;
use crate::view::ReadOnlyView;
use crate::volume::{BlockVolume, out_of_bounds};

/// Read-only block volume taken from a [`VolumeBuffer`].
///
/// `Clone` is cheap (two `Arc` increments). A snapshot over a
/// [`GlobalPalette`](crate::GlobalPalette) is `Send + Sync` and can be handed
/// to other threads.
pub struct ImmutableSnapshot<P> {
    palette: Arc<P>,
    cells: Arc<Vec<PaletteId>>,
    region: BlockRegion,
}

impl<P: BlockPalette> ImmutableSnapshot<P> {
    pub(crate) fn new(palette: Arc<P>, cells: Arc<Vec<PaletteId>>, region: BlockRegion) -> Self {
        Self {
            palette,
            cells,
            region,
        }
    }

    pub fn palette(&self) -> &Arc<P> {
        &self.palette
    }

    /// Raw ids in scan order.
    pub fn cells(&self) -> &[PaletteId] {
        &self.cells
    }

    /// Returns `true` if this snapshot shares its cells with a buffer or
    /// another snapshot.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.cells) > 1
    }

    /// Returns `true` if two snapshots point at the same cell allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cells, &other.cells)
    }

    /// A new mutable buffer with its own copy of the cells and the same
    /// palette reference.
    pub fn to_mutable(&self) -> VolumeBuffer<P> {
        VolumeBuffer::from_parts(
            Arc::clone(&self.palette),
            Arc::new(self.cells.to_vec()),
            self.region,
        )
    }

    /// Borrowing view, for APIs that take a [`ReadOnlyView`].
    pub fn unmodifiable_view(&self) -> ReadOnlyView<&Self> {
        ReadOnlyView::new(self)
    }
}

impl<P> Clone for ImmutableSnapshot<P> {
    fn clone(&self) -> Self {
        Self {
            palette: Arc::clone(&self.palette),
            cells: Arc::clone(&self.cells),
            region: self.region,
        }
    }
}

impl<P: BlockPalette> BlockVolume for ImmutableSnapshot<P> {
    type State = P::State;

    fn region(&self) -> BlockRegion {
        self.region
    }

    fn get_block(&self, pos: IVec3) -> Result<P::State, VolumeError> {
        let index = self
            .region
            .index_of(pos)
            .ok_or_else(|| out_of_bounds(pos, self.region))?;
        Ok(VolumeBuffer::resolve(&*self.palette, self.cells[index]))
    }
}

impl<P: BlockPalette> fmt::Debug for ImmutableSnapshot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableSnapshot")
            .field("region", &self.region)
            .field("palette_len", &self.palette.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
