//! Dense, palette-compressed block storage.
//!
//! A [`VolumeBuffer`] stores one [`PaletteId`] per cell in a flat array laid
//! out in scan order (x fastest, then z, then y) and resolves ids through a
//! shared palette. The cell array sits behind an [`Arc`] so that
//! [`to_immutable`](VolumeBuffer::to_immutable) can share it with a snapshot;
//! the first write afterwards clones the array, leaving the snapshot intact.

use std::fmt;
use std::sync::Arc;

use glam::IVec3;

use crate::error::VolumeError;
use crate::palette::{BlockPalette, PaletteId};
use crate::region::BlockRegion;
use crate::snapshot::ImmutableSnapshot;
use crate::state::{BlockState, Cause};
use crate::transform::DiscreteTransform;
use crate::view::{DownsizeView, ReadOnlyView, TransformView};
use crate::volume::{BlockVolume, MutableBlockVolume, StorageType, out_of_bounds};
use crate::worker::VolumeWorker;

/// Mutable block storage over `[origin, origin + size)`.
pub struct VolumeBuffer<P> {
    /// Shared id table. Append-only, so copies may keep pointing at it.
    palette: Arc<P>,
    /// One id per cell in scan order. Shared only with live snapshots.
    cells: Arc<Vec<PaletteId>>,
    region: BlockRegion,
}

impl<P: BlockPalette> VolumeBuffer<P> {
    /// Creates a buffer filled with air.
    ///
    /// # Errors
    ///
    /// [`VolumeError::InvalidSize`] if any component of `size` is negative,
    /// the far corner overflows `i32`, or the cell array would not fit in
    /// memory addressable by this platform.
    pub fn new(palette: Arc<P>, origin: IVec3, size: IVec3) -> Result<Self, VolumeError> {
        let (region, cell_count) = checked_layout(origin, size)?;
        Ok(Self {
            palette,
            cells: Arc::new(vec![PaletteId::AIR; cell_count]),
            region,
        })
    }

    /// Wraps an existing cell array, e.g. one produced by a loader.
    ///
    /// `cells` must be in scan order. Ids the palette cannot resolve read back
    /// as air.
    ///
    /// # Errors
    ///
    /// [`VolumeError::InvalidSize`] for a negative size and
    /// [`VolumeError::SizeMismatch`] if `cells.len()` differs from the volume
    /// of the region.
    pub fn from_raw(
        palette: Arc<P>,
        cells: Vec<PaletteId>,
        origin: IVec3,
        size: IVec3,
    ) -> Result<Self, VolumeError> {
        let (region, cell_count) = checked_layout(origin, size)?;
        if cells.len() != cell_count {
            return Err(VolumeError::SizeMismatch {
                expected: size,
                actual: IVec3::new(i32::try_from(cells.len()).unwrap_or(i32::MAX), 1, 1),
            });
        }
        Ok(Self::from_parts(palette, Arc::new(cells), region))
    }

    pub(crate) fn from_parts(
        palette: Arc<P>,
        cells: Arc<Vec<PaletteId>>,
        region: BlockRegion,
    ) -> Self {
        debug_assert_eq!(cells.len(), region.volume());
        Self {
            palette,
            cells,
            region,
        }
    }

    /// The palette this buffer resolves ids through.
    pub fn palette(&self) -> &Arc<P> {
        &self.palette
    }

    /// Raw ids in scan order.
    pub fn cells(&self) -> &[PaletteId] {
        &self.cells
    }

    /// Flat index of `pos`, or `None` outside the buffer.
    pub fn index_of(&self, pos: IVec3) -> Option<usize> {
        self.region.index_of(pos)
    }

    /// Returns `true` while a snapshot still shares this buffer's cells.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.cells) > 1
    }

    /// Sub-region view over `[min, max)` intersected with this buffer.
    pub fn block_view(&mut self, min: IVec3, max: IVec3) -> DownsizeView<&mut Self> {
        DownsizeView::new(self, min, max)
    }

    /// View whose positions map back to this buffer through
    /// `transform.inverse()`.
    ///
    /// # Errors
    ///
    /// [`VolumeError::TransformOutOfRange`] if the image of this buffer's
    /// region does not fit in `i32` coordinates.
    pub fn transformed_view(
        &mut self,
        transform: DiscreteTransform,
    ) -> Result<TransformView<&mut Self>, VolumeError> {
        TransformView::new(self, transform)
    }

    /// View that rejects every write.
    pub fn unmodifiable_view(&self) -> ReadOnlyView<&Self> {
        ReadOnlyView::new(self)
    }

    /// Worker bound to this buffer and `cause`.
    pub fn worker(&mut self, cause: Cause) -> VolumeWorker<&mut Self> {
        VolumeWorker::new(self, cause)
    }

    /// Copies the buffer.
    ///
    /// [`StorageType::Standard`] clones the cell array and keeps the palette
    /// reference; ids stay valid because palettes never reassign them.
    ///
    /// # Errors
    ///
    /// [`VolumeError::UnsupportedOperation`] for [`StorageType::ThreadSafe`].
    pub fn copy(&self, mode: StorageType) -> Result<Self, VolumeError> {
        match mode {
            StorageType::Standard => {
                tracing::debug!(
                    "VolumeBuffer::copy {} ({} cells)",
                    self.region,
                    self.cells.len()
                );
                Ok(Self::from_parts(
                    Arc::clone(&self.palette),
                    Arc::new(self.cells.to_vec()),
                    self.region,
                ))
            }
            StorageType::ThreadSafe => Err(VolumeError::UnsupportedOperation(
                "thread-safe block copies are not implemented",
            )),
        }
    }

    /// Copies the buffer together with a private clone of its palette, so
    /// that neither copy observes the other's palette growth.
    pub fn copy_with_cloned_palette(&self) -> Self
    where
        P: Clone,
    {
        Self::from_parts(
            Arc::new((*self.palette).clone()),
            Arc::new(self.cells.to_vec()),
            self.region,
        )
    }

    /// Freezes the current contents.
    ///
    /// The snapshot shares the cell array until this buffer is next written;
    /// that write clones the array first, so the snapshot never observes
    /// later changes.
    pub fn to_immutable(&self) -> ImmutableSnapshot<P> {
        tracing::debug!("VolumeBuffer::to_immutable {}", self.region);
        ImmutableSnapshot::new(
            Arc::clone(&self.palette),
            Arc::clone(&self.cells),
            self.region,
        )
    }

    /// Resolves a stored id, falling back to air for ids the palette does not
    /// know.
    pub(crate) fn resolve(palette: &P, id: PaletteId) -> P::State {
        palette.get(id).unwrap_or_else(|| {
            tracing::warn!("unresolvable palette id {}, reading as air", id.0);
            P::State::air()
        })
    }
}

/// Region and cell count for a buffer at `origin` with extent `size`.
///
/// The count is bounded so that the id array stays within `isize::MAX` bytes,
/// the largest allocation `Vec` accepts.
fn checked_layout(origin: IVec3, size: IVec3) -> Result<(BlockRegion, usize), VolumeError> {
    let max_cells = isize::MAX as usize / std::mem::size_of::<PaletteId>();
    BlockRegion::from_origin_size(origin, size)
        .and_then(|region| Some((region, region.checked_volume()?)))
        .filter(|&(_, cell_count)| cell_count <= max_cells)
        .ok_or(VolumeError::InvalidSize(size))
}

impl<P: BlockPalette> BlockVolume for VolumeBuffer<P> {
    type State = P::State;

    fn region(&self) -> BlockRegion {
        self.region
    }

    fn get_block(&self, pos: IVec3) -> Result<P::State, VolumeError> {
        let index = self
            .region
            .index_of(pos)
            .ok_or_else(|| out_of_bounds(pos, self.region))?;
        Ok(Self::resolve(&self.palette, self.cells[index]))
    }
}

impl<P: BlockPalette> MutableBlockVolume for VolumeBuffer<P> {
    fn set_block(
        &mut self,
        pos: IVec3,
        state: P::State,
        cause: Option<&Cause>,
    ) -> Result<bool, VolumeError> {
        let index = self
            .region
            .index_of(pos)
            .ok_or_else(|| out_of_bounds(pos, self.region))?;
        let id = self.palette.get_or_assign(&state)?;
        if self.cells[index] == id {
            return Ok(false);
        }
        if self.is_shared() {
            tracing::debug!("VolumeBuffer {} detached from snapshot", self.region);
        }
        Arc::make_mut(&mut self.cells)[index] = id;
        tracing::trace!("set_block {} = {:?} cause={:?}", pos, state, cause);
        Ok(true)
    }
}

impl<P: BlockPalette> fmt::Debug for VolumeBuffer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeBuffer")
            .field("region", &self.region)
            .field("palette_len", &self.palette.len())
            .field("shared", &self.is_shared())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
