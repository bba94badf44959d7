//! Palette-compressed block volumes with composable views and bulk workers.
//!
//! A [`VolumeBuffer`] stores one [`PaletteId`] per cell and resolves ids
//! through a shared [`BlockPalette`]. Views ([`DownsizeView`],
//! [`TransformView`], [`ReadOnlyView`]) remap coordinates without copying,
//! a [`VolumeWorker`] runs bulk operations in scan order (x, then z, then y),
//! and an [`ImmutableSnapshot`] freezes a buffer for export.
//!
//! ```
//! use std::sync::Arc;
//! use blockvol_storage::{
//!     BlockState, BlockVolume, IVec3, LocalPalette, MutableBlockVolume, VolumeBuffer,
//! };
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! enum Block { Air, Stone }
//!
//! impl BlockState for Block {
//!     fn air() -> Self { Block::Air }
//! }
//!
//! let palette = Arc::new(LocalPalette::new());
//! let mut buffer = VolumeBuffer::new(palette, IVec3::ZERO, IVec3::splat(2)).unwrap();
//! buffer.set_block(IVec3::ZERO, Block::Stone, None).unwrap();
//! assert_eq!(buffer.get_block(IVec3::ZERO).unwrap(), Block::Stone);
//! assert_eq!(buffer.get_block(IVec3::ONE).unwrap(), Block::Air);
//! ```
//!
//! A view borrows its buffer and cannot outlive it:
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use blockvol_storage::{BlockState, BlockVolume, IVec3, LocalPalette, VolumeBuffer};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! struct Air;
//!
//! impl BlockState for Air {
//!     fn air() -> Self { Air }
//! }
//!
//! let view = {
//!     let mut buffer: VolumeBuffer<LocalPalette<Air>> =
//!         VolumeBuffer::new(Arc::new(LocalPalette::new()), IVec3::ZERO, IVec3::ONE).unwrap();
//!     buffer.block_view(IVec3::ZERO, IVec3::ONE)
//! };
//! let _ = view.get_block(IVec3::ZERO);
//! ```

pub mod buffer;
pub mod error;
pub mod palette;
pub mod region;
pub mod snapshot;
pub mod state;
pub mod transform;
pub mod view;
pub mod volume;
pub mod worker;

#[cfg(test)]
mod test_blocks;

pub use buffer::VolumeBuffer;
pub use error::VolumeError;
pub use glam::{I64Vec3, IVec3};
pub use palette::{BlockPalette, GlobalPalette, LocalPalette, MAX_PALETTE_LEN, PaletteError, PaletteId};
pub use region::{BlockRegion, RegionIter};
pub use snapshot::ImmutableSnapshot;
pub use state::{BlockState, Cause, CauseEntry};
pub use transform::{Axis, DiscreteTransform};
pub use view::{DownsizeView, ReadOnlyView, TransformView};
pub use volume::{BlockVolume, MutableBlockVolume, StorageType};
pub use worker::VolumeWorker;
