//! Error types shared by buffers, views, and workers.

use glam::IVec3;
use thiserror::Error;

use crate::palette::PaletteError;
use crate::region::BlockRegion;

/// Errors returned by volume access and bulk operations.
///
/// Every variant is local and recoverable: the operation that produced it was
/// not applied, and the volume it was called on is still valid.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// The position lies outside the addressed domain (a buffer's own region
    /// or a view's declared sub-domain).
    #[error("position {position} is outside {region}")]
    OutOfBounds {
        /// The rejected position.
        position: IVec3,
        /// The domain it was checked against.
        region: BlockRegion,
    },

    /// Mutation through a read-only view, or a storage mode with no
    /// implementation.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Two domains of a bulk operation differ in extent.
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Extent required by the operation.
        expected: IVec3,
        /// Extent that was supplied.
        actual: IVec3,
    },

    /// A buffer was requested with a negative extent on some axis, or with
    /// more cells than can be addressed.
    #[error("invalid volume size {0}")]
    InvalidSize(IVec3),

    /// The image of a region under a transform leaves the `i32` coordinate
    /// range.
    #[error("transformed image of {0} does not fit in i32 coordinates")]
    TransformOutOfRange(BlockRegion),

    /// The palette refused to hand out an id for a state.
    #[error(transparent)]
    Palette(#[from] PaletteError),
}
