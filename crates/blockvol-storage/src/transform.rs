//! Exact integer transforms for block coordinates.
//!
//! A [`DiscreteTransform`] is a signed axis permutation (quarter-turn
//! rotations and mirrors) followed by a translation. The linear part is
//! orthogonal with entries in `{-1, 0, 1}`, so its inverse is its transpose
//! and every transform is a bijection on the integer lattice.
//!
//! Arithmetic is carried out in `i64`. Translations may exceed the `i32`
//! range (turning a structure near the edge of the world needs one), and
//! only mapped positions are narrowed back, with a checked conversion.

use glam::{I64Vec3, IVec3};
use serde::{Deserialize, Serialize};

use crate::region::BlockRegion;

/// A coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rigid integer transform: `p ↦ rows · p + translation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteTransform {
    /// Rows of the linear part. Each row and column has exactly one non-zero
    /// entry, either 1 or -1.
    rows: [IVec3; 3],
    translation: I64Vec3,
}

impl DiscreteTransform {
    /// The transform that leaves every position in place.
    pub const IDENTITY: DiscreteTransform = DiscreteTransform {
        rows: [IVec3::X, IVec3::Y, IVec3::Z],
        translation: I64Vec3::ZERO,
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Pure translation by `offset`.
    pub fn from_translation(offset: IVec3) -> Self {
        Self {
            translation: offset.as_i64vec3(),
            ..Self::IDENTITY
        }
    }

    /// Rotation by `quarter_turns` × 90° about `axis`, counter-clockwise when
    /// looking down the positive axis. Negative turns rotate clockwise.
    pub fn rotation(axis: Axis, quarter_turns: i32) -> Self {
        let (cos, sin) = match quarter_turns.rem_euclid(4) {
            0 => (1, 0),
            1 => (0, 1),
            2 => (-1, 0),
            _ => (0, -1),
        };
        let rows = match axis {
            Axis::X => [
                IVec3::X,
                IVec3::new(0, cos, -sin),
                IVec3::new(0, sin, cos),
            ],
            Axis::Y => [
                IVec3::new(cos, 0, sin),
                IVec3::Y,
                IVec3::new(-sin, 0, cos),
            ],
            Axis::Z => [
                IVec3::new(cos, -sin, 0),
                IVec3::new(sin, cos, 0),
                IVec3::Z,
            ],
        };
        Self {
            rows,
            translation: I64Vec3::ZERO,
        }
    }

    /// Reflection that negates the given axis.
    pub fn mirror(axis: Axis) -> Self {
        let mut rows = Self::IDENTITY.rows;
        match axis {
            Axis::X => rows[0] = -rows[0],
            Axis::Y => rows[1] = -rows[1],
            Axis::Z => rows[2] = -rows[2],
        }
        Self {
            rows,
            translation: I64Vec3::ZERO,
        }
    }

    /// Rotation about `axis` that maps `region` onto a region with the same
    /// lower corner.
    ///
    /// Useful for turning a structure in place: the rotated blocks occupy
    /// the box starting where the original started, with the extents swapped
    /// as the rotation requires. The image may still leave the `i32` range
    /// when the swapped extents do not fit; [`apply_region`](Self::apply_region)
    /// reports that.
    pub fn rotation_around_min(axis: Axis, quarter_turns: i32, region: &BlockRegion) -> Self {
        let rotation = Self::rotation(axis, quarter_turns);
        let min = region.min().as_i64vec3();
        let mut rotated_min = rotation.linear(min);
        if !region.is_empty() {
            let far = region.max().as_i64vec3() - I64Vec3::ONE;
            rotated_min = rotated_min.min(rotation.linear(far));
        }
        Self {
            translation: min - rotated_min,
            ..rotation
        }
    }

    /// The linear part applied to `v`, without translation.
    fn linear(&self, v: I64Vec3) -> I64Vec3 {
        I64Vec3::new(
            self.rows[0].as_i64vec3().dot(v),
            self.rows[1].as_i64vec3().dot(v),
            self.rows[2].as_i64vec3().dot(v),
        )
    }

    /// Maps a position, or `None` if the image leaves the `i32` range.
    pub fn apply(&self, pos: IVec3) -> Option<IVec3> {
        let image = self.linear(pos.as_i64vec3()) + self.translation;
        Some(IVec3::new(
            i32::try_from(image.x).ok()?,
            i32::try_from(image.y).ok()?,
            i32::try_from(image.z).ok()?,
        ))
    }

    /// Image of a region, or `None` if it does not fit in `i32` coordinates.
    /// Exact because the map is a lattice bijection that sends boxes to boxes.
    pub fn apply_region(&self, region: &BlockRegion) -> Option<BlockRegion> {
        if region.is_empty() {
            let corner = self.apply(region.min())?;
            return Some(BlockRegion::new(corner, corner));
        }
        let a = self.apply(region.min())?;
        let b = self.apply(region.max() - IVec3::ONE)?;
        BlockRegion::from_corners_inclusive(a, b)
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &DiscreteTransform) -> DiscreteTransform {
        // Row i of (next · self) is Σ_k next[i][k] · self.row[k].
        let compose_row = |row: IVec3| {
            self.rows[0] * row.x + self.rows[1] * row.y + self.rows[2] * row.z
        };
        DiscreteTransform {
            rows: [
                compose_row(next.rows[0]),
                compose_row(next.rows[1]),
                compose_row(next.rows[2]),
            ],
            translation: next.linear(self.translation) + next.translation,
        }
    }

    /// The exact inverse.
    pub fn inverse(&self) -> DiscreteTransform {
        let [r0, r1, r2] = self.rows;
        let transposed = DiscreteTransform {
            rows: [
                IVec3::new(r0.x, r1.x, r2.x),
                IVec3::new(r0.y, r1.y, r2.y),
                IVec3::new(r0.z, r1.z, r2.z),
            ],
            translation: I64Vec3::ZERO,
        };
        DiscreteTransform {
            translation: -transposed.linear(self.translation),
            ..transposed
        }
    }

    /// Translation component.
    pub fn translation(&self) -> I64Vec3 {
        self.translation
    }

    /// Returns `true` if this is the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for DiscreteTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
