//! Bulk iteration and mutation over a single volume.
//!
//! A [`VolumeWorker`] binds one volume (buffer or view) to one [`Cause`] and
//! walks domains in scan order on the calling thread. Operations run to
//! completion or stop at the first error; writes already applied by a
//! failed operation stay applied. Snapshot first if you need all-or-nothing.

use glam::IVec3;

use crate::error::VolumeError;
use crate::region::BlockRegion;
use crate::state::Cause;
use crate::volume::{BlockVolume, MutableBlockVolume, out_of_bounds};

/// Bulk helper bound to a volume and the cause attributed to its writes.
#[derive(Debug)]
pub struct VolumeWorker<V> {
    volume: V,
    cause: Cause,
}

impl<V: BlockVolume> VolumeWorker<V> {
    pub fn new(volume: V, cause: Cause) -> Self {
        Self { volume, cause }
    }

    pub fn volume(&self) -> &V {
        &self.volume
    }

    /// The cause forwarded with every write.
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn into_inner(self) -> V {
        self.volume
    }

    /// Calls `visitor(pos, state)` for each position of `domain`, in order.
    ///
    /// Stops at the first error from a read or from the visitor.
    pub fn for_each<E, F>(
        &self,
        domain: impl IntoIterator<Item = IVec3>,
        mut visitor: F,
    ) -> Result<(), E>
    where
        E: From<VolumeError>,
        F: FnMut(IVec3, V::State) -> Result<(), E>,
    {
        for pos in domain {
            let state = self.volume.get_block(pos)?;
            visitor(pos, state)?;
        }
        Ok(())
    }

    /// Folds every cell of `domain` into an accumulator, in scan order.
    pub fn reduce<A, F>(
        &self,
        domain: impl IntoIterator<Item = IVec3>,
        init: A,
        mut f: F,
    ) -> Result<A, VolumeError>
    where
        F: FnMut(A, IVec3, V::State) -> A,
    {
        let mut acc = init;
        for pos in domain {
            acc = f(acc, pos, self.volume.get_block(pos)?);
        }
        Ok(acc)
    }

    /// Copies `src` from the bound volume into `dst`, placing `src.min()` at
    /// `dst_origin`. Returns the number of cells written.
    ///
    /// Both domains are checked before the first write.
    ///
    /// # Errors
    ///
    /// [`VolumeError::OutOfBounds`] if `src` is not inside the bound volume,
    /// [`VolumeError::SizeMismatch`] if the destination box does not fit in
    /// `dst`. Errors from `dst` writes stop the copy part-way.
    pub fn copy_between<D>(
        &self,
        src: BlockRegion,
        dst: &mut D,
        dst_origin: IVec3,
    ) -> Result<usize, VolumeError>
    where
        D: MutableBlockVolume<State = V::State>,
    {
        let own = self.volume.region();
        if !own.contains_region(&src) {
            let offending = if own.contains(src.min()) {
                src.max() - IVec3::ONE
            } else {
                src.min()
            };
            return Err(out_of_bounds(offending, own));
        }

        let available = dst.region();
        let target = BlockRegion::from_origin_size(dst_origin, src.size()).ok_or(
            VolumeError::SizeMismatch {
                expected: src.size(),
                actual: IVec3::ZERO,
            },
        )?;
        if !available.contains_region(&target) {
            return Err(VolumeError::SizeMismatch {
                expected: src.size(),
                actual: available.intersection(&target).size(),
            });
        }

        let offset = dst_origin - src.min();
        let mut written = 0;
        for pos in src.iter() {
            let state = self.volume.get_block(pos)?;
            dst.set_block(pos + offset, state, Some(&self.cause))?;
            written += 1;
        }
        tracing::debug!(
            "worker copy {} -> {} ({} cells, cause={:?})",
            src,
            target,
            written,
            self.cause
        );
        Ok(written)
    }

    /// Combines this volume with `other` cell by cell and writes the result
    /// into `dst`. Cells are paired by offset from each volume's minimum
    /// corner, so the three volumes may live at different positions.
    ///
    /// # Errors
    ///
    /// [`VolumeError::SizeMismatch`] unless all three volumes have the same
    /// extent.
    pub fn merge<S, D, F>(&self, other: &S, dst: &mut D, mut merger: F) -> Result<usize, VolumeError>
    where
        S: BlockVolume,
        D: MutableBlockVolume,
        F: FnMut(V::State, S::State) -> D::State,
    {
        let size = self.volume.block_size();
        for actual in [other.block_size(), dst.block_size()] {
            if actual != size {
                return Err(VolumeError::SizeMismatch {
                    expected: size,
                    actual,
                });
            }
        }

        let own_min = self.volume.block_min();
        let other_offset = other.block_min() - own_min;
        let dst_offset = dst.block_min() - own_min;
        let mut written = 0;
        for pos in self.volume.region().iter() {
            let a = self.volume.get_block(pos)?;
            let b = other.get_block(pos + other_offset)?;
            dst.set_block(pos + dst_offset, merger(a, b), Some(&self.cause))?;
            written += 1;
        }
        tracing::debug!("worker merge {} cells, cause={:?}", written, self.cause);
        Ok(written)
    }
}

impl<V: MutableBlockVolume> VolumeWorker<V> {
    /// Sets every position of `domain` to `state`. Returns the number of
    /// positions visited.
    pub fn fill(
        &mut self,
        domain: impl IntoIterator<Item = IVec3>,
        state: V::State,
    ) -> Result<usize, VolumeError> {
        let mut visited = 0;
        for pos in domain {
            if let Err(err) = self.volume.set_block(pos, state.clone(), Some(&self.cause)) {
                tracing::warn!("worker fill stopped after {} cells: {}", visited, err);
                return Err(err);
            }
            visited += 1;
        }
        tracing::debug!("worker fill {} cells with {:?}, cause={:?}", visited, state, self.cause);
        Ok(visited)
    }

    /// Replaces each cell of `domain` with `f(pos, current)`. Returns the
    /// number of cells whose value changed.
    pub fn map<F>(
        &mut self,
        domain: impl IntoIterator<Item = IVec3>,
        mut f: F,
    ) -> Result<usize, VolumeError>
    where
        F: FnMut(IVec3, V::State) -> V::State,
    {
        let mut changed = 0;
        for pos in domain {
            let next = f(pos, self.volume.get_block(pos)?);
            if self.volume.set_block(pos, next, Some(&self.cause))? {
                changed += 1;
            }
        }
        tracing::debug!("worker map changed {} cells, cause={:?}", changed, self.cause);
        Ok(changed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::buffer::VolumeBuffer;
    use crate::palette::{GlobalPalette, LocalPalette};
    use crate::test_blocks::TestBlock;

    type Buffer = VolumeBuffer<LocalPalette<TestBlock>>;

    fn buffer(origin: IVec3, size: IVec3) -> Buffer {
        VolumeBuffer::new(Arc::new(LocalPalette::new()), origin, size).unwrap()
    }

    fn cause() -> Cause {
        Cause::of("test", "worker")
    }

    #[test]
    fn test_fill_sets_domain_and_nothing_else() {
        let mut volume = buffer(IVec3::ZERO, IVec3::splat(4));
        let domain = BlockRegion::new(IVec3::new(1, 0, 1), IVec3::new(3, 2, 4));
        let count = volume.worker(cause()).fill(domain, TestBlock::Stone).unwrap();
        assert_eq!(count, domain.volume());

        for pos in volume.region().iter() {
            let expected = if domain.contains(pos) {
                TestBlock::Stone
            } else {
                TestBlock::Air
            };
            assert_eq!(volume.get_block(pos).unwrap(), expected, "at {pos}");
        }
    }

    #[test]
    fn test_fill_arbitrary_domain() {
        let mut volume = buffer(IVec3::ZERO, IVec3::splat(3));
        let diagonal = (0..3).map(IVec3::splat);
        volume.worker(cause()).fill(diagonal, TestBlock::Dirt).unwrap();
        assert_eq!(volume.get_block(IVec3::ONE).unwrap(), TestBlock::Dirt);
        assert_eq!(volume.get_block(IVec3::new(1, 0, 0)).unwrap(), TestBlock::Air);
    }

    #[test]
    fn test_fill_partial_failure_is_not_rolled_back() {
        let mut volume = buffer(IVec3::ZERO, IVec3::new(2, 1, 1));
        let domain = [IVec3::new(0, 0, 0), IVec3::new(5, 0, 0), IVec3::new(1, 0, 0)];
        let result = volume.worker(cause()).fill(domain, TestBlock::Grass);
        assert!(matches!(result, Err(VolumeError::OutOfBounds { .. })));
        assert_eq!(volume.get_block(IVec3::ZERO).unwrap(), TestBlock::Grass);
        assert_eq!(volume.get_block(IVec3::new(1, 0, 0)).unwrap(), TestBlock::Air);
    }

    #[test]
    fn test_fill_through_read_only_view_fails() {
        let volume = buffer(IVec3::ZERO, IVec3::splat(2));
        let mut worker = volume.unmodifiable_view().into_worker(cause());
        assert!(matches!(
            worker.fill(volume.region(), TestBlock::Stone),
            Err(VolumeError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_for_each_visits_in_scan_order() {
        let mut volume = buffer(IVec3::new(5, 5, 5), IVec3::splat(2));
        volume.set_block(IVec3::new(6, 5, 5), TestBlock::Stone, None).unwrap();
        let worker = volume.worker(cause());

        let mut seen = Vec::new();
        worker
            .for_each(worker.volume().region(), |pos, state| -> Result<(), VolumeError> {
                seen.push((pos, state));
                Ok(())
            })
            .unwrap();
        let positions: Vec<IVec3> = seen.iter().map(|(p, _)| *p).collect();
        let expected: Vec<IVec3> = BlockRegion::new(IVec3::splat(5), IVec3::splat(7)).iter().collect();
        assert_eq!(positions, expected);
        assert_eq!(seen[1].1, TestBlock::Stone);
    }

    #[derive(Debug)]
    enum VisitError {
        Volume(VolumeError),
        FoundStone(IVec3),
    }

    impl From<VolumeError> for VisitError {
        fn from(err: VolumeError) -> Self {
            VisitError::Volume(err)
        }
    }

    #[test]
    fn test_for_each_stops_on_visitor_error() {
        let mut volume = buffer(IVec3::ZERO, IVec3::splat(3));
        volume.set_block(IVec3::new(2, 0, 0), TestBlock::Stone, None).unwrap();
        let worker = volume.worker(cause());

        let mut visited = 0;
        let result = worker.for_each(BlockRegion::new(IVec3::ZERO, IVec3::splat(3)), |pos, state| {
            visited += 1;
            if state == TestBlock::Stone {
                return Err(VisitError::FoundStone(pos));
            }
            Ok(())
        });
        assert!(matches!(result, Err(VisitError::FoundStone(p)) if p == IVec3::new(2, 0, 0)));
        assert_eq!(visited, 3);

        let outside = worker.for_each(
            [IVec3::splat(9)],
            |_, _| -> Result<(), VisitError> { Ok(()) },
        );
        assert!(matches!(outside, Err(VisitError::Volume(VolumeError::OutOfBounds { .. }))));
    }

    #[test]
    fn test_reduce_counts_states() {
        let mut volume = buffer(IVec3::ZERO, IVec3::splat(4));
        volume
            .worker(cause())
            .fill(BlockRegion::new(IVec3::ZERO, IVec3::new(4, 1, 4)), TestBlock::Stone)
            .unwrap();
        let worker = volume.worker(cause());
        let stones = worker
            .reduce(worker.volume().region(), 0usize, |n, _, state| {
                n + usize::from(state == TestBlock::Stone)
            })
            .unwrap();
        assert_eq!(stones, 16);
    }

    #[test]
    fn test_map_rewrites_and_counts_changes() {
        let mut volume = buffer(IVec3::ZERO, IVec3::new(4, 1, 1));
        volume.set_block(IVec3::new(1, 0, 0), TestBlock::Dirt, None).unwrap();
        let changed = volume
            .worker(cause())
            .map(BlockRegion::new(IVec3::ZERO, IVec3::new(4, 1, 1)), |_, state| match state {
                TestBlock::Dirt => TestBlock::Grass,
                other => other,
            })
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(volume.get_block(IVec3::new(1, 0, 0)).unwrap(), TestBlock::Grass);
    }

    #[test]
    fn test_copy_between_preserves_layout() {
        let mut src = buffer(IVec3::ZERO, IVec3::splat(4));
        for (i, pos) in src.region().iter().enumerate() {
            src.set_block(pos, TestBlock::Numbered(i as u16), None).unwrap();
        }
        let mut dst = buffer(IVec3::new(100, 0, 0), IVec3::splat(3));
        let region = BlockRegion::new(IVec3::ONE, IVec3::splat(3));

        let written = src
            .worker(cause())
            .copy_between(region, &mut dst, IVec3::new(101, 1, 1))
            .unwrap();
        assert_eq!(written, 8);
        for pos in region.iter() {
            let copied = dst.get_block(pos + IVec3::new(100, 0, 0)).unwrap();
            assert_eq!(copied, src.get_block(pos).unwrap());
        }
        assert_eq!(dst.get_block(IVec3::new(100, 0, 0)).unwrap(), TestBlock::Air);
    }

    #[test]
    fn test_copy_between_rejects_short_destination() {
        let mut src = buffer(IVec3::ZERO, IVec3::splat(4));
        let mut dst = buffer(IVec3::ZERO, IVec3::splat(2));
        let before = dst.cells().to_vec();
        let result = src.worker(cause()).copy_between(
            BlockRegion::new(IVec3::ZERO, IVec3::splat(3)),
            &mut dst,
            IVec3::ZERO,
        );
        match result {
            Err(VolumeError::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, IVec3::splat(3));
                assert_eq!(actual, IVec3::splat(2));
            }
            other => panic!("expected SizeMismatch, got {other:?}"),
        }
        assert_eq!(dst.cells(), before.as_slice());
    }

    #[test]
    fn test_copy_between_rejects_source_outside() {
        let mut src = buffer(IVec3::ZERO, IVec3::splat(2));
        let mut dst = buffer(IVec3::ZERO, IVec3::splat(8));
        let result = src.worker(cause()).copy_between(
            BlockRegion::new(IVec3::ONE, IVec3::splat(3)),
            &mut dst,
            IVec3::ZERO,
        );
        assert!(matches!(result, Err(VolumeError::OutOfBounds { .. })));
    }

    #[test]
    fn test_merge_combines_offset_volumes() {
        let mut a = buffer(IVec3::ZERO, IVec3::new(2, 1, 1));
        let mut b = buffer(IVec3::new(10, 10, 10), IVec3::new(2, 1, 1));
        a.set_block(IVec3::ZERO, TestBlock::Stone, None).unwrap();
        b.set_block(IVec3::new(11, 10, 10), TestBlock::Dirt, None).unwrap();
        let mut out = buffer(IVec3::new(-5, 0, 0), IVec3::new(2, 1, 1));

        let written = a
            .worker(cause())
            .merge(&b, &mut out, |x, y| if x == TestBlock::Air { y } else { x })
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(out.get_block(IVec3::new(-5, 0, 0)).unwrap(), TestBlock::Stone);
        assert_eq!(out.get_block(IVec3::new(-4, 0, 0)).unwrap(), TestBlock::Dirt);
    }

    #[test]
    fn test_merge_size_mismatch() {
        let mut a = buffer(IVec3::ZERO, IVec3::splat(2));
        let b = buffer(IVec3::ZERO, IVec3::splat(3));
        let mut out = buffer(IVec3::ZERO, IVec3::splat(2));
        let result = a.worker(cause()).merge(&b, &mut out, |x, _| x);
        assert!(matches!(result, Err(VolumeError::SizeMismatch { .. })));
    }

    #[test]
    fn test_worker_over_global_palette_view() {
        let palette = Arc::new(GlobalPalette::from_states([TestBlock::Stone]).unwrap());
        let mut volume = VolumeBuffer::new(palette, IVec3::ZERO, IVec3::splat(4)).unwrap();
        let view = volume.block_view(IVec3::ONE, IVec3::splat(3));
        let mut worker = view.into_worker(cause());
        let region = worker.volume().region();
        assert_eq!(worker.fill(region, TestBlock::Stone).unwrap(), 8);
        assert_eq!(worker.cause().root().map(|e| e.name()), Some("test"));
        drop(worker);
        assert_eq!(volume.get_block(IVec3::splat(2)).unwrap(), TestBlock::Stone);
        assert_eq!(volume.get_block(IVec3::ZERO).unwrap(), TestBlock::Air);
    }
}
