//! Demonstrations of block volume storage, one function per feature.

use std::sync::Arc;

use blockvol_config::{FillPattern, VolumeConfig};
use blockvol_storage::{
    Axis, BlockPalette, BlockRegion, BlockState, BlockVolume, Cause, DiscreteTransform, IVec3,
    MutableBlockVolume, StorageType, VolumeBuffer, VolumeError, VolumeWorker,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{info, warn};

/// Block states used by the demo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DemoBlock {
    Air,
    Stone,
    Dirt,
    Grass,
    Ore,
}

impl DemoBlock {
    /// Every non-air state, in registration order for a global palette.
    pub const SOLID: [DemoBlock; 4] = [
        DemoBlock::Stone,
        DemoBlock::Dirt,
        DemoBlock::Grass,
        DemoBlock::Ore,
    ];
}

impl BlockState for DemoBlock {
    fn air() -> Self {
        DemoBlock::Air
    }
}

/// Runs every demonstration against a fresh buffer on `palette`.
pub fn run<P>(palette: Arc<P>, config: &VolumeConfig) -> Result<(), VolumeError>
where
    P: BlockPalette<State = DemoBlock>,
{
    let origin = IVec3::from_array(config.origin);
    let size = IVec3::from_array(config.size);
    let mut buffer = VolumeBuffer::new(palette, origin, size)?;

    let filled = apply_fill(&mut buffer, config.fill, config.seed)?;
    info!(
        "Filled {} with {:?}: {} of {} cells solid, palette holds {} states",
        buffer.region(),
        config.fill,
        filled,
        buffer.region().volume(),
        buffer.palette().len(),
    );

    demonstrate_rotated_view(&buffer)?;
    demonstrate_snapshot_and_downsize(&mut buffer)?;
    demonstrate_copies(&buffer)?;
    Ok(())
}

/// Populates `buffer` according to `pattern`. Returns the number of solid
/// cells afterwards.
pub fn apply_fill<P>(
    buffer: &mut VolumeBuffer<P>,
    pattern: FillPattern,
    seed: u64,
) -> Result<usize, VolumeError>
where
    P: BlockPalette<State = DemoBlock>,
{
    let region = buffer.region();
    let min = region.min();
    let max = region.max();
    let mut worker = buffer.worker(Cause::of("fill", pattern));

    match pattern {
        FillPattern::Empty => {}
        FillPattern::Floor { height } => {
            let top = min.y + height.clamp(0, region.size().y);
            worker.fill(
                BlockRegion::new(min, IVec3::new(max.x, top, max.z)),
                DemoBlock::Stone,
            )?;
            if top > min.y {
                let surface =
                    BlockRegion::new(IVec3::new(min.x, top - 1, min.z), IVec3::new(max.x, top, max.z));
                worker.fill(surface, DemoBlock::Grass)?;
            }
        }
        FillPattern::Scatter { density } => {
            let probability = f64::from(density);
            let probability = if probability.is_nan() {
                0.0
            } else {
                probability.clamp(0.0, 1.0)
            };
            let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
            worker.map(region, |_, current| {
                if rng.gen_bool(probability) {
                    DemoBlock::Ore
                } else {
                    current
                }
            })?;
        }
    }

    count_solid(worker.volume(), region)
}

/// Number of non-air cells of `domain`.
pub fn count_solid<V>(volume: V, domain: BlockRegion) -> Result<usize, VolumeError>
where
    V: BlockVolume<State = DemoBlock>,
{
    VolumeWorker::new(volume, Cause::of("demo", "count")).reduce(domain, 0, |n, _, state| {
        if state == DemoBlock::Air { n } else { n + 1 }
    })
}

/// Rotates the volume a quarter turn about y without copying any cells.
fn demonstrate_rotated_view<P>(buffer: &VolumeBuffer<P>) -> Result<(), VolumeError>
where
    P: BlockPalette<State = DemoBlock>,
{
    info!("Starting rotated view demonstration");

    let region = buffer.region();
    let rotation = DiscreteTransform::rotation_around_min(Axis::Y, 1, &region);
    let mut rotated = buffer.unmodifiable_view().transform(rotation)?;
    let rotated_region = rotated.region();

    let before = count_solid(buffer, region)?;
    let after = count_solid(&rotated, rotated_region)?;
    info!(
        "Rotated {} -> {}: {} solid cells before, {} after",
        region, rotated_region, before, after
    );

    match rotated.set_block(rotated_region.min(), DemoBlock::Dirt, None) {
        Err(e) => info!("Read-only view rejected write: {}", e),
        Ok(_) => warn!("Read-only view accepted a write"),
    }

    info!("Rotated view demonstration completed successfully");
    Ok(())
}

/// Freezes the volume, then digs a pit through a downsized view and compares.
fn demonstrate_snapshot_and_downsize<P>(buffer: &mut VolumeBuffer<P>) -> Result<(), VolumeError>
where
    P: BlockPalette<State = DemoBlock>,
{
    info!("Starting snapshot and downsize demonstration");

    let snapshot = buffer.to_immutable();
    let region = buffer.region();
    let pit_min = region.min() + region.size() / 4;
    let pit_max = region.max() - region.size() / 4;

    let (pit, dug) = {
        let view = buffer.block_view(pit_min, pit_max);
        let pit = view.region();
        let mut worker = view.into_worker(Cause::of("demo", "dig"));
        (pit, worker.map(pit, |_, _| DemoBlock::Air)?)
    };
    info!(
        "Dug {} cells out of {} through a downsized view (snapshot still shared: {})",
        dug,
        pit,
        snapshot.is_shared(),
    );

    let mut diff = snapshot.to_mutable();
    let changed = VolumeWorker::new(&snapshot, Cause::of("demo", "diff")).merge(
        &*buffer,
        &mut diff,
        |old, new| if old == new { DemoBlock::Air } else { DemoBlock::Dirt },
    )?;
    info!(
        "Snapshot kept {} solid cells, live buffer has {}, {} of {} cells differ",
        count_solid(&snapshot, region)?,
        count_solid(&*buffer, region)?,
        count_solid(&diff, region)?,
        changed,
    );

    info!("Snapshot and downsize demonstration completed successfully");
    Ok(())
}

/// Copies the volume in each storage mode and pastes a corner into the copy.
fn demonstrate_copies<P>(buffer: &VolumeBuffer<P>) -> Result<(), VolumeError>
where
    P: BlockPalette<State = DemoBlock>,
{
    info!("Starting copy demonstration");

    match buffer.copy(StorageType::ThreadSafe) {
        Err(e) => info!("Thread-safe copy unavailable: {}", e),
        Ok(_) => warn!("Thread-safe copy unexpectedly succeeded"),
    }

    let mut copy = buffer.copy(StorageType::Standard)?;
    let region = buffer.region();
    let corner = BlockRegion::new(region.min(), region.min() + region.size() / 2);
    let pasted = VolumeWorker::new(buffer, Cause::of("demo", "paste")).copy_between(
        corner,
        &mut copy,
        region.max() - corner.size(),
    )?;
    info!(
        "Pasted {} cells into the copy; original has {} solid cells, copy has {}",
        pasted,
        count_solid(buffer, region)?,
        count_solid(&copy, region)?,
    );

    info!("Copy demonstration completed successfully");
    Ok(())
}
