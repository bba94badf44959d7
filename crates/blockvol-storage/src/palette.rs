//! Palettes: bidirectional tables between compact [`PaletteId`] values and
//! block states.
//!
//! Two variants exist. A [`GlobalPalette`] is filled once through
//! [`register`](GlobalPalette::register), then shared read-only behind an
//! `Arc`; its ids are stable for every buffer that uses it. A
//! [`LocalPalette`] assigns ids on first use and grows for as long as it
//! lives. In both, air is always ID 0 so that zero-initialized cell memory
//! represents empty space, and an assigned id never changes meaning.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::BlockState;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier stored in every cell of a buffer (2 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaletteId(pub u16);

impl PaletteId {
    /// The id of air in every palette.
    pub const AIR: PaletteId = PaletteId(0);
}

/// Number of distinct ids a `u16` can address.
pub const MAX_PALETTE_LEN: usize = u16::MAX as usize + 1;

/// Errors raised when a palette cannot produce an id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    /// Assigning another id would exceed the palette's id space.
    #[error("palette is full (limit {limit} entries)")]
    Overflow {
        /// Maximum number of entries the palette accepts.
        limit: usize,
    },
    /// The state was already registered in a global palette.
    #[error("duplicate block state: {0}")]
    DuplicateState(String),
    /// A global palette was asked for a state it never registered.
    #[error("block state not registered in global palette: {0}")]
    Unregistered(String),
}

/// Lookup and assignment over an id table.
///
/// Methods take `&self` so a palette can sit behind a shared `Arc` handle.
/// Growable implementations use interior mutability and are therefore not
/// `Sync`; a buffer built on one cannot cross threads.
pub trait BlockPalette {
    /// The block-state type held by this palette.
    type State: BlockState;

    /// Returns the state for `id`, or `None` for an id the palette never
    /// handed out.
    fn get(&self, id: PaletteId) -> Option<Self::State>;

    /// Returns the id already assigned to `state`, without assigning.
    fn id_of(&self, state: &Self::State) -> Option<PaletteId>;

    /// Returns the id for `state`, assigning a fresh one if the palette is
    /// growable and has never seen it.
    fn get_or_assign(&self, state: &Self::State) -> Result<PaletteId, PaletteError>;

    /// Number of assigned ids.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The id table in id order, for persistence collaborators.
    fn states(&self) -> Vec<Self::State>;
}

// ---------------------------------------------------------------------------
// Shared table
// ---------------------------------------------------------------------------

/// Dense id table with O(1) lookup in both directions.
#[derive(Clone, Debug)]
struct IdTable<B> {
    /// Dense array where `index == PaletteId.0`.
    states: Vec<B>,
    /// Reverse lookup: state → ID.
    ids: FxHashMap<B, PaletteId>,
    limit: usize,
}

impl<B: BlockState> IdTable<B> {
    fn with_air(limit: usize) -> Self {
        let mut ids = FxHashMap::default();
        ids.insert(B::air(), PaletteId::AIR);
        Self {
            states: vec![B::air()],
            ids,
            limit,
        }
    }

    fn push(&mut self, state: B) -> Result<PaletteId, PaletteError> {
        if self.states.len() >= self.limit {
            return Err(PaletteError::Overflow { limit: self.limit });
        }
        let id = PaletteId(self.states.len() as u16);
        self.ids.insert(state.clone(), id);
        self.states.push(state);
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Global palette
// ---------------------------------------------------------------------------

/// Pre-populated palette with externally stable ids.
///
/// Built once, then shared read-only. [`get_or_assign`] never mutates it.
///
/// [`get_or_assign`]: BlockPalette::get_or_assign
#[derive(Clone, Debug)]
pub struct GlobalPalette<B> {
    table: IdTable<B>,
}

impl<B: BlockState> GlobalPalette<B> {
    /// Creates a palette with air pre-registered as ID 0.
    pub fn new() -> Self {
        Self {
            table: IdTable::with_air(MAX_PALETTE_LEN),
        }
    }

    /// Builds a palette registering `states` in order after air.
    ///
    /// # Errors
    ///
    /// Fails on the first duplicate or once the id space is exhausted.
    pub fn from_states(states: impl IntoIterator<Item = B>) -> Result<Self, PaletteError> {
        let mut palette = Self::new();
        for state in states {
            palette.register(state)?;
        }
        Ok(palette)
    }

    /// Registers a state and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1 (0 is air).
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::DuplicateState`] if the state already has an
    /// id, or [`PaletteError::Overflow`] if all 65 536 slots are consumed.
    pub fn register(&mut self, state: B) -> Result<PaletteId, PaletteError> {
        if self.table.ids.contains_key(&state) {
            return Err(PaletteError::DuplicateState(format!("{state:?}")));
        }
        self.table.push(state)
    }
}

impl<B: BlockState> Default for GlobalPalette<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlockState> BlockPalette for GlobalPalette<B> {
    type State = B;

    fn get(&self, id: PaletteId) -> Option<B> {
        self.table.states.get(id.0 as usize).cloned()
    }

    fn id_of(&self, state: &B) -> Option<PaletteId> {
        self.table.ids.get(state).copied()
    }

    fn get_or_assign(&self, state: &B) -> Result<PaletteId, PaletteError> {
        self.id_of(state)
            .ok_or_else(|| PaletteError::Unregistered(format!("{state:?}")))
    }

    fn len(&self) -> usize {
        self.table.states.len()
    }

    fn states(&self) -> Vec<B> {
        self.table.states.clone()
    }
}

// ---------------------------------------------------------------------------
// Local palette
// ---------------------------------------------------------------------------

/// Growable palette assigning ids in first-seen order.
///
/// Not synchronized. The `RefCell` makes the type `!Sync`, so concurrent
/// growth is rejected at compile time rather than left undefined.
/// `Clone` produces an independent deep copy.
#[derive(Clone, Debug)]
pub struct LocalPalette<B> {
    table: RefCell<IdTable<B>>,
}

impl<B: BlockState> LocalPalette<B> {
    /// Creates a palette holding only air (ID 0), able to grow to the full
    /// `u16` id space.
    pub fn new() -> Self {
        Self::with_limit(MAX_PALETTE_LEN)
    }

    /// Creates a palette that refuses to grow beyond `limit` entries.
    ///
    /// `limit` is clamped to `1..=65536`; air always occupies one entry.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            table: RefCell::new(IdTable::with_air(limit.clamp(1, MAX_PALETTE_LEN))),
        }
    }

    /// Maximum number of entries this palette accepts.
    pub fn limit(&self) -> usize {
        self.table.borrow().limit
    }
}

impl<B: BlockState> Default for LocalPalette<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlockState> BlockPalette for LocalPalette<B> {
    type State = B;

    fn get(&self, id: PaletteId) -> Option<B> {
        self.table.borrow().states.get(id.0 as usize).cloned()
    }

    fn id_of(&self, state: &B) -> Option<PaletteId> {
        self.table.borrow().ids.get(state).copied()
    }

    fn get_or_assign(&self, state: &B) -> Result<PaletteId, PaletteError> {
        if let Some(id) = self.id_of(state) {
            return Ok(id);
        }
        let id = self.table.borrow_mut().push(state.clone())?;
        tracing::trace!("LocalPalette assigned {:?} -> {}", state, id.0);
        Ok(id)
    }

    fn len(&self) -> usize {
        self.table.borrow().states.len()
    }

    fn states(&self) -> Vec<B> {
        self.table.borrow().states.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_blocks::TestBlock;

    #[test]
    fn test_air_is_id_zero() {
        let local = LocalPalette::<TestBlock>::new();
        let global = GlobalPalette::<TestBlock>::new();
        assert_eq!(local.get(PaletteId::AIR), Some(TestBlock::Air));
        assert_eq!(global.get(PaletteId::AIR), Some(TestBlock::Air));
        assert_eq!(local.get_or_assign(&TestBlock::Air), Ok(PaletteId::AIR));
        assert_eq!(global.get_or_assign(&TestBlock::Air), Ok(PaletteId::AIR));
    }

    #[test]
    fn test_local_assigns_in_first_seen_order() {
        let palette = LocalPalette::new();
        assert_eq!(palette.get_or_assign(&TestBlock::Stone), Ok(PaletteId(1)));
        assert_eq!(palette.get_or_assign(&TestBlock::Dirt), Ok(PaletteId(2)));
        assert_eq!(palette.get_or_assign(&TestBlock::Stone), Ok(PaletteId(1)));
        assert_eq!(palette.get_or_assign(&TestBlock::Grass), Ok(PaletteId(3)));
        assert_eq!(palette.len(), 4);
        assert_eq!(
            palette.states(),
            vec![TestBlock::Air, TestBlock::Stone, TestBlock::Dirt, TestBlock::Grass]
        );
    }

    #[test]
    fn test_local_ids_strictly_increase_for_new_states() {
        let palette = LocalPalette::new();
        let mut last = PaletteId::AIR;
        for n in 0..50u16 {
            let id = palette.get_or_assign(&TestBlock::Numbered(n)).unwrap();
            assert!(id > last);
            last = id;
        }
        for n in 0..50u16 {
            assert_eq!(
                palette.get_or_assign(&TestBlock::Numbered(n)),
                Ok(PaletteId(n + 1))
            );
        }
    }

    #[test]
    fn test_unknown_id_resolves_to_none() {
        let palette = LocalPalette::<TestBlock>::new();
        assert_eq!(palette.get(PaletteId(1)), None);
        assert_eq!(palette.get(PaletteId(u16::MAX)), None);
    }

    #[test]
    fn test_local_overflow_fails_fast() {
        let palette = LocalPalette::with_limit(3);
        palette.get_or_assign(&TestBlock::Stone).unwrap();
        palette.get_or_assign(&TestBlock::Dirt).unwrap();
        assert_eq!(
            palette.get_or_assign(&TestBlock::Grass),
            Err(PaletteError::Overflow { limit: 3 })
        );
        // Existing states still resolve after a refused assignment.
        assert_eq!(palette.get_or_assign(&TestBlock::Dirt), Ok(PaletteId(2)));
        assert_eq!(palette.len(), 3);
    }

    #[test]
    fn test_local_overflow_at_full_id_space() {
        let palette = LocalPalette::new();
        for n in 0..(MAX_PALETTE_LEN - 1) {
            palette.get_or_assign(&TestBlock::Numbered(n as u16)).unwrap();
        }
        assert_eq!(palette.len(), MAX_PALETTE_LEN);
        assert_eq!(
            palette.get_or_assign(&TestBlock::Stone),
            Err(PaletteError::Overflow {
                limit: MAX_PALETTE_LEN
            })
        );
    }

    #[test]
    fn test_local_clone_is_independent() {
        let original = LocalPalette::new();
        original.get_or_assign(&TestBlock::Stone).unwrap();
        let copy = original.clone();
        copy.get_or_assign(&TestBlock::Dirt).unwrap();
        assert_eq!(original.len(), 2);
        assert_eq!(copy.len(), 3);
        assert_eq!(original.id_of(&TestBlock::Dirt), None);
    }

    #[test]
    fn test_global_register_returns_sequential_ids() {
        let mut palette = GlobalPalette::new();
        assert_eq!(palette.register(TestBlock::Stone), Ok(PaletteId(1)));
        assert_eq!(palette.register(TestBlock::Dirt), Ok(PaletteId(2)));
        assert_eq!(palette.get(PaletteId(2)), Some(TestBlock::Dirt));
    }

    #[test]
    fn test_global_duplicate_rejected() {
        let mut palette = GlobalPalette::new();
        palette.register(TestBlock::Stone).unwrap();
        assert!(matches!(
            palette.register(TestBlock::Stone),
            Err(PaletteError::DuplicateState(_))
        ));
        assert!(matches!(
            palette.register(TestBlock::Air),
            Err(PaletteError::DuplicateState(_))
        ));
    }

    #[test]
    fn test_global_get_or_assign_never_grows() {
        let palette = GlobalPalette::from_states([TestBlock::Stone]).unwrap();
        assert_eq!(palette.get_or_assign(&TestBlock::Stone), Ok(PaletteId(1)));
        assert!(matches!(
            palette.get_or_assign(&TestBlock::Dirt),
            Err(PaletteError::Unregistered(_))
        ));
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn test_global_palette_is_thread_shareable() {
        static_assertions::assert_impl_all!(GlobalPalette<TestBlock>: Send, Sync);
        static_assertions::assert_not_impl_any!(LocalPalette<TestBlock>: Sync);
    }
}
