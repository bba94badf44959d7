//! The opaque values stored in a volume and the justification that travels
//! with every mutation.

use std::any::Any;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A block-state value supplied by an external catalog.
///
/// Storage compares states for equality and hashes them for palette lookups,
/// but never constructs or inspects them beyond the well-known [`air`] state
/// returned for unresolvable cells.
///
/// [`air`]: BlockState::air
pub trait BlockState: Clone + Eq + Hash + fmt::Debug {
    /// The empty state. Always palette id 0.
    fn air() -> Self;
}

/// One named entry of a [`Cause`].
#[derive(Clone)]
pub struct CauseEntry {
    name: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl CauseEntry {
    /// Name the entry was recorded under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The opaque payload.
    pub fn value(&self) -> &(dyn Any + Send + Sync) {
        &*self.value
    }
}

impl fmt::Debug for CauseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CauseEntry").field(&self.name).finish()
    }
}

/// Ordered, caller-supplied justification for a mutation or a batch.
///
/// Volumes and workers forward a cause unchanged to whatever audits changes;
/// they never branch on its contents. The first entry is the root.
#[derive(Clone, Debug, Default)]
pub struct Cause {
    entries: Vec<CauseEntry>,
}

impl Cause {
    /// A cause with a single root entry.
    pub fn of<T: Any + Send + Sync>(name: impl Into<String>, value: T) -> Self {
        Self::default().with(name, value)
    }

    /// Appends an entry after the existing ones.
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.entries.push(CauseEntry {
            name: name.into(),
            value: Arc::new(value),
        });
        self
    }

    /// The first entry, if any.
    pub fn root(&self) -> Option<&CauseEntry> {
        self.entries.first()
    }

    /// The first payload of type `T`, searching in order.
    pub fn first<T: Any>(&self) -> Option<&T> {
        self.entries
            .iter()
            .find_map(|entry| entry.value.downcast_ref::<T>())
    }

    /// All entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &CauseEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
