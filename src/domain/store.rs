//! Reference-counting registry deciding when shared items are destroyed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{instrument, trace, warn};

use crate::domain::item::{ItemHandle, ItemId};

/// Store handle shared by every arena that binds items from the same pool.
pub type SharedStore<T> = Rc<RefCell<SharedItemStore<T>>>;

/// Outcome of [`SharedItemStore::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Other positions still reference the item.
    Retained { remaining: usize },
    /// The last reference went away; the store dropped the item.
    Destroyed,
    /// The item was never registered. Its handle is dropped, not counted.
    Untracked,
}

impl Release {
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Release::Destroyed)
    }
}

struct StoreEntry<T> {
    item: ItemHandle<T>,
    count: usize,
}

/// Maps item identity to the number of live tree positions bound to it.
///
/// Every registered item has a count of at least one; an entry whose count
/// reaches zero is removed together with the store's own handle.
pub struct SharedItemStore<T> {
    entries: HashMap<ItemId, StoreEntry<T>>,
}

impl<T> Default for SharedItemStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedItemStore<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create an empty store wrapped for sharing between arenas.
    pub fn shared() -> SharedStore<T> {
        Rc::new(RefCell::new(Self::new()))
    }

    #[instrument(level = "trace", skip_all, fields(item = ?item.id()))]
    pub fn acquire(&mut self, item: &ItemHandle<T>) {
        let entry = self
            .entries
            .entry(item.id())
            .or_insert_with(|| StoreEntry {
                item: item.clone(),
                count: 0,
            });
        entry.count += 1;
        trace!(count = entry.count, "acquired");
    }

    /// Give back one reference. The passed handle is consumed in every case.
    ///
    /// Freed handles are dropped before this returns. When the store sits in
    /// a [`SharedStore`] and payload destructors may use it again, call
    /// [`release_deferred`](Self::release_deferred) and drop the handles
    /// after the borrow ends.
    pub fn release(&mut self, item: ItemHandle<T>) -> Release {
        let (outcome, _freed) = self.release_deferred(item);
        outcome
    }

    /// Give back one reference without dropping anything.
    ///
    /// Returns the outcome together with every handle the store let go of:
    /// the passed one and, on [`Release::Destroyed`], the store's own.
    #[instrument(level = "trace", skip_all, fields(item = ?item.id()))]
    pub fn release_deferred(&mut self, item: ItemHandle<T>) -> (Release, Vec<ItemHandle<T>>) {
        let id = item.id();
        let Some(entry) = self.entries.get_mut(&id) else {
            warn!(item = ?id, "released item is not registered, dropping it");
            return (Release::Untracked, vec![item]);
        };

        entry.count -= 1;
        if entry.count >= 1 {
            trace!(remaining = entry.count, "retained");
            return (
                Release::Retained {
                    remaining: entry.count,
                },
                vec![item],
            );
        }

        let mut freed = vec![item];
        freed.extend(self.entries.remove(&id).map(|e| e.item));
        trace!("destroyed");
        (Release::Destroyed, freed)
    }

    /// Live reference count, `None` if the item is not registered.
    pub fn count(&self, id: &ItemId) -> Option<usize> {
        self.entries.get(id).map(|e| e.count)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered items with their live counts, in no particular order.
    pub fn links(&self) -> impl Iterator<Item = (&ItemHandle<T>, usize)> {
        self.entries.values().map(|e| (&e.item, e.count))
    }
}

impl<T> fmt::Debug for SharedItemStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(id, e)| (id, e.count)))
            .finish()
    }
}
