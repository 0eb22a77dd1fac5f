//! Shared item handles.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Identity of an item: the address of its payload.
///
/// Two handles have the same id exactly when they point at the same payload.
/// Ids are only meaningful while the payload is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(usize);

/// Reference-counted handle to an item shared between tree positions.
///
/// Cloning the handle does not register anything; binding it to a node does
/// (through [`crate::domain::SharedItemStore::acquire`]).
pub struct ItemHandle<T>(Rc<T>);

impl<T> ItemHandle<T> {
    pub fn new(item: T) -> Self {
        Self(Rc::new(item))
    }

    pub fn id(&self) -> ItemId {
        ItemId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to this payload, store-held ones included.
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl<T> Clone for ItemHandle<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Deref for ItemHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for ItemHandle<T> {
    fn from(item: T) -> Self {
        Self::new(item)
    }
}

impl<T: fmt::Debug> fmt::Debug for ItemHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemHandle").field(&*self.0).finish()
    }
}
