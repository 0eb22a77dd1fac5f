//! Domain layer: assembly trees and the shared item registry
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod item;
pub mod store;

pub use arena::{PostOrderIterator, Teardown, TreeArena, TreeIterator, TreeNode, DEFAULT_QUANTITY};
pub use error::{DomainError, TreeResult};
pub use item::{ItemHandle, ItemId};
pub use store::{Release, SharedItemStore, SharedStore};
