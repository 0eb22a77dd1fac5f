//! Assembly structure trees whose positions share reference-counted parts.
//!
//! A [`domain::TreeArena`] holds positional nodes; each node may be bound to
//! an item shared with other positions. Bindings are counted in a
//! [`domain::SharedItemStore`], which drops an item when its last position
//! is destroyed.
//!
//! ```
//! use bomtree::domain::{ItemHandle, SharedItemStore, TreeArena};
//!
//! let store = SharedItemStore::shared();
//! let mut tree = TreeArena::new(store.clone());
//! let bolt = ItemHandle::new("bolt");
//!
//! let root = tree.create_with_item(ItemHandle::new("frame"));
//! let left = tree.append_new_child(root, bolt.clone()).unwrap();
//! tree.append_new_child(root, bolt.clone()).unwrap();
//! assert_eq!(store.borrow().count(&bolt.id()), Some(2));
//! assert_eq!(tree.level(left).unwrap(), 1);
//!
//! tree.destroy(root).unwrap();
//! assert!(store.borrow().is_empty());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
