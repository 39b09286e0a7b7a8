//! An in-memory, ordered key→value B+ tree with copy-on-write structural
//! sharing: cloning a [`Tree`] is O(1), and a write path only ever clones
//! the nodes it actually touches.
//!
//! ```
//! use cow_btree::Tree;
//!
//! let mut t: Tree<i32, &str> = Tree::new();
//! t.set(1, "one").unwrap();
//! t.set(2, "two").unwrap();
//!
//! let snapshot = t.clone(); // O(1): shares every node with `t`
//! t.set(3, "three").unwrap(); // only the touched path is copied
//!
//! assert_eq!(snapshot.size(), 2);
//! assert_eq!(t.size(), 3);
//! ```
//!
//! # Layout
//!
//! - [`node`] — the leaf/internal node representation and per-node
//!   insert/delete/range logic.
//! - [`comparator`] — the pluggable [`Comparator`](comparator::Comparator)
//!   trait trees are parameterized over.
//! - [`tree`] — the public [`Tree`] container.
//! - [`iter`] / [`cursor`] — read-only traversal.
//! - [`diff`] / [`setops`] — two-tree operations (diff, union, intersect,
//!   subtract).
//! - [`bulk`] — building a tree directly from a sorted run of pairs.
//! - [`error`] — the crate's `Error`/`ErrorKind`/`Result`.

pub mod bulk;
pub mod comparator;
pub mod cursor;
pub mod diff;
pub mod error;
mod iter;
mod node;
pub mod setops;
pub mod tree;

pub use comparator::{
    CaseComparator, Comparator, DefaultComparator, FloatComparator, Key, OrdComparator, StrictFloatComparator,
};
pub use cursor::Cursor;
pub use diff::{diff_against, for_each_key_not_in, for_each_shared_key, DiffEntry};
pub use error::{Error, ErrorKind, Result};
pub use iter::{AscIter, DescIter};
pub use node::EditAction;
pub use setops::{intersect, subtract, union};
pub use tree::{Tree, DEFAULT_NODE_SIZE, MAX_NODE_SIZE, MIN_NODE_SIZE};

#[cfg(feature = "init_env_logger")]
pub fn init_env_logger() {
    let _ = env_logger::try_init();
}
