//! B-tree index implementation.
//!
//! # Components
//! - [`BTree`] - Key-level facade rooted at address 0
//! - [`SharedBTree`] - The same behind one lock
//! - [`query`], [`insert`], [`split`], [`remove`] - The node algorithms,
//!   each taking the backend explicitly
//! - [`verify`] - Structural checker
//!
//! All traversals are iterative loops bounded by
//! [`MAX_DEPTH`](crate::common::config::MAX_DEPTH). Insert, split and
//! remove stage their page writes and apply them together, restoring the
//! touched pages if a write fails.

mod batch;
mod insert;
mod query;
mod remove;
mod shared;
mod split;
mod tree;
mod verify;

pub use insert::insert;
pub use query::query;
pub use remove::remove;
pub use shared::SharedBTree;
pub use split::split;
pub use tree::BTree;
pub use verify::{verify, TreeSummary};
