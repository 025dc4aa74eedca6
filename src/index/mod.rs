//! Index layer.
//!
//! - [`btree`] - Order-32 B-tree over fixed-size pages

pub mod btree;
