//! Storage layer - page I/O, the node codec and page allocation.
//!
//! This module handles persistent storage:
//! - [`page`] - Page, node and entry types plus the node codec
//! - [`PageStore`] - A medium pages are read from and written to
//! - [`FileStore`] / [`MemoryStore`] - The two media
//! - [`Backend`] / [`Pager`] - Node-level access with allocation and reclaim
//! - [`FreeList`] - Reclaimed addresses awaiting reuse
//! - [`IoStats`] - Page I/O counters

mod backend;
mod file_store;
mod free_list;
mod memory_store;
pub mod page;
mod page_store;
mod stats;

pub use backend::{Backend, DiskBackend, MemoryBackend, Pager};
pub use file_store::FileStore;
pub use free_list::FreeList;
pub use memory_store::MemoryStore;
pub use page_store::PageStore;
pub use stats::{IoStats, StatsSnapshot};
