//! pagedex - A disk-resident B-tree index from `u64` keys to `i64` record
//! pointers.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            pagedex                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                  Index Layer (index/)                    │   │
//! │  │     BTree / SharedBTree  →  query | insert | remove      │   │
//! │  │                 split | verify                           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Backend (storage/backend)                 │   │
//! │  │      Pager<S>: new_node | read | write | remove_node     │   │
//! │  │           FreeList (FIFO reuse) + IoStats                │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/page)                │   │
//! │  │   Node ⇄ Page codec (752 bytes)  over  PageStore:        │   │
//! │  │            FileStore  |  MemoryStore                     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageAddress, Error, config)
//! - [`storage`] - Page I/O, node layout and page allocation
//! - [`index`] - The B-tree algorithms and facade
//!
//! # Quick Start
//! ```no_run
//! use pagedex::{BTree, TreeConfig};
//!
//! // Keep whatever the file already holds
//! let mut tree = BTree::open_with("orders.idx", TreeConfig::default())?;
//! tree.rebuild_free_list()?;
//!
//! tree.insert(1001, 0x4_0000)?;
//! assert_eq!(tree.query(1001)?, 0x4_0000);
//! # Ok::<(), pagedex::Error>(())
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{FANOUT, KEY_SLOTS, MIN_KEYS, PAGE_SIZE};
pub use common::{is_valid_address, Error, PageAddress, Result, TreeConfig};

pub use index::btree::{BTree, SharedBTree, TreeSummary};
pub use storage::page::{IndexEntry, Node, Page};
pub use storage::{
    Backend, DiskBackend, FileStore, FreeList, IoStats, MemoryBackend, MemoryStore, PageStore,
    Pager, StatsSnapshot,
};
