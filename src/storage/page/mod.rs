//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - The raw fixed-size data container
//! - [`IndexEntry`] - A key/pointer pair stored in a slot
//! - [`Node`] - The decoded view of one page
//! - the node codec (`Node::to_page` / `Node::from_page`)

mod codec;
mod entry;
mod node;
#[allow(clippy::module_inception)]
mod page;

pub use codec::OFFSET_DATA;
pub use entry::IndexEntry;
pub use node::{Node, Slot};
pub use page::Page;
