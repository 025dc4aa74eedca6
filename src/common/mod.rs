//! Common types and utilities shared across pagedex.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`TreeConfig`]
//! - Error types
//! - Page addresses

mod address;
pub mod config;
pub mod error;

pub use address::{is_valid_address, PageAddress};
pub use config::TreeConfig;
pub use error::{Error, Result};
