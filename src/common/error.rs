//! Error types for pagedex.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagedex.
///
/// `KeyNotFound`, `DuplicateKey` and `ReservedKey` are ordinary outcomes of
/// normal operation. Everything else means the store or the caller needs
/// attention. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the backing store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Address is negative or not a multiple of the page size, or lies
    /// beyond the end of the store.
    #[error("Invalid page address: {0}")]
    InvalidAddress(i64),

    /// A page could not be read in full or decodes to an impossible node.
    #[error("Corrupt tree at address {address}: {reason}")]
    CorruptTree { address: i64, reason: String },

    /// The key is not stored in the tree.
    #[error("Key {0} not found")]
    KeyNotFound(u64),

    /// The key is already stored in the tree.
    #[error("Duplicate key {0}")]
    DuplicateKey(u64),

    /// Key 0 marks an unused slot and cannot be stored.
    #[error("Key 0 is reserved as the empty-slot sentinel")]
    ReservedKey,

    /// A split was requested on a node with fewer than three keys.
    #[error("Node at address {address} has {size} keys and cannot be split")]
    UnsplittableNode { address: i64, size: usize },

    /// The store extent is not page-aligned, so no address can be handed out.
    #[error("Cannot allocate a page: store extent {extent} is not page-aligned")]
    Allocation { extent: u64 },
}

impl Error {
    /// Whether this error is an expected outcome rather than a failure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Error::KeyNotFound(_) | Error::DuplicateKey(_) | Error::ReservedKey
        )
    }

    pub(crate) fn corrupt(address: i64, reason: impl Into<String>) -> Self {
        Error::CorruptTree {
            address,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::KeyNotFound(42);
        assert_eq!(format!("{}", err), "Key 42 not found");

        let err = Error::UnsplittableNode {
            address: 752,
            size: 2,
        };
        assert_eq!(
            format!("{}", err),
            "Node at address 752 has 2 keys and cannot be split"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_expected_errors() {
        assert!(Error::KeyNotFound(1).is_expected());
        assert!(Error::DuplicateKey(1).is_expected());
        assert!(Error::ReservedKey.is_expected());
        assert!(!Error::InvalidAddress(3).is_expected());
        assert!(!Error::corrupt(0, "short read").is_expected());
        assert!(!Error::Allocation { extent: 5 }.is_expected());
    }
}
