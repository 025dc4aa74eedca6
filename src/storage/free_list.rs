//! Free list of reclaimed page addresses.
//!
//! Addresses are handed back out in the order they were reclaimed, before
//! the store is extended.

use std::collections::{HashSet, VecDeque};

use crate::common::PageAddress;

/// FIFO queue of reusable page addresses.
///
/// The list is transient: it lives as long as the backend handle that owns
/// it and starts empty on every open.
#[derive(Debug, Default)]
pub struct FreeList {
    /// Addresses in reclaim order (front = oldest).
    queue: VecDeque<PageAddress>,

    /// Set for O(1) membership check.
    tracked: HashSet<PageAddress>,
}

impl FreeList {
    /// Create an empty free list.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            tracked: HashSet::new(),
        }
    }

    /// Add an address to the back of the list.
    ///
    /// Returns `false` if the address was already tracked.
    pub fn push(&mut self, address: PageAddress) -> bool {
        if !self.tracked.insert(address) {
            return false;
        }
        self.queue.push_back(address);
        true
    }

    /// Take the oldest reclaimed address.
    pub fn pop(&mut self) -> Option<PageAddress> {
        let address = self.queue.pop_front()?;
        self.tracked.remove(&address);
        Some(address)
    }

    /// Whether `address` is waiting to be reused.
    pub fn contains(&self, address: PageAddress) -> bool {
        self.tracked.contains(&address)
    }

    /// Number of reusable addresses.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Addresses in reuse order.
    pub fn iter(&self) -> impl Iterator<Item = PageAddress> + '_ {
        self.queue.iter().copied()
    }

    /// Forget every tracked address.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.tracked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(index: u64) -> PageAddress {
        PageAddress::from_index(index)
    }

    #[test]
    fn test_fifo_order() {
        let mut list = FreeList::new();

        assert!(list.push(addr(3)));
        assert!(list.push(addr(1)));
        assert!(list.push(addr(2)));
        assert_eq!(list.len(), 3);

        assert_eq!(list.pop(), Some(addr(3)));
        assert_eq!(list.pop(), Some(addr(1)));
        assert_eq!(list.pop(), Some(addr(2)));
        assert_eq!(list.pop(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_push_is_idempotent() {
        let mut list = FreeList::new();

        assert!(list.push(addr(5)));
        assert!(!list.push(addr(5)));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![addr(5)]);
    }

    #[test]
    fn test_pop_untracks() {
        let mut list = FreeList::new();
        list.push(addr(1));
        assert!(list.contains(addr(1)));

        list.pop();
        assert!(!list.contains(addr(1)));

        // Re-adding after reuse works again.
        assert!(list.push(addr(1)));
    }

    #[test]
    fn test_clear() {
        let mut list = FreeList::new();
        list.push(addr(1));
        list.push(addr(2));
        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(addr(2)));
    }
}
