//! Unique table for hash-consing OR-nodes.
//!
//! The table maps a structural hash (variable plus child handles, no weights)
//! to the canonical nodes in that bucket. Since weights are compared with a
//! tolerance, the final equality test is supplied by the caller.

use std::collections::HashMap;

use crate::reference::Ref;

#[derive(Debug, Default)]
pub struct UniqueTable {
    buckets: HashMap<u64, Vec<Ref>>,
    size: usize,
}

impl UniqueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of canonical nodes.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Find a canonical node in the bucket for `hash` satisfying `is_equal`.
    pub fn find(&self, hash: u64, mut is_equal: impl FnMut(Ref) -> bool) -> Option<Ref> {
        self.buckets
            .get(&hash)
            .and_then(|bucket| bucket.iter().copied().find(|&r| is_equal(r)))
    }

    pub fn contains(&self, hash: u64, node: Ref) -> bool {
        self.buckets.get(&hash).is_some_and(|bucket| bucket.contains(&node))
    }

    /// Register `node` as canonical.
    pub fn insert(&mut self, hash: u64, node: Ref) {
        let bucket = self.buckets.entry(hash).or_default();
        if !bucket.contains(&node) {
            bucket.push(node);
            self.size += 1;
        }
    }

    /// Unregister `node`. Returns `false` if it was not in the table.
    pub fn remove(&mut self, hash: u64, node: Ref) -> bool {
        let Some(bucket) = self.buckets.get_mut(&hash) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|&r| r == node) else {
            return false;
        };
        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&hash);
        }
        self.size -= 1;
        true
    }

    /// All canonical nodes, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = Ref> + '_ {
        self.buckets.values().flatten().copied()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_find() {
        let mut table = UniqueTable::new();
        table.insert(7, Ref::new(2));
        table.insert(7, Ref::new(3));
        table.insert(7, Ref::new(3));
        assert_eq!(table.len(), 2);
        assert_eq!(table.find(7, |r| r.get() == 3), Some(Ref::new(3)));
        assert_eq!(table.find(7, |r| r.get() == 4), None);
        assert_eq!(table.find(8, |_| true), None);
    }

    #[test]
    fn test_remove() {
        let mut table = UniqueTable::new();
        table.insert(1, Ref::new(2));
        assert!(table.contains(1, Ref::new(2)));
        assert!(table.remove(1, Ref::new(2)));
        assert!(!table.remove(1, Ref::new(2)));
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }
}
