//! First-seen and last-seen positions of the elements of a sequence.

use std::collections::HashMap;
use std::hash::Hash;

/// Position index over a sequence.
#[derive(Debug, Clone)]
pub struct Indexer<T> {
    first: HashMap<T, usize>,
    last: HashMap<T, usize>,
    len: usize,
}

impl<T: Hash + Eq + Clone> Indexer<T> {
    pub fn new(items: &[T]) -> Self {
        let mut first = HashMap::with_capacity(items.len());
        let mut last = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            first.entry(item.clone()).or_insert(position);
            last.insert(item.clone(), position);
        }
        Indexer {
            first,
            last,
            len: items.len(),
        }
    }

    /// Position of the first occurrence of `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.first.get(item).copied()
    }

    /// Position of the last occurrence of `item`.
    pub fn last_index_of(&self, item: &T) -> Option<usize> {
        self.last.get(item).copied()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.first.contains_key(item)
    }

    /// Length of the indexed sequence, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_last_positions() {
        let indexer = Indexer::new(&["a", "b", "a", "c", "b"]);
        assert_eq!(indexer.index_of(&"a"), Some(0));
        assert_eq!(indexer.last_index_of(&"a"), Some(2));
        assert_eq!(indexer.index_of(&"b"), Some(1));
        assert_eq!(indexer.last_index_of(&"b"), Some(4));
        assert_eq!(indexer.index_of(&"c"), indexer.last_index_of(&"c"));
        assert_eq!(indexer.index_of(&"z"), None);
        assert!(!indexer.contains(&"z"));
        assert_eq!(indexer.len(), 5);
    }

    #[test]
    fn test_empty_sequence() {
        let indexer: Indexer<i32> = Indexer::new(&[]);
        assert!(indexer.is_empty());
        assert_eq!(indexer.index_of(&1), None);
    }
}
