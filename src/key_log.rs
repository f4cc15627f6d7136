//! Append-only history of every key inserted through a session

use std::collections::HashSet;

use crate::Key;

/// Ordered record of all inserted keys.
///
/// Duplicates are kept so the log mirrors the real insert history. The log is the
/// population the benchmark harness samples from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyLog {
    /// Keys in insertion order
    keys: Vec<Key>,
}

impl KeyLog {
    /// Creates an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a key to the end of the log
    pub fn push(&mut self, key: Key) {
        self.keys.push(key);
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Number of logged inserts, duplicates included
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing has been inserted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The first key ever inserted
    #[must_use]
    pub fn first(&self) -> Option<Key> {
        self.keys.first().copied()
    }

    /// Key at a log position
    #[must_use]
    pub fn get(&self, position: usize) -> Option<Key> {
        self.keys.get(position).copied()
    }

    /// Number of distinct keys in the log
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.keys.iter().collect::<HashSet<_>>().len()
    }

    /// The logged keys in insertion order
    #[must_use]
    pub fn as_slice(&self) -> &[Key] {
        &self.keys
    }

    /// Iterates over the logged keys in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }
}

impl Extend<Key> for KeyLog {
    fn extend<T: IntoIterator<Item = Key>>(&mut self, iter: T) {
        self.keys.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order_and_duplicates() {
        let mut log = KeyLog::new();
        log.extend([5, 3, 5, -2]);

        assert_eq!(log.as_slice(), &[5, 3, 5, -2]);
        assert_eq!(log.len(), 4);
        assert_eq!(log.distinct_count(), 3);
        assert_eq!(log.first(), Some(5));
        assert_eq!(log.get(3), Some(-2));
        assert_eq!(log.get(4), None);
    }

    #[test]
    fn test_clear() {
        let mut log = KeyLog::new();
        log.push(1);
        assert_eq!(log.distinct_count(), 1);

        log.clear();

        assert!(log.is_empty());
        assert_eq!(log.first(), None);
        assert_eq!(log.distinct_count(), 0);
    }
}
