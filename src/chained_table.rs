//! Fixed-size hash table that resolves collisions with per-bucket chains

use crate::{Key, error::ConfigError};

/// Bucket count used when none is configured
pub const DEFAULT_TABLE_SIZE: usize = 100;

/// A hash table with a fixed number of buckets, each holding an unordered chain of keys.
///
/// A key always lives in bucket `key mod size`, using the non-negative remainder so
/// negative keys land in `0..size` as well. The table never resizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedHashTable {
    /// Chains indexed by bucket, each in insertion order
    buckets: Vec<Vec<Key>>,
    /// Bucket count as a key, the modulus of the hash
    modulus: Key,
    /// Total keys stored across all chains
    len: usize,
}

impl Default for ChainedHashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainedHashTable {
    /// Creates a table with [`DEFAULT_TABLE_SIZE`] buckets
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); DEFAULT_TABLE_SIZE],
            modulus: DEFAULT_TABLE_SIZE as Key,
            len: 0,
        }
    }

    /// Creates a table with the given number of buckets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTableSize`] for a size of zero and
    /// [`ConfigError::TableSizeOverflow`] if the size cannot be used as a key modulus.
    pub fn with_size(size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroTableSize);
        }
        let modulus = Key::try_from(size).map_err(|_| ConfigError::TableSizeOverflow(size))?;
        Ok(Self { buckets: vec![Vec::new(); size], modulus, len: 0 })
    }

    /// Bucket a key hashes to
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn bucket_index(&self, key: Key) -> usize {
        // `rem_euclid` by a positive modulus is in `0..modulus`, which came from a usize
        key.rem_euclid(self.modulus) as usize
    }

    /// Adds a key to its bucket unless the bucket already holds it.
    ///
    /// Returns true if the key was added.
    pub fn insert(&mut self, key: Key) -> bool {
        let index = self.bucket_index(key);
        let Some(chain) = self.buckets.get_mut(index) else {
            return false;
        };
        if chain.contains(&key) {
            return false;
        }
        chain.push(key);
        self.len = self.len.saturating_add(1);
        true
    }

    /// Returns true if the key is stored in its bucket
    #[must_use]
    pub fn search(&self, key: Key) -> bool {
        self.bucket(self.bucket_index(key)).contains(&key)
    }

    /// Empties every bucket
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
    }

    /// Chain stored in a bucket, empty for out-of-range indices
    #[must_use]
    pub fn bucket(&self, index: usize) -> &[Key] {
        self.buckets.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates over `(index, chain)` pairs in bucket order
    pub fn buckets(&self) -> impl Iterator<Item = (usize, &[Key])> {
        self.buckets.iter().map(Vec::as_slice).enumerate()
    }

    /// Number of buckets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no bucket holds a key
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stored keys divided by bucket count
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Length of the longest chain
    #[must_use]
    pub fn max_chain_length(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of buckets holding at least one key
    #[must_use]
    pub fn non_empty_buckets(&self) -> usize {
        self.buckets.iter().filter(|chain| !chain.is_empty()).count()
    }
}

impl Extend<Key> for ChainedHashTable {
    fn extend<T: IntoIterator<Item = Key>>(&mut self, iter: T) {
        for key in iter {
            self.insert(key);
        }
    }
}
