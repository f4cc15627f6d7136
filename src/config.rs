//! Caller-supplied knobs for a lookup session

use std::ops::RangeInclusive;

use crate::{
    Key, animation::DEFAULT_VISIBLE_BUCKETS, chained_table::DEFAULT_TABLE_SIZE,
    error::ConfigError,
};

/// Configuration of a [`LookupSession`](crate::LookupSession)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Number of hash table buckets
    pub table_size: usize,

    /// Range random batches draw keys from
    pub key_range: RangeInclusive<Key>,

    /// Keys added by one random batch
    pub random_batch: usize,

    /// Range bulk loads draw keys from, wider to reduce duplicates
    pub bulk_key_range: RangeInclusive<Key>,

    /// Keys added by a full bulk load
    pub bulk_total: usize,

    /// Keys inserted between two cancellation points of a bulk load
    pub bulk_chunk: usize,

    /// Leading buckets the hash table view shows
    pub visible_buckets: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            key_range: 1..=1_000,
            random_batch: 50,
            bulk_key_range: 1..=50_000,
            bulk_total: 10_000,
            bulk_chunk: 500,
            visible_buckets: DEFAULT_VISIBLE_BUCKETS,
        }
    }
}

impl SessionConfig {
    /// Default configuration with a different bucket count
    #[must_use]
    pub fn with_table_size(table_size: usize) -> Self {
        Self { table_size, ..Self::default() }
    }

    /// Checks every knob.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_size == 0 {
            return Err(ConfigError::ZeroTableSize);
        }
        for range in [&self.key_range, &self.bulk_key_range] {
            if range.is_empty() {
                return Err(ConfigError::EmptyKeyRange { start: *range.start(), end: *range.end() });
            }
        }
        if self.random_batch == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.bulk_chunk == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.table_size, 100);
        assert_eq!(config.key_range, 1..=1_000);
        assert_eq!(config.visible_buckets, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(SessionConfig::with_table_size(0).validate(), Err(ConfigError::ZeroTableSize));

        let empty_range = SessionConfig { key_range: 10..=1, ..SessionConfig::default() };
        assert_eq!(empty_range.validate(), Err(ConfigError::EmptyKeyRange { start: 10, end: 1 }));

        let no_chunk = SessionConfig { bulk_chunk: 0, ..SessionConfig::default() };
        assert_eq!(no_chunk.validate(), Err(ConfigError::ZeroChunkSize));

        let no_batch = SessionConfig { random_batch: 0, ..SessionConfig::default() };
        assert_eq!(no_batch.validate(), Err(ConfigError::ZeroBatchSize));
    }
}
