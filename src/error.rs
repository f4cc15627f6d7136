//! Error types reported by the session configuration and the benchmark harness

use thiserror::Error;

use crate::{Key, benchmark::AccessPattern};

/// Errors raised while validating a [`SessionConfig`](crate::SessionConfig)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The hash table needs at least one bucket
    #[error("hash table size must be at least 1")]
    ZeroTableSize,

    /// The table size does not fit the key domain used for `key mod size`
    #[error("hash table size {0} exceeds the key domain")]
    TableSizeOverflow(usize),

    /// A random key range with no values in it
    #[error("key range {start}..={end} is empty")]
    EmptyKeyRange {
        /// Lower bound of the rejected range
        start: Key,
        /// Upper bound of the rejected range
        end: Key,
    },

    /// Bulk loads must make progress on every chunk
    #[error("bulk chunk size must be at least 1")]
    ZeroChunkSize,

    /// Random batches must insert at least one key
    #[error("random batch size must be at least 1")]
    ZeroBatchSize,
}

/// Errors raised by the benchmark harness
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BenchmarkError {
    /// The population cannot supply the requested number of lookups
    #[error(
        "{pattern} benchmark needs {requested} samples but only {available} are available"
    )]
    InsufficientData {
        /// Access pattern that was requested
        pattern: AccessPattern,
        /// Requested sample size
        requested: usize,
        /// Samples the current population can supply
        available: usize,
    },

    /// A benchmark of zero lookups has no mean
    #[error("benchmark sample size must be at least 1")]
    EmptySample,
}
