//! The dual-structure engine behind the interactive comparison.
//!
//! A [`LookupSession`] owns the key log, the tree and the hash table and routes every
//! insert through all three, so they always hold the same keys.

use std::{
    fmt,
    hint::black_box,
    ops::ControlFlow,
    time::{Duration, Instant},
};

use rand::Rng;
use tracing::debug;

use crate::{
    Key,
    animation::{SearchAnimation, SearchAnimator},
    benchmark::{self, AccessPattern, BenchmarkHarness, BenchmarkReport, Structure},
    bst::{self, BinarySearchTree},
    chained_table::ChainedHashTable,
    config::SessionConfig,
    error::{BenchmarkError, ConfigError},
    key_log::KeyLog,
    layout::{self, Layout},
};

/// Membership answers from both structures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualSearch {
    /// Answer of the tree
    pub bst: bool,
    /// Answer of the hash table
    pub hash: bool,
}

/// A single lookup timed in both structures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSearch {
    /// The searched key
    pub key: Key,
    /// Answers of both structures
    pub found: DualSearch,
    /// Time the tree lookup took
    pub bst_time: Duration,
    /// Time the hash lookup took
    pub hash_time: Duration,
    /// Structure that answered first; the tree wins ties
    pub faster: Structure,
    /// Slower time divided by faster time, `None` if the faster time is zero
    pub speedup: Option<f64>,
}

/// Progress of a chunked bulk load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkProgress {
    /// Keys inserted so far
    pub inserted: usize,
    /// Keys the load was asked to insert
    pub total: usize,
    /// Whether the load stopped before reaching `total`
    pub cancelled: bool,
}

impl BulkProgress {
    /// Completed share of the load, from 0 to 1
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 { 1.0 } else { self.inserted as f64 / self.total as f64 }
    }
}

/// Summary numbers for a statistics panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStats {
    /// Logged inserts, duplicates included
    pub total_items: usize,
    /// Distinct keys stored
    pub distinct_keys: usize,
    /// Current tree height
    pub bst_height: usize,
    /// Height a perfectly balanced tree of the same size would have
    pub min_height: usize,
    /// Number of hash buckets
    pub table_size: usize,
    /// Stored keys per bucket
    pub load_factor: f64,
    /// Buckets holding at least one key
    pub non_empty_buckets: usize,
    /// Longest collision chain
    pub longest_chain: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Items: {}", self.total_items)?;
        writeln!(f, "Distinct Keys: {}", self.distinct_keys)?;
        writeln!(f, "BST Height: {}", self.bst_height)?;
        writeln!(f, "BST Theoretical Min Height: {}", self.min_height)?;
        writeln!(f, "Hash Table Size: {}", self.table_size)?;
        writeln!(f, "Hash Table Load Factor: {:.2}", self.load_factor)?;
        writeln!(f, "Non-empty Buckets: {}", self.non_empty_buckets)?;
        write!(f, "Longest Chain: {}", self.longest_chain)
    }
}

/// A tree, a hash table and the log of keys fed to both
#[derive(Debug, Clone)]
pub struct LookupSession {
    /// Validated configuration
    config: SessionConfig,
    /// Every insert in order
    log: KeyLog,
    /// Tree side of the comparison
    tree: BinarySearchTree,
    /// Hash table side of the comparison
    table: ChainedHashTable,
}

impl Default for LookupSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupSession {
    /// Creates an empty session with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            log: KeyLog::new(),
            tree: BinarySearchTree::new(),
            table: ChainedHashTable::new(),
        }
    }

    /// Creates an empty session after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`SessionConfig::validate`] or by the
    /// hash table constructor.
    pub fn with_config(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = ChainedHashTable::with_size(config.table_size)?;
        Ok(Self { config, log: KeyLog::new(), tree: BinarySearchTree::new(), table })
    }

    /// Feeds one key to the log, the tree and the hash table
    pub fn insert(&mut self, key: Key) {
        self.log.push(key);
        self.tree.insert(key);
        self.table.insert(key);
    }

    /// Inserts every key in order
    pub fn insert_all(&mut self, keys: impl IntoIterator<Item = Key>) {
        for key in keys {
            self.insert(key);
        }
    }

    /// Inserts one batch of random keys from the configured key range.
    ///
    /// Returns the inserted keys in order.
    pub fn insert_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Key> {
        let keys: Vec<Key> = (0..self.config.random_batch)
            .map(|_| rng.random_range(self.config.key_range.clone()))
            .collect();
        self.insert_all(keys.iter().copied());
        keys
    }

    /// Inserts a large random data set in chunks.
    ///
    /// `on_chunk` runs after every chunk and may return [`ControlFlow::Break`] to stop
    /// the load. Keys inserted before the stop are kept.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn bulk_load<R, F>(&mut self, rng: &mut R, mut on_chunk: F) -> BulkProgress
    where
        R: Rng + ?Sized,
        F: FnMut(BulkProgress) -> ControlFlow<()>,
    {
        let total = self.config.bulk_total;
        let chunk = self.config.bulk_chunk.max(1);
        let mut progress = BulkProgress { inserted: 0, total, cancelled: false };

        while progress.inserted < total {
            let batch = chunk.min(total - progress.inserted);
            for _ in 0..batch {
                let key = rng.random_range(self.config.bulk_key_range.clone());
                self.insert(key);
            }
            progress.inserted += batch;
            debug!(inserted = progress.inserted, total, "bulk chunk inserted");

            if on_chunk(progress).is_break() {
                progress.cancelled = progress.inserted < total;
                break;
            }
        }

        progress
    }

    /// Empties the log, the tree and the hash table together
    pub fn clear(&mut self) {
        self.log.clear();
        self.tree.clear();
        self.table.clear();
        debug!("session cleared");
    }

    /// Rebuilds the tree into a minimal-height shape
    pub fn balance(&mut self) {
        self.tree.balance();
    }

    /// Looks the key up in both structures
    #[must_use]
    pub fn search(&self, key: Key) -> DualSearch {
        DualSearch { bst: self.tree.search(key), hash: self.table.search(key) }
    }

    /// Looks the key up in both structures and times each lookup
    #[must_use]
    pub fn timed_search(&self, key: Key) -> TimedSearch {
        let start = Instant::now();
        let bst = black_box(self.tree.search(black_box(key)));
        let bst_time = start.elapsed();

        let start = Instant::now();
        let hash = black_box(self.table.search(black_box(key)));
        let hash_time = start.elapsed();

        let (faster, speedup) = benchmark::compare_durations(bst_time, hash_time);
        TimedSearch { key, found: DualSearch { bst, hash }, bst_time, hash_time, faster, speedup }
    }

    /// Tree height, zero when empty
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Number of tree nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    /// Stored keys per hash bucket
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Longest hash collision chain
    #[must_use]
    pub fn max_chain_length(&self) -> usize {
        self.table.max_chain_length()
    }

    /// Positions of every tree node for drawing
    #[must_use]
    pub fn compute_layout(&self) -> Layout {
        layout::compute_layout(&self.tree)
    }

    /// Animator over the current contents
    #[must_use]
    pub fn animator(&self) -> SearchAnimator<'_> {
        SearchAnimator::new(&self.tree, &self.table).with_visible_buckets(self.config.visible_buckets)
    }

    /// Narrates a lookup of `key` in both structures
    #[must_use]
    pub fn start_search_animation(&self, key: Key) -> SearchAnimation {
        self.animator().animate(key)
    }

    /// Benchmark harness over the current contents
    #[must_use]
    pub fn harness(&self) -> BenchmarkHarness<'_> {
        BenchmarkHarness::new(&self.log, &self.tree, &self.table)
    }

    /// Times `sample_size` lookups in both structures.
    ///
    /// # Errors
    ///
    /// See [`BenchmarkHarness::run`].
    pub fn run_benchmark<R: Rng + ?Sized>(
        &self,
        sample_size: usize,
        pattern: AccessPattern,
        rng: &mut R,
    ) -> Result<BenchmarkReport, BenchmarkError> {
        self.harness().run(sample_size, pattern, rng)
    }

    /// Benchmarks every standard sample size up to `max_sample`.
    ///
    /// # Errors
    ///
    /// See [`BenchmarkHarness::sweep`].
    pub fn run_sweep<R: Rng + ?Sized>(
        &self,
        max_sample: usize,
        pattern: AccessPattern,
        rng: &mut R,
    ) -> Result<Vec<BenchmarkReport>, BenchmarkError> {
        self.harness().sweep(max_sample, pattern, rng)
    }

    /// Numbers for the statistics panel
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            total_items: self.log.len(),
            distinct_keys: self.log.distinct_count(),
            bst_height: self.tree.height(),
            min_height: bst::minimal_height(self.tree.node_count()),
            table_size: self.table.capacity(),
            load_factor: self.table.load_factor(),
            non_empty_buckets: self.table.non_empty_buckets(),
            longest_chain: self.table.max_chain_length(),
        }
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Every logged insert
    #[must_use]
    pub fn log(&self) -> &KeyLog {
        &self.log
    }

    /// The tree side
    #[must_use]
    pub fn tree(&self) -> &BinarySearchTree {
        &self.tree
    }

    /// The hash table side
    #[must_use]
    pub fn table(&self) -> &ChainedHashTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn assert_in_sync(session: &LookupSession) {
        let mut logged: Vec<Key> = session.log().iter().collect();
        logged.sort_unstable();
        logged.dedup();

        assert_eq!(session.tree().keys(), logged);
        assert_eq!(session.table().len(), logged.len());
        assert!(logged.iter().all(|&key| session.table().search(key)));
    }

    #[test]
    fn test_concrete_scenario() {
        let mut session = LookupSession::new();
        session.insert_all([50, 30, 70, 20, 40]);

        assert_eq!(session.search(40), DualSearch { bst: true, hash: true });
        assert_eq!(session.search(60), DualSearch { bst: false, hash: false });
        assert_eq!(session.tree().trace(40).path, vec![50, 30, 40]);
        assert_eq!(session.tree().trace(60).path, vec![50, 70]);
        assert_eq!(session.table().bucket(40), &[40]);
        assert_eq!(session.height(), 3);
        assert_eq!(session.node_count(), 5);
        assert_in_sync(&session);
    }

    #[test]
    fn test_duplicates_logged_but_stored_once() {
        let mut session = LookupSession::new();
        session.insert_all([5, 5, 105]);

        assert_eq!(session.log().len(), 3);
        assert_eq!(session.node_count(), 2);
        assert_eq!(session.max_chain_length(), 2);
        assert!((session.load_factor() - 0.02).abs() < 1e-12);
        assert_in_sync(&session);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = LookupSession::new();
        session.insert_all([1, 2, 3]);
        session.clear();

        assert!(session.log().is_empty());
        assert!(session.tree().is_empty());
        assert!(session.table().is_empty());
        assert!(session.compute_layout().is_empty());
    }

    #[test]
    fn test_balance_keeps_keys() {
        let mut session = LookupSession::new();
        session.insert_all(1..=31);
        assert_eq!(session.height(), 31);

        session.balance();

        assert_eq!(session.height(), 5);
        assert_in_sync(&session);
    }

    #[test]
    fn test_random_batch_uses_key_range() {
        let mut session = LookupSession::new();
        let mut rng = StdRng::seed_from_u64(11);

        let keys = session.insert_random(&mut rng);

        assert_eq!(keys.len(), 50);
        assert!(keys.iter().all(|key| (1..=1_000).contains(key)));
        assert_eq!(session.log().as_slice(), keys.as_slice());
        assert_in_sync(&session);
    }

    #[test]
    fn test_bulk_load_completes() {
        let config = SessionConfig { bulk_total: 1_050, bulk_chunk: 500, ..SessionConfig::default() };
        let mut session = LookupSession::with_config(config).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = Vec::new();

        let progress = session.bulk_load(&mut rng, |step| {
            seen.push(step.inserted);
            ControlFlow::Continue(())
        });

        assert_eq!(seen, vec![500, 1_000, 1_050]);
        assert_eq!(progress, BulkProgress { inserted: 1_050, total: 1_050, cancelled: false });
        assert!((progress.fraction() - 1.0).abs() < f64::EPSILON);
        assert_eq!(session.log().len(), 1_050);
        assert!(session.log().iter().all(|key| (1..=50_000).contains(&key)));
        assert_in_sync(&session);
    }

    #[test]
    fn test_bulk_load_cancellation_keeps_inserted_keys() {
        let config = SessionConfig { bulk_total: 2_000, bulk_chunk: 500, ..SessionConfig::default() };
        let mut session = LookupSession::with_config(config).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let progress = session.bulk_load(&mut rng, |step| {
            if step.inserted >= 1_000 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });

        assert_eq!(progress, BulkProgress { inserted: 1_000, total: 2_000, cancelled: true });
        assert_eq!(session.log().len(), 1_000);
        assert_in_sync(&session);
    }

    #[test]
    fn test_timed_search() {
        let mut session = LookupSession::new();
        session.insert_all([50, 30, 70]);

        let timed = session.timed_search(30);
        assert_eq!(timed.key, 30);
        assert_eq!(timed.found, DualSearch { bst: true, hash: true });
        assert_eq!(timed.speedup.is_some(), !timed.bst_time.min(timed.hash_time).is_zero());
    }

    #[test]
    fn test_with_config_rejects_zero_table() {
        assert!(matches!(
            LookupSession::with_config(SessionConfig::with_table_size(0)),
            Err(ConfigError::ZeroTableSize)
        ));
    }

    #[test]
    fn test_animation_uses_visible_buckets() {
        let config = SessionConfig { visible_buckets: 50, ..SessionConfig::default() };
        let mut session = LookupSession::with_config(config).unwrap();
        session.insert_all([50, 30, 70, 20, 40]);

        let animation = session.start_search_animation(40);

        assert_eq!(animation.bst_path(), &[50, 30, 40]);
        assert_eq!(animation.bst_found(), Some(true));
        assert_eq!(animation.hash_found(), Some(true));
        assert!(animation.hash.iter().all(|event| {
            !matches!(event, crate::AnimationEvent::BucketOutOfRange { .. })
        }));
    }

    #[test]
    fn test_benchmark_through_session() {
        let mut session = LookupSession::new();
        let mut rng = StdRng::seed_from_u64(2);
        session.insert_all(1..=25);

        assert!(matches!(
            session.run_benchmark(30, AccessPattern::Random, &mut rng),
            Err(BenchmarkError::InsufficientData { requested: 30, available: 25, .. })
        ));

        session.insert_all(26..=30);
        let report = session.run_benchmark(30, AccessPattern::Random, &mut rng).unwrap();
        assert_eq!(report.bst_timings.len(), 30);
        assert_eq!(session.run_sweep(100, AccessPattern::Random, &mut rng).unwrap().len(), 1);
    }

    #[test]
    fn test_stats() {
        let mut session = LookupSession::with_config(SessionConfig::with_table_size(10)).unwrap();
        session.insert_all([1, 11, 21, 2, 2]);

        let stats = session.stats();

        assert_eq!(stats.total_items, 5);
        assert_eq!(stats.distinct_keys, 4);
        assert_eq!(stats.distinct_keys, session.node_count());
        assert_eq!(stats.bst_height, 3);
        assert_eq!(stats.min_height, 3);
        assert_eq!(stats.table_size, 10);
        assert!((stats.load_factor - 0.4).abs() < 1e-12);
        assert_eq!(stats.non_empty_buckets, 2);
        assert_eq!(stats.longest_chain, 3);
        assert!(stats.to_string().starts_with("Total Items: 5\n"));
    }
}
