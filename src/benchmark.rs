//! Lookup latency comparison between the tree and the hash table

use std::{
    fmt,
    hint::black_box,
    time::{Duration, Instant},
};

use rand::{Rng, seq::index};
use tracing::{debug, info, warn};

use crate::{
    Key, bst::BinarySearchTree, chained_table::ChainedHashTable, error::BenchmarkError,
    key_log::KeyLog,
};

/// Sample sizes a sweep picks from
pub const STANDARD_SAMPLE_SIZES: [usize; 6] = [30, 100, 500, 1_000, 5_000, 10_000];

/// First candidate for a key absent from the population
pub const WORST_CASE_SENTINEL: Key = -1;

/// How the looked-up keys are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessPattern {
    /// Distinct log positions drawn uniformly, so repeated keys keep their weight
    Random,
    /// The first key ever inserted, repeated; the shallowest tree path
    BestCase,
    /// A key absent from the population, repeated; a full miss in both structures
    WorstCase,
}

impl fmt::Display for AccessPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Random => "Random",
            Self::BestCase => "Best-case",
            Self::WorstCase => "Worst-case",
        })
    }
}

impl AccessPattern {
    /// Largest sample this pattern may draw from a log.
    ///
    /// Every pattern is capped by the population size; an empty log supports no sample.
    #[must_use]
    pub fn capacity(self, log: &KeyLog) -> usize {
        match self {
            Self::Random | Self::BestCase | Self::WorstCase => log.len(),
        }
    }
}

/// The two structures under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Structure {
    /// The binary search tree
    BinarySearchTree,
    /// The chained hash table
    HashTable,
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BinarySearchTree => "BST",
            Self::HashTable => "Hash Table",
        })
    }
}

/// Timings and aggregates of one benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    /// Pattern the keys were drawn with
    pub pattern: AccessPattern,
    /// Number of lookups per structure
    pub sample_size: usize,
    /// Tree lookup durations, in lookup order
    pub bst_timings: Vec<Duration>,
    /// Hash table lookup durations, in lookup order
    pub hash_timings: Vec<Duration>,
    /// Mean tree lookup duration
    pub bst_mean: Duration,
    /// Mean hash table lookup duration
    pub hash_mean: Duration,
    /// Structure with the lower mean; the tree wins ties
    pub faster: Structure,
    /// Slower mean divided by faster mean, `None` if the faster mean is zero
    pub speed_ratio: Option<f64>,
}

/// Mean of a set of durations, zero for an empty set
fn mean(timings: &[Duration]) -> Duration {
    let total: Duration = timings.iter().sum();
    u32::try_from(timings.len()).ok().and_then(|count| total.checked_div(count)).unwrap_or_default()
}

/// Picks the faster structure and the slower-to-faster ratio.
///
/// The tree wins ties. The ratio is `None` when the faster duration is zero.
pub(crate) fn compare_durations(bst: Duration, hash: Duration) -> (Structure, Option<f64>) {
    let (faster, fast, slow) = if hash < bst {
        (Structure::HashTable, hash, bst)
    } else {
        (Structure::BinarySearchTree, bst, hash)
    };
    (faster, (!fast.is_zero()).then(|| slow.as_secs_f64() / fast.as_secs_f64()))
}

impl BenchmarkReport {
    /// Derives the aggregates from paired timings
    #[must_use]
    pub fn from_timings(
        pattern: AccessPattern,
        bst_timings: Vec<Duration>,
        hash_timings: Vec<Duration>,
    ) -> Self {
        let bst_mean = mean(&bst_timings);
        let hash_mean = mean(&hash_timings);
        let (faster, speed_ratio) = compare_durations(bst_mean, hash_mean);

        Self {
            pattern,
            sample_size: bst_timings.len(),
            bst_timings,
            hash_timings,
            bst_mean,
            hash_mean,
            faster,
            speed_ratio,
        }
    }

    /// Tree timings in seconds, for charting
    #[must_use]
    pub fn bst_seconds(&self) -> Vec<f64> {
        self.bst_timings.iter().map(Duration::as_secs_f64).collect()
    }

    /// Hash table timings in seconds, for charting
    #[must_use]
    pub fn hash_seconds(&self) -> Vec<f64> {
        self.hash_timings.iter().map(Duration::as_secs_f64).collect()
    }
}

/// Times lookups against both structures without modifying them
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkHarness<'a> {
    /// Population the keys are drawn from
    log: &'a KeyLog,
    /// Tree under test
    tree: &'a BinarySearchTree,
    /// Table under test
    table: &'a ChainedHashTable,
}

impl<'a> BenchmarkHarness<'a> {
    /// Creates a harness over a populated session's stores
    #[must_use]
    pub fn new(log: &'a KeyLog, tree: &'a BinarySearchTree, table: &'a ChainedHashTable) -> Self {
        Self { log, tree, table }
    }

    /// The key the worst-case pattern looks up.
    ///
    /// [`WORST_CASE_SENTINEL`] unless it was inserted, otherwise the next lower absent key.
    #[must_use]
    pub fn worst_case_key(&self) -> Key {
        (Key::MIN..=WORST_CASE_SENTINEL)
            .rev()
            .find(|&key| !self.tree.search(key) && !self.table.search(key))
            .unwrap_or(WORST_CASE_SENTINEL)
    }

    /// Checks that the pattern can supply `sample_size` keys
    fn ensure_capacity(
        &self,
        sample_size: usize,
        pattern: AccessPattern,
    ) -> Result<(), BenchmarkError> {
        if sample_size == 0 {
            return Err(BenchmarkError::EmptySample);
        }
        let available = pattern.capacity(self.log);
        if sample_size > available {
            return Err(BenchmarkError::InsufficientData {
                pattern,
                requested: sample_size,
                available,
            });
        }
        Ok(())
    }

    /// Chooses the keys to look up.
    ///
    /// # Errors
    ///
    /// [`BenchmarkError::EmptySample`] for a zero sample size, and
    /// [`BenchmarkError::InsufficientData`] when the population is too small for the
    /// pattern. The sample size is never clamped.
    pub fn draw_keys<R: Rng + ?Sized>(
        &self,
        sample_size: usize,
        pattern: AccessPattern,
        rng: &mut R,
    ) -> Result<Vec<Key>, BenchmarkError> {
        self.ensure_capacity(sample_size, pattern)?;
        let keys = match pattern {
            AccessPattern::Random => index::sample(rng, self.log.len(), sample_size)
                .into_iter()
                .filter_map(|position| self.log.get(position))
                .collect(),
            AccessPattern::BestCase => {
                self.log.first().map(|key| vec![key; sample_size]).unwrap_or_default()
            }
            AccessPattern::WorstCase => vec![self.worst_case_key(); sample_size],
        };
        Ok(keys)
    }

    /// Times a tree lookup and a hash lookup for every drawn key.
    ///
    /// # Errors
    ///
    /// See [`draw_keys`](Self::draw_keys).
    pub fn run<R: Rng + ?Sized>(
        &self,
        sample_size: usize,
        pattern: AccessPattern,
        rng: &mut R,
    ) -> Result<BenchmarkReport, BenchmarkError> {
        let keys = self.draw_keys(sample_size, pattern, rng)?;
        debug!(%pattern, sample_size, "running lookup benchmark");

        let mut bst_timings = Vec::with_capacity(keys.len());
        let mut hash_timings = Vec::with_capacity(keys.len());
        for &key in &keys {
            let start = Instant::now();
            let _ = black_box(self.tree.search(black_box(key)));
            bst_timings.push(start.elapsed());

            let start = Instant::now();
            let _ = black_box(self.table.search(black_box(key)));
            hash_timings.push(start.elapsed());
        }

        let report = BenchmarkReport::from_timings(pattern, bst_timings, hash_timings);
        info!(
            %pattern,
            sample_size,
            bst_mean_ns = report.bst_mean.as_nanos(),
            hash_mean_ns = report.hash_mean.as_nanos(),
            faster = %report.faster,
            "benchmark finished"
        );
        Ok(report)
    }

    /// Runs every standard sample size up to `max_sample`.
    ///
    /// Sizes the population cannot satisfy are skipped. A `max_sample` below the
    /// smallest standard size is run on its own.
    ///
    /// # Errors
    ///
    /// Fails like [`run`](Self::run) for the smallest size when no size can run.
    pub fn sweep<R: Rng + ?Sized>(
        &self,
        max_sample: usize,
        pattern: AccessPattern,
        rng: &mut R,
    ) -> Result<Vec<BenchmarkReport>, BenchmarkError> {
        let mut sizes: Vec<usize> =
            STANDARD_SAMPLE_SIZES.into_iter().filter(|&size| size <= max_sample).collect();
        if sizes.is_empty() {
            sizes.push(max_sample);
        }

        let (runnable, skipped): (Vec<usize>, Vec<usize>) =
            sizes.iter().partition(|&&size| self.ensure_capacity(size, pattern).is_ok());
        match sizes.first() {
            Some(&smallest) if runnable.is_empty() => self.ensure_capacity(smallest, pattern)?,
            _ => {}
        }
        if !skipped.is_empty() {
            warn!(%pattern, ?skipped, population = self.log.len(), "skipping sample sizes");
        }

        runnable.into_iter().map(|size| self.run(size, pattern, rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    struct Population {
        log: KeyLog,
        tree: BinarySearchTree,
        table: ChainedHashTable,
    }

    impl Population {
        fn of(keys: impl IntoIterator<Item = Key>) -> Self {
            let mut population = Self {
                log: KeyLog::new(),
                tree: BinarySearchTree::new(),
                table: ChainedHashTable::new(),
            };
            for key in keys {
                population.log.push(key);
                population.tree.insert(key);
                population.table.insert(key);
            }
            population
        }

        fn harness(&self) -> BenchmarkHarness<'_> {
            BenchmarkHarness::new(&self.log, &self.tree, &self.table)
        }
    }

    #[test]
    fn test_random_needs_enough_population() {
        let population = Population::of(1..=25);
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(
            population.harness().run(30, AccessPattern::Random, &mut rng),
            Err(BenchmarkError::InsufficientData {
                pattern: AccessPattern::Random,
                requested: 30,
                available: 25,
            })
        );
    }

    #[test]
    fn test_random_returns_exact_sample() {
        let population = Population::of(1..=40);
        let mut rng = StdRng::seed_from_u64(7);

        let report = population.harness().run(30, AccessPattern::Random, &mut rng).unwrap();

        assert_eq!(report.sample_size, 30);
        assert_eq!(report.bst_timings.len(), 30);
        assert_eq!(report.hash_timings.len(), 30);
    }

    #[test]
    fn test_random_draws_distinct_positions() {
        let population = Population::of([5, 5, 5, 9]);
        let mut rng = StdRng::seed_from_u64(1);

        let mut keys = population.harness().draw_keys(4, AccessPattern::Random, &mut rng).unwrap();
        keys.sort_unstable();

        assert_eq!(keys, vec![5, 5, 5, 9]);
    }

    #[test]
    fn test_best_case_repeats_first_key() {
        let population = Population::of([42, 7, 99]);
        let mut rng = StdRng::seed_from_u64(1);

        let keys = population.harness().draw_keys(10, AccessPattern::BestCase, &mut rng).unwrap();
        assert_eq!(keys, vec![42; 10]);

        let empty = Population::of([]);
        assert!(matches!(
            empty.harness().run(1, AccessPattern::BestCase, &mut rng),
            Err(BenchmarkError::InsufficientData { available: 0, .. })
        ));
    }

    #[test]
    fn test_worst_case_key_is_absent() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Population::of([1, 2, 3]).harness().worst_case_key(), -1);
        assert_eq!(Population::of([-1, -2, 4]).harness().worst_case_key(), -3);

        let keys = Population::of([1, 2, 3])
            .harness()
            .draw_keys(3, AccessPattern::WorstCase, &mut rng)
            .unwrap();
        assert_eq!(keys, vec![-1; 3]);
    }

    #[test]
    fn test_every_pattern_capped_by_population() {
        let population = Population::of(1..=20);
        let mut rng = StdRng::seed_from_u64(4);

        for pattern in [AccessPattern::Random, AccessPattern::BestCase, AccessPattern::WorstCase] {
            assert_eq!(pattern.capacity(&population.log), 20);
            assert_eq!(
                population.harness().run(1_000, pattern, &mut rng),
                Err(BenchmarkError::InsufficientData { pattern, requested: 1_000, available: 20 })
            );
        }

        let empty = Population::of([]);
        assert_eq!(
            empty.harness().run(30, AccessPattern::WorstCase, &mut rng),
            Err(BenchmarkError::InsufficientData {
                pattern: AccessPattern::WorstCase,
                requested: 30,
                available: 0,
            })
        );
    }

    #[test]
    fn test_zero_sample_rejected() {
        let population = Population::of(1..=10);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            population.harness().run(0, AccessPattern::WorstCase, &mut rng),
            Err(BenchmarkError::EmptySample)
        );
    }

    #[test]
    fn test_report_aggregates() {
        let report = BenchmarkReport::from_timings(
            AccessPattern::Random,
            vec![Duration::from_nanos(300), Duration::from_nanos(500)],
            vec![Duration::from_nanos(100), Duration::from_nanos(100)],
        );

        assert_eq!(report.bst_mean, Duration::from_nanos(400));
        assert_eq!(report.hash_mean, Duration::from_nanos(100));
        assert_eq!(report.faster, Structure::HashTable);
        assert!((report.speed_ratio.unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(report.bst_seconds().len(), 2);
    }

    #[test]
    fn test_report_zero_means() {
        let report = BenchmarkReport::from_timings(
            AccessPattern::BestCase,
            vec![Duration::ZERO],
            vec![Duration::ZERO],
        );
        assert_eq!(report.faster, Structure::BinarySearchTree);
        assert_eq!(report.speed_ratio, None);
    }

    #[test]
    fn test_sweep_skips_unsatisfiable_sizes() {
        let population = Population::of(1..=600);
        let mut rng = StdRng::seed_from_u64(3);

        let reports = population.harness().sweep(1_000, AccessPattern::Random, &mut rng).unwrap();
        let sizes: Vec<usize> = reports.iter().map(|report| report.sample_size).collect();

        assert_eq!(sizes, vec![30, 100, 500]);
    }

    #[test]
    fn test_sweep_small_maximum_and_failure() {
        let population = Population::of(1..=20);
        let mut rng = StdRng::seed_from_u64(3);
        let harness = population.harness();

        let reports = harness.sweep(10, AccessPattern::Random, &mut rng).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports.first().map(|report| report.sample_size), Some(10));

        assert!(matches!(
            harness.sweep(100, AccessPattern::Random, &mut rng),
            Err(BenchmarkError::InsufficientData { requested: 30, available: 20, .. })
        ));

        assert!(matches!(
            harness.sweep(10_000, AccessPattern::WorstCase, &mut rng),
            Err(BenchmarkError::InsufficientData { requested: 30, available: 20, .. })
        ));

        let larger = Population::of(1..=150);
        let sizes: Vec<usize> = larger
            .harness()
            .sweep(10_000, AccessPattern::BestCase, &mut rng)
            .unwrap()
            .iter()
            .map(|report| report.sample_size)
            .collect();
        assert_eq!(sizes, vec![30, 100]);
    }

    #[test]
    fn test_run_leaves_structures_untouched() {
        let population = Population::of([50, 30, 70, 20, 40]);
        let before = (population.tree.clone(), population.table.clone(), population.log.clone());
        let mut rng = StdRng::seed_from_u64(9);

        for pattern in [AccessPattern::Random, AccessPattern::BestCase, AccessPattern::WorstCase] {
            population.harness().run(5, pattern, &mut rng).unwrap();
        }

        assert_eq!(before, (population.tree, population.table, population.log));
    }
}
