//! # Lookup Lab
//!
//! A side-by-side engine for comparing an unbalanced binary search tree with a
//! fixed-size chained hash table.
//!
//! Every key is fed to both structures and to an append-only log. On top of that the
//! crate provides:
//!
//! - an overlap-free layout of the tree for drawing,
//! - step-by-step narration of a lookup in either structure,
//! - a timing harness with random, best-case and worst-case access patterns.
//!
//! ## Basic Usage
//!
//! ```rust
//! use lookup_lab::{AccessPattern, LookupSession};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut session = LookupSession::new();
//! session.insert_all([50, 30, 70, 20, 40]);
//!
//! // Both structures agree on membership
//! let found = session.search(40);
//! assert!(found.bst && found.hash);
//!
//! // The tree records the nodes it visited
//! assert_eq!(session.tree().trace(40).path, vec![50, 30, 40]);
//!
//! // Lookups can be narrated one event at a time
//! let animation = session.start_search_animation(40);
//! assert_eq!(animation.bst_found(), Some(true));
//!
//! // Benchmarks need at least 30 lookups worth of data
//! let mut rng = StdRng::seed_from_u64(7);
//! assert!(session.run_benchmark(30, AccessPattern::Random, &mut rng).is_err());
//! ```
//!
//! ## Layout
//!
//! ```rust
//! use lookup_lab::{LookupSession, Spacing};
//!
//! let mut session = LookupSession::new();
//! session.insert_all([2, 1, 3]);
//!
//! let layout = session.compute_layout();
//! let pixels = layout.to_pixels(&Spacing::default());
//! assert_eq!(pixels.len(), 3);
//! ```

/// Step-by-step narration of lookups
pub mod animation;
/// Timing harness and access patterns
pub mod benchmark;
/// Arena-backed unbalanced binary search tree
pub mod bst;
/// Fixed-size hash table with separate chaining
pub mod chained_table;
/// Session configuration
pub mod config;
/// Error types
pub mod error;
/// Append-only record of inserted keys
pub mod key_log;
/// Tree layout for rendering
pub mod layout;
/// The dual-structure session
pub mod session;

/// Keys stored by both structures
pub type Key = i64;

pub use animation::{AnimationEvent, SearchAnimation, SearchAnimator};
pub use benchmark::{AccessPattern, BenchmarkHarness, BenchmarkReport, Structure};
pub use bst::{BinarySearchTree, SearchTrace};
pub use chained_table::ChainedHashTable;
pub use config::SessionConfig;
pub use error::{BenchmarkError, ConfigError};
pub use key_log::KeyLog;
pub use layout::{Layout, LayoutPosition, Spacing, compute_layout};
pub use session::{BulkProgress, DualSearch, LookupSession, SessionStats, TimedSearch};
