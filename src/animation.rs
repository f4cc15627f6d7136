//! Step-by-step narration of a single lookup.
//!
//! Each track is a small state machine exposed as an iterator of [`AnimationEvent`]s.
//! The events say what happened during the search. Pacing them on screen is left to
//! the caller, which may stop consuming at any point since nothing is mutated.

use std::{fmt, iter::FusedIterator, mem};

use crate::{
    Key,
    bst::{self, BinarySearchTree, Direction, NodeId, Step},
    chained_table::ChainedHashTable,
};

/// Buckets a hash table view shows by default
pub const DEFAULT_VISIBLE_BUCKETS: usize = 30;

/// One discrete, narratable step of a simulated search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    /// The search key is compared with this node's key
    ExamineNode {
        /// Key of the examined node
        key: Key,
    },
    /// The search continues into a child of this node
    Move {
        /// Key of the node being left
        from: Key,
        /// Side taken
        direction: Direction,
    },
    /// The key was found; terminal
    Found {
        /// The searched key
        key: Key,
        /// Keys compared on the way, in order
        path: Vec<Key>,
    },
    /// The key is absent; terminal
    NotFound {
        /// Keys compared on the way, in order
        path: Vec<Key>,
    },
    /// The bucket of the key was computed
    ComputeHash {
        /// The searched key
        key: Key,
        /// Resulting bucket
        bucket: usize,
    },
    /// The chain of a visible bucket is being scanned
    ScanBucket {
        /// Scanned bucket
        bucket: usize,
    },
    /// The bucket lies outside the part of the table on display
    BucketOutOfRange {
        /// Bucket of the key
        bucket: usize,
        /// Number of buckets on display, starting at 0
        visible: usize,
    },
}

impl AnimationEvent {
    /// Returns true for `Found` and `NotFound`
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Found { .. } | Self::NotFound { .. })
    }

    /// The search answer carried by a terminal event
    #[must_use]
    pub fn outcome(&self) -> Option<bool> {
        match self {
            Self::Found { .. } => Some(true),
            Self::NotFound { .. } => Some(false),
            _ => None,
        }
    }
}

/// Joins a path as `a → b → c`
fn format_path(path: &[Key]) -> String {
    path.iter().map(ToString::to_string).collect::<Vec<_>>().join(" → ")
}

impl fmt::Display for AnimationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExamineNode { key } => write!(f, "Comparing with {key}"),
            Self::Move { from, direction: Direction::Left } => write!(f, "Going left from {from}"),
            Self::Move { from, direction: Direction::Right } => {
                write!(f, "Going right from {from}")
            }
            Self::Found { key, path } => {
                write!(f, "Found key {key}, search path: {}", format_path(path))
            }
            Self::NotFound { path } if path.is_empty() => write!(f, "Not found, nothing to search"),
            Self::NotFound { path } => write!(f, "Not found, search path: {}", format_path(path)),
            Self::ComputeHash { key, bucket } => write!(f, "Hash of {key} is bucket {bucket}"),
            Self::ScanBucket { bucket } => write!(f, "Searching in bucket {bucket}"),
            Self::BucketOutOfRange { bucket, visible } => write!(
                f,
                "Bucket {bucket} is outside the visible range (0-{})",
                visible.saturating_sub(1)
            ),
        }
    }
}

/// States of the tree track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BstState {
    /// Nothing emitted yet
    Start,
    /// About to compare against a node
    Examining(NodeId),
    /// Compared against a node, the decision is pending
    Compared(NodeId),
    /// Heading into a child slot, which may be empty
    Moving(Option<NodeId>),
    /// A terminal event has been emitted
    Done,
}

/// Narrates a tree lookup: examine, move, examine, ... then found or not found
#[derive(Debug, Clone)]
pub struct BstTrack<'a> {
    /// Tree being searched
    tree: &'a BinarySearchTree,
    /// Searched key
    key: Key,
    /// Current state
    state: BstState,
    /// Keys examined so far
    path: Vec<Key>,
}

impl BstTrack<'_> {
    /// Emits `NotFound` with the accumulated path and stops
    fn not_found(&mut self) -> AnimationEvent {
        self.state = BstState::Done;
        AnimationEvent::NotFound { path: mem::take(&mut self.path) }
    }
}

impl Iterator for BstTrack<'_> {
    type Item = AnimationEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                BstState::Done => return None,
                BstState::Start => self.state = BstState::Moving(self.tree.root()),
                BstState::Moving(Some(id)) => self.state = BstState::Examining(id),
                BstState::Moving(None) => return Some(self.not_found()),
                BstState::Examining(id) => {
                    let Some(node) = self.tree.node(id) else {
                        return Some(self.not_found());
                    };
                    self.path.push(node.key());
                    self.state = BstState::Compared(id);
                    return Some(AnimationEvent::ExamineNode { key: node.key() });
                }
                BstState::Compared(id) => {
                    let Some(node) = self.tree.node(id) else {
                        return Some(self.not_found());
                    };
                    return Some(match bst::compare(self.key, node.key()) {
                        Step::Hit => {
                            self.state = BstState::Done;
                            AnimationEvent::Found { key: self.key, path: mem::take(&mut self.path) }
                        }
                        Step::Descend(direction) => {
                            self.state = BstState::Moving(node.child(direction));
                            AnimationEvent::Move { from: node.key(), direction }
                        }
                    });
                }
            }
        }
    }
}

impl FusedIterator for BstTrack<'_> {}

/// States of the hash track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HashState {
    /// Nothing emitted yet
    Start,
    /// Bucket computed and on display
    Visible(usize),
    /// Bucket computed but outside the displayed window
    Hidden(usize),
    /// Ready to report the result for a bucket
    Resolving(usize),
    /// A terminal event has been emitted
    Done,
}

/// Narrates a hash table lookup: compute hash, scan or note, then found or not found.
///
/// Visibility only changes what is narrated; the answer always comes from the full
/// bucket contents.
#[derive(Debug, Clone)]
pub struct HashTrack<'a> {
    /// Table being searched
    table: &'a ChainedHashTable,
    /// Searched key
    key: Key,
    /// Buckets `0..visible` are on display
    visible: usize,
    /// Current state
    state: HashState,
}

impl Iterator for HashTrack<'_> {
    type Item = AnimationEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            HashState::Done => None,
            HashState::Start => {
                let bucket = self.table.bucket_index(self.key);
                self.state = if bucket < self.visible {
                    HashState::Visible(bucket)
                } else {
                    HashState::Hidden(bucket)
                };
                Some(AnimationEvent::ComputeHash { key: self.key, bucket })
            }
            HashState::Visible(bucket) => {
                self.state = HashState::Resolving(bucket);
                Some(AnimationEvent::ScanBucket { bucket })
            }
            HashState::Hidden(bucket) => {
                self.state = HashState::Resolving(bucket);
                Some(AnimationEvent::BucketOutOfRange { bucket, visible: self.visible })
            }
            HashState::Resolving(bucket) => {
                self.state = HashState::Done;
                let chain = self.table.bucket(bucket);
                Some(match chain.iter().position(|&entry| entry == self.key) {
                    Some(hit) => AnimationEvent::Found {
                        key: self.key,
                        path: chain.iter().take(hit.saturating_add(1)).copied().collect(),
                    },
                    None => AnimationEvent::NotFound { path: chain.to_vec() },
                })
            }
        }
    }
}

impl FusedIterator for HashTrack<'_> {}

/// Both tracks of one search, generated eagerly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchAnimation {
    /// The searched key
    pub key: Key,
    /// Tree track events
    pub bst: Vec<AnimationEvent>,
    /// Hash track events
    pub hash: Vec<AnimationEvent>,
}

impl SearchAnimation {
    /// Answer reached by the tree track
    #[must_use]
    pub fn bst_found(&self) -> Option<bool> {
        self.bst.last().and_then(AnimationEvent::outcome)
    }

    /// Answer reached by the hash track
    #[must_use]
    pub fn hash_found(&self) -> Option<bool> {
        self.hash.last().and_then(AnimationEvent::outcome)
    }

    /// Keys compared by the tree track
    #[must_use]
    pub fn bst_path(&self) -> &[Key] {
        match self.bst.last() {
            Some(AnimationEvent::Found { path, .. } | AnimationEvent::NotFound { path }) => path,
            _ => &[],
        }
    }
}

/// Builds search narrations over a tree and a table without mutating them
#[derive(Debug, Clone, Copy)]
pub struct SearchAnimator<'a> {
    /// Tree to narrate
    tree: &'a BinarySearchTree,
    /// Table to narrate
    table: &'a ChainedHashTable,
    /// Buckets on display
    visible_buckets: usize,
}

impl<'a> SearchAnimator<'a> {
    /// Creates an animator showing [`DEFAULT_VISIBLE_BUCKETS`] buckets
    #[must_use]
    pub fn new(tree: &'a BinarySearchTree, table: &'a ChainedHashTable) -> Self {
        Self { tree, table, visible_buckets: DEFAULT_VISIBLE_BUCKETS }
    }

    /// Sets how many leading buckets the display shows
    #[must_use]
    pub fn with_visible_buckets(mut self, visible_buckets: usize) -> Self {
        self.visible_buckets = visible_buckets;
        self
    }

    /// Fresh tree track for a key
    #[must_use]
    pub fn bst_track(&self, key: Key) -> BstTrack<'a> {
        BstTrack { tree: self.tree, key, state: BstState::Start, path: Vec::new() }
    }

    /// Fresh hash track for a key
    #[must_use]
    pub fn hash_track(&self, key: Key) -> HashTrack<'a> {
        HashTrack {
            table: self.table,
            key,
            visible: self.visible_buckets.min(self.table.capacity()),
            state: HashState::Start,
        }
    }

    /// Runs both tracks to completion
    #[must_use]
    pub fn animate(&self, key: Key) -> SearchAnimation {
        SearchAnimation { key, bst: self.bst_track(key).collect(), hash: self.hash_track(key).collect() }
    }
}
