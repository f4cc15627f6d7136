//! Unbalanced binary search tree stored in an index arena.
//!
//! Children are referenced by [`NodeId`] instead of nested boxes, so every traversal
//! runs with an explicit stack and adversarial insertion orders cannot exhaust the
//! call stack.

use std::cmp::Ordering;

use tracing::debug;

use crate::Key;

/// Index of a node inside its tree's arena.
///
/// Ids are only meaningful for the tree that produced them and are invalidated by
/// [`BinarySearchTree::clear`] and [`BinarySearchTree::balance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Child side taken while descending the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards smaller keys
    Left,
    /// Towards keys greater than or equal to the node's key
    Right,
}

/// A single node of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Key stored in this node
    key: Key,
    /// Subtree with smaller keys
    left: Option<NodeId>,
    /// Subtree with greater keys
    right: Option<NodeId>,
}

impl TreeNode {
    /// Creates a node without children
    fn leaf(key: Key) -> Self {
        Self { key, left: None, right: None }
    }

    /// Key stored in this node
    #[must_use]
    pub fn key(&self) -> Key {
        self.key
    }

    /// Left child, if any
    #[must_use]
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child, if any
    #[must_use]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Child on the given side, if any
    #[must_use]
    pub fn child(&self, direction: Direction) -> Option<NodeId> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Returns true if the node has no children
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Existing children, left first
    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        self.left.into_iter().chain(self.right)
    }

    /// Mutable slot for the child on the given side
    fn child_slot_mut(&mut self, direction: Direction) -> &mut Option<NodeId> {
        match direction {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

/// Result of comparing a search key against one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The node holds the key
    Hit,
    /// The key, if present, lives on this side
    Descend(Direction),
}

/// Comparison rule shared by insert, search and the search animation.
///
/// Smaller keys go left, everything else goes right.
pub(crate) fn compare(key: Key, node_key: Key) -> Step {
    match key.cmp(&node_key) {
        Ordering::Equal => Step::Hit,
        Ordering::Less => Step::Descend(Direction::Left),
        Ordering::Greater => Step::Descend(Direction::Right),
    }
}

/// Keys compared during one lookup, in visiting order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchTrace {
    /// Whether the key was found
    pub found: bool,
    /// Keys of the visited nodes
    pub path: Vec<Key>,
}

/// Smallest possible height of a binary tree holding `node_count` nodes,
/// `⌈log2(n + 1)⌉`.
#[must_use]
pub fn minimal_height(node_count: usize) -> usize {
    let bits = usize::BITS.saturating_sub(node_count.leading_zeros());
    usize::try_from(bits).unwrap_or(usize::MAX)
}

/// An unbalanced binary search tree over integer keys.
///
/// The shape depends purely on insertion order. Rebalancing only happens through an
/// explicit call to [`balance`](Self::balance).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinarySearchTree {
    /// Arena owning every node
    nodes: Vec<TreeNode>,
    /// Root node, absent for an empty tree
    root: Option<NodeId>,
}

impl BinarySearchTree {
    /// Creates an empty tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a minimal-height tree from keys sorted in increasing order.
    ///
    /// The middle element of each range (the lower one for even lengths) becomes the
    /// subtree root.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn from_sorted(keys: &[Key]) -> Self {
        let mut tree = Self { nodes: Vec::with_capacity(keys.len()), root: None };
        let mut pending: Vec<(usize, usize, Option<(NodeId, Direction)>)> =
            vec![(0, keys.len(), None)];

        while let Some((start, end, parent)) = pending.pop() {
            if start >= end {
                continue;
            }
            let mid = start + (end - start - 1) / 2;
            let Some(&key) = keys.get(mid) else {
                continue;
            };

            let id = tree.push_leaf(key);
            match parent {
                None => tree.root = Some(id),
                Some((parent_id, direction)) => tree.attach(parent_id, direction, id),
            }

            pending.push((mid + 1, end, Some((id, Direction::Right))));
            pending.push((start, mid, Some((id, Direction::Left))));
        }

        tree
    }

    /// Inserts a key, creating a leaf at the first empty slot on its path.
    ///
    /// Returns false without changing the tree if the key is already present.
    pub fn insert(&mut self, key: Key) -> bool {
        let Some(mut current) = self.root else {
            let id = self.push_leaf(key);
            self.root = Some(id);
            return true;
        };

        let new_id = NodeId(self.nodes.len());
        loop {
            let Some(node) = self.nodes.get_mut(current.0) else {
                return false;
            };
            let direction = match compare(key, node.key) {
                Step::Hit => return false,
                Step::Descend(direction) => direction,
            };
            let slot = node.child_slot_mut(direction);
            match *slot {
                Some(next) => current = next,
                None => {
                    *slot = Some(new_id);
                    break;
                }
            }
        }

        self.nodes.push(TreeNode::leaf(key));
        true
    }

    /// Returns true if the key is stored in the tree
    #[must_use]
    pub fn search(&self, key: Key) -> bool {
        let mut current = self.root;
        while let Some(node) = current.and_then(|id| self.node(id)) {
            match compare(key, node.key) {
                Step::Hit => return true,
                Step::Descend(direction) => current = node.child(direction),
            }
        }
        false
    }

    /// Looks a key up and records every key compared on the way
    #[must_use]
    pub fn trace(&self, key: Key) -> SearchTrace {
        let mut trace = SearchTrace::default();
        let mut current = self.root;
        while let Some(node) = current.and_then(|id| self.node(id)) {
            trace.path.push(node.key);
            match compare(key, node.key) {
                Step::Hit => {
                    trace.found = true;
                    break;
                }
                Step::Descend(direction) => current = node.child(direction),
            }
        }
        trace
    }

    /// Discards every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Number of edges on the longest root-to-leaf path plus one, zero when empty
    #[must_use]
    pub fn height(&self) -> usize {
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        let mut height = 0;
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some(node) = self.node(id) {
                stack.extend(node.children().map(|child| (child, depth.saturating_add(1))));
            }
        }
        height
    }

    /// Number of nodes in the tree
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Root node id
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Node behind an id, if the id belongs to this tree
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Iterates over the nodes in key order
    #[must_use]
    pub fn in_order(&self) -> InOrder<'_> {
        InOrder { tree: self, stack: Vec::new(), current: self.root }
    }

    /// Stored keys in increasing order
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.in_order().map(|(_, node)| node.key).collect()
    }

    /// Rebuilds the tree into a minimal-height shape with the same keys.
    ///
    /// A no-op on an empty tree.
    pub fn balance(&mut self) {
        if self.is_empty() {
            return;
        }
        let before = self.height();
        *self = Self::from_sorted(&self.keys());
        debug!(nodes = self.node_count(), before, after = self.height(), "balanced tree");
    }

    /// Appends a leaf to the arena and returns its id
    fn push_leaf(&mut self, key: Key) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode::leaf(key));
        id
    }

    /// Links `child` under `parent` on the given side
    fn attach(&mut self, parent: NodeId, direction: Direction, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent.0) {
            *node.child_slot_mut(direction) = Some(child);
        }
    }
}

impl Extend<Key> for BinarySearchTree {
    fn extend<T: IntoIterator<Item = Key>>(&mut self, iter: T) {
        for key in iter {
            self.insert(key);
        }
    }
}

/// In-order iterator over the nodes of a tree
#[derive(Debug, Clone)]
pub struct InOrder<'a> {
    /// Tree being walked
    tree: &'a BinarySearchTree,
    /// Ancestors whose left subtree is being visited
    stack: Vec<NodeId>,
    /// Next subtree to descend into
    current: Option<NodeId>,
}

impl<'a> Iterator for InOrder<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.current {
            self.stack.push(id);
            self.current = self.tree.node(id).and_then(TreeNode::left);
        }
        let id = self.stack.pop()?;
        let node = self.tree.node(id)?;
        self.current = node.right;
        Some((id, node))
    }
}
