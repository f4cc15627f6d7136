//! Overlap-free 2-D placement of tree nodes for rendering.
//!
//! Columns come from two passes over the tree. An in-order pass numbers the nodes
//! `0..n`, and a post-order pass places each leaf at its number and each inner node at
//! the midpoint of its children. Because in-order numbers grow strictly from left to
//! right, sibling subtrees never share a column however unevenly the tree grows.

use std::collections::{BTreeMap, HashMap};

use crate::{
    Key,
    bst::{BinarySearchTree, NodeId},
};

/// Placement of one node in layout units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPosition {
    /// Node this position belongs to. Lookup only, it does not keep the node alive
    pub node: NodeId,
    /// Key of the node, for labelling
    pub key: Key,
    /// Horizontal position in in-order slots
    pub column: f64,
    /// Distance from the root, which sits at depth 0
    pub depth: usize,
}

/// Screen coordinates of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPosition {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
}

/// Conversion from layout units to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Pixels between neighbouring columns
    pub horizontal: f64,
    /// Pixels between neighbouring depths
    pub vertical: f64,
    /// Left margin
    pub margin_x: f64,
    /// Top margin
    pub margin_y: f64,
    /// Radius of a drawn node
    pub radius: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self::zoomed(1.0)
    }
}

impl Spacing {
    /// Base distance between columns and between depths at zoom 1
    pub const BASE_SPACING: f64 = 40.0;
    /// Margin around the drawing
    pub const MARGIN: f64 = 30.0;
    /// Node radius at zoom 1
    pub const BASE_RADIUS: f64 = 15.0;
    /// Smallest node radius at any zoom
    pub const MIN_RADIUS: f64 = 5.0;

    /// Spacing scaled by a zoom factor; margins stay fixed
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn zoomed(zoom: f64) -> Self {
        Self {
            horizontal: Self::BASE_SPACING * zoom,
            vertical: Self::BASE_SPACING * zoom,
            margin_x: Self::MARGIN,
            margin_y: Self::MARGIN,
            radius: (Self::BASE_RADIUS * zoom).max(Self::MIN_RADIUS),
        }
    }

    /// Pixel coordinates of a layout position
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn place(&self, position: &LayoutPosition) -> PixelPosition {
        PixelPosition {
            x: self.margin_x + position.column * self.horizontal,
            y: self.margin_y + position.depth as f64 * self.vertical,
        }
    }
}

/// Positions of every node of a tree snapshot.
///
/// Recomputed for every draw, never stored alongside the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// Positions keyed by node id
    positions: BTreeMap<NodeId, LayoutPosition>,
    /// Parent to child links
    edges: Vec<(NodeId, NodeId)>,
}

/// Pending step of the post-order walk
#[derive(Debug, Clone, Copy)]
struct Visit {
    /// Node to visit
    id: NodeId,
    /// Depth of the node
    depth: usize,
    /// Whether the children have already been scheduled
    expanded: bool,
}

/// Computes the position of every node in the tree.
///
/// An empty tree yields an empty layout.
#[must_use]
#[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
pub fn compute_layout(tree: &BinarySearchTree) -> Layout {
    let slots: HashMap<NodeId, usize> =
        tree.in_order().enumerate().map(|(slot, (id, _))| (id, slot)).collect();

    let mut layout = Layout::default();
    let mut stack: Vec<Visit> = tree
        .root()
        .map(|id| Visit { id, depth: 0, expanded: false })
        .into_iter()
        .collect();

    while let Some(visit) = stack.pop() {
        let Some(node) = tree.node(visit.id) else {
            continue;
        };

        if !visit.expanded {
            stack.push(Visit { expanded: true, ..visit });
            for child in node.children() {
                layout.edges.push((visit.id, child));
                stack.push(Visit { id: child, depth: visit.depth.saturating_add(1), expanded: false });
            }
            continue;
        }

        let left = node.left().and_then(|id| layout.column(id));
        let right = node.right().and_then(|id| layout.column(id));
        let column = match (left, right) {
            (Some(left), Some(right)) => (left + right) / 2.0,
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => slots.get(&visit.id).copied().unwrap_or_default() as f64,
        };

        layout.positions.insert(
            visit.id,
            LayoutPosition { node: visit.id, key: node.key(), column, depth: visit.depth },
        );
    }

    layout
}

impl Layout {
    /// Position of a node, if it was part of the laid out tree
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&LayoutPosition> {
        self.positions.get(&id)
    }

    /// Column of a node
    #[must_use]
    pub fn column(&self, id: NodeId) -> Option<f64> {
        self.get(id).map(|position| position.column)
    }

    /// Iterates over all positions in node id order
    pub fn iter(&self) -> impl Iterator<Item = &LayoutPosition> {
        self.positions.values()
    }

    /// Parent to child links, for drawing edges before nodes
    #[must_use]
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Number of placed nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the tree was empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Largest column in use
    #[must_use]
    pub fn max_column(&self) -> f64 {
        self.iter().map(|position| position.column).fold(0.0, f64::max)
    }

    /// Deepest level in use
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.iter().map(|position| position.depth).max().unwrap_or(0)
    }

    /// Nodes at or above `max_depth`; `None` counts every node
    #[must_use]
    pub fn visible_count(&self, max_depth: Option<usize>) -> usize {
        max_depth.map_or(self.len(), |limit| {
            self.iter().filter(|position| position.depth <= limit).count()
        })
    }

    /// Copy holding only the nodes at or above `max_depth` and the edges between them;
    /// `None` keeps every node
    #[must_use]
    pub fn truncated(&self, max_depth: Option<usize>) -> Self {
        let Some(limit) = max_depth else {
            return self.clone();
        };
        let positions: BTreeMap<NodeId, LayoutPosition> = self
            .positions
            .iter()
            .filter(|(_, position)| position.depth <= limit)
            .map(|(&id, &position)| (id, position))
            .collect();
        let edges = self.edges.iter().copied().filter(|(_, child)| positions.contains_key(child)).collect();
        Self { positions, edges }
    }

    /// Pixel coordinates of every node, in node id order
    #[must_use]
    pub fn to_pixels(&self, spacing: &Spacing) -> Vec<(LayoutPosition, PixelPosition)> {
        self.iter().map(|position| (*position, spacing.place(position))).collect()
    }
}
