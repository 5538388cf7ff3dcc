//! Quadtree macro-cell nodes.
//!
//! A node at layer `L` represents a `2^L x 2^L` square of cells: layer 2 is
//! a leaf holding a 4x4 bitmap in a `u16`, and every layer above is a
//! branch holding four children at exactly layer `L-1` (NW, NE, SW, SE).
//! Nodes are immutable once constructed and always obtained through a
//! [`super::NodePool`], which guarantees that structurally identical nodes
//! are the same `Arc` instance; that identity is what keys the memoized
//! HashLife results stored in each node.

use itertools::Itertools;
use parking_lot::Mutex;
use std::fmt;
use std::iter;
use std::sync::Arc;

use crate::pos::Pos;
use crate::rect::Rect;

/// The log2 of a node's side length in cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Layer(pub u32);

impl Layer {
    /// The layer of a leaf node: a 4x4 block.
    pub const LEAF: Layer = Layer(2);
    /// The largest supported layer. Above this, side lengths no longer fit
    /// in the coordinate domain.
    pub const MAX: Layer = Layer(62);

    /// Side length of a node at this layer, in cells.
    #[inline]
    pub fn len(self) -> i64 {
        assert!(self <= Self::MAX, "layer {:?} exceeds the coordinate domain", self);
        1_i64 << self.0
    }
    /// The layer of this layer's children.
    #[inline]
    pub fn child_layer(self) -> Layer {
        Layer(self.0 - 1)
    }
    /// The layer of this layer's parent.
    #[inline]
    pub fn parent_layer(self) -> Layer {
        Layer(self.0 + 1)
    }
    /// The node-local window `[0, 2^L) x [0, 2^L)`.
    #[inline]
    pub fn rect(self) -> Rect {
        Rect::square(crate::pos::ORIGIN, self.len())
    }
}

/// One quadrant of a branch node, in child-array order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Top-left.
    Nw = 0,
    /// Top-right.
    Ne = 1,
    /// Bottom-left.
    Sw = 2,
    /// Bottom-right.
    Se = 3,
}

impl Quadrant {
    /// All four quadrants in row-major order.
    pub const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];

    /// Index into a child array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
    /// The quadrant from a child-array index.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }
    /// The diagonally opposite quadrant.
    #[inline]
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() ^ 3)
    }
    /// Offset of this quadrant's top-left corner within a parent whose
    /// children have side length `half`.
    #[inline]
    pub fn offset(self, half: i64) -> Pos {
        let i = self.index() as i64;
        Pos::new((i & 1) * half, (i >> 1) * half)
    }
    /// The quadrant of a parent node containing the node-local position
    /// `pos`, where the parent's children have side length `half`.
    #[inline]
    pub fn containing(pos: Pos, half: i64) -> Self {
        let x_bit = (pos.x >= half) as usize;
        let y_bit = (pos.y >= half) as usize;
        Self::from_index(y_bit << 1 | x_bit)
    }
}

/// The structural content of a node.
pub(super) enum NodeChildren {
    /// A 4x4 bitmap; bit `y * 4 + x` is the cell at `(x, y)`.
    Leaf(u16),
    /// Four children at one layer below, in [`Quadrant`] order.
    Branch([Arc<Node>; 4]),
}

/// A cached "advanced by `2^log2_step` generations" result.
pub(super) struct StepResult {
    pub(super) log2_step: u32,
    pub(super) node: Arc<Node>,
}

/// An immutable, canonical macro-cell.
///
/// The two result slots are the HashLife memoization caches: `result_full`
/// holds the node advanced by its maximal `2^(L-2)`-generation jump and is
/// strictly additive (an entry, once computed, is valid forever);
/// `result_step` holds the most recent smaller-step result, tagged with its
/// step size. Neither slot participates in structural identity.
pub struct Node {
    pub(super) layer: Layer,
    pub(super) population: u128,
    pub(super) children: NodeChildren,
    pub(super) result_full: Mutex<Option<Arc<Node>>>,
    pub(super) result_step: Mutex<Option<StepResult>>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("layer", &self.layer)
            .field("population", &self.population)
            .finish()
    }
}

impl Node {
    /// The layer of this node.
    #[inline]
    pub fn layer(&self) -> Layer {
        self.layer
    }
    /// Number of alive cells in this node's square.
    #[inline]
    pub fn population(&self) -> u128 {
        self.population
    }
    /// Whether every cell in this node's square is dead.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.population == 0
    }
    /// Whether this is a leaf node.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.children, NodeChildren::Leaf(_))
    }

    /// The four children of a branch node, or `None` for a leaf.
    pub fn children(&self) -> Option<&[Arc<Node>; 4]> {
        match &self.children {
            NodeChildren::Leaf(_) => None,
            NodeChildren::Branch(children) => Some(children),
        }
    }
    /// The child in the given quadrant.
    ///
    /// # Panics
    ///
    /// Panics if this is a leaf node.
    pub fn child(&self, quadrant: Quadrant) -> &Arc<Node> {
        &self.children().expect("leaf nodes have no children")[quadrant.index()]
    }
    /// The grandchild in `inner` of the child in `outer`.
    pub fn grandchild(&self, outer: Quadrant, inner: Quadrant) -> &Arc<Node> {
        self.child(outer).child(inner)
    }
    /// The 4x4 bitmap of a leaf node, or `None` for a branch.
    pub fn leaf_bits(&self) -> Option<u16> {
        match self.children {
            NodeChildren::Leaf(bits) => Some(bits),
            NodeChildren::Branch(_) => None,
        }
    }

    /// Looks up a memoized advance result: the full `2^(L-2)` jump when
    /// `full`, otherwise the last cached result for exactly `log2_step`.
    pub(crate) fn cached_advance(&self, log2_step: u32, full: bool) -> Option<Arc<Node>> {
        if full {
            self.result_full.lock().clone()
        } else {
            match &*self.result_step.lock() {
                Some(result) if result.log2_step == log2_step => Some(Arc::clone(&result.node)),
                _ => None,
            }
        }
    }

    /// Memoizes an advance result. The full-jump slot is only ever written
    /// once per node in practice; the step slot overwrites freely.
    pub(crate) fn cache_advance(&self, log2_step: u32, full: bool, result: Arc<Node>) {
        if full {
            *self.result_full.lock() = Some(result);
        } else {
            *self.result_step.lock() = Some(StepResult {
                log2_step,
                node: result,
            });
        }
    }

    /// The state of the cell at the node-local position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies outside `[0, 2^L)` on either axis; callers must
    /// pre-expand instead of relying on out-of-bounds reads.
    pub fn cell_at(&self, pos: Pos) -> bool {
        assert!(
            self.layer.rect().contains(pos),
            "cell {} outside node bounds {}",
            pos,
            self.layer.rect(),
        );
        match &self.children {
            NodeChildren::Leaf(bits) => leaf_get(*bits, pos.x, pos.y),
            NodeChildren::Branch(children) => {
                let half = self.layer.child_layer().len();
                let q = Quadrant::containing(pos, half);
                children[q.index()].cell_at(pos - q.offset(half))
            }
        }
    }

    /// Returns a lazy iterator over the alive cells of this node that fall
    /// within `window`, translated so the node's top-left corner is at
    /// `origin`. Cells are produced in row-major order.
    ///
    /// Empty subtrees and subtrees disjoint from the window are pruned
    /// without being visited, so enumerating a small window of an enormous
    /// sparse universe is cheap.
    pub fn cells_in(&self, origin: Pos, window: Rect) -> Box<dyn Iterator<Item = Pos> + '_> {
        if self.is_empty() {
            return Box::new(iter::empty());
        }
        let node_rect = Rect::square(origin, self.layer.len());
        let clipped = node_rect.intersect(&window);
        if clipped.is_empty() {
            return Box::new(iter::empty());
        }
        match &self.children {
            NodeChildren::Leaf(bits) => {
                let bits = *bits;
                Box::new(
                    Layer::LEAF
                        .rect()
                        .iter()
                        .filter(move |p| leaf_get(bits, p.x, p.y))
                        .map(move |p| p + origin)
                        .filter(move |&p| clipped.contains(p)),
                )
            }
            NodeChildren::Branch(children) => {
                let half = self.layer.child_layer().len();
                // Each child's stream is row-major, so a k-way merge of the
                // four streams is row-major for the whole node.
                Box::new(
                    Quadrant::ALL
                        .iter()
                        .map(move |&q| children[q.index()].cells_in(origin + q.offset(half), clipped))
                        .kmerge(),
                )
            }
        }
    }
}

/// Reads bit `(x, y)` of a 4x4 leaf bitmap.
#[inline]
pub(crate) fn leaf_get(bits: u16, x: i64, y: i64) -> bool {
    debug_assert!((0..4).contains(&x) && (0..4).contains(&y));
    bits >> (y * 4 + x) & 1 == 1
}

/// Returns a 4x4 leaf bitmap with bit `(x, y)` set or cleared.
#[inline]
pub(crate) fn leaf_set(bits: u16, x: i64, y: i64, alive: bool) -> u16 {
    debug_assert!((0..4).contains(&x) && (0..4).contains(&y));
    let mask = 1 << (y * 4 + x);
    if alive {
        bits | mask
    } else {
        bits & !mask
    }
}

/// Assembles an 8x8 bitboard (bit `y * 8 + x`) from four 4x4 leaf bitmaps.
pub(crate) fn block8_from_leaves(nw: u16, ne: u16, sw: u16, se: u16) -> u64 {
    let mut block = 0_u64;
    for y in 0..4 {
        for x in 0..4 {
            if leaf_get(nw, x, y) {
                block |= 1 << (y * 8 + x);
            }
            if leaf_get(ne, x, y) {
                block |= 1 << (y * 8 + x + 4);
            }
            if leaf_get(sw, x, y) {
                block |= 1 << ((y + 4) * 8 + x);
            }
            if leaf_get(se, x, y) {
                block |= 1 << ((y + 4) * 8 + x + 4);
            }
        }
    }
    block
}

/// Extracts the centered 4x4 leaf bitmap from an 8x8 bitboard.
pub(crate) fn block8_center(block: u64) -> u16 {
    let mut bits = 0_u16;
    for y in 0..4_i64 {
        for x in 0..4_i64 {
            if block >> ((y + 2) * 8 + x + 2) & 1 == 1 {
                bits = leaf_set(bits, x, y, true);
            }
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_bit_layout() {
        let mut bits = 0;
        bits = leaf_set(bits, 0, 0, true);
        bits = leaf_set(bits, 3, 0, true);
        bits = leaf_set(bits, 0, 3, true);
        assert_eq!(0b0001_0000_0000_1001, bits);
        assert!(leaf_get(bits, 0, 0));
        assert!(leaf_get(bits, 3, 0));
        assert!(leaf_get(bits, 0, 3));
        assert!(!leaf_get(bits, 1, 1));
        assert_eq!(0, leaf_set(leaf_set(0, 2, 2, true), 2, 2, false));
    }

    #[test]
    fn test_block8_round_trip() {
        // A single cell in each quadrant of the center 4x4.
        let nw = leaf_set(0, 3, 3, true); // global (3, 3)
        let ne = leaf_set(0, 0, 2, true); // global (4, 2)
        let sw = leaf_set(0, 2, 0, true); // global (2, 4)
        let se = leaf_set(0, 1, 1, true); // global (5, 5)
        let block = block8_from_leaves(nw, ne, sw, se);
        assert_eq!(4, block.count_ones());
        let center = block8_center(block);
        // Center window covers global (2..6, 2..6); all four cells survive,
        // shifted by (-2, -2).
        assert!(leaf_get(center, 1, 1));
        assert!(leaf_get(center, 2, 0));
        assert!(leaf_get(center, 0, 2));
        assert!(leaf_get(center, 3, 3));
        assert_eq!(4, center.count_ones());
    }

    #[test]
    fn test_quadrant_geometry() {
        assert_eq!(Quadrant::Se, Quadrant::Nw.opposite());
        assert_eq!(Quadrant::Sw, Quadrant::Ne.opposite());
        assert_eq!(Pos::new(0, 0), Quadrant::Nw.offset(8));
        assert_eq!(Pos::new(8, 0), Quadrant::Ne.offset(8));
        assert_eq!(Pos::new(0, 8), Quadrant::Sw.offset(8));
        assert_eq!(Pos::new(8, 8), Quadrant::Se.offset(8));
        assert_eq!(Quadrant::Nw, Quadrant::containing(Pos::new(7, 7), 8));
        assert_eq!(Quadrant::Se, Quadrant::containing(Pos::new(8, 8), 8));
        assert_eq!(Quadrant::Ne, Quadrant::containing(Pos::new(8, 7), 8));
    }
}
