//! The quadtree cell state: a canonical macro-cell root plus its placement
//! on the grid.
//!
//! [`CellTree`] is the representation the simulator operates on. The root
//! node covers a power-of-two square positioned by `base_pos`; the universe
//! outside the root is dead by definition, and every mutating operation
//! grows the root first so no alive cell is ever silently dropped.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;
use std::sync::Arc;

mod node;
mod pool;

pub use node::{Layer, Node, Quadrant};
pub(crate) use node::{block8_center, block8_from_leaves};
pub use pool::NodePool;

use crate::cells::CellState;
use crate::pos::Pos;
use crate::rect::Rect;


/// The smallest root layer: an 8x8 square. Keeping branch structure at the
/// root lets the simulator assume the root always has children.
const MIN_ROOT_LAYER: Layer = Layer(3);

/// A set of alive cells stored as a hash-consed quadtree.
///
/// Cloning is O(1) (the root is an `Arc`), translation is O(1) (only
/// `base_pos` moves), and all structural updates share unchanged subtrees
/// through the pool.
#[derive(Clone)]
pub struct CellTree {
    pool: Arc<NodePool>,
    root: Arc<Node>,
    base_pos: Pos,
}

impl fmt::Debug for CellTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellTree")
            .field("layer", &self.layer())
            .field("base_pos", &self.base_pos)
            .field("population", &self.population())
            .finish()
    }
}

impl Default for CellTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CellTree {
    /// Creates an empty universe with its own private node pool.
    pub fn new() -> Self {
        Self::with_pool(Arc::new(NodePool::new()))
    }

    /// Creates an empty universe backed by `pool`. Universes that share a
    /// pool share canonical nodes and memoized results.
    pub fn with_pool(pool: Arc<NodePool>) -> Self {
        let root = pool.empty(MIN_ROOT_LAYER);
        let half = MIN_ROOT_LAYER.len() / 2;
        Self {
            pool,
            root,
            base_pos: Pos::new(-half, -half),
        }
    }

    /// The node pool backing this universe.
    pub fn pool(&self) -> &Arc<NodePool> {
        &self.pool
    }
    /// The root node.
    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }
    /// The root node's layer.
    pub fn layer(&self) -> Layer {
        self.root.layer()
    }
    /// Grid position of the root's top-left corner.
    pub fn base_pos(&self) -> Pos {
        self.base_pos
    }
    /// The square of the grid covered by the root node.
    pub fn rect(&self) -> Rect {
        Rect::square(self.base_pos, self.layer().len())
    }

    /// Replaces the root with a node assumed to be centered on the current
    /// root's square, adjusting `base_pos` so cells keep their grid
    /// positions.
    pub(crate) fn set_root_centered(&mut self, new_root: Arc<Node>) {
        let offset = (self.layer().len() - new_root.layer().len()) / 2;
        self.base_pos += Pos::new(offset, offset);
        self.root = new_root;
    }

    /// Grows the root by one layer, keeping the same cells centered.
    ///
    /// Each child of the old root is wrapped in a new node where it sits in
    /// the corner nearest the center, so the old root occupies the middle
    /// of the new one.
    pub fn expand(&mut self) {
        let children = self.pool.subdivide(&self.root);
        let empty = self.pool.empty(self.root.layer().child_layer());
        let new_children = Quadrant::ALL.map(|q| {
            let mut grandchildren = [
                empty.clone(),
                empty.clone(),
                empty.clone(),
                empty.clone(),
            ];
            grandchildren[q.opposite().index()] = children[q.index()].clone();
            self.pool.join(grandchildren)
        });
        let half = self.layer().len() / 2;
        self.base_pos -= Pos::new(half, half);
        self.root = self.pool.join(new_children);
    }

    /// Expands the root while `predicate` holds.
    pub fn expand_while(&mut self, predicate: impl Fn(&CellTree) -> bool) {
        while predicate(self) {
            self.expand();
        }
    }

    /// Expands the root until it covers `rect`.
    pub fn expand_to(&mut self, rect: Rect) {
        self.expand_while(|this| !this.rect().contains_rect(&rect));
    }

    /// Shrinks the root as far as possible without dropping alive cells or
    /// going below the minimum root layer.
    pub fn shrink(&mut self) {
        while self.try_shrink() {}
    }

    fn try_shrink(&mut self) -> bool {
        if self.layer() <= MIN_ROOT_LAYER {
            return false;
        }
        let inner = self.pool.centered_inner(&self.root);
        if inner.population() == self.root.population() {
            self.set_root_centered(inner);
            true
        } else {
            false
        }
    }

    /// The state of the cell at `pos`. Positions outside the root are dead.
    pub fn get_cell(&self, pos: Pos) -> bool {
        self.rect().contains(pos) && self.root.cell_at(pos - self.base_pos)
    }

    /// Sets the cell at `pos`, expanding the root first if the position
    /// lies outside it.
    pub fn set_cell(&mut self, pos: Pos, alive: bool) {
        if !self.rect().contains(pos) {
            if !alive {
                return;
            }
            self.expand_to(Rect::single(pos));
        }
        self.root = self.pool.set_cell(&self.root, pos - self.base_pos, alive);
    }

    /// Evicts pool nodes unreachable from this universe's root. Returns
    /// `(dropped, kept)`.
    pub fn gc(&self) -> (usize, usize) {
        self.pool.gc(iter::once(&self.root))
    }

    /// Lifts any cell state into a tree backed by `pool`.
    pub fn from_cell_state<T: CellState>(pool: Arc<NodePool>, state: &T) -> Self {
        Self::build(pool, state.alive_cells().collect())
    }

    fn build(pool: Arc<NodePool>, cells: Vec<Pos>) -> Self {
        let mut tree = Self::with_pool(pool);
        match cells.first() {
            None => return tree,
            Some(&first) => {
                let bounds = cells
                    .iter()
                    .fold(Rect::single(first), |rect, &pos| rect.extend_to(pos));
                // Anchor the root at the bounding box so the initial tree is
                // as small as the contents allow.
                let side = bounds.width().max(bounds.height());
                let mut layer = MIN_ROOT_LAYER;
                while layer.len() < side {
                    layer = layer.parent_layer();
                }
                tree.root = tree.pool.empty(layer);
                tree.base_pos = bounds.min();
            }
        }
        for pos in cells {
            tree.root = tree.pool.set_cell(&tree.root, pos - tree.base_pos, true);
        }
        tree
    }
}

impl CellState for CellTree {
    fn from_alive_cells<I: IntoIterator<Item = Pos>>(cells: I) -> Self {
        Self::build(Arc::new(NodePool::new()), cells.into_iter().collect())
    }

    fn alive_cells(&self) -> Box<dyn Iterator<Item = Pos> + '_> {
        self.root.cells_in(self.base_pos, self.rect())
    }

    fn contains(&self, pos: Pos) -> bool {
        self.get_cell(pos)
    }
    fn population(&self) -> u128 {
        self.root.population()
    }
    fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    fn bounding_rect(&self) -> Rect {
        fn node_bounds(node: &Node, origin: Pos) -> Rect {
            if node.is_empty() {
                return Rect::ZERO;
            }
            match node.children() {
                None => node
                    .cells_in(origin, Rect::square(origin, node.layer().len()))
                    .fold(Rect::ZERO, |rect, pos| rect.extend_to(pos)),
                Some(children) => {
                    let half = node.layer().child_layer().len();
                    Quadrant::ALL
                        .iter()
                        .map(|&q| node_bounds(&children[q.index()], origin + q.offset(half)))
                        .fold(Rect::ZERO, |acc, rect| acc.union(&rect))
                }
            }
        }
        node_bounds(&self.root, self.base_pos)
    }

    fn cells_in_rect(&self, rect: Rect) -> Box<dyn Iterator<Item = Pos> + '_> {
        self.root.cells_in(self.base_pos, rect.intersect(&self.rect()))
    }

    fn with_cell(&self, pos: Pos, alive: bool) -> Self {
        let mut tree = self.clone();
        tree.set_cell(pos, alive);
        tree
    }

    fn offset_by(&self, delta: Pos) -> Self {
        let mut tree = self.clone();
        tree.base_pos += delta;
        tree
    }
}

impl PartialEq for CellTree {
    fn eq(&self, other: &Self) -> bool {
        self.population() == other.population() && self.alive_cells().eq(other.alive_cells())
    }
}
impl Eq for CellTree {}

impl Hash for CellTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.population().hash(state);
        for pos in self.alive_cells() {
            pos.hash(state);
        }
    }
}
