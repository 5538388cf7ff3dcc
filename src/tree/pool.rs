//! Hash-consing pool of canonical macro-cell nodes.
//!
//! Every node constructor consults the pool's intern table before
//! allocating, so structurally identical nodes are always the same `Arc`
//! instance. This is mandatory, not an optimization: the HashLife result
//! slots are keyed by node identity, and two structurally-equal-but-distinct
//! instances would silently miss that cache and degrade the algorithm back
//! to exponential time.
//!
//! The pool is explicit, process-scoped state: construct one per universe
//! family (or per test) and share it via `Arc`. All interior locking uses
//! short `parking_lot` mutexes; a lost-update race on insertion is benign
//! because both candidates are structurally identical.

use log::debug;
use parking_lot::Mutex;
use seahash::SeaHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::sync::Arc;

use super::node::{
    block8_center, block8_from_leaves, leaf_set, Layer, Node, NodeChildren, Quadrant, StepResult,
};
use crate::pos::Pos;

/// Number of intern-table shards; reduces contention when several
/// simulation threads share one pool.
const SHARD_COUNT: usize = 64;

type ShardMap = HashMap<NodeKey, Arc<Node>, BuildHasherDefault<SeaHasher>>;

/// The structural shape of a node: the intern-table key.
///
/// Branch children are identified by address, which is sound because the
/// table's value keeps them (transitively) alive for as long as the key
/// exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NodeKey {
    Leaf(u16),
    Branch([usize; 4]),
}

fn node_addr(node: &Arc<Node>) -> usize {
    Arc::as_ptr(node) as usize
}

/// A shared pool of canonical, interned macro-cell nodes.
pub struct NodePool {
    shards: Vec<Mutex<ShardMap>>,
    /// Canonical empty node per layer; index is `layer - 2`.
    empty_nodes: Mutex<Vec<Arc<Node>>>,
}

impl fmt::Debug for NodePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePool({:p})", self)
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}

impl NodePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT)
                .map(|_| Mutex::new(ShardMap::default()))
                .collect(),
            empty_nodes: Mutex::new(vec![]),
        }
    }

    fn shard_for(&self, key: &NodeKey) -> &Mutex<ShardMap> {
        let mut hasher = SeaHasher::new();
        key.hash(&mut hasher);
        &self.shards[hasher.finish() as usize % SHARD_COUNT]
    }

    /// Returns the canonical instance for `key`, building and inserting a
    /// new node if none exists yet.
    fn intern(&self, key: NodeKey, build: impl FnOnce() -> Node) -> Arc<Node> {
        let mut shard = self.shard_for(&key).lock();
        if let Some(existing) = shard.get(&key) {
            return Arc::clone(existing);
        }
        let node = Arc::new(build());
        shard.insert(key, Arc::clone(&node));
        node
    }

    /// Returns the canonical leaf node with the given 4x4 bitmap.
    pub fn leaf(&self, bits: u16) -> Arc<Node> {
        self.intern(NodeKey::Leaf(bits), || Node {
            layer: Layer::LEAF,
            population: u128::from(bits.count_ones()),
            children: NodeChildren::Leaf(bits),
            result_full: Mutex::new(None),
            result_step: Mutex::new(None),
        })
    }

    /// Returns the canonical branch node with the given children.
    ///
    /// # Panics
    ///
    /// Panics if the children are not all at the same layer, or if the
    /// result would exceed [`Layer::MAX`].
    pub fn join(&self, children: [Arc<Node>; 4]) -> Arc<Node> {
        let child_layer = children[0].layer();
        for child in &children[1..] {
            assert_eq!(child_layer, child.layer(), "mismatched child layers");
        }
        assert!(child_layer < Layer::MAX, "universe exceeds the coordinate domain");
        let key = NodeKey::Branch([
            node_addr(&children[0]),
            node_addr(&children[1]),
            node_addr(&children[2]),
            node_addr(&children[3]),
        ]);
        let population = children.iter().map(|child| child.population()).sum();
        self.intern(key, move || Node {
            layer: child_layer.parent_layer(),
            population,
            children: NodeChildren::Branch(children),
            result_full: Mutex::new(None),
            result_step: Mutex::new(None),
        })
    }

    /// Returns the canonical empty node at the given layer.
    ///
    /// The empty node of every layer is composed recursively of the empty
    /// nodes of the layer below; after the first call per layer this is
    /// O(1).
    pub fn empty(&self, layer: Layer) -> Arc<Node> {
        assert!(layer >= Layer::LEAF, "no nodes exist below layer 2");
        let mut empty_nodes = self.empty_nodes.lock();
        while empty_nodes.len() <= (layer.0 - 2) as usize {
            let next = match empty_nodes.last() {
                None => self.leaf(0),
                Some(e) => self.join([e.clone(), e.clone(), e.clone(), e.clone()]),
            };
            empty_nodes.push(next);
        }
        empty_nodes[(layer.0 - 2) as usize].clone()
    }

    /// Returns the four children of a branch node.
    ///
    /// # Panics
    ///
    /// Panics if `node` is a leaf.
    pub fn subdivide(&self, node: &Arc<Node>) -> [Arc<Node>; 4] {
        node.children()
            .expect("cannot subdivide a leaf node")
            .clone()
    }

    /// Returns the node one layer down centered on `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is a leaf (there is no layer below a leaf).
    pub fn centered_inner(&self, node: &Arc<Node>) -> Arc<Node> {
        let children = node.children().expect("cannot take the inner node of a leaf");
        if node.layer() == Layer(3) {
            let block = block8_from_leaves(
                children[0].leaf_bits().unwrap(),
                children[1].leaf_bits().unwrap(),
                children[2].leaf_bits().unwrap(),
                children[3].leaf_bits().unwrap(),
            );
            self.leaf(block8_center(block))
        } else {
            use Quadrant::*;
            self.join([
                children[0].child(Se).clone(),
                children[1].child(Sw).clone(),
                children[2].child(Ne).clone(),
                children[3].child(Nw).clone(),
            ])
        }
    }

    /// Returns a node identical to `node` except for the cell at the
    /// node-local position `pos`. The new node differs from the old one
    /// only along the path to `pos`; everything else is shared.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies outside the node's square; callers must
    /// pre-expand.
    #[must_use = "this method returns a new value instead of mutating its input"]
    pub fn set_cell(&self, node: &Arc<Node>, pos: Pos, alive: bool) -> Arc<Node> {
        assert!(
            node.layer().rect().contains(pos),
            "cell {} outside node bounds {}",
            pos,
            node.layer().rect(),
        );
        match node.children() {
            None => self.leaf(leaf_set(node.leaf_bits().unwrap(), pos.x, pos.y, alive)),
            Some(children) => {
                let half = node.layer().child_layer().len();
                let q = Quadrant::containing(pos, half);
                let mut new_children = children.clone();
                new_children[q.index()] =
                    self.set_cell(&children[q.index()], pos - q.offset(half), alive);
                self.join(new_children)
            }
        }
    }

    /// Number of canonical nodes currently interned.
    pub fn node_count(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Evicts every interned node not reachable from `roots`.
    ///
    /// Reachability follows children, cached advance results, and the
    /// canonical empty-node ladder. Eviction never affects correctness:
    /// nodes still referenced elsewhere stay alive through their `Arc`s and
    /// only lose canonical status, which costs recomputation, not
    /// incorrect results. Returns `(dropped, kept)`.
    pub fn gc<'a>(&self, roots: impl IntoIterator<Item = &'a Arc<Node>>) -> (usize, usize) {
        let mut reachable: HashSet<usize> = HashSet::new();
        let mut stack: Vec<Arc<Node>> = roots.into_iter().cloned().collect();
        stack.extend(self.empty_nodes.lock().iter().cloned());
        while let Some(node) = stack.pop() {
            if !reachable.insert(node_addr(&node)) {
                continue;
            }
            if let Some(children) = node.children() {
                stack.extend(children.iter().cloned());
            }
            if let Some(result) = &*node.result_full.lock() {
                stack.push(Arc::clone(result));
            }
            if let Some(StepResult { node: result, .. }) = &*node.result_step.lock() {
                stack.push(Arc::clone(result));
            }
        }

        let mut dropped = 0;
        let mut kept = 0;
        for shard in &self.shards {
            shard.lock().retain(|_, node| {
                if reachable.contains(&node_addr(node)) {
                    kept += 1;
                    true
                } else {
                    dropped += 1;
                    false
                }
            });
        }
        debug!("node pool gc: dropped {}, kept {}", dropped, kept);
        (dropped, kept)
    }
}
