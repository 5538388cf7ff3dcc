//! The memoized quadtree simulation algorithm.
//!
//! A node at layer `L` can be advanced by up to `2^(L-2)` generations
//! purely from its own contents, because in that time no influence from
//! outside the node can reach its centered `2^(L-1)` square. `advance`
//! computes that centered square one layer down, advanced by
//! `min(2^(L-2), 2^log2_step)` generations, and memoizes the result on the
//! node itself; hash consing makes every repeated subpattern anywhere in
//! the universe (or in its history) hit that cache.

use log::trace;
use num::BigUint;
use num::Zero;
use std::sync::Arc;

use super::rule::Rule;
use crate::cells::CellState;
use crate::rect::Rect;
use crate::tree::{block8_center, block8_from_leaves, CellTree, Layer, Node, NodePool, Quadrant};

/// A simulator for one outer-totalistic rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashLife {
    rule: Rule,
}

impl Default for HashLife {
    /// A simulator for Conway's Game of Life.
    fn default() -> Self {
        Self::new(Rule::LIFE)
    }
}

impl HashLife {
    /// Creates a simulator for `rule`.
    pub fn new(rule: Rule) -> Self {
        Self { rule }
    }

    /// The rule this simulator applies.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Advances `tree` by `gens` generations in place.
    ///
    /// The generation count is decomposed into powers of two and each power
    /// is applied as a single memoized jump, so the cost grows with the
    /// number of set bits rather than with the count itself.
    pub fn step(&self, tree: &mut CellTree, gens: &BigUint) {
        if gens.is_zero() || tree.is_empty() {
            return;
        }
        assert!(
            gens.bits() <= u64::from(Layer::MAX.0 - 1),
            "generation count exceeds the supported range",
        );
        for k in 0..gens.bits() {
            if gens.bit(k) {
                self.step_pow2(tree, k as u32);
            }
        }
    }

    /// Advances `tree` by exactly `2^log2_step` generations.
    fn step_pow2(&self, tree: &mut CellTree, log2_step: u32) {
        assert!(
            log2_step + 2 <= Layer::MAX.0,
            "step size 2^{} exceeds the coordinate domain",
            log2_step,
        );
        // Grow the root until the whole pattern, plus everything it could
        // reach at the speed of light in 2^log2_step generations, fits
        // inside the centered half-size square that `advance` returns.
        let min_layer = Layer((log2_step + 2).max(4));
        let bounds = tree.bounding_rect();
        tree.expand_while(|t| {
            if t.layer() < min_layer {
                return true;
            }
            let rect = t.rect();
            let inset = t.layer().len() / 4 + (1_i64 << log2_step);
            let safe = Rect::new(
                rect.top() + inset,
                rect.left() + inset,
                rect.bottom() - inset,
                rect.right() - inset,
            );
            !safe.contains_rect(&bounds)
        });
        let new_root = self.advance(tree.pool(), tree.root(), log2_step);
        tree.set_root_centered(new_root);
        tree.shrink();
        trace!(
            "advanced by 2^{} generations; layer {:?}, population {}",
            log2_step,
            tree.layer(),
            tree.population(),
        );
    }

    /// Returns the centered node one layer below `node`, advanced by
    /// `min(2^(L-2), 2^log2_step)` generations, where `L` is `node`'s
    /// layer.
    ///
    /// # Panics
    ///
    /// Panics if `node` is below layer 3, or if `log2_step` exceeds
    /// `L - 2`.
    pub fn advance(&self, pool: &Arc<NodePool>, node: &Arc<Node>, log2_step: u32) -> Arc<Node> {
        let layer = node.layer();
        assert!(layer >= Layer(3), "cannot advance a node below layer 3");
        assert!(
            log2_step <= layer.0 - 2,
            "step 2^{} too large for layer {:?}",
            log2_step,
            layer,
        );
        let full = log2_step == layer.0 - 2;

        if node.is_empty() {
            return pool.empty(layer.child_layer());
        }
        if let Some(result) = node.cached_advance(log2_step, full) {
            return result;
        }

        let result = if layer == Layer(3) {
            // Base case: run the rule directly on the 8x8 block. Cells
            // outside the block read as dead, which cannot corrupt the
            // center 4x4 within two generations.
            let children = node.children().expect("layer 3 nodes are branches");
            let mut block = block8_from_leaves(
                children[0].leaf_bits().unwrap(),
                children[1].leaf_bits().unwrap(),
                children[2].leaf_bits().unwrap(),
                children[3].leaf_bits().unwrap(),
            );
            for _ in 0..if full { 2 } else { 1 } {
                block = self.step8(block);
            }
            pool.leaf(block8_center(block))
        } else {
            use Quadrant::*;
            let gc = |outer, inner| Arc::clone(node.grandchild(outer, inner));

            // The nine overlapping half-size squares covering the node.
            let n00 = Arc::clone(node.child(Nw));
            let n01 = pool.join([gc(Nw, Ne), gc(Ne, Nw), gc(Nw, Se), gc(Ne, Sw)]);
            let n02 = Arc::clone(node.child(Ne));
            let n10 = pool.join([gc(Nw, Sw), gc(Nw, Se), gc(Sw, Nw), gc(Sw, Ne)]);
            let n11 = pool.centered_inner(node);
            let n12 = pool.join([gc(Ne, Sw), gc(Ne, Se), gc(Se, Nw), gc(Se, Ne)]);
            let n20 = Arc::clone(node.child(Sw));
            let n21 = pool.join([gc(Sw, Ne), gc(Se, Nw), gc(Sw, Se), gc(Se, Sw)]);
            let n22 = Arc::clone(node.child(Se));

            // When the step fills this layer's full capacity, both rounds
            // advance time; otherwise all the time is spent in the first
            // round and the second merely recenters.
            let first_step = if full { layer.0 - 3 } else { log2_step };
            let sub = |n: &Arc<Node>| self.advance(pool, n, first_step);
            let t00 = sub(&n00);
            let t01 = sub(&n01);
            let t02 = sub(&n02);
            let t10 = sub(&n10);
            let t11 = sub(&n11);
            let t12 = sub(&n12);
            let t20 = sub(&n20);
            let t21 = sub(&n21);
            let t22 = sub(&n22);

            let finish = |assembly: Arc<Node>| {
                if full {
                    self.advance(pool, &assembly, layer.0 - 3)
                } else {
                    pool.centered_inner(&assembly)
                }
            };
            let q_nw = finish(pool.join([t00, t01.clone(), t10.clone(), t11.clone()]));
            let q_ne = finish(pool.join([t01, t02, t11.clone(), t12.clone()]));
            let q_sw = finish(pool.join([t10, t11.clone(), t20, t21.clone()]));
            let q_se = finish(pool.join([t11, t12, t21, t22]));
            pool.join([q_nw, q_ne, q_sw, q_se])
        };

        node.cache_advance(log2_step, full, Arc::clone(&result));
        result
    }

    /// One generation of the rule on an 8x8 block, with everything outside
    /// the block dead.
    fn step8(&self, block: u64) -> u64 {
        let mut next = 0_u64;
        for y in 0..8_i64 {
            for x in 0..8_i64 {
                let mut neighbors = 0;
                for dy in -1..=1_i64 {
                    for dx in -1..=1_i64 {
                        if (dx, dy) == (0, 0) {
                            continue;
                        }
                        let (nx, ny) = (x + dx, y + dy);
                        if (0..8).contains(&nx)
                            && (0..8).contains(&ny)
                            && block >> (ny * 8 + nx) & 1 == 1
                        {
                            neighbors += 1;
                        }
                    }
                }
                let alive = block >> (y * 8 + x) & 1 == 1;
                if self.rule.next_state(alive, neighbors) {
                    next |= 1 << (y * 8 + x);
                }
            }
        }
        next
    }
}
