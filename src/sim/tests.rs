use num::BigUint;
use proptest::prelude::*;
use std::collections::BTreeSet;

use super::*;
use crate::cells::{CellState, Pattern};
use crate::io::PatternFormat;
use crate::pos::Pos;
use crate::tree::CellTree;

/// Straightforward one-generation reference implementation.
fn naive_step(pattern: &Pattern, rule: Rule) -> Pattern {
    let mut candidates: BTreeSet<Pos> = BTreeSet::new();
    for pos in pattern.alive_cells() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                candidates.insert(pos + Pos::new(dx, dy));
            }
        }
    }
    candidates
        .into_iter()
        .filter(|&pos| {
            let mut neighbors = 0;
            for dy in -1..=1_i64 {
                for dx in -1..=1_i64 {
                    if (dx, dy) != (0, 0) && pattern.contains(pos + Pos::new(dx, dy)) {
                        neighbors += 1;
                    }
                }
            }
            rule.next_state(pattern.contains(pos), neighbors)
        })
        .collect()
}

fn step_by(sim: &HashLife, tree: &mut CellTree, gens: u64) {
    sim.step(tree, &BigUint::from(gens));
}

#[test]
fn test_blinker_oscillates() {
    let sim = HashLife::default();
    let blinker: Vec<Pos> = vec![Pos::new(1, 0), Pos::new(1, 1), Pos::new(1, 2)];
    let mut tree = CellTree::from_alive_cells(blinker.iter().copied());

    step_by(&sim, &mut tree, 1);
    let horizontal: Vec<Pos> = tree.alive_cells().collect();
    assert_eq!(
        vec![Pos::new(0, 1), Pos::new(1, 1), Pos::new(2, 1)],
        horizontal,
    );

    step_by(&sim, &mut tree, 1);
    let vertical: Vec<Pos> = tree.alive_cells().collect();
    assert_eq!(blinker, vertical);
}

#[test]
fn test_glider_translates() {
    let sim = HashLife::default();
    let glider = Pattern::from_alive_cells(
        [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]
            .iter()
            .map(|&(x, y)| Pos::new(x, y)),
    );
    let mut tree = CellTree::from_alive_cells(&glider);
    step_by(&sim, &mut tree, 4);
    // A glider moves one cell diagonally every four generations.
    assert!(tree.eq_cells(&glider.offset_by(Pos::new(1, 1))));
}

#[test]
fn test_zero_generations_is_identity() {
    let sim = HashLife::default();
    let original = CellTree::from_alive_cells(vec![Pos::new(0, 0), Pos::new(5, -5)]);
    let mut tree = original.clone();
    sim.step(&mut tree, &BigUint::from(0_u32));
    assert_eq!(original, tree);
}

#[test]
fn test_empty_universe_stays_empty() {
    let sim = HashLife::default();
    let mut tree = CellTree::new();
    step_by(&sim, &mut tree, 1_000_000);
    assert!(tree.is_empty());
}

#[test]
fn test_gosper_gun_emits_glider() {
    let lines: Vec<&str> = vec![
        "x = 36, y = 9, rule = B3/S23",
        "24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$2o8bo3bob2o\
         4bobo$10bo5bo7bo$11bo3bo$12b2o!",
    ];
    let loaded = PatternFormat::Rle.deserialize(&lines).unwrap();
    assert!(loaded.warnings.is_empty());
    let gun = loaded.pattern;
    assert_eq!(36, gun.len());

    let sim = HashLife::default();
    let mut tree = CellTree::from_alive_cells(&gun);
    step_by(&sim, &mut tree, 30);
    // After 30 generations the gun has released its first glider.
    assert_eq!(41, tree.population());
    assert!(!tree.eq_cells(&gun));
}

proptest! {
    /// A memoized jump of `gens` generations matches `gens` applications of
    /// the one-generation reference rule.
    #[test]
    fn test_matches_naive_reference(
        cells in prop::collection::btree_set(
            (-12_i64..12, -12_i64..12).prop_map(|(x, y)| Pos::new(x, y)),
            0..50,
        ),
        gens in 0_u64..10,
    ) {
        let sim = HashLife::default();
        let mut expected = Pattern::from_alive_cells(cells.iter().copied());
        for _ in 0..gens {
            expected = naive_step(&expected, sim.rule());
        }
        let mut tree = CellTree::from_alive_cells(cells.iter().copied());
        step_by(&sim, &mut tree, gens);
        prop_assert!(tree.eq_cells(&expected));
    }

    /// Stepping is additive: `a` then `b` generations equals `a + b`.
    #[test]
    fn test_steps_compose(
        cells in prop::collection::btree_set(
            (-10_i64..10, -10_i64..10).prop_map(|(x, y)| Pos::new(x, y)),
            0..40,
        ),
        a in 0_u64..8,
        b in 0_u64..8,
    ) {
        let sim = HashLife::default();
        let mut split = CellTree::from_alive_cells(cells.iter().copied());
        step_by(&sim, &mut split, a);
        step_by(&sim, &mut split, b);
        let mut joined = CellTree::from_alive_cells(cells.iter().copied());
        step_by(&sim, &mut joined, a + b);
        prop_assert_eq!(split, joined);
    }
}
