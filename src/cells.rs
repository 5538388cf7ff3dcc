//! The abstract "set of alive cells" capability and its plain concrete
//! representation.
//!
//! [`CellState`] is the contract between the engine, the serialization
//! codecs, and any presentation layer: a finite set of alive positions on
//! the unbounded grid, with functional (never in-place) updates. Every
//! operation other than the two required methods has a default
//! implementation expressed purely in terms of `alive_cells`, so a concrete
//! representation only overrides what it can do asymptotically better.

use std::collections::BTreeSet;
use std::iter;

use crate::pos::Pos;
use crate::rect::Rect;

/// A finite set of alive cells on the unbounded grid.
///
/// Implementations must yield alive cells in row-major order (the `Ord` of
/// [`Pos`]), with no duplicates, and must be cheap to clone. Equality of two
/// cell states is always content equality: the same set of alive positions,
/// regardless of representation.
pub trait CellState: Sized {
    /// Builds a state from an iterator of alive positions. Duplicates are
    /// allowed and collapse to a single alive cell.
    fn from_alive_cells<I: IntoIterator<Item = Pos>>(cells: I) -> Self;

    /// Returns a lazy, finite, restartable iterator over all alive cells in
    /// row-major order.
    fn alive_cells(&self) -> Box<dyn Iterator<Item = Pos> + '_>;

    /// Returns `true` if the cell at `pos` is alive.
    fn contains(&self, pos: Pos) -> bool {
        self.alive_cells().any(|p| p == pos)
    }
    /// Returns `true` if every cell in `cells` is alive. An empty iterator
    /// is vacuously contained.
    fn contains_all<I: IntoIterator<Item = Pos>>(&self, cells: I) -> bool {
        cells.into_iter().all(|pos| self.contains(pos))
    }
    /// Returns the number of alive cells.
    fn population(&self) -> u128 {
        self.alive_cells().count() as u128
    }
    /// Returns `true` if no cell is alive.
    fn is_empty(&self) -> bool {
        self.alive_cells().next().is_none()
    }

    /// Returns the minimal window enclosing all alive cells, or the
    /// zero-sized window at the origin if there are none.
    fn bounding_rect(&self) -> Rect {
        let mut cells = self.alive_cells();
        match cells.next() {
            None => Rect::ZERO,
            Some(first) => cells.fold(Rect::single(first), |rect, pos| rect.extend_to(pos)),
        }
    }

    /// Returns the alive cells inside `rect`, in row-major order.
    fn cells_in_rect(&self, rect: Rect) -> Box<dyn Iterator<Item = Pos> + '_> {
        Box::new(self.alive_cells().filter(move |&pos| rect.contains(pos)))
    }

    /// Returns a new state with the cell at `pos` set alive or dead. The
    /// input is never mutated.
    #[must_use = "this method returns a new value instead of mutating its input"]
    fn with_cell(&self, pos: Pos, alive: bool) -> Self {
        let rest = self.alive_cells().filter(move |&p| p != pos);
        if alive {
            // The appended cell breaks row-major order, but
            // `from_alive_cells` accepts cells in any order.
            Self::from_alive_cells(rest.chain(iter::once(pos)))
        } else {
            Self::from_alive_cells(rest)
        }
    }

    /// Returns a new state alive wherever either input is alive.
    #[must_use = "this method returns a new value instead of mutating its input"]
    fn union<T: CellState>(&self, other: &T) -> Self {
        Self::from_alive_cells(self.alive_cells().chain(other.alive_cells()))
    }

    /// Returns a new state with every alive cell translated by `delta`.
    #[must_use = "this method returns a new value instead of mutating its input"]
    fn offset_by(&self, delta: Pos) -> Self {
        Self::from_alive_cells(self.alive_cells().map(move |pos| pos + delta))
    }

    /// Content equality across representations.
    fn eq_cells<T: CellState>(&self, other: &T) -> bool {
        self.alive_cells().eq(other.alive_cells())
    }

    /// Equality modulo translation: both states have the same size, and
    /// translating this one so its bounding-box top-left corner coincides
    /// with the other's yields identical content.
    fn eq_modulo_offset<T: CellState>(&self, other: &T) -> bool {
        let a = self.bounding_rect();
        let b = other.bounding_rect();
        if a.width() != b.width() || a.height() != b.height() {
            return false;
        }
        let delta = b.min() - a.min();
        self.alive_cells()
            .map(|pos| pos + delta)
            .eq(other.alive_cells())
    }
}

/// The plain cell state: an explicit sorted set of alive positions.
///
/// This is the representation the text codecs in [`crate::io`] read and
/// write; lift it into a [`crate::tree::CellTree`] to simulate it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    cells: BTreeSet<Pos>,
}

impl Pattern {
    /// Creates an empty pattern.
    pub fn new() -> Self {
        Self::default()
    }
    /// Number of alive cells, without the `u128` widening of
    /// [`CellState::population`].
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    /// Returns `true` if no cell is alive.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    /// Sets the cell at `pos` alive or dead, in place.
    pub fn set(&mut self, pos: Pos, alive: bool) {
        if alive {
            self.cells.insert(pos);
        } else {
            self.cells.remove(&pos);
        }
    }
}

impl CellState for Pattern {
    fn from_alive_cells<I: IntoIterator<Item = Pos>>(cells: I) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }
    fn alive_cells(&self) -> Box<dyn Iterator<Item = Pos> + '_> {
        // `BTreeSet` iterates in `Ord` order, which is row-major for `Pos`.
        Box::new(self.cells.iter().copied())
    }
    fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }
    fn population(&self) -> u128 {
        self.cells.len() as u128
    }
    fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl iter::FromIterator<Pos> for Pattern {
    fn from_iter<I: IntoIterator<Item = Pos>>(iter: I) -> Self {
        Self::from_alive_cells(iter)
    }
}
impl Extend<Pos> for Pattern {
    fn extend<I: IntoIterator<Item = Pos>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}
impl<'a> IntoIterator for &'a Pattern {
    type Item = Pos;
    type IntoIter = iter::Copied<std::collections::btree_set::Iter<'a, Pos>>;
    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter().copied()
    }
}
