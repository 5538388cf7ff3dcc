//! Two-state cellular automaton storage and HashLife simulation backend.
//!
//! The universe is an unbounded 2D grid of dead/alive cells, stored as a
//! quadtree of **macro-cells**: a node at layer `L` covers a `2^L`-cell
//! square, either as a 4x4 leaf bitmap (layer 2) or as four children at
//! layer `L-1`. Structurally identical nodes are hash-consed into a single
//! canonical instance per [`tree::NodePool`], which is what makes the
//! memoized HashLife advance in [`sim::HashLife`] possible.
//!
//! Everything the engine hands out is an immutable value: editing or
//! advancing a [`tree::CellTree`] produces a new tree sharing almost all of
//! its structure with the old one.

#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![deny(clippy::correctness)]

pub mod cells;
pub mod io;
pub mod pos;
pub mod rect;
pub mod sim;
pub mod tree;

/// Re-exports of the types needed for typical use of the crate.
pub mod prelude {
    pub use crate::cells::{CellState, Pattern};
    pub use crate::io::{detect_and_deserialize, PatternFormat};
    pub use crate::pos::Pos;
    pub use crate::rect::Rect;
    pub use crate::sim::{HashLife, Rule};
    pub use crate::tree::{CellTree, Layer, NodePool};
}
