//! Axis-aligned half-open windows over the grid.

use std::fmt;

use crate::pos::Pos;

/// A half-open rectangular window `[top, bottom) x [left, right)`.
///
/// Invariant: `top <= bottom` and `left <= right`. A window with zero width
/// or height is legal and denotes "empty"; `Rect::ZERO` is the canonical
/// empty window at the origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rect {
    top: i64,
    left: i64,
    bottom: i64,
    right: i64,
}

impl Rect {
    /// The empty window at the origin.
    pub const ZERO: Rect = Rect {
        top: 0,
        left: 0,
        bottom: 0,
        right: 0,
    };

    /// Creates a window from its edges.
    ///
    /// # Panics
    ///
    /// Panics if `top > bottom` or `left > right`.
    pub fn new(top: i64, left: i64, bottom: i64, right: i64) -> Self {
        assert!(
            top <= bottom && left <= right,
            "degenerate window: [{}, {}) x [{}, {})",
            top,
            bottom,
            left,
            right,
        );
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
    /// Creates the 1x1 window containing exactly `pos`.
    #[inline]
    pub fn single(pos: Pos) -> Self {
        Self::new(pos.y, pos.x, pos.y + 1, pos.x + 1)
    }
    /// Creates the square window of the given side length with its top-left
    /// corner at `base`.
    #[inline]
    pub fn square(base: Pos, len: i64) -> Self {
        Self::new(base.y, base.x, base.y + len, base.x + len)
    }

    /// Top edge (inclusive).
    #[inline]
    pub fn top(&self) -> i64 {
        self.top
    }
    /// Left edge (inclusive).
    #[inline]
    pub fn left(&self) -> i64 {
        self.left
    }
    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i64 {
        self.bottom
    }
    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i64 {
        self.right
    }
    /// The top-left corner (the minimum contained position, if nonempty).
    #[inline]
    pub fn min(&self) -> Pos {
        Pos::new(self.left, self.top)
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> i64 {
        self.right - self.left
    }
    /// Number of rows.
    #[inline]
    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }
    /// Whether the window contains no positions at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
    /// Number of contained positions.
    pub fn area(&self) -> u128 {
        self.width() as u128 * self.height() as u128
    }

    /// Whether `pos` lies inside the window.
    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        self.left <= pos.x && pos.x < self.right && self.top <= pos.y && pos.y < self.bottom
    }
    /// Whether every position of `other` lies inside this window. Empty
    /// windows are contained everywhere.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (self.top <= other.top
                && other.bottom <= self.bottom
                && self.left <= other.left
                && other.right <= self.right)
    }

    /// The largest window contained in both `self` and `other` (possibly
    /// empty).
    pub fn intersect(&self, other: &Rect) -> Rect {
        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let bottom = self.bottom.min(other.bottom).max(top);
        let right = self.right.min(other.right).max(left);
        Rect::new(top, left, bottom, right)
    }
    /// The smallest window containing both `self` and `pos`. An empty window
    /// grows to exactly `[pos, pos + 1)`.
    pub fn extend_to(&self, pos: Pos) -> Rect {
        if self.is_empty() {
            Rect::single(pos)
        } else {
            Rect::new(
                self.top.min(pos.y),
                self.left.min(pos.x),
                self.bottom.max(pos.y + 1),
                self.right.max(pos.x + 1),
            )
        }
    }
    /// The smallest window containing both windows.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            *other
        } else if other.is_empty() {
            *self
        } else {
            Rect::new(
                self.top.min(other.top),
                self.left.min(other.left),
                self.bottom.max(other.bottom),
                self.right.max(other.right),
            )
        }
    }
    /// The same window translated by `delta`.
    pub fn offset_by(&self, delta: Pos) -> Rect {
        Rect::new(
            self.top + delta.y,
            self.left + delta.x,
            self.bottom + delta.y,
            self.right + delta.x,
        )
    }

    /// Returns a finite, restartable iterator over all contained positions
    /// in row-major order.
    pub fn iter(&self) -> RectIter {
        RectIter {
            rect: *self,
            next: if self.is_empty() {
                None
            } else {
                Some(self.min())
            },
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) x [{}, {})",
            self.top, self.bottom, self.left, self.right,
        )
    }
}

/// Row-major iterator over the positions of a [`Rect`].
#[derive(Debug, Clone)]
pub struct RectIter {
    rect: Rect,
    next: Option<Pos>,
}

impl Iterator for RectIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        let ret = self.next?;
        let mut next = Pos::new(ret.x + 1, ret.y);
        if next.x >= self.rect.right {
            next = Pos::new(self.rect.left, next.y + 1);
        }
        self.next = if next.y >= self.rect.bottom {
            None
        } else {
            Some(next)
        };
        Some(ret)
    }
}
