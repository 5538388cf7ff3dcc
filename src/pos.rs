//! Signed 2D grid coordinates.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A position on the grid, or an offset between two positions.
///
/// `y` increases downward, matching the row order of the text pattern
/// formats. Ordering is row-major: positions are compared by `y` first and
/// then by `x`, so a sorted sequence of positions reads like lines of text.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pos {
    /// Horizontal coordinate, increasing rightward.
    pub x: i64,
    /// Vertical coordinate, increasing downward.
    pub y: i64,
}

/// The origin, `(0, 0)`.
pub const ORIGIN: Pos = Pos { x: 0, y: 0 };

impl Pos {
    /// Creates a position from its coordinates.
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl Ord for Pos {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}
impl PartialOrd for Pos {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Pos {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}
impl Sub for Pos {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}
impl Neg for Pos {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}
impl AddAssign for Pos {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for Pos {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_ordering_is_row_major() {
        let mut positions = vec![
            Pos::new(1, 1),
            Pos::new(0, 2),
            Pos::new(5, 0),
            Pos::new(-3, 1),
            Pos::new(0, 0),
        ];
        positions.sort();
        assert_eq!(
            vec![
                Pos::new(0, 0),
                Pos::new(5, 0),
                Pos::new(-3, 1),
                Pos::new(1, 1),
                Pos::new(0, 2),
            ],
            positions,
        );
    }

    #[test]
    fn test_pos_arithmetic() {
        let a = Pos::new(3, -4);
        let b = Pos::new(-1, 10);
        assert_eq!(Pos::new(2, 6), a + b);
        assert_eq!(Pos::new(4, -14), a - b);
        assert_eq!(Pos::new(-3, 4), -a);
        let mut c = a;
        c += b;
        c -= b;
        assert_eq!(a, c);
    }
}
