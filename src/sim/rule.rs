//! Outer-totalistic Life-like rules.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A birth/survival rule on the Moore neighborhood.
///
/// Bit `n` of `birth` (resp. `survival`) is set when a dead (resp. alive)
/// cell with exactly `n` alive neighbors is alive in the next generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    birth: u16,
    survival: u16,
}

/// Error parsing a rulestring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The string is not in `B.../S...` or `survival/birth` form.
    #[error("unrecognized rulestring {0:?}")]
    Unrecognized(String),
    /// A neighbor count outside `0..=8`.
    #[error("invalid neighbor count {0:?} in rulestring")]
    InvalidCount(char),
}

impl Rule {
    /// Conway's Game of Life, `B3/S23`.
    pub const LIFE: Rule = Rule {
        birth: 1 << 3,
        survival: 1 << 2 | 1 << 3,
    };

    /// Creates a rule from explicit neighbor-count lists.
    pub fn new(birth: &[u32], survival: &[u32]) -> Self {
        let mask = |counts: &[u32]| {
            counts.iter().fold(0_u16, |mask, &n| {
                assert!(n <= 8, "neighbor count {} out of range", n);
                mask | 1 << n
            })
        };
        Self {
            birth: mask(birth),
            survival: mask(survival),
        }
    }

    /// Whether this is the standard Life rule.
    pub fn is_life(self) -> bool {
        self == Self::LIFE
    }

    /// The state of a cell in the next generation, given its current state
    /// and its number of alive Moore neighbors.
    #[inline]
    pub fn next_state(self, alive: bool, neighbors: u32) -> bool {
        debug_assert!(neighbors <= 8);
        let mask = if alive { self.survival } else { self.birth };
        mask >> neighbors & 1 == 1
    }

    fn counts(mask: u16) -> impl Iterator<Item = u32> {
        (0..=8).filter(move |&n| mask >> n & 1 == 1)
    }
}

impl fmt::Display for Rule {
    /// Formats as a canonical `B.../S...` rulestring.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B")?;
        for n in Self::counts(self.birth) {
            write!(f, "{}", n)?;
        }
        write!(f, "/S")?;
        for n in Self::counts(self.survival) {
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    /// Parses `B3/S23` or the older `23/3` (survival first) form, case
    /// insensitively.
    fn from_str(s: &str) -> Result<Self, RuleError> {
        let parse_counts = |digits: &str| -> Result<u16, RuleError> {
            digits.chars().try_fold(0_u16, |mask, c| match c.to_digit(10) {
                Some(n) if n <= 8 => Ok(mask | 1 << n),
                _ => Err(RuleError::InvalidCount(c)),
            })
        };

        let s = s.trim();
        let (a, b) = s
            .split_once('/')
            .ok_or_else(|| RuleError::Unrecognized(s.to_owned()))?;
        let (a, b) = (a.trim(), b.trim());
        let strip =
            |part: &str, tag: char| -> Option<String> {
                let mut chars = part.chars();
                match chars.next() {
                    Some(c) if c.eq_ignore_ascii_case(&tag) => Some(chars.collect()),
                    _ => None,
                }
            };
        match (strip(a, 'B'), strip(b, 'S')) {
            (Some(birth), Some(survival)) => Ok(Self {
                birth: parse_counts(&birth)?,
                survival: parse_counts(&survival)?,
            }),
            (None, None) => Ok(Self {
                survival: parse_counts(a)?,
                birth: parse_counts(b)?,
            }),
            _ => Err(RuleError::Unrecognized(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_rule_table() {
        let rule = Rule::LIFE;
        for neighbors in 0..=8 {
            assert_eq!(neighbors == 3, rule.next_state(false, neighbors));
            assert_eq!(
                neighbors == 2 || neighbors == 3,
                rule.next_state(true, neighbors),
            );
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Rule::LIFE, "B3/S23".parse().unwrap());
        assert_eq!(Rule::LIFE, "b3/s23".parse().unwrap());
        assert_eq!(Rule::LIFE, "23/3".parse().unwrap());
        assert_eq!(Rule::LIFE, " B3 / S23 ".parse().unwrap());
        assert_eq!("B3/S23", Rule::LIFE.to_string());

        let highlife: Rule = "B36/S23".parse().unwrap();
        assert_eq!(Rule::new(&[3, 6], &[2, 3]), highlife);
        assert!(!highlife.is_life());
        assert!(highlife.next_state(false, 6));

        assert!("B3S23".parse::<Rule>().is_err());
        assert!("B9/S23".parse::<Rule>().is_err());
        assert!("B3/23".parse::<Rule>().is_err());
    }
}
