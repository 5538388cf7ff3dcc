//! Pattern file formats.
//!
//! Four text formats are supported: plaintext (`.cells`), Life 1.05 and
//! Life 1.06 (`.lif`), and run-length encoded (`.rle`). Deserialization is
//! forgiving: recoverable oddities become [`LoadWarning`]s attached to the
//! successful result, and only unrecoverable problems produce a [`Failed`]
//! value. [`detect_and_deserialize`] uses the warning counts to pick the
//! most plausible format for input whose format is unknown or mislabeled.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::cells::{CellState, Pattern};
use crate::pos::Pos;
use crate::sim::Rule;

mod life105;
mod life106;
mod plaintext;
mod rle;

/// A pattern text format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PatternFormat {
    /// `.cells`: rows of `.` and `O`, `!` comments.
    Plaintext,
    /// `#Life 1.05`: `.`/`*` rows in `#P`-positioned blocks.
    Life105,
    /// `#Life 1.06`: one `x y` coordinate pair per line.
    Life106,
    /// Run-length encoded, with an `x = ..., y = ...` header.
    Rle,
}

impl PatternFormat {
    /// All formats, in the order the detector tries them.
    pub const ALL: [PatternFormat; 4] = [
        PatternFormat::Rle,
        PatternFormat::Life106,
        PatternFormat::Life105,
        PatternFormat::Plaintext,
    ];

    /// Guesses a format from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "cells" | "txt" => Some(Self::Plaintext),
            // `.lif` is shared by both Life formats; detection sorts it out.
            "lif" | "life" => Some(Self::Life105),
            "rle" => Some(Self::Rle),
            _ => None,
        }
    }

    /// Parses `lines` as this format.
    pub fn deserialize(self, lines: &[&str]) -> DeserializeResult {
        match self {
            Self::Plaintext => plaintext::deserialize(lines),
            Self::Life105 => life105::deserialize(lines),
            Self::Life106 => life106::deserialize(lines),
            Self::Rle => rle::deserialize(lines),
        }
    }

    /// Writes `state` in this format, rendering cell positions relative to
    /// the bounding rectangle. The result ends with a trailing newline
    /// unless the pattern is empty.
    pub fn serialize<T: CellState>(self, state: &T) -> String {
        match self {
            Self::Plaintext => plaintext::serialize(state),
            Self::Life105 => life105::serialize(state),
            Self::Life106 => life106::serialize(state),
            Self::Rle => rle::serialize(state),
        }
    }
}

impl fmt::Display for PatternFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plaintext => "plaintext",
            Self::Life105 => "Life 1.05",
            Self::Life106 => "Life 1.06",
            Self::Rle => "RLE",
        })
    }
}

impl FromStr for PatternFormat {
    type Err = UnrecognizedFormat;

    fn from_str(s: &str) -> Result<Self, UnrecognizedFormat> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "cells" => Ok(Self::Plaintext),
            "life 1.05" | "life105" | "1.05" => Ok(Self::Life105),
            "life 1.06" | "life106" | "1.06" => Ok(Self::Life106),
            "rle" => Ok(Self::Rle),
            _ => Err(UnrecognizedFormat(s.to_owned())),
        }
    }
}

/// Error parsing a [`PatternFormat`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized pattern format {0:?}")]
pub struct UnrecognizedFormat(pub String);

/// A recoverable oddity encountered while parsing; the pattern still
/// loaded. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadWarning {
    /// A character with no meaning in the format, treated as a dead cell.
    #[error("unknown character {ch:?} on line {line}")]
    UnknownCharacter {
        /// 1-based source line.
        line: usize,
        /// The offending character.
        ch: char,
    },
    /// A blank line where the format expects content.
    #[error("unexpected blank line {line}")]
    UnexpectedBlankLine {
        /// 1-based source line.
        line: usize,
    },
    /// An alive cell outside the extent declared in the header; the run
    /// is truncated at the extent boundary.
    #[error("cell at {pos} lies outside the declared extent")]
    OutsideExtent {
        /// Grid position of the first dropped cell.
        pos: Pos,
    },
    /// Non-comment content after the pattern terminator.
    #[error("content after the pattern terminator on line {line}")]
    TrailingContent {
        /// 1-based source line.
        line: usize,
    },
}

/// An unrecoverable problem; no pattern could be produced. Line numbers
/// are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The format's mandatory header line is absent.
    #[error("missing {0} header")]
    MissingHeader(PatternFormat),
    /// A header line is present but unparseable.
    #[error("malformed header on line {line}: {text:?}")]
    MalformedHeader {
        /// 1-based source line.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// A rulestring that does not parse.
    #[error("unsupported rule {0:?}")]
    UnsupportedRule(String),
    /// A coordinate line that does not parse.
    #[error("bad coordinates on line {line}: {text:?}")]
    BadCoordinates {
        /// 1-based source line.
        line: usize,
        /// The offending line.
        text: String,
    },
}

/// A successfully parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    /// The alive cells.
    pub pattern: Pattern,
    /// The rule declared in the file, if any.
    pub rule: Option<Rule>,
    /// Recoverable oddities encountered along the way.
    pub warnings: Vec<LoadWarning>,
}

/// A failed parse: everything that went wrong, including the warnings
/// collected before the first error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    /// The problems that prevented loading; never empty.
    pub errors: Vec<LoadError>,
    /// Recoverable oddities encountered before failing.
    pub warnings: Vec<LoadWarning>,
}

impl fmt::Display for Failed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load pattern")?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for Failed {}

/// The outcome of deserializing one pattern.
pub type DeserializeResult = Result<Loaded, Failed>;

/// Collects warnings and errors during one parse.
#[derive(Debug, Default)]
struct Report {
    warnings: Vec<LoadWarning>,
    errors: Vec<LoadError>,
}

impl Report {
    fn new() -> Self {
        Self::default()
    }
    fn warn(&mut self, warning: LoadWarning) {
        self.warnings.push(warning);
    }
    fn error(&mut self, error: LoadError) {
        self.errors.push(error);
    }
    fn finish(self, pattern: Pattern, rule: Option<Rule>) -> DeserializeResult {
        if self.errors.is_empty() {
            Ok(Loaded {
                pattern,
                rule,
                warnings: self.warnings,
            })
        } else {
            Err(Failed {
                errors: self.errors,
                warnings: self.warnings,
            })
        }
    }
}

/// Parses `lines` as whichever format fits best.
///
/// The declared format (if any) is tried first and wins outright when it
/// parses without warnings. Otherwise every format is tried and the
/// successful parse with strictly the fewest warnings wins; on a tie the
/// declared format, then the [`PatternFormat::ALL`] order, breaks it. If
/// every format fails, the failure of the first candidate is returned.
pub fn detect_and_deserialize(
    lines: &[&str],
    declared: Option<PatternFormat>,
) -> (PatternFormat, DeserializeResult) {
    let mut order: Vec<PatternFormat> = Vec::with_capacity(PatternFormat::ALL.len());
    order.extend(declared);
    order.extend(
        PatternFormat::ALL
            .iter()
            .copied()
            .filter(|&format| Some(format) != declared),
    );

    let mut best_format = order[0];
    let mut best = best_format.deserialize(lines);
    if matches!(&best, Ok(loaded) if loaded.warnings.is_empty()) {
        return (best_format, best);
    }
    for &format in &order[1..] {
        let result = format.deserialize(lines);
        let improves = match (&result, &best) {
            (Ok(loaded), Ok(best_loaded)) => loaded.warnings.len() < best_loaded.warnings.len(),
            (Ok(_), Err(_)) => true,
            (Err(_), _) => false,
        };
        if improves {
            if matches!(&result, Ok(loaded) if loaded.warnings.is_empty()) {
                return (format, result);
            }
            best_format = format;
            best = result;
        }
    }
    (best_format, best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every format reproduces what it wrote; the formats that store
        /// cells relative to the bounding box reproduce it up to
        /// translation.
        #[test]
        fn test_round_trip_all_formats(cells in prop::collection::btree_set(
            (-30_i64..30, -30_i64..30).prop_map(|(x, y)| Pos::new(x, y)),
            0..40,
        )) {
            let pattern = Pattern::from_alive_cells(cells.into_iter());
            for &format in &PatternFormat::ALL {
                let text = format.serialize(&pattern);
                let lines: Vec<&str> = text.lines().collect();
                let loaded = format.deserialize(&lines).unwrap();
                prop_assert!(
                    loaded.warnings.is_empty(),
                    "{} warned: {:?}",
                    format,
                    loaded.warnings,
                );
                match format {
                    PatternFormat::Life105 | PatternFormat::Life106 => {
                        prop_assert_eq!(&pattern, &loaded.pattern)
                    }
                    PatternFormat::Plaintext | PatternFormat::Rle => {
                        prop_assert!(pattern.eq_modulo_offset(&loaded.pattern))
                    }
                }
            }
        }
    }

    #[test]
    fn test_format_names_round_trip() {
        for &format in &PatternFormat::ALL {
            assert_eq!(format, format.to_string().parse().unwrap());
        }
        assert!("life 2.0".parse::<PatternFormat>().is_err());
        assert_eq!(
            Some(PatternFormat::Rle),
            PatternFormat::from_extension("RLE"),
        );
        assert_eq!(None, PatternFormat::from_extension("png"));
    }

    #[test]
    fn test_detect_clean_declared_format_wins() {
        let lines = vec!["x = 3, y = 1", "3o!"];
        let (format, result) = detect_and_deserialize(&lines, Some(PatternFormat::Rle));
        assert_eq!(PatternFormat::Rle, format);
        assert_eq!(3, result.unwrap().pattern.len());
    }

    #[test]
    fn test_detect_mislabeled_input() {
        // Life 1.06 content declared as RLE: RLE fails on the missing
        // header, so detection falls through to the true format.
        let lines = vec!["#Life 1.06", "0 0", "1 0", "2 0"];
        let (format, result) = detect_and_deserialize(&lines, Some(PatternFormat::Rle));
        assert_eq!(PatternFormat::Life106, format);
        let loaded = result.unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(3, loaded.pattern.len());
    }

    #[test]
    fn test_detect_undeclared_plaintext() {
        let lines = vec![".O.", "..O", "OOO"];
        let (format, result) = detect_and_deserialize(&lines, None);
        assert_eq!(PatternFormat::Plaintext, format);
        assert_eq!(5, result.unwrap().pattern.len());
    }

    #[test]
    fn test_detect_prefers_fewer_warnings() {
        // Valid Life 1.06 with no header would fail as 1.06 and parse as
        // plaintext only with a pile of unknown-character warnings; a
        // proper RLE stream parses cleanly.
        let lines = vec!["x = 2, y = 2, rule = B3/S23", "2o$2o!"];
        let (format, result) = detect_and_deserialize(&lines, Some(PatternFormat::Plaintext));
        assert_eq!(PatternFormat::Rle, format);
        assert!(result.unwrap().warnings.is_empty());
    }

    #[test]
    fn test_detect_garbage_falls_back_to_plaintext() {
        // The headered formats all reject this; plaintext still loads it,
        // one warning per unknown character.
        let lines = vec!["@@@"];
        let (format, result) = detect_and_deserialize(&lines, None);
        assert_eq!(PatternFormat::Plaintext, format);
        let loaded = result.unwrap();
        assert_eq!(3, loaded.warnings.len());
        assert!(loaded.pattern.is_empty());
    }
}
