//! The Life 1.06 format: a `#Life 1.06` header followed by one `x y`
//! coordinate pair per alive cell.

use super::{DeserializeResult, LoadError, LoadWarning, PatternFormat, Report};
use crate::cells::{CellState, Pattern};
use crate::pos::Pos;

pub(super) fn deserialize(lines: &[&str]) -> DeserializeResult {
    let mut report = Report::new();
    let mut pattern = Pattern::new();

    let mut iter = lines.iter().enumerate();
    match iter.next() {
        Some((_, first)) if first.trim_end().starts_with("#Life 1.06") => {}
        _ => {
            report.error(LoadError::MissingHeader(PatternFormat::Life106));
            return report.finish(pattern, None);
        }
    }

    for (index, line) in iter {
        let line = line.trim();
        if line.is_empty() {
            report.warn(LoadWarning::UnexpectedBlankLine { line: index + 1 });
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        match (
            fields.next().and_then(|s| s.parse::<i64>().ok()),
            fields.next().and_then(|s| s.parse::<i64>().ok()),
            fields.next(),
        ) {
            (Some(x), Some(y), None) => pattern.set(Pos::new(x, y), true),
            _ => report.error(LoadError::BadCoordinates {
                line: index + 1,
                text: line.to_owned(),
            }),
        }
    }
    report.finish(pattern, None)
}

pub(super) fn serialize<T: CellState>(state: &T) -> String {
    let mut out = String::from("#Life 1.06\n");
    for pos in state.alive_cells() {
        out.push_str(&format!("{} {}\n", pos.x, pos.y));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::{LoadError, LoadWarning, PatternFormat};
    use crate::cells::Pattern;
    use crate::pos::Pos;

    #[test]
    fn test_round_trip() {
        let cells: Pattern = [(-3, 7), (0, 0), (12, -1)]
            .iter()
            .map(|&(x, y)| Pos::new(x, y))
            .collect();
        let text = PatternFormat::Life106.serialize(&cells);
        assert_eq!("#Life 1.06\n12 -1\n0 0\n-3 7\n", text);
        let lines: Vec<&str> = text.lines().collect();
        let loaded = PatternFormat::Life106.deserialize(&lines).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(cells, loaded.pattern);
    }

    #[test]
    fn test_missing_header_fails() {
        let lines = vec!["0 0", "1 1"];
        let failed = PatternFormat::Life106.deserialize(&lines).unwrap_err();
        assert_eq!(
            vec![LoadError::MissingHeader(PatternFormat::Life106)],
            failed.errors,
        );
    }

    #[test]
    fn test_bad_coordinates_fail() {
        let lines = vec!["#Life 1.06", "0 0", "1 one", "2 2 2"];
        let failed = PatternFormat::Life106.deserialize(&lines).unwrap_err();
        assert_eq!(2, failed.errors.len());
        assert!(matches!(
            failed.errors[0],
            LoadError::BadCoordinates { line: 3, .. },
        ));
    }

    #[test]
    fn test_blank_lines_warn() {
        let lines = vec!["#Life 1.06", "0 0", "", "1 1"];
        let loaded = PatternFormat::Life106.deserialize(&lines).unwrap();
        assert_eq!(
            vec![LoadWarning::UnexpectedBlankLine { line: 3 }],
            loaded.warnings,
        );
        assert_eq!(2, loaded.pattern.len());
    }
}
