//! The run-length encoded format: an `x = ..., y = ...` header, then runs
//! of `b` (dead), `o` (alive), and `$` (end of row), terminated by `!`.

use lazy_static::lazy_static;
use regex::Regex;

use super::{DeserializeResult, LoadError, LoadWarning, PatternFormat, Report};
use crate::cells::{CellState, Pattern};
use crate::pos::Pos;
use crate::sim::Rule;

/// Wrap column for emitted pattern data.
const MAX_LINE_LEN: usize = 70;

lazy_static! {
    static ref HEADER_RE: Regex =
        Regex::new(r"^x\s*=\s*(\d+)\s*,\s*y\s*=\s*(\d+)(?:\s*,\s*rule\s*=\s*(.+?))?\s*$").unwrap();
}

pub(super) fn deserialize(lines: &[&str]) -> DeserializeResult {
    let mut report = Report::new();
    let mut pattern = Pattern::new();
    let mut rule = None;

    let mut iter = lines.iter().enumerate();

    // Comments may precede the header; the header itself is mandatory.
    let (width, height) = loop {
        match iter.next() {
            None => {
                report.error(LoadError::MissingHeader(PatternFormat::Rle));
                return report.finish(pattern, rule);
            }
            Some((_, line)) if line.trim().is_empty() || line.starts_with('#') => continue,
            Some((index, line)) => match HEADER_RE.captures(line.trim_end()) {
                None => {
                    report.error(if line.trim_start().starts_with('x') {
                        LoadError::MalformedHeader {
                            line: index + 1,
                            text: (*line).to_owned(),
                        }
                    } else {
                        LoadError::MissingHeader(PatternFormat::Rle)
                    });
                    return report.finish(pattern, rule);
                }
                Some(caps) => {
                    if let Some(rule_str) = caps.get(3) {
                        match rule_str.as_str().parse() {
                            Ok(parsed) => rule = Some(parsed),
                            Err(_) => report
                                .error(LoadError::UnsupportedRule(rule_str.as_str().to_owned())),
                        }
                    }
                    match (caps[1].parse::<i64>(), caps[2].parse::<i64>()) {
                        (Ok(w), Ok(h)) => break (w, h),
                        _ => {
                            report.error(LoadError::BadCoordinates {
                                line: index + 1,
                                text: (*line).to_owned(),
                            });
                            return report.finish(pattern, rule);
                        }
                    }
                }
            },
        }
    };

    let mut run = 0_i64;
    let mut x = 0_i64;
    let mut y = 0_i64;
    let mut done = false;
    for (index, line) in iter {
        if line.starts_with('#') {
            continue;
        }
        for ch in line.chars() {
            if done {
                if !ch.is_whitespace() {
                    report.warn(LoadWarning::TrailingContent { line: index + 1 });
                    break;
                }
                continue;
            }
            match ch {
                '0'..='9' => {
                    let digit = i64::from(ch as u8 - b'0');
                    run = run.saturating_mul(10).saturating_add(digit);
                }
                'b' | 'B' => {
                    x = x.saturating_add(run.max(1));
                    run = 0;
                }
                'o' | 'O' => {
                    // Clamp to the declared extent so a hostile run count
                    // cannot turn into billions of cell writes; the
                    // dropped cells get one warning per run.
                    let count = run.max(1);
                    let keep = if y < height {
                        count.min((width - x).max(0))
                    } else {
                        0
                    };
                    for _ in 0..keep {
                        pattern.set(Pos::new(x, y), true);
                        x += 1;
                    }
                    if keep < count {
                        report.warn(LoadWarning::OutsideExtent {
                            pos: Pos::new(x, y),
                        });
                        x = x.saturating_add(count - keep);
                    }
                    run = 0;
                }
                '$' => {
                    y = y.saturating_add(run.max(1));
                    x = 0;
                    run = 0;
                }
                '!' => done = true,
                ch if ch.is_whitespace() => {}
                ch => {
                    report.warn(LoadWarning::UnknownCharacter {
                        line: index + 1,
                        ch,
                    });
                    run = 0;
                }
            }
        }
    }
    report.finish(pattern, rule)
}

pub(super) fn serialize<T: CellState>(state: &T) -> String {
    let bounds = state.bounding_rect();
    let mut out = format!(
        "x = {}, y = {}, rule = {}\n",
        bounds.width(),
        bounds.height(),
        Rule::LIFE,
    );

    let mut tokens: Vec<String> = vec![];
    let mut push_run = |count: i64, tag: char| {
        if count == 1 {
            tokens.push(tag.to_string());
        } else if count > 1 {
            tokens.push(format!("{}{}", count, tag));
        }
    };

    // Cursor through the bounding box, in bounds-relative coordinates.
    let mut cx = 0_i64;
    let mut cy = 0_i64;
    let mut alive_run = 0_i64;
    for pos in state.alive_cells() {
        let rel = pos - bounds.min();
        if rel.y > cy {
            push_run(alive_run, 'o');
            alive_run = 0;
            push_run(rel.y - cy, '$');
            cy = rel.y;
            cx = 0;
        }
        if rel.x > cx + alive_run {
            push_run(alive_run, 'o');
            cx += alive_run;
            alive_run = 0;
            push_run(rel.x - cx, 'b');
            cx = rel.x;
        }
        alive_run += 1;
    }
    push_run(alive_run, 'o');
    tokens.push("!".to_owned());

    // Wrap the pattern data without splitting a run across lines.
    let mut line_len = 0;
    for token in tokens {
        if line_len + token.len() > MAX_LINE_LEN {
            out.push('\n');
            line_len = 0;
        }
        line_len += token.len();
        out.push_str(&token);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::super::{LoadError, LoadWarning, PatternFormat};
    use crate::cells::{CellState, Pattern};
    use crate::pos::Pos;
    use crate::sim::Rule;

    fn glider() -> Pattern {
        [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]
            .iter()
            .map(|&(x, y)| Pos::new(x, y))
            .collect()
    }

    #[test]
    fn test_deserialize_glider() {
        let lines = vec![
            "#N Glider",
            "#C The smallest spaceship.",
            "x = 3, y = 3, rule = B3/S23",
            "bob$2bo$3o!",
        ];
        let loaded = PatternFormat::Rle.deserialize(&lines).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(Some(Rule::LIFE), loaded.rule);
        assert_eq!(glider(), loaded.pattern);
    }

    #[test]
    fn test_serialize_glider() {
        // Trailing dead cells in a row are omitted, so row one is `bo`
        // rather than `bob`.
        let text = PatternFormat::Rle.serialize(&glider());
        assert_eq!("x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!\n", text);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(glider(), PatternFormat::Rle.deserialize(&lines).unwrap().pattern);
    }

    #[test]
    fn test_round_trip_with_blank_rows() {
        let sparse: Pattern = [(0, 0), (4, 0), (2, 5)]
            .iter()
            .map(|&(x, y)| Pos::new(x, y))
            .collect();
        let text = PatternFormat::Rle.serialize(&sparse);
        assert_eq!("x = 5, y = 6, rule = B3/S23\no3bo5$2bo!\n", text);
        let lines: Vec<&str> = text.lines().collect();
        let loaded = PatternFormat::Rle.deserialize(&lines).unwrap();
        assert_eq!(sparse, loaded.pattern);
    }

    #[test]
    fn test_serialize_is_offset_independent() {
        let moved: Pattern = glider().offset_by(Pos::new(-40, 17));
        assert_eq!(
            PatternFormat::Rle.serialize(&glider()),
            PatternFormat::Rle.serialize(&moved),
        );
    }

    #[test]
    fn test_missing_header_fails() {
        let lines = vec!["bob$2bo$3o!"];
        let failed = PatternFormat::Rle.deserialize(&lines).unwrap_err();
        assert_eq!(
            vec![LoadError::MissingHeader(PatternFormat::Rle)],
            failed.errors,
        );
    }

    #[test]
    fn test_malformed_header_fails() {
        let lines = vec!["x = 3, y = banana", "3o!"];
        let failed = PatternFormat::Rle.deserialize(&lines).unwrap_err();
        assert!(matches!(
            failed.errors[0],
            LoadError::MalformedHeader { line: 1, .. },
        ));
    }

    #[test]
    fn test_unsupported_rule_fails() {
        let lines = vec!["x = 1, y = 1, rule = W110", "o!"];
        let failed = PatternFormat::Rle.deserialize(&lines).unwrap_err();
        assert_eq!(
            vec![LoadError::UnsupportedRule("W110".to_owned())],
            failed.errors,
        );
    }

    #[test]
    fn test_cells_outside_extent_are_dropped_with_warning() {
        let lines = vec!["x = 2, y = 1", "4o!"];
        let loaded = PatternFormat::Rle.deserialize(&lines).unwrap();
        assert_eq!(
            vec![LoadWarning::OutsideExtent {
                pos: Pos::new(2, 0),
            }],
            loaded.warnings,
        );
        assert_eq!(2, loaded.pattern.len());
    }

    #[test]
    fn test_huge_run_counts_do_not_blow_up() {
        // A run count far past the declared extent must not cost one
        // iteration per claimed cell.
        let lines = vec!["x = 1, y = 1", "9999999999999999999o$9999999999999999999o!"];
        let loaded = PatternFormat::Rle.deserialize(&lines).unwrap();
        assert_eq!(1, loaded.pattern.len());
        assert!(loaded.pattern.contains(Pos::new(0, 0)));
        assert_eq!(2, loaded.warnings.len());
    }

    #[test]
    fn test_trailing_content_warns() {
        let lines = vec!["x = 1, y = 1", "o! surprise"];
        let loaded = PatternFormat::Rle.deserialize(&lines).unwrap();
        assert_eq!(
            vec![LoadWarning::TrailingContent { line: 2 }],
            loaded.warnings,
        );
    }

    #[test]
    fn test_line_wrapping() {
        // 60 alternating alive cells: 120 columns of "ob" pairs would
        // exceed the wrap limit, so the data spans multiple lines.
        let stripes: Pattern = (0..60).map(|x| Pos::new(x * 2, 0)).collect();
        let text = PatternFormat::Rle.serialize(&stripes);
        let mut lines = text.lines();
        assert_eq!(Some("x = 119, y = 1, rule = B3/S23"), lines.next());
        let data: Vec<&str> = lines.collect();
        assert!(data.len() > 1);
        assert!(data.iter().all(|line| line.len() <= super::MAX_LINE_LEN));
        let reparsed = PatternFormat::Rle
            .deserialize(&text.lines().collect::<Vec<_>>())
            .unwrap();
        assert_eq!(stripes, reparsed.pattern);
    }
}
