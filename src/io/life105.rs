//! The Life 1.05 format: `.`/`*` cell rows grouped into blocks, each block
//! positioned by a `#P x y` line.

use lazy_static::lazy_static;
use regex::Regex;

use super::{DeserializeResult, LoadError, LoadWarning, PatternFormat, Report};
use crate::cells::{CellState, Pattern};
use crate::pos::Pos;
use crate::sim::Rule;

lazy_static! {
    static ref BLOCK_RE: Regex = Regex::new(r"^#P\s+(-?\d+)\s+(-?\d+)\s*$").unwrap();
}

pub(super) fn deserialize(lines: &[&str]) -> DeserializeResult {
    let mut report = Report::new();
    let mut pattern = Pattern::new();
    let mut rule = None;

    let mut iter = lines.iter().enumerate();
    match iter.next() {
        Some((_, first)) if first.trim_end().starts_with("#Life 1.05") => {}
        _ => {
            report.error(LoadError::MissingHeader(PatternFormat::Life105));
            return report.finish(pattern, rule);
        }
    }

    // Rows before any #P land in an implicit block at the origin.
    let mut block_origin = Pos::new(0, 0);
    let mut row = 0_i64;
    for (index, line) in iter {
        let line = line.trim_end();
        if let Some(rest) = line.strip_prefix('#') {
            match rest.chars().next() {
                Some('P') => match BLOCK_RE.captures(line) {
                    Some(caps) => {
                        match (caps[1].parse::<i64>(), caps[2].parse::<i64>()) {
                            (Ok(x), Ok(y)) => block_origin = Pos::new(x, y),
                            _ => report.error(LoadError::BadCoordinates {
                                line: index + 1,
                                text: line.to_owned(),
                            }),
                        }
                        row = 0;
                    }
                    None => report.error(LoadError::MalformedHeader {
                        line: index + 1,
                        text: line.to_owned(),
                    }),
                },
                Some('N') => rule = Some(Rule::LIFE),
                Some('R') => match rest[1..].trim().parse() {
                    Ok(parsed) => rule = Some(parsed),
                    Err(_) => {
                        report.error(LoadError::UnsupportedRule(rest[1..].trim().to_owned()))
                    }
                },
                // #D descriptions and anything else # are comments.
                _ => {}
            }
            continue;
        }
        for (x, ch) in line.chars().enumerate() {
            match ch {
                '.' => {}
                '*' => pattern.set(block_origin + Pos::new(x as i64, row), true),
                _ => report.warn(LoadWarning::UnknownCharacter {
                    line: index + 1,
                    ch,
                }),
            }
        }
        row += 1;
    }
    report.finish(pattern, rule)
}

pub(super) fn serialize<T: CellState>(state: &T) -> String {
    let mut out = String::from("#Life 1.05\n#N\n");
    let bounds = state.bounding_rect();
    if bounds.is_empty() {
        return out;
    }
    out.push_str(&format!("#P {} {}\n", bounds.left(), bounds.top()));
    let mut cells = state.alive_cells().peekable();
    for y in bounds.top()..bounds.bottom() {
        for x in bounds.left()..bounds.right() {
            if cells.peek() == Some(&Pos::new(x, y)) {
                cells.next();
                out.push('*');
            } else {
                out.push('.');
            }
        }
        out.push('\n');
    }
    out
}
