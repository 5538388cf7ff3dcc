//! The plaintext (`.cells`) format: one row of cells per line, `.` dead
//! and `O` alive, with `!` comment lines.

use super::{DeserializeResult, LoadWarning, Report};
use crate::cells::{CellState, Pattern};
use crate::pos::Pos;

pub(super) fn deserialize(lines: &[&str]) -> DeserializeResult {
    let mut report = Report::new();
    let mut pattern = Pattern::new();
    let mut y = 0_i64;
    for (index, line) in lines.iter().enumerate() {
        if line.starts_with('!') {
            continue;
        }
        // A blank line is a legitimate empty row.
        for (x, ch) in line.chars().enumerate() {
            match ch {
                '.' => {}
                // `*` is a common nonstandard alias for alive.
                'O' | '*' => pattern.set(Pos::new(x as i64, y), true),
                _ => report.warn(LoadWarning::UnknownCharacter {
                    line: index + 1,
                    ch,
                }),
            }
        }
        y += 1;
    }
    report.finish(pattern, None)
}

pub(super) fn serialize<T: CellState>(state: &T) -> String {
    let bounds = state.bounding_rect();
    if bounds.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let mut cells = state.alive_cells().peekable();
    for y in bounds.top()..bounds.bottom() {
        for x in bounds.left()..bounds.right() {
            if cells.peek() == Some(&Pos::new(x, y)) {
                cells.next();
                out.push('O');
            } else {
                out.push('.');
            }
        }
        out.push('\n');
    }
    out
}
