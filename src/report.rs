//! Human readable rendering of syntax errors.

use std::fmt::Write;

use crate::error::SyntaxError;

/// Render `error` against the `source` it was raised on: the message, the
/// zero-based line and column, the offending line and a caret under the
/// column.
pub fn render(error: &SyntaxError, source: &str) -> String {
    let pos = error.position;
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Error: {}", error.kind);
    let _ = writeln!(out, "Line: {}({})", pos.line, pos.column);

    if let Some(line) = source.split('\n').nth(pos.line) {
        let line = line.trim_end_matches('\r');
        let _ = writeln!(out, "{}", line);
        out.push_str(&caret_padding(line, pos.column));
        out.push_str("^\n");
    }
    out
}

/// Whitespace lining up with `column` in `line`, keeping tabs so the caret
/// lands under the right character.
fn caret_padding(line: &str, column: usize) -> String {
    let mut pad: String = line
        .chars()
        .take(column)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let len = pad.chars().count();
    pad.extend(std::iter::repeat(' ').take(column.saturating_sub(len)));
    pad
}
