//! Reserved-character substitution for the pipe-delimited format.
//!
//! `|` separates fields, `;` separates items within a multi-value field, and
//! the newline terminates a record. A value containing any of them gets a
//! visually similar substitute instead. The replacement is lossy but
//! deterministic: `|` becomes `¦` (broken bar), `;` becomes `；` (fullwidth
//! semicolon), any newline becomes a single space.

/// Substitute for `|` inside a value.
pub const PIPE_SUBSTITUTE: char = '¦';

/// Substitute for `;` inside a value.
pub const SEMICOLON_SUBSTITUTE: char = '；';

/// Sanitize a value that will sit between `|` delimiters.
pub fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => out.push(PIPE_SUBSTITUTE),
            '\n' => out.push(' '),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Sanitize a value that will additionally sit inside a `;`-joined list.
pub fn escape_item(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => out.push(PIPE_SUBSTITUTE),
            ';' => out.push(SEMICOLON_SUBSTITUTE),
            '\n' => out.push(' '),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}
