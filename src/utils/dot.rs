//! Escaping for graphviz output.
//!
//! Block labels are multi-line dumps. Each line is C-escaped on its own and the lines are
//! joined with `\l` so graphviz renders them left-aligned.

use std::fmt::Write;

/// C-style escapes a single line of text.
///
/// Quotes, backslashes and the usual control characters get their short escapes; any
/// other control character or non-ASCII byte is written as a three-digit octal escape.
///
/// # Examples
///
/// ```rust
/// use flowgraph::utils::escape_c;
///
/// assert_eq!(escape_c(r#"say "hi""#), r#"say \"hi\""#);
/// assert_eq!(escape_c("tab\there"), "tab\\there");
/// ```
#[must_use]
pub fn escape_c(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'"' => out.push_str("\\\""),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}

/// Turns a multi-line dump into a graphviz record label.
///
/// Every line is escaped with [`escape_c`], lines are joined with `\l`, and a trailing
/// `\l` left-aligns the last line.
#[must_use]
pub fn escape_label(text: &str) -> String {
    let mut label = text.split('\n').map(escape_c).collect::<Vec<_>>().join("\\l");
    label.push_str("\\l");
    label
}
