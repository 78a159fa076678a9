//! Text position and indentation utilities.
//!
//! ## Coordinate Conventions
//!
//! - Lines are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**

/// Byte offset of the beginning of 1-indexed `line`.
///
/// Lines past the end map to the content length.
pub fn line_start_offset(content: &str, line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    content
        .match_indices('\n')
        .nth(line - 2)
        .map(|(index, _)| index + 1)
        .unwrap_or(content.len())
}

// ============================================================================
// Indentation
// ============================================================================

/// The indentation that follows the last newline of `whitespace`.
///
/// Returns `None` when `whitespace` contains no newline, i.e. the text it
/// prefixes does not start a line.
pub fn trailing_indent(whitespace: &str) -> Option<&str> {
    let idx = whitespace.rfind('\n')?;
    let tail = &whitespace[idx + 1..];
    let end = tail
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(tail.len());
    Some(&tail[..end])
}

/// Replace the indentation following the last newline of `whitespace` with
/// `indent`.
///
/// Whitespace without a newline is returned unchanged.
pub fn with_trailing_indent(whitespace: &str, indent: &str) -> String {
    match whitespace.rfind('\n') {
        Some(idx) => {
            let tail = &whitespace[idx + 1..];
            let rest = tail.trim_start_matches([' ', '\t']);
            format!("{}{}{}", &whitespace[..=idx], indent, rest)
        }
        None => whitespace.to_string(),
    }
}

/// Shift every line-leading indentation in `text` from `from` to `to`.
///
/// Only indentation that starts with `from` is shifted; the remainder past
/// `from` is kept, so nested lines keep their relative depth. The first
/// line (before any newline) is left alone, and so are blank lines.
pub fn shift_indent(text: &str, from: &str, to: &str) -> String {
    if from == to || !text.contains('\n') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let last = text.matches('\n').count();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if line.is_empty() && i < last {
                continue;
            }
            match line.strip_prefix(from) {
                Some(rest) => {
                    out.push_str(to);
                    out.push_str(rest);
                }
                None => out.push_str(line),
            }
        } else {
            out.push_str(line);
        }
    }
    out
}
