// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::cmp::min;

use rewrite_core::{text, RewriteError};
use thiserror::Error;

/// Source text that does not match the grammar.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("expected {expected} at {line}:{column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub expected: String,
}

impl From<peg::error::ParseError<peg::str::LineCol>> for ParseError {
    fn from(err: peg::error::ParseError<peg::str::LineCol>) -> Self {
        ParseError {
            line: err.location.line,
            column: err.location.column,
            offset: err.location.offset,
            expected: err.expected.to_string(),
        }
    }
}

impl From<ParseError> for RewriteError {
    fn from(err: ParseError) -> Self {
        RewriteError::Parse {
            message: format!("expected {}", err.expected),
            line: err.line,
            column: err.column,
        }
    }
}

/// Render a parse error against its source text.
///
/// # Example
///
/// ```
/// use rewrite_java::parser::{parse_compilation_unit, prettify_error};
///
/// let source = "class A { int x = ; }";
/// let err = parse_compilation_unit(source).unwrap_err();
/// let formatted = prettify_error(&err, source, "A.java");
/// assert!(formatted.contains("A.java"));
/// ```
pub fn prettify_error(err: &ParseError, source: &str, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let context = 1;
    let line_start = err.line.saturating_sub(context).max(1);
    let start_offset = text::line_start_offset(source, line_start);
    let end_offset = text::line_start_offset(source, err.line + context + 1);
    let snippet = &source[start_offset..end_offset];
    let start = err.offset.saturating_sub(start_offset);
    let end = min(start + 1, snippet.len().max(start));
    Renderer::styled()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(snippet)
                    .line_start(line_start)
                    .fold(false)
                    .annotations(vec![Level::Error
                        .span(start..end)
                        .label(&format!("expected {}", err.expected))]),
            ),
        )
        .to_string()
}
