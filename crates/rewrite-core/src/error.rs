//! Error types and error code constants for tugrewrite.
//!
//! This module provides a unified error type (`RewriteError`) that bridges
//! domain-specific errors from the parser, template engine, configuration
//! loader and cursor into a common shape.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad recipe options, malformed configuration)
//! - `3`: Resolution errors (unresolvable symbols, unparsable source)
//! - `4`: Apply errors (an edit could not be spliced)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Programmer errors (a visitor violating a slot's kind, an "or fail" cursor
//! lookup that finds nothing) are panics, not `RewriteError`s.

use std::fmt;

use thiserror::Error;

use crate::cursor::CursorError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable integer codes for errors surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad options, malformed configuration).
    InvalidArguments = 2,
    /// Resolution errors (symbol not found, source did not parse).
    ResolutionError = 3,
    /// Apply errors (an edit failed for one occurrence).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Source text did not parse.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// A referenced symbol could not be resolved.
    #[error("unresolved {}", symbol_list(.names))]
    Unresolved { names: Vec<String> },

    /// An edit could not be applied.
    #[error("apply error: {message}")]
    ApplyError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

fn symbol_list(names: &[String]) -> String {
    let noun = if names.len() == 1 { "symbol" } else { "symbols" };
    format!("{}: {}", noun, names.join(", "))
}

/// Result alias used across the engine.
pub type RewriteResult<T> = Result<T, RewriteError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&RewriteError> for OutputErrorCode {
    fn from(err: &RewriteError) -> Self {
        match err {
            RewriteError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            RewriteError::Parse { .. } => OutputErrorCode::ResolutionError,
            RewriteError::Unresolved { .. } => OutputErrorCode::ResolutionError,
            RewriteError::ApplyError { .. } => OutputErrorCode::ApplyError,
            RewriteError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<RewriteError> for OutputErrorCode {
    fn from(err: RewriteError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridge: CursorError -> RewriteError
// ============================================================================

impl From<CursorError> for RewriteError {
    fn from(err: CursorError) -> Self {
        RewriteError::InternalError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RewriteError {
    fn from(err: serde_json::Error) -> Self {
        RewriteError::InvalidArguments {
            message: format!("malformed JSON: {}", err),
            details: None,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl RewriteError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        RewriteError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an invalid arguments error with structured details.
    pub fn invalid_args_with_details(message: impl Into<String>, details: serde_json::Value) -> Self {
        RewriteError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create an apply error.
    pub fn apply(message: impl Into<String>) -> Self {
        RewriteError::ApplyError {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        RewriteError::InternalError {
            message: message.into(),
        }
    }

    /// Get the output error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn codes_are_stable() {
            assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
            assert_eq!(OutputErrorCode::ResolutionError.code(), 3);
            assert_eq!(OutputErrorCode::ApplyError.code(), 4);
            assert_eq!(OutputErrorCode::InternalError.code(), 10);
        }

        #[test]
        fn variants_map_to_codes() {
            assert_eq!(
                RewriteError::invalid_args("x").error_code(),
                OutputErrorCode::InvalidArguments
            );
            assert_eq!(
                RewriteError::Unresolved {
                    names: vec!["Foo".into()]
                }
                .error_code(),
                OutputErrorCode::ResolutionError
            );
            assert_eq!(
                RewriteError::apply("x").error_code(),
                OutputErrorCode::ApplyError
            );
            assert_eq!(
                RewriteError::internal("x").error_code(),
                OutputErrorCode::InternalError
            );
        }

        #[test]
        fn cursor_errors_are_internal() {
            let err: RewriteError = CursorError::TooShallow {
                requested: 3,
                depth: 1,
            }
            .into();
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn unresolved_pluralizes() {
            let one = RewriteError::Unresolved {
                names: vec!["Foo".into()],
            };
            assert_eq!(one.to_string(), "unresolved symbol: Foo");
            let two = RewriteError::Unresolved {
                names: vec!["Foo".into(), "bar".into()],
            };
            assert_eq!(two.to_string(), "unresolved symbols: Foo, bar");
        }

        #[test]
        fn parse_includes_position() {
            let err = RewriteError::Parse {
                message: "expected `;`".into(),
                line: 3,
                column: 7,
            };
            assert_eq!(err.to_string(), "parse error at 3:7: expected `;`");
        }

        #[test]
        fn json_errors_are_invalid_arguments() {
            let err: RewriteError = serde_json::from_str::<serde_json::Value>("{")
                .unwrap_err()
                .into();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert!(err.to_string().starts_with("invalid arguments: malformed JSON"));
        }
    }
}
