//! Core infrastructure for tugrewrite.
//!
//! This crate provides the language-agnostic pieces the rewriting engine is
//! built on:
//! - Stable node identities
//! - Extensible per-node metadata ("markers")
//! - The traversal cursor with its typed, per-frame message store
//! - Error types and error codes
//! - Text and indentation utilities

pub mod cursor;
pub mod error;
pub mod ids;
pub mod markers;
pub mod text;

pub use cursor::{Cursor, CursorError, FrameRef, MessageKey};
pub use error::{OutputErrorCode, RewriteError, RewriteResult};
pub use ids::NodeId;
pub use markers::{Marker, Markers, SearchResult};
