// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A formatting-faithful rewriting engine for Java-like sources.
//!
//! Sources parse into an immutable tree that keeps every blank, line break
//! and comment, so printing an untouched tree reproduces its source byte
//! for byte. Names in the tree are attributed with types from a
//! [`types::Classpath`]. Recipes rewrite trees through visitors, and edits
//! touch only the text they replace.
//!
//! # Overview
//!
//! - **Tree**: [`tree::J`], a closed enum of node kinds, each an `Arc`'d
//!   struct with its leading whitespace.
//! - **Parsing**: [`parser::JavaParser`] parses and attributes a set of
//!   sources against one classpath.
//! - **Visiting**: [`visitor::JavaVisitor`] and the shape-preserving
//!   [`visitor::JavaIsoVisitor`], with a cursor carrying typed messages
//!   between frames.
//! - **Templates**: [`template::JavaTemplate`] turns a source snippet into
//!   attributed trees spliced into a host tree.
//! - **Recipes**: [`recipe::Recipe`] and [`recipe::RecipeRunner`], the
//!   built-ins in [`recipes`], and JSON configuration in [`config`].
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use rewrite_java::parser::JavaParser;
//! use rewrite_java::recipe::RecipeRunner;
//! use rewrite_java::recipes::{ChangeFieldName, ChangeFieldNameOptions};
//!
//! let source = "class Foo {\n    int count; // visits\n\n    void hit() { count = count + 1; }\n}";
//! let parsed = JavaParser::standard().parse_all(&[source]).unwrap();
//!
//! // Round-trip: an untouched tree prints as its source.
//! assert_eq!(rewrite_java::tree::J::from(parsed.units[0].clone()).print(), source);
//!
//! let recipe = ChangeFieldName::new(ChangeFieldNameOptions {
//!     class_name: "Foo".to_string(),
//!     old_field_name: "count".to_string(),
//!     new_field_name: "total".to_string(),
//! });
//! let runner = RecipeRunner::new(Arc::new(recipe), Arc::new(parsed.classpath));
//! let results = runner.run(&parsed.units).unwrap();
//! assert_eq!(
//!     results[0].printed().unwrap(),
//!     "class Foo {\n    int total; // visits\n\n    void hit() { total = total + 1; }\n}"
//! );
//! ```

pub mod attribution;
pub mod codegen;
pub mod config;
pub mod format;
pub mod imports;
pub mod parser;
pub mod recipe;
pub mod recipes;
pub mod search;
pub mod template;
pub mod tree;
pub mod type_visitor;
pub mod types;
pub mod validation;
pub mod visitor;

pub use rewrite_core::{OutputErrorCode, RewriteError, RewriteResult};
