// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor infrastructure for tree traversal and rewriting.
//!
//! # Traversal
//!
//! [`visit`] is the single entry point for visiting a node. It pushes the
//! node onto the cursor, runs [`JavaVisitor::pre_visit`], dispatches to the
//! `visit_*` method for the node's kind, runs [`JavaVisitor::post_visit`]
//! and pops. Every `visit_*` method defaults to the matching `walk_*`
//! function, which visits the node's children in source order and rebuilds
//! the node only if one of them changed. A visit that changes nothing
//! returns the very same `Arc`.
//!
//! An overriding method calls the `walk_*` function itself to keep the
//! edits nested visits make in the same pass:
//!
//! ```
//! use std::sync::Arc;
//! use rewrite_java::tree::{Identifier, J};
//! use rewrite_java::visitor::{walk_identifier, JavaVisitor, VisitCtx};
//!
//! struct Rename;
//!
//! impl JavaVisitor for Rename {
//!     fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> J {
//!         let node = walk_identifier(self, node, cx);
//!         if &*node.name == "a" {
//!             return J::from(node.with_name("b"));
//!         }
//!         J::Identifier(node)
//!     }
//! }
//! ```
//!
//! # Shape-preserving visitors
//!
//! [`JavaIsoVisitor`] has the same methods, each returning the kind it was
//! given. Wrap one in [`Iso`] to run it wherever a [`JavaVisitor`] is
//! expected.
//!
//! # Fixed-kind slots
//!
//! Some children can only hold one kind: a declaration's name, a class
//! body, an import. They are visited with [`visit_as`], which panics if a
//! visitor returns another kind there.

/// Invoke `$callback!` with every node kind.
macro_rules! java_kinds {
    ($callback:ident) => {
        $callback! {
            CompilationUnit,
            Package,
            Import,
            ClassDecl,
            Block,
            MethodDecl,
            VariableDecls,
            NamedVariable,
            Return,
            Identifier,
            FieldAccess,
            MethodInvocation,
            NewClass,
            Assignment,
            Literal,
            Binary,
            Parentheses,
            ParameterizedType,
            Primitive,
            ArrayType,
            Empty,
        }
    };
}

mod context;
mod dispatch;
mod traits;
mod walk;

pub use context::{EditFailure, ExecutionContext, ImportRequest, PassEffects, VisitCtx};
pub use dispatch::{visit, visit_as, visit_unit};
pub use traits::{Iso, IsoAdapter, JavaIsoVisitor, JavaVisitor, NoopVisitor};
pub use walk::*;
