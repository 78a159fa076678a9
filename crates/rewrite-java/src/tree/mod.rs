// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Immutable, formatting-preserving syntax tree.
//!
//! The tree is a closed set of node kinds. Each kind is a plain struct held
//! behind an [`Arc`]; [`J`] is the sum over all kinds. Nodes are never
//! mutated: every `with_*` method returns a new node and shares everything it
//! did not touch with the original, so "did this subtree change?" is answered
//! by [`J::ptr_eq`].
//!
//! # Overview
//!
//! - [`Space`] carries the exact whitespace and comments before each node.
//! - [`Trailing`], [`Leading`] and [`Delimited`] carry the formatting around
//!   punctuation that has no node of its own.
//! - [`TreeKind`] connects each node struct with its [`JKind`] tag so that
//!   fixed-kind child slots can be visited and cast back safely.

mod nodes;
mod space;

pub use nodes::*;
pub use space::{Delimited, Leading, Space, Trailing};

use std::fmt;
use std::sync::Arc;

use rewrite_core::{Markers, NodeId};

use crate::types::{JavaType, PrimitiveKind};

/// Behavior shared by every node struct.
pub trait TreeKind: Clone + fmt::Debug + Sized + 'static {
    /// The tag of this kind.
    const KIND: JKind;

    fn id(&self) -> NodeId;
    fn prefix(&self) -> &Space;
    fn markers(&self) -> &Markers;

    /// Borrow the node if `tree` is of this kind.
    fn cast(tree: &J) -> Option<&Arc<Self>>;

    /// Wrap the node into the sum type.
    fn into_j(node: Arc<Self>) -> J;

    /// The node with a different prefix; the same `Arc` if unchanged.
    fn with_prefix(node: &Arc<Self>, prefix: Space) -> Arc<Self>;

    /// The node with different markers; the same `Arc` if unchanged.
    fn with_markers(node: &Arc<Self>, markers: Markers) -> Arc<Self>;
}

macro_rules! tree_kinds {
    ($($kind:ident),* $(,)?) => {
        paste::paste! {
            /// A node of any kind.
            #[derive(Clone, Debug)]
            pub enum J {
                $($kind(Arc<$kind>),)*
            }

            /// Tag of a node kind.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum JKind {
                $($kind,)*
            }

            impl J {
                pub fn kind(&self) -> JKind {
                    match self {
                        $(J::$kind(_) => JKind::$kind,)*
                    }
                }

                pub fn id(&self) -> NodeId {
                    match self {
                        $(J::$kind(n) => n.id,)*
                    }
                }

                pub fn prefix(&self) -> &Space {
                    match self {
                        $(J::$kind(n) => &n.prefix,)*
                    }
                }

                pub fn markers(&self) -> &Markers {
                    match self {
                        $(J::$kind(n) => &n.markers,)*
                    }
                }

                /// This node with a different prefix.
                ///
                /// Returns a clone of the same `Arc` when the prefix is unchanged.
                pub fn with_prefix(&self, prefix: Space) -> J {
                    match self {
                        $(J::$kind(n) => J::$kind(<$kind as TreeKind>::with_prefix(n, prefix)),)*
                    }
                }

                pub fn with_markers(&self, markers: Markers) -> J {
                    match self {
                        $(J::$kind(n) => J::$kind(<$kind as TreeKind>::with_markers(n, markers)),)*
                    }
                }

                /// True if both values are the very same node.
                pub fn ptr_eq(&self, other: &J) -> bool {
                    match (self, other) {
                        $((J::$kind(a), J::$kind(b)) => Arc::ptr_eq(a, b),)*
                        _ => false,
                    }
                }

                $(
                    pub fn [<as_ $kind:snake>](&self) -> Option<&Arc<$kind>> {
                        match self {
                            J::$kind(n) => Some(n),
                            _ => None,
                        }
                    }
                )*
            }

            $(
                impl TreeKind for $kind {
                    const KIND: JKind = JKind::$kind;

                    fn id(&self) -> NodeId {
                        self.id
                    }

                    fn prefix(&self) -> &Space {
                        &self.prefix
                    }

                    fn markers(&self) -> &Markers {
                        &self.markers
                    }

                    fn cast(tree: &J) -> Option<&Arc<Self>> {
                        tree.[<as_ $kind:snake>]()
                    }

                    fn into_j(node: Arc<Self>) -> J {
                        J::$kind(node)
                    }

                    fn with_prefix(node: &Arc<Self>, prefix: Space) -> Arc<Self> {
                        if node.prefix == prefix {
                            return node.clone();
                        }
                        Arc::new($kind { prefix, ..(**node).clone() })
                    }

                    fn with_markers(node: &Arc<Self>, markers: Markers) -> Arc<Self> {
                        if node.markers.ptr_eq(&markers) {
                            return node.clone();
                        }
                        Arc::new($kind { markers, ..(**node).clone() })
                    }
                }

                impl From<Arc<$kind>> for J {
                    fn from(node: Arc<$kind>) -> J {
                        J::$kind(node)
                    }
                }

                impl From<$kind> for J {
                    fn from(node: $kind) -> J {
                        J::$kind(Arc::new(node))
                    }
                }
            )*
        }
    };
}

tree_kinds! {
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

impl J {
    /// The static type of this node, when attributed.
    ///
    /// Expressions report their value type, type trees the type they name,
    /// declarations the type they declare.
    pub fn ty(&self) -> Option<JavaType> {
        match self {
            J::Identifier(n) => n.ty.clone(),
            J::FieldAccess(n) => n.ty.clone(),
            J::MethodInvocation(n) => n.method_type.as_ref().map(|m| m.return_type.clone()),
            J::NewClass(n) => n.ty.clone(),
            J::Assignment(n) => n.ty.clone(),
            J::Literal(n) => n.ty.clone(),
            J::Binary(n) => n.ty.clone(),
            J::Parentheses(n) => n.tree.element.ty(),
            J::ParameterizedType(n) => n.ty.clone(),
            J::Primitive(n) => Some(JavaType::Primitive(n.kind)),
            J::ArrayType(n) => n.element.ty().map(JavaType::array_of),
            J::ClassDecl(n) => n.ty.clone(),
            J::VariableDecls(n) => n.type_expr.ty(),
            J::NamedVariable(n) => n.var_type.as_ref().map(|v| v.ty.clone()),
            J::MethodDecl(n) => n.method_type.clone().map(JavaType::Method),
            J::CompilationUnit(_)
            | J::Package(_)
            | J::Import(_)
            | J::Block(_)
            | J::Return(_)
            | J::Empty(_) => None,
        }
    }

    /// True for `Empty` placeholders.
    pub fn is_empty(&self) -> bool {
        matches!(self, J::Empty(_))
    }

    /// Print this subtree back to source text.
    pub fn print(&self) -> String {
        crate::codegen::print(self)
    }

    /// A fresh empty placeholder with the given prefix.
    pub fn empty(prefix: Space) -> J {
        J::Empty(Arc::new(Empty {
            id: NodeId::fresh(),
            prefix,
            markers: Markers::new(),
        }))
    }

    /// A primitive type tree.
    pub fn primitive(prefix: Space, kind: PrimitiveKind) -> J {
        J::Primitive(Arc::new(Primitive {
            id: NodeId::fresh(),
            prefix,
            markers: Markers::new(),
            kind,
        }))
    }
}

/// The dotted name spelled by an identifier or a chain of field accesses,
/// without whitespace.
pub fn qualified_name(tree: &J) -> Option<String> {
    match tree {
        J::Identifier(id) => Some(id.name.to_string()),
        J::FieldAccess(fa) => {
            let target = qualified_name(&fa.target)?;
            Some(format!("{}.{}", target, fa.name.element.name))
        }
        J::ParameterizedType(pt) => qualified_name(&pt.clazz),
        _ => None,
    }
}

/// Split a leading prefix off a node: returns the prefix and the node with an
/// empty prefix.
pub(crate) fn hoist_prefix(tree: J) -> (Space, J) {
    let prefix = tree.prefix().clone();
    (prefix, tree.with_prefix(Space::EMPTY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Arc<Identifier> {
        Arc::new(Identifier::build(Space::EMPTY, name))
    }

    #[test]
    fn with_prefix_returns_same_node_when_unchanged() {
        let j = J::Identifier(ident("a"));
        let same = j.with_prefix(Space::EMPTY);
        assert!(same.ptr_eq(&j));
        let moved = j.with_prefix(Space::single());
        assert!(!moved.ptr_eq(&j));
        assert_eq!(moved.id(), j.id());
        assert_eq!(moved.prefix().as_str(), " ");
    }

    #[test]
    fn kind_and_casts() {
        let j = J::Identifier(ident("a"));
        assert_eq!(j.kind(), JKind::Identifier);
        assert!(j.as_identifier().is_some());
        assert!(j.as_field_access().is_none());
        assert!(Identifier::cast(&j).is_some());
        assert_eq!(<Identifier as TreeKind>::KIND, JKind::Identifier);
    }

    #[test]
    fn ptr_eq_distinguishes_equal_looking_nodes() {
        let a = J::Identifier(ident("a"));
        let b = J::Identifier(ident("a"));
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
    }

    #[test]
    fn qualified_names() {
        let fa = FieldAccess::build(J::Identifier(ident("java")), Space::EMPTY, ident("util"));
        let fa = FieldAccess::build(J::from(fa), Space::EMPTY, ident("List"));
        assert_eq!(qualified_name(&J::from(fa)).as_deref(), Some("java.util.List"));
    }

    #[test]
    fn markers_persist() {
        let j = J::Identifier(ident("a"));
        let marked = j.with_markers(j.markers().add(rewrite_core::SearchResult::new()));
        assert!(!marked.ptr_eq(&j));
        assert!(marked.markers().has::<rewrite_core::SearchResult>());
        assert!(!j.markers().has::<rewrite_core::SearchResult>());
    }
}
