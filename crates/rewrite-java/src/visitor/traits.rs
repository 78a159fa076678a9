// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait definitions.

use std::sync::Arc;

use super::walk::*;
use super::VisitCtx;
use crate::tree::*;

/// Generate the `visit_*` methods of [`JavaVisitor`].
///
/// Each method returns any kind and defaults to its walk function.
macro_rules! visitor_methods {
    ($($kind:ident),* $(,)?) => {
        paste::paste! {
            $(
                #[doc = concat!("Visit a [`", stringify!($kind), "`].")]
                fn [<visit_ $kind:snake>](&mut self, node: &Arc<$kind>, cx: &mut VisitCtx) -> J {
                    J::$kind([<walk_ $kind:snake>](self, node, cx))
                }
            )*
        }
    };
}

/// Generate the `visit_*` methods of [`JavaIsoVisitor`].
macro_rules! iso_visitor_methods {
    ($($kind:ident),* $(,)?) => {
        paste::paste! {
            $(
                #[doc = concat!("Visit a [`", stringify!($kind), "`], returning the same kind.")]
                fn [<visit_ $kind:snake>](&mut self, node: &Arc<$kind>, cx: &mut VisitCtx) -> Arc<$kind> {
                    [<walk_ $kind:snake>](&mut IsoAdapter(self), node, cx)
                }
            )*
        }
    };
}

/// Forward every `visit_*` method to the iso visitor returned by
/// `self.iso()`, wrapping the result back into [`J`].
macro_rules! forward_iso_methods {
    ($($kind:ident),* $(,)?) => {
        paste::paste! {
            $(
                fn [<visit_ $kind:snake>](&mut self, node: &Arc<$kind>, cx: &mut VisitCtx) -> J {
                    J::$kind(self.iso().[<visit_ $kind:snake>](node, cx))
                }
            )*
        }
    };
}

/// A visitor that may return a node of any kind.
pub trait JavaVisitor {
    /// Called before the kind-specific method.
    ///
    /// Returning a different node substitutes it for the rest of the visit.
    fn pre_visit(&mut self, tree: &J, _cx: &mut VisitCtx) -> J {
        tree.clone()
    }

    /// Called with the result of the kind-specific method.
    fn post_visit(&mut self, tree: J, _cx: &mut VisitCtx) -> J {
        tree
    }

    java_kinds!(visitor_methods);
}

/// A visitor that returns the kind it was given.
///
/// The hooks may substitute a node of the same kind only.
pub trait JavaIsoVisitor {
    fn pre_visit(&mut self, tree: &J, _cx: &mut VisitCtx) -> J {
        tree.clone()
    }

    fn post_visit(&mut self, tree: J, _cx: &mut VisitCtx) -> J {
        tree
    }

    java_kinds!(iso_visitor_methods);
}

fn same_kind(before: JKind, after: J, hook: &str) -> J {
    if before != after.kind() {
        panic!(
            "shape-preserving visitor changed a {:?} into a {:?} in {}",
            before,
            after.kind(),
            hook
        );
    }
    after
}

/// Borrowing adapter that lets the walk functions call back into an iso
/// visitor.
pub struct IsoAdapter<'v, V: ?Sized>(pub &'v mut V);

impl<V: JavaIsoVisitor + ?Sized> IsoAdapter<'_, V> {
    fn iso(&mut self) -> &mut V {
        &mut *self.0
    }
}

impl<V: JavaIsoVisitor + ?Sized> JavaVisitor for IsoAdapter<'_, V> {
    fn pre_visit(&mut self, tree: &J, cx: &mut VisitCtx) -> J {
        let out = self.0.pre_visit(tree, cx);
        same_kind(tree.kind(), out, "pre_visit")
    }

    fn post_visit(&mut self, tree: J, cx: &mut VisitCtx) -> J {
        let kind = tree.kind();
        let out = self.0.post_visit(tree, cx);
        same_kind(kind, out, "post_visit")
    }

    java_kinds!(forward_iso_methods);
}

/// An owned iso visitor usable as a [`JavaVisitor`].
pub struct Iso<V>(pub V);

impl<V: JavaIsoVisitor> Iso<V> {
    fn iso(&mut self) -> &mut V {
        &mut self.0
    }
}

impl<V: JavaIsoVisitor> JavaVisitor for Iso<V> {
    fn pre_visit(&mut self, tree: &J, cx: &mut VisitCtx) -> J {
        IsoAdapter(&mut self.0).pre_visit(tree, cx)
    }

    fn post_visit(&mut self, tree: J, cx: &mut VisitCtx) -> J {
        IsoAdapter(&mut self.0).post_visit(tree, cx)
    }

    java_kinds!(forward_iso_methods);
}

/// A visitor that changes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVisitor;

impl JavaVisitor for NoopVisitor {}
