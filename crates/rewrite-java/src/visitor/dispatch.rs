// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use super::{JavaVisitor, VisitCtx};
use crate::tree::*;

macro_rules! dispatch_kinds {
    ($($kind:ident),* $(,)?) => {
        fn dispatch<V: JavaVisitor + ?Sized>(v: &mut V, tree: &J, cx: &mut VisitCtx) -> J {
            paste::paste! {
                match tree {
                    $(J::$kind(n) => v.[<visit_ $kind:snake>](n, cx),)*
                }
            }
        }
    };
}

java_kinds!(dispatch_kinds);

/// Visit `tree` with `v`.
///
/// The node is on the cursor for the whole visit, including both hooks. A
/// node substituted by `pre_visit` replaces it on the cursor.
pub fn visit<V: JavaVisitor + ?Sized>(v: &mut V, tree: &J, cx: &mut VisitCtx) -> J {
    cx.cursor.push(tree.clone());
    let pre = v.pre_visit(tree, cx);
    if !pre.ptr_eq(tree) {
        cx.cursor.replace_value(pre.clone());
    }
    let visited = dispatch(v, &pre, cx);
    let out = v.post_visit(visited, cx);
    cx.cursor.pop();
    out
}

/// Visit a child slot that can only hold a `T`.
///
/// # Panics
///
/// Panics if the visitor returns another kind: the slot cannot hold it.
pub fn visit_as<T: TreeKind, V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<T>,
    cx: &mut VisitCtx,
) -> Arc<T> {
    let out = visit(v, &T::into_j(node.clone()), cx);
    match T::cast(&out) {
        Some(n) => n.clone(),
        None => panic!(
            "visitor returned a {:?} for a slot that only holds {:?}",
            out.kind(),
            T::KIND
        ),
    }
}

/// Visit a whole compilation unit from a fresh cursor.
pub fn visit_unit<V: JavaVisitor + ?Sized>(
    v: &mut V,
    unit: &Arc<CompilationUnit>,
    cx: &mut VisitCtx,
) -> Arc<CompilationUnit> {
    visit_as(v, unit, cx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JavaParser;
    use crate::visitor::{
        walk_block, walk_identifier, ExecutionContext, Iso, JavaIsoVisitor, NoopVisitor,
    };
    use crate::types::Classpath;

    fn cx() -> VisitCtx {
        VisitCtx::new(ExecutionContext::new(Arc::new(Classpath::standard())))
    }

    fn unit(source: &str) -> Arc<CompilationUnit> {
        JavaParser::standard().parse(source).unwrap()
    }

    #[test]
    fn noop_returns_same_node() {
        let unit = unit("class A { int x; void f() { x = 1; } }");
        let out = visit_unit(&mut NoopVisitor, &unit, &mut cx());
        assert!(Arc::ptr_eq(&out, &unit));
    }

    #[test]
    fn cursor_is_balanced() {
        let unit = unit("class A { void f() { g(); } void g() { } }");
        let mut cx = cx();
        visit_unit(&mut NoopVisitor, &unit, &mut cx);
        assert!(cx.cursor.is_root());
    }

    struct Rename;

    impl JavaVisitor for Rename {
        fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> J {
            let node = walk_identifier(self, node, cx);
            if &*node.name == "x" {
                return J::from(node.with_name("y"));
            }
            J::Identifier(node)
        }
    }

    #[test]
    fn changes_rebuild_only_the_path() {
        let unit = unit("class A { int x; void f() { x = 1; } void g() { } }");
        let out = visit_unit(&mut Rename, &unit, &mut cx());
        assert!(!Arc::ptr_eq(&out, &unit));
        assert_eq!(
            J::from(out.clone()).print(),
            "class A { int y; void f() { y = 1; } void g() { } }"
        );
        let before = &unit.classes[0].body.statements[2].element;
        let after = &out.classes[0].body.statements[2].element;
        assert!(before.ptr_eq(after));
    }

    struct ReplaceBlocksWithIdentifiers;

    impl JavaVisitor for ReplaceBlocksWithIdentifiers {
        fn visit_block(&mut self, _node: &Arc<Block>, _cx: &mut VisitCtx) -> J {
            J::from(Identifier::build(Space::EMPTY, "oops"))
        }
    }

    #[test]
    #[should_panic(expected = "only holds Block")]
    fn fixed_kind_slot_rejects_other_kinds() {
        let unit = unit("class A { }");
        visit_unit(&mut ReplaceBlocksWithIdentifiers, &unit, &mut cx());
    }

    #[derive(Default)]
    struct CountBlocks {
        blocks: usize,
    }

    impl JavaIsoVisitor for CountBlocks {
        fn visit_block(&mut self, node: &Arc<Block>, cx: &mut VisitCtx) -> Arc<Block> {
            self.blocks += 1;
            walk_block(&mut crate::visitor::IsoAdapter(self), node, cx)
        }
    }

    #[test]
    fn iso_visitor_runs_as_general_visitor() {
        let unit = unit("class A { void f() { { } } static { } }");
        let mut v = Iso(CountBlocks::default());
        let out = visit_unit(&mut v, &unit, &mut cx());
        assert!(Arc::ptr_eq(&out, &unit));
        assert_eq!(v.0.blocks, 4);
    }

    struct SwapInPreVisit;

    impl JavaIsoVisitor for SwapInPreVisit {
        fn pre_visit(&mut self, tree: &J, _cx: &mut VisitCtx) -> J {
            match tree {
                J::Literal(_) => J::from(Identifier::build(Space::EMPTY, "nope")),
                other => other.clone(),
            }
        }
    }

    #[test]
    #[should_panic(expected = "shape-preserving visitor changed a Literal")]
    fn iso_hooks_must_keep_the_kind() {
        let unit = unit("class A { int x = 1; }");
        visit_unit(&mut Iso(SwapInPreVisit), &unit, &mut cx());
    }
}
