// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The visitor contract: structural sharing, traversal order, cursor
//! positions, messages between frames and the shape-preserving guarantee.

mod support;

use std::sync::Arc;

use rewrite_core::{Markers, MessageKey, NodeId};
use rewrite_java::tree::*;
use rewrite_java::visitor::{
    visit_unit, walk_block, walk_identifier, walk_method_decl, ExecutionContext, Iso,
    IsoAdapter, JavaIsoVisitor, JavaVisitor, VisitCtx,
};
use support::parse;

fn context(parsed: &rewrite_java::parser::ParsedSources) -> VisitCtx {
    VisitCtx::new(ExecutionContext::new(Arc::new(parsed.classpath.clone())))
}

fn methods(unit: &CompilationUnit) -> Vec<Arc<MethodDecl>> {
    unit.class_named("A")
        .expect("class A")
        .body
        .statements()
        .filter_map(|s| s.as_method_decl().cloned())
        .collect()
}

struct RenameIdent {
    from: &'static str,
    to: &'static str,
}

impl JavaVisitor for RenameIdent {
    fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> J {
        let node = walk_identifier(self, node, cx);
        if &*node.name == self.from {
            return J::from(node.with_name(self.to));
        }
        J::Identifier(node)
    }
}

#[test]
fn untouched_siblings_are_shared() {
    let parsed = parse(&["class A {\n    int f() { return 1; }\n    int g(int y) { return y; }\n}\n"]);
    let unit = &parsed.units[0];
    let out = visit_unit(&mut RenameIdent { from: "y", to: "z" }, unit, &mut context(&parsed));

    let (before, after) = (methods(unit), methods(&out));
    assert!(Arc::ptr_eq(&before[0], &after[0]), "f was rebuilt");
    assert!(!Arc::ptr_eq(&before[1], &after[1]), "g was not rebuilt");
    assert_eq!(
        J::from(out).print(),
        "class A {\n    int f() { return 1; }\n    int g(int z) { return z; }\n}\n"
    );
}

#[test]
fn rebuilt_nodes_keep_their_ids() {
    let parsed = parse(&["class A { int g(int y) { return y; } }"]);
    let unit = &parsed.units[0];
    let out = visit_unit(&mut RenameIdent { from: "y", to: "z" }, unit, &mut context(&parsed));
    assert_eq!(unit.id, out.id);
    assert_eq!(methods(unit)[0].id, methods(&out)[0].id);
}

/// Records every identifier with the kind of its parent.
#[derive(Default)]
struct Positions(Vec<(String, JKind)>);

impl JavaVisitor for Positions {
    fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> J {
        if let Some(parent) = cx.cursor.parent_value() {
            self.0.push((node.name.to_string(), parent.kind()));
        }
        J::Identifier(walk_identifier(self, node, cx))
    }
}

#[test]
fn children_are_visited_in_source_order_under_their_parents() {
    let parsed = parse(&["class A { int n; int f() { return n; } }"]);
    let mut positions = Positions::default();
    visit_unit(&mut positions, &parsed.units[0], &mut context(&parsed));
    let names: Vec<&str> = positions.0.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["A", "n", "f", "n"]);
    assert_eq!(positions.0[0].1, JKind::ClassDecl);
    assert_eq!(positions.0[1].1, JKind::NamedVariable);
    assert_eq!(positions.0[2].1, JKind::MethodDecl);
    assert_eq!(positions.0[3].1, JKind::Return);
}

#[test]
fn cursor_is_back_at_the_root_after_a_visit() {
    let parsed = parse(&["class A { int f() { return 1; } }"]);
    let mut cx = context(&parsed);
    visit_unit(&mut Positions::default(), &parsed.units[0], &mut cx);
    assert!(cx.cursor.is_root());
}

/// Counts return statements per method through a message on the method's
/// frame.
struct ReturnCount;

impl MessageKey for ReturnCount {
    type Value = usize;
}

#[derive(Default)]
struct CountReturns(Vec<(String, usize)>);

impl JavaVisitor for CountReturns {
    fn visit_method_decl(&mut self, node: &Arc<MethodDecl>, cx: &mut VisitCtx) -> J {
        let node = walk_method_decl(self, node, cx);
        let count = cx.cursor.take_message::<ReturnCount>().unwrap_or(0);
        self.0.push((node.simple_name().to_string(), count));
        J::MethodDecl(node)
    }

    fn visit_return(&mut self, node: &Arc<Return>, cx: &mut VisitCtx) -> J {
        if let Some(frame) = cx.cursor.ancestor_frame(|t| matches!(t, J::MethodDecl(_))) {
            *cx.cursor.accumulate::<ReturnCount>(frame) += 1;
        }
        J::Return(node.clone())
    }
}

#[test]
fn messages_reach_the_frame_they_were_put_on() {
    let parsed = parse(&["class A {\n    int f() { { return 1; } }\n    int g() { return 2; }\n    void h() {}\n}\n"]);
    let mut counter = CountReturns::default();
    visit_unit(&mut counter, &parsed.units[0], &mut context(&parsed));
    assert_eq!(
        counter.0,
        [("f".to_string(), 1), ("g".to_string(), 1), ("h".to_string(), 0)]
    );
}

/// Drops empty statements from blocks.
struct DropEmpty;

impl JavaIsoVisitor for DropEmpty {
    fn visit_block(&mut self, node: &Arc<Block>, cx: &mut VisitCtx) -> Arc<Block> {
        let block = walk_block(&mut IsoAdapter(self), node, cx);
        if !block.statements().any(J::is_empty) {
            return block;
        }
        let kept = block
            .statements
            .iter()
            .filter(|s| !s.element.is_empty())
            .cloned()
            .collect();
        Arc::new(block.with_statements(kept))
    }
}

#[test]
fn iso_visitor_runs_as_a_visitor() {
    let parsed = parse(&["class A { void f() { ; g(); ; } void g() {} }"]);
    let out = visit_unit(&mut Iso(DropEmpty), &parsed.units[0], &mut context(&parsed));
    assert_eq!(J::from(out).print(), "class A { void f() { g(); } void g() {} }");
}

/// Turns identifiers into empty statements from a hook.
struct Vandal;

impl JavaIsoVisitor for Vandal {
    fn post_visit(&mut self, tree: J, _cx: &mut VisitCtx) -> J {
        match tree {
            J::Identifier(ident) => J::empty(ident.prefix.clone()),
            other => other,
        }
    }
}

#[test]
#[should_panic(expected = "shape-preserving visitor")]
fn iso_hooks_cannot_change_the_kind() {
    let parsed = parse(&["class A { int n; }"]);
    visit_unit(&mut Iso(Vandal), &parsed.units[0], &mut context(&parsed));
}

/// Substitutes every literal `1` before its visit.
struct Substitute;

impl JavaVisitor for Substitute {
    fn pre_visit(&mut self, tree: &J, _cx: &mut VisitCtx) -> J {
        match tree {
            J::Literal(lit) if &*lit.source == "1" => J::from(Literal {
                id: NodeId::fresh(),
                markers: Markers::new(),
                source: Arc::from("2"),
                ..(**lit).clone()
            }),
            _ => tree.clone(),
        }
    }
}

#[test]
fn pre_visit_substitutes_before_the_visit() {
    let parsed = parse(&["class A { int f() { return 1 + 1; } }"]);
    let out = visit_unit(&mut Substitute, &parsed.units[0], &mut context(&parsed));
    assert_eq!(J::from(out).print(), "class A { int f() { return 2 + 2; } }");
}
