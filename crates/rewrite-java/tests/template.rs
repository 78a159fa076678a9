// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Templates spliced at each kind of coordinates.

mod support;

use std::sync::Arc;

use rewrite_java::recipe::Recipe;
use rewrite_java::template::{Coordinates, JavaTemplate, TemplateError};
use rewrite_java::tree::*;
use rewrite_java::visitor::{
    visit_unit, walk_block, ExecutionContext, JavaVisitor, VisitCtx,
};
use support::{assert_changed, assert_same_text, parse};

fn apply(source: &str, visitor: &mut dyn JavaVisitor) -> (String, usize) {
    let parsed = parse(&[source]);
    let mut cx = VisitCtx::new(ExecutionContext::new(Arc::new(parsed.classpath)));
    let out = visit_unit(visitor, &parsed.units[0], &mut cx);
    (J::from(out).print(), cx.exec.failures().len())
}

/// Replaces `null` initializers with a new list.
struct NullToList(JavaTemplate);

impl JavaVisitor for NullToList {
    fn visit_literal(&mut self, node: &Arc<Literal>, cx: &mut VisitCtx) -> J {
        let tree = J::Literal(node.clone());
        if &*node.source != "null" {
            return tree;
        }
        self.0.apply_or_keep(cx, Coordinates::Replace(&tree), &[], &tree)
    }
}

struct NoNullLists;

impl Recipe for NoNullLists {
    fn name(&self) -> &str {
        "NoNullLists"
    }

    fn display_name(&self) -> &str {
        "Start lists empty"
    }

    fn visitor(&self) -> Box<dyn JavaVisitor> {
        Box::new(NullToList(
            JavaTemplate::builder("new ArrayList<String>()")
                .imports(["java.util.ArrayList"])
                .expression()
                .build(),
        ))
    }
}

#[test]
fn template_imports_are_added_to_the_unit() {
    assert_changed(
        NoNullLists,
        &["package a;\n\nimport java.util.List;\n\nclass A {\n    List<String> names = null;\n}\n"],
        "package a;\n\nimport java.util.ArrayList;\nimport java.util.List;\n\nclass A {\n    List<String> names = new ArrayList<String>();\n}\n",
    );
}

/// Replaces the body of `twice`.
struct ReplaceBody(JavaTemplate);

impl JavaVisitor for ReplaceBody {
    fn visit_method_decl(&mut self, node: &Arc<MethodDecl>, cx: &mut VisitCtx) -> J {
        let tree = J::MethodDecl(node.clone());
        if node.simple_name() != "twice" {
            return tree;
        }
        self.0.apply_or_keep(cx, Coordinates::ReplaceBody(node), &[], &tree)
    }
}

#[test]
fn method_body_is_replaced_and_indented() {
    let (out, failures) = apply(
        "class A {\n    int twice(int y) {\n        return 0;\n    }\n}\n",
        &mut ReplaceBody(JavaTemplate::builder("return y * 2;").build()),
    );
    assert_eq!(failures, 0);
    assert_same_text(
        "class A {\n    int twice(int y) {\n        return y * 2;\n    }\n}\n",
        &out,
    );
}

/// Replaces the arguments of calls to `log`.
struct ReplaceArgs(JavaTemplate);

impl JavaVisitor for ReplaceArgs {
    fn visit_method_invocation(&mut self, node: &Arc<MethodInvocation>, cx: &mut VisitCtx) -> J {
        let tree = J::MethodInvocation(node.clone());
        if node.simple_name() != "log" {
            return tree;
        }
        let first = match node.arguments().next() {
            Some(first) => first.clone(),
            None => return tree,
        };
        self.0
            .apply_or_keep(cx, Coordinates::ReplaceArguments(&tree), &[first], &tree)
    }
}

#[test]
fn arguments_are_replaced_with_bound_trees() {
    let (out, failures) = apply(
        "class A {\n    void log(Object a) {}\n    void f() {\n        log(\"a\");\n    }\n}\n",
        &mut ReplaceArgs(JavaTemplate::builder("#{}, 2").build()),
    );
    assert_eq!(failures, 0);
    assert_same_text(
        "class A {\n    void log(Object a) {}\n    void f() {\n        log(\"a\", 2);\n    }\n}\n",
        &out,
    );
}

/// Inserts a statement before the first `return` of each block.
struct BeforeReturn(JavaTemplate);

impl JavaVisitor for BeforeReturn {
    fn visit_block(&mut self, node: &Arc<Block>, cx: &mut VisitCtx) -> J {
        let node = walk_block(self, node, cx);
        let found = node.statements().find(|s| s.as_return().is_some()).map(J::id);
        let Some(anchor) = found else {
            return J::Block(node);
        };
        let tree = J::Block(node.clone());
        self.0.apply_or_keep(
            cx,
            Coordinates::Before {
                block: &node,
                anchor,
            },
            &[],
            &tree,
        )
    }
}

#[test]
fn statements_go_before_the_anchor() {
    let (out, failures) = apply(
        "class A {\n    int f(int x) {\n        x = x + 1;\n        return x;\n    }\n}\n",
        &mut BeforeReturn(JavaTemplate::builder("x = x * 2;").build()),
    );
    assert_eq!(failures, 0);
    assert_same_text(
        "class A {\n    int f(int x) {\n        x = x + 1;\n        x = x * 2;\n        return x;\n    }\n}\n",
        &out,
    );
}

#[test]
fn snippet_that_does_not_parse_leaves_the_tree() {
    let source = "class A {\n    int twice(int y) {\n        return 0;\n    }\n}\n";
    let (out, failures) = apply(
        source,
        &mut ReplaceBody(JavaTemplate::builder("return y *;").build()),
    );
    assert_eq!(failures, 1);
    assert_same_text(source, &out);
}

#[test]
fn expression_templates_only_replace_trees() {
    let parsed = parse(&["class A { void f() { return; } }"]);
    let mut cx = VisitCtx::new(ExecutionContext::new(Arc::new(parsed.classpath.clone())));
    let method = parsed.units[0].classes[0]
        .body
        .statements()
        .find_map(|s| s.as_method_decl().cloned())
        .unwrap();
    let err = JavaTemplate::builder("1")
        .expression()
        .build()
        .apply(&mut cx, Coordinates::ReplaceBody(&method), &[])
        .unwrap_err();
    assert!(matches!(err, TemplateError::Coordinates(_)), "{}", err);
}
