// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Round-trip tests: `print(parse(source)) == source` for every source the
//! parser accepts, with and without attribution, and after visits that
//! change nothing.

mod support;

use rewrite_java::parser::{parse_compilation_unit, prettify_error};
use rewrite_java::tree::J;
use rewrite_java::visitor::{visit_unit, NoopVisitor, VisitCtx, ExecutionContext};
use std::sync::Arc;
use support::{assert_same_text, parse};

fn assert_roundtrip(source: &str, label: &str) {
    let unit = match parse_compilation_unit(source) {
        Ok(unit) => unit,
        Err(err) => panic!("{}", prettify_error(&err, source, label)),
    };
    assert_same_text(source, &J::from(unit).print());
}

// =============================================================================
// Syntax only
// =============================================================================

#[test]
fn roundtrip_empty_unit() {
    assert_roundtrip("", "empty");
    assert_roundtrip("\n\n", "blank lines");
}

#[test]
fn roundtrip_package_and_imports() {
    assert_roundtrip(
        "package a.b;\n\nimport java.util.List;\nimport java.util.*;\nimport static java.util.Collections.EMPTY_LIST;\n\nclass A {}\n",
        "imports",
    );
}

#[test]
fn roundtrip_comments_everywhere() {
    assert_roundtrip(
        "/* header */\npackage a; // trailing\n\n/** docs */\nclass A /* before body */ {\n    // field\n    int n /* after name */ = 1 ; // end\n}\n",
        "comments",
    );
}

#[test]
fn roundtrip_odd_whitespace() {
    assert_roundtrip("class   A{int\tn=1;void f( ){ n  =n+ 1 ;}}", "spacing");
    assert_roundtrip("class A {\r\n    int n;\r\n}\r\n", "crlf");
}

#[test]
fn roundtrip_class_headers() {
    assert_roundtrip(
        "public abstract class A extends B implements C, D<E> {}\ninterface C extends F, G {}\nfinal class B {}\n",
        "headers",
    );
}

#[test]
fn roundtrip_members() {
    assert_roundtrip(
        "class A {\n    static int a, b = 2;\n    String[] names;\n    java.util.Map<String, java.util.List<Integer>> index;\n\n    static {\n        a = 1;\n    }\n\n    {\n        b = 3;\n    }\n\n    A() {}\n\n    abstract void g();\n\n    private int f(int x, String y) {\n        return x;\n    }\n\n    class Inner {}\n}\n",
        "members",
    );
}

#[test]
fn roundtrip_expressions() {
    assert_roundtrip(
        "class A {\n    void f() {\n        int x = (1 + 2) * 3 - 4 / 5 % 6;\n        boolean b = x < 1 || x >= 2 && x != 3;\n        String s = \"a \\\"quoted\\\" string\";\n        char c = '\\n';\n        double d = 1.5d;\n        Object o = null;\n        this.f();\n        System.out.println(s.trim().length());\n        x = y = 2;\n        ;\n    }\n}\n",
        "expressions",
    );
}

#[test]
fn roundtrip_constructions() {
    assert_roundtrip(
        "class A {\n    Object a = new Object();\n    java.util.List<String> l = new java.util.ArrayList<>();\n    Runnable r = new Runnable() {\n        public void run() {}\n    };\n    java.util.Map<String, Integer> m = new java.util.HashMap<String, Integer>() {{\n        put(\"a\", 1);\n    }};\n}\n",
        "constructions",
    );
}

#[test]
fn roundtrip_nested_blocks() {
    assert_roundtrip(
        "class A {\n    void f() {\n        {\n            {\n                g();\n            }\n        }\n    }\n}\n",
        "blocks",
    );
}

// =============================================================================
// Attributed sources
// =============================================================================

#[test]
fn attribution_does_not_change_the_text() {
    let sources = [
        "package a;\n\nimport java.util.List;\n\npublic class Foo {\n    public static int count; // shared\n    List<String> names;\n\n    int next() { return count + names.size(); }\n}\n",
        "package b;\n\nimport a.Foo;\n\nclass Bar extends Foo {\n    int twice() { return next() * 2; }\n}\n",
    ];
    let parsed = parse(&sources);
    for (unit, source) in parsed.units.iter().zip(sources) {
        assert_same_text(source, &J::from(unit.clone()).print());
    }
}

#[test]
fn noop_visit_returns_the_same_tree() {
    let parsed = parse(&["class A {\n    int n;\n    int f() { return n + 1; }\n}\n"]);
    let unit = &parsed.units[0];
    let mut cx = VisitCtx::new(ExecutionContext::new(Arc::new(parsed.classpath.clone())));
    let out = visit_unit(&mut NoopVisitor, unit, &mut cx);
    assert!(Arc::ptr_eq(unit, &out));
}
