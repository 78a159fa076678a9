// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type graph traversal over attributed sources and hand-built types.

mod support;

use std::sync::Arc;

use rewrite_java::type_visitor::{visit_type, walk_variable, JavaTypeVisitor};
use rewrite_java::types::{JavaType, PrimitiveKind, VariableType};
use support::parse;

/// Renames fields called `from`.
struct RenameMember {
    from: &'static str,
    to: &'static str,
}

impl JavaTypeVisitor<usize> for RenameMember {
    fn visit_variable(&mut self, var: &Arc<VariableType>, renamed: &mut usize) -> JavaType {
        let var = walk_variable(self, var, renamed);
        if &*var.name == self.from {
            *renamed += 1;
            return JavaType::Variable(Arc::new(var.with_name(self.to)));
        }
        JavaType::Variable(var)
    }
}

#[test]
fn renaming_a_member_rebuilds_only_its_class() {
    let parsed = parse(&["package a;\n\npublic class Foo {\n    public int count;\n    public String name;\n\n    public Foo next() { return this; }\n}\n"]);
    let foo = parsed.classpath.lookup("a.Foo").unwrap();
    let ty = JavaType::Class(foo.clone());

    let mut renamed = 0;
    let out = visit_type(&mut RenameMember { from: "count", to: "total" }, &ty, &mut renamed);
    assert_eq!(renamed, 1);

    let out = out.as_class().unwrap();
    assert!(!Arc::ptr_eq(out, &foo));
    assert!(out.member("total").is_some());
    assert!(out.member("count").is_none());
    assert!(Arc::ptr_eq(out.member("name").unwrap(), foo.member("name").unwrap()));
    assert!(Arc::ptr_eq(&out.methods[0], &foo.methods[0]));
}

#[test]
fn attributed_classes_are_finite_graphs() {
    let parsed = parse(&["package a;\n\npublic class Node {\n    Node next;\n    Node parent() { return next; }\n}\n"]);
    let node = JavaType::Class(parsed.classpath.lookup("a.Node").unwrap());
    let mut renamed = 0;
    let out = visit_type(&mut RenameMember { from: "absent", to: "x" }, &node, &mut renamed);
    assert_eq!(renamed, 0);
    assert!(out.ptr_eq(&node));
}

/// Widens `int` to `long` and `java.lang.String` to `java.lang.Object`.
struct Widen;

impl JavaTypeVisitor<()> for Widen {
    fn visit_primitive(&mut self, kind: PrimitiveKind, _p: &mut ()) -> JavaType {
        match kind {
            PrimitiveKind::Int => JavaType::Primitive(PrimitiveKind::Long),
            other => JavaType::Primitive(other),
        }
    }

    fn visit_shallow_class(&mut self, ty: &JavaType, fqn: &str, _p: &mut ()) -> JavaType {
        if fqn == "java.lang.String" {
            return JavaType::shallow("java.lang.Object");
        }
        ty.clone()
    }
}

#[test]
fn constituents_of_compound_types_are_visited() {
    let array = JavaType::array_of(JavaType::Primitive(PrimitiveKind::Int));
    match visit_type(&mut Widen, &array, &mut ()) {
        JavaType::Array(element) => {
            assert!(matches!(*element, JavaType::Primitive(PrimitiveKind::Long)))
        }
        _ => panic!("array became another kind"),
    }

    let list = JavaType::parameterized(
        JavaType::shallow("java.util.List"),
        vec![JavaType::shallow("java.lang.String")],
    );
    let out = visit_type(&mut Widen, &list, &mut ());
    assert_eq!(out.fully_qualified_name(), Some("java.util.List"));
    assert_eq!(out.type_arguments()[0].fully_qualified_name(), Some("java.lang.Object"));

    let untouched = JavaType::array_of(JavaType::shallow("java.util.Map"));
    assert!(visit_type(&mut Widen, &untouched, &mut ()).ptr_eq(&untouched));
}
