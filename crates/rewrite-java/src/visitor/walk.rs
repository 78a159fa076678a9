// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk functions: visit a node's children and rebuild the node only if
//! one of them changed.
//!
//! Children are visited in source order. A walk that sees no change
//! returns the node it was given.

use std::sync::Arc;

use super::dispatch::{visit, visit_as};
use super::{JavaVisitor, VisitCtx};
use crate::tree::*;

/// Visits children and remembers whether any of them changed.
struct Children<'a, V: ?Sized> {
    v: &'a mut V,
    changed: bool,
}

impl<'a, V: JavaVisitor + ?Sized> Children<'a, V> {
    fn new(v: &'a mut V) -> Self {
        Children { v, changed: false }
    }

    fn tree(&mut self, tree: &J, cx: &mut VisitCtx) -> J {
        let out = visit(self.v, tree, cx);
        self.changed |= !out.ptr_eq(tree);
        out
    }

    fn slot<T: TreeKind>(&mut self, node: &Arc<T>, cx: &mut VisitCtx) -> Arc<T> {
        let out = visit_as(self.v, node, cx);
        self.changed |= !Arc::ptr_eq(&out, node);
        out
    }

    fn opt(&mut self, tree: &Option<J>, cx: &mut VisitCtx) -> Option<J> {
        tree.as_ref().map(|t| self.tree(t, cx))
    }

    fn trailing(&mut self, t: &Trailing<J>, cx: &mut VisitCtx) -> Trailing<J> {
        let element = self.tree(&t.element, cx);
        t.with_element(element)
    }

    fn leading(&mut self, l: &Leading<J>, cx: &mut VisitCtx) -> Leading<J> {
        let element = self.tree(&l.element, cx);
        l.with_element(element)
    }

    fn trailing_list(&mut self, list: &[Trailing<J>], cx: &mut VisitCtx) -> Vec<Trailing<J>> {
        list.iter().map(|t| self.trailing(t, cx)).collect()
    }

    fn delimited(&mut self, list: &Delimited<J>, cx: &mut VisitCtx) -> Delimited<J> {
        let elements = self.trailing_list(&list.elements, cx);
        list.with_elements(elements)
    }
}

pub fn walk_compilation_unit<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<CompilationUnit>,
    cx: &mut VisitCtx,
) -> Arc<CompilationUnit> {
    let mut c = Children::new(v);
    let package = node
        .package
        .as_ref()
        .map(|p| p.with_element(c.slot(&p.element, cx)));
    let imports = node
        .imports
        .iter()
        .map(|i| i.with_element(c.slot(&i.element, cx)))
        .collect();
    let classes = node.classes.iter().map(|k| c.slot(k, cx)).collect();
    if !c.changed {
        return node.clone();
    }
    Arc::new(CompilationUnit {
        package,
        imports,
        classes,
        ..(**node).clone()
    })
}

pub fn walk_package<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Package>,
    cx: &mut VisitCtx,
) -> Arc<Package> {
    let mut c = Children::new(v);
    let name = c.tree(&node.name, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(Package {
        name,
        ..(**node).clone()
    })
}

pub fn walk_import<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Import>,
    cx: &mut VisitCtx,
) -> Arc<Import> {
    let mut c = Children::new(v);
    let qualid = c.slot(&node.qualid, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(Import {
        qualid,
        ..(**node).clone()
    })
}

pub fn walk_class_decl<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<ClassDecl>,
    cx: &mut VisitCtx,
) -> Arc<ClassDecl> {
    let mut c = Children::new(v);
    let name = c.slot(&node.name, cx);
    let extends = node.extends.as_ref().map(|e| c.leading(e, cx));
    let implements = node.implements.as_ref().map(|d| c.delimited(d, cx));
    let body = c.slot(&node.body, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(ClassDecl {
        name,
        extends,
        implements,
        body,
        ..(**node).clone()
    })
}

pub fn walk_block<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Block>,
    cx: &mut VisitCtx,
) -> Arc<Block> {
    let mut c = Children::new(v);
    let statements = c.trailing_list(&node.statements, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(node.with_statements(statements))
}

pub fn walk_method_decl<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<MethodDecl>,
    cx: &mut VisitCtx,
) -> Arc<MethodDecl> {
    let mut c = Children::new(v);
    let return_type = c.opt(&node.return_type, cx);
    let name = c.slot(&node.name, cx);
    let params = c.delimited(&node.params, cx);
    let body = node.body.as_ref().map(|b| c.slot(b, cx));
    if !c.changed {
        return node.clone();
    }
    Arc::new(MethodDecl {
        return_type,
        name,
        params,
        body,
        ..(**node).clone()
    })
}

pub fn walk_variable_decls<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<VariableDecls>,
    cx: &mut VisitCtx,
) -> Arc<VariableDecls> {
    let mut c = Children::new(v);
    let type_expr = c.tree(&node.type_expr, cx);
    let vars = node
        .vars
        .iter()
        .map(|var| var.with_element(c.slot(&var.element, cx)))
        .collect();
    if !c.changed {
        return node.clone();
    }
    Arc::new(VariableDecls {
        type_expr,
        vars,
        ..(**node).clone()
    })
}

pub fn walk_named_variable<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<NamedVariable>,
    cx: &mut VisitCtx,
) -> Arc<NamedVariable> {
    let mut c = Children::new(v);
    let name = c.slot(&node.name, cx);
    let initializer = node.initializer.as_ref().map(|i| c.leading(i, cx));
    if !c.changed {
        return node.clone();
    }
    Arc::new(NamedVariable {
        name,
        initializer,
        ..(**node).clone()
    })
}

pub fn walk_return<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Return>,
    cx: &mut VisitCtx,
) -> Arc<Return> {
    let mut c = Children::new(v);
    let expr = c.opt(&node.expr, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(Return {
        expr,
        ..(**node).clone()
    })
}

pub fn walk_identifier<V: JavaVisitor + ?Sized>(
    _v: &mut V,
    node: &Arc<Identifier>,
    _cx: &mut VisitCtx,
) -> Arc<Identifier> {
    node.clone()
}

pub fn walk_field_access<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<FieldAccess>,
    cx: &mut VisitCtx,
) -> Arc<FieldAccess> {
    let mut c = Children::new(v);
    let target = c.tree(&node.target, cx);
    let name = node.name.with_element(c.slot(&node.name.element, cx));
    if !c.changed {
        return node.clone();
    }
    Arc::new(FieldAccess {
        target,
        name,
        ..(**node).clone()
    })
}

pub fn walk_method_invocation<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<MethodInvocation>,
    cx: &mut VisitCtx,
) -> Arc<MethodInvocation> {
    let mut c = Children::new(v);
    let select = node.select.as_ref().map(|s| c.trailing(s, cx));
    let name = c.slot(&node.name, cx);
    let args = c.delimited(&node.args, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(MethodInvocation {
        select,
        name,
        args,
        ..(**node).clone()
    })
}

pub fn walk_new_class<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<NewClass>,
    cx: &mut VisitCtx,
) -> Arc<NewClass> {
    let mut c = Children::new(v);
    let clazz = c.tree(&node.clazz, cx);
    let args = c.delimited(&node.args, cx);
    let body = node.body.as_ref().map(|b| c.slot(b, cx));
    if !c.changed {
        return node.clone();
    }
    Arc::new(NewClass {
        clazz,
        args,
        body,
        ..(**node).clone()
    })
}

pub fn walk_assignment<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Assignment>,
    cx: &mut VisitCtx,
) -> Arc<Assignment> {
    let mut c = Children::new(v);
    let variable = c.tree(&node.variable, cx);
    let value = c.leading(&node.value, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(Assignment {
        variable,
        value,
        ..(**node).clone()
    })
}

pub fn walk_literal<V: JavaVisitor + ?Sized>(
    _v: &mut V,
    node: &Arc<Literal>,
    _cx: &mut VisitCtx,
) -> Arc<Literal> {
    node.clone()
}

pub fn walk_binary<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Binary>,
    cx: &mut VisitCtx,
) -> Arc<Binary> {
    let mut c = Children::new(v);
    let left = c.tree(&node.left, cx);
    let right = c.tree(&node.right, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(Binary {
        left,
        right,
        ..(**node).clone()
    })
}

pub fn walk_parentheses<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<Parentheses>,
    cx: &mut VisitCtx,
) -> Arc<Parentheses> {
    let mut c = Children::new(v);
    let tree = c.trailing(&node.tree, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(Parentheses {
        tree,
        ..(**node).clone()
    })
}

pub fn walk_parameterized_type<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<ParameterizedType>,
    cx: &mut VisitCtx,
) -> Arc<ParameterizedType> {
    let mut c = Children::new(v);
    let clazz = c.tree(&node.clazz, cx);
    let type_args = c.delimited(&node.type_args, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(ParameterizedType {
        clazz,
        type_args,
        ..(**node).clone()
    })
}

pub fn walk_primitive<V: JavaVisitor + ?Sized>(
    _v: &mut V,
    node: &Arc<Primitive>,
    _cx: &mut VisitCtx,
) -> Arc<Primitive> {
    node.clone()
}

pub fn walk_array_type<V: JavaVisitor + ?Sized>(
    v: &mut V,
    node: &Arc<ArrayType>,
    cx: &mut VisitCtx,
) -> Arc<ArrayType> {
    let mut c = Children::new(v);
    let element = c.tree(&node.element, cx);
    if !c.changed {
        return node.clone();
    }
    Arc::new(ArrayType {
        element,
        ..(**node).clone()
    })
}

pub fn walk_empty<V: JavaVisitor + ?Sized>(
    _v: &mut V,
    node: &Arc<Empty>,
    _cx: &mut VisitCtx,
) -> Arc<Empty> {
    node.clone()
}
