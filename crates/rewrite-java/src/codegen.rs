// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Source generation.
//!
//! Printing is the inverse of parsing: every node emits its prefix, its
//! tokens, and the spaces held by its padding wrappers, in source order. A
//! tree produced by the parser prints back to the exact input text.

use std::fmt;
use std::sync::Arc;

use crate::tree::*;

/// Accumulates generated source text.
#[derive(Debug, Default)]
pub struct CodegenState {
    tokens: String,
}

impl CodegenState {
    pub fn add_token(&mut self, tok: &str) {
        self.tokens.push_str(tok);
    }

    pub fn add_space(&mut self, space: &Space) {
        self.tokens.push_str(space.as_str());
    }
}

impl fmt::Display for CodegenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens)
    }
}

pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);
}

/// Print a subtree to source text.
pub fn print(tree: &J) -> String {
    let mut state = CodegenState::default();
    tree.codegen(&mut state);
    state.to_string()
}

/// True if `tree`, used as a statement or class member, ends with `;`.
pub fn needs_semicolon(tree: &J) -> bool {
    match tree {
        J::ClassDecl(_) | J::Block(_) => false,
        J::MethodDecl(m) => m.body.is_none(),
        _ => true,
    }
}

impl<T: Codegen> Codegen for Arc<T> {
    fn codegen(&self, state: &mut CodegenState) {
        (**self).codegen(state)
    }
}

impl Codegen for J {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            J::CompilationUnit(n) => n.codegen(state),
            J::Package(n) => n.codegen(state),
            J::Import(n) => n.codegen(state),
            J::ClassDecl(n) => n.codegen(state),
            J::Block(n) => n.codegen(state),
            J::MethodDecl(n) => n.codegen(state),
            J::VariableDecls(n) => n.codegen(state),
            J::NamedVariable(n) => n.codegen(state),
            J::Return(n) => n.codegen(state),
            J::Identifier(n) => n.codegen(state),
            J::FieldAccess(n) => n.codegen(state),
            J::MethodInvocation(n) => n.codegen(state),
            J::NewClass(n) => n.codegen(state),
            J::Assignment(n) => n.codegen(state),
            J::Literal(n) => n.codegen(state),
            J::Binary(n) => n.codegen(state),
            J::Parentheses(n) => n.codegen(state),
            J::ParameterizedType(n) => n.codegen(state),
            J::Primitive(n) => n.codegen(state),
            J::ArrayType(n) => n.codegen(state),
            J::Empty(n) => n.codegen(state),
        }
    }
}

fn delimited<T: Codegen>(
    list: &Delimited<T>,
    open: &str,
    close: &str,
    state: &mut CodegenState,
) {
    state.add_space(&list.before);
    state.add_token(open);
    for (i, elem) in list.elements.iter().enumerate() {
        if i > 0 {
            state.add_token(",");
        }
        elem.element.codegen(state);
        state.add_space(&elem.after);
    }
    state.add_token(close);
}

fn modifiers(mods: &[Modifier], state: &mut CodegenState) {
    for m in mods {
        state.add_space(&m.prefix);
        state.add_token(m.keyword.as_str());
    }
}

impl Codegen for CompilationUnit {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        if let Some(pkg) = &self.package {
            pkg.element.codegen(state);
            state.add_space(&pkg.after);
            state.add_token(";");
        }
        for import in &self.imports {
            import.element.codegen(state);
            state.add_space(&import.after);
            state.add_token(";");
        }
        for class in &self.classes {
            class.codegen(state);
        }
        state.add_space(&self.eof);
    }
}

impl Codegen for Package {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("package");
        self.name.codegen(state);
    }
}

impl Codegen for Import {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("import");
        if let Some(statik) = &self.statik {
            state.add_space(statik);
            state.add_token("static");
        }
        self.qualid.codegen(state);
    }
}

impl Codegen for ClassDecl {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        modifiers(&self.modifiers, state);
        state.add_space(&self.kind_prefix);
        state.add_token(self.kind.keyword());
        self.name.codegen(state);
        if let Some(extends) = &self.extends {
            state.add_space(&extends.before);
            state.add_token("extends");
            extends.element.codegen(state);
        }
        if let Some(implements) = &self.implements {
            state.add_space(&implements.before);
            state.add_token(match self.kind {
                crate::types::ClassKind::Interface => "extends",
                _ => "implements",
            });
            for (i, elem) in implements.elements.iter().enumerate() {
                if i > 0 {
                    state.add_token(",");
                }
                elem.element.codegen(state);
                state.add_space(&elem.after);
            }
        }
        self.body.codegen(state);
    }
}

impl Codegen for Block {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        if let Some(statik) = &self.statik {
            state.add_token("static");
            state.add_space(statik);
        }
        state.add_token("{");
        for stmt in &self.statements {
            stmt.element.codegen(state);
            state.add_space(&stmt.after);
            if needs_semicolon(&stmt.element) {
                state.add_token(";");
            }
        }
        state.add_space(&self.end);
        state.add_token("}");
    }
}

impl Codegen for MethodDecl {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        modifiers(&self.modifiers, state);
        if let Some(ret) = &self.return_type {
            ret.codegen(state);
        }
        self.name.codegen(state);
        delimited(&self.params, "(", ")", state);
        if let Some(body) = &self.body {
            body.codegen(state);
        }
    }
}

impl Codegen for VariableDecls {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        modifiers(&self.modifiers, state);
        self.type_expr.codegen(state);
        for (i, var) in self.vars.iter().enumerate() {
            if i > 0 {
                state.add_token(",");
            }
            var.element.codegen(state);
            state.add_space(&var.after);
        }
    }
}

impl Codegen for NamedVariable {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        self.name.codegen(state);
        if let Some(init) = &self.initializer {
            state.add_space(&init.before);
            state.add_token("=");
            init.element.codegen(state);
        }
    }
}

impl Codegen for Return {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("return");
        if let Some(expr) = &self.expr {
            expr.codegen(state);
        }
    }
}

impl Codegen for Identifier {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token(&self.name);
    }
}

impl Codegen for FieldAccess {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        self.target.codegen(state);
        state.add_space(&self.name.before);
        state.add_token(".");
        self.name.element.codegen(state);
    }
}

impl Codegen for MethodInvocation {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        if let Some(select) = &self.select {
            select.element.codegen(state);
            state.add_space(&select.after);
            state.add_token(".");
        }
        self.name.codegen(state);
        delimited(&self.args, "(", ")", state);
    }
}

impl Codegen for NewClass {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("new");
        self.clazz.codegen(state);
        delimited(&self.args, "(", ")", state);
        if let Some(body) = &self.body {
            body.codegen(state);
        }
    }
}

impl Codegen for Assignment {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        self.variable.codegen(state);
        state.add_space(&self.value.before);
        state.add_token("=");
        self.value.element.codegen(state);
    }
}

impl Codegen for Literal {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token(&self.source);
    }
}

impl Codegen for Binary {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        self.left.codegen(state);
        state.add_space(&self.operator.before);
        state.add_token(self.operator.element.as_str());
        self.right.codegen(state);
    }
}

impl Codegen for Parentheses {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("(");
        self.tree.element.codegen(state);
        state.add_space(&self.tree.after);
        state.add_token(")");
    }
}

impl Codegen for ParameterizedType {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        self.clazz.codegen(state);
        delimited(&self.type_args, "<", ">", state);
    }
}

impl Codegen for Primitive {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token(self.kind.keyword());
    }
}

impl Codegen for ArrayType {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        self.element.codegen(state);
        state.add_space(&self.dimension.before);
        state.add_token("[");
        state.add_space(&self.dimension.element);
        state.add_token("]");
    }
}

impl Codegen for Empty {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    #[test]
    fn prints_built_nodes() {
        let target = J::from(Identifier::build(Space::EMPTY, "x"));
        let fa = FieldAccess::build(
            target,
            Space::EMPTY,
            Arc::new(Identifier::build(Space::EMPTY, "count")),
        );
        let assign = Assignment::build(
            Space::newline("    "),
            J::from(fa),
            J::from(Identifier::build(Space::EMPTY, "y")),
            None,
        );
        assert_eq!(print(&J::from(assign)), "\n    x.count = y");
    }

    #[test]
    fn semicolons_follow_statements_not_blocks() {
        let empty = Block::build(Space::EMPTY, vec![], Space::EMPTY);
        assert!(!needs_semicolon(&J::from(empty)));
        assert!(needs_semicolon(&J::primitive(Space::EMPTY, PrimitiveKind::Int)));
    }

    #[test]
    fn static_block() {
        let mut block = Block::build(Space::newline("  "), vec![], Space::newline("  "));
        block.statik = Some(Space::single());
        assert_eq!(print(&J::from(block)), "\n  static {\n  }");
    }
}
