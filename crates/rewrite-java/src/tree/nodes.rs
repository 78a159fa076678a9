// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node structs.
//!
//! Every struct carries `id`, `prefix` and `markers` followed by its
//! kind-specific children. Fields are public for reading; derive new nodes
//! with the `with_*` methods or struct update syntax.

use std::fmt;
use std::sync::Arc;

use rewrite_core::{Markers, NodeId};

use super::{qualified_name, Delimited, Leading, Space, Trailing, J};
use crate::types::{ClassKind, ClassType, JavaType, MethodType, PrimitiveKind, VariableType};

// ============================================================================
// Compilation unit and imports
// ============================================================================

#[derive(Clone, Debug)]
pub struct CompilationUnit {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: Option<Arc<str>>,
    pub package: Option<Trailing<Arc<Package>>>,
    pub imports: Vec<Trailing<Arc<Import>>>,
    pub classes: Vec<Arc<ClassDecl>>,
    pub eof: Space,
}

impl CompilationUnit {
    /// The declared package, e.g. `com.example`.
    pub fn package_name(&self) -> Option<String> {
        self.package
            .as_ref()
            .and_then(|p| qualified_name(&p.element.name))
    }

    pub fn imports(&self) -> impl Iterator<Item = &Arc<Import>> {
        self.imports.iter().map(|i| &i.element)
    }

    pub fn with_imports(&self, imports: Vec<Trailing<Arc<Import>>>) -> CompilationUnit {
        CompilationUnit {
            imports,
            ..self.clone()
        }
    }

    pub fn with_classes(&self, classes: Vec<Arc<ClassDecl>>) -> CompilationUnit {
        CompilationUnit {
            classes,
            ..self.clone()
        }
    }

    pub fn with_source_path(&self, path: &str) -> CompilationUnit {
        CompilationUnit {
            source_path: Some(Arc::from(path)),
            ..self.clone()
        }
    }

    /// The top-level class with the given simple name.
    pub fn class_named(&self, name: &str) -> Option<&Arc<ClassDecl>> {
        self.classes.iter().find(|c| &*c.name.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct Package {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: J,
}

#[derive(Clone, Debug)]
pub struct Import {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Space before the `static` keyword of a static import.
    pub statik: Option<Space>,
    pub qualid: Arc<FieldAccess>,
}

impl Import {
    /// A new import of `name` (a type, or `Type.member` for static imports).
    ///
    /// Returns `None` for an undotted name, which cannot be imported.
    pub fn build(prefix: Space, name: &str, statik: bool) -> Option<Import> {
        let qualid = match FieldAccess::build_qualified(Space::single(), name) {
            J::FieldAccess(fa) => fa,
            _ => return None,
        };
        Some(Import {
            id: NodeId::fresh(),
            prefix,
            markers: Markers::new(),
            statik: statik.then(Space::single),
            qualid,
        })
    }

    pub fn is_static(&self) -> bool {
        self.statik.is_some()
    }

    pub fn is_wildcard(&self) -> bool {
        &*self.qualid.name.element.name == "*"
    }

    /// The full imported name, e.g. `java.util.List` or `java.util.*`.
    pub fn qualified_name(&self) -> String {
        qualified_name(&J::FieldAccess(self.qualid.clone())).unwrap_or_default()
    }

    /// The imported type: the qualified name for a type import, the owning
    /// type for a static import.
    pub fn type_name(&self) -> String {
        if self.is_static() {
            qualified_name(&self.qualid.target).unwrap_or_default()
        } else {
            self.qualified_name()
        }
    }

    /// The package part of a type import (`java.util` for `java.util.List`
    /// and for `java.util.*`).
    pub fn package_name(&self) -> String {
        let name = self.type_name();
        if self.is_wildcard() && !self.is_static() {
            return qualified_name(&self.qualid.target).unwrap_or_default();
        }
        match name.rfind('.') {
            Some(idx) => name[..idx].to_string(),
            None => String::new(),
        }
    }

    /// The imported member of a static import.
    pub fn member_name(&self) -> Option<&str> {
        if self.is_static() {
            Some(&*self.qualid.name.element.name)
        } else {
            None
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKeyword {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Default,
}

impl ModifierKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModifierKeyword::Public => "public",
            ModifierKeyword::Protected => "protected",
            ModifierKeyword::Private => "private",
            ModifierKeyword::Static => "static",
            ModifierKeyword::Final => "final",
            ModifierKeyword::Abstract => "abstract",
            ModifierKeyword::Synchronized => "synchronized",
            ModifierKeyword::Native => "native",
            ModifierKeyword::Transient => "transient",
            ModifierKeyword::Volatile => "volatile",
            ModifierKeyword::Default => "default",
        }
    }
}

impl fmt::Display for ModifierKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declaration modifier with the space before it.
#[derive(Clone, Debug)]
pub struct Modifier {
    pub prefix: Space,
    pub keyword: ModifierKeyword,
}

pub fn has_modifier(modifiers: &[Modifier], keyword: ModifierKeyword) -> bool {
    modifiers.iter().any(|m| m.keyword == keyword)
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub modifiers: Vec<Modifier>,
    /// Space before the `class` / `interface` keyword.
    pub kind_prefix: Space,
    pub kind: ClassKind,
    pub name: Arc<Identifier>,
    pub extends: Option<Leading<J>>,
    /// `implements` list; the `extends` list for interfaces.
    pub implements: Option<Delimited<J>>,
    pub body: Arc<Block>,
    pub ty: Option<JavaType>,
}

impl ClassDecl {
    pub fn simple_name(&self) -> &str {
        &self.name.name
    }

    pub fn has_modifier(&self, keyword: ModifierKeyword) -> bool {
        has_modifier(&self.modifiers, keyword)
    }

    /// The attributed class type.
    pub fn class_type(&self) -> Option<&Arc<ClassType>> {
        match &self.ty {
            Some(JavaType::Class(c)) => Some(c),
            _ => None,
        }
    }

    pub fn with_body(&self, body: Arc<Block>) -> ClassDecl {
        ClassDecl {
            body,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub struct Block {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Space between `static` and `{` of a static initializer.
    pub statik: Option<Space>,
    pub statements: Vec<Trailing<J>>,
    /// Space before the closing brace.
    pub end: Space,
}

impl Block {
    pub fn build(prefix: Space, statements: Vec<Trailing<J>>, end: Space) -> Block {
        Block {
            id: NodeId::fresh(),
            prefix,
            markers: Markers::new(),
            statik: None,
            statements,
            end,
        }
    }

    pub fn is_static(&self) -> bool {
        self.statik.is_some()
    }

    pub fn statements(&self) -> impl Iterator<Item = &J> {
        self.statements.iter().map(|s| &s.element)
    }

    pub fn with_statements(&self, statements: Vec<Trailing<J>>) -> Block {
        Block {
            statements,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub modifiers: Vec<Modifier>,
    /// `None` for constructors.
    pub return_type: Option<J>,
    pub name: Arc<Identifier>,
    pub params: Delimited<J>,
    pub body: Option<Arc<Block>>,
    pub method_type: Option<Arc<MethodType>>,
}

impl MethodDecl {
    pub fn simple_name(&self) -> &str {
        &self.name.name
    }

    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    /// Declared parameters, skipping the empty placeholder.
    pub fn parameters(&self) -> impl Iterator<Item = &Arc<VariableDecls>> {
        self.params.iter().filter_map(|p| p.as_variable_decls())
    }
}

#[derive(Clone, Debug)]
pub struct VariableDecls {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub modifiers: Vec<Modifier>,
    pub type_expr: J,
    pub vars: Vec<Trailing<Arc<NamedVariable>>>,
}

impl VariableDecls {
    pub fn has_modifier(&self, keyword: ModifierKeyword) -> bool {
        has_modifier(&self.modifiers, keyword)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Arc<NamedVariable>> {
        self.vars.iter().map(|v| &v.element)
    }
}

#[derive(Clone, Debug)]
pub struct NamedVariable {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: Arc<Identifier>,
    pub initializer: Option<Leading<J>>,
    pub var_type: Option<Arc<VariableType>>,
}

impl NamedVariable {
    pub fn simple_name(&self) -> &str {
        &self.name.name
    }

    pub fn with_name(&self, name: Arc<Identifier>) -> NamedVariable {
        NamedVariable {
            name,
            ..self.clone()
        }
    }

    pub fn with_initializer(&self, initializer: Option<Leading<J>>) -> NamedVariable {
        NamedVariable {
            initializer,
            ..self.clone()
        }
    }

    /// True if this variable is a field (its owner is a class, not a method).
    pub fn is_field(&self) -> bool {
        matches!(
            self.var_type.as_ref().and_then(|v| v.owner.as_ref()),
            Some(owner) if owner.fully_qualified_name().is_some()
        )
    }
}

// ============================================================================
// Statements and expressions
// ============================================================================

#[derive(Clone, Debug)]
pub struct Return {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expr: Option<J>,
}

#[derive(Clone, Debug)]
pub struct Identifier {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: Arc<str>,
    pub ty: Option<JavaType>,
    /// The variable this identifier refers to, when it names one.
    pub field_type: Option<Arc<VariableType>>,
}

impl Identifier {
    pub fn build(prefix: Space, name: &str) -> Identifier {
        Identifier {
            id: NodeId::fresh(),
            prefix,
            markers: Markers::new(),
            name: Arc::from(name),
            ty: None,
            field_type: None,
        }
    }

    pub fn with_name(&self, name: &str) -> Identifier {
        Identifier {
            name: Arc::from(name),
            ..self.clone()
        }
    }

    pub fn with_type(&self, ty: Option<JavaType>) -> Identifier {
        Identifier { ty, ..self.clone() }
    }

    pub fn with_field_type(&self, field_type: Option<Arc<VariableType>>) -> Identifier {
        Identifier {
            field_type,
            ..self.clone()
        }
    }

    /// A copy with a new id, for reusing a name at a second position.
    pub fn with_fresh_id(&self) -> Identifier {
        Identifier {
            id: NodeId::fresh(),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldAccess {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub target: J,
    /// The `.` (with the space before it) and the accessed name.
    pub name: Leading<Arc<Identifier>>,
    pub ty: Option<JavaType>,
}

impl FieldAccess {
    /// `target.name`, taking over the target's prefix.
    pub fn build(target: J, before_dot: Space, name: Arc<Identifier>) -> FieldAccess {
        let prefix = target.prefix().clone();
        FieldAccess {
            id: NodeId::fresh(),
            prefix,
            markers: Markers::new(),
            target: target.with_prefix(Space::EMPTY),
            name: Leading::new(before_dot, name),
            ty: None,
        }
    }

    /// Identifier / field access chain spelling `dotted`, e.g. `java.util.List`.
    pub fn build_qualified(prefix: Space, dotted: &str) -> J {
        let mut parts = dotted.split('.');
        let first = parts.next().unwrap_or_default();
        let mut tree = J::Identifier(Arc::new(Identifier::build(prefix, first)));
        for part in parts {
            let name = Arc::new(Identifier::build(Space::EMPTY, part));
            tree = J::FieldAccess(Arc::new(FieldAccess::build(tree, Space::EMPTY, name)));
        }
        tree
    }

    pub fn simple_name(&self) -> &str {
        &self.name.element.name
    }

    pub fn with_name(&self, name: Arc<Identifier>) -> FieldAccess {
        FieldAccess {
            name: self.name.with_element(name),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub struct MethodInvocation {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Receiver and the space before the `.`.
    pub select: Option<Trailing<J>>,
    pub name: Arc<Identifier>,
    pub args: Delimited<J>,
    pub method_type: Option<Arc<MethodType>>,
}

impl MethodInvocation {
    pub fn simple_name(&self) -> &str {
        &self.name.name
    }

    /// Arguments, skipping the empty placeholder.
    pub fn arguments(&self) -> impl Iterator<Item = &J> {
        self.args.iter().filter(|a| !a.is_empty())
    }

    /// The invocation with a different receiver.
    ///
    /// A receiver added where there was none takes over the invocation's
    /// prefix position: the invocation keeps its prefix, the receiver gets
    /// an empty one. A replaced receiver keeps the old receiver's prefix.
    pub fn with_select(&self, select: Option<J>) -> MethodInvocation {
        let select = select.map(|s| match &self.select {
            Some(old) => Trailing::new(s.with_prefix(old.element.prefix().clone()), old.after.clone()),
            None => Trailing::bare(s.with_prefix(Space::EMPTY)),
        });
        MethodInvocation {
            select,
            ..self.clone()
        }
    }

    pub fn with_method_type(&self, method_type: Option<Arc<MethodType>>) -> MethodInvocation {
        MethodInvocation {
            method_type,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewClass {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// The constructed type; its prefix is the space after `new`.
    pub clazz: J,
    pub args: Delimited<J>,
    /// Anonymous class body.
    pub body: Option<Arc<Block>>,
    pub ty: Option<JavaType>,
    pub constructor_type: Option<Arc<MethodType>>,
}

impl NewClass {
    pub fn with_body(&self, body: Option<Arc<Block>>) -> NewClass {
        NewClass {
            body,
            ..self.clone()
        }
    }

    /// The type named by `clazz`: the supertype for anonymous classes.
    pub fn clazz_type(&self) -> Option<JavaType> {
        self.clazz.ty()
    }
}

#[derive(Clone, Debug)]
pub struct Assignment {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub variable: J,
    /// The `=` (with the space before it) and the assigned value.
    pub value: Leading<J>,
    pub ty: Option<JavaType>,
}

impl Assignment {
    /// `variable = value` with single spaces around `=`.
    pub fn build(prefix: Space, variable: J, value: J, ty: Option<JavaType>) -> Assignment {
        Assignment {
            id: NodeId::fresh(),
            prefix,
            markers: Markers::new(),
            variable: variable.with_prefix(Space::EMPTY),
            value: Leading::new(Space::single(), value.with_prefix(Space::single())),
            ty,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Literal {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// The literal exactly as written.
    pub source: Arc<str>,
    pub ty: Option<JavaType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::Addition => "+",
            BinaryOp::Subtraction => "-",
            BinaryOp::Multiplication => "*",
            BinaryOp::Division => "/",
            BinaryOp::Modulo => "%",
        }
    }

    /// Operators whose result is a boolean.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            BinaryOp::Or
                | BinaryOp::And
                | BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterOrEqual
        )
    }
}

#[derive(Clone, Debug)]
pub struct Binary {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub left: J,
    pub operator: Leading<BinaryOp>,
    pub right: J,
    pub ty: Option<JavaType>,
}

#[derive(Clone, Debug)]
pub struct Parentheses {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub tree: Trailing<J>,
}

// ============================================================================
// Type trees
// ============================================================================

#[derive(Clone, Debug)]
pub struct ParameterizedType {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub clazz: J,
    /// Type arguments; a diamond holds a single `Empty`.
    pub type_args: Delimited<J>,
    pub ty: Option<JavaType>,
}

impl ParameterizedType {
    pub fn is_diamond(&self) -> bool {
        self.type_args.elements.len() == 1 && self.type_args.elements[0].element.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Primitive {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub kind: PrimitiveKind,
}

#[derive(Clone, Debug)]
pub struct ArrayType {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub element: J,
    /// Space before `[` and the space inside the brackets.
    pub dimension: Leading<Space>,
}

/// A placeholder: empty argument lists, diamonds, stray semicolons.
#[derive(Clone, Debug)]
pub struct Empty {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
}
