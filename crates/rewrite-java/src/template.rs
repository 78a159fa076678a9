// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Code templates: source fragments compiled in the scope they are spliced
//! into.
//!
//! A template is a snippet of source with `#{}` placeholders. Applying it at
//! a position in a tree:
//!
//! 1. captures the scope at that position from the cursor: package, imports,
//!    enclosing classes (declared or anonymous) and the locals and
//!    parameters visible there;
//! 2. renders a stand-in unit in which a synthetic class extends each
//!    enclosing class and a synthetic method declares the visible locals
//!    plus one parameter per placeholder, with the snippet as its body;
//! 3. parses and attributes that unit against the classpath and the
//!    template's stub declarations;
//! 4. cuts the snippet back out, replaces the placeholder parameters with
//!    the bound trees and splices the result at the requested coordinates.
//!
//! A snippet that does not parse or refers to names that do not resolve
//! fails with a [`TemplateError`]; the host tree is never partially edited.
//!
//! Placeholders are `#{}` (typed after the bound tree) or `#{any(Type)}`.
//! They stand for expressions only.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use rewrite_core::{NodeId, RewriteError};
use thiserror::Error;
use tracing::trace;

use crate::attribution::{attribute, declare_types};
use crate::format::shift_statements;
use crate::parser::{parse_compilation_unit, parse_expression, ParseError};
use crate::tree::*;
use crate::types::{ClassType, Classpath, JavaType, PrimitiveKind};
use crate::visitor::{visit, JavaVisitor, VisitCtx};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\{(?:any\(([^)]*)\))?\}").unwrap());

const OBJECT: &str = "java.lang.Object";
const TEMPLATE_METHOD: &str = "__template_method__";
const TEMPLATE_EXPR: &str = "__template_expr__";
const TEMPLATE_ARGS: &str = "__template_args__";

fn placeholder_name(index: usize) -> String {
    format!("__p{}__", index)
}

fn placeholder_index(name: &str) -> Option<usize> {
    name.strip_prefix("__p")?.strip_suffix("__")?.parse().ok()
}

/// Why a template could not be applied at one position.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template has {expected} placeholders but {actual} trees were bound")]
    ParameterCount { expected: usize, actual: usize },

    #[error("template does not parse: {0}")]
    Parse(#[source] ParseError),

    #[error("template stub does not parse: {0}")]
    Stub(#[source] ParseError),

    #[error("template refers to unresolved names: {}", names.join(", "))]
    Unresolved { names: Vec<String> },

    #[error("cannot splice here: {0}")]
    Coordinates(String),

    #[error("template does not produce {0}")]
    Shape(&'static str),
}

impl From<TemplateError> for RewriteError {
    fn from(err: TemplateError) -> Self {
        RewriteError::apply(err.to_string())
    }
}

/// Where a template's result goes.
#[derive(Debug, Clone, Copy)]
pub enum Coordinates<'a> {
    /// Replace an expression (or, for statement templates, one statement).
    /// The result takes over the replaced tree's prefix.
    Replace(&'a J),
    /// Insert statements into `block` before the statement `anchor`.
    Before {
        block: &'a Arc<Block>,
        anchor: NodeId,
    },
    /// Insert statements into `block` after the statement `anchor`.
    After {
        block: &'a Arc<Block>,
        anchor: NodeId,
    },
    /// Replace the body of a method, returning the method.
    ReplaceBody(&'a Arc<MethodDecl>),
    /// Replace the arguments of an invocation or construction; the snippet
    /// is the argument list without parentheses.
    ReplaceArguments(&'a J),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Statements,
    Expression,
}

/// The synthetic method body a template compiles in.
#[derive(Debug)]
enum Body {
    Statements,
    /// Initializer of a local of the given type.
    Expression(String),
    /// Arguments of a call taking the given number of arguments.
    Arguments(usize),
}

/// Builds a [`JavaTemplate`].
#[derive(Debug, Clone)]
pub struct JavaTemplateBuilder {
    code: String,
    imports: Vec<String>,
    static_imports: Vec<String>,
    stubs: Vec<String>,
    shape: Shape,
}

impl JavaTemplateBuilder {
    /// Types the snippet refers to by simple name. They are imported into
    /// the host unit when the spliced code uses them.
    pub fn imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }

    /// Static members (`Type.member`) the snippet refers to unqualified.
    pub fn static_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_imports
            .extend(imports.into_iter().map(Into::into));
        self
    }

    /// Declarations the snippet needs that the classpath lacks.
    pub fn depends_on(mut self, stub: &str) -> Self {
        self.stubs.push(stub.to_string());
        self
    }

    /// The snippet is a single expression.
    pub fn expression(mut self) -> Self {
        self.shape = Shape::Expression;
        self
    }

    /// The snippet is a sequence of statements (the default).
    pub fn statements(mut self) -> Self {
        self.shape = Shape::Statements;
        self
    }

    pub fn build(self) -> JavaTemplate {
        let mut placeholders = Vec::new();
        let code = PLACEHOLDER
            .replace_all(&self.code, |caps: &Captures<'_>| {
                let declared = caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|t| !t.is_empty());
                placeholders.push(declared);
                placeholder_name(placeholders.len() - 1)
            })
            .into_owned();
        JavaTemplate {
            code,
            placeholders,
            imports: self.imports,
            static_imports: self.static_imports,
            stubs: self.stubs,
            shape: self.shape,
        }
    }
}

/// A compiled snippet of source with positional placeholders.
///
/// ```
/// use rewrite_java::template::JavaTemplate;
///
/// let template = JavaTemplate::builder("#{}.isEmpty()").expression().build();
/// assert_eq!(template.parameter_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct JavaTemplate {
    code: String,
    /// Declared type of each placeholder, if written as `#{any(Type)}`.
    placeholders: Vec<Option<String>>,
    imports: Vec<String>,
    static_imports: Vec<String>,
    stubs: Vec<String>,
    shape: Shape,
}

impl JavaTemplate {
    pub fn builder(code: &str) -> JavaTemplateBuilder {
        JavaTemplateBuilder {
            code: code.to_string(),
            imports: Vec::new(),
            static_imports: Vec::new(),
            stubs: Vec::new(),
            shape: Shape::Statements,
        }
    }

    /// The snippet with placeholders replaced by parameter names.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn parameter_count(&self) -> usize {
        self.placeholders.len()
    }

    /// Apply the template at `coordinates`, binding `params` to the
    /// placeholders in order.
    ///
    /// The scope is taken from `cx.cursor`, which must be positioned at or
    /// below the coordinates' enclosing statement. Imports the template
    /// declares are requested on `cx` when the splice succeeds.
    pub fn apply(
        &self,
        cx: &mut VisitCtx,
        coordinates: Coordinates<'_>,
        params: &[J],
    ) -> Result<J, TemplateError> {
        if params.len() != self.placeholders.len() {
            return Err(TemplateError::ParameterCount {
                expected: self.placeholders.len(),
                actual: params.len(),
            });
        }

        let scope = Scope::capture(cx, &coordinates);
        let body = match (&coordinates, self.shape) {
            (Coordinates::ReplaceArguments(_), _) => Body::Arguments(self.argument_count()?),
            (Coordinates::Replace(_), Shape::Expression) => Body::Expression(
                scope
                    .expected
                    .as_ref()
                    .map(type_source)
                    .unwrap_or_else(|| OBJECT.to_string()),
            ),
            (_, Shape::Expression) => {
                return Err(TemplateError::Coordinates(
                    "an expression template can only replace a tree".to_string(),
                ))
            }
            (_, Shape::Statements) => Body::Statements,
        };

        let source = self.synthesize(&scope, &body, params);
        trace!(%source, "synthesized template source");
        let unit = parse_compilation_unit(&source).map_err(TemplateError::Parse)?;
        let classpath = self.classpath(cx.classpath(), &scope)?;
        let attributed = attribute(&unit, &classpath);
        if !attributed.unresolved.is_empty() {
            return Err(TemplateError::Unresolved {
                names: attributed.unresolved,
            });
        }
        let method = find_template_method(&attributed.unit.classes)
            .ok_or(TemplateError::Shape("a template method"))?;
        let generated = method
            .body
            .as_ref()
            .ok_or(TemplateError::Shape("a method body"))?;

        let mut nested = cx.detached();
        let mut substitute = Substitute { params };
        let statements: Vec<Trailing<J>> = generated
            .statements
            .iter()
            .map(|s| {
                Trailing::new(
                    visit(&mut substitute, &s.element, &mut nested),
                    s.after.clone(),
                )
            })
            .collect();

        let spliced = splice(coordinates, &body, statements)?;
        for import in &self.imports {
            cx.maybe_add_import(import);
        }
        for import in &self.static_imports {
            if let Some((type_name, member)) = import.rsplit_once('.') {
                cx.maybe_add_static_import(type_name, member);
            }
        }
        Ok(spliced)
    }

    /// Apply the template, or record the failure on the execution context
    /// and return `original` unchanged.
    pub fn apply_or_keep(
        &self,
        cx: &mut VisitCtx,
        coordinates: Coordinates<'_>,
        params: &[J],
        original: &J,
    ) -> J {
        match self.apply(cx, coordinates, params) {
            Ok(tree) => tree,
            Err(err) => {
                cx.exec.record_failure(original.id(), err);
                original.clone()
            }
        }
    }

    fn argument_count(&self) -> Result<usize, TemplateError> {
        let call = parse_expression(&format!("{}({})", TEMPLATE_ARGS, self.code))
            .map_err(TemplateError::Parse)?;
        Ok(call
            .as_method_invocation()
            .map_or(0, |mi| mi.arguments().count()))
    }

    fn classpath(&self, base: &Classpath, scope: &Scope) -> Result<Classpath, TemplateError> {
        let classpath = base.with_classes(scope.anonymous.iter().cloned());
        if self.stubs.is_empty() {
            return Ok(classpath);
        }
        let units = self
            .stubs
            .iter()
            .map(|s| parse_compilation_unit(s))
            .collect::<Result<Vec<_>, _>>()
            .map_err(TemplateError::Stub)?;
        let refs: Vec<&CompilationUnit> = units.iter().collect();
        let declared = declare_types(&refs, &classpath);
        Ok(classpath.with_classes(declared.into_iter().map(Arc::new)))
    }

    fn synthesize(&self, scope: &Scope, body: &Body, params: &[J]) -> String {
        let mut lines = Vec::new();
        if let Some(package) = &scope.package {
            lines.push(format!("package {};", package));
        }
        lines.extend(scope.imports.iter().cloned());
        lines.extend(self.imports.iter().map(|i| format!("import {};", i)));
        lines.extend(
            self.static_imports
                .iter()
                .map(|i| format!("import static {};", i)),
        );

        if scope.classes.is_empty() {
            lines.push("class __Template0__ {".to_string());
        }
        for (level, class) in scope.classes.iter().rev().enumerate() {
            lines.push(format!(
                "class __Template{}__ extends {} {{",
                level,
                type_source(class)
            ));
        }

        let mut parameters: Vec<String> = scope
            .locals
            .iter()
            .map(|(ty, name)| format!("{} {}", ty, name))
            .collect();
        parameters.extend(self.placeholders.iter().zip(params).enumerate().map(
            |(index, (declared, bound))| {
                let ty = declared.clone().unwrap_or_else(|| {
                    bound
                        .ty()
                        .map(|t| type_source(&t))
                        .unwrap_or_else(|| OBJECT.to_string())
                });
                format!("{} {}", ty, placeholder_name(index))
            },
        ));
        lines.push(format!("void {}({}) {{", TEMPLATE_METHOD, parameters.join(", ")));
        match body {
            Body::Statements => lines.push(self.code.clone()),
            Body::Expression(expected) => {
                lines.push(format!("{} {} = {};", expected, TEMPLATE_EXPR, self.code))
            }
            Body::Arguments(_) => lines.push(format!("{}({});", TEMPLATE_ARGS, self.code)),
        }
        lines.push("}".to_string());
        if let Body::Arguments(arity) = body {
            let parameters: Vec<String> = (0..*arity)
                .map(|i| format!("{} __a{}__", OBJECT, i))
                .collect();
            lines.push(format!("void {}({}) {{ }}", TEMPLATE_ARGS, parameters.join(", ")));
        }
        for _ in 0..scope.classes.len().max(1) {
            lines.push("}".to_string());
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Source text naming `ty` wherever a declaration needs a type.
///
/// Type variables have no name outside their declaration and widen to
/// `Object`.
pub(crate) fn type_source(ty: &JavaType) -> String {
    match ty {
        JavaType::Class(c) => c.fqn.to_string(),
        JavaType::ShallowClass(fqn) | JavaType::Cyclic(fqn) => fqn.to_string(),
        JavaType::Parameterized(p) if p.type_args.is_empty() => type_source(&p.base),
        JavaType::Parameterized(p) => {
            let args: Vec<String> = p.type_args.iter().map(type_source).collect();
            format!("{}<{}>", type_source(&p.base), args.join(", "))
        }
        JavaType::Array(element) => format!("{}[]", type_source(element)),
        JavaType::Primitive(PrimitiveKind::Null) | JavaType::Primitive(PrimitiveKind::Void) => {
            OBJECT.to_string()
        }
        JavaType::Primitive(kind) => kind.keyword().to_string(),
        JavaType::Method(m) => type_source(&m.return_type),
        JavaType::Variable(v) => type_source(&v.ty),
        JavaType::GenericTypeVariable(_) | JavaType::MultiCatch(_) => OBJECT.to_string(),
    }
}

/// What is visible at the splice position.
#[derive(Debug, Default)]
struct Scope {
    package: Option<String>,
    /// Import declarations of the host unit, as source.
    imports: Vec<String>,
    /// Enclosing classes, innermost first.
    classes: Vec<JavaType>,
    /// Anonymous classes among `classes`.
    anonymous: Vec<Arc<ClassType>>,
    /// `(type, name)` of visible locals and parameters, innermost first.
    locals: Vec<(String, String)>,
    seen: HashSet<String>,
    /// The type the replaced expression must have.
    expected: Option<JavaType>,
}

impl Scope {
    fn capture(cx: &VisitCtx, coordinates: &Coordinates<'_>) -> Scope {
        let path: Vec<&J> = cx.cursor.path().collect();
        let mut scope = Scope::default();
        let origin = match coordinates {
            Coordinates::Replace(target) | Coordinates::ReplaceArguments(target) => {
                scope.expected = expected_type(&path, target);
                target.id()
            }
            Coordinates::Before { block, anchor } => {
                scope.block_locals(block, *anchor, false);
                block.id
            }
            Coordinates::After { block, anchor } => {
                scope.block_locals(block, *anchor, true);
                block.id
            }
            Coordinates::ReplaceBody(method) => {
                scope.parameters(method);
                method.id
            }
        };
        let start = path
            .iter()
            .position(|t| t.id() == origin)
            .map_or(0, |i| i + 1);

        let mut child = origin;
        let mut locals_visible = true;
        for (i, tree) in path.iter().enumerate().skip(start) {
            match tree {
                J::CompilationUnit(unit) => {
                    scope.package = unit.package_name();
                    scope.imports = unit.imports().map(|i| import_source(i)).collect();
                }
                J::ClassDecl(class) => {
                    scope.classes.push(
                        class
                            .ty
                            .clone()
                            .unwrap_or_else(|| JavaType::shallow(class.simple_name())),
                    );
                    locals_visible = false;
                }
                J::NewClass(nc) if nc.body.as_ref().is_some_and(|b| b.id == child) => {
                    if let Some(JavaType::Class(anonymous)) = &nc.ty {
                        scope.classes.push(JavaType::Class(anonymous.clone()));
                        scope.anonymous.push(anonymous.clone());
                    }
                }
                J::Block(block) if locals_visible && !is_class_body(block, path.get(i + 1)) => {
                    scope.block_locals(block, child, false);
                }
                J::MethodDecl(method) if locals_visible => scope.parameters(method),
                _ => {}
            }
            child = tree.id();
        }
        scope
    }

    fn block_locals(&mut self, block: &Block, child: NodeId, inclusive: bool) {
        for statement in block.statements() {
            let at_child = statement.id() == child;
            if at_child && !inclusive {
                break;
            }
            if let J::VariableDecls(decls) = statement {
                self.declare(decls);
            }
            if at_child {
                break;
            }
        }
    }

    fn parameters(&mut self, method: &MethodDecl) {
        for param in method.parameters() {
            self.declare(param);
        }
    }

    fn declare(&mut self, decls: &VariableDecls) {
        for var in decls.variables() {
            let name = var.simple_name().to_string();
            if placeholder_index(&name).is_some() || !self.seen.insert(name.clone()) {
                continue;
            }
            let ty = var
                .var_type
                .as_ref()
                .map(|v| type_source(&v.ty))
                .unwrap_or_else(|| decls.type_expr.print().trim().to_string());
            self.locals.push((ty, name));
        }
    }
}

fn is_class_body(block: &Block, parent: Option<&&J>) -> bool {
    match parent {
        Some(J::ClassDecl(c)) => c.body.id == block.id,
        Some(J::NewClass(nc)) => nc.body.as_ref().is_some_and(|b| b.id == block.id),
        _ => false,
    }
}

fn import_source(import: &Import) -> String {
    if import.is_static() {
        format!("import static {};", import.qualified_name())
    } else {
        format!("import {};", import.qualified_name())
    }
}

/// The type a tree replacing `target` must have: the declared type of the
/// variable it initializes or is assigned to, else the target's own type.
fn expected_type(path: &[&J], target: &J) -> Option<JavaType> {
    let parent = match path.iter().position(|t| t.id() == target.id()) {
        Some(i) => path.get(i + 1),
        None => path.first(),
    };
    let declared = parent.and_then(|p| match p {
        J::NamedVariable(v)
            if v
                .initializer
                .as_ref()
                .is_some_and(|init| init.element.id() == target.id()) =>
        {
            v.var_type.as_ref().map(|t| t.ty.clone())
        }
        J::Assignment(a) if a.value.element.id() == target.id() => a.variable.ty(),
        _ => None,
    });
    declared.or_else(|| match target {
        J::NewClass(nc) if nc.body.is_some() => nc.clazz_type(),
        other => other.ty(),
    })
}

fn find_template_method(classes: &[Arc<ClassDecl>]) -> Option<Arc<MethodDecl>> {
    classes.iter().find_map(|class| {
        class.body.statements().find_map(|member| match member {
            J::MethodDecl(m) if m.simple_name() == TEMPLATE_METHOD => Some(m.clone()),
            J::ClassDecl(inner) => find_template_method(std::slice::from_ref(inner)),
            _ => None,
        })
    })
}

/// Replaces placeholder parameters with the bound trees.
struct Substitute<'a> {
    params: &'a [J],
}

impl JavaVisitor for Substitute<'_> {
    fn visit_identifier(&mut self, node: &Arc<Identifier>, _cx: &mut VisitCtx) -> J {
        match placeholder_index(&node.name).and_then(|i| self.params.get(i)) {
            Some(bound) => bound.with_prefix(node.prefix.clone()),
            None => J::Identifier(node.clone()),
        }
    }
}

fn splice(
    coordinates: Coordinates<'_>,
    body: &Body,
    statements: Vec<Trailing<J>>,
) -> Result<J, TemplateError> {
    match coordinates {
        Coordinates::Replace(target) => {
            let tree = match body {
                Body::Expression(_) => statements
                    .first()
                    .and_then(|s| s.element.as_variable_decls())
                    .and_then(|d| d.variables().next())
                    .and_then(|v| v.initializer.as_ref())
                    .map(|init| init.element.clone())
                    .ok_or(TemplateError::Shape("an expression"))?,
                _ => match statements.as_slice() {
                    [only] => only.element.clone(),
                    _ => return Err(TemplateError::Shape("exactly one statement")),
                },
            };
            Ok(tree.with_prefix(target.prefix().clone()))
        }
        Coordinates::Before { block, anchor } => insert(block, anchor, 0, &statements),
        Coordinates::After { block, anchor } => insert(block, anchor, 1, &statements),
        Coordinates::ReplaceBody(method) => {
            let indent = method.prefix.indent().unwrap_or("");
            let nested = format!("{}    ", indent);
            let (prefix, end, inner) = match &method.body {
                Some(old) => (
                    old.prefix.clone(),
                    if old.end.has_newline() {
                        old.end.clone()
                    } else {
                        Space::newline(indent)
                    },
                    old.statements
                        .first()
                        .and_then(|s| s.element.prefix().indent())
                        .unwrap_or(nested.as_str())
                        .to_string(),
                ),
                None => (Space::single(), Space::newline(indent), nested.clone()),
            };
            let statements = shift_statements(&statements, "", &inner);
            let new_body = Block::build(prefix, statements, end);
            Ok(J::from(MethodDecl {
                body: Some(Arc::new(new_body)),
                ..(**method).clone()
            }))
        }
        Coordinates::ReplaceArguments(target) => {
            let args = statements
                .first()
                .and_then(|s| s.element.as_method_invocation())
                .map(|call| call.args.elements.clone())
                .ok_or(TemplateError::Shape("an argument list"))?;
            match target {
                J::MethodInvocation(mi) => Ok(J::from(MethodInvocation {
                    args: mi.args.with_elements(args),
                    ..(**mi).clone()
                })),
                J::NewClass(nc) => Ok(J::from(NewClass {
                    args: nc.args.with_elements(args),
                    ..(**nc).clone()
                })),
                other => Err(TemplateError::Coordinates(format!(
                    "a {:?} has no arguments",
                    other.kind()
                ))),
            }
        }
    }
}

/// Insert statements next to `anchor`, indented like it.
fn insert(
    block: &Arc<Block>,
    anchor: NodeId,
    offset: usize,
    statements: &[Trailing<J>],
) -> Result<J, TemplateError> {
    let index = block
        .statements
        .iter()
        .position(|s| s.element.id() == anchor)
        .ok_or_else(|| {
            TemplateError::Coordinates(format!(
                "node {} is not a statement of block {}",
                anchor, block.id
            ))
        })?;
    let indent = block.statements[index]
        .element
        .prefix()
        .indent()
        .unwrap_or("")
        .to_string();
    let mut all = block.statements.clone();
    let tail = all.split_off(index + offset);
    all.extend(shift_statements(statements, "", &indent));
    all.extend(tail);
    Ok(J::from(block.with_statements(all)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JavaParser;
    use crate::visitor::{visit_unit, walk_block, ExecutionContext};

    #[test]
    fn placeholders_become_parameters() {
        let template = JavaTemplate::builder("#{} + #{any(int)}").expression().build();
        assert_eq!(template.code(), "__p0__ + __p1__");
        assert_eq!(template.parameter_count(), 2);
        assert_eq!(template.placeholders, vec![None, Some("int".to_string())]);
        assert_eq!(placeholder_index("__p1__"), Some(1));
        assert_eq!(placeholder_index("p1"), None);
    }

    #[test]
    fn type_source_spells_declarable_types() {
        let map = JavaType::parameterized(
            JavaType::shallow("java.util.Map"),
            vec![
                JavaType::shallow("java.lang.String"),
                JavaType::type_variable("V"),
            ],
        );
        assert_eq!(type_source(&map), "java.util.Map<java.lang.String, java.lang.Object>");
        assert_eq!(
            type_source(&JavaType::array_of(JavaType::Primitive(PrimitiveKind::Int))),
            "int[]"
        );
        assert_eq!(type_source(&JavaType::shallow("a.Outer$Inner")), "a.Outer$Inner");
    }

    fn run(source: &str, visitor: &mut dyn JavaVisitor) -> (String, Vec<String>) {
        let parsed = JavaParser::standard().parse_all(&[source]).unwrap();
        let mut cx = VisitCtx::new(ExecutionContext::new(Arc::new(parsed.classpath)));
        let out = visit_unit(visitor, &parsed.units[0], &mut cx);
        let failures = cx
            .exec
            .failures()
            .iter()
            .map(|f| f.message.clone())
            .collect();
        (J::from(out).print(), failures)
    }

    struct WrapLiterals(JavaTemplate);

    impl JavaVisitor for WrapLiterals {
        fn visit_literal(&mut self, node: &Arc<Literal>, cx: &mut VisitCtx) -> J {
            let tree = J::Literal(node.clone());
            self.0
                .apply_or_keep(cx, Coordinates::Replace(&tree), &[tree.clone()], &tree)
        }
    }

    #[test]
    fn expression_sees_parameters() {
        let template = JavaTemplate::builder("#{} + y").expression().build();
        let (out, failures) = run(
            "class A { int f(int y) { int x = 1; return x; } }",
            &mut WrapLiterals(template),
        );
        assert!(failures.is_empty(), "{:?}", failures);
        assert_eq!(out, "class A { int f(int y) { int x = 1 + y; return x; } }");
    }

    #[test]
    fn unresolved_names_leave_the_node() {
        let template = JavaTemplate::builder("#{} + missing").expression().build();
        let (out, failures) = run(
            "class A { int f() { int x = 1; return x; } }",
            &mut WrapLiterals(template),
        );
        assert_eq!(out, "class A { int f() { int x = 1; return x; } }");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("missing"), "{}", failures[0]);
    }

    struct LogAfterFirst(JavaTemplate);

    impl JavaVisitor for LogAfterFirst {
        fn visit_block(&mut self, node: &Arc<Block>, cx: &mut VisitCtx) -> J {
            let node = walk_block(self, node, cx);
            let found = match node.statements().next() {
                Some(J::VariableDecls(d)) => Some(d.id),
                _ => None,
            };
            let Some(anchor) = found else {
                return J::Block(node);
            };
            let tree = J::Block(node.clone());
            self.0.apply_or_keep(
                cx,
                Coordinates::After {
                    block: &node,
                    anchor,
                },
                &[],
                &tree,
            )
        }
    }

    #[test]
    fn inserted_statements_take_the_anchor_indent() {
        let template = JavaTemplate::builder("System.out.println(x);").build();
        let (out, failures) = run(
            "class A {\n    void f() {\n        int x = 1;\n        x = 2;\n    }\n}",
            &mut LogAfterFirst(template),
        );
        assert!(failures.is_empty(), "{:?}", failures);
        assert_eq!(
            out,
            "class A {\n    void f() {\n        int x = 1;\n        System.out.println(x);\n        x = 2;\n    }\n}"
        );
    }

    #[test]
    fn wrong_parameter_count_is_an_error() {
        let template = JavaTemplate::builder("#{}").expression().build();
        let parsed = JavaParser::standard().parse("class A { int x = 1; }").unwrap();
        let mut cx = VisitCtx::new(ExecutionContext::new(Arc::new(Classpath::standard())));
        let target = J::from(parsed);
        let err = template
            .apply(&mut cx, Coordinates::Replace(&target), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::ParameterCount {
                expected: 1,
                actual: 0
            }
        ));
    }
}
