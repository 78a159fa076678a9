// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type attribution.
//!
//! Attribution runs in two phases. The declare phase builds a [`ClassType`]
//! for every class declared in a set of units; references to other classes
//! are [`JavaType::ShallowClass`] and references to the class being
//! declared are [`JavaType::Cyclic`], so the result contains no cycles. The
//! attribute phase rebuilds a unit with types on every identifier,
//! expression, declaration and type tree, resolving names against the
//! classpath.
//!
//! Names are resolved the way the compiler does for this subset: locals,
//! then fields of the enclosing classes (innermost first, including
//! inherited ones), then static imports, then types (nested, single-type
//! imports, same package, `java.lang`, wildcard imports).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::tree::*;
use crate::types::type_utils::{find_field, find_method};
use crate::types::{
    simple_name, ClassKind, ClassType, Classpath, Flags, JavaType, MethodType, PrimitiveKind,
    VariableType,
};

/// An attributed unit and the names that could not be resolved.
#[derive(Debug)]
pub struct Attribution {
    pub unit: CompilationUnit,
    pub unresolved: Vec<String>,
}

const CONSTRUCTOR: &str = "<constructor>";

// ============================================================================
// Name resolution
// ============================================================================

struct Names<'a> {
    package: Option<String>,
    /// Simple name to fully qualified name, for single-type imports.
    single: HashMap<String, String>,
    wildcards: Vec<String>,
    /// `(type, member)` for static imports; member `*` imports all.
    statics: Vec<(String, String)>,
    classpath: &'a Classpath,
    known: &'a HashSet<String>,
}

impl<'a> Names<'a> {
    fn new(unit: &CompilationUnit, classpath: &'a Classpath, known: &'a HashSet<String>) -> Self {
        let mut names = Names {
            package: unit.package_name(),
            single: HashMap::new(),
            wildcards: Vec::new(),
            statics: Vec::new(),
            classpath,
            known,
        };
        for import in unit.imports() {
            if import.is_static() {
                if let Some(member) = import.member_name() {
                    names.statics.push((import.type_name(), member.to_string()));
                }
            } else if import.is_wildcard() {
                names.wildcards.push(import.package_name());
            } else {
                let fqn = import.qualified_name();
                names.single.insert(simple_name(&fqn).to_string(), fqn);
            }
        }
        names
    }

    fn exists(&self, fqn: &str) -> bool {
        self.known.contains(fqn) || self.classpath.contains(fqn)
    }

    /// The fully qualified name a (possibly dotted) type name refers to.
    fn resolve(&self, name: &str, enclosing: &[String]) -> Option<String> {
        if let Some((head, rest)) = name.split_once('.') {
            if self.exists(name) {
                return Some(name.to_string());
            }
            let outer = self.resolve(head, enclosing)?;
            let nested = format!("{}${}", outer, rest.replace('.', "$"));
            return self.exists(&nested).then_some(nested);
        }
        for outer in enclosing.iter().rev() {
            let nested = format!("{}${}", outer, name);
            if self.exists(&nested) {
                return Some(nested);
            }
            if simple_name(outer) == name {
                return Some(outer.clone());
            }
        }
        if let Some(fqn) = self.single.get(name) {
            return self.exists(fqn).then(|| fqn.clone());
        }
        let same_package = match &self.package {
            Some(p) => format!("{}.{}", p, name),
            None => name.to_string(),
        };
        if self.exists(&same_package) {
            return Some(same_package);
        }
        let lang = format!("java.lang.{}", name);
        if self.exists(&lang) {
            return Some(lang);
        }
        self.wildcards
            .iter()
            .map(|pkg| format!("{}.{}", pkg, name))
            .find(|fqn| self.exists(fqn))
    }

    fn top_level_fqn(&self, simple: &str) -> String {
        match &self.package {
            Some(p) => format!("{}.{}", p, simple),
            None => simple.to_string(),
        }
    }
}

/// Shallow type of a type tree; the written name if it does not resolve.
fn declared_type(tree: &J, names: &Names<'_>, enclosing: &[String]) -> JavaType {
    shallow_type(tree, names, enclosing).unwrap_or_else(|| match qualified_name(tree) {
        Some(name) => JavaType::shallow(&name),
        None => JavaType::shallow("java.lang.Object"),
    })
}

fn shallow_type(tree: &J, names: &Names<'_>, enclosing: &[String]) -> Option<JavaType> {
    match tree {
        J::Primitive(p) => Some(JavaType::Primitive(p.kind)),
        J::Identifier(_) | J::FieldAccess(_) => {
            let fqn = names.resolve(&qualified_name(tree)?, enclosing)?;
            Some(JavaType::shallow(&fqn))
        }
        J::ParameterizedType(pt) => {
            let base = shallow_type(&pt.clazz, names, enclosing)?;
            let args = if pt.is_diamond() {
                Vec::new()
            } else {
                pt.type_args
                    .iter()
                    .map(|a| shallow_type(a, names, enclosing))
                    .collect::<Option<Vec<_>>>()?
            };
            Some(JavaType::parameterized(base, args))
        }
        J::ArrayType(a) => shallow_type(&a.element, names, enclosing).map(JavaType::array_of),
        _ => None,
    }
}

/// Replace references to `fqn` with a cyclic marker.
fn cyclic_self(ty: JavaType, fqn: &str) -> JavaType {
    match &ty {
        JavaType::ShallowClass(name) if &**name == fqn => JavaType::cyclic(fqn),
        JavaType::Parameterized(p) => JavaType::parameterized(
            cyclic_self(p.base.clone(), fqn),
            p.type_args.iter().map(|a| cyclic_self(a.clone(), fqn)).collect(),
        ),
        JavaType::Array(e) => JavaType::array_of(cyclic_self((**e).clone(), fqn)),
        _ => ty,
    }
}

fn flags_of(modifiers: &[Modifier]) -> Flags {
    modifiers.iter().fold(Flags::NONE, |flags, m| {
        flags
            | match m.keyword {
                ModifierKeyword::Public => Flags::PUBLIC,
                ModifierKeyword::Private => Flags::PRIVATE,
                ModifierKeyword::Protected => Flags::PROTECTED,
                ModifierKeyword::Static => Flags::STATIC,
                ModifierKeyword::Final => Flags::FINAL,
                ModifierKeyword::Abstract => Flags::ABSTRACT,
                _ => Flags::NONE,
            }
    })
}

// ============================================================================
// Declare phase
// ============================================================================

/// Class types for every class declared in `units`.
///
/// Units may refer to each other's classes.
pub fn declare_types(units: &[&CompilationUnit], classpath: &Classpath) -> Vec<ClassType> {
    let mut known = HashSet::new();
    for unit in units {
        let package = unit.package_name();
        for class in &unit.classes {
            let fqn = match &package {
                Some(p) => format!("{}.{}", p, class.simple_name()),
                None => class.simple_name().to_string(),
            };
            collect_fqns(class, fqn, &mut known);
        }
    }

    let mut out = Vec::new();
    for unit in units {
        let names = Names::new(unit, classpath, &known);
        let mut enclosing = Vec::new();
        for class in &unit.classes {
            let fqn = names.top_level_fqn(class.simple_name());
            declare_class(class, fqn, None, &names, &mut enclosing, &mut out);
        }
    }
    out
}

fn collect_fqns(class: &ClassDecl, fqn: String, known: &mut HashSet<String>) {
    for nested in class.body.statements().filter_map(|s| s.as_class_decl()) {
        collect_fqns(nested, format!("{}${}", fqn, nested.simple_name()), known);
    }
    known.insert(fqn);
}

fn declare_class(
    class: &ClassDecl,
    fqn: String,
    owner: Option<&str>,
    names: &Names<'_>,
    enclosing: &mut Vec<String>,
    out: &mut Vec<ClassType>,
) {
    enclosing.push(fqn.clone());
    let resolve = |tree: &J, enclosing: &[String]| cyclic_self(declared_type(tree, names, enclosing), &fqn);

    let supertype = match (&class.extends, class.kind) {
        (Some(e), _) => Some(resolve(&e.element, enclosing)),
        (None, ClassKind::Interface) => None,
        (None, _) if fqn == "java.lang.Object" => None,
        (None, _) => Some(JavaType::shallow("java.lang.Object")),
    };
    let interfaces = class
        .implements
        .iter()
        .flat_map(|d| d.iter())
        .map(|t| resolve(t, enclosing))
        .collect();
    let (members, methods) = declare_members(&class.body, &fqn, class.kind, names, enclosing);

    let mut flags = flags_of(&class.modifiers);
    if class.kind == ClassKind::Interface {
        flags = flags | Flags::ABSTRACT;
    }
    out.push(ClassType {
        fqn: Arc::from(fqn.as_str()),
        kind: class.kind,
        flags,
        supertype,
        interfaces,
        members,
        methods,
        owning_class: owner.map(JavaType::shallow),
        type_parameters: Vec::new(),
        annotations: Vec::new(),
    });

    for nested in class.body.statements().filter_map(|s| s.as_class_decl()) {
        let nested_fqn = format!("{}${}", fqn, nested.simple_name());
        declare_class(nested, nested_fqn, Some(&fqn), names, enclosing, out);
    }
    enclosing.pop();
}

type DeclaredMembers = (Vec<Arc<VariableType>>, Vec<Arc<MethodType>>);

fn declare_members(
    body: &Block,
    fqn: &str,
    kind: ClassKind,
    names: &Names<'_>,
    enclosing: &[String],
) -> DeclaredMembers {
    let me = JavaType::cyclic(fqn);
    let resolve = |tree: &J| cyclic_self(declared_type(tree, names, enclosing), fqn);
    let mut members = Vec::new();
    let mut methods = Vec::new();
    for member in body.statements() {
        match member {
            J::VariableDecls(decls) => {
                let ty = resolve(&decls.type_expr);
                let mut flags = flags_of(&decls.modifiers);
                if kind == ClassKind::Interface {
                    flags = flags | Flags::PUBLIC | Flags::STATIC | Flags::FINAL;
                }
                for var in decls.variables() {
                    members.push(Arc::new(VariableType {
                        name: var.name.name.clone(),
                        owner: Some(me.clone()),
                        ty: ty.clone(),
                        flags,
                        annotations: Vec::new(),
                    }));
                }
            }
            J::MethodDecl(m) => {
                let (param_names, param_types): (Vec<_>, Vec<_>) = m
                    .parameters()
                    .filter_map(|p| {
                        let var = p.variables().next()?;
                        Some((var.name.name.clone(), resolve(&p.type_expr)))
                    })
                    .unzip();
                let (name, return_type) = match &m.return_type {
                    Some(rt) => (m.name.name.clone(), resolve(rt)),
                    None => (Arc::from(CONSTRUCTOR), me.clone()),
                };
                let mut flags = flags_of(&m.modifiers);
                if kind == ClassKind::Interface && m.body.is_none() {
                    flags = flags | Flags::PUBLIC | Flags::ABSTRACT;
                }
                methods.push(Arc::new(MethodType {
                    declaring_type: me.clone(),
                    name,
                    flags,
                    return_type,
                    param_names,
                    param_types,
                    thrown: Vec::new(),
                    annotations: Vec::new(),
                }));
            }
            _ => {}
        }
    }
    (members, methods)
}

// ============================================================================
// Attribute phase
// ============================================================================

/// Attribute `unit`.
///
/// The unit's own classes are declared on top of `classpath` first, so the
/// classpath need not contain them.
pub fn attribute(unit: &CompilationUnit, classpath: &Classpath) -> Attribution {
    let declared = declare_types(&[unit], classpath);
    let classpath = classpath.with_classes(declared.into_iter().map(Arc::new));
    let known = HashSet::new();
    let names = Names::new(unit, &classpath, &known);
    let mut attributor = Attributor {
        classpath: &classpath,
        names,
        enclosing: Vec::new(),
        classes: Vec::new(),
        scopes: Vec::new(),
        methods: Vec::new(),
        anonymous: HashMap::new(),
        unresolved: Vec::new(),
    };
    let classes = unit
        .classes
        .iter()
        .map(|c| {
            let fqn = attributor.names.top_level_fqn(c.simple_name());
            attributor.class_decl(c, fqn)
        })
        .collect();
    let mut unresolved = attributor.unresolved;
    let mut seen = HashSet::new();
    unresolved.retain(|n| seen.insert(n.clone()));
    Attribution {
        unit: CompilationUnit {
            classes,
            ..unit.clone()
        },
        unresolved,
    }
}

struct Attributor<'a> {
    classpath: &'a Classpath,
    names: Names<'a>,
    /// Named enclosing classes, for type name resolution.
    enclosing: Vec<String>,
    /// Enclosing class types including anonymous ones, innermost last.
    classes: Vec<JavaType>,
    scopes: Vec<Vec<Arc<VariableType>>>,
    methods: Vec<Option<Arc<MethodType>>>,
    /// Next anonymous class index per named class.
    anonymous: HashMap<String, usize>,
    unresolved: Vec<String>,
}

impl<'a> Attributor<'a> {
    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    fn resolve_type(&self, name: &str) -> Option<JavaType> {
        let fqn = self.names.resolve(name, &self.enclosing)?;
        Some(match self.classpath.lookup(&fqn) {
            Some(class) => JavaType::Class(class),
            None => JavaType::shallow(&fqn),
        })
    }

    fn lookup_variable(&self, name: &str) -> Option<Arc<VariableType>> {
        for scope in self.scopes.iter().rev() {
            if let Some(v) = scope.iter().rev().find(|v| &*v.name == name) {
                return Some(v.clone());
            }
        }
        for class in self.classes.iter().rev() {
            if let Some(field) = find_field(class, name, self.classpath) {
                return Some(field);
            }
        }
        self.names
            .statics
            .iter()
            .filter(|(_, member)| member == name || member == "*")
            .find_map(|(owner, _)| find_field(&JavaType::shallow(owner), name, self.classpath))
    }

    fn current_class(&self) -> Option<Arc<ClassType>> {
        self.classes.last().and_then(|c| self.classpath.resolve(c))
    }

    fn current_method(&self) -> Option<JavaType> {
        self.methods
            .last()
            .and_then(|m| m.clone())
            .map(JavaType::Method)
    }

    fn declare_local(&mut self, var: Arc<VariableType>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(var);
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn class_decl(&mut self, class: &Arc<ClassDecl>, fqn: String) -> Arc<ClassDecl> {
        let ty = self.classpath.lookup(&fqn).map(JavaType::Class);
        self.enclosing.push(fqn.clone());
        self.classes
            .push(ty.clone().unwrap_or_else(|| JavaType::shallow(&fqn)));

        let name = Arc::new(class.name.with_type(ty.clone()));
        let extends = class
            .extends
            .as_ref()
            .map(|e| e.with_element(self.type_tree(&e.element)));
        let implements = class.implements.as_ref().map(|d| {
            d.with_elements(
                d.elements
                    .iter()
                    .map(|t| t.with_element(self.type_tree(&t.element)))
                    .collect(),
            )
        });
        let body = self.class_body(&class.body, &fqn);

        self.classes.pop();
        self.enclosing.pop();
        Arc::new(ClassDecl {
            name,
            extends,
            implements,
            body,
            ty,
            ..(**class).clone()
        })
    }

    fn class_body(&mut self, body: &Arc<Block>, fqn: &str) -> Arc<Block> {
        let statements = body
            .statements
            .iter()
            .map(|member| {
                let element = match &member.element {
                    J::VariableDecls(v) => J::VariableDecls(self.field_decls(v)),
                    J::MethodDecl(m) => J::MethodDecl(self.method_decl(m)),
                    J::ClassDecl(c) => {
                        let nested = format!("{}${}", fqn, c.simple_name());
                        J::ClassDecl(self.class_decl(c, nested))
                    }
                    J::Block(b) => {
                        self.methods.push(None);
                        let b = self.block(b);
                        self.methods.pop();
                        J::Block(b)
                    }
                    other => other.clone(),
                };
                member.with_element(element)
            })
            .collect();
        Arc::new(body.with_statements(statements))
    }

    fn field_decls(&mut self, decls: &Arc<VariableDecls>) -> Arc<VariableDecls> {
        let type_expr = self.type_tree(&decls.type_expr);
        let class = self.current_class();
        let vars = decls
            .vars
            .iter()
            .map(|v| {
                let declared = class.as_ref().and_then(|c| c.member(&v.element.name.name)).cloned();
                let expected = declared.as_ref().map(|d| d.ty.clone());
                v.with_element(self.named_variable(&v.element, declared, expected))
            })
            .collect();
        Arc::new(VariableDecls {
            type_expr,
            vars,
            ..(**decls).clone()
        })
    }

    fn named_variable(
        &mut self,
        var: &Arc<NamedVariable>,
        var_type: Option<Arc<VariableType>>,
        expected: Option<JavaType>,
    ) -> Arc<NamedVariable> {
        let initializer = var
            .initializer
            .as_ref()
            .map(|init| init.with_element(self.expr(&init.element, expected.as_ref())));
        let name = Arc::new(
            var.name
                .with_type(var_type.as_ref().map(|v| v.ty.clone()))
                .with_field_type(var_type.clone()),
        );
        Arc::new(NamedVariable {
            name,
            initializer,
            var_type,
            ..(**var).clone()
        })
    }

    fn method_decl(&mut self, method: &Arc<MethodDecl>) -> Arc<MethodDecl> {
        let name = if method.is_constructor() {
            CONSTRUCTOR
        } else {
            method.simple_name()
        };
        let arity = method.parameters().count();
        let method_type = self
            .current_class()
            .and_then(|c| c.method(name, arity).cloned());
        let return_type = method.return_type.as_ref().map(|rt| self.type_tree(rt));

        self.methods.push(method_type.clone());
        self.scopes.push(Vec::new());
        let params = method.params.with_elements(
            method
                .params
                .elements
                .iter()
                .map(|p| {
                    let element = match &p.element {
                        J::VariableDecls(v) => J::VariableDecls(self.local_decls(v)),
                        other => other.clone(),
                    };
                    p.with_element(element)
                })
                .collect(),
        );
        let body = method.body.as_ref().map(|b| self.block(b));
        self.scopes.pop();
        self.methods.pop();

        Arc::new(MethodDecl {
            return_type,
            name: Arc::new(
                method
                    .name
                    .with_type(method_type.clone().map(JavaType::Method)),
            ),
            params,
            body,
            method_type,
            ..(**method).clone()
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self, block: &Arc<Block>) -> Arc<Block> {
        self.scopes.push(Vec::new());
        let statements = block
            .statements
            .iter()
            .map(|s| s.with_element(self.statement(&s.element)))
            .collect();
        self.scopes.pop();
        Arc::new(block.with_statements(statements))
    }

    fn statement(&mut self, stmt: &J) -> J {
        match stmt {
            J::Block(b) => J::Block(self.block(b)),
            J::VariableDecls(v) => J::VariableDecls(self.local_decls(v)),
            J::Return(r) => J::from(Return {
                expr: r.expr.as_ref().map(|e| self.expr(e, None)),
                ..(**r).clone()
            }),
            J::ClassDecl(c) => {
                let outer = self.enclosing.last().cloned().unwrap_or_default();
                J::ClassDecl(self.class_decl(c, format!("{}${}", outer, c.simple_name())))
            }
            J::Empty(_) => stmt.clone(),
            other => self.expr(other, None),
        }
    }

    fn local_decls(&mut self, decls: &Arc<VariableDecls>) -> Arc<VariableDecls> {
        let type_expr = self.type_tree(&decls.type_expr);
        let ty = type_expr
            .ty()
            .unwrap_or_else(|| JavaType::shallow("java.lang.Object"));
        let flags = flags_of(&decls.modifiers);
        let owner = self.current_method();
        let vars = decls
            .vars
            .iter()
            .map(|v| {
                let var_type = Arc::new(VariableType {
                    name: v.element.name.name.clone(),
                    owner: owner.clone(),
                    ty: ty.clone(),
                    flags,
                    annotations: Vec::new(),
                });
                let attributed = self.named_variable(&v.element, Some(var_type.clone()), Some(ty.clone()));
                self.declare_local(var_type);
                v.with_element(attributed)
            })
            .collect();
        Arc::new(VariableDecls {
            type_expr,
            vars,
            ..(**decls).clone()
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self, tree: &J, expected: Option<&JavaType>) -> J {
        match tree {
            J::Identifier(id) => J::Identifier(self.identifier(id)),
            J::FieldAccess(fa) => self.field_access(fa),
            J::MethodInvocation(mi) => self.method_invocation(mi),
            J::NewClass(nc) => self.new_class(nc, expected),
            J::Assignment(a) => {
                let variable = self.expr(&a.variable, None);
                let ty = variable.ty();
                let value = self.expr(&a.value.element, ty.as_ref());
                J::from(Assignment {
                    variable,
                    value: a.value.with_element(value),
                    ty,
                    ..(**a).clone()
                })
            }
            J::Literal(l) => J::from(Literal {
                ty: Some(self.literal_type(&l.source)),
                ..(**l).clone()
            }),
            J::Binary(b) => {
                let left = self.expr(&b.left, None);
                let right = self.expr(&b.right, None);
                let ty = self.binary_type(b.operator.element, left.ty(), right.ty());
                J::from(Binary {
                    left,
                    right,
                    ty,
                    ..(**b).clone()
                })
            }
            J::Parentheses(p) => {
                let inner = self.expr(&p.tree.element, expected);
                J::from(Parentheses {
                    tree: p.tree.with_element(inner),
                    ..(**p).clone()
                })
            }
            J::ParameterizedType(_) | J::ArrayType(_) => self.type_tree(tree),
            _ => tree.clone(),
        }
    }

    fn identifier(&mut self, id: &Arc<Identifier>) -> Arc<Identifier> {
        match &*id.name {
            "this" => Arc::new(id.with_type(self.classes.last().cloned())),
            "super" => {
                let supertype = self.current_class().and_then(|c| c.supertype.clone());
                Arc::new(id.with_type(supertype))
            }
            name => {
                if let Some(var) = self.lookup_variable(name) {
                    return Arc::new(id.with_type(Some(var.ty.clone())).with_field_type(Some(var)));
                }
                if let Some(ty) = self.resolve_type(name) {
                    return Arc::new(id.with_type(Some(ty)));
                }
                self.unresolved.push(name.to_string());
                id.clone()
            }
        }
    }

    fn field_access(&mut self, fa: &Arc<FieldAccess>) -> J {
        let whole = J::FieldAccess(fa.clone());
        if let Some(dotted) = qualified_name(&whole) {
            let head = dotted.split('.').next().unwrap_or_default();
            if self.lookup_variable(head).is_none() {
                if let Some(ty) = self.resolve_type(&dotted) {
                    return J::from(FieldAccess {
                        name: fa
                            .name
                            .with_element(Arc::new(fa.name.element.with_type(Some(ty.clone())))),
                        ty: Some(ty),
                        ..(**fa).clone()
                    });
                }
            }
        }

        let target = self.expr(&fa.target, None);
        let name = fa.simple_name();
        let target_ty = target.ty();
        let field = target_ty
            .as_ref()
            .and_then(|t| find_field(t, name, self.classpath));
        let ty = match (&field, &target_ty) {
            (Some(f), _) => Some(f.ty.clone()),
            (None, Some(JavaType::Array(_))) if name == "length" => {
                Some(JavaType::Primitive(PrimitiveKind::Int))
            }
            (None, Some(_)) => {
                self.unresolved.push(format!("{}.{}", target.print().trim(), name));
                None
            }
            (None, None) => None,
        };
        let name = Arc::new(
            fa.name
                .element
                .with_type(ty.clone())
                .with_field_type(field),
        );
        J::from(FieldAccess {
            target,
            name: fa.name.with_element(name),
            ty,
            ..(**fa).clone()
        })
    }

    fn method_invocation(&mut self, mi: &Arc<MethodInvocation>) -> J {
        let args = mi.args.with_elements(
            mi.args
                .elements
                .iter()
                .map(|a| a.with_element(self.expr(&a.element, None)))
                .collect(),
        );
        let arity = args.iter().filter(|a| !a.is_empty()).count();
        let name = mi.simple_name();
        let explicit_constructor = name == "this" || name == "super";

        let (select, method_type) = match &mi.select {
            Some(s) => {
                let receiver = self.expr(&s.element, None);
                let method = receiver
                    .ty()
                    .map(|t| (find_method(&t, name, arity, self.classpath), true))
                    .unwrap_or((None, false));
                if method.0.is_none() && method.1 {
                    self.unresolved.push(format!("{}()", name));
                }
                (Some(s.with_element(receiver)), method.0)
            }
            None if explicit_constructor => (None, None),
            None => {
                let method = self
                    .classes
                    .iter()
                    .rev()
                    .find_map(|c| find_method(c, name, arity, self.classpath));
                if method.is_none() {
                    self.unresolved.push(format!("{}()", name));
                }
                (None, method)
            }
        };

        J::from(MethodInvocation {
            select,
            name: Arc::new(mi.name.with_type(method_type.clone().map(JavaType::Method))),
            args,
            method_type,
            ..(**mi).clone()
        })
    }

    fn new_class(&mut self, nc: &Arc<NewClass>, expected: Option<&JavaType>) -> J {
        let clazz = self.type_tree(&nc.clazz);
        let ty = match (&clazz, expected, clazz.ty()) {
            (J::ParameterizedType(pt), Some(expected), Some(JavaType::Parameterized(p)))
                if pt.is_diamond() =>
            {
                Some(JavaType::parameterized(
                    p.base.clone(),
                    expected.type_arguments().to_vec(),
                ))
            }
            (_, _, ty) => ty,
        };
        let args = nc.args.with_elements(
            nc.args
                .elements
                .iter()
                .map(|a| a.with_element(self.expr(&a.element, None)))
                .collect(),
        );
        let arity = args.iter().filter(|a| !a.is_empty()).count();
        let constructor_type = ty
            .as_ref()
            .and_then(|t| find_method(t, CONSTRUCTOR, arity, self.classpath));

        let (body, ty) = match &nc.body {
            Some(body) => {
                let anonymous = self.anonymous_class(ty.clone(), body);
                let fqn = anonymous.fqn.to_string();
                let anonymous = JavaType::Class(Arc::new(anonymous));
                self.classes.push(anonymous.clone());
                let body = self.class_body(body, &fqn);
                self.classes.pop();
                (Some(body), Some(anonymous))
            }
            None => (None, ty),
        };

        J::from(NewClass {
            clazz,
            args,
            body,
            ty,
            constructor_type,
            ..(**nc).clone()
        })
    }

    fn anonymous_class(&mut self, base: Option<JavaType>, body: &Block) -> ClassType {
        let owner = self.enclosing.last().cloned().unwrap_or_default();
        let index = self.anonymous.entry(owner.clone()).or_insert(0);
        *index += 1;
        let fqn = format!("{}${}", owner, index);

        let base = base.unwrap_or_else(|| JavaType::shallow("java.lang.Object"));
        let is_interface = self
            .classpath
            .resolve(&base)
            .is_some_and(|c| c.kind == ClassKind::Interface);
        let (supertype, interfaces) = if is_interface {
            (JavaType::shallow("java.lang.Object"), vec![base])
        } else {
            (base, Vec::new())
        };
        let (members, methods) =
            declare_members(body, &fqn, ClassKind::Class, &self.names, &self.enclosing);
        ClassType {
            fqn: Arc::from(fqn.as_str()),
            kind: ClassKind::Class,
            flags: Flags::NONE,
            supertype: Some(supertype),
            interfaces,
            members,
            methods,
            owning_class: Some(JavaType::shallow(&owner)),
            type_parameters: Vec::new(),
            annotations: Vec::new(),
        }
    }

    fn literal_type(&self, source: &str) -> JavaType {
        let kind = match source {
            "true" | "false" => PrimitiveKind::Boolean,
            "null" => PrimitiveKind::Null,
            s if s.starts_with('"') => {
                return self
                    .resolve_type("String")
                    .unwrap_or_else(|| JavaType::shallow("java.lang.String"))
            }
            s if s.starts_with('\'') => PrimitiveKind::Char,
            s if s.ends_with(['l', 'L']) => PrimitiveKind::Long,
            s if s.ends_with(['f', 'F']) => PrimitiveKind::Float,
            s if s.contains('.') || s.ends_with(['d', 'D']) => PrimitiveKind::Double,
            _ => PrimitiveKind::Int,
        };
        JavaType::Primitive(kind)
    }

    fn binary_type(
        &self,
        op: BinaryOp,
        left: Option<JavaType>,
        right: Option<JavaType>,
    ) -> Option<JavaType> {
        if op.is_boolean() {
            return Some(JavaType::Primitive(PrimitiveKind::Boolean));
        }
        let is_string =
            |t: &Option<JavaType>| t.as_ref().and_then(|t| t.fully_qualified_name()) == Some("java.lang.String");
        if op == BinaryOp::Addition && (is_string(&left) || is_string(&right)) {
            return if is_string(&left) { left } else { right };
        }
        left.or(right)
    }

    // ------------------------------------------------------------------
    // Type trees
    // ------------------------------------------------------------------

    fn type_tree(&mut self, tree: &J) -> J {
        match tree {
            J::Identifier(id) => match self.resolve_type(&id.name) {
                Some(ty) => J::Identifier(Arc::new(id.with_type(Some(ty)))),
                None => {
                    self.unresolved.push(id.name.to_string());
                    tree.clone()
                }
            },
            J::FieldAccess(fa) => {
                let dotted = qualified_name(tree).unwrap_or_default();
                match self.resolve_type(&dotted) {
                    Some(ty) => J::from(FieldAccess {
                        name: fa
                            .name
                            .with_element(Arc::new(fa.name.element.with_type(Some(ty.clone())))),
                        ty: Some(ty),
                        ..(**fa).clone()
                    }),
                    None => {
                        self.unresolved.push(dotted);
                        tree.clone()
                    }
                }
            }
            J::ParameterizedType(pt) => {
                let clazz = self.type_tree(&pt.clazz);
                let type_args = if pt.is_diamond() {
                    pt.type_args.clone()
                } else {
                    pt.type_args.with_elements(
                        pt.type_args
                            .elements
                            .iter()
                            .map(|a| a.with_element(self.type_tree(&a.element)))
                            .collect(),
                    )
                };
                let ty = clazz.ty().map(|base| {
                    let base = match base {
                        JavaType::Parameterized(p) => p.base.clone(),
                        other => other,
                    };
                    JavaType::parameterized(base, type_args.iter().filter_map(|a| a.ty()).collect())
                });
                J::from(ParameterizedType {
                    clazz,
                    type_args,
                    ty,
                    ..(**pt).clone()
                })
            }
            J::ArrayType(a) => J::from(ArrayType {
                element: self.type_tree(&a.element),
                ..(**a).clone()
            }),
            _ => tree.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_compilation_unit;

    fn attribute_source(source: &str, classpath: &Classpath) -> Attribution {
        attribute(&parse_compilation_unit(source).unwrap(), classpath)
    }

    fn method_body(unit: &CompilationUnit, class: usize, member: usize) -> Arc<Block> {
        let member = &unit.classes[class].body.statements[member].element;
        member.as_method_decl().unwrap().body.clone().unwrap()
    }

    #[test]
    fn self_references_are_cyclic() {
        let unit = parse_compilation_unit("package a; class Node { Node next; int value; }").unwrap();
        let declared = declare_types(&[&unit], &Classpath::standard());
        assert_eq!(declared.len(), 1);
        let node = &declared[0];
        assert_eq!(&*node.fqn, "a.Node");
        assert!(matches!(node.members[0].ty, JavaType::Cyclic(_)));
        assert!(matches!(node.members[0].owner, Some(JavaType::Cyclic(_))));
        assert!(node.members[1].ty.is_primitive());
    }

    #[test]
    fn fields_and_locals_resolve() {
        let result = attribute_source(
            "package a;\nclass Foo {\n  int count;\n  void f(int n) {\n    String s = \"x\";\n    count = n;\n  }\n}\n",
            &Classpath::standard(),
        );
        assert!(result.unresolved.is_empty(), "{:?}", result.unresolved);
        let body = method_body(&result.unit, 0, 1);
        let assignment = body.statements[1].element.as_assignment().unwrap();
        let count = assignment.variable.as_identifier().unwrap();
        assert_eq!(count.field_type.as_ref().unwrap().owner_name(), Some("a.Foo"));
        let n = assignment.value.element.as_identifier().unwrap();
        assert!(matches!(n.field_type.as_ref().unwrap().owner, Some(JavaType::Method(_))));
    }

    #[test]
    fn unknown_names_are_reported() {
        let result = attribute_source("class A { Missing m; void f() { g(); } }", &Classpath::standard());
        assert_eq!(result.unresolved, vec!["Missing".to_string(), "g()".to_string()]);
    }

    #[test]
    fn anonymous_bodies_resolve_inherited_methods() {
        let result = attribute_source(
            "import java.util.*;\nclass A {\n  void f() {\n    Map<String, Integer> m = new HashMap<>() {{\n      put(\"a\", 1);\n    }};\n  }\n}\n",
            &Classpath::standard(),
        );
        assert!(result.unresolved.is_empty(), "{:?}", result.unresolved);
        let body = method_body(&result.unit, 0, 0);
        let decls = body.statements[0].element.as_variable_decls().unwrap();
        let init = decls.vars[0].element.initializer.as_ref().unwrap();
        let nc = init.element.as_new_class().unwrap();
        let anon = nc.ty.as_ref().and_then(|t| t.as_class()).unwrap();
        assert_eq!(&*anon.fqn, "A$1");
        assert_eq!(
            anon.supertype.as_ref().unwrap().to_string(),
            "java.util.HashMap<java.lang.String, java.lang.Integer>"
        );
    }
}
