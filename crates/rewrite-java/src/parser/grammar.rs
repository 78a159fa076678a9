// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! PEG grammar for the supported language subset.
//!
//! Every rule that starts a node first captures the whitespace and comments
//! before it as the node's prefix, and every wrapper captures the space
//! before its delimiter, so the printer can reproduce the input byte for
//! byte.

use std::sync::Arc;

use rewrite_core::{Markers, NodeId};

use crate::tree::*;
use crate::types::{ClassKind, PrimitiveKind};

pub(super) enum Selector {
    Field(Space, Arc<Identifier>),
    Invoke(Space, Arc<Identifier>, Delimited<J>),
}

peg::parser! {
    pub(super) grammar java() for str {
        // --------------------------------------------------------------
        // Lexical
        // --------------------------------------------------------------

        rule ws_char() = [' ' | '\t' | '\r' | '\n' | '\u{000C}']

        rule comment()
            = "//" (!"\n" [_])*
            / "/*" (!"*/" [_])* "*/"

        rule _() -> Space
            = s:$((ws_char() / comment())*) { Space::format(s) }

        rule id_start() = ['a'..='z' | 'A'..='Z' | '_' | '$']
        rule id_char() = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$']

        rule word() -> &'input str
            = $(id_start() id_char()*)

        rule kw(k: &'static str)
            = w:word() {? if w == k { Ok(()) } else { Err(k) } }

        rule name() -> &'input str
            = w:word() {? if is_reserved(w) { Err("identifier") } else { Ok(w) } }

        rule ident() -> Arc<Identifier>
            = p:_() n:name() { Arc::new(Identifier::build(p, n)) }

        // --------------------------------------------------------------
        // Compilation unit
        // --------------------------------------------------------------

        pub rule compilation_unit() -> CompilationUnit
            = package:package_decl()? imports:import_decl()* classes:class_decl()* eof:_() {
                CompilationUnit {
                    id: NodeId::fresh(),
                    prefix: Space::EMPTY,
                    markers: Markers::new(),
                    source_path: None,
                    package,
                    imports,
                    classes,
                    eof,
                }
            }

        rule package_decl() -> Trailing<Arc<Package>>
            = p:_() kw("package") name:qualified_name() a:_() ";" {
                Trailing::new(
                    Arc::new(Package { id: NodeId::fresh(), prefix: p, markers: Markers::new(), name }),
                    a,
                )
            }

        rule qualified_name() -> J
            = first:ident() rest:(b:_() "." n:ident() { (b, n) })* {
                fold_field_access(J::Identifier(first), rest)
            }

        rule import_part() -> Arc<Identifier>
            = ident()
            / p:_() "*" { Arc::new(Identifier::build(p, "*")) }

        rule import_decl() -> Trailing<Arc<Import>>
            = p:_() kw("import") statik:(s:_() kw("static") { s })?
              first:ident() rest:(b:_() "." n:import_part() { (b, n) })+ a:_() ";" {?
                match fold_field_access(J::Identifier(first), rest) {
                    J::FieldAccess(qualid) => Ok(Trailing::new(
                        Arc::new(Import {
                            id: NodeId::fresh(),
                            prefix: p,
                            markers: Markers::new(),
                            statik,
                            qualid,
                        }),
                        a,
                    )),
                    _ => Err("qualified name"),
                }
            }

        // --------------------------------------------------------------
        // Declarations
        // --------------------------------------------------------------

        rule modifier() -> Modifier
            = p:_() w:word() {?
                modifier_keyword(w)
                    .map(|keyword| Modifier { prefix: p, keyword })
                    .ok_or("modifier")
            }

        rule class_decl() -> Arc<ClassDecl>
            = p:_() modifiers:modifier()* kind_prefix:_() kw("class") name:ident()
              extends:(b:_() kw("extends") t:type_tree() { Leading::new(b, t) })?
              implements:(b:_() kw("implements") ts:type_list() { Delimited::new(b, ts) })?
              body:class_body() {
                class(p, modifiers, kind_prefix, ClassKind::Class, name, extends, implements, body)
            }
            / p:_() modifiers:modifier()* kind_prefix:_() kw("interface") name:ident()
              implements:(b:_() kw("extends") ts:type_list() { Delimited::new(b, ts) })?
              body:class_body() {
                class(p, modifiers, kind_prefix, ClassKind::Interface, name, None, implements, body)
            }

        rule type_list() -> Vec<Trailing<J>>
            = ts:(t:type_tree() a:_() { Trailing::new(t, a) }) ++ "," { ts }

        rule class_body() -> Arc<Block>
            = p:_() "{" members:member()* end:_() "}" { Arc::new(Block::build(p, members, end)) }

        rule member() -> Trailing<J>
            = h:method_head() body:block() {
                Trailing::bare(J::from(MethodDecl { body: Some(body), ..h }))
            }
            / h:method_head() a:_() ";" { Trailing::new(J::from(h), a) }
            / v:variable_decls() a:_() ";" { Trailing::new(J::VariableDecls(v), a) }
            / b:initializer_block() { Trailing::bare(J::Block(b)) }
            / c:class_decl() { Trailing::bare(J::ClassDecl(c)) }
            / p:_() ";" { Trailing::bare(J::empty(p)) }

        rule method_head() -> MethodDecl
            = p:_() modifiers:modifier()* rt:type_tree() name:ident() params:params() {
                method(p, modifiers, Some(rt), name, params)
            }
            / p:_() modifiers:modifier()* name:ident() params:params() {
                method(p, modifiers, None, name, params)
            }

        rule params() -> Delimited<J>
            = b:_() "(" ps:(v:param() a:_() { Trailing::new(J::VariableDecls(v), a) }) ++ "," ")" {
                Delimited::new(b, ps)
            }
            / b:_() "(" e:_() ")" { Delimited::new(b, vec![Trailing::bare(J::empty(e))]) }

        rule param() -> Arc<VariableDecls>
            = p:_() modifiers:modifier()* t:type_tree() v:named_variable_without_init() {
                variable_decls_node(p, modifiers, t, vec![Trailing::bare(v)])
            }

        rule named_variable_without_init() -> Arc<NamedVariable>
            = p:_() name:ident() { named_variable(p, name, None) }

        rule variable_decls() -> Arc<VariableDecls>
            = p:_() modifiers:modifier()* t:type_tree() vars:var_list() {
                variable_decls_node(p, modifiers, t, vars)
            }

        rule var_list() -> Vec<Trailing<Arc<NamedVariable>>>
            = init:(v:named_variable_decl() a:_() "," { Trailing::new(v, a) })* last:named_variable_decl() {
                let mut vars = init;
                vars.push(Trailing::bare(last));
                vars
            }

        rule named_variable_decl() -> Arc<NamedVariable>
            = p:_() name:ident() init:(b:_() "=" !"=" e:expression() { Leading::new(b, e) })? {
                named_variable(p, name, init)
            }

        rule initializer_block() -> Arc<Block>
            = p:_() kw("static") s:_() "{" stmts:statement()* end:_() "}" {
                Arc::new(Block { statik: Some(s), ..Block::build(p, stmts, end) })
            }
            / block()

        // --------------------------------------------------------------
        // Type trees
        // --------------------------------------------------------------

        rule type_tree() -> J
            = t:base_type() dims:(b:_() "[" i:_() "]" { (b, i) })* { fold_array(t, dims) }

        rule base_type() -> J
            = p:_() w:word() {?
                PrimitiveKind::from_keyword(w)
                    .map(|k| J::primitive(p, k))
                    .ok_or("primitive type")
            }
            / class_type()

        rule class_type() -> J
            = c:qualified_name() args:type_args()? {
                match args {
                    Some(args) => parameterized(c, args),
                    None => c,
                }
            }

        rule type_args() -> Delimited<J>
            = b:_() "<" ts:(t:type_tree() a:_() { Trailing::new(t, a) }) ++ "," ">" {
                Delimited::new(b, ts)
            }
            / b:_() "<" e:_() ">" { Delimited::new(b, vec![Trailing::bare(J::empty(e))]) }

        // --------------------------------------------------------------
        // Statements
        // --------------------------------------------------------------

        rule block() -> Arc<Block>
            = p:_() "{" stmts:statement()* end:_() "}" { Arc::new(Block::build(p, stmts, end)) }

        rule statement() -> Trailing<J>
            = b:block() { Trailing::bare(J::Block(b)) }
            / r:return_stmt() a:_() ";" { Trailing::new(r, a) }
            / c:class_decl() { Trailing::bare(J::ClassDecl(c)) }
            / v:variable_decls() a:_() ";" { Trailing::new(J::VariableDecls(v), a) }
            / e:expression() a:_() ";" { Trailing::new(e, a) }
            / p:_() ";" { Trailing::bare(J::empty(p)) }

        rule return_stmt() -> J
            = p:_() kw("return") expr:expression()? {
                J::from(Return { id: NodeId::fresh(), prefix: p, markers: Markers::new(), expr })
            }

        // --------------------------------------------------------------
        // Expressions
        // --------------------------------------------------------------

        pub rule expression() -> J
            = assignment()
            / binary()

        rule assignment() -> J
            = v:postfix() b:_() "=" !"=" e:expression() { assign(v, b, e) }

        rule binary() -> J = precedence! {
            x:(@) b:_() "||" y:@ { binary_node(x, b, BinaryOp::Or, y) }
            --
            x:(@) b:_() "&&" y:@ { binary_node(x, b, BinaryOp::And, y) }
            --
            x:(@) b:_() "==" y:@ { binary_node(x, b, BinaryOp::Equal, y) }
            x:(@) b:_() "!=" y:@ { binary_node(x, b, BinaryOp::NotEqual, y) }
            --
            x:(@) b:_() "<=" y:@ { binary_node(x, b, BinaryOp::LessOrEqual, y) }
            x:(@) b:_() ">=" y:@ { binary_node(x, b, BinaryOp::GreaterOrEqual, y) }
            x:(@) b:_() "<" y:@ { binary_node(x, b, BinaryOp::LessThan, y) }
            x:(@) b:_() ">" y:@ { binary_node(x, b, BinaryOp::GreaterThan, y) }
            --
            x:(@) b:_() "+" y:@ { binary_node(x, b, BinaryOp::Addition, y) }
            x:(@) b:_() "-" y:@ { binary_node(x, b, BinaryOp::Subtraction, y) }
            --
            x:(@) b:_() "*" y:@ { binary_node(x, b, BinaryOp::Multiplication, y) }
            x:(@) b:_() "/" y:@ { binary_node(x, b, BinaryOp::Division, y) }
            x:(@) b:_() "%" y:@ { binary_node(x, b, BinaryOp::Modulo, y) }
            --
            p:postfix() { p }
        }

        #[cache]
        rule postfix() -> J
            = base:primary() sels:selector()* { sels.into_iter().fold(base, apply_selector) }

        rule selector() -> Selector
            = b:_() "." n:ident() args:args() { Selector::Invoke(b, n, args) }
            / b:_() "." n:ident() { Selector::Field(b, n) }

        rule primary() -> J
            = literal()
            / new_class()
            / p:_() "(" e:expression() a:_() ")" { parentheses(p, e, a) }
            / n:simple_name() args:args() { invocation(n, args) }
            / n:simple_name() { J::Identifier(n) }

        rule simple_name() -> Arc<Identifier>
            = ident()
            / p:_() w:word() {?
                match w {
                    "this" | "super" => Ok(Arc::new(Identifier::build(p, w))),
                    _ => Err("identifier"),
                }
            }

        rule args() -> Delimited<J>
            = b:_() "(" es:(e:expression() a:_() { Trailing::new(e, a) }) ++ "," ")" {
                Delimited::new(b, es)
            }
            / b:_() "(" e:_() ")" { Delimited::new(b, vec![Trailing::bare(J::empty(e))]) }

        rule new_class() -> J
            = p:_() kw("new") clazz:class_type() args:args() body:class_body()? {
                J::from(NewClass {
                    id: NodeId::fresh(),
                    prefix: p,
                    markers: Markers::new(),
                    clazz,
                    args,
                    body,
                    ty: None,
                    constructor_type: None,
                })
            }

        rule literal() -> J
            = p:_() s:$("\"" ("\\" [_] / [^ '"' | '\\' | '\n'])* "\"") { literal_node(p, s) }
            / p:_() s:$("'" ("\\" [_] / [^ '\'' | '\\' | '\n'])+ "'") { literal_node(p, s) }
            / p:_() s:$(['0'..='9']+ ("." ['0'..='9']+)? ['l' | 'L' | 'f' | 'F' | 'd' | 'D']?) !id_char() {
                literal_node(p, s)
            }
            / p:_() w:word() {?
                match w {
                    "true" | "false" | "null" => Ok(literal_node(p, w)),
                    _ => Err("literal"),
                }
            }
    }
}

// ============================================================================
// Node construction helpers
// ============================================================================

const RESERVED: &[&str] = &[
    "abstract", "boolean", "break", "byte", "case", "catch", "char", "class", "continue",
    "default", "do", "double", "else", "enum", "extends", "false", "final", "finally", "float",
    "for", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "null", "package", "private", "protected", "public", "return", "short", "static",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "true", "try",
    "void", "volatile", "while",
];

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

fn modifier_keyword(word: &str) -> Option<ModifierKeyword> {
    Some(match word {
        "public" => ModifierKeyword::Public,
        "protected" => ModifierKeyword::Protected,
        "private" => ModifierKeyword::Private,
        "static" => ModifierKeyword::Static,
        "final" => ModifierKeyword::Final,
        "abstract" => ModifierKeyword::Abstract,
        "synchronized" => ModifierKeyword::Synchronized,
        "native" => ModifierKeyword::Native,
        "transient" => ModifierKeyword::Transient,
        "volatile" => ModifierKeyword::Volatile,
        "default" => ModifierKeyword::Default,
        _ => return None,
    })
}

fn fold_field_access(first: J, rest: Vec<(Space, Arc<Identifier>)>) -> J {
    rest.into_iter().fold(first, |target, (dot, name)| {
        J::from(FieldAccess::build(target, dot, name))
    })
}

fn fold_array(element: J, dims: Vec<(Space, Space)>) -> J {
    dims.into_iter().fold(element, |element, (before, inside)| {
        let (prefix, element) = hoist_prefix(element);
        J::from(ArrayType {
            id: NodeId::fresh(),
            prefix,
            markers: Markers::new(),
            element,
            dimension: Leading::new(before, inside),
        })
    })
}

fn parameterized(clazz: J, type_args: Delimited<J>) -> J {
    let (prefix, clazz) = hoist_prefix(clazz);
    J::from(ParameterizedType {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        clazz,
        type_args,
        ty: None,
    })
}

#[allow(clippy::too_many_arguments)]
fn class(
    prefix: Space,
    modifiers: Vec<Modifier>,
    kind_prefix: Space,
    kind: ClassKind,
    name: Arc<Identifier>,
    extends: Option<Leading<J>>,
    implements: Option<Delimited<J>>,
    body: Arc<Block>,
) -> Arc<ClassDecl> {
    Arc::new(ClassDecl {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        modifiers,
        kind_prefix,
        kind,
        name,
        extends,
        implements,
        body,
        ty: None,
    })
}

fn method(
    prefix: Space,
    modifiers: Vec<Modifier>,
    return_type: Option<J>,
    name: Arc<Identifier>,
    params: Delimited<J>,
) -> MethodDecl {
    MethodDecl {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        modifiers,
        return_type,
        name,
        params,
        body: None,
        method_type: None,
    }
}

fn variable_decls_node(
    prefix: Space,
    modifiers: Vec<Modifier>,
    type_expr: J,
    vars: Vec<Trailing<Arc<NamedVariable>>>,
) -> Arc<VariableDecls> {
    Arc::new(VariableDecls {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        modifiers,
        type_expr,
        vars,
    })
}

fn named_variable(
    prefix: Space,
    name: Arc<Identifier>,
    initializer: Option<Leading<J>>,
) -> Arc<NamedVariable> {
    Arc::new(NamedVariable {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        name,
        initializer,
        var_type: None,
    })
}

fn assign(variable: J, before: Space, value: J) -> J {
    let (prefix, variable) = hoist_prefix(variable);
    J::from(Assignment {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        variable,
        value: Leading::new(before, value),
        ty: None,
    })
}

fn binary_node(left: J, before: Space, op: BinaryOp, right: J) -> J {
    let (prefix, left) = hoist_prefix(left);
    J::from(Binary {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        left,
        operator: Leading::new(before, op),
        right,
        ty: None,
    })
}

fn parentheses(prefix: Space, tree: J, after: Space) -> J {
    J::from(Parentheses {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        tree: Trailing::new(tree, after),
    })
}

fn invocation(name: Arc<Identifier>, args: Delimited<J>) -> J {
    let prefix = name.prefix.clone();
    let name = <Identifier as TreeKind>::with_prefix(&name, Space::EMPTY);
    J::from(MethodInvocation {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        select: None,
        name,
        args,
        method_type: None,
    })
}

fn apply_selector(base: J, selector: Selector) -> J {
    match selector {
        Selector::Field(dot, name) => J::from(FieldAccess::build(base, dot, name)),
        Selector::Invoke(dot, name, args) => {
            let (prefix, base) = hoist_prefix(base);
            J::from(MethodInvocation {
                id: NodeId::fresh(),
                prefix,
                markers: Markers::new(),
                select: Some(Trailing::new(base, dot)),
                name,
                args,
                method_type: None,
            })
        }
    }
}

fn literal_node(prefix: Space, source: &str) -> J {
    J::from(Literal {
        id: NodeId::fresh(),
        prefix,
        markers: Markers::new(),
        source: Arc::from(source),
        ty: None,
    })
}
