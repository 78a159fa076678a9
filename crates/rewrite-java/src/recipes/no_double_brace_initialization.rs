// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Replace double brace initialization of collections.
//!
//! ```text
//! Map<String, Integer> m = new HashMap<String, Integer>() {{
//!     put("a", 1);
//! }};
//! ```
//!
//! In a method body the anonymous class goes away and each initializer
//! statement follows the declaration, called on the variable. A field keeps
//! a plain construction in an initializer block (`static` for static
//! fields) inserted after it.

use std::collections::HashMap;
use std::sync::Arc;

use rewrite_core::{MessageKey, NodeId};

use crate::format::shift_indent;
use crate::recipe::Recipe;
use crate::search::UsesType;
use crate::template::{Coordinates, JavaTemplate};
use crate::tree::*;
use crate::types::type_utils::is_assignable_to;
use crate::types::JavaType;
use crate::visitor::{
    visit, walk_block, walk_method_invocation, walk_named_variable, walk_new_class, Iso,
    IsoAdapter, JavaIsoVisitor, JavaVisitor, VisitCtx,
};

const COLLECTIONS: [&str; 3] = ["java.util.Map", "java.util.List", "java.util.Set"];

const DEFAULT_INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDoubleBraceInitialization;

impl Recipe for NoDoubleBraceInitialization {
    fn name(&self) -> &str {
        "NoDoubleBraceInitialization"
    }

    fn display_name(&self) -> &str {
        "No double brace initialization"
    }

    fn description(&self) -> &str {
        "Replace `List`, `Map`, and `Set` double brace initialization with an initialization block."
    }

    fn tags(&self) -> &[&'static str] {
        &["RSPEC-1171", "RSPEC-3599"]
    }

    fn applicability_test(&self) -> Option<Box<dyn JavaVisitor>> {
        Some(Box::new(UsesType::any_of(COLLECTIONS)))
    }

    fn visitor(&self) -> Box<dyn JavaVisitor> {
        Box::new(Iso(NoDoubleBraceVisitor))
    }
}

/// Statements to insert into a block after the statement `anchor`.
#[derive(Debug)]
struct Insertion {
    anchor: NodeId,
    statements: Vec<Trailing<J>>,
}

/// Pending insertions, stored on the frame of the receiving block.
struct Insertions;

impl MessageKey for Insertions {
    type Value = Vec<Insertion>;
}

/// Set on a field's frame when its initializer moves into a block.
struct DropInitializer;

impl MessageKey for DropInitializer {
    type Value = ();
}

struct NoDoubleBraceVisitor;

/// True for `new T() {{ ... }}` where `T` is a collection and the
/// construction is neither an argument nor nested in another construction.
fn is_double_brace(nc: &NewClass, cx: &VisitCtx) -> bool {
    if matches!(
        cx.cursor.parent_value(),
        None | Some(J::MethodInvocation(_)) | Some(J::NewClass(_))
    ) {
        return false;
    }
    let Some(body) = &nc.body else {
        return false;
    };
    // Other members of the anonymous class would be lost.
    let [only] = body.statements.as_slice() else {
        return false;
    };
    if !matches!(&only.element, J::Block(b) if !b.is_static()) {
        return false;
    }
    nc.ty
        .as_ref()
        .is_some_and(|ty| COLLECTIONS.iter().any(|c| is_assignable_to(c, ty, cx.classpath())))
}

/// The initializer statements of a double brace construction.
fn initializer_statements(nc: &NewClass) -> Vec<Trailing<J>> {
    match nc.body.as_ref().and_then(|b| b.statements.first()) {
        Some(Trailing {
            element: J::Block(inner),
            ..
        }) => inner.statements.clone(),
        _ => Vec::new(),
    }
}

/// Give calls on the anonymous instance an explicit receiver.
fn add_select(statements: &[Trailing<J>], receiver: &Identifier, cx: &mut VisitCtx) -> Vec<Trailing<J>> {
    let mut nested = cx.detached();
    let mut visitor = Iso(AddSelect { receiver });
    let out = statements
        .iter()
        .map(|s| s.with_element(visit(&mut visitor, &s.element, &mut nested)))
        .collect();
    cx.absorb(nested);
    out
}

/// Re-indent moved statements to `to`, one statement per line.
///
/// Without a target indentation the statements stay on their lines and are
/// only kept apart by a blank.
fn relocate(statements: Vec<Trailing<J>>, to: Option<&str>) -> Vec<Trailing<J>> {
    let from = statements
        .iter()
        .find_map(|s| s.element.prefix().indent().map(str::to_string));
    statements
        .into_iter()
        .map(|s| {
            let element = match (to, &from) {
                (Some(to), from) => {
                    let shifted = match from {
                        Some(from) => shift_indent(&s.element, from, to),
                        None => s.element,
                    };
                    if shifted.prefix().has_newline() {
                        shifted
                    } else {
                        let text = format!("\n{}{}", to, shifted.prefix().as_str().trim_start());
                        shifted.with_prefix(Space::format(&text))
                    }
                }
                (None, _) if s.element.prefix().is_empty() => s.element.with_prefix(Space::single()),
                (None, _) => s.element,
            };
            Trailing::new(element, s.after)
        })
        .collect()
}

/// The step between `anchor` and the indentation of `statements`.
fn indent_step<'a>(statements: &'a [Trailing<J>], anchor: &str) -> &'a str {
    statements
        .iter()
        .find_map(|s| s.element.prefix().indent())
        .and_then(|indent| indent.strip_prefix(anchor))
        .filter(|step| !step.is_empty())
        .unwrap_or(DEFAULT_INDENT)
}

fn is_object(ty: &JavaType) -> bool {
    ty.fully_qualified_name() == Some("java.lang.Object")
}

/// `new T<>()`, or `new T()` for a class without type parameters.
fn construction_template(supertype: &JavaType, fqn: &str, cx: &VisitCtx) -> JavaTemplate {
    let generic = !supertype.type_arguments().is_empty()
        || cx
            .classpath()
            .resolve(supertype)
            .is_some_and(|c| !c.type_parameters.is_empty());
    let code = format!(
        "new {}{}()",
        supertype.class_name().unwrap_or(fqn),
        if generic { "<>" } else { "" }
    );
    JavaTemplate::builder(&code).imports([fqn]).expression().build()
}

impl NoDoubleBraceVisitor {
    fn rewrite(&self, nc: Arc<NewClass>, cx: &mut VisitCtx) -> Arc<NewClass> {
        let Some(J::NamedVariable(var)) = cx.cursor.parent_value().cloned() else {
            return nc;
        };
        let var_frame = cx.cursor.ancestor_frame(|t| t.id() == var.id);
        let decls = match cx.cursor.nearest_ancestor(|t| matches!(t, J::VariableDecls(_))) {
            Some(J::VariableDecls(decls)) => decls.clone(),
            _ => return nc,
        };
        let Some(block_frame) = cx.cursor.ancestor_frame(|t| matches!(t, J::Block(_))) else {
            return nc;
        };
        let in_block = matches!(
            cx.cursor.value_at(block_frame),
            Some(J::Block(b)) if b.statements().any(|s| s.id() == decls.id)
        );
        let owner = cx
            .cursor
            .parent_frame(block_frame)
            .and_then(|f| cx.cursor.value_at(f))
            .map(J::kind);
        let (Some(var_frame), true) = (var_frame, in_block) else {
            return nc;
        };

        let receiver = var.name.with_fresh_id();
        let anchor_indent = decls.prefix.indent().map(str::to_string);
        match owner {
            Some(JKind::MethodDecl) => {
                let statements = add_select(&initializer_statements(&nc), &receiver, cx);
                let statements = relocate(statements, anchor_indent.as_deref());
                cx.cursor.accumulate::<Insertions>(block_frame).push(Insertion {
                    anchor: decls.id,
                    statements,
                });
                Arc::new(NewClass {
                    ty: nc.clazz_type(),
                    ..nc.with_body(None)
                })
            }
            Some(JKind::ClassDecl) => {
                let Some(supertype) = nc
                    .ty
                    .as_ref()
                    .and_then(JavaType::as_class)
                    .and_then(|c| c.supertype.clone())
                    .filter(|s| !is_object(s))
                else {
                    return nc;
                };
                let Some(fqn) = supertype.fully_qualified_name().map(str::to_string) else {
                    return nc;
                };
                let template = construction_template(&supertype, &fqn, cx);
                let original = J::NewClass(nc.clone());
                let construction = match template.apply(cx, Coordinates::Replace(&original), &[]) {
                    Ok(construction) => construction,
                    Err(err) => {
                        cx.exec.record_failure(nc.id, err);
                        return nc;
                    }
                };

                let initializers = initializer_statements(&nc);
                let body_indent = anchor_indent
                    .as_deref()
                    .map(|anchor| format!("{}{}", anchor, indent_step(&initializers, anchor)));
                let assignment = Assignment::build(
                    body_indent.as_deref().map_or_else(Space::single, Space::newline),
                    J::from(receiver.clone()),
                    construction,
                    var.name.ty.clone(),
                );
                let mut statements = vec![Trailing::bare(J::from(assignment))];
                statements.extend(relocate(
                    add_select(&initializers, &receiver, cx),
                    body_indent.as_deref(),
                ));

                let edge = anchor_indent.as_deref().map_or_else(Space::single, Space::newline);
                let block = Block {
                    statik: decls
                        .has_modifier(ModifierKeyword::Static)
                        .then(Space::single),
                    ..Block::build(edge.clone(), statements, edge)
                };
                cx.cursor.put_message_at::<DropInitializer>(var_frame, ());
                cx.cursor.accumulate::<Insertions>(block_frame).push(Insertion {
                    anchor: decls.id,
                    statements: vec![Trailing::bare(J::from(block))],
                });
                nc
            }
            _ => nc,
        }
    }
}

impl JavaIsoVisitor for NoDoubleBraceVisitor {
    fn visit_new_class(&mut self, node: &Arc<NewClass>, cx: &mut VisitCtx) -> Arc<NewClass> {
        let nc = walk_new_class(&mut IsoAdapter(self), node, cx);
        if !is_double_brace(&nc, cx) {
            return nc;
        }
        self.rewrite(nc, cx)
    }

    fn visit_named_variable(&mut self, node: &Arc<NamedVariable>, cx: &mut VisitCtx) -> Arc<NamedVariable> {
        let var = walk_named_variable(&mut IsoAdapter(self), node, cx);
        if cx.cursor.take_message::<DropInitializer>().is_some() {
            return Arc::new(var.with_initializer(None));
        }
        var
    }

    fn visit_block(&mut self, node: &Arc<Block>, cx: &mut VisitCtx) -> Arc<Block> {
        let block = walk_block(&mut IsoAdapter(self), node, cx);
        let Some(insertions) = cx.cursor.take_message::<Insertions>() else {
            return block;
        };
        let mut statements = block.statements.clone();
        // Statements already spliced after each anchor; later variables of a
        // declaration go after earlier ones.
        let mut spliced: HashMap<NodeId, usize> = HashMap::new();
        for insertion in insertions {
            if let Some(index) = statements.iter().position(|s| s.element.id() == insertion.anchor) {
                let after = spliced.entry(insertion.anchor).or_insert(0);
                let at = index + 1 + *after;
                *after += insertion.statements.len();
                statements.splice(at..at, insertion.statements);
            }
        }
        Arc::new(block.with_statements(statements))
    }
}

/// Adds `receiver.` to calls of its methods that have no receiver or go
/// through `this`.
struct AddSelect<'a> {
    receiver: &'a Identifier,
}

impl AddSelect<'_> {
    fn declared_on_receiver(&self, mi: &MethodInvocation, cx: &VisitCtx) -> bool {
        let (Some(method), Some(ty)) = (&mi.method_type, &self.receiver.ty) else {
            return false;
        };
        let declaring = &method.declaring_type;
        let cp = cx.classpath();
        declaring
            .fully_qualified_name()
            .is_some_and(|fqn| is_assignable_to(fqn, ty, cp))
            || ty
                .fully_qualified_name()
                .is_some_and(|fqn| is_assignable_to(fqn, declaring, cp))
    }
}

impl JavaIsoVisitor for AddSelect<'_> {
    fn visit_method_invocation(&mut self, node: &Arc<MethodInvocation>, cx: &mut VisitCtx) -> Arc<MethodInvocation> {
        let mi = walk_method_invocation(&mut IsoAdapter(self), node, cx);
        let implicit = match &mi.select {
            None => true,
            Some(select) => matches!(&select.element, J::Identifier(i) if &*i.name == "this"),
        };
        if !implicit || !self.declared_on_receiver(&mi, cx) {
            return mi;
        }
        Arc::new(mi.with_select(Some(J::from(self.receiver.with_fresh_id()))))
    }
}
