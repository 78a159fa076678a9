// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Search visitors.
//!
//! Search visitors change nothing but markers: they attach a
//! [`SearchResult`] to what they find. [`UsesType`] and [`UsesField`] mark
//! the compilation unit itself, which makes them applicability tests: a
//! unit is applicable exactly when the visit returns a different tree.
//! [`FindFieldReferences`] marks every occurrence.
//!
//! Import declarations are never searched.

use std::sync::Arc;

use rewrite_core::SearchResult;

use crate::tree::*;
use crate::types::{package_of, JavaType, VariableType};
use crate::visitor::{walk_field_access, walk_identifier, JavaVisitor, VisitCtx};

/// Add a search marker to `tree` unless it already has one.
pub fn mark(tree: J) -> J {
    if tree.markers().has::<SearchResult>() {
        return tree;
    }
    let markers = tree.markers().add(SearchResult::new());
    tree.with_markers(markers)
}

/// True if `ty` is or mentions the type `pattern` (a fully qualified name,
/// or `package.*` for any type in a package).
pub fn type_matches(ty: &JavaType, pattern: &str) -> bool {
    match ty {
        JavaType::Parameterized(p) => {
            type_matches(&p.base, pattern) || p.type_args.iter().any(|a| type_matches(a, pattern))
        }
        JavaType::Array(element) => type_matches(element, pattern),
        JavaType::Variable(var) => type_matches(&var.ty, pattern),
        _ => ty
            .fully_qualified_name()
            .is_some_and(|fqn| match pattern.strip_suffix(".*") {
                Some(package) => package_of(fqn) == package,
                None => fqn == pattern,
            }),
    }
}

/// Marks the unit if any tree in it has a type matching one of the
/// patterns.
#[derive(Debug, Clone)]
pub struct UsesType {
    patterns: Vec<String>,
    found: bool,
}

impl UsesType {
    pub fn new(pattern: &str) -> Self {
        UsesType::any_of([pattern])
    }

    pub fn any_of<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UsesType {
            patterns: patterns.into_iter().map(Into::into).collect(),
            found: false,
        }
    }
}

impl JavaVisitor for UsesType {
    fn post_visit(&mut self, tree: J, _cx: &mut VisitCtx) -> J {
        if matches!(tree, J::CompilationUnit(_)) {
            return if self.found { mark(tree) } else { tree };
        }
        if !self.found {
            self.found = tree
                .ty()
                .is_some_and(|ty| self.patterns.iter().any(|p| type_matches(&ty, p)));
        }
        tree
    }

    fn visit_import(&mut self, node: &Arc<Import>, _cx: &mut VisitCtx) -> J {
        J::Import(node.clone())
    }
}

/// Matches a field by its declaring class and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatcher {
    owner: String,
    name: String,
}

impl FieldMatcher {
    pub fn new(owner: &str, name: &str) -> Self {
        FieldMatcher {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, var: &VariableType) -> bool {
        &*var.name == self.name && var.owner_name() == Some(self.owner.as_str())
    }

    /// True if `access` reads the field, through its attribution or through
    /// a target typed as the owner.
    pub fn matches_access(&self, access: &FieldAccess) -> bool {
        if access.simple_name() != self.name {
            return false;
        }
        match &access.name.element.field_type {
            Some(var) => self.matches(var),
            None => access
                .target
                .ty()
                .and_then(|t| t.fully_qualified_name().map(str::to_string))
                .is_some_and(|fqn| fqn == self.owner),
        }
    }

    /// True if `ident` is a bare reference to the field.
    pub fn matches_identifier(&self, ident: &Identifier) -> bool {
        &*ident.name == self.name && ident.field_type.as_ref().is_some_and(|v| self.matches(v))
    }
}

/// True if the identifier on top of the cursor is the name of a field
/// access, which is matched through the access instead.
fn is_access_name(ident: &Identifier, cx: &VisitCtx) -> bool {
    matches!(
        cx.cursor.parent_value(),
        Some(J::FieldAccess(fa)) if fa.name.element.id == ident.id
    )
}

/// Marks the unit if it reads or writes a field.
#[derive(Debug, Clone)]
pub struct UsesField {
    matcher: FieldMatcher,
    found: bool,
}

impl UsesField {
    pub fn new(owner: &str, field: &str) -> Self {
        UsesField {
            matcher: FieldMatcher::new(owner, field),
            found: false,
        }
    }
}

impl JavaVisitor for UsesField {
    fn post_visit(&mut self, tree: J, _cx: &mut VisitCtx) -> J {
        if self.found && matches!(tree, J::CompilationUnit(_)) {
            return mark(tree);
        }
        tree
    }

    fn visit_import(&mut self, node: &Arc<Import>, _cx: &mut VisitCtx) -> J {
        J::Import(node.clone())
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, cx: &mut VisitCtx) -> J {
        self.found |= self.matcher.matches_access(node);
        J::FieldAccess(walk_field_access(self, node, cx))
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> J {
        if !is_access_name(node, cx) {
            self.found |= self.matcher.matches_identifier(node);
        }
        J::Identifier(walk_identifier(self, node, cx))
    }
}

/// Marks every access to a field and its declaration.
#[derive(Debug, Clone)]
pub struct FindFieldReferences {
    matcher: FieldMatcher,
}

impl FindFieldReferences {
    pub fn new(owner: &str, field: &str) -> Self {
        FindFieldReferences {
            matcher: FieldMatcher::new(owner, field),
        }
    }
}

impl JavaVisitor for FindFieldReferences {
    fn visit_import(&mut self, node: &Arc<Import>, _cx: &mut VisitCtx) -> J {
        J::Import(node.clone())
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, cx: &mut VisitCtx) -> J {
        let out = J::FieldAccess(walk_field_access(self, node, cx));
        if self.matcher.matches_access(node) {
            return mark(out);
        }
        out
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> J {
        let out = J::Identifier(walk_identifier(self, node, cx));
        let is_declaration = matches!(
            cx.cursor.parent_value(),
            Some(J::NamedVariable(v)) if v.name.id == node.id
        );
        if !is_declaration && !is_access_name(node, cx) && self.matcher.matches_identifier(node) {
            return mark(out);
        }
        out
    }

    fn visit_named_variable(&mut self, node: &Arc<NamedVariable>, cx: &mut VisitCtx) -> J {
        let out = J::NamedVariable(crate::visitor::walk_named_variable(self, node, cx));
        if node.var_type.as_ref().is_some_and(|v| self.matcher.matches(v)) {
            return mark(out);
        }
        out
    }
}
