// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rename a field of one class everywhere it is used.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::recipe::Recipe;
use crate::search::FieldMatcher;
use crate::tree::*;
use crate::type_visitor::{visit_type, visit_variable_type, walk_variable, JavaTypeVisitor};
use crate::types::type_utils::is_assignable_to;
use crate::types::{JavaType, VariableType};
use crate::validation::Validated;
use crate::visitor::{
    walk_class_decl, walk_field_access, walk_identifier, walk_named_variable, Iso, IsoAdapter,
    JavaIsoVisitor, JavaVisitor, VisitCtx,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeFieldNameOptions {
    /// Fully qualified name of the class declaring the field.
    pub class_name: String,
    pub old_field_name: String,
    pub new_field_name: String,
}

#[derive(Debug, Clone)]
pub struct ChangeFieldName {
    options: ChangeFieldNameOptions,
}

impl ChangeFieldName {
    pub fn new(options: ChangeFieldNameOptions) -> Self {
        ChangeFieldName { options }
    }

    pub fn options(&self) -> &ChangeFieldNameOptions {
        &self.options
    }
}

impl Recipe for ChangeFieldName {
    fn name(&self) -> &str {
        "ChangeFieldName"
    }

    fn display_name(&self) -> &str {
        "Change field name"
    }

    fn description(&self) -> &str {
        "Rename a field and every access to it, including accesses through subtypes."
    }

    fn validate(&self) -> Validated {
        Validated::class_name("class_name", &self.options.class_name)
            .and(Validated::identifier("old_field_name", &self.options.old_field_name))
            .and(Validated::identifier("new_field_name", &self.options.new_field_name))
    }

    fn visitor(&self) -> Box<dyn JavaVisitor> {
        Box::new(Iso(ChangeFieldNameVisitor::new(
            &self.options.class_name,
            &self.options.old_field_name,
            &self.options.new_field_name,
        )))
    }
}

/// Renames the field, its accesses and the variable types that describe it.
#[derive(Debug, Clone)]
pub struct ChangeFieldNameVisitor {
    matcher: FieldMatcher,
    to: String,
}

impl ChangeFieldNameVisitor {
    pub fn new(class_name: &str, from: &str, to: &str) -> Self {
        ChangeFieldNameVisitor {
            matcher: FieldMatcher::new(class_name, from),
            to: to.to_string(),
        }
    }

    fn rename_type(&self, ty: &JavaType) -> JavaType {
        visit_type(&mut self.type_renamer(), ty, &mut ())
    }

    fn rename_variable(&self, var: &Arc<VariableType>) -> Arc<VariableType> {
        visit_variable_type(&mut self.type_renamer(), var, &mut ())
    }

    fn type_renamer(&self) -> RenameFieldType<'_> {
        RenameFieldType {
            matcher: &self.matcher,
            to: &self.to,
        }
    }

    fn renamed(&self, ident: &Identifier) -> Arc<Identifier> {
        Arc::new(
            ident
                .with_name(&self.to)
                .with_field_type(ident.field_type.as_ref().map(|v| self.rename_variable(v))),
        )
    }

    /// A field access whose name is not attributed is matched through its
    /// target's type.
    fn matches_unattributed(&self, access: &FieldAccess, cx: &VisitCtx) -> bool {
        access.name.element.field_type.is_none()
            && access.simple_name() == self.matcher.name()
            && access
                .target
                .ty()
                .is_some_and(|t| is_assignable_to(self.matcher.owner(), &t, cx.classpath()))
    }
}

impl JavaIsoVisitor for ChangeFieldNameVisitor {
    fn visit_import(&mut self, node: &Arc<Import>, _cx: &mut VisitCtx) -> Arc<Import> {
        let imports_field = node.is_static()
            && node.type_name() == self.matcher.owner()
            && node.member_name() == Some(self.matcher.name());
        if !imports_field {
            return node.clone();
        }
        let name = node.qualid.name.element.with_name(&self.to);
        Arc::new(Import {
            qualid: Arc::new(node.qualid.with_name(Arc::new(name))),
            ..(**node).clone()
        })
    }

    fn visit_class_decl(&mut self, node: &Arc<ClassDecl>, cx: &mut VisitCtx) -> Arc<ClassDecl> {
        let node = walk_class_decl(&mut IsoAdapter(self), node, cx);
        let Some(ty) = &node.ty else {
            return node;
        };
        let renamed = self.rename_type(ty);
        if renamed.ptr_eq(ty) {
            return node;
        }
        Arc::new(ClassDecl {
            ty: Some(renamed),
            ..(*node).clone()
        })
    }

    fn visit_named_variable(&mut self, node: &Arc<NamedVariable>, cx: &mut VisitCtx) -> Arc<NamedVariable> {
        let node = walk_named_variable(&mut IsoAdapter(self), node, cx);
        if !node.is_field() {
            return node;
        }
        let Some(var) = &node.var_type else {
            return node;
        };
        let renamed = self.rename_variable(var);
        if Arc::ptr_eq(&renamed, var) {
            return node;
        }
        Arc::new(NamedVariable {
            var_type: Some(renamed),
            ..(*node).clone()
        })
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, cx: &mut VisitCtx) -> Arc<FieldAccess> {
        let node = walk_field_access(&mut IsoAdapter(self), node, cx);
        if self.matches_unattributed(&node, cx) {
            return Arc::new(node.with_name(self.renamed(&node.name.element)));
        }
        node
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> Arc<Identifier> {
        let node = walk_identifier(&mut IsoAdapter(self), node, cx);
        if self.matcher.matches_identifier(&node) {
            return self.renamed(&node);
        }
        node
    }
}

/// Renames the matching field wherever a type mentions it.
struct RenameFieldType<'a> {
    matcher: &'a FieldMatcher,
    to: &'a str,
}

impl JavaTypeVisitor<()> for RenameFieldType<'_> {
    fn visit_variable(&mut self, var: &Arc<VariableType>, p: &mut ()) -> JavaType {
        let var = walk_variable(self, var, p);
        if self.matcher.matches(&var) {
            return JavaType::Variable(Arc::new(var.with_name(self.to)));
        }
        JavaType::Variable(var)
    }
}
