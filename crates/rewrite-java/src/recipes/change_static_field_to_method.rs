// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Replace reads of a static field with calls to a static method, such as
//! `Collections.EMPTY_LIST` with `Collections.emptyList()`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::recipe::Recipe;
use crate::search::{FieldMatcher, UsesField};
use crate::template::{Coordinates, JavaTemplate};
use crate::tree::*;
use crate::types::{package_of, simple_name, JavaType};
use crate::validation::Validated;
use crate::visitor::{walk_field_access, walk_identifier, JavaVisitor, VisitCtx};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeStaticFieldToMethodOptions {
    /// Fully qualified name of the class declaring the field.
    pub old_class_name: String,
    pub old_field_name: String,
    /// Fully qualified name of the class declaring the method; the old
    /// class when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_class_name: Option<String>,
    /// A static method taking no arguments.
    pub new_method_name: String,
}

impl ChangeStaticFieldToMethodOptions {
    pub fn new_class(&self) -> &str {
        match &self.new_class_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.old_class_name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeStaticFieldToMethod {
    options: ChangeStaticFieldToMethodOptions,
}

impl ChangeStaticFieldToMethod {
    pub fn new(options: ChangeStaticFieldToMethodOptions) -> Self {
        ChangeStaticFieldToMethod { options }
    }

    pub fn options(&self) -> &ChangeStaticFieldToMethodOptions {
        &self.options
    }
}

impl Recipe for ChangeStaticFieldToMethod {
    fn name(&self) -> &str {
        "ChangeStaticFieldToMethod"
    }

    fn display_name(&self) -> &str {
        "Change static field access to static method access"
    }

    fn description(&self) -> &str {
        "Migrate accesses to a static field to invocations of a static method."
    }

    fn validate(&self) -> Validated {
        let mut v = Validated::class_name("old_class_name", &self.options.old_class_name)
            .and(Validated::identifier("old_field_name", &self.options.old_field_name))
            .and(Validated::identifier("new_method_name", &self.options.new_method_name));
        if let Some(name) = &self.options.new_class_name {
            if !name.trim().is_empty() {
                v = v.and(Validated::class_name("new_class_name", name));
            }
        }
        v
    }

    fn applicability_test(&self) -> Option<Box<dyn JavaVisitor>> {
        Some(Box::new(UsesField::new(
            &self.options.old_class_name,
            &self.options.old_field_name,
        )))
    }

    fn visitor(&self) -> Box<dyn JavaVisitor> {
        Box::new(ChangeStaticFieldToMethodVisitor::new(&self.options))
    }
}

/// Declares the new method so the template resolves whether or not the
/// classpath knows the class.
fn method_stub(class_name: &str, method: &str) -> String {
    let package = package_of(class_name);
    let declaration = format!(
        "public class {} {{ public static java.lang.Object {}() {{ return null; }} }}",
        simple_name(class_name),
        method
    );
    if package.is_empty() {
        declaration
    } else {
        format!("package {}; {}", package, declaration)
    }
}

struct ChangeStaticFieldToMethodVisitor {
    matcher: FieldMatcher,
    template: JavaTemplate,
}

impl ChangeStaticFieldToMethodVisitor {
    fn new(options: &ChangeStaticFieldToMethodOptions) -> Self {
        let new_class = options.new_class();
        let code = format!("{}.{}()", simple_name(new_class), options.new_method_name);
        let mut builder = JavaTemplate::builder(&code)
            .depends_on(&method_stub(new_class, &options.new_method_name))
            .expression();
        if !package_of(new_class).is_empty() {
            builder = builder.imports([new_class]);
        }
        ChangeStaticFieldToMethodVisitor {
            matcher: FieldMatcher::new(&options.old_class_name, &options.old_field_name),
            template: builder.build(),
        }
    }

    /// Replace `tree`, a read of the field, with the method call.
    ///
    /// The call keeps the prefix and the type of what it replaces.
    fn replace(&self, tree: J, cx: &mut VisitCtx) -> J {
        let call = match self.template.apply(cx, Coordinates::Replace(&tree), &[]) {
            Ok(call) => call,
            Err(err) => {
                cx.exec.record_failure(tree.id(), err);
                return tree;
            }
        };
        cx.maybe_remove_import(self.matcher.owner());
        match (call, tree.ty()) {
            (J::MethodInvocation(mi), Some(ty)) => J::from(with_return_type(&mi, ty)),
            (call, _) => call,
        }
    }
}

fn with_return_type(mi: &MethodInvocation, ty: JavaType) -> MethodInvocation {
    let Some(method) = &mi.method_type else {
        return mi.clone();
    };
    let method = Arc::new(method.with_return_type(ty));
    MethodInvocation {
        name: Arc::new(mi.name.with_type(Some(JavaType::Method(method.clone())))),
        ..mi.with_method_type(Some(method))
    }
}

/// True if the identifier on top of the cursor fills a slot that only
/// holds identifiers.
fn in_name_slot(ident: &Identifier, cx: &VisitCtx) -> bool {
    match cx.cursor.parent_value() {
        Some(J::FieldAccess(fa)) => fa.name.element.id == ident.id,
        Some(J::NamedVariable(v)) => v.name.id == ident.id,
        Some(J::MethodInvocation(mi)) => mi.name.id == ident.id,
        Some(J::MethodDecl(m)) => m.name.id == ident.id,
        Some(J::ClassDecl(c)) => c.name.id == ident.id,
        _ => false,
    }
}

impl JavaVisitor for ChangeStaticFieldToMethodVisitor {
    fn visit_import(&mut self, node: &Arc<Import>, _cx: &mut VisitCtx) -> J {
        J::Import(node.clone())
    }

    fn visit_field_access(&mut self, node: &Arc<FieldAccess>, cx: &mut VisitCtx) -> J {
        if self.matcher.matches_access(node) {
            return self.replace(J::FieldAccess(node.clone()), cx);
        }
        J::FieldAccess(walk_field_access(self, node, cx))
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> J {
        let node = walk_identifier(self, node, cx);
        if !in_name_slot(&node, cx) && self.matcher.matches_identifier(&node) {
            return self.replace(J::Identifier(node), cx);
        }
        J::Identifier(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::finalize_imports;
    use crate::parser::JavaParser;
    use crate::visitor::{visit_unit, ExecutionContext};

    fn options(new_class_name: Option<&str>) -> ChangeStaticFieldToMethodOptions {
        ChangeStaticFieldToMethodOptions {
            old_class_name: "java.util.Collections".to_string(),
            old_field_name: "EMPTY_LIST".to_string(),
            new_class_name: new_class_name.map(str::to_string),
            new_method_name: "emptyList".to_string(),
        }
    }

    fn run(source: &str, options: &ChangeStaticFieldToMethodOptions) -> (String, usize) {
        let parsed = JavaParser::standard().parse_all(&[source]).unwrap();
        let mut cx = VisitCtx::new(ExecutionContext::new(Arc::new(parsed.classpath)));
        let mut visitor = ChangeStaticFieldToMethodVisitor::new(options);
        let out = visit_unit(&mut visitor, &parsed.units[0], &mut cx);
        let failures = cx.exec.failures().len();
        let (_, effects) = cx.finish();
        let out = finalize_imports(&out, &effects.add_imports, &effects.remove_imports);
        (J::from(out).print(), failures)
    }

    #[test]
    fn new_class_defaults_to_old_class() {
        assert_eq!(options(None).new_class(), "java.util.Collections");
        assert_eq!(options(Some(" ")).new_class(), "java.util.Collections");
        assert_eq!(options(Some("java.util.List")).new_class(), "java.util.List");
    }

    #[test]
    fn stub_declares_the_method() {
        assert_eq!(
            method_stub("b.NewHolder", "make"),
            "package b; public class NewHolder { public static java.lang.Object make() { return null; } }"
        );
        assert!(method_stub("Top", "make").starts_with("public class Top {"));
    }

    #[test]
    fn qualified_access_becomes_a_call() {
        let (out, failures) = run(
            "import java.util.Collections;\nimport java.util.List;\n\nclass A { List l = Collections.EMPTY_LIST; }",
            &options(None),
        );
        assert_eq!(failures, 0);
        assert_eq!(
            out,
            "import java.util.Collections;\nimport java.util.List;\n\nclass A { List l = Collections.emptyList(); }"
        );
    }

    #[test]
    fn call_keeps_the_field_type() {
        let parsed = JavaParser::standard()
            .parse_all(&["import java.util.Collections;\nclass A { Object o = Collections.EMPTY_LIST; }"])
            .unwrap();
        let mut cx = VisitCtx::new(ExecutionContext::new(Arc::new(parsed.classpath)));
        let mut visitor = ChangeStaticFieldToMethodVisitor::new(&options(None));
        let out = visit_unit(&mut visitor, &parsed.units[0], &mut cx);
        let decls = out.classes[0].body.statements[0].element.as_variable_decls().unwrap().clone();
        let init = decls.variables().next().unwrap().initializer.as_ref().unwrap().element.clone();
        assert_eq!(
            init.ty().and_then(|t| t.fully_qualified_name().map(str::to_string)).as_deref(),
            Some("java.util.List")
        );
    }

    #[test]
    fn options_round_trip_through_json() {
        let json = r#"{"old_class_name":"a.Holder","old_field_name":"OLD","new_method_name":"make"}"#;
        let parsed: ChangeStaticFieldToMethodOptions = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.new_class_name, None);
        assert_eq!(parsed.new_class(), "a.Holder");
        assert!(serde_json::from_str::<ChangeStaticFieldToMethodOptions>(r#"{"bogus":1}"#).is_err());
    }
}
