// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Import maintenance at the end of a pass.
//!
//! Visitors only request import changes ([`VisitCtx::maybe_add_import`],
//! [`VisitCtx::maybe_remove_import`]); [`finalize_imports`] honors them once
//! the pass is over, against a scan of the whole unit:
//!
//! - an import is removed only if nothing outside the import declarations
//!   still refers to it;
//! - an import is added only if the unit refers to the type by its simple
//!   name and no existing import (single or wildcard) already covers it.
//!   Types in `java.lang` and in the unit's own package are never imported.
//!
//! New imports are inserted in sorted position, one per line.
//!
//! [`VisitCtx::maybe_add_import`]: crate::visitor::VisitCtx::maybe_add_import
//! [`VisitCtx::maybe_remove_import`]: crate::visitor::VisitCtx::maybe_remove_import

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::tree::*;
use crate::types::{package_of, simple_name, Flags};
use crate::visitor::{
    visit_unit, walk_identifier, walk_method_invocation, ImportRequest, JavaVisitor, VisitCtx,
};

/// Apply requested import additions and removals to `unit`.
///
/// Returns `unit` itself when nothing changes.
pub fn finalize_imports(
    unit: &Arc<CompilationUnit>,
    add: &[ImportRequest],
    remove: &[ImportRequest],
) -> Arc<CompilationUnit> {
    if add.is_empty() && remove.is_empty() {
        return unit.clone();
    }
    let refs = References::collect(unit);
    let mut imports = unit.imports.clone();
    let before = imports.len();

    for request in remove {
        imports = remove_import(imports, request, &refs);
    }
    let removed = before - imports.len();

    let package = unit.package_name().unwrap_or_default();
    let mut added = 0;
    for request in add {
        if should_add(&imports, request, &refs, &package) {
            imports = insert_import(imports, request, unit.package.is_some());
            added += 1;
        }
    }

    if added == 0 && removed == 0 {
        return unit.clone();
    }
    debug!(added, removed, "updated imports");

    let mut classes = unit.classes.clone();
    if let Some(first) = classes.first_mut() {
        let prefix = class_prefix(
            &first.prefix,
            before > 0,
            !imports.is_empty(),
            unit.package.is_some(),
        );
        if prefix != first.prefix {
            *first = <ClassDecl as TreeKind>::with_prefix(first, prefix);
        }
    }
    Arc::new(CompilationUnit {
        imports,
        classes,
        ..(**unit).clone()
    })
}

/// Names the unit refers to outside its import declarations.
#[derive(Debug, Default)]
struct References {
    /// Types referred to by simple name.
    types: HashSet<String>,
    /// `(type, member)` for static members used unqualified.
    members: HashSet<(String, String)>,
}

impl References {
    fn collect(unit: &Arc<CompilationUnit>) -> References {
        let mut refs = References::default();
        visit_unit(&mut refs, unit, &mut VisitCtx::scratch());
        refs
    }

    fn uses_type(&self, fqn: &str) -> bool {
        self.types.contains(fqn)
    }

    fn uses_member(&self, type_name: &str, member: &str) -> bool {
        self.members
            .iter()
            .any(|(t, m)| t == type_name && (member == "*" || m == member))
    }

    fn uses_package(&self, package: &str) -> bool {
        self.types.iter().any(|t| package_of(t) == package)
    }
}

impl JavaVisitor for References {
    fn visit_import(&mut self, node: &Arc<Import>, _cx: &mut VisitCtx) -> J {
        J::Import(node.clone())
    }

    fn visit_identifier(&mut self, node: &Arc<Identifier>, cx: &mut VisitCtx) -> J {
        let in_name_slot = match cx.cursor.parent_value() {
            Some(J::FieldAccess(fa)) => fa.name.element.id == node.id,
            Some(J::MethodInvocation(mi)) => mi.name.id == node.id,
            _ => false,
        };
        if !in_name_slot {
            match (&node.field_type, &node.ty) {
                (Some(var), _) if var.flags.contains(Flags::STATIC) => {
                    if let Some(owner) = var.owner_name() {
                        self.members.insert((owner.to_string(), node.name.to_string()));
                    }
                }
                (None, Some(ty)) => {
                    if let Some(fqn) = ty.fully_qualified_name() {
                        if simple_name(fqn) == &*node.name {
                            self.types.insert(fqn.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
        J::Identifier(walk_identifier(self, node, cx))
    }

    fn visit_method_invocation(&mut self, node: &Arc<MethodInvocation>, cx: &mut VisitCtx) -> J {
        if node.select.is_none() {
            if let Some(owner) = node
                .method_type
                .as_ref()
                .filter(|m| m.flags.contains(Flags::STATIC))
                .and_then(|m| m.declaring_type.fully_qualified_name())
            {
                self.members
                    .insert((owner.to_string(), node.simple_name().to_string()));
            }
        }
        J::MethodInvocation(walk_method_invocation(self, node, cx))
    }
}

fn import_name(fqn: &str) -> String {
    fqn.replace('$', ".")
}

fn remove_import(
    imports: Vec<Trailing<Arc<Import>>>,
    request: &ImportRequest,
    refs: &References,
) -> Vec<Trailing<Arc<Import>>> {
    let wanted = import_name(&request.type_name);
    let package = package_of(&request.type_name);
    let mut kept: Vec<Trailing<Arc<Import>>> = Vec::with_capacity(imports.len());
    let mut carried: Option<Space> = None;
    for (index, import) in imports.into_iter().enumerate() {
        let i = &import.element;
        let drop = if i.is_static() {
            i.type_name() == wanted
                && match (&request.member, i.member_name()) {
                    (Some(requested), Some(member)) => {
                        (requested == member || member == "*")
                            && !refs.uses_member(&request.type_name, member)
                    }
                    (None, Some(member)) => !refs.uses_member(&request.type_name, member),
                    _ => false,
                }
        } else if request.member.is_some() {
            false
        } else if i.is_wildcard() {
            i.package_name() == package && !refs.uses_package(package)
        } else {
            i.qualified_name() == wanted && !refs.uses_type(&request.type_name)
        };
        if drop {
            if index == 0 {
                carried = Some(i.prefix.clone());
            }
            continue;
        }
        match carried.take() {
            Some(prefix) if kept.is_empty() => kept.push(
                import.with_element(<Import as TreeKind>::with_prefix(&import.element, prefix)),
            ),
            _ => kept.push(import),
        }
    }
    kept
}

fn should_add(
    imports: &[Trailing<Arc<Import>>],
    request: &ImportRequest,
    refs: &References,
    package: &str,
) -> bool {
    let type_name = &request.type_name;
    let wanted = import_name(type_name);
    match &request.member {
        Some(member) => {
            refs.uses_member(type_name, member)
                && !imports.iter().any(|i| {
                    let i = &i.element;
                    i.is_static()
                        && i.type_name() == wanted
                        && i.member_name().is_some_and(|m| m == member || m == "*")
                })
        }
        None => {
            let type_package = package_of(type_name);
            !type_package.is_empty()
                && type_package != package
                && !(type_package == "java.lang" && !type_name.contains('$'))
                && refs.uses_type(type_name)
                && !imports.iter().any(|i| {
                    let i = &i.element;
                    !i.is_static()
                        && (i.qualified_name() == wanted
                            || (i.is_wildcard() && i.package_name() == type_package))
                })
        }
    }
}

fn insert_import(
    mut imports: Vec<Trailing<Arc<Import>>>,
    request: &ImportRequest,
    has_package: bool,
) -> Vec<Trailing<Arc<Import>>> {
    let statik = request.member.is_some();
    let name = match &request.member {
        Some(member) => format!("{}.{}", import_name(&request.type_name), member),
        None => import_name(&request.type_name),
    };
    let key = (statik, name.clone());
    let at = imports
        .iter()
        .position(|i| (i.element.is_static(), i.element.qualified_name()) > key)
        .unwrap_or(imports.len());

    let prefix = if at == 0 {
        match imports.first() {
            Some(first) => first.element.prefix.clone(),
            None if has_package => Space::format("\n\n"),
            None => Space::EMPTY,
        }
    } else {
        Space::newline("")
    };
    let import = match Import::build(prefix, &name, statik) {
        Some(import) => Arc::new(import),
        None => return imports,
    };
    if at == 0 {
        if let Some(first) = imports.first_mut() {
            first.element = <Import as TreeKind>::with_prefix(&first.element, Space::newline(""));
        }
    }
    imports.insert(at, Trailing::bare(import));
    imports
}

/// The first class's prefix after imports changed: separated from imports
/// by a blank line, and free of leading blank lines when nothing precedes
/// it anymore.
fn class_prefix(prefix: &Space, had_imports: bool, has_imports: bool, has_package: bool) -> Space {
    let text = prefix.as_str();
    if has_imports && !text.starts_with("\n\n") {
        return Space::format(&format!("\n\n{}", text.trim_start_matches('\n')));
    }
    if had_imports && !has_imports && !has_package {
        return Space::format(text.trim_start_matches('\n'));
    }
    prefix.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JavaParser;

    fn unit(sources: &[&str]) -> Arc<CompilationUnit> {
        JavaParser::standard()
            .parse_all(sources)
            .unwrap()
            .units
            .remove(0)
    }

    fn print(unit: &Arc<CompilationUnit>) -> String {
        J::from(unit.clone()).print()
    }

    mod removal {
        use super::*;

        #[test]
        fn unused_import_is_removed() {
            let u = unit(&["package a;\n\nimport java.util.List;\nimport java.util.Map;\n\nclass A { Map m; }\n"]);
            let out = finalize_imports(&u, &[], &[ImportRequest::of_type("java.util.List")]);
            assert_eq!(print(&out), "package a;\n\nimport java.util.Map;\n\nclass A { Map m; }\n");
        }

        #[test]
        fn used_import_is_kept() {
            let u = unit(&["import java.util.List;\n\nclass A { List l; }\n"]);
            let out = finalize_imports(&u, &[], &[ImportRequest::of_type("java.util.List")]);
            assert!(Arc::ptr_eq(&out, &u));
        }

        #[test]
        fn last_import_without_package() {
            let u = unit(&["import java.util.List;\n\nclass A { }\n"]);
            let out = finalize_imports(&u, &[], &[ImportRequest::of_type("java.util.List")]);
            assert_eq!(print(&out), "class A { }\n");
        }
    }

    mod addition {
        use super::*;

        const HOLDER: &str = "package b; public class Holder { public static int N; }";

        #[test]
        fn referenced_type_is_imported() {
            let u = unit(&["package a;\n\nimport b.Holder;\n\nclass A { Holder h; }\n", HOLDER]);
            let bare = Arc::new(u.with_imports(Vec::new()));
            let out = finalize_imports(&bare, &[ImportRequest::of_type("b.Holder")], &[]);
            assert_eq!(print(&out), "package a;\n\nimport b.Holder;\n\nclass A { Holder h; }\n");
        }

        #[test]
        fn qualified_use_needs_no_import() {
            let u = unit(&["package a;\n\nclass A { b.Holder h; }\n", HOLDER]);
            let out = finalize_imports(&u, &[ImportRequest::of_type("b.Holder")], &[]);
            assert!(Arc::ptr_eq(&out, &u));
        }

        #[test]
        fn java_lang_and_same_package_are_skipped() {
            let u = unit(&["package a;\n\nclass A { String s; B b; }\n", "package a; class B { }"]);
            let out = finalize_imports(
                &u,
                &[
                    ImportRequest::of_type("java.lang.String"),
                    ImportRequest::of_type("a.B"),
                ],
                &[],
            );
            assert!(Arc::ptr_eq(&out, &u));
        }

        #[test]
        fn wildcard_covers_type() {
            let u = unit(&["import java.util.*;\n\nclass A { Map m; }\n"]);
            let out = finalize_imports(&u, &[ImportRequest::of_type("java.util.Map")], &[]);
            assert!(Arc::ptr_eq(&out, &u));
        }
    }

    #[test]
    fn sorted_insertion() {
        let imports = unit(&["import java.util.List;\nimport java.util.Set;\n\nclass A { List l; Set s; }\n"])
            .imports
            .clone();
        let out = insert_import(imports, &ImportRequest::of_type("java.util.Map"), false);
        let names: Vec<String> = out.iter().map(|i| i.element.qualified_name()).collect();
        assert_eq!(names, vec!["java.util.List", "java.util.Map", "java.util.Set"]);
        assert_eq!(out[1].element.prefix.as_str(), "\n");
    }

    #[test]
    fn prefix_of_first_class() {
        assert_eq!(class_prefix(&Space::EMPTY, false, true, false).as_str(), "\n\n");
        assert_eq!(class_prefix(&Space::format("\n\n"), true, false, false).as_str(), "");
        assert_eq!(class_prefix(&Space::format("\n\n"), true, false, true).as_str(), "\n\n");
    }
}
