// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Structural type comparisons and member lookup.
//!
//! Types are compared by fully qualified name, never by reference. Lookups
//! walk the supertype and interface hierarchy through the [`Classpath`],
//! substituting type arguments on the way so that `get` on a
//! `List<String>` yields `String`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{ClassType, Classpath, JavaType, MethodType, ParameterizedClassType, VariableType};

/// True if `a` and `b` denote the same type.
pub fn is_of_type(a: &JavaType, b: &JavaType) -> bool {
    match (a, b) {
        (JavaType::Primitive(x), JavaType::Primitive(y)) => x == y,
        (JavaType::Array(x), JavaType::Array(y)) => is_of_type(x, y),
        (JavaType::Parameterized(x), JavaType::Parameterized(y)) => {
            is_of_type(&x.base, &y.base)
                && x.type_args.len() == y.type_args.len()
                && x.type_args
                    .iter()
                    .zip(&y.type_args)
                    .all(|(p, q)| is_of_type(p, q))
        }
        (JavaType::GenericTypeVariable(x), JavaType::GenericTypeVariable(y)) => x.name == y.name,
        (JavaType::Method(x), JavaType::Method(y)) => {
            x.name == y.name
                && is_of_type(&x.declaring_type, &y.declaring_type)
                && x.param_types.len() == y.param_types.len()
                && x.param_types
                    .iter()
                    .zip(&y.param_types)
                    .all(|(p, q)| is_of_type(p, q))
        }
        (JavaType::Variable(x), JavaType::Variable(y)) => {
            x.name == y.name && x.owner_name() == y.owner_name()
        }
        (JavaType::MultiCatch(x), JavaType::MultiCatch(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| is_of_type(p, q))
        }
        (JavaType::Parameterized(_), _) | (_, JavaType::Parameterized(_)) => false,
        _ => match (a.fully_qualified_name(), b.fully_qualified_name()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// True if `ty` is the class (or a parameterization of the class) `fqn`.
pub fn is_of_class_type(ty: Option<&JavaType>, fqn: &str) -> bool {
    match ty {
        Some(JavaType::Variable(v)) => is_of_class_type(Some(&v.ty), fqn),
        Some(t) => t.fully_qualified_name() == Some(fqn),
        None => false,
    }
}

/// True if a value of type `ty` can be assigned to the class `fqn`.
pub fn is_assignable_to(fqn: &str, ty: &JavaType, classpath: &Classpath) -> bool {
    match ty {
        JavaType::Primitive(_) | JavaType::Method(_) => false,
        JavaType::Array(_) => fqn == "java.lang.Object",
        JavaType::Variable(v) => is_assignable_to(fqn, &v.ty, classpath),
        JavaType::GenericTypeVariable(v) => {
            fqn == "java.lang.Object"
                || v.bounds.iter().any(|b| is_assignable_to(fqn, b, classpath))
        }
        JavaType::MultiCatch(alts) => alts.iter().all(|a| is_assignable_to(fqn, a, classpath)),
        _ => {
            if fqn == "java.lang.Object" {
                return true;
            }
            let mut visited = HashSet::new();
            is_subclass(fqn, ty, classpath, &mut visited)
        }
    }
}

fn is_subclass(fqn: &str, ty: &JavaType, cp: &Classpath, visited: &mut HashSet<Arc<str>>) -> bool {
    let Some(name) = ty.fully_qualified_name() else {
        return false;
    };
    if name == fqn {
        return true;
    }
    if !visited.insert(Arc::from(name)) {
        return false;
    }
    let Some(class) = cp.resolve(ty) else {
        return false;
    };
    class
        .supertype
        .iter()
        .chain(class.interfaces.iter())
        .any(|s| is_subclass(fqn, s, cp, visited))
}

/// Replace type variables named in `bindings`.
pub fn substitute(ty: &JavaType, bindings: &HashMap<Arc<str>, JavaType>) -> JavaType {
    if bindings.is_empty() {
        return ty.clone();
    }
    match ty {
        JavaType::GenericTypeVariable(v) => match bindings.get(&v.name) {
            Some(bound) => bound.clone(),
            None => ty.clone(),
        },
        JavaType::Parameterized(p) => JavaType::Parameterized(Arc::new(ParameterizedClassType {
            base: p.base.clone(),
            type_args: p.type_args.iter().map(|a| substitute(a, bindings)).collect(),
        })),
        JavaType::Array(e) => JavaType::array_of(substitute(e, bindings)),
        _ => ty.clone(),
    }
}

fn bindings_for(class_params: &[JavaType], receiver: &JavaType) -> HashMap<Arc<str>, JavaType> {
    let args = receiver.type_arguments();
    class_params
        .iter()
        .zip(args)
        .filter_map(|(param, arg)| match param {
            JavaType::GenericTypeVariable(v) => Some((v.name.clone(), arg.clone())),
            _ => None,
        })
        .collect()
}

/// Walk `receiver` and its supertypes until `f` finds something, with
/// type arguments bound at each level.
fn find_in_hierarchy<T>(
    receiver: &JavaType,
    classpath: &Classpath,
    f: &mut dyn FnMut(&JavaType, &ClassType, &HashMap<Arc<str>, JavaType>) -> Option<T>,
) -> Option<T> {
    let mut visited = HashSet::new();
    let mut queue = vec![receiver.clone()];
    while let Some(current) = queue.pop() {
        let Some(class) = classpath.resolve(&current) else {
            continue;
        };
        if !visited.insert(class.fqn.clone()) {
            continue;
        }
        let bindings = bindings_for(&class.type_parameters, &current);
        if let Some(found) = f(&current, &class, &bindings) {
            return Some(found);
        }
        // Interfaces pushed first so the superclass chain is searched first.
        for interface in class.interfaces.iter().rev() {
            queue.push(substitute(interface, &bindings));
        }
        if let Some(supertype) = &class.supertype {
            queue.push(substitute(supertype, &bindings));
        }
    }
    None
}

/// The field `name` visible on `receiver`, with its type bound to the
/// receiver's type arguments.
pub fn find_field(receiver: &JavaType, name: &str, classpath: &Classpath) -> Option<Arc<VariableType>> {
    find_in_hierarchy(receiver, classpath, &mut |_, class, bindings| {
        class.member(name).map(|m| {
            if bindings.is_empty() {
                m.clone()
            } else {
                Arc::new(m.with_type(substitute(&m.ty, bindings)))
            }
        })
    })
}

/// The method `name` taking `arity` arguments visible on `receiver`.
pub fn find_method(
    receiver: &JavaType,
    name: &str,
    arity: usize,
    classpath: &Classpath,
) -> Option<Arc<MethodType>> {
    find_in_hierarchy(receiver, classpath, &mut |_, class, bindings| {
        class.method(name, arity).map(|m| {
            if bindings.is_empty() {
                m.clone()
            } else {
                Arc::new(MethodType {
                    return_type: substitute(&m.return_type, bindings),
                    param_types: m.param_types.iter().map(|p| substitute(p, bindings)).collect(),
                    ..(**m).clone()
                })
            }
        })
    })
}

/// The class itself followed by every class and interface it extends.
pub fn supertypes(ty: &JavaType, classpath: &Classpath) -> Vec<Arc<str>> {
    let mut out = Vec::new();
    find_in_hierarchy::<()>(ty, classpath, &mut |_, class, _| {
        out.push(class.fqn.clone());
        None
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassTypeBuilder, PrimitiveKind};

    fn string() -> JavaType {
        JavaType::shallow("java.lang.String")
    }

    fn list_of_string() -> JavaType {
        JavaType::parameterized(JavaType::shallow("java.util.ArrayList"), vec![string()])
    }

    #[test]
    fn structural_identity() {
        let a = JavaType::shallow("a.Foo");
        let b = JavaType::cyclic("a.Foo");
        assert!(is_of_type(&a, &b));
        assert!(!is_of_type(&a, &JavaType::shallow("a.Bar")));
        assert!(!is_of_type(&a, &JavaType::parameterized(a.clone(), vec![string()])));
        assert!(is_of_class_type(Some(&list_of_string()), "java.util.ArrayList"));
        assert!(!is_of_class_type(None, "java.util.ArrayList"));
    }

    #[test]
    fn assignability_walks_hierarchy() {
        let cp = Classpath::standard();
        let ty = list_of_string();
        assert!(is_assignable_to("java.util.List", &ty, &cp));
        assert!(is_assignable_to("java.util.Collection", &ty, &cp));
        assert!(is_assignable_to("java.lang.Object", &ty, &cp));
        assert!(!is_assignable_to("java.util.Map", &ty, &cp));
        let linked = JavaType::shallow("java.util.LinkedHashMap");
        assert!(is_assignable_to("java.util.Map", &linked, &cp));
        assert!(!is_assignable_to(
            "java.lang.Object",
            &JavaType::Primitive(PrimitiveKind::Int),
            &cp
        ));
    }

    #[test]
    fn method_lookup_binds_type_arguments() {
        let cp = Classpath::standard();
        let get = find_method(&list_of_string(), "get", 1, &cp).unwrap();
        assert_eq!(get.return_type.fully_qualified_name(), Some("java.lang.String"));
        let size = find_method(&list_of_string(), "size", 0, &cp).unwrap();
        assert!(size.return_type.is_primitive());
        let to_string = find_method(&list_of_string(), "toString", 0, &cp).unwrap();
        assert_eq!(to_string.declaring_type.fully_qualified_name(), Some("java.lang.Object"));
        assert!(find_method(&list_of_string(), "nope", 0, &cp).is_none());
    }

    #[test]
    fn field_lookup_reaches_superclass() {
        let foo = ClassTypeBuilder::class("a.Foo")
            .field("count", JavaType::Primitive(PrimitiveKind::Int))
            .build();
        let sub = ClassTypeBuilder::class("a.SubFoo")
            .supertype(JavaType::shallow("a.Foo"))
            .build();
        let cp = Classpath::standard().with_class(foo).with_class(sub);
        let field = find_field(&JavaType::shallow("a.SubFoo"), "count", &cp).unwrap();
        assert_eq!(field.owner_name(), Some("a.Foo"));
        assert!(is_assignable_to("a.Foo", &JavaType::shallow("a.SubFoo"), &cp));
        assert_eq!(
            supertypes(&JavaType::shallow("a.SubFoo"), &cp)
                .iter()
                .map(|s| &**s)
                .collect::<Vec<_>>(),
            vec!["a.SubFoo", "a.Foo"]
        );
    }
}
