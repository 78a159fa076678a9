// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal and rewriting of the type graph.
//!
//! [`JavaTypeVisitor`] follows the same discipline as the tree visitors: each
//! `visit_*` method defaults to a walk over the type's constituents, and a
//! type is rebuilt only when one of them changed. Unchanged types come back
//! as the very same `Arc`.
//!
//! Class references that would close a cycle are [`JavaType::Cyclic`]
//! markers placed when the types were built, so a traversal always
//! terminates without tracking what it has seen. `Cyclic`, `Primitive` and
//! `ShallowClass` are leaves.

use std::sync::Arc;

use crate::types::{
    ClassType, JavaType, MethodType, ParameterizedClassType, PrimitiveKind, TypeVariable,
    VariableType,
};

pub trait JavaTypeVisitor<P> {
    /// Called before the variant-specific method; may substitute the type.
    fn pre_visit(&mut self, ty: &JavaType, _p: &mut P) -> JavaType {
        ty.clone()
    }

    fn visit_class(&mut self, class: &Arc<ClassType>, p: &mut P) -> JavaType {
        JavaType::Class(walk_class(self, class, p))
    }

    fn visit_shallow_class(&mut self, ty: &JavaType, _fqn: &str, _p: &mut P) -> JavaType {
        ty.clone()
    }

    fn visit_parameterized(&mut self, ty: &Arc<ParameterizedClassType>, p: &mut P) -> JavaType {
        JavaType::Parameterized(walk_parameterized(self, ty, p))
    }

    fn visit_generic_type_variable(&mut self, var: &Arc<TypeVariable>, p: &mut P) -> JavaType {
        JavaType::GenericTypeVariable(walk_generic_type_variable(self, var, p))
    }

    fn visit_array(&mut self, ty: &JavaType, element: &Arc<JavaType>, p: &mut P) -> JavaType {
        let out = visit_type(self, element, p);
        if out.ptr_eq(element) {
            return ty.clone();
        }
        JavaType::array_of(out)
    }

    fn visit_primitive(&mut self, kind: PrimitiveKind, _p: &mut P) -> JavaType {
        JavaType::Primitive(kind)
    }

    fn visit_method(&mut self, method: &Arc<MethodType>, p: &mut P) -> JavaType {
        JavaType::Method(walk_method(self, method, p))
    }

    fn visit_variable(&mut self, var: &Arc<VariableType>, p: &mut P) -> JavaType {
        JavaType::Variable(walk_variable(self, var, p))
    }

    fn visit_multi_catch(&mut self, ty: &JavaType, alternatives: &Arc<Vec<JavaType>>, p: &mut P) -> JavaType {
        let mut t = Constituents::new(self);
        let out: Vec<JavaType> = alternatives.iter().map(|a| t.ty(a, p)).collect();
        if !t.changed {
            return ty.clone();
        }
        JavaType::MultiCatch(Arc::new(out))
    }

    fn visit_cyclic(&mut self, ty: &JavaType, _fqn: &str, _p: &mut P) -> JavaType {
        ty.clone()
    }
}

/// Visit `ty` with `v`.
pub fn visit_type<V: JavaTypeVisitor<P> + ?Sized, P>(v: &mut V, ty: &JavaType, p: &mut P) -> JavaType {
    let ty = v.pre_visit(ty, p);
    match &ty {
        JavaType::Class(c) => v.visit_class(c, p),
        JavaType::ShallowClass(fqn) => v.visit_shallow_class(&ty, fqn, p),
        JavaType::Parameterized(pt) => v.visit_parameterized(pt, p),
        JavaType::GenericTypeVariable(var) => v.visit_generic_type_variable(var, p),
        JavaType::Array(e) => v.visit_array(&ty, e, p),
        JavaType::Primitive(kind) => v.visit_primitive(*kind, p),
        JavaType::Method(m) => v.visit_method(m, p),
        JavaType::Variable(var) => v.visit_variable(var, p),
        JavaType::MultiCatch(alts) => v.visit_multi_catch(&ty, alts, p),
        JavaType::Cyclic(fqn) => v.visit_cyclic(&ty, fqn, p),
    }
}

/// Visit a variable type, keeping it a variable type.
///
/// A visitor that turns the variable into another kind of type leaves it
/// unchanged.
pub fn visit_variable_type<V: JavaTypeVisitor<P> + ?Sized, P>(
    v: &mut V,
    var: &Arc<VariableType>,
    p: &mut P,
) -> Arc<VariableType> {
    match visit_type(v, &JavaType::Variable(var.clone()), p) {
        JavaType::Variable(out) => out,
        _ => var.clone(),
    }
}

fn visit_method_type<V: JavaTypeVisitor<P> + ?Sized, P>(
    v: &mut V,
    method: &Arc<MethodType>,
    p: &mut P,
) -> Arc<MethodType> {
    match visit_type(v, &JavaType::Method(method.clone()), p) {
        JavaType::Method(out) => out,
        _ => method.clone(),
    }
}

/// Visits constituents and remembers whether any of them changed.
struct Constituents<'a, V: ?Sized> {
    v: &'a mut V,
    changed: bool,
}

impl<'a, V: ?Sized> Constituents<'a, V> {
    fn new(v: &'a mut V) -> Self {
        Constituents { v, changed: false }
    }

    fn ty<P>(&mut self, ty: &JavaType, p: &mut P) -> JavaType
    where
        V: JavaTypeVisitor<P>,
    {
        let out = visit_type(self.v, ty, p);
        self.changed |= !out.ptr_eq(ty);
        out
    }

    fn opt<P>(&mut self, ty: &Option<JavaType>, p: &mut P) -> Option<JavaType>
    where
        V: JavaTypeVisitor<P>,
    {
        ty.as_ref().map(|t| self.ty(t, p))
    }

    fn list<P>(&mut self, types: &[JavaType], p: &mut P) -> Vec<JavaType>
    where
        V: JavaTypeVisitor<P>,
    {
        types.iter().map(|t| self.ty(t, p)).collect()
    }

    fn variable<P>(&mut self, var: &Arc<VariableType>, p: &mut P) -> Arc<VariableType>
    where
        V: JavaTypeVisitor<P>,
    {
        let out = visit_variable_type(self.v, var, p);
        self.changed |= !Arc::ptr_eq(&out, var);
        out
    }

    fn method<P>(&mut self, method: &Arc<MethodType>, p: &mut P) -> Arc<MethodType>
    where
        V: JavaTypeVisitor<P>,
    {
        let out = visit_method_type(self.v, method, p);
        self.changed |= !Arc::ptr_eq(&out, method);
        out
    }
}

pub fn walk_class<V: JavaTypeVisitor<P> + ?Sized, P>(
    v: &mut V,
    class: &Arc<ClassType>,
    p: &mut P,
) -> Arc<ClassType> {
    let mut t = Constituents::new(v);
    let annotations = t.list(&class.annotations, p);
    let supertype = t.opt(&class.supertype, p);
    let interfaces = t.list(&class.interfaces, p);
    let members = class.members.iter().map(|m| t.variable(m, p)).collect();
    let methods = class.methods.iter().map(|m| t.method(m, p)).collect();
    let owning_class = t.opt(&class.owning_class, p);
    let type_parameters = t.list(&class.type_parameters, p);
    if !t.changed {
        return class.clone();
    }
    Arc::new(ClassType {
        annotations,
        supertype,
        interfaces,
        members,
        methods,
        owning_class,
        type_parameters,
        ..(**class).clone()
    })
}

pub fn walk_parameterized<V: JavaTypeVisitor<P> + ?Sized, P>(
    v: &mut V,
    ty: &Arc<ParameterizedClassType>,
    p: &mut P,
) -> Arc<ParameterizedClassType> {
    let mut t = Constituents::new(v);
    let base = t.ty(&ty.base, p);
    let type_args = t.list(&ty.type_args, p);
    if !t.changed {
        return ty.clone();
    }
    Arc::new(ParameterizedClassType { base, type_args })
}

pub fn walk_generic_type_variable<V: JavaTypeVisitor<P> + ?Sized, P>(
    v: &mut V,
    var: &Arc<TypeVariable>,
    p: &mut P,
) -> Arc<TypeVariable> {
    let mut t = Constituents::new(v);
    let bounds = t.list(&var.bounds, p);
    if !t.changed {
        return var.clone();
    }
    Arc::new(TypeVariable {
        name: var.name.clone(),
        bounds,
    })
}

pub fn walk_method<V: JavaTypeVisitor<P> + ?Sized, P>(
    v: &mut V,
    method: &Arc<MethodType>,
    p: &mut P,
) -> Arc<MethodType> {
    let mut t = Constituents::new(v);
    let annotations = t.list(&method.annotations, p);
    let declaring_type = t.ty(&method.declaring_type, p);
    let return_type = t.ty(&method.return_type, p);
    let param_types = t.list(&method.param_types, p);
    let thrown = t.list(&method.thrown, p);
    if !t.changed {
        return method.clone();
    }
    Arc::new(MethodType {
        annotations,
        declaring_type,
        return_type,
        param_types,
        thrown,
        ..(**method).clone()
    })
}

pub fn walk_variable<V: JavaTypeVisitor<P> + ?Sized, P>(
    v: &mut V,
    var: &Arc<VariableType>,
    p: &mut P,
) -> Arc<VariableType> {
    let mut t = Constituents::new(v);
    let annotations = t.list(&var.annotations, p);
    let owner = t.opt(&var.owner, p);
    let ty = t.ty(&var.ty, p);
    if !t.changed {
        return var.clone();
    }
    Arc::new(VariableType {
        annotations,
        owner,
        ty,
        ..(**var).clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassTypeBuilder, Classpath};

    struct Noop;
    impl JavaTypeVisitor<()> for Noop {}

    #[derive(Default)]
    struct CountLeaves {
        cyclic: usize,
        shallow: usize,
    }

    impl JavaTypeVisitor<()> for CountLeaves {
        fn visit_cyclic(&mut self, ty: &JavaType, _fqn: &str, _p: &mut ()) -> JavaType {
            self.cyclic += 1;
            ty.clone()
        }

        fn visit_shallow_class(&mut self, ty: &JavaType, _fqn: &str, _p: &mut ()) -> JavaType {
            self.shallow += 1;
            ty.clone()
        }
    }

    #[test]
    fn unchanged_types_keep_identity() {
        let cp = Classpath::standard();
        for fqn in ["java.util.HashMap", "java.lang.String", "java.util.List"] {
            let ty = JavaType::Class(cp.lookup(fqn).unwrap());
            assert!(visit_type(&mut Noop, &ty, &mut ()).ptr_eq(&ty), "{}", fqn);
        }
    }

    #[test]
    fn self_references_stop_at_cyclic_markers() {
        let builder = ClassTypeBuilder::class("a.Node");
        let me = builder.self_type();
        let node = builder
            .supertype(JavaType::shallow("java.lang.Object"))
            .field("next", me.clone())
            .method("copy", me, vec![])
            .build();
        let mut counter = CountLeaves::default();
        visit_type(&mut counter, &JavaType::class(node), &mut ());
        // next's type and owner, copy's return and declaring type
        assert_eq!(counter.cyclic, 4);
        // java.lang.Object supertype
        assert_eq!(counter.shallow, 1);
    }
}
