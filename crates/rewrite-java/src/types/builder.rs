// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use super::{ClassKind, ClassType, Flags, JavaType, MethodType, VariableType};

/// Builds a [`ClassType`] whose self references are [`JavaType::Cyclic`].
///
/// Members are owned by, and methods declared on, `Cyclic(fqn)` rather than
/// the class itself; callers that need the class as a field or parameter
/// type use [`ClassTypeBuilder::self_type`].
///
/// ```
/// use rewrite_java::types::{ClassTypeBuilder, JavaType, PrimitiveKind};
///
/// let mut node = ClassTypeBuilder::class("a.Node");
/// let me = node.self_type();
/// let node = node
///     .field("next", me)
///     .field("value", JavaType::Primitive(PrimitiveKind::Int))
///     .build();
/// assert!(matches!(node.members[0].ty, JavaType::Cyclic(_)));
/// ```
#[derive(Debug, Clone)]
pub struct ClassTypeBuilder {
    fqn: Arc<str>,
    kind: ClassKind,
    flags: Flags,
    supertype: Option<JavaType>,
    interfaces: Vec<JavaType>,
    members: Vec<(Arc<str>, JavaType, Flags)>,
    methods: Vec<MethodSpec>,
    owning_class: Option<JavaType>,
    type_parameters: Vec<JavaType>,
}

#[derive(Debug, Clone)]
struct MethodSpec {
    name: Arc<str>,
    flags: Flags,
    return_type: JavaType,
    param_names: Vec<Arc<str>>,
    param_types: Vec<JavaType>,
}

impl ClassTypeBuilder {
    pub fn new(fqn: &str, kind: ClassKind) -> Self {
        ClassTypeBuilder {
            fqn: Arc::from(fqn),
            kind,
            flags: Flags::PUBLIC,
            supertype: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            methods: Vec::new(),
            owning_class: None,
            type_parameters: Vec::new(),
        }
    }

    pub fn class(fqn: &str) -> Self {
        Self::new(fqn, ClassKind::Class)
    }

    pub fn interface(fqn: &str) -> Self {
        let mut b = Self::new(fqn, ClassKind::Interface);
        b.flags = Flags::PUBLIC | Flags::ABSTRACT;
        b
    }

    /// The reference to use for this class inside its own members.
    pub fn self_type(&self) -> JavaType {
        JavaType::Cyclic(self.fqn.clone())
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn supertype(mut self, supertype: JavaType) -> Self {
        self.supertype = Some(supertype);
        self
    }

    pub fn implements(mut self, interface: JavaType) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn owning_class(mut self, owner: JavaType) -> Self {
        self.owning_class = Some(owner);
        self
    }

    pub fn type_parameter(mut self, name: &str) -> Self {
        self.type_parameters.push(JavaType::type_variable(name));
        self
    }

    pub fn field(self, name: &str, ty: JavaType) -> Self {
        self.field_with_flags(name, ty, Flags::PUBLIC)
    }

    pub fn static_field(self, name: &str, ty: JavaType) -> Self {
        self.field_with_flags(name, ty, Flags::PUBLIC | Flags::STATIC | Flags::FINAL)
    }

    pub fn field_with_flags(mut self, name: &str, ty: JavaType, flags: Flags) -> Self {
        self.members.push((Arc::from(name), ty, flags));
        self
    }

    pub fn method(self, name: &str, return_type: JavaType, params: Vec<JavaType>) -> Self {
        self.method_with_flags(name, return_type, params, Flags::PUBLIC)
    }

    pub fn static_method(self, name: &str, return_type: JavaType, params: Vec<JavaType>) -> Self {
        self.method_with_flags(name, return_type, params, Flags::PUBLIC | Flags::STATIC)
    }

    pub fn method_with_flags(
        mut self,
        name: &str,
        return_type: JavaType,
        params: Vec<JavaType>,
        flags: Flags,
    ) -> Self {
        let param_names = (0..params.len())
            .map(|i| Arc::from(format!("arg{}", i).as_str()))
            .collect();
        self.methods.push(MethodSpec {
            name: Arc::from(name),
            flags,
            return_type,
            param_names,
            param_types: params,
        });
        self
    }

    pub fn build(self) -> ClassType {
        let me = JavaType::Cyclic(self.fqn.clone());
        let members = self
            .members
            .into_iter()
            .map(|(name, ty, flags)| {
                Arc::new(VariableType {
                    name,
                    owner: Some(me.clone()),
                    ty,
                    flags,
                    annotations: Vec::new(),
                })
            })
            .collect();
        let methods = self
            .methods
            .into_iter()
            .map(|m| {
                Arc::new(MethodType {
                    declaring_type: me.clone(),
                    name: m.name,
                    flags: m.flags,
                    return_type: m.return_type,
                    param_names: m.param_names,
                    param_types: m.param_types,
                    thrown: Vec::new(),
                    annotations: Vec::new(),
                })
            })
            .collect();
        ClassType {
            fqn: self.fqn,
            kind: self.kind,
            flags: self.flags,
            supertype: self.supertype,
            interfaces: self.interfaces,
            members,
            methods,
            owning_class: self.owning_class,
            type_parameters: self.type_parameters,
            annotations: Vec::new(),
        }
    }
}
