// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Resolved type model.
//!
//! Types form a graph separate from the syntax tree. A class refers to its
//! supertype, interfaces, members, methods and owning class, and any of those
//! may lead back to the class itself. Such back references are never stored
//! as a real edge: type construction ([`ClassTypeBuilder`], the attributor)
//! inserts a terminal [`JavaType::Cyclic`] carrying the fully qualified name
//! instead, and references to classes that are not yet built use
//! [`JavaType::ShallowClass`]. Every value of [`JavaType`] is therefore a
//! finite tree, and traversals over it terminate without cycle detection.
//!
//! Type identity is structural: two types are the same type when their fully
//! qualified names (and, for compound types, their parts) agree. See
//! [`type_utils`].

mod builder;
mod registry;
pub mod type_utils;

pub use builder::ClassTypeBuilder;
pub use registry::{Classpath, TypeRegistry};

use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

// ============================================================================
// Small enums and flags
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl ClassKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::Annotation => "@interface",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
    /// The type of the `null` literal.
    Null,
}

impl PrimitiveKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Null => "null",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<PrimitiveKind> {
        Some(match keyword {
            "boolean" => PrimitiveKind::Boolean,
            "byte" => PrimitiveKind::Byte,
            "char" => PrimitiveKind::Char,
            "double" => PrimitiveKind::Double,
            "float" => PrimitiveKind::Float,
            "int" => PrimitiveKind::Int,
            "long" => PrimitiveKind::Long,
            "short" => PrimitiveKind::Short,
            "void" => PrimitiveKind::Void,
            _ => return None,
        })
    }
}

/// Declaration flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const PUBLIC: Flags = Flags(1);
    pub const PRIVATE: Flags = Flags(1 << 1);
    pub const PROTECTED: Flags = Flags(1 << 2);
    pub const STATIC: Flags = Flags(1 << 3);
    pub const FINAL: Flags = Flags(1 << 4);
    pub const ABSTRACT: Flags = Flags(1 << 5);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Flags {
    type Output = Flags;
    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Flags::PUBLIC, "public"),
            (Flags::PRIVATE, "private"),
            (Flags::PROTECTED, "protected"),
            (Flags::STATIC, "static"),
            (Flags::FINAL, "final"),
            (Flags::ABSTRACT, "abstract"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Flags({})", set.join(" "))
    }
}

// ============================================================================
// JavaType
// ============================================================================

/// A resolved type.
#[derive(Clone)]
pub enum JavaType {
    Class(Arc<ClassType>),
    /// A class known only by name.
    ShallowClass(Arc<str>),
    Parameterized(Arc<ParameterizedClassType>),
    GenericTypeVariable(Arc<TypeVariable>),
    /// Array of the element type.
    Array(Arc<JavaType>),
    Primitive(PrimitiveKind),
    Method(Arc<MethodType>),
    Variable(Arc<VariableType>),
    /// Alternatives of a multi-catch clause.
    MultiCatch(Arc<Vec<JavaType>>),
    /// Terminal back reference to the class with this name.
    Cyclic(Arc<str>),
}

impl JavaType {
    pub fn shallow(fqn: &str) -> JavaType {
        JavaType::ShallowClass(Arc::from(fqn))
    }

    pub fn cyclic(fqn: &str) -> JavaType {
        JavaType::Cyclic(Arc::from(fqn))
    }

    pub fn class(class: ClassType) -> JavaType {
        JavaType::Class(Arc::new(class))
    }

    pub fn array_of(element: JavaType) -> JavaType {
        JavaType::Array(Arc::new(element))
    }

    pub fn parameterized(base: JavaType, type_args: Vec<JavaType>) -> JavaType {
        JavaType::Parameterized(Arc::new(ParameterizedClassType { base, type_args }))
    }

    pub fn type_variable(name: &str) -> JavaType {
        JavaType::GenericTypeVariable(Arc::new(TypeVariable {
            name: Arc::from(name),
            bounds: Vec::new(),
        }))
    }

    /// Fully qualified name of a class-like type.
    pub fn fully_qualified_name(&self) -> Option<&str> {
        match self {
            JavaType::Class(c) => Some(&*c.fqn),
            JavaType::ShallowClass(fqn) | JavaType::Cyclic(fqn) => Some(&**fqn),
            JavaType::Parameterized(p) => p.base.fully_qualified_name(),
            _ => None,
        }
    }

    /// The simple class name (`Entry` for `java.util.Map$Entry`).
    pub fn class_name(&self) -> Option<&str> {
        self.fully_qualified_name().map(simple_name)
    }

    pub fn as_class(&self) -> Option<&Arc<ClassType>> {
        match self {
            JavaType::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, JavaType::Primitive(_))
    }

    /// Type arguments of a parameterized type.
    pub fn type_arguments(&self) -> &[JavaType] {
        match self {
            JavaType::Parameterized(p) => &p.type_args,
            _ => &[],
        }
    }

    /// True if both values are the very same type object.
    pub fn ptr_eq(&self, other: &JavaType) -> bool {
        match (self, other) {
            (JavaType::Class(a), JavaType::Class(b)) => Arc::ptr_eq(a, b),
            (JavaType::ShallowClass(a), JavaType::ShallowClass(b)) => Arc::ptr_eq(a, b),
            (JavaType::Parameterized(a), JavaType::Parameterized(b)) => Arc::ptr_eq(a, b),
            (JavaType::GenericTypeVariable(a), JavaType::GenericTypeVariable(b)) => {
                Arc::ptr_eq(a, b)
            }
            (JavaType::Array(a), JavaType::Array(b)) => Arc::ptr_eq(a, b),
            (JavaType::Primitive(a), JavaType::Primitive(b)) => a == b,
            (JavaType::Method(a), JavaType::Method(b)) => Arc::ptr_eq(a, b),
            (JavaType::Variable(a), JavaType::Variable(b)) => Arc::ptr_eq(a, b),
            (JavaType::MultiCatch(a), JavaType::MultiCatch(b)) => Arc::ptr_eq(a, b),
            (JavaType::Cyclic(a), JavaType::Cyclic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The part of a fully qualified name after the last `.` or `$`.
pub fn simple_name(fqn: &str) -> &str {
    match fqn.rfind(['.', '$']) {
        Some(idx) => &fqn[idx + 1..],
        None => fqn,
    }
}

/// The package part of a fully qualified name.
pub fn package_of(fqn: &str) -> &str {
    let outer = match fqn.find('$') {
        Some(idx) => &fqn[..idx],
        None => fqn,
    };
    match outer.rfind('.') {
        Some(idx) => &outer[..idx],
        None => "",
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Class(c) => f.write_str(&c.fqn),
            JavaType::ShallowClass(fqn) | JavaType::Cyclic(fqn) => f.write_str(fqn),
            JavaType::Parameterized(p) => {
                write!(f, "{}<", p.base)?;
                for (i, arg) in p.type_args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            JavaType::GenericTypeVariable(v) => f.write_str(&v.name),
            JavaType::Array(e) => write!(f, "{}[]", e),
            JavaType::Primitive(p) => f.write_str(p.keyword()),
            JavaType::Method(m) => write!(f, "{:?}", m),
            JavaType::Variable(v) => write!(f, "{:?}", v),
            JavaType::MultiCatch(alts) => {
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", alt)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Class(c) => write!(f, "Class({})", c.fqn),
            JavaType::ShallowClass(fqn) => write!(f, "ShallowClass({})", fqn),
            JavaType::Cyclic(fqn) => write!(f, "Cyclic({})", fqn),
            JavaType::Parameterized(_) => write!(f, "Parameterized({})", self),
            JavaType::GenericTypeVariable(v) => write!(f, "GenericTypeVariable({})", v.name),
            JavaType::Array(_) => write!(f, "Array({})", self),
            JavaType::Primitive(p) => write!(f, "Primitive({})", p.keyword()),
            JavaType::Method(m) => write!(f, "Method({:?})", m),
            JavaType::Variable(v) => write!(f, "Variable({:?})", v),
            JavaType::MultiCatch(_) => write!(f, "MultiCatch({})", self),
        }
    }
}

// ============================================================================
// Compound types
// ============================================================================

#[derive(Clone)]
pub struct ClassType {
    pub fqn: Arc<str>,
    pub kind: ClassKind,
    pub flags: Flags,
    pub supertype: Option<JavaType>,
    pub interfaces: Vec<JavaType>,
    pub members: Vec<Arc<VariableType>>,
    pub methods: Vec<Arc<MethodType>>,
    pub owning_class: Option<JavaType>,
    pub type_parameters: Vec<JavaType>,
    pub annotations: Vec<JavaType>,
}

impl ClassType {
    pub fn simple_name(&self) -> &str {
        simple_name(&self.fqn)
    }

    pub fn package_name(&self) -> &str {
        package_of(&self.fqn)
    }

    /// A member declared directly on this class.
    pub fn member(&self, name: &str) -> Option<&Arc<VariableType>> {
        self.members.iter().find(|m| &*m.name == name)
    }

    /// A method declared directly on this class.
    pub fn method(&self, name: &str, arity: usize) -> Option<&Arc<MethodType>> {
        self.methods
            .iter()
            .find(|m| &*m.name == name && m.param_types.len() == arity)
    }
}

impl fmt::Debug for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassType")
            .field("fqn", &self.fqn)
            .field("kind", &self.kind)
            .field("supertype", &self.supertype)
            .field("interfaces", &self.interfaces)
            .field("members", &self.members.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

#[derive(Clone)]
pub struct ParameterizedClassType {
    pub base: JavaType,
    pub type_args: Vec<JavaType>,
}

#[derive(Clone)]
pub struct TypeVariable {
    pub name: Arc<str>,
    pub bounds: Vec<JavaType>,
}

#[derive(Clone)]
pub struct MethodType {
    pub declaring_type: JavaType,
    pub name: Arc<str>,
    pub flags: Flags,
    pub return_type: JavaType,
    pub param_names: Vec<Arc<str>>,
    pub param_types: Vec<JavaType>,
    pub thrown: Vec<JavaType>,
    pub annotations: Vec<JavaType>,
}

impl MethodType {
    pub fn is_constructor(&self) -> bool {
        &*self.name == "<constructor>"
    }

    pub fn with_return_type(&self, return_type: JavaType) -> MethodType {
        MethodType {
            return_type,
            ..self.clone()
        }
    }
}

impl fmt::Debug for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}(", self.declaring_type, self.name)?;
        for (i, p) in self.param_types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

#[derive(Clone)]
pub struct VariableType {
    pub name: Arc<str>,
    /// The declaring class for fields, the declaring method for locals.
    pub owner: Option<JavaType>,
    pub ty: JavaType,
    pub flags: Flags,
    pub annotations: Vec<JavaType>,
}

impl VariableType {
    pub fn with_name(&self, name: &str) -> VariableType {
        VariableType {
            name: Arc::from(name),
            ..self.clone()
        }
    }

    pub fn with_type(&self, ty: JavaType) -> VariableType {
        VariableType {
            ty,
            ..self.clone()
        }
    }

    /// The owning class's name, for fields.
    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.fully_qualified_name())
    }
}

impl fmt::Debug for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner @ JavaType::Method(_)) => {
                write!(f, "{{{:?}}}{}: {}", owner, self.name, self.ty)
            }
            Some(owner) => write!(f, "{}.{}: {}", owner, self.name, self.ty),
            None => write!(f, "{}: {}", self.name, self.ty),
        }
    }
}
