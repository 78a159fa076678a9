// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Well-known types and the resolution context.
//!
//! [`TypeRegistry`] holds read-only class types built once by the caller.
//! [`Classpath`] layers the classes of the code under rewrite (and any stub
//! declarations) over a shared registry. Both are passed explicitly; there
//! is no process-wide instance.

use std::collections::HashMap;
use std::sync::Arc;

use rewrite_core::RewriteResult;

use super::{ClassType, ClassTypeBuilder, Flags, JavaType, PrimitiveKind};

/// Read-only map from fully qualified name to class type.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    classes: HashMap<Arc<str>, Arc<ClassType>>,
}

impl TypeRegistry {
    pub fn empty() -> Self {
        TypeRegistry::default()
    }

    /// The subset of the JDK the rewriting engine and its recipes rely on.
    pub fn standard() -> Self {
        let mut registry = TypeRegistry::empty();
        for class in jdk::classes() {
            registry.insert(class);
        }
        registry
    }

    pub fn insert(&mut self, class: ClassType) {
        self.classes.insert(class.fqn.clone(), Arc::new(class));
    }

    pub fn get(&self, fqn: &str) -> Option<&Arc<ClassType>> {
        self.classes.get(fqn)
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.classes.contains_key(fqn)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassType>> {
        self.classes.values()
    }

    /// `java.lang.Object`, or a shallow reference if the registry lacks it.
    pub fn object(&self) -> JavaType {
        self.class_or_shallow("java.lang.Object")
    }

    pub fn string(&self) -> JavaType {
        self.class_or_shallow("java.lang.String")
    }

    fn class_or_shallow(&self, fqn: &str) -> JavaType {
        match self.get(fqn) {
            Some(c) => JavaType::Class(c.clone()),
            None => JavaType::shallow(fqn),
        }
    }
}

/// Classes visible to attribution: a shared registry plus the classes of
/// the code being rewritten and its stubs.
///
/// Cloning is cheap; extension returns a new classpath and leaves the
/// original untouched.
#[derive(Debug, Clone)]
pub struct Classpath {
    registry: Arc<TypeRegistry>,
    classes: Arc<HashMap<Arc<str>, Arc<ClassType>>>,
}

impl Classpath {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Classpath {
            registry,
            classes: Arc::new(HashMap::new()),
        }
    }

    /// A classpath over [`TypeRegistry::standard`].
    pub fn standard() -> Self {
        Classpath::new(Arc::new(TypeRegistry::standard()))
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Look up a class; classes added to this classpath shadow the registry.
    pub fn lookup(&self, fqn: &str) -> Option<Arc<ClassType>> {
        self.classes
            .get(fqn)
            .or_else(|| self.registry.get(fqn))
            .cloned()
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.classes.contains_key(fqn) || self.registry.contains(fqn)
    }

    /// The class behind a class-like type.
    pub fn resolve(&self, ty: &JavaType) -> Option<Arc<ClassType>> {
        match ty {
            JavaType::Class(c) => Some(self.lookup(&c.fqn).unwrap_or_else(|| c.clone())),
            JavaType::ShallowClass(fqn) | JavaType::Cyclic(fqn) => self.lookup(fqn),
            JavaType::Parameterized(p) => self.resolve(&p.base),
            _ => None,
        }
    }

    pub fn with_class(&self, class: ClassType) -> Classpath {
        self.with_classes(std::iter::once(Arc::new(class)))
    }

    pub fn with_classes(&self, classes: impl IntoIterator<Item = Arc<ClassType>>) -> Classpath {
        let mut map = (*self.classes).clone();
        for class in classes {
            map.insert(class.fqn.clone(), class);
        }
        Classpath {
            registry: self.registry.clone(),
            classes: Arc::new(map),
        }
    }

    /// Declare the classes in `source`, a compilation unit of stub
    /// declarations.
    pub fn with_stub_source(&self, source: &str) -> RewriteResult<Classpath> {
        let unit = crate::parser::parse_compilation_unit(source)?;
        let declared = crate::attribution::declare_types(&[&unit], self);
        Ok(self.with_classes(declared.into_iter().map(Arc::new)))
    }

    /// True if any known class lives in `package`.
    pub fn has_package(&self, package: &str) -> bool {
        self.all().any(|c| c.package_name() == package)
    }

    /// Names of the known classes in `package`, sorted.
    pub fn classes_in_package(&self, package: &str) -> Vec<Arc<str>> {
        let mut names: Vec<Arc<str>> = self
            .all()
            .filter(|c| c.package_name() == package)
            .map(|c| c.fqn.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn all(&self) -> impl Iterator<Item = &Arc<ClassType>> {
        self.classes.values().chain(self.registry.iter())
    }
}

impl Default for Classpath {
    fn default() -> Self {
        Classpath::standard()
    }
}

mod jdk {
    use super::*;

    fn class(fqn: &str) -> JavaType {
        JavaType::shallow(fqn)
    }

    fn var(name: &str) -> JavaType {
        JavaType::type_variable(name)
    }

    fn generic(fqn: &str, vars: &[&str]) -> JavaType {
        JavaType::parameterized(class(fqn), vars.iter().map(|v| var(v)).collect())
    }

    fn prim(kind: PrimitiveKind) -> JavaType {
        JavaType::Primitive(kind)
    }

    fn object() -> JavaType {
        class("java.lang.Object")
    }

    fn string() -> JavaType {
        class("java.lang.String")
    }

    fn boxed(fqn: &str, unboxed: PrimitiveKind, accessor: &str) -> ClassType {
        let b = ClassTypeBuilder::class(fqn).flags(Flags::PUBLIC | Flags::FINAL);
        let me = b.self_type();
        b.supertype(class("java.lang.Number"))
            .static_field("MAX_VALUE", prim(unboxed))
            .static_field("MIN_VALUE", prim(unboxed))
            .static_method("valueOf", me.clone(), vec![prim(unboxed)])
            .method(accessor, prim(unboxed), vec![])
            .build()
    }

    fn collection_methods(b: ClassTypeBuilder, e: &str) -> ClassTypeBuilder {
        use PrimitiveKind::{Boolean, Int, Void};
        b.method("size", prim(Int), vec![])
            .method("isEmpty", prim(Boolean), vec![])
            .method("add", prim(Boolean), vec![var(e)])
            .method("contains", prim(Boolean), vec![object()])
            .method("remove", prim(Boolean), vec![object()])
            .method("clear", prim(Void), vec![])
    }

    fn map_methods(b: ClassTypeBuilder) -> ClassTypeBuilder {
        use PrimitiveKind::{Boolean, Int, Void};
        b.method("size", prim(Int), vec![])
            .method("isEmpty", prim(Boolean), vec![])
            .method("put", var("V"), vec![var("K"), var("V")])
            .method("get", var("V"), vec![object()])
            .method("containsKey", prim(Boolean), vec![object()])
            .method("remove", var("V"), vec![object()])
            .method("clear", prim(Void), vec![])
    }

    fn list_class(fqn: &str) -> ClassType {
        let b = ClassTypeBuilder::class(fqn)
            .type_parameter("E")
            .supertype(object())
            .implements(generic("java.util.List", &["E"]));
        collection_methods(b, "E")
            .method("get", var("E"), vec![prim(PrimitiveKind::Int)])
            .build()
    }

    fn set_class(fqn: &str, supertype: JavaType) -> ClassType {
        let b = ClassTypeBuilder::class(fqn)
            .type_parameter("E")
            .supertype(supertype)
            .implements(generic("java.util.Set", &["E"]));
        collection_methods(b, "E").build()
    }

    fn map_class(fqn: &str, supertype: JavaType) -> ClassType {
        let b = ClassTypeBuilder::class(fqn)
            .type_parameter("K")
            .type_parameter("V")
            .supertype(supertype)
            .implements(generic("java.util.Map", &["K", "V"]));
        map_methods(b).build()
    }

    pub(super) fn classes() -> Vec<ClassType> {
        use PrimitiveKind::{Boolean, Char, Double, Int, Long, Void};

        let object_class = ClassTypeBuilder::class("java.lang.Object")
            .method("toString", string(), vec![])
            .method("hashCode", prim(Int), vec![])
            .method("equals", prim(Boolean), vec![object()])
            .build();

        let string_class = {
            let b = ClassTypeBuilder::class("java.lang.String").flags(Flags::PUBLIC | Flags::FINAL);
            let me = b.self_type();
            b.supertype(object())
                .implements(class("java.lang.CharSequence"))
                .method("length", prim(Int), vec![])
                .method("isEmpty", prim(Boolean), vec![])
                .method("trim", me.clone(), vec![])
                .method("concat", me.clone(), vec![me.clone()])
                .static_method("valueOf", me, vec![object()])
                .build()
        };

        let print_stream = ClassTypeBuilder::class("java.io.PrintStream")
            .supertype(object())
            .method("println", prim(Void), vec![object()])
            .method("print", prim(Void), vec![object()])
            .build();

        let system = ClassTypeBuilder::class("java.lang.System")
            .flags(Flags::PUBLIC | Flags::FINAL)
            .supertype(object())
            .static_field("out", class("java.io.PrintStream"))
            .static_field("err", class("java.io.PrintStream"))
            .static_method("currentTimeMillis", prim(Long), vec![])
            .build();

        let collections = ClassTypeBuilder::class("java.util.Collections")
            .supertype(object())
            .static_field("EMPTY_LIST", class("java.util.List"))
            .static_field("EMPTY_SET", class("java.util.Set"))
            .static_field("EMPTY_MAP", class("java.util.Map"))
            .static_method("emptyList", class("java.util.List"), vec![])
            .static_method("emptySet", class("java.util.Set"), vec![])
            .static_method("emptyMap", class("java.util.Map"), vec![])
            .build();

        vec![
            object_class,
            string_class,
            ClassTypeBuilder::interface("java.lang.CharSequence")
                .method("length", prim(Int), vec![])
                .build(),
            ClassTypeBuilder::class("java.lang.Number")
                .flags(Flags::PUBLIC | Flags::ABSTRACT)
                .supertype(object())
                .build(),
            boxed("java.lang.Integer", Int, "intValue"),
            boxed("java.lang.Long", Long, "longValue"),
            boxed("java.lang.Double", Double, "doubleValue"),
            ClassTypeBuilder::class("java.lang.Boolean")
                .supertype(object())
                .static_field("TRUE", class("java.lang.Boolean"))
                .static_field("FALSE", class("java.lang.Boolean"))
                .method("booleanValue", prim(Boolean), vec![])
                .build(),
            ClassTypeBuilder::class("java.lang.Character")
                .supertype(object())
                .method("charValue", prim(Char), vec![])
                .build(),
            system,
            print_stream,
            ClassTypeBuilder::interface("java.lang.Iterable")
                .type_parameter("T")
                .build(),
            collection_methods(
                ClassTypeBuilder::interface("java.util.Collection")
                    .type_parameter("E")
                    .implements(generic("java.lang.Iterable", &["E"])),
                "E",
            )
            .build(),
            ClassTypeBuilder::interface("java.util.List")
                .type_parameter("E")
                .implements(generic("java.util.Collection", &["E"]))
                .method("get", var("E"), vec![prim(Int)])
                .method("set", var("E"), vec![prim(Int), var("E")])
                .build(),
            ClassTypeBuilder::interface("java.util.Set")
                .type_parameter("E")
                .implements(generic("java.util.Collection", &["E"]))
                .build(),
            map_methods(
                ClassTypeBuilder::interface("java.util.Map")
                    .type_parameter("K")
                    .type_parameter("V"),
            )
            .build(),
            list_class("java.util.ArrayList"),
            list_class("java.util.LinkedList"),
            set_class("java.util.HashSet", object()),
            set_class("java.util.LinkedHashSet", generic("java.util.HashSet", &["E"])),
            set_class("java.util.TreeSet", object()),
            map_class("java.util.HashMap", object()),
            map_class("java.util.LinkedHashMap", generic("java.util.HashMap", &["K", "V"])),
            map_class("java.util.TreeMap", object()),
            collections,
        ]
    }
}
