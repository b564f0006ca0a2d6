//! Loaded type handles and their declared members.
//!
//! A [`TypeHandle`] is the structural metadata a running type system exposes
//! for one compiled unit. On a module path it is stored as a JSON *type
//! descriptor*; see [`UNIT_SUFFIX`](crate::UNIT_SUFFIX).

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::OBJECT;
use crate::modifiers::Modifiers;
use crate::type_ref::TypeRef;

/// What sort of type a handle describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// An ordinary class (default).
    #[default]
    Class,
    /// An interface.
    Interface,
    /// An enumeration.
    Enum,
    /// An annotation type; also an interface.
    Annotation,
}

impl TypeKind {
    /// The keyword used in a rendered declaration.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Annotation => "@interface",
        }
    }

    /// Interfaces and annotation types.
    pub const fn is_interface(self) -> bool {
        matches!(self, Self::Interface | Self::Annotation)
    }

    /// Enumerations.
    pub const fn is_enum(self) -> bool {
        matches!(self, Self::Enum)
    }
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,
    /// Declared modifiers.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Declared value type, possibly mentioning type variables.
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// The signature shared by constructors and methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableDecl {
    /// Declared type parameter names, e.g. `["T"]` for `<T> T pick(T[])`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    /// Ordered parameter types.
    #[serde(default)]
    pub params: Vec<TypeRef>,
    /// Declared exception types, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<TypeRef>,
    /// Whether the last parameter is variadic.
    #[serde(default)]
    pub varargs: bool,
    /// Whether the compiler generated this executable (bridges, accessors).
    #[serde(default)]
    pub synthetic: bool,
}

impl ExecutableDecl {
    /// Resolve type variables of the enclosing `scope` and of this
    /// executable's own type parameters. Returns the combined scope.
    fn resolve_variables(&mut self, scope: &[String]) -> Vec<String> {
        let inner = [scope, self.type_params.as_slice()].concat();
        for ty in self.params.iter_mut().chain(&mut self.throws) {
            *ty = ty.resolve_variables(&inner);
        }
        inner
    }
}

/// A declared constructor. Its name is the declaring type's canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    /// Declared modifiers.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Parameters, exceptions and flags.
    #[serde(flatten)]
    pub signature: ExecutableDecl,
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Declared modifiers.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Declared return type; `void` for none.
    pub returns: TypeRef,
    /// Parameters, exceptions and flags.
    #[serde(flatten)]
    pub signature: ExecutableDecl,
}

/// A loaded type.
///
/// Identity is the canonical name: equality, hashing and ordering never look
/// at anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeHandle {
    /// Canonical dotted name; nested types use `$` (`p.Outer$Inner`).
    pub name: String,
    /// Class, interface, enum or annotation.
    #[serde(default)]
    pub kind: TypeKind,
    /// Declared modifiers.
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Declared type parameter names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    /// Generic superclass; absent for interfaces and the universal base type.
    /// A class descriptor may leave it out to extend [`OBJECT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeRef>,
    /// Directly implemented (or, for interfaces, extended) interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    /// Declared fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDecl>,
    /// Declared constructors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<ConstructorDecl>,
    /// Declared methods, including synthetic ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDecl>,
    /// Canonical names of declared member types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_types: Vec<String>,
}

/// Errors found while validating a [`TypeHandle`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// The descriptor has no canonical name.
    #[error("Type descriptor has an empty name")]
    EmptyName,

    /// A field or method has no name.
    #[error("{owner}: member with an empty name")]
    EmptyMemberName {
        /// Canonical name of the declaring type.
        owner: String,
    },

    /// A variadic executable whose last parameter is not an array.
    #[error("{owner}.{member}: variadic parameter must be an array, got '{found}'")]
    VarargsNotArray {
        /// Canonical name of the declaring type.
        owner: String,
        /// Member name.
        member: String,
        /// The offending parameter type.
        found: String,
    },

    /// A variadic executable without parameters.
    #[error("{owner}.{member}: variadic member has no parameters")]
    VarargsWithoutParams {
        /// Canonical name of the declaring type.
        owner: String,
        /// Member name.
        member: String,
    },
}

impl TypeHandle {
    /// A bare class with the given canonical name and nothing declared.
    pub fn new(name: impl Into<String>, kind: TypeKind, modifiers: Modifiers) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            member_types: Vec::new(),
        }
    }

    /// The raw reference to this type, with no type arguments.
    pub fn raw_ref(&self) -> TypeRef {
        TypeRef::named(&self.name)
    }

    /// Whether this type appears in a report.
    pub const fn is_visible(&self) -> bool {
        self.modifiers.is_visible()
    }

    /// Fill in what a descriptor leaves implicit.
    ///
    /// Classes and enums other than [`OBJECT`] without a superclass extend
    /// [`OBJECT`]. Bare names matching a type parameter in scope (the type's
    /// own, plus a constructor's or method's) become type variables; every
    /// other name stays a class, including default-package classes.
    /// Normalizing twice changes nothing.
    pub fn normalize(&mut self) {
        if self.superclass.is_none() && !self.kind.is_interface() && self.name != OBJECT {
            self.superclass = Some(TypeRef::named(OBJECT));
        }

        let scope = &self.type_params;
        if let Some(superclass) = &mut self.superclass {
            *superclass = superclass.resolve_variables(scope);
        }
        for interface in &mut self.interfaces {
            *interface = interface.resolve_variables(scope);
        }
        for field in &mut self.fields {
            field.ty = field.ty.resolve_variables(scope);
        }
        for constructor in &mut self.constructors {
            constructor.signature.resolve_variables(scope);
        }
        for method in &mut self.methods {
            let inner = method.signature.resolve_variables(scope);
            method.returns = method.returns.resolve_variables(&inner);
        }
    }

    /// Check the invariants the walker and renderer rely on.
    ///
    /// # Errors
    ///
    /// Returns the first [`DescriptorError`] found.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if self.fields.iter().any(|f| f.name.is_empty())
            || self.methods.iter().any(|m| m.name.is_empty())
        {
            return Err(DescriptorError::EmptyMemberName {
                owner: self.name.clone(),
            });
        }

        let executables = self
            .constructors
            .iter()
            .map(|c| (self.name.as_str(), &c.signature))
            .chain(self.methods.iter().map(|m| (m.name.as_str(), &m.signature)));
        for (member, signature) in executables {
            if !signature.varargs {
                continue;
            }
            match signature.params.last() {
                None => {
                    return Err(DescriptorError::VarargsWithoutParams {
                        owner: self.name.clone(),
                        member: member.to_string(),
                    });
                }
                Some(last) if !last.is_array() => {
                    return Err(DescriptorError::VarargsNotArray {
                        owner: self.name.clone(),
                        member: member.to_string(),
                        found: last.to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for TypeHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(json: &str) -> TypeHandle {
        serde_json::from_str(json).unwrap()
    }

    fn normalized(json: &str) -> TypeHandle {
        let mut ty = descriptor(json);
        ty.normalize();
        ty
    }

    #[test]
    fn test_descriptor_defaults() {
        let ty = descriptor(r#"{"name": "p.A"}"#);
        assert_eq!(ty.kind, TypeKind::Class);
        assert!(!ty.is_visible());
        assert!(ty.superclass.is_none());
        assert!(ty.methods.is_empty());
        assert_eq!(ty.raw_ref().to_string(), "p.A");
    }

    #[test]
    fn test_descriptor_members() {
        let ty = normalized(
            r#"{
                "name": "p.Box",
                "modifiers": ["public", "final"],
                "type_params": ["T"],
                "superclass": "java.lang.Object",
                "interfaces": ["java.lang.Comparable<p.Box<T>>"],
                "fields": [{"name": "value", "modifiers": ["protected"], "type": "T"}],
                "constructors": [{"modifiers": ["public"], "params": ["T[]"], "varargs": true}],
                "methods": [{
                    "name": "get",
                    "modifiers": ["public"],
                    "returns": "T",
                    "throws": ["java.io.IOException"]
                }]
            }"#,
        );
        assert!(ty.modifiers.contains(Modifiers::FINAL));
        assert_eq!(ty.superclass, Some(TypeRef::named(OBJECT)));
        assert_eq!(ty.interfaces[0].to_string(), "java.lang.Comparable<p.Box<T>>");
        assert_eq!(ty.fields[0].ty, TypeRef::Variable("T".into()));
        assert!(ty.constructors[0].signature.varargs);
        assert_eq!(ty.methods[0].signature.throws.len(), 1);
        assert!(!ty.methods[0].signature.synthetic);
        ty.validate().unwrap();
    }

    #[test]
    fn test_normalize_defaults_superclass_to_object() {
        let ty = normalized(r#"{"name": "p.A"}"#);
        assert_eq!(ty.superclass, Some(TypeRef::named(OBJECT)));
        let ty = normalized(r#"{"name": "p.E", "kind": "enum"}"#);
        assert_eq!(ty.superclass, Some(TypeRef::named(OBJECT)));

        assert!(normalized(r#"{"name": "java.lang.Object"}"#).superclass.is_none());
        assert!(normalized(r#"{"name": "p.I", "kind": "interface"}"#).superclass.is_none());
        assert!(normalized(r#"{"name": "p.N", "kind": "annotation"}"#).superclass.is_none());
    }

    #[test]
    fn test_normalize_keeps_default_package_classes() {
        let mut ty = normalized(
            r#"{
                "name": "Sub",
                "type_params": ["T"],
                "superclass": "Base<T>",
                "fields": [{"name": "next", "type": "Sub<T>"}],
                "methods": [{
                    "name": "map",
                    "type_params": ["R"],
                    "returns": "R",
                    "params": ["T", "Base<R>"],
                    "throws": ["Oops"]
                }, {
                    "name": "leak",
                    "returns": "R"
                }]
            }"#,
        );
        let t = TypeRef::Variable("T".into());
        let r = TypeRef::Variable("R".into());
        assert_eq!(ty.superclass, Some(TypeRef::parameterized("Base", vec![t.clone()])));
        assert_eq!(ty.fields[0].ty, TypeRef::parameterized("Sub", vec![t.clone()]));

        let map = &ty.methods[0];
        assert_eq!(map.returns, r);
        assert_eq!(map.signature.params, vec![t, TypeRef::parameterized("Base", vec![r])]);
        assert_eq!(map.signature.throws, vec![TypeRef::named("Oops")]);
        // `R` belongs to `map` only.
        assert_eq!(ty.methods[1].returns, TypeRef::named("R"));

        let before = ty.methods.clone();
        ty.normalize();
        assert_eq!(ty.methods, before);
    }

    #[test]
    fn test_identity_is_the_name() {
        let a = descriptor(r#"{"name": "p.A", "kind": "interface"}"#);
        let b = descriptor(r#"{"name": "p.A", "modifiers": ["public"]}"#);
        let c = descriptor(r#"{"name": "p.B"}"#);
        assert_eq!(a, b);
        assert!(a < c);
    }

    #[test]
    fn test_validate_rejects_non_array_varargs() {
        let ty = descriptor(
            r#"{"name": "p.A", "methods": [
                {"name": "f", "returns": "void", "params": ["int"], "varargs": true}
            ]}"#,
        );
        assert_eq!(
            ty.validate(),
            Err(DescriptorError::VarargsNotArray {
                owner: "p.A".into(),
                member: "f".into(),
                found: "int".into(),
            })
        );

        let ty = descriptor(r#"{"name": "p.A", "constructors": [{"varargs": true}]}"#);
        assert!(matches!(
            ty.validate(),
            Err(DescriptorError::VarargsWithoutParams { .. })
        ));
        assert_eq!(descriptor(r#"{"name": ""}"#).validate(), Err(DescriptorError::EmptyName));
    }
}
