//! Members as seen from a viewing context.

use std::cmp::Ordering;

use apidump_schema::{
    Bindings, ConstructorDecl, ExecutableDecl, FieldDecl, MethodDecl, Modifiers, TypeKind,
    TypeRef,
};

use crate::ordering::compare_members;

/// Member kinds, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {
    /// A field.
    Field,
    /// A constructor.
    Constructor,
    /// A method.
    Method,
}

/// The parts of a constructor or method signature that depend on the viewing
/// context, already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Own type parameter names.
    pub type_params: Vec<String>,
    /// Parameter types.
    pub params: Vec<TypeRef>,
    /// Declared exceptions, unreduced.
    pub throws: Vec<TypeRef>,
    /// Whether the last parameter is variadic.
    pub varargs: bool,
}

/// Kind-specific payload of a [`Member`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberBody {
    /// A field and its value type.
    Field {
        /// Value type.
        ty: TypeRef,
    },
    /// A constructor.
    Constructor(Signature),
    /// A method.
    Method {
        /// Return type.
        returns: TypeRef,
        /// Parameters and exceptions.
        signature: Signature,
    },
}

/// A field, constructor or method, resolved against the instantiation of its
/// declaring type it was reached through.
///
/// Equality and ordering use only the member key (kind, name, parameters):
/// a [`BTreeSet`](std::collections::BTreeSet) of members keeps the first
/// member inserted for each key.
#[derive(Debug, Clone)]
pub struct Member {
    /// Instantiation of the declaring type the member was reached through.
    pub context: TypeRef,
    /// Kind of the declaring type.
    pub declarer_kind: TypeKind,
    /// Declared modifiers.
    pub modifiers: Modifiers,
    /// Member name; constructors carry the declaring type's canonical name.
    pub name: String,
    /// Kind-specific payload.
    pub body: MemberBody,
}

impl Member {
    /// A field viewed through `context`.
    pub fn field(
        context: &TypeRef,
        declarer_kind: TypeKind,
        bindings: &Bindings,
        decl: &FieldDecl,
    ) -> Self {
        Self {
            context: context.clone(),
            declarer_kind,
            modifiers: decl.modifiers,
            name: decl.name.clone(),
            body: MemberBody::Field {
                ty: decl.ty.substitute(bindings),
            },
        }
    }

    /// A constructor of `declarer` viewed through `context`.
    pub fn constructor(
        context: &TypeRef,
        declarer: &str,
        declarer_kind: TypeKind,
        bindings: &Bindings,
        decl: &ConstructorDecl,
    ) -> Self {
        let bindings = bindings.without(&decl.signature.type_params);
        Self {
            context: context.clone(),
            declarer_kind,
            modifiers: decl.modifiers,
            name: declarer.to_string(),
            body: MemberBody::Constructor(resolve(&decl.signature, &bindings)),
        }
    }

    /// A method viewed through `context`.
    pub fn method(
        context: &TypeRef,
        declarer_kind: TypeKind,
        bindings: &Bindings,
        decl: &MethodDecl,
    ) -> Self {
        let bindings = bindings.without(&decl.signature.type_params);
        Self {
            context: context.clone(),
            declarer_kind,
            modifiers: decl.modifiers,
            name: decl.name.clone(),
            body: MemberBody::Method {
                returns: decl.returns.substitute(&bindings),
                signature: resolve(&decl.signature, &bindings),
            },
        }
    }

    /// The kind of this member.
    pub const fn kind(&self) -> MemberKind {
        match self.body {
            MemberBody::Field { .. } => MemberKind::Field,
            MemberBody::Constructor(_) => MemberKind::Constructor,
            MemberBody::Method { .. } => MemberKind::Method,
        }
    }

    /// Parameter types; empty for fields.
    pub fn params(&self) -> &[TypeRef] {
        match self.signature() {
            Some(signature) => &signature.params,
            None => &[],
        }
    }

    /// The signature of a constructor or method.
    pub const fn signature(&self) -> Option<&Signature> {
        match &self.body {
            MemberBody::Field { .. } => None,
            MemberBody::Constructor(signature) | MemberBody::Method { signature, .. } => {
                Some(signature)
            }
        }
    }

    /// Mutable access to the signature of a constructor or method.
    pub fn signature_mut(&mut self) -> Option<&mut Signature> {
        match &mut self.body {
            MemberBody::Field { .. } => None,
            MemberBody::Constructor(signature) | MemberBody::Method { signature, .. } => {
                Some(signature)
            }
        }
    }

    /// Whether the member appears in a report.
    pub const fn is_visible(&self) -> bool {
        self.modifiers.is_visible()
    }
}

fn resolve(decl: &ExecutableDecl, bindings: &Bindings) -> Signature {
    Signature {
        type_params: decl.type_params.clone(),
        params: decl.params.iter().map(|p| p.substitute(bindings)).collect(),
        throws: decl.throws.iter().map(|t| t.substitute(bindings)).collect(),
        varargs: decl.varargs,
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        compare_members(self, other).is_eq()
    }
}

impl Eq for Member {}

impl PartialOrd for Member {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Member {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_members(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    /// `s` with `T` in scope as a type variable.
    fn ty(s: &str) -> TypeRef {
        s.parse::<TypeRef>().unwrap().resolve_variables(&["T".to_string()])
    }

    fn method(name: &str, returns: &str, params: &[&str]) -> MethodDecl {
        MethodDecl {
            name: name.to_string(),
            modifiers: Modifiers::PUBLIC,
            returns: ty(returns),
            signature: ExecutableDecl {
                params: params.iter().map(|&p| ty(p)).collect(),
                ..ExecutableDecl::default()
            },
        }
    }

    #[test]
    fn test_method_substitutes_context_bindings() {
        let context = ty("p.Box<java.lang.String>");
        let bindings = Bindings::new(&["T".to_string()], context.args());
        let member = Member::method(
            &context,
            TypeKind::Class,
            &bindings,
            &method("put", "T", &["T", "java.util.List<T>"]),
        );
        let MemberBody::Method { returns, signature } = &member.body else {
            panic!("expected a method");
        };
        assert_eq!(returns.to_string(), "java.lang.String");
        assert_eq!(signature.params[1].to_string(), "java.util.List<java.lang.String>");
        assert_eq!(member.kind(), MemberKind::Method);
        assert!(member.is_visible());
    }

    #[test]
    fn test_own_type_params_shadow_class_params() {
        let context = ty("p.Box<java.lang.String>");
        let bindings = Bindings::new(&["T".to_string()], context.args());
        let mut decl = method("convert", "T", &["T"]);
        decl.signature.type_params = vec!["T".to_string()];

        let member = Member::method(&context, TypeKind::Class, &bindings, &decl);
        assert_eq!(member.params(), &[ty("T")]);
    }

    #[test]
    fn test_constructor_is_named_after_declarer() {
        let decl = ConstructorDecl {
            modifiers: Modifiers::PROTECTED,
            signature: ExecutableDecl {
                params: vec![ty("int")],
                ..ExecutableDecl::default()
            },
        };
        let member = Member::constructor(
            &ty("p.A"),
            "p.A",
            TypeKind::Class,
            &Bindings::default(),
            &decl,
        );
        assert_eq!(member.name, "p.A");
        assert_eq!(member.kind(), MemberKind::Constructor);
        assert!(member.signature().is_some());
    }

    #[test]
    fn test_set_keeps_first_member_per_key() {
        let bindings = Bindings::default();
        let sub = Member::method(&ty("p.B"), TypeKind::Class, &bindings, &method("m", "p.B", &[]));
        let base = Member::method(&ty("p.A"), TypeKind::Class, &bindings, &method("m", "p.A", &[]));
        let other = Member::method(&ty("p.A"), TypeKind::Class, &bindings, &method("m", "void", &["int"]));

        let mut set = BTreeSet::new();
        assert!(set.insert(sub));
        assert!(!set.insert(base));
        assert!(set.insert(other));
        assert_eq!(set.len(), 2);
        assert_eq!(set.first().unwrap().context, ty("p.B"));
    }

    #[test]
    fn test_fields_sort_before_constructors_and_methods() {
        let bindings = Bindings::default();
        let field = Member::field(
            &ty("p.A"),
            TypeKind::Class,
            &bindings,
            &FieldDecl {
                name: "z".to_string(),
                modifiers: Modifiers::empty(),
                ty: ty("int"),
            },
        );
        let method = Member::method(&ty("p.A"), TypeKind::Class, &bindings, &method("a", "void", &[]));
        assert!(field < method);
        assert!(field.params().is_empty());
    }
}
