//! Member and interface collection over the supertype graph.
//!
//! Every step from a viewing context into a supertype substitutes the
//! context's bindings into the declared supertype reference. The result is
//! the supertype's instantiation, and its bindings are then applied to the
//! supertype's own members.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use apidump_schema::{Bindings, TypeHandle, TypeRef};

use crate::error::LoadError;
use crate::member::Member;
use crate::type_system::TypeSystem;

/// The reference a type uses for itself: its name applied to its own type
/// variables, e.g. `java.util.HashMap<K, V>`.
pub fn self_reference(ty: &TypeHandle) -> TypeRef {
    TypeRef::parameterized(
        &ty.name,
        ty.type_params
            .iter()
            .map(|p| TypeRef::Variable(p.clone()))
            .collect(),
    )
}

/// Walks a type and, optionally, its supertypes.
#[derive(Clone, Copy)]
pub struct TypeGraphWalker<'a> {
    types: &'a dyn TypeSystem,
    include_inherited: bool,
}

impl std::fmt::Debug for TypeGraphWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeGraphWalker")
            .field("include_inherited", &self.include_inherited)
            .finish_non_exhaustive()
    }
}

impl<'a> TypeGraphWalker<'a> {
    /// A walker loading supertypes from `types`. Without `include_inherited`
    /// only the root's own members are collected.
    pub fn new(types: &'a dyn TypeSystem, include_inherited: bool) -> Self {
        Self {
            types,
            include_inherited,
        }
    }

    /// The member surface of `root`, before suppression.
    ///
    /// The root contributes its fields, constructors and non-synthetic
    /// methods. Supertypes contribute only non-static, non-synthetic methods
    /// not already present, so an override always hides what it overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a supertype cannot be loaded.
    pub fn collect_members(&self, root: &TypeHandle) -> Result<BTreeSet<Member>, LoadError> {
        let mut sink = BTreeSet::new();
        let mut visited = HashSet::from([root.name.clone()]);
        self.walk_members(root, &self_reference(root), &mut visited, &mut sink, true)?;
        Ok(sink)
    }

    fn walk_members(
        &self,
        ty: &TypeHandle,
        context: &TypeRef,
        visited: &mut HashSet<String>,
        sink: &mut BTreeSet<Member>,
        direct: bool,
    ) -> Result<(), LoadError> {
        tracing::trace!("Walking {context}");
        let bindings = Bindings::new(&ty.type_params, context.args());

        // Fields and constructors are not inherited.
        if direct {
            for constructor in &ty.constructors {
                sink.insert(Member::constructor(
                    context,
                    &ty.name,
                    ty.kind,
                    &bindings,
                    constructor,
                ));
            }
            for field in &ty.fields {
                sink.insert(Member::field(context, ty.kind, &bindings, field));
            }
        }

        for method in &ty.methods {
            if method.signature.synthetic || (!direct && method.modifiers.is_static()) {
                continue;
            }
            // A set insert never replaces, so an override found earlier wins.
            sink.insert(Member::method(context, ty.kind, &bindings, method));
        }

        if !self.include_inherited {
            return Ok(());
        }

        for supertype in ty.superclass.iter().chain(&ty.interfaces) {
            let Some(name) = supertype.raw_name() else {
                continue;
            };
            if !visited.insert(name.to_string()) {
                continue;
            }
            let handle = self.types.load(name)?;
            let instantiation = supertype.substitute(&bindings);
            self.walk_members(&handle, &instantiation, visited, sink, false)?;
        }
        Ok(())
    }

    /// Every interface `root` implements, directly or through its superclass
    /// chain and super-interfaces, as instantiated from `root`'s point of
    /// view. Sorted by rendered form, one entry per distinct rendering.
    ///
    /// Interfaces are always followed through supertypes, whether or not
    /// inherited members are collected.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a supertype cannot be loaded.
    pub fn collect_interfaces(&self, root: &TypeHandle) -> Result<Vec<TypeRef>, LoadError> {
        let mut sink = BTreeMap::new();
        let mut classes = HashSet::from([root.name.clone()]);
        self.walk_interfaces(root, &self_reference(root), &mut classes, &mut sink)?;
        Ok(sink.into_values().collect())
    }

    fn walk_interfaces(
        &self,
        ty: &TypeHandle,
        context: &TypeRef,
        classes: &mut HashSet<String>,
        sink: &mut BTreeMap<String, TypeRef>,
    ) -> Result<(), LoadError> {
        let bindings = Bindings::new(&ty.type_params, context.args());

        for interface in &ty.interfaces {
            let implemented = interface.substitute(&bindings);
            let Some(name) = implemented.raw_name() else {
                continue;
            };
            if sink.contains_key(&implemented.to_string()) {
                continue;
            }
            let handle = self.types.load(name)?;
            sink.insert(implemented.to_string(), implemented.clone());
            self.walk_interfaces(&handle, &implemented, classes, sink)?;
        }

        if let Some(superclass) = &ty.superclass {
            let Some(name) = superclass.raw_name() else {
                return Ok(());
            };
            // Guards against cyclic superclass chains in broken descriptors.
            if !classes.insert(name.to_string()) {
                return Ok(());
            }
            let handle = self.types.load(name)?;
            self.walk_interfaces(&handle, &superclass.substitute(&bindings), classes, sink)?;
        }
        Ok(())
    }
}
