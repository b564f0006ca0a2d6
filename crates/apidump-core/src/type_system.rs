//! The type-inspection capability the rest of the crate is written against.
//!
//! Everything downstream of discovery asks a [`TypeSystem`] for handles by
//! canonical name; nothing holds on to nested ownership of supertypes. This is
//! what lets the walker treat diamond interface graphs as plain name lookups.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use apidump_schema::{TypeHandle, TypeRef};

use crate::error::{DiscoveryError, LoadError};
use crate::locator::{EntryIndex, Locator, unit_path};

/// Canonical name of the root of unchecked exceptions.
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";

/// Canonical name of the root of fatal errors.
pub const ERROR: &str = "java.lang.Error";

const BOOTSTRAP: &str = include_str!("bootstrap.json");

/// Loads type handles by canonical name.
pub trait TypeSystem {
    /// Load the handle for `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the name cannot be resolved or its
    /// descriptor is unreadable or invalid.
    fn load(&self, name: &str) -> Result<Arc<TypeHandle>, LoadError>;
}

impl<T: TypeSystem + ?Sized> TypeSystem for &T {
    fn load(&self, name: &str) -> Result<Arc<TypeHandle>, LoadError> {
        (**self).load(name)
    }
}

impl<T: TypeSystem + ?Sized> TypeSystem for Arc<T> {
    fn load(&self, name: &str) -> Result<Arc<TypeHandle>, LoadError> {
        (**self).load(name)
    }
}

/// Whether `sub` is `sup` or inherits from it through superclasses or
/// interfaces.
///
/// # Errors
///
/// Returns a [`LoadError`] if a type on the way cannot be loaded.
pub fn is_subtype(types: &dyn TypeSystem, sub: &str, sup: &str) -> Result<bool, LoadError> {
    let mut pending = vec![sub.to_string()];
    let mut visited = HashSet::new();

    while let Some(name) = pending.pop() {
        if name == sup {
            return Ok(true);
        }
        if !visited.insert(name.clone()) {
            continue;
        }
        let handle = types.load(&name)?;
        pending.extend(
            handle
                .superclass
                .iter()
                .chain(&handle.interfaces)
                .filter_map(TypeRef::raw_name)
                .map(str::to_string),
        );
    }

    Ok(false)
}

/// The built-in `java.lang` types every type system starts from: the
/// universal base type and the throwable roots.
///
/// # Errors
///
/// Returns a [`LoadError`] if the embedded descriptors are malformed.
pub fn bootstrap_types() -> Result<Vec<TypeHandle>, LoadError> {
    let mut types: Vec<TypeHandle> =
        serde_json::from_str(BOOTSTRAP).map_err(|source| LoadError::Malformed {
            name: "<bootstrap>".to_string(),
            source,
        })?;
    for ty in &mut types {
        ty.normalize();
        ty.validate().map_err(|source| LoadError::Invalid {
            name: ty.name.clone(),
            source,
        })?;
    }
    Ok(types)
}

/// An in-memory type system.
///
/// Also acts as a single-container [`Locator`] whose entries are the units of
/// the registered types, so a registry can be scanned like a module path.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeHandle>>,
    index: Arc<EntryIndex>,
    container: [PathBuf; 1],
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            index: Arc::new(EntryIndex::default()),
            container: [PathBuf::from("<memory>")],
        }
    }

    /// A registry holding the [`bootstrap_types`].
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the embedded descriptors are malformed.
    pub fn with_bootstrap() -> Result<Self, LoadError> {
        let mut registry = Self::new();
        for ty in bootstrap_types()? {
            registry.insert(ty)?;
        }
        Ok(registry)
    }

    /// Register a type, replacing any previous handle of the same name.
    ///
    /// The handle is normalized first, like one read from a module path.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Invalid`] if the handle fails validation.
    pub fn insert(&mut self, mut ty: TypeHandle) -> Result<(), LoadError> {
        ty.normalize();
        ty.validate().map_err(|source| LoadError::Invalid {
            name: ty.name.clone(),
            source,
        })?;
        Arc::make_mut(&mut self.index).add_unit(&unit_path(&ty.name));
        self.types.insert(ty.name.clone(), Arc::new(ty));
        Ok(())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeSystem for TypeRegistry {
    fn load(&self, name: &str) -> Result<Arc<TypeHandle>, LoadError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }
}

impl Locator for TypeRegistry {
    fn list_containers(&self) -> &[PathBuf] {
        &self.container
    }

    fn index_entries(&self, _container: &Path) -> Result<Arc<EntryIndex>, DiscoveryError> {
        Ok(Arc::clone(&self.index))
    }
}
