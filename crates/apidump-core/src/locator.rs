//! Compiled-unit discovery on the module path.
//!
//! A container is either a zip archive or a directory. Its [`EntryIndex`]
//! holds every unit path plus every ancestor directory of every unit, so
//! "does this container have anything under `java/util/`" is one hash lookup.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use apidump_schema::{TypeHandle, UNIT_SUFFIX};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::config::ModulePathConfig;
use crate::error::{DiscoveryError, LoadError};
use crate::type_system::{TypeRegistry, TypeSystem};

/// Enumerates containers and indexes their entries.
pub trait Locator {
    /// Containers in search order.
    fn list_containers(&self) -> &[PathBuf];

    /// The entry index of one container.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscoveryError`] if the container cannot be read.
    fn index_entries(&self, container: &Path) -> Result<Arc<EntryIndex>, DiscoveryError>;
}

/// The classes and subpackages directly below one package in one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Canonical names of top-level classes in the package itself.
    pub class_names: BTreeSet<String>,
    /// Fully-qualified names of the immediate subpackages.
    pub subpackages: BTreeSet<String>,
}

/// Unit paths of one container plus all of their ancestor directories.
///
/// Directory entries end with `/`; units in the default package contribute
/// the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryIndex {
    entries: HashSet<String>,
}

impl EntryIndex {
    /// Index the given entry paths. Paths that are not units are ignored.
    pub fn from_units<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for path in paths {
            index.add_unit(path.as_ref());
        }
        index
    }

    /// Add one entry path and its ancestor directories.
    pub fn add_unit(&mut self, path: &str) {
        if !path.ends_with(UNIT_SUFFIX) {
            return;
        }
        self.entries.insert(path.to_string());

        let mut cut = path.rfind('/');
        if cut.is_none() {
            self.entries.insert(String::new());
        }
        while let Some(i) = cut {
            self.entries.insert(path[..=i].to_string());
            cut = path[..i].rfind('/');
        }
    }

    /// Whether `path` (a unit or a `/`-terminated directory) is present.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains(path)
    }

    /// Number of indexed paths, directories included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container holds no units.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Partition the units under `package` into top-level classes and
    /// subpackages, or `None` if the container has nothing under it.
    pub fn classify(&self, package: &str) -> Option<Listing> {
        let prefix = path_prefix(package);
        if !self.entries.contains(&prefix) {
            return None;
        }

        let mut listing = Listing::default();
        for entry in &self.entries {
            let Some(rest) = entry.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let Some(stem) = rest.strip_suffix(UNIT_SUFFIX) else {
                continue;
            };
            if let Some(slash) = rest.find('/') {
                let subpackage = &entry[..prefix.len() + slash];
                listing.subpackages.insert(subpackage.replace('/', "."));
            } else if is_top_level(stem) {
                let unit = &entry[..entry.len() - UNIT_SUFFIX.len()];
                listing.class_names.insert(unit.replace('/', "."));
            }
        }
        Some(listing)
    }
}

/// The directory prefix of a package: `java.util` → `java/util/`, and the
/// empty string for the default package.
pub fn path_prefix(package: &str) -> String {
    if package.is_empty() {
        String::new()
    } else {
        format!("{}/", package.replace('.', "/"))
    }
}

/// The unit path of a canonical name: `p.Outer$Inner` → `p/Outer$Inner.type.json`.
pub fn unit_path(name: &str) -> String {
    format!("{}{UNIT_SUFFIX}", name.replace('.', "/"))
}

/// Nested and local types carry a `$` in their binary name.
fn is_top_level(file_stem: &str) -> bool {
    !file_stem.contains('$')
}

/// The containers named by the module path, with lazily built entry indexes.
#[derive(Debug, Default)]
pub struct ModulePath {
    containers: Vec<PathBuf>,
    indexes: RefCell<HashMap<PathBuf, Arc<EntryIndex>>>,
}

impl ModulePath {
    /// A module path over `containers`, searched in order.
    pub fn new(containers: Vec<PathBuf>) -> Self {
        Self {
            containers,
            indexes: RefCell::new(HashMap::new()),
        }
    }

    /// The module path described by `config`.
    pub fn from_config(config: &ModulePathConfig) -> Self {
        Self::new(config.containers())
    }

    /// The containers joined for display.
    pub fn display(&self) -> String {
        self.containers
            .iter()
            .map(|c| c.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn read_index(container: &Path) -> Result<EntryIndex, DiscoveryError> {
        if container.is_dir() {
            let mut index = EntryIndex::default();
            for entry in WalkDir::new(container) {
                let entry = entry.map_err(|source| DiscoveryError::Walk {
                    path: container.to_path_buf(),
                    source,
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(container) else {
                    continue;
                };
                let unit = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                index.add_unit(&unit);
            }
            return Ok(index);
        }

        let file = File::open(container).map_err(|source| DiscoveryError::Io {
            path: container.to_path_buf(),
            source,
        })?;
        let archive = ZipArchive::new(file).map_err(|source| DiscoveryError::Archive {
            path: container.to_path_buf(),
            source,
        })?;
        Ok(EntryIndex::from_units(archive.file_names()))
    }

    /// Read the raw descriptor text of `unit` from `container`.
    fn read_unit(container: &Path, unit: &str, name: &str) -> Result<String, LoadError> {
        let read_error = |source| LoadError::Read {
            name: name.to_string(),
            container: container.to_path_buf(),
            source,
        };

        if container.is_dir() {
            return fs::read_to_string(container.join(unit)).map_err(read_error);
        }

        let file = File::open(container).map_err(read_error)?;
        let archive_error = |source| LoadError::Archive {
            name: name.to_string(),
            container: container.to_path_buf(),
            source,
        };
        let mut archive = ZipArchive::new(file).map_err(archive_error)?;
        let mut entry = archive.by_name(unit).map_err(archive_error)?;
        let mut text = String::new();
        entry.read_to_string(&mut text).map_err(read_error)?;
        Ok(text)
    }
}

impl Locator for ModulePath {
    fn list_containers(&self) -> &[PathBuf] {
        &self.containers
    }

    fn index_entries(&self, container: &Path) -> Result<Arc<EntryIndex>, DiscoveryError> {
        if let Some(index) = self.indexes.borrow().get(container) {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(Self::read_index(container)?);
        tracing::debug!(
            "Indexed {} ({} entries)",
            container.display(),
            index.len()
        );
        self.indexes
            .borrow_mut()
            .insert(container.to_path_buf(), Arc::clone(&index));
        Ok(index)
    }
}

/// A [`TypeSystem`] backed by the bootstrap types and the units on a
/// [`ModulePath`].
///
/// Bootstrap types win over units of the same name; among containers the
/// first one holding the unit wins. Loaded handles are cached for the run.
#[derive(Debug)]
pub struct ModulePathTypes<'a> {
    module_path: &'a ModulePath,
    bootstrap: TypeRegistry,
    loaded: RefCell<HashMap<String, Arc<TypeHandle>>>,
}

impl<'a> ModulePathTypes<'a> {
    /// Load types from `module_path`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the embedded bootstrap descriptors are
    /// malformed.
    pub fn new(module_path: &'a ModulePath) -> Result<Self, LoadError> {
        Ok(Self {
            module_path,
            bootstrap: TypeRegistry::with_bootstrap()?,
            loaded: RefCell::new(HashMap::new()),
        })
    }

    fn load_unit(&self, name: &str) -> Result<Arc<TypeHandle>, LoadError> {
        let unit = unit_path(name);
        for container in self.module_path.list_containers() {
            let index = match self.module_path.index_entries(container) {
                Ok(index) => index,
                Err(e) => {
                    tracing::debug!("Not searching {}: {e}", container.display());
                    continue;
                }
            };
            if !index.contains(&unit) {
                continue;
            }

            let text = ModulePath::read_unit(container, &unit, name)?;
            let mut handle: TypeHandle =
                serde_json::from_str(&text).map_err(|source| LoadError::Malformed {
                    name: name.to_string(),
                    source,
                })?;
            if handle.name != name {
                return Err(LoadError::NameMismatch {
                    expected: name.to_string(),
                    found: handle.name,
                });
            }
            handle.normalize();
            handle.validate().map_err(|source| LoadError::Invalid {
                name: name.to_string(),
                source,
            })?;
            tracing::trace!("Loaded {name} from {}", container.display());
            return Ok(Arc::new(handle));
        }
        Err(LoadError::NotFound(name.to_string()))
    }
}

impl TypeSystem for ModulePathTypes<'_> {
    fn load(&self, name: &str) -> Result<Arc<TypeHandle>, LoadError> {
        if self.bootstrap.contains(name) {
            return self.bootstrap.load(name);
        }
        if let Some(handle) = self.loaded.borrow().get(name) {
            return Ok(Arc::clone(handle));
        }
        let handle = self.load_unit(name)?;
        self.loaded
            .borrow_mut()
            .insert(name.to_string(), Arc::clone(&handle));
        Ok(handle)
    }
}
