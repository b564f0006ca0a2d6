//! Package discovery across the containers of a [`Locator`].

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use apidump_schema::TypeHandle;

use crate::error::LoadError;
use crate::locator::Locator;
use crate::type_system::TypeSystem;

/// The result of scanning one package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Dotted package name; empty for the default package.
    pub name: String,
    /// Immediate subpackages found in any container.
    pub subpackages: BTreeSet<String>,
    /// Loaded top-level types of the package itself.
    pub top_level_types: BTreeSet<Arc<TypeHandle>>,
}

impl Package {
    /// Whether no container holds a top-level type of this package.
    pub fn is_empty(&self) -> bool {
        self.top_level_types.is_empty()
    }
}

/// Finds the top-level types of packages and loads them.
pub struct PackageScanner<'a> {
    locator: &'a dyn Locator,
    types: &'a dyn TypeSystem,
    skipped: RefCell<HashSet<PathBuf>>,
}

impl std::fmt::Debug for PackageScanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageScanner")
            .field("containers", &self.locator.list_containers())
            .field("skipped", &self.skipped.borrow())
            .finish_non_exhaustive()
    }
}

impl<'a> PackageScanner<'a> {
    /// A scanner listing units through `locator` and loading them through
    /// `types`.
    pub fn new(locator: &'a dyn Locator, types: &'a dyn TypeSystem) -> Self {
        Self {
            locator,
            types,
            skipped: RefCell::new(HashSet::new()),
        }
    }

    /// Scan `package` in every container.
    ///
    /// Containers that cannot be indexed are logged once and skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a discovered type cannot be loaded.
    pub fn scan(&self, package: &str) -> Result<Package, LoadError> {
        let mut class_names = BTreeSet::new();
        let mut subpackages = BTreeSet::new();

        for container in self.locator.list_containers() {
            if self.skipped.borrow().contains(container) {
                continue;
            }
            let index = match self.locator.index_entries(container) {
                Ok(index) => index,
                Err(e) => {
                    tracing::warn!("Skipping container: {e}");
                    self.skipped.borrow_mut().insert(container.clone());
                    continue;
                }
            };
            let Some(listing) = index.classify(package) else {
                continue;
            };
            class_names.extend(listing.class_names);
            subpackages.extend(listing.subpackages);
        }

        let top_level_types = class_names
            .iter()
            .map(|name| self.types.load(name))
            .collect::<Result<BTreeSet<_>, _>>()?;
        tracing::debug!(
            "Package '{package}': {} types, {} subpackages",
            top_level_types.len(),
            subpackages.len()
        );

        Ok(Package {
            name: package.to_string(),
            subpackages,
            top_level_types,
        })
    }

    /// The top-level types of `package` and of all its subpackages.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a discovered type cannot be loaded.
    pub fn top_level_types_recursive(
        &self,
        package: &str,
    ) -> Result<BTreeSet<Arc<TypeHandle>>, LoadError> {
        let mut types = BTreeSet::new();
        let mut pending = vec![package.to_string()];
        let mut visited = HashSet::new();

        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let scanned = self.scan(&name)?;
            types.extend(scanned.top_level_types);
            pending.extend(scanned.subpackages);
        }
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{EntryIndex, ModulePath, ModulePathTypes, unit_path};
    use crate::testing::registry;
    use serde_json::json;
    use std::fs;

    fn names(types: &BTreeSet<Arc<TypeHandle>>) -> Vec<&str> {
        types.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_scan_lists_top_level_types_and_subpackages() {
        let types = registry(&[
            json!({"name": "p.B", "modifiers": ["public"]}),
            json!({"name": "p.A", "modifiers": ["public"], "member_types": ["p.A$Inner"]}),
            json!({"name": "p.A$Inner", "modifiers": ["public", "static"]}),
            json!({"name": "p.q.C"}),
        ]);
        let scanner = PackageScanner::new(&types, &types);

        let package = scanner.scan("p").unwrap();
        assert_eq!(package.name, "p");
        assert_eq!(names(&package.top_level_types), vec!["p.A", "p.B"]);
        assert_eq!(package.subpackages.iter().collect::<Vec<_>>(), vec!["p.q"]);

        let all = scanner.top_level_types_recursive("p").unwrap();
        assert_eq!(names(&all), vec!["p.A", "p.B", "p.q.C"]);
    }

    #[test]
    fn test_empty_package() {
        let types = registry(&[json!({"name": "p.A"})]);
        let scanner = PackageScanner::new(&types, &types);
        let package = scanner.scan("nothing.here").unwrap();
        assert!(package.is_empty());
        assert!(package.subpackages.is_empty());
        assert!(scanner.top_level_types_recursive("nothing").unwrap().is_empty());
    }

    /// A locator whose index names a unit the type system cannot load.
    struct Inconsistent {
        containers: [PathBuf; 1],
    }

    impl Locator for Inconsistent {
        fn list_containers(&self) -> &[PathBuf] {
            &self.containers
        }

        fn index_entries(
            &self,
            _container: &std::path::Path,
        ) -> Result<Arc<EntryIndex>, crate::error::DiscoveryError> {
            Ok(Arc::new(EntryIndex::from_units([unit_path("p.Ghost")])))
        }
    }

    #[test]
    fn test_unloadable_discovered_type_is_fatal() {
        let types = registry(&[]);
        let locator = Inconsistent {
            containers: [PathBuf::from("ghosts")],
        };
        let scanner = PackageScanner::new(&locator, &types);
        let err = scanner.scan("p").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(name) if name == "p.Ghost"));
    }

    #[test]
    fn test_broken_container_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let classes = tmp.path().join("classes");
        let unit = classes.join(unit_path("p.A"));
        fs::create_dir_all(unit.parent().unwrap()).unwrap();
        fs::write(&unit, r#"{"name": "p.A", "modifiers": ["public"]}"#).unwrap();
        let broken = tmp.path().join("broken.zip");
        fs::write(&broken, b"PK but not really").unwrap();

        let module_path = ModulePath::new(vec![broken, classes]);
        let types = ModulePathTypes::new(&module_path).unwrap();
        let scanner = PackageScanner::new(&module_path, &types);

        assert_eq!(names(&scanner.scan("p").unwrap().top_level_types), vec!["p.A"]);
        assert_eq!(scanner.skipped.borrow().len(), 1);
        // The second scan does not retry the broken container.
        assert_eq!(names(&scanner.scan("p").unwrap().top_level_types), vec!["p.A"]);
    }
}
