//! Module path configuration.

use std::ffi::OsStr;
use std::path::PathBuf;

/// Environment variable listing boot containers, searched before the module
/// path.
pub const BOOT_PATH_ENV: &str = "APIDUMP_BOOT_PATH";

/// Environment variable listing module path containers.
pub const MODULE_PATH_ENV: &str = "APIDUMP_MODULE_PATH";

/// Where compiled units are looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulePathConfig {
    /// Boot containers, searched first.
    pub boot: Vec<PathBuf>,
    /// Module path containers, in order.
    pub module: Vec<PathBuf>,
}

impl ModulePathConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            boot: std::env::var_os(BOOT_PATH_ENV)
                .map(|v| split(&v))
                .unwrap_or_default(),
            module: std::env::var_os(MODULE_PATH_ENV)
                .map(|v| split(&v))
                .unwrap_or_default(),
        }
    }

    /// Replace the module path with a platform path list such as
    /// `lib/a.zip:lib/classes`.
    pub fn with_module_path(mut self, paths: &OsStr) -> Self {
        self.module = split(paths);
        self
    }

    /// All containers in search order, boot first. A container listed twice
    /// is kept at its first position.
    pub fn containers(&self) -> Vec<PathBuf> {
        let mut containers: Vec<PathBuf> = Vec::with_capacity(self.boot.len() + self.module.len());
        for path in self.boot.iter().chain(&self.module) {
            if !containers.contains(path) {
                containers.push(path.clone());
            }
        }
        containers
    }
}

/// Split a platform path list, dropping empty entries.
fn split(paths: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(paths)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_containers_put_boot_first_and_dedupe() {
        let config = ModulePathConfig {
            boot: vec![PathBuf::from("rt.zip")],
            module: vec![
                PathBuf::from("a.zip"),
                PathBuf::from("rt.zip"),
                PathBuf::from("classes"),
            ],
        };
        assert_eq!(
            config.containers(),
            vec![
                PathBuf::from("rt.zip"),
                PathBuf::from("a.zip"),
                PathBuf::from("classes"),
            ]
        );
    }

    #[test]
    fn test_with_module_path_splits_platform_list() {
        let list = std::env::join_paths(["a.zip", "classes"]).unwrap();
        let config = ModulePathConfig::default().with_module_path(&list);
        assert_eq!(
            config.module,
            vec![PathBuf::from("a.zip"), PathBuf::from("classes")]
        );

        let config = ModulePathConfig::default().with_module_path(&OsString::new());
        assert!(config.containers().is_empty());
    }
}
