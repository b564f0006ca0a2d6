//! Core library for apidump.
//!
//! Scans packages on a module path, walks each type's supertype graph to
//! assemble its member surface, reduces it and renders a deterministic text
//! report.

pub mod config;
pub mod dump;
pub mod error;
pub mod locator;
pub mod member;
pub mod ordering;
pub mod reducer;
pub mod render;
pub mod scanner;
pub mod type_system;
pub mod walker;

// Re-exports
pub use config::ModulePathConfig;
pub use dump::{ApiDump, DumpOptions, DumpSummary};
pub use error::{DiscoveryError, DumpError, LoadError};
pub use locator::{EntryIndex, Locator, ModulePath, ModulePathTypes};
pub use render::Format;
pub use type_system::{TypeRegistry, TypeSystem};
