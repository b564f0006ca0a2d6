//! Error taxonomy for scanning, loading and dumping.
//!
//! - [`DiscoveryError`]: a container could not be indexed. Callers log it and
//!   skip the container.
//! - [`LoadError`]: a name could not be turned into a type handle. Always
//!   fatal for the run.
//! - [`DumpError`]: what a whole dump can fail with.

use std::path::PathBuf;

use apidump_schema::DescriptorError;
use thiserror::Error;

/// A container on the module path could not be indexed.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The container could not be opened or read.
    #[error("Cannot read container {}: {source}", path.display())]
    Io {
        /// Container path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The container is not a readable zip archive.
    #[error("Corrupt archive {}: {source}", path.display())]
    Archive {
        /// Container path.
        path: PathBuf,
        /// Underlying error.
        source: zip::result::ZipError,
    },

    /// A directory container could not be traversed.
    #[error("Cannot walk directory {}: {source}", path.display())]
    Walk {
        /// Container path.
        path: PathBuf,
        /// Underlying error.
        source: walkdir::Error,
    },
}

/// A type name could not be loaded into a handle.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No container and no bootstrap entry provides the name.
    #[error("Type not found: {0}")]
    NotFound(String),

    /// The unit exists but could not be read.
    #[error("Cannot read {name} from {}: {source}", container.display())]
    Read {
        /// Requested canonical name.
        name: String,
        /// Container holding the unit.
        container: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The unit exists in an archive that could not be read.
    #[error("Cannot read {name} from archive {}: {source}", container.display())]
    Archive {
        /// Requested canonical name.
        name: String,
        /// Container holding the unit.
        container: PathBuf,
        /// Underlying error.
        source: zip::result::ZipError,
    },

    /// The unit is not a well-formed type descriptor.
    #[error("Malformed type descriptor for {name}: {source}")]
    Malformed {
        /// Requested canonical name.
        name: String,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The descriptor parsed but breaks a model invariant.
    #[error("Invalid type descriptor for {name}: {source}")]
    Invalid {
        /// Requested canonical name.
        name: String,
        /// Underlying error.
        source: DescriptorError,
    },

    /// The descriptor describes a different type than its path says.
    #[error("Unit for {expected} describes {found}")]
    NameMismatch {
        /// Name derived from the unit path.
        expected: String,
        /// Name inside the descriptor.
        found: String,
    },
}

/// A dump could not be completed.
#[derive(Error, Debug)]
pub enum DumpError {
    /// A discovered or referenced type could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The report could not be written.
    #[error("Failed to write report: {0}")]
    Write(#[from] std::io::Error),
}
