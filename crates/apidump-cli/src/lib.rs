//! apidump - plain text API reports.
//!
//! Writes a deterministic, diff-friendly description of the public and
//! protected API of a set of packages found on a module path. Containers are
//! zip archives or directories of `.type.json` type descriptors.

pub mod cmd;

use std::ffi::OsString;

use apidump_core::DumpOptions;
use apidump_core::config::MODULE_PATH_ENV;
use clap::Parser;

/// Command line of the `apidump` binary.
#[derive(Debug, Parser)]
#[command(name = "apidump")]
#[command(version, about = "apidump - plain text API reports for packages")]
pub struct Cli {
    /// Include type name on every line
    #[arg(long)]
    pub grep_format: bool,

    /// Include members inherited from supertypes
    #[arg(long)]
    pub include_inherited: bool,

    /// Containers (zip archives or directories) to search, as a platform path list
    #[arg(long, env = MODULE_PATH_ENV, value_name = "PATHS")]
    pub module_path: Option<OsString>,

    /// Packages to report, e.g. `java.util`
    pub packages: Vec<String>,
}

impl Cli {
    /// The report options selected by the flags.
    pub const fn options(&self) -> DumpOptions {
        DumpOptions {
            grep_format: self.grep_format,
            include_inherited: self.include_inherited,
        }
    }
}
