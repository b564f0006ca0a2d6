//! The report command.

use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use apidump_core::{ApiDump, ModulePath, ModulePathConfig, ModulePathTypes};

use crate::Cli;

/// Print the usage summary shown when no package is given.
pub fn print_usage() {
    println!("Usage: apidump [options] <package names...>");
    println!();
    println!("Options:");
    println!("  --grep-format: include type name on every line");
    println!("  --include-inherited: include members inherited from supertypes");
}

/// Write the report of the requested packages to stdout.
///
/// # Errors
///
/// Fails if a discovered type cannot be loaded or stdout cannot be written.
pub fn dump(cli: &Cli) -> Result<()> {
    if cli.packages.is_empty() {
        print_usage();
        return Ok(());
    }

    let mut config = ModulePathConfig::from_env();
    if let Some(paths) = &cli.module_path {
        config = config.with_module_path(paths);
    }
    let module_path = ModulePath::from_config(&config);
    tracing::info!("Scanning {}", module_path.display());

    let types = ModulePathTypes::new(&module_path).context("Failed to load bootstrap types")?;
    let dump = ApiDump::new(&module_path, &types, cli.options());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = dump
        .dump(&cli.packages, &mut out)
        .context("API dump failed")?;

    tracing::debug!(
        "Rendered {} types; {} empty packages",
        summary.types_rendered,
        summary.empty_packages.len()
    );
    Ok(())
}
