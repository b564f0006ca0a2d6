//! apidump - plain text API reports

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use apidump_cli::Cli;
use apidump_cli::cmd;

fn main() -> Result<()> {
    // Initialize logging; the report owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cmd::dump::dump(&cli)
}
