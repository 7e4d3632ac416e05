//! # repolens
//!
//! **CLI Binary**
//!
//! Entry point for the `repolens` command-line application: parse arguments,
//! install the tracing subscriber, hand the repository root to
//! `repolens-core` and print the resulting JSON document to stdout.
//!
//! This crate contains no analysis logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "repolens",
    version,
    about = "Describe a repository's technology composition as JSON"
)]
pub struct Cli {
    /// Repository root to analyze (an already-materialized local clone).
    pub path: PathBuf,

    /// Repository name recorded in the output; defaults to the directory
    /// basename.
    #[arg(long)]
    pub name: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Verbose diagnostics on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = repolens_core::analyze(&cli.path, cli.name.as_deref())?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("serializing analysis result")?;
    println!("{json}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
