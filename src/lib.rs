//! Offline pipeline for the QH static header table.
//!
//! `qh-aggregate` ranks captured headers into a curation document;
//! `qh-generate` turns the curated document into the table artifacts.

use clap::Parser;
use qh_core::{CurationSheet, PipelineConfig, QhError, Result};
use qh_codec::{render_all, TableBuilder};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Rank captured header observations into a curation document.
#[derive(Parser, Debug)]
#[command(name = "qh-aggregate", version)]
pub struct AggregateCli {
    /// TOML pipeline config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Capture files (JSON arrays of {type, name, value, count})
    #[arg(required = true)]
    pub captures: Vec<PathBuf>,
}

/// Build the static header table from a curated document.
#[derive(Parser, Debug)]
#[command(name = "qh-generate", version)]
pub struct GenerateCli {
    /// TOML pipeline config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Curated document; discovered in the working directory when omitted
    pub curated: Option<PathBuf>,
}

/// Logs go to stderr. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Aggregates every capture and writes the curation document.
pub fn run_aggregate(config: &PipelineConfig, captures: &[PathBuf]) -> Result<PathBuf> {
    let sheet = qh_aggregate::aggregate_files(captures, &config.aggregate)?;
    let contents = sheet.to_json()?;
    let path = config.aggregate.output.clone();
    qh_core::io::write_atomic(&path, &contents)?;
    tracing::info!("Curation document created: {}", path.display());
    Ok(path)
}

/// Picks the curated document: exactly one match is expected in `dir`.
/// With several matches the first in name order wins and a warning is logged.
pub fn discover_curation(dir: &Path, pattern: &str) -> Result<PathBuf> {
    let matcher = glob::Pattern::new(pattern).map_err(|e| QhError::input(pattern, e))?;
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| QhError::input(dir, e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| matcher.matches(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .collect();
    found.sort();

    match found.len() {
        0 => Err(QhError::input(
            dir,
            format!("no curated document matching `{pattern}`; run qh-aggregate first"),
        )),
        1 => Ok(found.remove(0)),
        n => {
            tracing::warn!("{} curated documents match `{}`, using {}", n, pattern, found[0].display());
            Ok(found.remove(0))
        }
    }
}

/// Builds the table and writes all artifacts, or writes nothing.
pub fn run_generate(config: &PipelineConfig, curated: Option<&Path>, search_dir: &Path) -> Result<Vec<PathBuf>> {
    let path = match curated {
        Some(p) => p.to_path_buf(),
        None => discover_curation(search_dir, &config.output.curation_glob)?,
    };
    tracing::info!("Reading from: {}", path.display());
    let sheet = CurationSheet::read(&path)?;

    let builder = TableBuilder::new(config.table.clone())?;
    let table = builder.build(&sheet)?;
    let artifacts = render_all(&table, &config.output)?;
    qh_core::io::write_all(&artifacts)?;

    for artifact in &artifacts {
        tracing::info!("Created: {}", artifact.path.display());
    }
    Ok(artifacts.into_iter().map(|a| a.path).collect())
}

/// Shared `main` tail: report the error and exit with its status.
pub fn exit_on_error<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
