//! wireplan generator.
//!
//! Reads a schema document, builds and seals the object model, plans every
//! configured wire format and writes the plans (and optionally Rust type
//! declarations) into the output directory.
//!
//! ```text
//! wireplan-gen <schema.json> [output-dir]
//! ```
//!
//! Configuration comes from `WIREPLAN_*` environment variables; see
//! [`GeneratorConfig::from_env`].

mod ingest;
mod schema;
mod typegen;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wireplan_core::{CancellationToken, GeneratorConfig};
use wireplan_planner::Planner;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the configured log level.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = GeneratorConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    let args: Vec<String> = std::env::args().collect();
    let schema_path = args
        .get(1)
        .map(PathBuf::from)
        .context("usage: wireplan-gen <schema.json> [output-dir]")?;
    let output_dir = args
        .get(2)
        .map_or_else(|| PathBuf::from(&config.output_dir), PathBuf::from);

    let files = run(&schema_path, &config, &CancellationToken::new())?;
    for (name, content) in &files {
        let full_path = output_dir.join(name);
        ensure_parent_dir(&full_path)?;
        fs::write(&full_path, content)
            .with_context(|| format!("failed to write {}", full_path.display()))?;
        info!(path = %full_path.display(), "wrote output");
    }

    info!(files = files.len(), "generation complete");
    Ok(())
}

/// Run one generation and return `(file name, content)` pairs.
///
/// Nothing is written if any step fails or the run is cancelled.
fn run(
    schema_path: &Path,
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Result<Vec<(String, String)>> {
    info!(schema = %schema_path.display(), "reading schema");
    let raw = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema file: {}", schema_path.display()))?;
    let schema: schema::Schema =
        serde_json::from_str(&raw).context("failed to parse schema document")?;

    let registry = ingest::build_registry(&schema)?;
    let planner = Planner::new(&registry)?;
    let plan_sets = planner
        .plan_formats(&config.formats, cancel, config.parallel)
        .context("failed to plan wire formats")?;

    let mut files = Vec::with_capacity(plan_sets.len() + 1);
    for plans in &plan_sets {
        let json = serde_json::to_string_pretty(plans)
            .with_context(|| format!("failed to serialize {} plans", plans.format))?;
        files.push((format!("plans.{}.json", plans.format), json));
    }
    if config.emit_types {
        files.push(("types.rs".to_owned(), typegen::generate_types(&registry)?));
    }
    Ok(files)
}

/// Ensure the parent directory of a path exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
