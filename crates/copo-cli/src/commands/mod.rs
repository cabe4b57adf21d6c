//! Subcommand implementations and the helpers they share.

pub mod class;
pub mod init;
pub mod po;
pub mod report;
pub mod student;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use copo_core::parser;
use copo_core::{AttainmentEngine, IntegrityFault, MemoryStore};

use crate::config::{CopoConfig, OutputFormat};

/// Settings resolved from the config file and the global flags.
pub struct Session {
    pub config: CopoConfig,
    pub dataset: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Session {
    /// Command-line flags take precedence over the config file.
    pub fn new(config: CopoConfig, dataset: Option<PathBuf>, format: Option<OutputFormat>) -> Self {
        let dataset = dataset.or_else(|| config.dataset_path());
        let format = format.unwrap_or(config.format);
        Self {
            config,
            dataset,
            format,
        }
    }

    /// The dataset path, or an error explaining how to set one.
    pub fn dataset_path(&self) -> Result<&Path> {
        self.dataset.as_deref().context(
            "no dataset configured: pass --dataset, set COPO_DATASET, or add `dataset` to copo.toml",
        )
    }

    /// Load the dataset into a memory store and wrap it in an engine.
    pub fn engine(&self) -> Result<AttainmentEngine> {
        let path = self.dataset_path()?;
        let records = parser::load_dataset(path)
            .with_context(|| format!("failed to load dataset: {}", path.display()))?;
        tracing::info!(
            "loaded {}: {} course(s), {} student(s), {} mark(s)",
            path.display(),
            records.courses.len(),
            records.students.len(),
            records.marks.len()
        );

        let warnings = parser::validate_records(&records);
        if !warnings.is_empty() {
            tracing::debug!(
                "{} validation warning(s), run `copo validate` for details",
                warnings.len()
            );
        }

        Ok(AttainmentEngine::new(Arc::new(MemoryStore::new(records))))
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Print integrity faults as warnings on stderr. Returns how many there were.
pub fn report_faults(faults: &[IntegrityFault]) -> usize {
    for fault in faults {
        eprintln!("Warning: {fault}");
    }
    faults.len()
}

/// Format a percentage for table output.
pub fn pct(value: f64) -> String {
    format!("{value:.2}%")
}
