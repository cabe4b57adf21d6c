//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables.
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Top-level copo configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopoConfig {
    /// Default dataset file or directory. `${VAR}` references are expanded.
    #[serde(default)]
    pub dataset: Option<String>,
    /// Default output format.
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    /// Exit with status 2 when any integrity fault is reported.
    #[serde(default)]
    pub fail_on_fault: bool,
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

impl Default for CopoConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            format: default_format(),
            fail_on_fault: false,
        }
    }
}

impl CopoConfig {
    /// The configured dataset path, if any.
    pub fn dataset_path(&self) -> Option<PathBuf> {
        self.dataset
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut cursor = 0;
    while let Some(offset) = result[cursor..].find("${") {
        let start = cursor + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        // Expanded values are not rescanned.
        cursor = start + value.len();
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `path`, when given (it must exist)
/// 2. `copo.toml` in the current directory
/// 3. `~/.config/copo/config.toml`
///
/// `COPO_DATASET` overrides the `dataset` field.
pub fn load_config_from(path: Option<&Path>) -> Result<CopoConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("copo.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CopoConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CopoConfig::default(),
    };

    if let Some(path) = &config_path {
        tracing::debug!("loaded config from {}", path.display());
    }

    if let Ok(dataset) = std::env::var("COPO_DATASET") {
        config.dataset = Some(dataset);
    }

    config.dataset = config.dataset.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("copo"))
}
