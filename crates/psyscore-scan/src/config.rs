//! psyscore configuration and scanner factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use psyscore_core::traits::SheetScanner;

use crate::mock::{MockScanner, DEFAULT_QUESTIONS_PER_SECTION, DEFAULT_SECTIONS};
use crate::sheet::MarkSheetScanner;

/// Which scan adapter reads answer sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScannerConfig {
    /// Decode bubble-mark JSON files produced by an external detector.
    #[default]
    MarkSheet,
    /// Return a synthetic sheet after a simulated delay.
    Mock {
        #[serde(default = "default_delay_ms")]
        delay_ms: u64,
        #[serde(default = "default_sections")]
        sections: u32,
        #[serde(default = "default_questions")]
        questions_per_section: usize,
    },
}

impl ScannerConfig {
    /// The mock scanner with its default settings.
    pub fn default_mock() -> Self {
        ScannerConfig::Mock {
            delay_ms: default_delay_ms(),
            sections: default_sections(),
            questions_per_section: default_questions(),
        }
    }
}

fn default_delay_ms() -> u64 {
    2000
}
fn default_sections() -> u32 {
    DEFAULT_SECTIONS
}
fn default_questions() -> usize {
    DEFAULT_QUESTIONS_PER_SECTION
}

/// Top-level psyscore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsyscoreConfig {
    /// Answer key file or directory.
    #[serde(default = "default_answer_keys")]
    pub answer_keys: PathBuf,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Scan adapter settings.
    #[serde(default)]
    pub scanner: ScannerConfig,
}

fn default_answer_keys() -> PathBuf {
    PathBuf::from("./answer-keys")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./psyscore-results")
}

impl Default for PsyscoreConfig {
    fn default() -> Self {
        Self {
            answer_keys: default_answer_keys(),
            output_dir: default_output_dir(),
            scanner: ScannerConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `psyscore.toml` in the current directory
/// 2. `~/.config/psyscore/config.toml`
///
/// Environment variable overrides: `PSYSCORE_ANSWER_KEYS`, `PSYSCORE_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<PsyscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("psyscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<PsyscoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => PsyscoreConfig::default(),
    };

    if let Ok(keys) = std::env::var("PSYSCORE_ANSWER_KEYS") {
        config.answer_keys = PathBuf::from(keys);
    }
    if let Ok(output) = std::env::var("PSYSCORE_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(output);
    }

    config.answer_keys = resolve_path(&config.answer_keys);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("psyscore"))
}

/// Create a scanner instance from its configuration.
pub fn create_scanner(config: &ScannerConfig) -> Box<dyn SheetScanner> {
    match config {
        ScannerConfig::MarkSheet => Box::new(MarkSheetScanner::new()),
        ScannerConfig::Mock {
            delay_ms,
            sections,
            questions_per_section,
        } => Box::new(
            MockScanner::synthetic(*sections, *questions_per_section)
                .with_delay(Duration::from_millis(*delay_ms)),
        ),
    }
}
