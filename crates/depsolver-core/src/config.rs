use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration loaded from `~/.depsolver/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub solver: SolverConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Solver settings from `[solver]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Search deadline in milliseconds.
    #[serde(default = "default_timeout_ms", rename = "timeout-ms")]
    pub timeout_ms: u64,
    /// Emit a trace event for every search step.
    #[serde(default, rename = "trace-search")]
    pub trace_search: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            trace_search: false,
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Output settings from `[output]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory that filtered universes are written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl GlobalConfig {
    /// Load the global configuration from `~/.depsolver/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            depsolver_util::errors::DepsolverError::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        toml::from_str(&content).map_err(|e| {
            depsolver_util::errors::DepsolverError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the depsolver data directory (`~/.depsolver/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".depsolver")
}
