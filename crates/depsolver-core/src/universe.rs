use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use depsolver_util::errors::DepsolverError;

/// Every known cookbook: name → version string → metadata.
pub type Universe = BTreeMap<String, BTreeMap<String, VersionEntry>>;

/// Metadata for a single cookbook version in the universe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Dependency name → constraint string, e.g. `"apt" => ">= 2.0.0"`.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Fields we carry through untouched (`location_path`, `updated_at`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VersionEntry {
    pub fn with_dependencies<I, K, V>(deps: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            dependencies: deps
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            extra: serde_json::Map::new(),
        }
    }
}

/// A universe snapshot as captured to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniverseFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub universe: Universe,
}

impl UniverseFile {
    pub fn new(universe: Universe) -> Self {
        Self {
            timestamp: Some(crate::timestamp_now()),
            universe,
        }
    }

    /// Load and validate a universe file.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = depsolver_util::fs::read_input_file(path)?;
        Self::parse(&content).map_err(|message| {
            DepsolverError::InputFile {
                path: path.display().to_string(),
                message,
            }
            .into()
        })
    }

    /// Parse universe JSON, returning a human-readable reason on failure.
    pub fn parse(content: &str) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| format!("is not valid JSON: {e}"))?;
        if !value.get("universe").is_some_and(|u| u.is_object()) {
            return Err("does not contain a cookbook universe Hash.".to_string());
        }
        serde_json::from_value(value).map_err(|e| format!("has a malformed universe: {e}"))
    }

    pub fn to_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Total number of cookbook versions across all cookbooks.
    pub fn version_count(&self) -> usize {
        self.universe.values().map(BTreeMap::len).sum()
    }
}
