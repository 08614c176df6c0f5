use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use depsolver_util::errors::DepsolverError;

/// Environment cookbook constraints as captured to disk.
///
/// `environment_constraints` maps a cookbook name to a constraint string such
/// as `"= 1.2.0"` or `"~> 2.1"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub environment_name: String,
    #[serde(default)]
    pub environment_constraints: BTreeMap<String, String>,
}

impl Default for EnvironmentFile {
    fn default() -> Self {
        Self {
            timestamp: None,
            environment_name: crate::DEFAULT_ENVIRONMENT.to_string(),
            environment_constraints: BTreeMap::new(),
        }
    }
}

impl EnvironmentFile {
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

    pub fn parse(content: &str) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| format!("is not valid JSON: {e}"))?;

        let has_name = value
            .get("environment_name")
            .and_then(|n| n.as_str())
            .is_some_and(|n| !n.is_empty());
        if !has_name {
            return Err("does not contain an environment name.".to_string());
        }
        if !value
            .get("environment_constraints")
            .is_some_and(|c| c.is_object())
        {
            return Err("does not contain a Hash of environment constraints.".to_string());
        }

        serde_json::from_value(value)
            .map_err(|e| format!("has malformed environment constraints: {e}"))
    }

    pub fn to_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_default(&self) -> bool {
        self.environment_name == crate::DEFAULT_ENVIRONMENT
    }
}
