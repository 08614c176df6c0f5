//! Conversion of a CSV universe export into the JSON universe format.
//!
//! Each line is `name,version,updated_at,<dependencies as JSON>`. Only the
//! first three commas separate fields; the dependency JSON keeps its own.

use std::collections::BTreeMap;

use depsolver_util::errors::DepsolverError;

use crate::universe::{Universe, UniverseFile, VersionEntry};

/// Convert CSV universe rows into a [`UniverseFile`] stamped with the current time.
pub fn csv_to_universe(contents: &str) -> Result<UniverseFile, DepsolverError> {
    let mut universe = Universe::new();

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.splitn(4, ',').collect();
        let [name, version, updated_at, dependencies] = fields.as_slice() else {
            return Err(DepsolverError::Generic {
                message: format!(
                    "CSV line {}: expected name,version,updated_at,dependencies",
                    lineno + 1
                ),
            });
        };

        let dependencies: BTreeMap<String, String> = serde_json::from_str(dependencies.trim())
            .map_err(|e| DepsolverError::Generic {
                message: format!("CSV line {}: invalid dependency JSON: {e}", lineno + 1),
            })?;

        let mut entry = VersionEntry {
            dependencies,
            ..VersionEntry::default()
        };
        entry.extra.insert(
            "updated_at".to_string(),
            serde_json::Value::String(updated_at.to_string()),
        );

        universe
            .entry(name.to_string())
            .or_default()
            .insert(version.to_string(), entry);
    }

    tracing::debug!("converted {} cookbooks from CSV", universe.len());
    Ok(UniverseFile::new(universe))
}
