//! Operation: convert a CSV universe export to universe JSON.

use std::path::Path;

use depsolver_core::csv::csv_to_universe;
use depsolver_util::errors::DepsolverError;
use depsolver_util::fs;

/// Read the CSV export at `path` and return pretty-printed universe JSON.
pub fn csv_to_json(path: &Path) -> miette::Result<String> {
    let contents = fs::read_input_file(path)?;
    let universe = csv_to_universe(&contents)?;
    tracing::debug!(
        "converted {} cookbook versions from {}",
        universe.version_count(),
        path.display()
    );

    let json = universe
        .to_string_pretty()
        .map_err(|e| DepsolverError::Generic {
            message: format!("Failed to serialize universe: {e}"),
        })?;
    Ok(json)
}
