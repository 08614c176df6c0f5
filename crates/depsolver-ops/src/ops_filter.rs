//! Operation: filter a universe by environment constraints and save it.

use std::path::{Path, PathBuf};

use depsolver_core::environment::EnvironmentFile;
use depsolver_core::universe::UniverseFile;
use depsolver_resolver::filter::{filter_universe, EnvironmentConstraints};
use depsolver_util::errors::DepsolverError;
use depsolver_util::{fs, hash};

/// Result of a filter operation.
#[derive(Debug)]
pub struct FilterResult {
    /// Where the filtered universe was written.
    pub path: PathBuf,
    pub cookbooks: usize,
    pub versions: usize,
}

/// Filter the universe at `universe_path` by the environment at `env_path`
/// and write it to `output_dir` as
/// `filtered-universe-<YYYYmmddHHMMSS>-<sha1 of contents>.txt`.
pub fn filter(
    universe_path: &Path,
    env_path: &Path,
    output_dir: &Path,
) -> miette::Result<FilterResult> {
    let universe = UniverseFile::from_path(universe_path)?;
    let environment = EnvironmentFile::from_path(env_path)?;
    let constraints = EnvironmentConstraints::parse(&environment.environment_constraints)?;

    let filtered = UniverseFile {
        timestamp: None,
        universe: filter_universe(&universe.universe, &constraints)?,
    };
    let contents = filtered
        .to_string_pretty()
        .map_err(|e| DepsolverError::Generic {
            message: format!("Failed to serialize filtered universe: {e}"),
        })?;

    let path = output_dir.join(filtered_file_name(
        &chrono::Local::now().format("%Y%m%d%H%M%S").to_string(),
        &contents,
    ));
    fs::write_file(&path, &contents)?;

    tracing::info!(
        "filtered {} down to {} cookbook versions",
        universe_path.display(),
        filtered.version_count()
    );
    Ok(FilterResult {
        path,
        cookbooks: filtered.universe.len(),
        versions: filtered.version_count(),
    })
}

/// `filtered-universe-<stamp>-<sha1 of contents>.txt`
pub fn filtered_file_name(stamp: &str, contents: &str) -> String {
    format!(
        "filtered-universe-{stamp}-{}.txt",
        hash::sha1_bytes(contents.as_bytes())
    )
}
