//! Handler for `depsolver filter-universe`.

use std::path::{Path, PathBuf};

use miette::Result;

use depsolver_core::config::GlobalConfig;
use depsolver_ops::ops_filter;

pub fn exec(universe: &Path, env_constraints: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => PathBuf::from(GlobalConfig::load()?.output.dir),
    };

    let result = ops_filter::filter(universe, env_constraints, &output_dir)?;
    println!(
        "Kept {} versions of {} cookbooks",
        result.versions, result.cookbooks
    );
    println!(
        "Filtered cookbook universe saved to {}",
        result.path.display()
    );
    Ok(())
}
