//! Handler for `depsolver solve`.

use std::path::PathBuf;
use std::time::Duration;

use miette::Result;

use depsolver_core::config::GlobalConfig;
use depsolver_ops::ops_closure;
use depsolver_ops::ops_solve::{self, SolveInputs};
use depsolver_util::errors::DepsolverError;

pub fn exec(
    run_list: &[String],
    universe: PathBuf,
    env_constraints: Option<PathBuf>,
    timeout_secs: Option<f64>,
    dry_run: bool,
) -> Result<()> {
    let config = GlobalConfig::load()?;

    let timeout = match timeout_secs {
        Some(secs) => Duration::try_from_secs_f64(secs).map_err(|_| DepsolverError::Generic {
            message: format!("Invalid timeout: {secs} seconds"),
        })?,
        None => Duration::from_millis(config.solver.timeout_ms),
    };
    tracing::debug!("timeout set to {} ms", timeout.as_millis());

    let inputs = SolveInputs {
        universe,
        env_constraints,
        timeout,
        trace_search: config.solver.trace_search,
    };

    if dry_run {
        for name in ops_closure::closure(run_list, &inputs)? {
            println!("{name}");
        }
        return Ok(());
    }

    let report = ops_solve::solve(run_list, &inputs)?;
    let json = report
        .to_string_pretty()
        .map_err(|e| DepsolverError::Generic {
            message: format!("Failed to serialize report: {e}"),
        })?;
    println!("{json}");
    Ok(())
}
