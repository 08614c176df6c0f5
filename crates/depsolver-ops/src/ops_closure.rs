//! Operation: list the cookbooks a run list can reach, without solving.

use depsolver_core::run_list::RunList;
use depsolver_core::universe::UniverseFile;
use depsolver_resolver::resolver;

use crate::ops_solve::{load_environment, SolveInputs};

/// Sorted names of every cookbook reachable from `run_list_args`.
pub fn closure(run_list_args: &[String], inputs: &SolveInputs) -> miette::Result<Vec<String>> {
    let run_list = RunList::from_args(run_list_args)?;
    let universe = UniverseFile::from_path(&inputs.universe)?;
    let environment = load_environment(inputs.env_constraints.as_deref())?;

    let names = resolver::closure(
        &universe.universe,
        &environment.environment_constraints,
        &run_list,
    )?;

    tracing::debug!("closure of {} run list items: {} cookbooks", run_list.len(), names.len());
    Ok(names)
}
