//! Operation: resolve a run list against local universe and environment files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use depsolver_core::environment::EnvironmentFile;
use depsolver_core::run_list::RunList;
use depsolver_core::universe::UniverseFile;
use depsolver_resolver::report::{FailureReport, ResolutionReport};
use depsolver_resolver::resolver::{self, SolveOptions};

/// Inputs for `depsolver solve`.
#[derive(Debug, Clone)]
pub struct SolveInputs {
    pub universe: PathBuf,
    pub env_constraints: Option<PathBuf>,
    pub timeout: Duration,
    pub trace_search: bool,
}

impl SolveInputs {
    pub fn new(universe: impl Into<PathBuf>) -> Self {
        Self {
            universe: universe.into(),
            env_constraints: None,
            timeout: resolver::DEFAULT_TIMEOUT,
            trace_search: false,
        }
    }
}

/// Printed result of a local solve.
#[derive(Debug, Serialize)]
pub struct SolveReport {
    pub depsolver: String,
    pub environment: String,
    pub run_list: Vec<String>,
    pub expanded_run_list: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depsolver_results: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depsolver_cookbook_count: Option<usize>,
    pub depsolver_elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depsolver_error: Option<FailureReport>,
}

impl SolveReport {
    pub fn succeeded(&self) -> bool {
        self.depsolver_error.is_none()
    }

    pub fn to_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Load the inputs and resolve `run_list_args`.
///
/// Failures of the resolution itself are part of the report; only unreadable
/// inputs and malformed run list items are errors.
pub fn solve(run_list_args: &[String], inputs: &SolveInputs) -> miette::Result<SolveReport> {
    let run_list = RunList::from_args(run_list_args)?;
    let universe = UniverseFile::from_path(&inputs.universe)?;
    let environment = load_environment(inputs.env_constraints.as_deref())?;

    tracing::info!(
        "solving {} run list items against {} cookbook versions in environment {}",
        run_list.len(),
        universe.version_count(),
        environment.environment_name
    );

    let options = SolveOptions::default()
        .with_timeout(inputs.timeout)
        .with_trace_search(inputs.trace_search)
        .with_span(tracing::debug_span!("solve", environment = %environment.environment_name));

    let started = Instant::now();
    let outcome = resolver::resolve(
        &universe.universe,
        &environment.environment_constraints,
        &run_list,
        &options,
    );
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let report = ResolutionReport::from_outcome(&outcome);
    let results = report.results().filter(|r| !r.is_empty()).cloned();

    Ok(SolveReport {
        depsolver: "used local depsolver".to_string(),
        environment: environment.environment_name,
        run_list: run_list.recipes(),
        expanded_run_list: run_list.expanded(),
        depsolver_cookbook_count: results.as_ref().map(BTreeMap::len),
        depsolver_results: results,
        depsolver_elapsed_ms: elapsed_ms,
        depsolver_error: report.error().cloned(),
    })
}

/// Load an environment file, or the default environment when none is given.
pub fn load_environment(path: Option<&Path>) -> miette::Result<EnvironmentFile> {
    match path {
        Some(path) => EnvironmentFile::from_path(path),
        None => Ok(EnvironmentFile::default()),
    }
}
