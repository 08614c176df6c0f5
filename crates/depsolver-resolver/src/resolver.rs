//! Resolution entry point: environment filtering, graph construction and
//! search for one run list.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use depsolver_core::run_list::RunList;
use depsolver_core::universe::Universe;

use crate::conflict::ResolutionFailure;
use crate::constraint::VersionConstraint;
use crate::filter::EnvironmentConstraints;
use crate::graph::{DependencyGraph, SolutionConstraint};
use crate::solver::{Selector, Solution};
use crate::trim::trim_names;

/// Default search budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Knobs for a single resolution.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub timeout: Duration,
    /// Emit a trace event for every candidate the search tries.
    pub trace_search: bool,
    /// Span entered for the duration of the resolution.
    pub span: tracing::Span,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            trace_search: false,
            span: tracing::Span::none(),
        }
    }
}

impl SolveOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_trace_search(mut self, trace: bool) -> Self {
        self.trace_search = trace;
        self
    }

    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }
}

/// Where a resolution currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Filtering,
    GraphBuilt,
    Searching,
    Solved,
    InvalidConstraints,
    NoSolutionExists,
    TimedOut,
    Failed,
}

impl Phase {
    fn of(outcome: &Result<Solution, ResolutionFailure>) -> Self {
        match outcome {
            Ok(_) => Phase::Solved,
            Err(ResolutionFailure::InvalidConstraints { .. }) => Phase::InvalidConstraints,
            Err(ResolutionFailure::NoSolutionExists { .. }) => Phase::NoSolutionExists,
            Err(ResolutionFailure::ResolutionTimeout) => Phase::TimedOut,
            Err(_) => Phase::Failed,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Filtering => "filtering",
            Phase::GraphBuilt => "graph built",
            Phase::Searching => "searching",
            Phase::Solved => "solved",
            Phase::InvalidConstraints => "invalid constraints",
            Phase::NoSolutionExists => "no solution",
            Phase::TimedOut => "timed out",
            Phase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Resolve a run list against a universe narrowed by environment constraints.
///
/// `environment` maps cookbook names to constraint strings as found in an
/// environment file.
pub fn resolve(
    universe: &Universe,
    environment: &BTreeMap<String, String>,
    run_list: &RunList,
    options: &SolveOptions,
) -> Result<Solution, ResolutionFailure> {
    let _guard = options.span.enter();

    tracing::debug!("phase: {}", Phase::Filtering);
    let env = EnvironmentConstraints::parse(environment)?;
    let mut graph = DependencyGraph::from_universe(universe, &env)?;
    let constraints = solution_constraints(&mut graph, run_list)?;
    tracing::debug!(
        "phase: {} ({} packages, {} versions, {} dependencies)",
        Phase::GraphBuilt,
        graph.package_count(),
        graph.version_count(),
        graph.dependency_count()
    );

    tracing::debug!("phase: {}", Phase::Searching);
    let outcome = Selector::new(&graph, options.timeout)
        .with_trace(options.trace_search)
        .find_solution(&constraints);
    tracing::debug!("phase: {}", Phase::of(&outcome));
    outcome
}

/// Names of every cookbook the run list could reach, sorted, without
/// searching.
pub fn closure(
    universe: &Universe,
    environment: &BTreeMap<String, String>,
    run_list: &RunList,
) -> Result<Vec<String>, ResolutionFailure> {
    let env = EnvironmentConstraints::parse(environment)?;
    let mut graph = DependencyGraph::from_universe(universe, &env)?;
    let constraints = solution_constraints(&mut graph, run_list)?;
    Ok(trim_names(&graph, &constraints))
}

/// Turn run list items into solution constraints on cookbooks.
pub fn solution_constraints(
    graph: &mut DependencyGraph,
    run_list: &RunList,
) -> Result<Vec<SolutionConstraint>, ResolutionFailure> {
    run_list
        .items
        .iter()
        .map(|item| {
            let constraint = VersionConstraint::parse_opt(item.constraint().as_deref())?;
            Ok(graph.solution_constraint(item.cookbook(), constraint))
        })
        .collect()
}
