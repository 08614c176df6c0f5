//! Resolution failures and conflict bookkeeping.

use std::collections::{BTreeMap, BTreeSet};

use miette::Diagnostic;
use thiserror::Error;

use depsolver_util::errors::DepsolverError;

use crate::graph::{DependencyGraph, PackageId};

/// Why a resolution produced no solution.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ResolutionFailure {
    /// A version string in the universe, environment or run list is invalid.
    #[error("Malformed version: '{version}'")]
    MalformedVersion { version: String },

    /// The run list asks for packages that don't exist or for versions no
    /// surviving version satisfies.
    #[error("Invalid run list constraints (non-existent: {non_existent:?}, not met: {constraints_not_met:?})")]
    #[diagnostic(help("Check the run list against the universe and environment constraints"))]
    InvalidConstraints {
        non_existent: Vec<String>,
        constraints_not_met: Vec<String>,
    },

    /// The search space was exhausted.
    #[error("{message}")]
    NoSolutionExists {
        message: String,
        unsatisfiable_run_list_item: Option<String>,
        non_existent: Vec<String>,
        most_constrained: Vec<String>,
    },

    #[error("Resolution timed out")]
    #[diagnostic(help("Raise the timeout with --timeout or [solver] timeout-ms"))]
    ResolutionTimeout,

    #[error("Internal resolver failure: {message}")]
    Internal { message: String },
}

impl ResolutionFailure {
    /// External kind string of this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionFailure::MalformedVersion { .. } => "malformed_version",
            ResolutionFailure::InvalidConstraints { .. } => "invalid_constraints",
            ResolutionFailure::NoSolutionExists { .. } => "no_solution",
            ResolutionFailure::ResolutionTimeout => "resolution_timeout",
            ResolutionFailure::Internal { .. } => "exception",
        }
    }
}

impl From<DepsolverError> for ResolutionFailure {
    fn from(err: DepsolverError) -> Self {
        match err {
            DepsolverError::MalformedVersion { version } => {
                ResolutionFailure::MalformedVersion { version }
            }
            other => ResolutionFailure::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Records which packages kept running out of candidate versions during a
/// search, and which dependency targets turned out not to exist.
#[derive(Debug, Default)]
pub struct ConflictTracker {
    emptied: BTreeMap<PackageId, usize>,
    non_existent: BTreeSet<PackageId>,
}

impl ConflictTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A package's domain was driven to empty.
    pub fn record_emptied(&mut self, package: PackageId) {
        *self.emptied.entry(package).or_insert(0) += 1;
    }

    /// A selected version depends on a package the universe never declared.
    pub fn record_non_existent(&mut self, package: PackageId) {
        self.non_existent.insert(package);
    }

    pub fn is_empty(&self) -> bool {
        self.emptied.is_empty() && self.non_existent.is_empty()
    }

    /// Names of missing dependency targets, sorted.
    pub fn non_existent(&self, graph: &DependencyGraph) -> Vec<String> {
        let mut names: Vec<String> = self
            .non_existent
            .iter()
            .map(|&id| graph.name(id).to_string())
            .collect();
        names.sort();
        names
    }

    /// Emptied packages, most frequently emptied first, ties by name.
    pub fn ranked(&self, graph: &DependencyGraph) -> Vec<PackageId> {
        let mut ranked: Vec<(PackageId, usize)> =
            self.emptied.iter().map(|(&id, &n)| (id, n)).collect();
        ranked.sort_by(|(a, na), (b, nb)| {
            nb.cmp(na).then_with(|| graph.name(*a).cmp(graph.name(*b)))
        });
        ranked.into_iter().map(|(id, _)| id).collect()
    }

    /// [`ranked`](Self::ranked), each rendered as
    /// `name = <newest surviving version>` or just `name` without versions.
    /// The version shown is the newest, not the first one declared.
    pub fn most_constrained(&self, graph: &DependencyGraph) -> Vec<String> {
        self.ranked(graph)
            .into_iter()
            .map(|id| match graph.newest(id) {
                Some(v) => format!("{} = {}", graph.name(id), v),
                None => graph.name(id).to_string(),
            })
            .collect()
    }
}
