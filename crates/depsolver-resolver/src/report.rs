//! Serializable resolution outcomes.
//!
//! Successful resolutions render as `{"cookbook": "X.Y.Z", ...}`. Failures
//! render as a single-key object naming the failure kind, e.g.
//! `{"invalid_constraints": {"non_existent_cookbooks": [...], ...}}`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::conflict::ResolutionFailure;
use crate::solver::Solution;

/// Detail of a failed resolution, keyed by its external kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReport {
    MalformedVersion {
        version: String,
    },
    InvalidConstraints {
        non_existent_cookbooks: Vec<String>,
        constraints_not_met: Vec<String>,
    },
    NoSolution {
        message: String,
        unsatisfiable_run_list_item: Option<String>,
        non_existent_cookbooks: Vec<String>,
        most_constrained_cookbooks: Vec<String>,
    },
    /// Carries no detail; renders as `{"resolution_timeout": null}`.
    ResolutionTimeout(()),
    Exception {
        message: String,
    },
}

impl FailureReport {
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReport::MalformedVersion { .. } => "malformed_version",
            FailureReport::InvalidConstraints { .. } => "invalid_constraints",
            FailureReport::NoSolution { .. } => "no_solution",
            FailureReport::ResolutionTimeout(()) => "resolution_timeout",
            FailureReport::Exception { .. } => "exception",
        }
    }
}

impl From<&ResolutionFailure> for FailureReport {
    fn from(failure: &ResolutionFailure) -> Self {
        match failure {
            ResolutionFailure::MalformedVersion { version } => FailureReport::MalformedVersion {
                version: version.clone(),
            },
            ResolutionFailure::InvalidConstraints {
                non_existent,
                constraints_not_met,
            } => FailureReport::InvalidConstraints {
                non_existent_cookbooks: non_existent.clone(),
                constraints_not_met: constraints_not_met.clone(),
            },
            ResolutionFailure::NoSolutionExists {
                message,
                unsatisfiable_run_list_item,
                non_existent,
                most_constrained,
            } => FailureReport::NoSolution {
                message: message.clone(),
                unsatisfiable_run_list_item: unsatisfiable_run_list_item.clone(),
                non_existent_cookbooks: non_existent.clone(),
                most_constrained_cookbooks: most_constrained.clone(),
            },
            ResolutionFailure::ResolutionTimeout => FailureReport::ResolutionTimeout(()),
            ResolutionFailure::Internal { message } => FailureReport::Exception {
                message: message.clone(),
            },
        }
    }
}

/// The outcome of one resolution in its external shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolutionReport {
    Solved(BTreeMap<String, String>),
    Failed(FailureReport),
}

impl ResolutionReport {
    pub fn from_outcome(outcome: &Result<Solution, ResolutionFailure>) -> Self {
        match outcome {
            Ok(solution) => ResolutionReport::Solved(
                solution
                    .iter()
                    .map(|(name, version)| (name.clone(), version.to_string()))
                    .collect(),
            ),
            Err(failure) => ResolutionReport::Failed(failure.into()),
        }
    }

    /// Selected versions, when the resolution succeeded.
    pub fn results(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ResolutionReport::Solved(results) => Some(results),
            ResolutionReport::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FailureReport> {
        match self {
            ResolutionReport::Solved(_) => None,
            ResolutionReport::Failed(failure) => Some(failure),
        }
    }

    pub fn cookbook_count(&self) -> usize {
        self.results().map_or(0, BTreeMap::len)
    }
}
