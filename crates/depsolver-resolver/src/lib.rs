//! Cookbook dependency resolution: version constraints, the package graph,
//! environment filtering, reachability trimming and a deadline-bounded
//! backtracking search that prefers the newest versions.

pub mod conflict;
pub mod constraint;
pub mod filter;
pub mod graph;
pub mod report;
pub mod resolver;
pub mod solver;
pub mod trim;
pub mod version;

pub use conflict::ResolutionFailure;
pub use constraint::{Operator, VersionConstraint};
pub use filter::{filter_universe, EnvironmentConstraints};
pub use graph::{DependencyGraph, PackageId, SolutionConstraint, VersionId};
pub use report::{FailureReport, ResolutionReport};
pub use resolver::{closure, resolve, SolveOptions};
pub use solver::{Selector, Solution};
pub use trim::trim;
pub use version::Version;
