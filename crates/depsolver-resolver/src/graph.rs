//! Dependency graph construction.
//!
//! Packages and package versions live in flat tables addressed by
//! [`PackageId`] and [`VersionId`]. Dependency edges point at target
//! packages by id, so cyclic cookbooks (A → B → A) need no shared ownership.
//! A petgraph mirror of the package-level edges backs reachability queries.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};

use depsolver_core::universe::Universe;
use depsolver_util::errors::DepsolverError;

use crate::constraint::VersionConstraint;
use crate::filter::EnvironmentConstraints;
use crate::version::Version;

/// Handle of a package within one [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageId(usize);

impl PackageId {
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn node(self) -> NodeIndex {
        NodeIndex::new(self.0)
    }
}

/// Handle of a package version within one [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionId(usize);

impl VersionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named cookbook and the versions that survived environment filtering.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    /// Whether the universe listed this package. Packages that only appear
    /// as dependency targets or run list entries are not declared.
    pub declared: bool,
    pub versions: Vec<VersionId>,
}

/// One version of a package with its dependency edges.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    pub package: PackageId,
    pub version: Version,
    pub dependencies: Vec<Dependency>,
}

/// Edge from a package version to a target package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub package: PackageId,
    pub constraint: VersionConstraint,
}

/// A run list request: a package plus the versions it will accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionConstraint {
    pub package: PackageId,
    pub name: String,
    pub constraint: VersionConstraint,
}

impl fmt::Display for SolutionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.constraint)
    }
}

/// All packages, versions and dependency edges for one resolution.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    packages: Vec<Package>,
    versions: Vec<PackageVersion>,
    /// Lookup from package name to id.
    index: HashMap<String, PackageId>,
    /// Package-level edges; node `i` is `PackageId(i)`, edge weights name the
    /// version that declared the dependency.
    edges: DiGraph<PackageId, VersionId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for a resolution.
    ///
    /// Every package in the universe is declared, but only versions allowed by
    /// `env` are added. Dependencies of added versions always become edges,
    /// creating their target package if needed, even when that target ends
    /// up with no versions.
    pub fn from_universe(
        universe: &Universe,
        env: &EnvironmentConstraints,
    ) -> Result<Self, DepsolverError> {
        let mut graph = Self::new();

        for (name, versions) in universe {
            let package = graph.package(name);
            graph.declare(package);

            for (raw_version, entry) in versions {
                let version = Version::parse(raw_version)?;
                if !env.allows(name, &version) {
                    tracing::trace!("environment rejects {name} {version}");
                    continue;
                }

                let vid = graph.add_version(package, version);
                for (dep_name, dep_constraint) in &entry.dependencies {
                    let constraint = VersionConstraint::parse(dep_constraint)?;
                    let target = graph.package(dep_name);
                    graph.add_dependency(vid, target, constraint);
                }
            }
        }

        tracing::debug!(
            "built dependency graph: {} packages, {} versions",
            graph.package_count(),
            graph.version_count()
        );
        Ok(graph)
    }

    /// Look up a package by name, creating it if it doesn't exist yet.
    pub fn package(&mut self, name: &str) -> PackageId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = PackageId(self.packages.len());
        self.packages.push(Package {
            name: name.to_string(),
            declared: false,
            versions: Vec::new(),
        });
        let node = self.edges.add_node(id);
        debug_assert_eq!(node, id.node());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Mark a package as listed in the universe.
    pub fn declare(&mut self, id: PackageId) {
        self.packages[id.0].declared = true;
    }

    /// Add a version to a package. Adding a version that is already present
    /// returns the existing handle.
    pub fn add_version(&mut self, package: PackageId, version: Version) -> VersionId {
        let existing = self.packages[package.0]
            .versions
            .iter()
            .copied()
            .find(|&vid| self.versions[vid.0].version == version);
        if let Some(vid) = existing {
            return vid;
        }

        let vid = VersionId(self.versions.len());
        self.versions.push(PackageVersion {
            package,
            version,
            dependencies: Vec::new(),
        });
        self.packages[package.0].versions.push(vid);
        vid
    }

    /// Add a dependency edge from a package version to a target package.
    pub fn add_dependency(
        &mut self,
        from: VersionId,
        target: PackageId,
        constraint: VersionConstraint,
    ) {
        let source = self.versions[from.0].package;
        self.versions[from.0].dependencies.push(Dependency {
            package: target,
            constraint,
        });
        self.edges.add_edge(source.node(), target.node(), from);
    }

    /// Look up a package by name.
    pub fn find(&self, name: &str) -> Option<PackageId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn name(&self, id: PackageId) -> &str {
        &self.packages[id.0].name
    }

    pub fn version(&self, id: VersionId) -> &PackageVersion {
        &self.versions[id.0]
    }

    /// Versions of a package, newest first.
    pub fn versions_newest_first(&self, id: PackageId) -> Vec<VersionId> {
        let mut versions = self.packages[id.0].versions.clone();
        versions.sort_by(|a, b| self.versions[b.0].version.cmp(&self.versions[a.0].version));
        versions
    }

    /// Highest surviving version of a package, if any.
    pub fn newest(&self, id: PackageId) -> Option<Version> {
        self.packages[id.0]
            .versions
            .iter()
            .map(|vid| self.versions[vid.0].version)
            .max()
    }

    pub fn package_ids(&self) -> impl Iterator<Item = PackageId> + '_ {
        (0..self.packages.len()).map(PackageId)
    }

    pub(crate) fn package_edges(&self) -> &DiGraph<PackageId, VersionId> {
        &self.edges
    }

    /// Resolve a run list request against this graph, creating the package
    /// entry if the universe never mentioned it.
    pub fn solution_constraint(
        &mut self,
        name: &str,
        constraint: VersionConstraint,
    ) -> SolutionConstraint {
        SolutionConstraint {
            package: self.package(name),
            name: name.to_string(),
            constraint,
        }
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.edges.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
