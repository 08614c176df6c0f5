//! Environment cookbook constraints and universe filtering.

use std::collections::BTreeMap;

use depsolver_core::universe::Universe;
use depsolver_util::errors::DepsolverError;

use crate::constraint::VersionConstraint;
use crate::version::Version;

/// Per-cookbook version pins imposed by an environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConstraints {
    constraints: BTreeMap<String, VersionConstraint>,
}

impl EnvironmentConstraints {
    /// Parse the `environment_constraints` map of an environment file.
    pub fn parse(raw: &BTreeMap<String, String>) -> Result<Self, DepsolverError> {
        Self::from_pairs(raw.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, DepsolverError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let constraints = pairs
            .into_iter()
            .map(|(name, spec)| Ok((name.to_string(), VersionConstraint::parse(spec)?)))
            .collect::<Result<_, DepsolverError>>()?;
        Ok(Self { constraints })
    }

    pub fn get(&self, name: &str) -> Option<&VersionConstraint> {
        self.constraints.get(name)
    }

    /// Whether the environment allows `version` of `name`. Cookbooks without
    /// a pin allow every version.
    pub fn allows(&self, name: &str, version: &Version) -> bool {
        self.constraints
            .get(name)
            .map_or(true, |c| c.satisfies(version))
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Narrow a universe to the versions the environment allows.
///
/// Cookbooks without a pin are copied through untouched, including their
/// version strings; pinned cookbooks have their versions parsed and checked.
/// Filtering twice with the same constraints changes nothing.
pub fn filter_universe(
    universe: &Universe,
    env: &EnvironmentConstraints,
) -> Result<Universe, DepsolverError> {
    let mut filtered = Universe::new();
    let mut dropped = 0usize;

    for (name, versions) in universe {
        let Some(constraint) = env.get(name) else {
            filtered.insert(name.clone(), versions.clone());
            continue;
        };

        let mut kept = BTreeMap::new();
        for (raw_version, entry) in versions {
            if constraint.satisfies(&Version::parse(raw_version)?) {
                kept.insert(raw_version.clone(), entry.clone());
            } else {
                dropped += 1;
            }
        }
        filtered.insert(name.clone(), kept);
    }

    tracing::debug!("environment filter dropped {dropped} cookbook versions");
    Ok(filtered)
}
