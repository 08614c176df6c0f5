//! Version constraints: `= 1.2.3`, `>= 1.0`, `< 2.0.0`, `~> 2.1` and friends.

use std::fmt;
use std::str::FromStr;

use depsolver_util::errors::DepsolverError;

use crate::version::{self, Version};

/// Comparison operator of a [`VersionConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// `~>`: at least the given version, below the next release of the
    /// second-to-last written component.
    Pessimistic,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Pessimistic => "~>",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => Operator::Eq,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "~>" => Operator::Pessimistic,
            _ => return None,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate over versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionConstraint {
    pub op: Operator,
    pub version: Version,
    /// Components written for the version (2 or 3); only `~>` looks at it.
    precision: usize,
}

impl Default for VersionConstraint {
    /// The open constraint, `>= 0.0.0`.
    fn default() -> Self {
        Self::new(Operator::Gte, Version::default())
    }
}

impl VersionConstraint {
    pub fn new(op: Operator, version: Version) -> Self {
        Self {
            op,
            version,
            precision: 3,
        }
    }

    /// A constraint that every version satisfies.
    pub fn any() -> Self {
        Self::default()
    }

    /// `~> X.Y`, locking the major component.
    pub fn pessimistic_minor(major: u64, minor: u64) -> Self {
        Self {
            op: Operator::Pessimistic,
            version: Version::new(major, minor, 0),
            precision: 2,
        }
    }

    /// Parse `"<op> <version>"`. The space is optional, a bare version means
    /// `=`, and an empty string is the open constraint.
    pub fn parse(spec: &str) -> Result<Self, DepsolverError> {
        let s = spec.trim();
        if s.is_empty() {
            return Ok(Self::any());
        }

        let split = s
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '~'))
            .unwrap_or(s.len());
        let (token, rest) = s.split_at(split);

        let malformed = || DepsolverError::MalformedConstraint {
            constraint: spec.to_string(),
        };
        let op = if token.is_empty() {
            if !rest.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(malformed());
            }
            Operator::Eq
        } else {
            Operator::from_token(token).ok_or_else(malformed)?
        };

        let (version, precision) = version::parse_with_precision(rest)?;
        Ok(Self {
            op,
            version,
            precision: if op == Operator::Pessimistic { precision } else { 3 },
        })
    }

    /// Parse an optional constraint, treating `None` as the open constraint.
    pub fn parse_opt(spec: Option<&str>) -> Result<Self, DepsolverError> {
        spec.map_or_else(|| Ok(Self::any()), Self::parse)
    }

    pub fn satisfies(&self, candidate: &Version) -> bool {
        let v = &self.version;
        match self.op {
            Operator::Eq => candidate == v,
            Operator::Gt => candidate > v,
            Operator::Gte => candidate >= v,
            Operator::Lt => candidate < v,
            Operator::Lte => candidate <= v,
            Operator::Pessimistic => candidate >= v && *candidate < self.pessimistic_upper(),
        }
    }

    /// Exclusive upper bound of a `~>` constraint.
    fn pessimistic_upper(&self) -> Version {
        if self.precision <= 2 {
            self.version.next_major()
        } else {
            self.version.next_minor()
        }
    }

    pub fn is_any(&self) -> bool {
        *self == Self::any()
    }
}

impl FromStr for VersionConstraint {
    type Err = DepsolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op == Operator::Pessimistic && self.precision <= 2 {
            write!(f, "~> {}.{}", self.version.major, self.version.minor)
        } else {
            write!(f, "{} {}", self.op, self.version)
        }
    }
}
