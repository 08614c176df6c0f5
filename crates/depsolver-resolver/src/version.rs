//! Cookbook version parsing and comparison.
//!
//! Cookbook versions are strictly numeric: `X.Y.Z`, or `X.Y` with an implied
//! patch of `0`. Ordering is lexicographic over `(major, minor, patch)`.

use std::fmt;
use std::str::FromStr;

use depsolver_util::errors::DepsolverError;

/// A parsed cookbook version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn parse(version: &str) -> Result<Self, DepsolverError> {
        parse_with_precision(version).map(|(v, _)| v)
    }

    /// The smallest version with a larger major component.
    pub fn next_major(&self) -> Self {
        Self::new(self.major.saturating_add(1), 0, 0)
    }

    /// The smallest version with a larger minor component.
    pub fn next_minor(&self) -> Self {
        Self::new(self.major, self.minor.saturating_add(1), 0)
    }
}

/// Parse a version and report how many components were written (2 or 3).
pub(crate) fn parse_with_precision(version: &str) -> Result<(Version, usize), DepsolverError> {
    let version = version.trim();
    let malformed = || DepsolverError::MalformedVersion {
        version: version.to_string(),
    };

    let segments: Vec<&str> = version.split('.').collect();
    if !(2..=3).contains(&segments.len()) {
        return Err(malformed());
    }

    let mut parts = [0u64; 3];
    for (slot, seg) in parts.iter_mut().zip(&segments) {
        if seg.is_empty() || !seg.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        *slot = seg.parse().map_err(|_| malformed())?;
    }

    Ok((Version::new(parts[0], parts[1], parts[2]), segments.len()))
}

impl FromStr for Version {
    type Err = DepsolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
