//! Run list parsing and local expansion.
//!
//! Items are written the way Chef writes them: `nginx`, `nginx::ssl`,
//! `nginx@1.2.0`, `recipe[nginx::ssl@1.2.0]`. Roles need a server to expand
//! and are rejected.

use std::fmt;

use depsolver_util::errors::DepsolverError;

/// One expanded run list entry: a recipe with an optional pinned version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunListItem {
    /// Recipe as written, e.g. `nginx::ssl`.
    pub recipe: String,
    /// Pinned version from `@version`, if any.
    pub version: Option<String>,
}

impl RunListItem {
    /// Parse a single run list entry.
    pub fn parse(item: &str) -> Result<Self, DepsolverError> {
        let trimmed = item.trim();
        let malformed = |reason: &str| DepsolverError::MalformedRunList {
            item: item.to_string(),
            reason: reason.to_string(),
        };

        let body = if let Some(rest) = trimmed.strip_prefix("recipe[") {
            rest.strip_suffix(']')
                .ok_or_else(|| malformed("missing closing ']'"))?
        } else if trimmed.starts_with("role[") {
            return Err(malformed("roles cannot be expanded without a Chef server"));
        } else if trimmed.contains('[') || trimmed.contains(']') {
            return Err(malformed("unknown run list item type"));
        } else {
            trimmed
        };

        let (recipe, version) = match body.split_once('@') {
            Some((recipe, version)) => {
                let version = version.trim();
                if version.is_empty() {
                    return Err(malformed("empty version after '@'"));
                }
                (recipe.trim(), Some(version.to_string()))
            }
            None => (body.trim(), None),
        };

        if recipe.is_empty() || recipe.starts_with("::") {
            return Err(malformed("missing cookbook name"));
        }

        Ok(Self {
            recipe: recipe.to_string(),
            version,
        })
    }

    /// Cookbook name: the recipe with any `::recipe` suffix removed.
    pub fn cookbook(&self) -> &str {
        self.recipe
            .split_once("::")
            .map_or(self.recipe.as_str(), |(name, _)| name)
    }

    /// Constraint implied by the pin: `= <version>`, or `None` when unpinned.
    pub fn constraint(&self) -> Option<String> {
        self.version.as_ref().map(|v| format!("= {v}"))
    }
}

impl fmt::Display for RunListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.recipe, v),
            None => f.write_str(&self.recipe),
        }
    }
}

/// An ordered run list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunList {
    pub items: Vec<RunListItem>,
}

impl RunList {
    /// Build a run list from command-line arguments.
    ///
    /// Each argument may hold several comma-separated items; whitespace is
    /// stripped and empty items are dropped. Repeated recipes are kept once,
    /// at their first position.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, DepsolverError> {
        let mut items: Vec<RunListItem> = Vec::new();
        for raw in args
            .iter()
            .flat_map(|arg| arg.as_ref().split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let item = RunListItem::parse(raw)?;
            if !items.contains(&item) {
                items.push(item);
            }
        }
        Ok(Self { items })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Expanded form, e.g. `["nginx::ssl@1.2.0", "apt"]`.
    pub fn expanded(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }

    /// Chef-style run list, e.g. `["recipe[nginx::ssl@1.2.0]", "recipe[apt]"]`.
    pub fn recipes(&self) -> Vec<String> {
        self.items.iter().map(|i| format!("recipe[{i}]")).collect()
    }
}
