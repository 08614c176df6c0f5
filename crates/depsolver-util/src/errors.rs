use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all depsolver operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DepsolverError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A version string could not be parsed into numeric components.
    #[error("Malformed version: '{version}'")]
    #[diagnostic(help("Versions must look like X.Y or X.Y.Z with numeric components"))]
    MalformedVersion { version: String },

    /// A version constraint had an unknown operator or a bad version.
    #[error("Malformed version constraint: '{constraint}'")]
    #[diagnostic(help("Use one of =, >, >=, <, <=, ~> followed by a version"))]
    MalformedConstraint { constraint: String },

    /// A run list item could not be understood.
    #[error("Malformed run list item: '{item}': {reason}")]
    MalformedRunList { item: String, reason: String },

    /// A user-supplied input file is missing or has the wrong shape.
    #[error("{path} {message}")]
    InputFile { path: String, message: String },

    /// Global configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.depsolver/config.toml for syntax errors"))]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
