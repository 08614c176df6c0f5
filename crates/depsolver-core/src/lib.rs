//! Core input types for depsolver.
//!
//! This crate defines the data a resolution starts from: the cookbook
//! universe, environment cookbook constraints, run lists, the CSV universe
//! conversion, and global configuration.
//!
//! Nothing here interprets versions or constraints; that is the job of
//! `depsolver-resolver`. This crate is intentionally free of network I/O.

/// Environment used when no environment file is supplied.
pub const DEFAULT_ENVIRONMENT: &str = "_default";

pub mod config;
pub mod csv;
pub mod environment;
pub mod run_list;
pub mod universe;

/// Current local time in the format used for `timestamp` fields.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S %z")
        .to_string()
}
