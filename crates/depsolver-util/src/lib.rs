//! Shared utilities for depsolver.
//!
//! This crate provides cross-cutting concerns used by all other depsolver
//! crates: the unified error type, filesystem helpers and content hashing.

pub mod errors;
pub mod fs;
pub mod hash;
