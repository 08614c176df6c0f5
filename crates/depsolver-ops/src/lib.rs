//! High-level operations wiring CLI commands to the resolver: solving a run
//! list, listing its reachable closure, filtering a universe and converting
//! CSV universe exports.

pub mod ops_closure;
pub mod ops_convert;
pub mod ops_filter;
pub mod ops_solve;
