//! Three-way merge machinery
//!
//! - `resolution`: the per-file decision table and conflict-content synthesis

pub mod resolution;
