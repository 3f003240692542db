//! Shared core types
//!
//! - `errors`: the recoverable error taxonomy surfaced at the command boundary

pub mod errors;
