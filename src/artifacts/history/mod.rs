//! Commit graph traversal
//!
//! - `ancestry`: first-parent chains and the breadth-first split-point search

pub mod ancestry;
