//! Stored object types and operations
//!
//! All repository content is stored as objects identified by SHA-1 hashes.
//! There are two kinds:
//!
//! - **Blob**: the content of one file version
//! - **Commit**: a snapshot record (timestamp, parents, manifest, message)
//!
//! Both implement serialization/deserialization for the on-disk object
//! format: `<type> <size>\0<content>`

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
