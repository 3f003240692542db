//! Commit object
//!
//! Commits are immutable snapshot records. They contain:
//! - A timestamp (the root commit is pinned to the Unix epoch)
//! - Zero, one, or two parent commit IDs (order is significant)
//! - A manifest mapping every tracked path to its blob ID
//! - A commit message
//!
//! The manifest is a complete snapshot of the tracked tree, not a delta
//! against the parent.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! timestamp <unix-seconds> <timezone>
//! parent <parent-sha>
//! entry <blob-sha> <path>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Message of the commit every repository starts from
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// Mapping from tracked file path to blob ID, sorted by path
pub type Manifest = BTreeMap<PathBuf, ObjectId>;

/// Commit object
///
/// A snapshot of the tracked file tree with metadata. `parents[0]` is the
/// mainline parent; `parents[1]`, when present, is the merged-in parent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for the root commit, two for merge commits)
    parents: Vec<ObjectId>,
    /// Creation time
    timestamp: DateTime<FixedOffset>,
    /// Complete snapshot of tracked paths and their blob IDs
    manifest: Manifest,
    /// Commit message
    message: String,
}

impl Commit {
    /// Create a new commit
    ///
    /// # Arguments
    ///
    /// * `parents` - Parent commit IDs, mainline first
    /// * `manifest` - Complete tracked tree snapshot
    /// * `message` - Commit message
    /// * `timestamp` - Creation time
    pub fn new(
        parents: Vec<ObjectId>,
        manifest: Manifest,
        message: String,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Commit {
            parents,
            timestamp,
            manifest,
            message,
        }
    }

    /// Create the root commit
    ///
    /// Every repository starts from this commit: no parents, an empty
    /// manifest, and the fixed Unix epoch timestamp. Its id is therefore
    /// identical across repositories.
    pub fn root() -> Self {
        Commit::new(
            Vec::new(),
            Manifest::new(),
            ROOT_COMMIT_MESSAGE.to_string(),
            DateTime::<chrono::Utc>::UNIX_EPOCH.fixed_offset(),
        )
    }

    /// Resolve the timestamp for a new commit
    ///
    /// Reads `KIT_COMMIT_DATE` when set (format `%Y-%m-%d %H:%M:%S %z`),
    /// otherwise uses the current local time.
    pub fn timestamp_from_env() -> DateTime<FixedOffset> {
        std::env::var("KIT_COMMIT_DATE")
            .ok()
            .and_then(|date_str| {
                DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z").ok()
            })
            .unwrap_or_else(|| chrono::Local::now().fixed_offset())
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    /// Get the full commit message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the mainline (first) parent
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Get all parent IDs in their original order
    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Get the complete tracked tree snapshot
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Look up the blob ID tracked for a path, if any
    pub fn tracked_blob(&self, path: &Path) -> Option<&ObjectId> {
        self.manifest.get(path)
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Format the timestamp in human-readable form
    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %d %H:%M:%S %Y %z").to_string()
    }

    fn parse_offset(timezone: &str) -> anyhow::Result<FixedOffset> {
        if timezone.len() != 5 {
            anyhow::bail!("Invalid timezone offset: {}", timezone);
        }

        let (sign, digits) = timezone.split_at(1);
        let hours: i32 = digits[0..2].parse().context("Invalid timezone hours")?;
        let minutes: i32 = digits[2..4].parse().context("Invalid timezone minutes")?;

        let seconds = match sign {
            "+" => (hours * 60 + minutes) * 60,
            "-" => -(hours * 60 + minutes) * 60,
            _ => anyhow::bail!("Invalid timezone sign: {}", sign),
        };

        FixedOffset::east_opt(seconds).context("Timezone offset out of range")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        object_content.push(format!(
            "timestamp {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for parent in &self.parents {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        for (path, blob_oid) in &self.manifest {
            object_content.push(format!("entry {} {}", blob_oid.as_ref(), path.display()));
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");

        let mut content_bytes = Vec::new();
        content_bytes.write_all(object_content.as_bytes())?;

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let timestamp_line = lines
            .next()
            .context("Invalid commit object: missing timestamp line")?;
        let timestamp_line = timestamp_line
            .strip_prefix("timestamp ")
            .context("Invalid commit object: invalid timestamp line")?;
        let (seconds, timezone) = timestamp_line
            .split_once(' ')
            .context("Invalid commit object: invalid timestamp line")?;
        let seconds: i64 = seconds
            .parse()
            .context("Invalid commit object: invalid timestamp seconds")?;
        let offset = Self::parse_offset(timezone)?;
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .context("Invalid commit object: timestamp out of range")?
            .with_timezone(&offset);

        let mut parents = Vec::new();
        let mut manifest = Manifest::new();
        let mut next_line = lines.next();

        while let Some(line) = next_line {
            if let Some(parent_oid) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(parent_oid.to_string())?);
            } else if let Some(entry) = line.strip_prefix("entry ") {
                let (blob_oid, path) = entry
                    .split_once(' ')
                    .context("Invalid commit object: invalid entry line")?;
                manifest.insert(
                    PathBuf::from(path),
                    ObjectId::try_parse(blob_oid.to_string())?,
                );
            } else if line.is_empty() {
                break;
            } else {
                anyhow::bail!("Invalid commit object: unexpected line {:?}", line);
            }

            next_line = lines.next();
        }

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(parents, manifest, message, timestamp))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        lines.push(format!(
            "timestamp {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        for (path, blob_oid) in &self.manifest {
            lines.push(format!("entry {} {}", blob_oid.as_ref(), path.display()));
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}
