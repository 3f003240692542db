//! Staging area
//!
//! The stage records which paths should change in the next commit: pending
//! additions (path to blob id) and pending removals. It is persisted at
//! `.kit/stage` as one record per line:
//!
//! ```text
//! add <blob-sha> <path>
//! rm <path>
//! ```
//!
//! A path never occupies both collections at once; recording it in one
//! evicts it from the other. The stage is cleared on every successful
//! commit and on every branch checkout.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Staging area for pending additions and removals
#[derive(Debug, Clone)]
pub struct Stage {
    /// Path to the stage file (typically `.kit/stage`)
    path: Box<Path>,
    /// Paths slated to appear with the given blob content in the next commit
    additions: BTreeMap<PathBuf, ObjectId>,
    /// Paths slated to disappear from the next commit's manifest
    removals: BTreeSet<PathBuf>,
    /// Flag indicating if the stage has been modified since loading
    changed: bool,
}

impl Stage {
    pub fn new(path: Box<Path>) -> Self {
        Stage {
            path,
            additions: BTreeMap::new(),
            removals: BTreeSet::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stage from disk
    ///
    /// Parses the line-oriented stage file, replacing any in-memory state.
    /// A missing file is created empty.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the stage file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        if !self.path().exists() {
            self.clear();
            std::fs::File::create(self.path())?;
        }

        let mut stage_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let lock = file_guard::lock(&mut stage_file, file_guard::Lock::Shared, 0, 1)?;

        self.clear();

        let content = std::fs::read_to_string(self.path())
            .with_context(|| format!("failed to read stage file at {:?}", self.path()))?;
        drop(lock);

        for line in content.lines() {
            if line.is_empty() {
                continue;
            }

            if let Some(record) = line.strip_prefix("add ") {
                if record.len() < OBJECT_ID_LENGTH + 1 {
                    anyhow::bail!("Invalid stage record: {:?}", line);
                }
                let (oid, path) = record.split_at(OBJECT_ID_LENGTH);
                let oid = ObjectId::try_parse(oid.to_string())?;
                let path = path
                    .strip_prefix(' ')
                    .context("Invalid stage record: missing path separator")?;
                self.additions.insert(PathBuf::from(path), oid);
            } else if let Some(path) = line.strip_prefix("rm ") {
                self.removals.insert(PathBuf::from(path));
            } else {
                anyhow::bail!("Invalid stage record: {:?}", line);
            }
        }

        self.changed = false;

        Ok(())
    }

    /// Record a pending addition, evicting any pending removal for the path
    pub fn stage_addition(&mut self, path: PathBuf, blob_oid: ObjectId) {
        self.removals.remove(&path);
        self.additions.insert(path, blob_oid);
        self.changed = true;
    }

    /// Drop a stale pending addition, if one exists
    pub fn unstage_addition(&mut self, path: &Path) {
        if self.additions.remove(path).is_some() {
            self.changed = true;
        }
    }

    /// Record a pending removal, evicting any pending addition for the path
    pub fn stage_removal(&mut self, path: PathBuf) {
        self.additions.remove(&path);
        self.removals.insert(path);
        self.changed = true;
    }

    /// Drop a pending removal, if one exists
    pub fn unstage_removal(&mut self, path: &Path) {
        if self.removals.remove(path) {
            self.changed = true;
        }
    }

    pub fn pending_addition(&self, path: &Path) -> Option<&ObjectId> {
        self.additions.get(path)
    }

    pub fn is_removal_pending(&self, path: &Path) -> bool {
        self.removals.contains(path)
    }

    pub fn additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeSet<PathBuf> {
        &self.removals
    }

    /// Owned copies of both pending collections
    ///
    /// Callers get independent snapshots; mutating them never touches the
    /// live stage.
    pub fn snapshot(&self) -> (BTreeMap<PathBuf, ObjectId>, BTreeSet<PathBuf>) {
        (self.additions.clone(), self.removals.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Empty both collections
    pub fn clear(&mut self) {
        self.additions.clear();
        self.removals.clear();
        self.changed = true;
    }

    /// Persist the stage to disk, if anything changed since loading
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the stage file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        let mut stage_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let mut lock = file_guard::lock(&mut stage_file, file_guard::Lock::Exclusive, 0, 1)?;

        let writer = lock.deref_mut();
        for (path, oid) in &self.additions {
            writeln!(writer, "add {} {}", oid.as_ref(), path.display())?;
        }
        for path in &self.removals {
            writeln!(writer, "rm {}", path.display())?;
        }

        self.changed = false;

        Ok(())
    }
}
