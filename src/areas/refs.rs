//! References (branches and HEAD)
//!
//! References are human-readable names pointing to commits:
//!
//! - HEAD: special reference naming the current branch (attached) or a
//!   commit id directly (detached)
//! - Branches: `refs/heads/*` pointing to branch tip commits
//!
//! ## File Format
//!
//! References are stored as text files containing either:
//! - A 40-character SHA-1 hash (direct reference)
//! - `ref: <path>` for symbolic references

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::core::errors::KitError;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// References manager
///
/// Handles reading and writing references (branches, HEAD). Ref-file
/// updates take an exclusive lock, which is the repository-level mutual
/// exclusion the engine itself does not otherwise need.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the refs directory (typically `.kit`)
    path: Box<Path>,
}

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Internal representation of a reference value
#[derive(Debug, Clone)]
enum SymRefOrOid {
    /// Symbolic reference pointing to another ref
    SymRef { sym_ref_name: SymRefName },
    /// Direct object ID
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].to_string()),
            }))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

impl Refs {
    /// Get the name of the branch HEAD is attached to
    ///
    /// Fails when HEAD points directly at a commit (detached).
    pub fn active_branch_name(&self) -> anyhow::Result<BranchName> {
        let current_ref = self.current_ref(None)?;

        if current_ref.is_detached_head() {
            anyhow::bail!("HEAD is detached; no active branch");
        }

        BranchName::try_parse_sym_ref_name(&current_ref)
    }

    /// Get the current symbolic reference
    ///
    /// Follows symbolic references recursively to find the final direct
    /// reference. For example, if HEAD points to refs/heads/master, returns
    /// refs/heads/master.
    pub fn current_ref(&self, source: Option<SymRefName>) -> anyhow::Result<SymRefName> {
        let source = source.unwrap_or_else(|| SymRefName::new("HEAD".to_string()));

        let ref_content =
            SymRefOrOid::read_symref_or_oid(self.path.join(source.as_ref_path()).as_path())?;

        match ref_content {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => Ok(self.current_ref(Some(sym_ref_name))?),
            Some(_) | None => Ok(source),
        }
    }

    /// Read a symbolic reference, following indirection
    fn read_symref(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        let ref_content = SymRefOrOid::read_symref_or_oid(path)?;

        match ref_content {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                self.read_symref(self.path.join(sym_ref_name.as_ref_path()).as_path())
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    /// Update a symbolic reference to point to a new commit
    ///
    /// Follows the symref chain and updates the final target, so updating
    /// HEAD while attached moves the active branch pointer.
    ///
    /// # Locking
    ///
    /// Acquires exclusive lock on the reference file during update.
    fn update_symref(&self, path: &Path, oid: ObjectId) -> anyhow::Result<()> {
        let mut ref_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;

        let ref_content = SymRefOrOid::read_symref_or_oid(path)?;

        match ref_content {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                let target_path = self.path.join(sym_ref_name.as_ref_path());
                self.update_symref(target_path.as_path(), oid)
            }
            Some(SymRefOrOid::Oid(_)) | None => {
                // oids are fixed-width, so overwriting in place is exact
                lock.deref_mut().write_all(oid.as_ref().as_bytes())?;
                Ok(())
            }
        }
    }

    /// Attach HEAD to a branch
    pub fn set_head(&self, branch_name: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(
            self.head_path(),
            format!("ref: {}", branch_name.to_sym_ref_name().as_ref_path()),
        )
    }

    /// Move the commit HEAD resolves to
    ///
    /// While attached this advances the active branch pointer.
    pub fn update_head(&self, oid: ObjectId) -> anyhow::Result<()> {
        self.update_symref(self.head_path().as_ref(), oid)
    }

    /// Read the commit id HEAD resolves to
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.head_path())
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.clone())
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.heads_path().join(name.as_ref()).is_file()
    }

    /// Read the commit a branch points to
    pub fn branch_commit(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.heads_path().join(name.as_ref());
        self.read_symref(&branch_path)
    }

    /// Move a branch pointer to a commit
    pub fn set_branch_commit(&self, name: &BranchName, oid: ObjectId) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(name.as_ref()).into_boxed_path();
        self.update_ref_file(branch_path, oid.as_ref().into())
    }

    /// Create a new branch pointing at a commit
    pub fn create_branch(&self, name: &BranchName, source_oid: ObjectId) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(name.as_ref()).into_boxed_path();

        if branch_path.exists() {
            return Err(KitError::BranchExists.into());
        }

        self.update_ref_file(branch_path, source_oid.as_ref().into())
    }

    /// Delete a branch, returning the commit it pointed to
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.heads_path().join(name.as_ref()).into_boxed_path();

        let oid = self.read_symref(branch_path.as_ref())?;
        match oid {
            Some(oid) => {
                std::fs::remove_file(branch_path.as_ref()).with_context(|| {
                    format!("failed to delete branch file at {:?}", branch_path)
                })?;
                self.prune_branch_empty_parent_dirs(branch_path.as_ref())?;

                Ok(oid)
            }
            None => Err(KitError::BranchNotFound.into()),
        }
    }

    /// List all branch names in ascending order
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(heads_path.as_ref())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                if entry.path().is_file() {
                    let relative_path = entry.path().strip_prefix(heads_path.as_ref()).ok()?;
                    BranchName::try_parse(relative_path.to_string_lossy().to_string()).ok()
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        branches.sort();
        Ok(branches)
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join("HEAD").into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
