use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

// Terminology:
// - staged files: pending additions in the stage
// - removed files: pending removals in the stage
// - modified-not-staged: tracked or staged content that no longer matches
//   the working tree
// - untracked files: working-tree files the repository knows nothing about
impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.rehydrate()?;

        let (_, head_commit) = self.head_commit()?;
        let workspace_files = self
            .workspace()
            .list_files(None)?
            .into_iter()
            .collect::<BTreeSet<_>>();

        writeln!(self.writer(), "=== Branches ===")?;
        let active_branch = self.refs().active_branch_name()?;
        writeln!(self.writer(), "*{}", active_branch)?;
        for branch in self.refs().list_branches()? {
            if branch != active_branch {
                writeln!(self.writer(), "{}", branch)?;
            }
        }

        writeln!(self.writer())?;
        writeln!(self.writer(), "=== Staged Files ===")?;
        for path in stage.additions().keys() {
            writeln!(self.writer(), "{}", path.display())?;
        }

        writeln!(self.writer())?;
        writeln!(self.writer(), "=== Removed Files ===")?;
        for path in stage.removals() {
            writeln!(self.writer(), "{}", path.display())?;
        }

        writeln!(self.writer())?;
        writeln!(self.writer(), "=== Modifications Not Staged For Commit ===")?;
        let mut modifications = BTreeSet::new();

        // staged for addition, but deleted or modified in the working tree
        for (path, staged_oid) in stage.additions() {
            if !workspace_files.contains(path) {
                modifications.insert(format!("{} (deleted)", path.display()));
            } else if self.workspace_blob_oid(path)? != *staged_oid {
                modifications.insert(format!("{} (modified)", path.display()));
            }
        }

        // tracked in the active commit, changed or deleted without staging
        for (path, tracked_oid) in head_commit.manifest() {
            if workspace_files.contains(path)
                && stage.pending_addition(path).is_none()
                && self.workspace_blob_oid(path)? != *tracked_oid
            {
                modifications.insert(format!("{} (modified)", path.display()));
            }
            if !workspace_files.contains(path) && !stage.is_removal_pending(path) {
                modifications.insert(format!("{} (deleted)", path.display()));
            }
        }

        for line in modifications {
            writeln!(self.writer(), "{}", line)?;
        }

        writeln!(self.writer())?;
        writeln!(self.writer(), "=== Untracked Files ===")?;
        for path in &workspace_files {
            if stage.pending_addition(path).is_none()
                && head_commit.tracked_blob(path).is_none()
            {
                writeln!(self.writer(), "{}", path.display())?;
            }
        }

        Ok(())
    }

    fn workspace_blob_oid(&self, path: &Path) -> anyhow::Result<ObjectId> {
        self.workspace().parse_blob(path)?.object_id()
    }
}
