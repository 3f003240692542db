use crate::areas::repository::Repository;
use crate::areas::stage::Stage;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::errors::KitError;
use crate::artifacts::objects::commit::{Commit, Manifest};
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// Switch the working tree and HEAD to another branch
    pub async fn checkout(&mut self, branch: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch_name = BranchName::try_parse(branch.to_string())?;
        if !self.refs().branch_exists(&branch_name) {
            return Err(KitError::NoSuchBranchToCheckout.into());
        }

        let current_name = self.refs().active_branch_name()?;
        if current_name == branch_name {
            return Err(KitError::CheckoutCurrentBranch.into());
        }

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.rehydrate()?;

        let (_, head_commit) = self.head_commit()?;
        self.ensure_no_untracked_files(&head_commit, &stage)?;

        let target_oid = self
            .refs()
            .branch_commit(&branch_name)?
            .with_context(|| format!("branch {} does not point to a commit", branch_name))?;
        let target_commit = self.database().commit(&target_oid)?;

        self.replace_working_tree(&head_commit, &stage, target_commit.manifest())?;

        self.refs().set_head(&branch_name)?;
        stage.clear();
        stage.write_updates()?;

        writeln!(self.writer(), "Switched to branch '{}'", branch_name)?;

        Ok(())
    }

    /// Refuse to clobber files the repository knows nothing about
    ///
    /// A working-tree file is untracked when the active commit does not
    /// track it and no addition is staged for it. Any such file blocks
    /// operations that rewrite the working tree.
    pub(crate) fn ensure_no_untracked_files(
        &self,
        head_commit: &Commit,
        stage: &Stage,
    ) -> anyhow::Result<()> {
        for file in self.workspace().list_files(None)? {
            if head_commit.tracked_blob(&file).is_none() && stage.pending_addition(&file).is_none()
            {
                return Err(KitError::UntrackedFileConflict.into());
            }
        }

        Ok(())
    }

    /// Swap the working tree over to another commit's snapshot
    ///
    /// Deletes everything the active commit tracks plus everything staged
    /// for addition, then materializes the target manifest. Only reached
    /// after the untracked-file guard, so nothing else can be in the way.
    pub(crate) fn replace_working_tree(
        &self,
        head_commit: &Commit,
        stage: &Stage,
        target_manifest: &Manifest,
    ) -> anyhow::Result<()> {
        for path in head_commit.manifest().keys() {
            self.workspace().delete_file(path)?;
        }
        for path in stage.additions().keys() {
            self.workspace().delete_file(path)?;
        }

        for (path, blob_oid) in target_manifest {
            let content = self.database().blob_content(blob_oid)?;
            self.workspace().write_file(path, &content)?;
        }

        Ok(())
    }
}
