use crate::areas::repository::Repository;

impl Repository {
    /// Move the active branch to a commit and restore its snapshot
    ///
    /// The target may be a full or abbreviated commit id. The working tree
    /// is replaced with the target's manifest and the stage is cleared.
    pub async fn reset(&mut self, target: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let target_oid = self.database().resolve_commit(target)?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.rehydrate()?;

        let (_, head_commit) = self.head_commit()?;
        self.ensure_no_untracked_files(&head_commit, &stage)?;

        let target_commit = self.database().commit(&target_oid)?;
        self.replace_working_tree(&head_commit, &stage, target_commit.manifest())?;

        self.refs().update_head(target_oid)?;
        stage.clear();
        stage.write_updates()?;

        Ok(())
    }
}
