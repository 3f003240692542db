use crate::areas::repository::Repository;
use crate::artifacts::core::errors::KitError;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let commit_oid = self.write_commit(message, None).await?;
        let commit = self.database().commit(&commit_oid)?;

        writeln!(
            self.writer(),
            "[{}] {}",
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }

    /// Create a commit from the staged changes and advance the active branch
    ///
    /// The new manifest is the active commit's manifest with the pending
    /// additions applied and the pending removals dropped. The branch
    /// pointer and the stage are only touched after the commit object is
    /// durably stored, keeping the inconsistency window minimal. Merge
    /// commits pass the merged-in tip as `second_parent`.
    pub(crate) async fn write_commit(
        &self,
        message: &str,
        second_parent: Option<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        if message.is_empty() {
            return Err(KitError::EmptyMessage.into());
        }

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.rehydrate()?;

        if stage.is_empty() {
            return Err(KitError::NoChangesToCommit.into());
        }

        let (head_oid, head_commit) = self.head_commit()?;

        let mut manifest = head_commit.manifest().clone();
        for (path, blob_oid) in stage.additions() {
            manifest.insert(path.clone(), blob_oid.clone());
        }
        for path in stage.removals() {
            manifest.remove(path);
        }

        let mut parents = vec![head_oid];
        if let Some(second_parent) = second_parent {
            parents.push(second_parent);
        }

        let commit = Commit::new(
            parents,
            manifest,
            message.to_string(),
            Commit::timestamp_from_env(),
        );
        let commit_oid = commit.object_id()?;
        self.database().store(commit)?;

        self.refs().update_head(commit_oid.clone())?;

        stage.clear();
        stage.write_updates()?;

        Ok(commit_oid)
    }
}
