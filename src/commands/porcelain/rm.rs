use crate::areas::repository::Repository;
use crate::artifacts::core::errors::KitError;
use std::path::PathBuf;

impl Repository {
    pub async fn rm(&mut self, path: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.rehydrate()?;

        let (_, head_commit) = self.head_commit()?;
        let path = PathBuf::from(path);

        let staged = stage.pending_addition(&path).is_some();
        let tracked = head_commit.tracked_blob(&path).is_some();

        // neither staged nor tracked: nothing to do
        if !staged && !tracked {
            return Err(KitError::NoReasonToRemove.into());
        }

        stage.unstage_addition(&path);

        if tracked {
            stage.stage_removal(path.clone());
            self.workspace().delete_file(&path)?;
        }

        stage.write_updates()?;

        Ok(())
    }
}
