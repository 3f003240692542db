use crate::areas::repository::Repository;
use crate::artifacts::core::errors::KitError;
use crate::artifacts::objects::object::Object;
use std::path::Path;

impl Repository {
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.rehydrate()?;

        let (_, head_commit) = self.head_commit()?;

        // expand each provided path if it's a directory
        let mut files = Vec::new();
        for path in paths {
            let path = Path::new(path);

            if self.workspace().path().join(path).is_dir() {
                files.extend(self.workspace().list_files(Some(path.to_path_buf()))?);
            } else if self.workspace().exists(path) {
                files.push(path.to_path_buf());
            } else {
                return Err(KitError::FileDoesNotExist.into());
            }
        }

        for path in files {
            let blob = self.workspace().parse_blob(&path)?;
            let blob_oid = blob.object_id()?;

            match head_commit.tracked_blob(&path) {
                // content already matches the active commit: nothing to add
                Some(tracked_oid) if *tracked_oid == blob_oid => {
                    stage.unstage_addition(&path);
                    stage.unstage_removal(&path);
                }
                _ => {
                    self.database().store(blob)?;
                    stage.stage_addition(path, blob_oid);
                }
            }
        }

        stage.write_updates()?;

        Ok(())
    }
}
