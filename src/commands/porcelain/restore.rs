use crate::areas::repository::Repository;
use crate::artifacts::core::errors::KitError;
use std::path::PathBuf;

impl Repository {
    /// Copy one file's committed content back into the working tree
    ///
    /// With no source the active commit is used; otherwise `source` is
    /// resolved as a full or abbreviated commit id.
    pub async fn restore(&mut self, path: &str, source: Option<&str>) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let commit = match source {
            None => self.head_commit()?.1,
            Some(revision) => {
                let commit_oid = self.database().resolve_commit(revision)?;
                self.database().commit(&commit_oid)?
            }
        };

        let path = PathBuf::from(path);
        let blob_oid = commit
            .tracked_blob(&path)
            .ok_or(KitError::FileNotInCommit)?;

        let content = self.database().blob_content(blob_oid)?;
        self.workspace().delete_file(&path)?;
        self.workspace().write_file(&path, &content)?;

        Ok(())
    }
}
