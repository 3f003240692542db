use crate::areas::repository::{DEFAULT_BRANCH, Repository};
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::errors::KitError;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(KitError::AlreadyInitialized.into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create refs/heads directory")?;

        // every history starts from the same epoch-pinned root commit
        let root_commit = Commit::root();
        let root_oid = root_commit.object_id()?;
        self.database().store(root_commit)?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;
        self.refs().create_branch(&default_branch, root_oid)?;
        self.refs()
            .set_head(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        let stage = self.stage();
        let stage = stage.lock().await;
        if !stage.path().exists() {
            fs::write(stage.path(), b"").context("Failed to create stage file")?;
        }

        writeln!(
            self.writer(),
            "Initialized empty kit repository in {}",
            self.path().display()
        )?;

        Ok(())
    }
}
