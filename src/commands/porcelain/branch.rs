use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::errors::KitError;

impl Repository {
    /// Create a new branch pointing at the active commit
    pub fn branch_create(&mut self, name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch_name = BranchName::try_parse(name.to_string())?;
        let (head_oid, _) = self.head_commit()?;

        self.refs().create_branch(&branch_name, head_oid)?;

        Ok(())
    }

    /// Delete a branch; the active branch cannot be deleted
    pub fn branch_delete(&mut self, name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch_name = BranchName::try_parse(name.to_string())?;
        if !self.refs().branch_exists(&branch_name) {
            return Err(KitError::BranchNotFound.into());
        }

        if self.refs().active_branch_name()? == branch_name {
            return Err(KitError::CannotRemoveCurrentBranch.into());
        }

        self.refs().delete_branch(&branch_name)?;

        Ok(())
    }
}
