use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print the ids of every commit whose message matches exactly
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let mut found = false;
        for commit_oid in self.database().list_commit_ids()? {
            let commit = self.database().commit(&commit_oid)?;
            if commit.message() == message {
                writeln!(self.writer(), "{}", commit_oid)?;
                found = true;
            }
        }

        if !found {
            writeln!(self.writer(), "Found no commit with that message.")?;
        }

        Ok(())
    }
}
