use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print the active commit's mainline history, newest first
    ///
    /// Walks the first-parent chain with an explicit loop; long histories
    /// must not grow the call stack.
    pub fn log(&self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let (head_oid, _) = self.head_commit()?;
        let mut current = Some(head_oid);

        while let Some(commit_oid) = current {
            let commit = self.database().commit(&commit_oid)?;
            self.display_commit(&commit_oid, &commit)?;

            current = commit.parent().cloned();
        }

        Ok(())
    }

    /// Print every commit in the object store, in id order
    pub fn global_log(&self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        for commit_oid in self.database().list_commit_ids()? {
            let commit = self.database().commit(&commit_oid)?;
            self.display_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    fn display_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(self.writer(), "===")?;
        writeln!(
            self.writer(),
            "{}",
            format!("commit {}", commit_oid).yellow()
        )?;

        if let [first_parent, second_parent, ..] = commit.parents() {
            writeln!(
                self.writer(),
                "Merge: {} {}",
                first_parent.to_short_oid(),
                second_parent.to_short_oid()
            )?;
        }

        writeln!(self.writer(), "Date: {}", commit.readable_timestamp())?;
        writeln!(self.writer(), "{}", commit.message())?;
        writeln!(self.writer())?;

        Ok(())
    }
}
