use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::errors::KitError;
use crate::artifacts::history::ancestry::{find_split_point, first_parent_chain};
use crate::artifacts::merge::resolution::{MergeOutcome, conflict_content, decide};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use anyhow::Context;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

impl Repository {
    /// Merge another branch into the active one
    ///
    /// Preconditions run in order before anything is touched: no untracked
    /// file may be in the way, the stage must be clean, the branch must
    /// exist and differ from the active one. When the active commit already
    /// sits on the given branch's mainline the branch pointer fast-forwards
    /// without a merge commit; when the given tip is itself the split point
    /// there is nothing to merge. Otherwise every path in the three
    /// manifests goes through the decision table, conflicts are written out
    /// with markers and staged, and a two-parent commit concludes the merge
    /// whether or not conflicts occurred.
    pub async fn merge(&mut self, given_branch: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.rehydrate()?;

        let (head_oid, head_commit) = self.head_commit()?;

        self.ensure_no_untracked_files(&head_commit, &stage)?;

        if !stage.is_empty() {
            return Err(KitError::UncommittedChangesPresent.into());
        }

        let given_name = BranchName::try_parse(given_branch.to_string())?;
        if !self.refs().branch_exists(&given_name) {
            return Err(KitError::BranchNotFound.into());
        }

        let current_name = self.refs().active_branch_name()?;
        if given_name == current_name {
            return Err(KitError::SelfMergeAttempted.into());
        }

        let given_oid = self
            .refs()
            .branch_commit(&given_name)?
            .with_context(|| format!("branch {} does not point to a commit", given_name))?;

        // the given branch's mainline doubles as the split-point candidate set
        let given_chain = first_parent_chain(self.database(), &given_oid)?;

        if given_chain.contains(&head_oid) {
            let given_commit = self.database().commit(&given_oid)?;
            self.replace_working_tree(&head_commit, &stage, given_commit.manifest())?;
            self.refs().update_head(given_oid)?;
            stage.clear();
            stage.write_updates()?;

            writeln!(self.writer(), "Current branch fast-forwarded.")?;
            return Ok(());
        }

        let split_oid = find_split_point(self.database(), &head_oid, &given_chain)?
            .context("no common ancestor found between the branches")?;

        if split_oid == given_oid {
            return Err(KitError::AlreadyUpToDate.into());
        }

        let split_commit = self.database().commit(&split_oid)?;
        let given_commit = self.database().commit(&given_oid)?;

        let split_manifest = split_commit.manifest();
        let current_manifest = head_commit.manifest();
        let given_manifest = given_commit.manifest();

        let paths = split_manifest
            .keys()
            .chain(current_manifest.keys())
            .chain(given_manifest.keys())
            .cloned()
            .collect::<BTreeSet<PathBuf>>();

        for path in paths {
            let outcome = decide(
                split_manifest.get(&path),
                current_manifest.get(&path),
                given_manifest.get(&path),
            );

            match outcome {
                MergeOutcome::KeepCurrent | MergeOutcome::LeaveAbsent => {}
                MergeOutcome::TakeGiven => {
                    let blob_oid = given_manifest
                        .get(&path)
                        .with_context(|| format!("{} is not tracked by the given branch", path.display()))?;
                    let content = self.database().blob_content(blob_oid)?;

                    self.workspace().write_file(&path, &content)?;
                    stage.stage_addition(path, blob_oid.clone());
                }
                MergeOutcome::RemoveFromCurrent => {
                    stage.stage_removal(path.clone());
                    self.workspace().delete_file(&path)?;
                }
                MergeOutcome::Conflict => {
                    writeln!(self.writer(), "Encountered a merge conflict.")?;

                    let current_content = current_manifest
                        .get(&path)
                        .map(|oid| self.database().blob_content(oid))
                        .transpose()?;
                    let given_content = given_manifest
                        .get(&path)
                        .map(|oid| self.database().blob_content(oid))
                        .transpose()?;

                    let content =
                        conflict_content(current_content.as_deref(), given_content.as_deref());

                    let blob = Blob::new(content.clone());
                    let blob_oid = blob.object_id()?;
                    self.database().store(blob)?;

                    self.workspace().write_file(&path, &content)?;
                    stage.stage_addition(path, blob_oid);
                }
            }
        }

        stage.write_updates()?;
        // write_commit re-acquires the stage lock
        drop(stage);

        let message = format!("Merged {} into {}.", given_name, current_name);
        let merge_oid = self.write_commit(&message, Some(given_oid)).await?;

        writeln!(
            self.writer(),
            "[{}] {}",
            merge_oid.to_short_oid(),
            message
        )?;

        Ok(())
    }
}
