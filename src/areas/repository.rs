use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::areas::stage::Stage;
use crate::areas::workspace::Workspace;
use crate::artifacts::core::errors::KitError;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Name of the repository directory inside the workspace
pub const REPOSITORY_DIR: &str = ".kit";

/// Name of the branch created at init
pub const DEFAULT_BRANCH: &str = "master";

/// Aggregate handle over the repository subsystems
///
/// Owns the object database, staging area, refs, and workspace, and is the
/// receiver for every porcelain operation. The stage is the single mutable
/// piece of session state and is threaded through commands explicitly
/// rather than living in a global.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    stage: Arc<Mutex<Stage>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;

        let stage = Stage::new(path.join(REPOSITORY_DIR).join("stage").into_boxed_path());
        let database = Database::new(path.join(REPOSITORY_DIR).join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(path.join(REPOSITORY_DIR).into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            stage: Arc::new(Mutex::new(stage)),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kit_path(&self) -> Box<Path> {
        self.path.join(REPOSITORY_DIR).into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn stage(&self) -> Arc<Mutex<Stage>> {
        self.stage.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn is_initialized(&self) -> bool {
        self.kit_path().is_dir()
    }

    /// Guard every command except `init`
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if !self.is_initialized() {
            return Err(KitError::NotInitialized.into());
        }

        Ok(())
    }

    /// Load the commit HEAD resolves to
    ///
    /// After init there is always one; a missing HEAD is a broken repository.
    pub fn head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        let head_oid = self
            .refs()
            .read_head()?
            .context("HEAD does not resolve to a commit")?;
        let commit = self.database().commit(&head_oid)?;

        Ok((head_oid, commit))
    }
}
