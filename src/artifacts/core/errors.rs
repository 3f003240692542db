//! Recoverable error taxonomy
//!
//! Every variant maps to one user-facing line. Commands bail with these
//! before mutating any state; the command boundary in `main` prints the
//! message and exits cleanly instead of treating them as crashes. Storage
//! I/O failures stay plain `anyhow` errors and propagate as fatal.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KitError {
    #[error("Not in an initialized kit directory.")]
    NotInitialized,

    #[error("A kit version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("Object {0} not found.")]
    NotFound(String),

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No commit with that id exists.")]
    NoSuchCommit,

    #[error("No changes added to the commit.")]
    NoChangesToCommit,

    #[error("File does not exist.")]
    FileDoesNotExist,

    #[error("File does not exist in that commit.")]
    FileNotInCommit,

    #[error("No reason to remove the file.")]
    NoReasonToRemove,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileConflict,

    #[error("You have uncommitted changes.")]
    UncommittedChangesPresent,

    #[error("A branch with that name does not exist.")]
    BranchNotFound,

    #[error("A branch with that name already exists.")]
    BranchExists,

    #[error("No such branch exists.")]
    NoSuchBranchToCheckout,

    #[error("No need to checkout the current branch.")]
    CheckoutCurrentBranch,

    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch,

    #[error("Cannot merge a branch with itself.")]
    SelfMergeAttempted,

    #[error("Given branch is an ancestor of the current branch.")]
    AlreadyUpToDate,
}
