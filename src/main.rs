use anyhow::Result;
use clap::{Parser, Subcommand};
use kit::areas::repository::Repository;
use kit::artifacts::core::errors::KitError;

#[derive(Parser)]
#[command(
    name = "kit",
    version = "0.1.0",
    about = "A minimal local version-control engine",
    long_about = "kit records immutable snapshots of a file tree, organizes them \
    into a commit graph, and supports branching and three-way merging. \
    It serves a single user operating on one working directory.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Stage file contents for the next commit",
        long_about = "This command hashes the given files, stores their content, and records them \
        as pending additions. Adding a file whose content already matches the active commit \
        clears any stale pending entry instead."
    )]
    Add {
        #[arg(index = 1, num_args = 1.., required = true, help = "Files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "rm",
        about = "Stage a tracked file for removal and delete it",
        long_about = "This command unstages any pending addition for the file and, if the file is \
        tracked by the active commit, records a pending removal and deletes the file from the \
        working directory."
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        path: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit from the staged changes with the specified commit message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "log",
        about = "Show the active branch's history",
        long_about = "This command prints the first-parent chain of commits from the active commit \
        down to the root, newest first."
    )]
    Log,
    #[command(
        name = "global-log",
        about = "Show every commit ever made",
        long_about = "This command prints all commits in the object store, in id order."
    )]
    GlobalLog,
    #[command(
        name = "find",
        about = "Print the ids of commits with the given message",
        long_about = "This command prints the id of every commit whose message matches the given \
        message exactly."
    )]
    Find {
        #[arg(index = 1, help = "The commit message to search for")]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show branches, staged changes, and untracked files"
    )]
    Status,
    #[command(
        name = "checkout",
        about = "Switch to another branch",
        long_about = "This command replaces the working directory with the snapshot at the tip of \
        the given branch and attaches HEAD to it. The staging area is cleared."
    )]
    Checkout {
        #[arg(index = 1, help = "The branch to switch to")]
        branch: String,
    },
    #[command(
        name = "restore",
        about = "Restore one file from a commit",
        long_about = "This command copies a file's content out of the active commit (or the commit \
        given via --source) into the working directory."
    )]
    Restore {
        #[arg(index = 1, help = "The file to restore")]
        path: String,
        #[arg(long, help = "Commit id (or abbreviation) to restore from")]
        source: Option<String>,
    },
    #[command(name = "branch", about = "Manage branches")]
    Branch {
        #[command(subcommand)]
        command: BranchCommands,
    },
    #[command(
        name = "reset",
        about = "Move the active branch to a commit",
        long_about = "This command replaces the working directory with the given commit's snapshot \
        and moves the active branch pointer to it. The staging area is cleared."
    )]
    Reset {
        #[arg(index = 1, help = "Commit id (or abbreviation) to reset to")]
        commit: String,
    },
    #[command(
        name = "merge",
        about = "Merge another branch into the active branch",
        long_about = "This command computes the three-way merge of the active branch, the given \
        branch, and their split point. Conflicting files are written with conflict markers and \
        staged; the merge concludes with a two-parent commit."
    )]
    Merge {
        #[arg(index = 1, help = "The branch to merge in")]
        branch: String,
    },
}

#[derive(Subcommand)]
enum BranchCommands {
    #[command(name = "create", about = "Create a branch at the active commit")]
    Create {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(name = "delete", about = "Delete a branch")]
    Delete {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => Ok(()),
        // recoverable outcomes map to one user-facing line, not a crash
        Err(error) => match error.downcast_ref::<KitError>() {
            Some(kit_error) => {
                println!("{}", kit_error);
                Ok(())
            }
            None => Err(error),
        },
    }
}

fn repository_in_cwd() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Init { path } => {
            let mut repository = match path {
                Some(path) => Repository::new(path, Box::new(std::io::stdout()))?,
                None => repository_in_cwd()?,
            };

            repository.init().await?
        }
        Commands::Add { paths } => repository_in_cwd()?.add(paths).await?,
        Commands::Rm { path } => repository_in_cwd()?.rm(path).await?,
        Commands::Commit { message } => repository_in_cwd()?.commit(message).await?,
        Commands::Log => repository_in_cwd()?.log()?,
        Commands::GlobalLog => repository_in_cwd()?.global_log()?,
        Commands::Find { message } => repository_in_cwd()?.find(message)?,
        Commands::Status => repository_in_cwd()?.status().await?,
        Commands::Checkout { branch } => repository_in_cwd()?.checkout(branch).await?,
        Commands::Restore { path, source } => {
            repository_in_cwd()?.restore(path, source.as_deref()).await?
        }
        Commands::Branch { command } => match command {
            BranchCommands::Create { name } => repository_in_cwd()?.branch_create(name)?,
            BranchCommands::Delete { name } => repository_in_cwd()?.branch_delete(name)?,
        },
        Commands::Reset { commit } => repository_in_cwd()?.reset(commit).await?,
        Commands::Merge { branch } => repository_in_cwd()?.merge(branch).await?,
    }

    Ok(())
}
