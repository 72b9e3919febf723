//! idiota CLI - idiota command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cmd;
mod diff_utils;
mod util;

/// idiota - a tiny content-addressed version control system
#[derive(Parser)]
#[command(name = "idiota")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty repository in the current directory
    Init,
    /// Store a file as a blob and print its id
    HashObject {
        /// File to store
        file: PathBuf,
    },
    /// Print the raw payload of an object
    CatFile {
        /// Object id or ref name
        object: String,
    },
    /// Write the index as a tree and print its id
    WriteTree,
    /// Replace the index and working tree with a tree
    ReadTree {
        /// Tree id or ref name
        tree: String,
    },
    /// Record the index as a new commit
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },
    /// Show commit history
    Log {
        /// Starting commit (default: HEAD)
        #[arg(default_value = "@")]
        oid: String,
    },
    /// Show a commit and the changes it introduced
    Show {
        /// Commit to show (default: HEAD)
        #[arg(default_value = "@")]
        oid: String,
    },
    /// Show changes between commits, the index and the working tree
    Diff {
        /// Compare the index instead of the working tree
        #[arg(long)]
        cached: bool,
        /// Commit to compare against
        commit: Option<String>,
    },
    /// Switch to a branch or detach HEAD at a commit
    Checkout {
        /// Branch name or commit
        commit: String,
    },
    /// Create a tag, or list tags when no name is given
    Tag {
        /// Tag name
        name: Option<String>,
        /// Commit to tag (default: HEAD)
        #[arg(default_value = "@")]
        oid: String,
    },
    /// Create, list or delete branches
    Branch {
        /// Delete the named branch
        #[arg(short = 'd', long = "delete", value_name = "BRANCH", conflicts_with = "name")]
        delete: Option<String>,
        /// New branch name
        name: Option<String>,
        /// Commit the branch starts at (default: HEAD)
        #[arg(default_value = "@")]
        start_point: String,
    },
    /// Show the working tree status
    Status,
    /// Move HEAD (and the current branch) to a commit
    Reset {
        /// Target commit
        commit: String,
    },
    /// Merge a commit into HEAD
    Merge {
        /// Commit or branch to merge
        commit: String,
    },
    /// Print the best common ancestor of two commits
    MergeBase {
        commit1: String,
        commit2: String,
    },
    /// Add file contents to the index
    Add {
        /// Files or directories to stage
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the ref and commit graph in Graphviz DOT format
    K,
    /// Remove unreachable objects
    Gc,
    /// View and edit configuration
    #[command(args_conflicts_with_subcommands = true)]
    Config {
        /// List all configuration values
        #[arg(long)]
        list: bool,
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print one configuration value
    Get {
        /// Key such as diff.context_lines
        key: String,
    },
    /// Set a value in the repository config file
    Set { key: String, value: String },
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays the command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("IDIOTA_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init => cmd::init::run(),
        Commands::HashObject { file } => cmd::objects::hash_object(&file),
        Commands::CatFile { object } => cmd::objects::cat_file(&object),
        Commands::WriteTree => cmd::objects::write_tree(),
        Commands::ReadTree { tree } => cmd::checkout::read_tree(&tree),
        Commands::Commit { message } => cmd::commit::run(&message),
        Commands::Log { oid } => cmd::log::run(&oid),
        Commands::Show { oid } => cmd::show::run(&oid),
        Commands::Diff { cached, commit } => cmd::diff::run(cached, commit.as_deref()),
        Commands::Checkout { commit } => cmd::checkout::run(&commit),
        Commands::Tag { name, oid } => cmd::refs::tag(name.as_deref(), &oid),
        Commands::Branch {
            delete,
            name,
            start_point,
        } => match delete {
            Some(branch) => cmd::refs::delete_branch(&branch),
            None => cmd::refs::branch(name.as_deref(), &start_point),
        },
        Commands::Status => cmd::status::run(),
        Commands::Reset { commit } => cmd::refs::reset(&commit),
        Commands::Merge { commit } => cmd::merge::run(&commit),
        Commands::MergeBase { commit1, commit2 } => cmd::merge::merge_base(&commit1, &commit2),
        Commands::Add { files } => cmd::add::run(&files),
        Commands::K => cmd::k::run(),
        Commands::Gc => cmd::gc::run(),
        Commands::Config { list, action } => match action {
            Some(ConfigCommands::Get { key }) => cmd::config::run_get(&key),
            Some(ConfigCommands::Set { key, value }) => cmd::config::run_set(&key, &value),
            None if list => cmd::config::run_list(),
            None => anyhow::bail!(
                "Nothing to do: use 'idiota config --list', 'get <key>' or 'set <key> <value>'"
            ),
        },
    }
}
