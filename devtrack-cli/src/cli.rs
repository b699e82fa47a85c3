use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Track IT development requests from requirements to deployment"
)]
pub struct Cli {
    /// Snapshot file (JSON or YAML) to load instead of the sample data
    #[clap(long, global = true)]
    pub data: Option<PathBuf>,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[clap(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show request counts, stage and priority distribution, and recent requests
    Dashboard,

    /// List development requests
    List {
        /// Case-insensitive search over title, id and requester
        #[clap(long, short = 's')]
        search: Option<String>,

        /// Filter by priority (Low, Medium, High, Urgent or all)
        #[clap(long)]
        priority: Option<String>,

        /// Filter by stage (e.g. analysis, uat, completed or all)
        #[clap(long)]
        stage: Option<String>,
    },

    /// Show all details of a request, its timeline and tracked items
    Show {
        /// The request id (e.g. REQ-001)
        id: String,
    },

    /// Monthly MIS summary: stats, departments and phase activity
    Mis {
        /// Month as YYYY-MM (defaults to the previous calendar month)
        #[clap(long, short = 'm')]
        month: Option<String>,
    },

    /// Monthly operational report
    Report {
        /// Month as YYYY-MM (defaults to the current month)
        #[clap(long, short = 'm')]
        month: Option<String>,

        /// Print a single section in full (e.g. budget, it-operations)
        #[clap(long)]
        section: Option<String>,
    },

    /// Export a snapshot of the in-memory state
    Export {
        /// Output format: json or yaml
        #[clap(long, short = 'f')]
        format: Option<String>,

        /// Output file (defaults to stdout)
        #[clap(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Manage the devtrack config file
    Config {
        #[clap(subcommand)]
        command: ConfigCommand,
    },

    /// Interactive session over the in-memory tracker
    Session {
        /// Write a snapshot to this file when the session ends
        #[clap(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the config file path and values
    Show,

    /// Create the config file with defaults if it does not exist
    Init,

    /// Set the default reporter / uploader name
    SetUser {
        /// The user name
        name: String,
    },

    /// Set the snapshot file loaded at startup
    SetData {
        /// Path to a JSON or YAML snapshot; omit to use the sample data
        path: Option<String>,
    },
}
