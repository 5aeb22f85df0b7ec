use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dockformer",
    about = "Declarative container provisioning and inventory reconciliation",
    version = env!("CARGO_PKG_VERSION"),
    long_about = "Creates containers from a YAML document, tracks them in a local inventory and keeps that inventory in line with the Docker daemon."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (defaults to $DOCKFORMER_CONFIG, then ./dockformer.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (json, table, plain)
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Provision every container in a document and record it
    Apply {
        /// YAML document with a `containers:` list
        file: PathBuf,
    },

    /// List tracked containers with their current status
    List,

    /// Show one tracked container
    Show { name: String },

    /// Start a tracked container
    Start { name: String },

    /// Stop a tracked container
    Stop { name: String },

    /// Restart a tracked container
    Restart { name: String },

    /// Remove a container and forget it
    Remove { name: String },

    /// Print container output
    Logs {
        name: String,

        /// Number of lines from the end
        #[arg(short = 'n', long)]
        tail: Option<usize>,
    },

    /// Overwrite stored image or ports without touching the container
    Update {
        name: String,

        #[arg(long)]
        image: Option<String>,

        /// Port mapping field, e.g. "8080:80,53:53/udp"
        #[arg(long)]
        ports: Option<String>,
    },

    /// Run one reconciliation pass
    Reconcile,

    /// Apply a document, then reconcile periodically until interrupted
    Supervise {
        /// Document applied once at startup
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Seconds between passes (overrides the config file)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
    Plain,
}

impl OutputFormat {
    /// Status lines and spinners are left out of JSON output
    pub fn shows_status(self) -> bool {
        self != OutputFormat::Json
    }
}
