//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Poll a paged feedback feed from a contract and print it
#[derive(Parser, Debug)]
#[command(name = "feedpoll")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Feed configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides the config file)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Contract account id (overrides the config file)
    #[arg(long, global = true)]
    pub contract: Option<String>,

    /// Record family: all, company:<id>, user:<id>, parent:<id>
    #[arg(long, global = true)]
    pub family: Option<String>,

    /// Records per page
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Polling interval in milliseconds
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the feed and print each refreshed page
    ///
    /// Reads commands from stdin: n/next, p/prev, g <page>/goto <page>, q/quit
    Watch {
        /// Page to start on
        #[arg(long)]
        page: Option<u64>,
    },

    /// Fetch one page once and exit
    Fetch {
        /// Page to fetch
        #[arg(long, default_value = "1")]
        page: u64,
    },

    /// Validate the feed configuration
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per record
    Text,
    /// One JSON object per page
    Json,
}
