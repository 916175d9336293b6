//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - serve: run the stdio tool server (default)
//! - list: print the tool catalog
//! - call: invoke one tool and print its JSON output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// binance-tools - Binance market data as callable tools
#[derive(Parser, Debug)]
#[command(name = "binance-tools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the upstream API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the per-request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Serve the tool catalog over stdin/stdout
    Serve,

    /// List the available tools
    List {
        /// Print the definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke a single tool
    Call {
        /// Tool name as advertised by `list`
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}
