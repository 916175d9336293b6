//! CLI module for binance-tools - command-line interface and subcommands.
//!
//! Serves the tool catalog on stdio by default; `list` and `call` exercise
//! the same gateway from a terminal.

pub mod commands;

pub use commands::Cli;
