//! CLI interface for the roleplay server
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sales role-play chat server
///
/// Forwards prompts to a Gemini model with product and script context and
/// keeps per-session stage scores.
#[derive(Parser, Debug)]
#[command(name = "roleplay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Interface to bind, overrides server.host
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration, data files and the API key
    Doctor {
        /// Also send a one-line request to the model
        #[arg(long)]
        ping: bool,
    },
}

impl Cli {
    /// Subcommand to run, `serve` with config defaults when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            host: None,
            port: None,
        })
    }
}
