//! Command-line interface for cadastro.
//!
//! This module provides the CLI structure for the `cadastro` binary. Each
//! command mounts one screen, performs one interaction and unmounts it.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeviceArgs, DevicesCommand, FormCommand, LoginCommand, OutputFormat,
    ProfileArgs, StatusCommand,
};

/// cadastro - Profile and device registration
///
/// Sign in, fill in your profile form and keep a list of your devices.
#[derive(Debug, Parser)]
#[command(name = "cadastro")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a session
    Login(LoginCommand),

    /// End the current session
    Logout,

    /// Show the welcome screen
    Welcome,

    /// Profile form
    #[command(subcommand)]
    Form(FormCommand),

    /// Device registration
    #[command(subcommand)]
    Devices(DevicesCommand),

    /// Show session and record counts
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
