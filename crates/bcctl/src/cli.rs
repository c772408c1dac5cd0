use std::path::PathBuf;

use bcctl_observe::{LoggerFormat, LoggerLevel};
use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;

/// Issue a command through a broadcast relay and follow its execution.
#[derive(Parser, Debug)]
#[command(name = "bcctl", version, about, long_about = None)]
pub struct Cli {
    /// Relay host (overrides the configuration file)
    #[arg(short = 'b', long, global = true)]
    pub broadcaster_host: Option<String>,

    /// Relay port (overrides the configuration file)
    #[arg(short = 'p', long, global = true, allow_negative_numbers = true)]
    pub broadcaster_port: Option<i64>,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Log filter directive (e.g. info, debug, bcctl_core=trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LoggerLevel,

    /// Log format (text, json, journald)
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LoggerFormat,

    /// Write TeamCity progress messages to stdout
    #[arg(long, global = true)]
    pub teamcity: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a command on a target and wait for it to finish
    Exec(ExecArgs),

    /// Print the current state of a target
    Info(InfoArgs),
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    pub target: String,

    /// Seconds to wait for a receiver to start the command
    pub waiting_timeout: u64,

    /// Seconds to wait for a started command to complete
    pub pending_timeout: u64,

    pub cmd: String,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    pub target: String,

    /// Seconds to wait for the info
    pub timeout: u64,

    /// Query the REST API instead of listening on the relay
    #[arg(long)]
    pub rest: bool,

    /// REST API port (defaults to the relay port)
    #[arg(long, requires = "rest")]
    pub api_port: Option<u16>,
}
