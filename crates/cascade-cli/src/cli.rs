//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `cascade`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cascade",
    version,
    about = "Run workflows of dependent tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the engine config file (TOML). Defaults are used if it is missing.
    #[arg(long, global = true, value_name = "PATH", default_value = "cascade.toml")]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CASCADE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Submit the sample polygon workflow and run it to the end.
    Demo {
        /// Replace the area step with a job that always fails.
        #[arg(long)]
        fail: bool,

        /// Run the background scheduler at the configured poll interval
        /// instead of draining Ready tasks back to back.
        #[arg(long)]
        live: bool,
    },

    /// List the job kinds a task type can name.
    Kinds,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
