pub mod explain;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pymlint",
    version,
    about = "Markdown linter with pluggable rules and inline suppression"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print the full error for aborted files and log at debug level
    #[arg(long, global = true)]
    pub stack_trace: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint Markdown files and directories
    ///
    /// Logs go to stderr; set PYMLINT_LOG (e.g. PYMLINT_LOG=debug) to change the level.
    Scan {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Comma separated rule ids to enable
        #[arg(short = 'e', long = "enable-rules", default_value = "")]
        enable_rules: String,

        /// Comma separated rule ids to disable
        #[arg(short = 'd', long = "disable-rules", default_value = "")]
        disable_rules: String,

        /// List the files that would be scanned and exit
        #[arg(long)]
        list_files: bool,
    },
    /// List the available rules, or describe one
    Plugins {
        /// Rule id, name or alias (e.g., md013, line-length)
        id: Option<String>,
    },
    /// Create a default .pymlintrc.toml
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
