use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Collect today's activity and print the report (default)
    Report {
        /// Emit the report as JSON
        #[arg(short, long)]
        json: bool,

        /// Single-line JSON (with --json)
        #[arg(short, long)]
        compact: bool,

        /// Seconds to wait for all sources before giving up on the rest
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Show which data sources can be read, and why not
    #[command(alias = "doctor")]
    Sources {
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    Config {
        #[arg(long)]
        path: bool,

        #[arg(long)]
        reset: bool,
    },
}

/// Daily digital-activity report for macOS
#[derive(Debug, Parser)]
#[command(name = "daytrace", version, verbatim_doc_comment)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Emit the report as JSON (default report mode)
    #[arg(short, long)]
    pub json: bool,

    /// Single-line JSON (with --json)
    #[arg(short, long)]
    pub compact: bool,

    /// Seconds to wait for all sources (default report mode)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Write logs to a daily rolling file instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,
}
