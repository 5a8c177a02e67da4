// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `tailrelay`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "tailrelay",
    version,
    about = "Stream the tail of log files to the browser over a WebSocket.",
    long_about = None
)]
pub struct CliArgs {
    /// Files to allow, added to the ungrouped group.
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Path to a config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Listen address, overrides `[server].bind`.
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Serve every route under this prefix, overrides `[server].relative_root`.
    #[arg(long, value_name = "PATH")]
    pub relative_root: Option<String>,

    /// Allow downloading raw file contents through `/fetch`.
    #[arg(long)]
    pub allow_transfers: bool,

    /// Verbose logging, same as `[server].debug = true`.
    #[arg(long)]
    pub debug: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TAILRELAY_LOG` or the debug flag decides.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate the configuration, print it, and exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
