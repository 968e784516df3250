// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use crate::commands::Command;
use crate::tracing::{TracingConfig, TracingFormat};
use clap::{Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// The chain was rejected or is blocked by a cycle
pub const EXIT_REJECTED: i32 = 1;
/// CLI, input file or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Unexpected runtime failure exit code
pub const EXIT_OTHER: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Bad input file, catalog or configuration (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(questgraph::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },

    /// The chain failed validation (exit code 1)
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rejected(#[from] questgraph_chains::Error),

    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(questgraph::cli::other))]
    Other {
        /// The error message
        message: String,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<questgraph_graph::Error> for CliError {
    fn from(err: questgraph_graph::Error) -> Self {
        Self::Rejected(err.into())
    }
}

impl From<questgraph_chains::ConfigError> for CliError {
    fn from(err: questgraph_chains::ConfigError) -> Self {
        let help = match &err {
            questgraph_chains::ConfigError::InvalidEnv { key, .. } => {
                format!("Unset {key} or set it to a non-negative integer")
            }
            _ => "Check the file passed to --config".to_string(),
        };
        Self::config_with_help(err.to_string(), help)
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Rejected(_) => EXIT_REJECTED,
        CliError::Other { .. } => EXIT_OTHER,
    }
}

/// Render error appropriately based on the output format
pub fn render_error(err: CliError, format: OutputFormat) {
    if format == OutputFormat::Json {
        let mut detail = serde_json::json!({
            "code": err.code().map(|code| code.to_string()),
            "message": err.to_string(),
        });
        if let CliError::Rejected(chain_err) = &err
            && let Some(members) = chain_err.cycle_members()
        {
            detail["cycle"] = serde_json::json!(members);
        }

        match serde_json::to_string(&ErrorEnvelope::new(detail)) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err);
        eprintln!("{report:?}");
        // Ensure output is flushed before potential process exit
        let _ = io::stderr().flush();
    }
}

/// Output format for command results
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize, Deserialize, Default)]
#[must_use]
pub enum OutputFormat {
    /// Plain text format
    #[default]
    Text,
    /// JSON envelope
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Json => "json",
        };
        write!(f, "{s}")
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Main CLI entry point for questgraph.
#[derive(Parser, Debug)]
#[command(name = "questgraph")]
#[command(about = "Validate quest chains and resolve their completion order")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: crate::tracing::LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        help = "Log format on stderr",
        default_value = "compact",
        value_enum
    )]
    pub log_format: crate::tracing::TracingFormat,

    /// Emit logs as JSON.
    #[arg(long, global = true, help = "Emit logs as JSON on stderr (same as --log-format json)")]
    pub json: bool,

    /// Result format on stdout.
    #[arg(
        long,
        short = 'o',
        global = true,
        help = "Result format",
        default_value = "text",
        value_enum
    )]
    pub output: OutputFormat,

    /// Resolver configuration file (TOML, or JSON by extension).
    #[arg(long, global = true, help = "Resolver configuration file")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Tracing setup selected by the global logging flags.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: if self.json {
                TracingFormat::Json
            } else {
                self.log_format
            },
            level: self.level.into(),
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a chain definition.
    #[command(about = "Validate a chain definition against the catalog and graph rules")]
    Validate {
        /// Chain definition file.
        file: PathBuf,
        /// Catalog file listing known quest ids.
        #[arg(long, help = "Catalog file listing known quest ids")]
        catalog: Option<PathBuf>,
    },
    /// Print the completion order.
    #[command(about = "Print the deterministic completion order")]
    Order {
        /// Chain definition file.
        file: PathBuf,
        /// Catalog file listing known quest ids.
        #[arg(long, help = "Catalog file listing known quest ids")]
        catalog: Option<PathBuf>,
    },
    /// Print the quests unlocked by a set of completed quests.
    #[command(about = "Print the quests that are eligible next")]
    Next {
        /// Chain definition file.
        file: PathBuf,
        /// Completed quest ids.
        #[arg(
            long,
            short = 'c',
            value_delimiter = ',',
            help = "Completed quest ids (comma-separated)"
        )]
        completed: Vec<String>,
        /// Catalog file listing known quest ids.
        #[arg(long, help = "Catalog file listing known quest ids")]
        catalog: Option<PathBuf>,
    },
    /// Report whether every quest can be completed.
    #[command(about = "Report whether every quest can be completed, showing any blocking cycle")]
    Check {
        /// Chain definition file.
        file: PathBuf,
    },
    /// Print quests grouped by dependency depth.
    #[command(about = "Print quests grouped by dependency depth")]
    Tiers {
        /// Chain definition file.
        file: PathBuf,
        /// Catalog file listing known quest ids.
        #[arg(long, help = "Catalog file listing known quest ids")]
        catalog: Option<PathBuf>,
    },
}

impl Commands {
    /// Convert into an executable command.
    #[must_use]
    pub fn into_command(self) -> Command {
        match self {
            Self::Validate { file, catalog } => Command::Validate { file, catalog },
            Self::Order { file, catalog } => Command::Order { file, catalog },
            Self::Next {
                file,
                completed,
                catalog,
            } => Command::Next {
                file,
                completed: completed
                    .into_iter()
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect(),
                catalog,
            },
            Self::Check { file } => Command::Check { file },
            Self::Tiers { file, catalog } => Command::Tiers { file, catalog },
        }
    }
}

/// Parse command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
