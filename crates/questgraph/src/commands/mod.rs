//! Command implementations.
//!
//! Every command loads a chain definition file, runs it through the chain
//! resolver backed by in-memory adapters and returns an [`Outcome`] for the
//! caller to render.

pub mod chain_file;
pub mod check;
pub mod outcome;
pub mod resolve;

pub use outcome::Outcome;

use crate::cli::CliError;
use questgraph_chains::ResolverConfig;
use std::path::PathBuf;
use tracing::instrument;

/// Internal command representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate a chain file.
    Validate {
        /// Chain definition file.
        file: PathBuf,
        /// Optional catalog file.
        catalog: Option<PathBuf>,
    },
    /// Resolve the completion order.
    Order {
        /// Chain definition file.
        file: PathBuf,
        /// Optional catalog file.
        catalog: Option<PathBuf>,
    },
    /// Compute the eligible frontier.
    Next {
        /// Chain definition file.
        file: PathBuf,
        /// Completed quest ids.
        completed: Vec<String>,
        /// Optional catalog file.
        catalog: Option<PathBuf>,
    },
    /// Report completability of the raw definition.
    Check {
        /// Chain definition file.
        file: PathBuf,
    },
    /// Group quests by dependency depth.
    Tiers {
        /// Chain definition file.
        file: PathBuf,
        /// Optional catalog file.
        catalog: Option<PathBuf>,
    },
}

impl Command {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Validate { .. } => "validate",
            Self::Order { .. } => "order",
            Self::Next { .. } => "next",
            Self::Check { .. } => "check",
            Self::Tiers { .. } => "tiers",
        }
    }
}

/// Execute a command.
///
/// # Errors
///
/// Returns [`CliError::Config`] for unreadable inputs and
/// [`CliError::Rejected`] when the chain fails validation.
#[instrument(skip_all, fields(command = command.name()))]
pub async fn execute(command: Command, config: ResolverConfig) -> Result<Outcome, CliError> {
    match command {
        Command::Validate { file, catalog } => {
            resolve::validate(&file, catalog.as_deref(), config).await
        }
        Command::Order { file, catalog } => resolve::order(&file, catalog.as_deref(), config).await,
        Command::Next {
            file,
            completed,
            catalog,
        } => resolve::next(&file, &completed, catalog.as_deref(), config).await,
        Command::Check { file } => check::check(&file),
        Command::Tiers { file, catalog } => resolve::tiers(&file, catalog.as_deref(), config).await,
    }
}
