//! Completability check on a raw chain definition.
//!
//! Unlike the resolver commands this does not reject cyclic chains up
//! front: it builds the graph directly and reports the blocking cycle.

use super::Outcome;
use super::chain_file::load_definition;
use crate::cli::CliError;
use std::path::Path;
use tracing::info;

/// Report whether every quest in `file` can be completed.
///
/// # Errors
///
/// Returns [`CliError::Config`] for unreadable files and
/// [`CliError::Rejected`] for duplicate quests or dangling references.
pub fn check(file: &Path) -> Result<Outcome, CliError> {
    let definition = load_definition(file)?;
    let completability = definition.graph()?.completability();
    info!(
        completable = completability.is_completable(),
        "Checked chain definition"
    );
    Ok(Outcome::Check { completability })
}
