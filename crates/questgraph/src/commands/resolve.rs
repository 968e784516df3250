//! Commands that run a chain through the resolver.

use super::Outcome;
use super::chain_file::{catalog_for, load_definition};
use crate::cli::CliError;
use questgraph_chains::{
    ChainResolver, InMemoryQuestStore, QuestChain, QuestId, ResolverConfig,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// A chain file loaded into a fresh resolver.
struct Session {
    resolver: ChainResolver,
    chain: Arc<QuestChain>,
}

async fn open(
    file: &Path,
    catalog: Option<&Path>,
    config: ResolverConfig,
) -> Result<Session, CliError> {
    let definition = load_definition(file)?;
    let catalog = catalog_for(&definition, catalog)?;
    let resolver = ChainResolver::with_config(
        Arc::new(InMemoryQuestStore::new()),
        Arc::new(catalog),
        config,
    );
    let chain = resolver.create_chain(definition).await?;
    Ok(Session { resolver, chain })
}

/// Validate a chain file.
///
/// # Errors
///
/// Returns the validation failure as [`CliError::Rejected`].
pub async fn validate(
    file: &Path,
    catalog: Option<&Path>,
    config: ResolverConfig,
) -> Result<Outcome, CliError> {
    let Session { chain, .. } = open(file, catalog, config).await?;
    Ok(Outcome::Valid {
        chain: chain.id().clone(),
        quests: chain.nodes().len(),
        prerequisites: chain.edges().len(),
    })
}

/// Resolve the completion order of a chain file.
///
/// # Errors
///
/// Returns the validation failure as [`CliError::Rejected`].
pub async fn order(
    file: &Path,
    catalog: Option<&Path>,
    config: ResolverConfig,
) -> Result<Outcome, CliError> {
    let session = open(file, catalog, config).await?;
    let order = session.resolver.order(session.chain.id()).await?;
    Ok(Outcome::Order { order })
}

/// Quests eligible once `completed` are done.
///
/// # Errors
///
/// Returns the validation failure as [`CliError::Rejected`].
pub async fn next(
    file: &Path,
    completed: &[String],
    catalog: Option<&Path>,
    config: ResolverConfig,
) -> Result<Outcome, CliError> {
    let session = open(file, catalog, config).await?;
    let completed: HashSet<QuestId> = completed.iter().map(QuestId::new).collect();

    for id in &completed {
        if !session.chain.definition().contains_quest(id) {
            warn!(quest = %id, "Completed quest is not part of the chain; ignoring");
        }
    }

    let eligible = session
        .resolver
        .next_eligible(session.chain.id(), &completed)
        .await?;
    Ok(Outcome::Next { eligible })
}

/// Dependency tiers of a chain file.
///
/// # Errors
///
/// Returns the validation failure as [`CliError::Rejected`].
pub async fn tiers(
    file: &Path,
    catalog: Option<&Path>,
    config: ResolverConfig,
) -> Result<Outcome, CliError> {
    let session = open(file, catalog, config).await?;
    let tiers = session.resolver.tiers(session.chain.id()).await?;
    Ok(Outcome::Tiers { tiers })
}
