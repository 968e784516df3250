//! Full-chain validation against the catalog and the graph invariants.

use crate::{CatalogLookup, ChainDefinition, Error, Result, ValidatedChain};
use futures::future::try_join_all;
use questgraph_graph::PrerequisiteEdge;
use std::collections::HashSet;
use tracing::debug;

/// Validate a chain definition.
///
/// Checks run in a fixed order and the first failure wins:
///
/// 1. every quest exists in the catalog ([`Error::UnknownQuest`]);
/// 2. quest ids are unique and every edge stays inside the chain
///    (duplicate quest / dangling reference graph errors);
/// 3. the prerequisites are acyclic (cycle graph error with members).
///
/// Catalog lookups are issued concurrently; the first missing quest in
/// insertion order is the one reported. Repeated edges are dropped from the
/// validated chain.
///
/// # Errors
///
/// Returns the first failed check. Catalog backend failures surface as
/// [`Error::CatalogUnavailable`].
pub async fn validate_chain(
    definition: ChainDefinition,
    catalog: &dyn CatalogLookup,
) -> Result<ValidatedChain> {
    let lookups = definition.nodes.iter().map(|node| catalog.exists(&node.id));
    let found = try_join_all(lookups).await?;

    if let Some((node, _)) = definition
        .nodes
        .iter()
        .zip(&found)
        .find(|(_, exists)| !**exists)
    {
        return Err(Error::UnknownQuest {
            id: node.id.clone(),
        });
    }

    let graph = definition.graph()?;
    graph.check_acyclic()?;

    debug!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        "Chain definition validated"
    );
    Ok(ValidatedChain::new(dedup_edges(definition)))
}

fn dedup_edges(mut definition: ChainDefinition) -> ChainDefinition {
    let mut seen: HashSet<PrerequisiteEdge> = HashSet::new();
    definition.edges.retain(|edge| seen.insert(edge.clone()));
    definition
}
