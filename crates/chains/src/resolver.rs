//! Chain resolver: the caller-facing operations over stored chains.
//!
//! Mutations follow copy-validate-swap. The current snapshot is fetched, the
//! change is applied to a copy of its definition, the copy is validated in
//! full and then written with the snapshot's version as the expectation. If
//! another writer got there first the whole sequence is repeated, a bounded
//! number of times.
//!
//! Reads never take a lock. They rebuild the graph from a snapshot and run
//! the structural checks again before answering.

use crate::{
    CatalogLookup, ChainDefinition, ChainId, ChainLocks, Error, QuestChain, QuestStore,
    ResolverConfig, Result, StoreError, validate_chain,
};
use questgraph_graph::{
    Completability, PrerequisiteEdge, QuestGraph, QuestId, QuestNodeRef, ResolutionOrder, Tiers,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Validating front door to a [`QuestStore`].
pub struct ChainResolver {
    store: Arc<dyn QuestStore>,
    catalog: Arc<dyn CatalogLookup>,
    locks: ChainLocks,
    config: ResolverConfig,
}

impl std::fmt::Debug for ChainResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainResolver")
            .field("locks", &self.locks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChainResolver {
    /// Create a resolver with the default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn QuestStore>, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self::with_config(store, catalog, ResolverConfig::default())
    }

    /// Create a resolver with an explicit configuration.
    #[must_use]
    pub fn with_config(
        store: Arc<dyn QuestStore>,
        catalog: Arc<dyn CatalogLookup>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            locks: ChainLocks::new(),
            config,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Validate a new chain and persist it under a store-minted id.
    ///
    /// # Errors
    ///
    /// Any validation error; nothing is written in that case. Store failures
    /// and repeated id collisions are reported as well.
    #[instrument(
        skip(self, definition),
        fields(nodes = definition.nodes.len(), edges = definition.edges.len())
    )]
    pub async fn create_chain(&self, definition: ChainDefinition) -> Result<Arc<QuestChain>> {
        let validated = validate_chain(definition, self.catalog.as_ref())
            .await
            .inspect_err(|err| warn!(error = %err, "Rejected new chain"))?;

        let attempts = self.config.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let id = self.store.allocate_id().await?;
            match self.store.put(&id, validated.clone(), None).await {
                Ok(stored) => {
                    info!(chain = %id, version = stored.version(), "Created chain");
                    return Ok(stored);
                }
                Err(StoreError::Conflict { .. }) if attempt < attempts => {
                    warn!(chain = %id, attempt, "Allocated chain id already taken");
                }
                Err(StoreError::Conflict { .. }) => {
                    return Err(Error::Conflict {
                        chain: id,
                        attempts,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Add a quest to a chain.
    ///
    /// # Errors
    ///
    /// Fails with a duplicate quest error if the id is already in the chain,
    /// or with [`Error::UnknownQuest`] if the catalog does not know it.
    #[instrument(skip(self, node), fields(chain = %id, quest = %node.id))]
    pub async fn add_node(&self, id: &ChainId, node: QuestNodeRef) -> Result<Arc<QuestChain>> {
        self.mutate(id, "add_node", |base| {
            if base.definition().contains_quest(&node.id) {
                return Err(questgraph_graph::Error::DuplicateQuest {
                    id: node.id.clone(),
                }
                .into());
            }
            let mut next = base.definition().clone();
            next.nodes.push(node.clone());
            Ok(Some(next))
        })
        .await
    }

    /// Add a prerequisite edge. Adding an edge that already exists returns
    /// the stored snapshot without writing.
    ///
    /// # Errors
    ///
    /// Fails with a dangling reference if an endpoint is not in the chain,
    /// or with a cycle error if the edge would close a loop.
    #[instrument(skip(self, edge), fields(chain = %id, edge = %edge))]
    pub async fn add_edge(&self, id: &ChainId, edge: PrerequisiteEdge) -> Result<Arc<QuestChain>> {
        self.mutate(id, "add_edge", |base| {
            if base.definition().contains_edge(&edge) {
                debug!("Prerequisite already present");
                return Ok(None);
            }
            let mut next = base.definition().clone();
            next.edges.push(edge.clone());
            Ok(Some(next))
        })
        .await
    }

    /// Remove a quest together with every edge touching it.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::QuestNotInChain`] if the quest is absent.
    #[instrument(skip(self), fields(chain = %id, quest = %quest))]
    pub async fn remove_node(&self, id: &ChainId, quest: &QuestId) -> Result<Arc<QuestChain>> {
        self.mutate(id, "remove_node", |base| {
            if !base.definition().contains_quest(quest) {
                return Err(Error::QuestNotInChain {
                    chain: id.clone(),
                    id: quest.clone(),
                });
            }
            let mut next = base.definition().clone();
            next.nodes.retain(|node| &node.id != quest);
            next.edges.retain(|edge| !edge.touches(quest));
            Ok(Some(next))
        })
        .await
    }

    /// Remove a prerequisite edge.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EdgeNotInChain`] if the edge is absent.
    #[instrument(skip(self, edge), fields(chain = %id, edge = %edge))]
    pub async fn remove_edge(
        &self,
        id: &ChainId,
        edge: &PrerequisiteEdge,
    ) -> Result<Arc<QuestChain>> {
        self.mutate(id, "remove_edge", |base| {
            if !base.definition().contains_edge(edge) {
                return Err(Error::EdgeNotInChain {
                    chain: id.clone(),
                    edge: edge.clone(),
                });
            }
            let mut next = base.definition().clone();
            next.edges.retain(|existing| existing != edge);
            Ok(Some(next))
        })
        .await
    }

    /// The current snapshot of a chain.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] for unknown chains.
    #[instrument(skip(self), fields(chain = %id))]
    pub async fn get(&self, id: &ChainId) -> Result<Arc<QuestChain>> {
        Ok(self.store.get(id).await?)
    }

    /// Deterministic completion order of a chain.
    ///
    /// # Errors
    ///
    /// Fails if the chain is missing or its stored structure is broken.
    #[instrument(skip(self), fields(chain = %id))]
    pub async fn order(&self, id: &ChainId) -> Result<ResolutionOrder> {
        let graph = self.checked_graph(id).await?;
        Ok(graph.topological_order()?)
    }

    /// Quests that become available once `completed` are done.
    ///
    /// Ids in `completed` that are not part of the chain are ignored. A stored
    /// chain that picked up a cycle out-of-band still answers: quests on the
    /// cycle never become eligible, everything else does as usual.
    ///
    /// # Errors
    ///
    /// Fails if the chain is missing or has dangling references.
    #[instrument(skip(self, completed), fields(chain = %id, completed = completed.len()))]
    pub async fn next_eligible(
        &self,
        id: &ChainId,
        completed: &HashSet<QuestId>,
    ) -> Result<Vec<QuestNodeRef>> {
        let chain = self.store.get(id).await?;
        Ok(chain.graph()?.frontier(completed))
    }

    /// Whether every quest of the chain can eventually be completed.
    ///
    /// A stored chain that picked up a cycle out-of-band is reported as
    /// blocked rather than failing.
    ///
    /// # Errors
    ///
    /// Fails if the chain is missing or has dangling references.
    #[instrument(skip(self), fields(chain = %id))]
    pub async fn is_completable(&self, id: &ChainId) -> Result<Completability> {
        let chain = self.store.get(id).await?;
        let completability = chain.graph()?.completability();
        if let Some(cycle) = completability.blocking_cycle() {
            warn!(members = cycle.len(), "Stored chain contains a cycle");
        }
        Ok(completability)
    }

    /// Quests grouped by dependency depth.
    ///
    /// # Errors
    ///
    /// Fails if the chain is missing or its stored structure is broken.
    #[instrument(skip(self), fields(chain = %id))]
    pub async fn tiers(&self, id: &ChainId) -> Result<Tiers> {
        let graph = self.checked_graph(id).await?;
        Ok(graph.tiers()?)
    }

    /// Every quest that must be completed before `quest`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::QuestNotInChain`] if the quest is absent.
    #[instrument(skip(self), fields(chain = %id, quest = %quest))]
    pub async fn prerequisites_of(
        &self,
        id: &ChainId,
        quest: &QuestId,
    ) -> Result<Vec<QuestNodeRef>> {
        let graph = self.checked_graph(id).await?;
        if !graph.contains(quest) {
            return Err(Error::QuestNotInChain {
                chain: id.clone(),
                id: quest.clone(),
            });
        }
        Ok(graph.prerequisites_of(quest)?)
    }

    async fn checked_graph(&self, id: &ChainId) -> Result<QuestGraph> {
        let chain = self.store.get(id).await?;
        let graph = chain.graph()?;
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// Run one mutation under the chain's lock.
    ///
    /// `apply` derives the next definition from the current snapshot, or
    /// `None` when there is nothing to write. It is called again for every
    /// retry after a conflict.
    async fn mutate<F>(
        &self,
        id: &ChainId,
        operation: &'static str,
        apply: F,
    ) -> Result<Arc<QuestChain>>
    where
        F: Fn(&QuestChain) -> Result<Option<ChainDefinition>> + Send + Sync,
    {
        let _guard = self.locks.acquire(id).await;
        let attempts = self.config.max_attempts();

        for attempt in 1..=attempts {
            let base = self.store.get(id).await?;

            let next = match apply(&base) {
                Ok(Some(next)) => next,
                Ok(None) => return Ok(base),
                Err(err) => {
                    warn!(operation, error = %err, "Rejected mutation");
                    return Err(err);
                }
            };

            let validated = match validate_chain(next, self.catalog.as_ref()).await {
                Ok(validated) => validated,
                Err(err) => {
                    warn!(operation, error = %err, "Rejected mutation");
                    return Err(err);
                }
            };

            match self.store.put(id, validated, Some(base.version())).await {
                Ok(stored) => {
                    info!(
                        operation,
                        version = stored.version(),
                        nodes = stored.nodes().len(),
                        edges = stored.edges().len(),
                        "Committed mutation"
                    );
                    return Ok(stored);
                }
                Err(StoreError::Conflict {
                    expected, actual, ..
                }) => {
                    warn!(
                        operation,
                        attempt,
                        ?expected,
                        ?actual,
                        "Chain changed concurrently, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(Error::Conflict {
            chain: id.clone(),
            attempts,
        })
    }
}
