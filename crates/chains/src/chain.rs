//! Chain identifiers, definitions and stored snapshots.

use questgraph_graph::{PrerequisiteEdge, QuestGraph, QuestId, QuestNodeRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a stored chain. Minted by the [`crate::QuestStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChainId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An unvalidated set of quests and prerequisites.
///
/// This is what callers submit and what mutations are applied to before the
/// result is validated. It carries no invariant of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefinition {
    /// Quests in insertion order.
    #[serde(rename = "quests", default)]
    pub nodes: Vec<QuestNodeRef>,
    /// Prerequisite edges.
    #[serde(rename = "prerequisites", default)]
    pub edges: Vec<PrerequisiteEdge>,
}

impl ChainDefinition {
    /// Create an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a quest.
    #[must_use]
    pub fn with_quest(mut self, id: impl Into<QuestId>, label: impl Into<String>) -> Self {
        self.nodes.push(QuestNodeRef::new(id, label));
        self
    }

    /// Append a prerequisite edge.
    #[must_use]
    pub fn with_prerequisite(mut self, from: impl Into<QuestId>, to: impl Into<QuestId>) -> Self {
        self.edges.push(PrerequisiteEdge::new(from, to));
        self
    }

    /// Check if a quest is part of the definition.
    #[must_use]
    pub fn contains_quest(&self, id: &QuestId) -> bool {
        self.nodes.iter().any(|node| &node.id == id)
    }

    /// Check if an edge is part of the definition.
    #[must_use]
    pub fn contains_edge(&self, edge: &PrerequisiteEdge) -> bool {
        self.edges.contains(edge)
    }

    /// Build the graph for this definition.
    ///
    /// # Errors
    ///
    /// Returns a graph error for duplicate quests or dangling edges.
    pub fn graph(&self) -> questgraph_graph::Result<QuestGraph> {
        QuestGraph::build(self.nodes.iter().cloned(), self.edges.iter().cloned())
    }
}

/// A definition that passed validation against the catalog and the graph
/// checks. Only [`crate::validate_chain`] produces one, and it is the only
/// thing a [`crate::QuestStore`] accepts for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChain {
    definition: ChainDefinition,
}

impl ValidatedChain {
    pub(crate) fn new(definition: ChainDefinition) -> Self {
        Self { definition }
    }

    /// The validated definition.
    #[must_use]
    pub fn definition(&self) -> &ChainDefinition {
        &self.definition
    }

    /// Turn into a stored snapshot. Called by store implementations when
    /// they commit the chain under `id` at `version`.
    #[must_use]
    pub fn into_snapshot(self, id: ChainId, version: u64) -> QuestChain {
        QuestChain {
            id,
            version,
            definition: self.definition,
        }
    }
}

/// Immutable stored snapshot of a chain.
///
/// Snapshots written through the resolver have always been validated.
/// Readers still re-check structure on every query, since a store may be
/// changed out-of-band and rehydrated with [`QuestChain::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestChain {
    id: ChainId,
    version: u64,
    #[serde(flatten)]
    definition: ChainDefinition,
}

impl QuestChain {
    /// Rehydrate a snapshot loaded from persistent storage. No validation.
    #[must_use]
    pub fn from_parts(id: ChainId, version: u64, definition: ChainDefinition) -> Self {
        Self {
            id,
            version,
            definition,
        }
    }

    /// Chain identifier.
    #[must_use]
    pub fn id(&self) -> &ChainId {
        &self.id
    }

    /// Store version this snapshot was committed at.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Quests in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[QuestNodeRef] {
        &self.definition.nodes
    }

    /// Prerequisite edges.
    #[must_use]
    pub fn edges(&self) -> &[PrerequisiteEdge] {
        &self.definition.edges
    }

    /// The definition behind this snapshot.
    #[must_use]
    pub fn definition(&self) -> &ChainDefinition {
        &self.definition
    }

    /// Build the graph for this snapshot.
    ///
    /// # Errors
    ///
    /// Returns a graph error if the stored data is structurally broken.
    pub fn graph(&self) -> questgraph_graph::Result<QuestGraph> {
        self.definition.graph()
    }
}
