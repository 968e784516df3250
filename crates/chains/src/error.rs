//! Error types for chain validation and resolution.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use crate::{CatalogError, ChainId, StoreError};
use miette::Diagnostic;
use questgraph_graph::{PrerequisiteEdge, QuestId, QuestNodeRef};
use thiserror::Error;

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by chain validation and the resolver.
///
/// Every failure is a rejected operation: nothing has been written when one
/// of these is returned.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A quest referenced by the chain does not exist in the catalog.
    #[error("Quest '{id}' does not exist in the catalog")]
    #[diagnostic(
        code(questgraph::chains::unknown_quest),
        help("Create the quest in the catalog first, or fix the id")
    )]
    UnknownQuest {
        /// The unknown quest id.
        id: QuestId,
    },

    /// Structural failure: dangling reference, cycle or duplicate quest.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] questgraph_graph::Error),

    /// The chain kept changing underneath the resolver.
    #[error("Chain '{chain}' was modified concurrently; gave up after {attempts} attempts")]
    #[diagnostic(
        code(questgraph::chains::conflict),
        help("Another writer is editing this chain; retry the operation")
    )]
    Conflict {
        /// The contended chain.
        chain: ChainId,
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// No chain is stored under the id.
    #[error("Chain '{chain}' not found")]
    #[diagnostic(code(questgraph::chains::not_found))]
    NotFound {
        /// The requested chain.
        chain: ChainId,
    },

    /// A removal named a quest the chain does not contain.
    #[error("Quest '{id}' is not part of chain '{chain}'")]
    #[diagnostic(code(questgraph::chains::quest_not_in_chain))]
    QuestNotInChain {
        /// The chain.
        chain: ChainId,
        /// The missing quest.
        id: QuestId,
    },

    /// A removal named an edge the chain does not contain.
    #[error("Prerequisite '{edge}' is not part of chain '{chain}'")]
    #[diagnostic(code(questgraph::chains::edge_not_in_chain))]
    EdgeNotInChain {
        /// The chain.
        chain: ChainId,
        /// The missing edge.
        edge: PrerequisiteEdge,
    },

    /// The catalog backend failed.
    #[error("Quest catalog unavailable: {message}")]
    #[diagnostic(code(questgraph::chains::catalog_unavailable))]
    CatalogUnavailable {
        /// Backend failure description.
        message: String,
    },

    /// The store backend failed.
    #[error("Quest store unavailable: {message}")]
    #[diagnostic(code(questgraph::chains::store_unavailable))]
    StoreUnavailable {
        /// Backend failure description.
        message: String,
    },
}

impl Error {
    /// Whether a prerequisite cycle was the reason for rejection.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.cycle_members().is_some()
    }

    /// Cycle members, in order, when rejected for a cycle.
    #[must_use]
    pub fn cycle_members(&self) -> Option<&[QuestNodeRef]> {
        match self {
            Self::Graph(err) => err.cycle_members(),
            _ => None,
        }
    }

    /// Whether an edge pointed outside the chain's quests.
    #[must_use]
    pub fn is_dangling_reference(&self) -> bool {
        matches!(
            self,
            Self::Graph(questgraph_graph::Error::DanglingReference { .. })
        )
    }

    /// Whether a quest was missing from the catalog.
    #[must_use]
    pub fn is_unknown_quest(&self) -> bool {
        matches!(self, Self::UnknownQuest { .. })
    }

    /// Whether optimistic concurrency retries were exhausted.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether the chain does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unavailable { message } => Self::CatalogUnavailable { message },
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { chain } => Self::NotFound { chain },
            StoreError::Conflict { chain, .. } => Self::Conflict { chain, attempts: 1 },
            StoreError::Unavailable { message } => Self::StoreUnavailable { message },
        }
    }
}
