//! Quest chain validation and resolution for questgraph.
//!
//! A quest chain is a set of catalog quests joined by prerequisite edges.
//! This crate keeps stored chains valid at all times:
//!
//! - [`validate_chain`] checks a [`ChainDefinition`] against the
//!   [`CatalogLookup`] port and the graph invariants, producing a
//!   [`ValidatedChain`];
//! - [`QuestStore`] persists only validated chains, with optimistic
//!   concurrency on a per-chain version;
//! - [`ChainResolver`] exposes creation, mutation and the order / frontier /
//!   completability queries on top of both ports.
//!
//! # Example
//!
//! ```rust
//! use questgraph_chains::{
//!     ChainDefinition, ChainResolver, InMemoryCatalog, InMemoryQuestStore,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemoryQuestStore::new());
//! let catalog = Arc::new(InMemoryCatalog::with_quests(["intro", "finale"]));
//! let resolver = ChainResolver::new(store, catalog);
//!
//! let chain = resolver
//!     .create_chain(
//!         ChainDefinition::new()
//!             .with_quest("intro", "Introduction")
//!             .with_quest("finale", "Finale")
//!             .with_prerequisite("intro", "finale"),
//!     )
//!     .await
//!     .unwrap();
//!
//! let order = resolver.order(chain.id()).await.unwrap();
//! assert_eq!(order[0].id.as_str(), "intro");
//! # }
//! ```

mod catalog;
mod chain;
mod config;
mod error;
mod locks;
mod resolver;
mod store;
mod validator;

pub use catalog::{CatalogError, CatalogLookup, InMemoryCatalog};
pub use chain::{ChainDefinition, ChainId, QuestChain, ValidatedChain};
pub use config::{ConfigError, MAX_CONFLICT_RETRIES_ENV, ResolverConfig};
pub use error::{Error, Result};
pub use locks::{ChainGuard, ChainLocks};
pub use resolver::ChainResolver;
pub use store::{InMemoryQuestStore, QuestStore, StoreError};
pub use validator::validate_chain;

pub use questgraph_graph::{
    Completability, PrerequisiteEdge, QuestGraph, QuestId, QuestNodeRef, ResolutionOrder, Tiers,
};
