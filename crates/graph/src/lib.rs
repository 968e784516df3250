//! Quest prerequisite graph algorithms for questgraph.
//!
//! A [`QuestGraph`] is an immutable, index-based adjacency snapshot of one
//! quest chain. Edges mean "is a prerequisite of". The graph answers the
//! structural questions the chain resolver needs: is there a cycle, in which
//! order can the quests be completed, and which quests are unlocked for a
//! given set of completed ones.
//!
//! Node insertion order is significant: it is the tie-break for every
//! ordering the graph produces, so results are reproducible for the same
//! chain definition.
//!
//! # Example
//!
//! ```
//! use questgraph_graph::{PrerequisiteEdge, QuestGraph, QuestId, QuestNodeRef};
//! use std::collections::HashSet;
//!
//! let graph = QuestGraph::build(
//!     [
//!         QuestNodeRef::new("a", "Arrive"),
//!         QuestNodeRef::new("b", "Bargain"),
//!         QuestNodeRef::new("c", "Conquer"),
//!     ],
//!     [PrerequisiteEdge::new("a", "b"), PrerequisiteEdge::new("b", "c")],
//! )?;
//!
//! let order: Vec<_> = graph
//!     .topological_order()?
//!     .into_iter()
//!     .map(|node| node.id.to_string())
//!     .collect();
//! assert_eq!(order, ["a", "b", "c"]);
//!
//! let completed = HashSet::from([QuestId::from("a")]);
//! assert_eq!(graph.frontier(&completed)[0].id.as_str(), "b");
//! # Ok::<(), questgraph_graph::Error>(())
//! ```

mod error;
mod graph;
mod model;
mod traversal;
mod validation;

pub use error::{Error, Result};
pub use graph::QuestGraph;
pub use model::{PrerequisiteEdge, QuestId, QuestNodeRef};
pub use traversal::{ResolutionOrder, Tiers};
pub use validation::Completability;
