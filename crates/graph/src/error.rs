//! Error types for quest graph operations.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use crate::{PrerequisiteEdge, QuestId, QuestNodeRef};
use miette::Diagnostic;
use thiserror::Error;

/// Result type for quest graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a quest graph.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum Error {
    /// The same quest id was listed twice in one node set.
    #[error("Quest '{id}' appears more than once in the chain")]
    #[diagnostic(
        code(questgraph::graph::duplicate_quest),
        help("Each quest may only be added to a chain once")
    )]
    DuplicateQuest {
        /// The repeated quest id.
        id: QuestId,
    },

    /// An edge endpoint is not part of the node set.
    #[error("Prerequisite '{edge}' references a quest that is not in the chain")]
    #[diagnostic(
        code(questgraph::graph::dangling_reference),
        help("Add both endpoints to the chain before linking them")
    )]
    DanglingReference {
        /// The offending edge.
        edge: PrerequisiteEdge,
    },

    /// The prerequisite edges form a cycle.
    #[error("Prerequisite cycle detected: {}", format_cycle(members))]
    #[diagnostic(
        code(questgraph::graph::cycle),
        help("Quests in a cycle block each other forever; remove one of the listed prerequisites")
    )]
    CycleDetected {
        /// Cycle members in cycle order.
        members: Vec<QuestNodeRef>,
    },

    /// A query named a quest the graph does not contain.
    #[error("Quest '{id}' is not part of this graph")]
    #[diagnostic(code(questgraph::graph::unknown_node))]
    QuestNotInGraph {
        /// The missing quest id.
        id: QuestId,
    },
}

impl Error {
    /// Cycle members when this is a [`Error::CycleDetected`].
    #[must_use]
    pub fn cycle_members(&self) -> Option<&[QuestNodeRef]> {
        match self {
            Self::CycleDetected { members } => Some(members),
            _ => None,
        }
    }
}

/// Render a cycle as `a -> b -> c -> a`.
fn format_cycle(members: &[QuestNodeRef]) -> String {
    let mut parts: Vec<String> = members.iter().map(ToString::to_string).collect();
    if let Some(first) = members.first() {
        parts.push(first.to_string());
    }
    parts.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_closes_the_loop() {
        let err = Error::CycleDetected {
            members: vec![
                QuestNodeRef::new("a", "Find the map"),
                QuestNodeRef::new("b", "Cross the river"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Prerequisite cycle detected: Find the map -> Cross the river -> Find the map"
        );
        assert_eq!(err.cycle_members().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_dangling_reference_names_edge() {
        let err = Error::DanglingReference {
            edge: PrerequisiteEdge::new("a", "c"),
        };
        assert!(err.to_string().contains("a -> c"));
        assert!(err.cycle_members().is_none());
    }
}
