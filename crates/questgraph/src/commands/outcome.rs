//! Command results and their text rendering.

use crate::cli::{EXIT_OK, EXIT_REJECTED};
use questgraph_chains::{ChainId, Completability, QuestNodeRef};
use serde::Serialize;
use std::fmt;

/// Result of a successful command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    /// The chain passed validation.
    Valid {
        /// Id the in-memory store assigned.
        chain: ChainId,
        /// Number of quests.
        quests: usize,
        /// Number of distinct prerequisite edges.
        prerequisites: usize,
    },
    /// Completion order.
    Order {
        /// Quests in completion order.
        order: Vec<QuestNodeRef>,
    },
    /// Quests eligible next.
    Next {
        /// Eligible quests in insertion order.
        eligible: Vec<QuestNodeRef>,
    },
    /// Completability verdict.
    Check {
        /// The verdict, with the blocking cycle if any.
        completability: Completability,
    },
    /// Dependency tiers.
    Tiers {
        /// Quests grouped by depth.
        tiers: Vec<Vec<QuestNodeRef>>,
    },
}

impl Outcome {
    /// Process exit code for this result.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Check { completability } if !completability.is_completable() => EXIT_REJECTED,
            _ => EXIT_OK,
        }
    }
}

struct Listed<'a>(&'a QuestNodeRef);

impl fmt::Display for Listed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0;
        if node.label.is_empty() || node.label == node.id.as_str() {
            write!(f, "{}", node.id)
        } else {
            write!(f, "{} ({})", node.id, node.label)
        }
    }
}

fn join_ids(nodes: &[QuestNodeRef], sep: &str) -> String {
    nodes
        .iter()
        .map(|n| n.id.as_str())
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid {
                chain,
                quests,
                prerequisites,
            } => write!(
                f,
                "valid: {chain} ({quests} quests, {prerequisites} prerequisites)"
            ),
            Self::Order { order } => {
                for (position, node) in order.iter().enumerate() {
                    writeln!(f, "{}. {}", position + 1, Listed(node))?;
                }
                Ok(())
            }
            Self::Next { eligible } if eligible.is_empty() => write!(f, "no eligible quests"),
            Self::Next { eligible } => {
                for node in eligible {
                    writeln!(f, "{}", Listed(node))?;
                }
                Ok(())
            }
            Self::Check { completability } => match completability.blocking_cycle() {
                None => write!(f, "completable"),
                Some(cycle) => {
                    let first = cycle.first().map_or("", |n| n.id.as_str());
                    write!(f, "blocked by cycle: {} -> {first}", join_ids(cycle, " -> "))
                }
            },
            Self::Tiers { tiers } => {
                for (depth, tier) in tiers.iter().enumerate() {
                    writeln!(f, "tier {depth}: {}", join_ids(tier, ", "))?;
                }
                Ok(())
            }
        }
    }
}
