//! Cycle detection for quest graphs.
//!
//! A depth-first traversal with three-state coloring. A back-edge into a node
//! that is still in progress closes a cycle; the cycle is read straight off
//! the traversal stack so callers get its members in order, not just a flag.

use crate::{Error, QuestGraph, QuestNodeRef, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Whether every quest of a chain can eventually be completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Completability {
    /// No prerequisite cycle: some play order completes everything.
    Completable,
    /// The listed quests block each other and can never be completed.
    Blocked {
        /// Cycle members in cycle order.
        cycle: Vec<QuestNodeRef>,
    },
}

impl Completability {
    /// The boolean verdict.
    #[must_use]
    pub fn is_completable(&self) -> bool {
        matches!(self, Self::Completable)
    }

    /// The blocking cycle, if any.
    #[must_use]
    pub fn blocking_cycle(&self) -> Option<&[QuestNodeRef]> {
        match self {
            Self::Completable => None,
            Self::Blocked { cycle } => Some(cycle),
        }
    }
}

impl QuestGraph {
    /// Find a prerequisite cycle.
    ///
    /// Traversal starts from nodes in insertion order and follows edges in
    /// the order they were added, so the reported cycle is stable for a given
    /// chain definition. Each node is finished at most once: O(V+E).
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<QuestNodeRef>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        // (node, position of the next outgoing edge to explore)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            marks[start] = Mark::InProgress;
            stack.push((start, 0));

            while let Some(frame) = stack.last_mut() {
                let (node, cursor) = *frame;
                let Some(&next) = self.dependents[node].get(cursor) else {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                match marks[next] {
                    Mark::Unvisited => {
                        marks[next] = Mark::InProgress;
                        stack.push((next, 0));
                    }
                    Mark::InProgress => {
                        let from = stack.iter().position(|&(n, _)| n == next).unwrap_or(0);
                        return Some(
                            stack[from..]
                                .iter()
                                .map(|&(n, _)| self.nodes[n].clone())
                                .collect(),
                        );
                    }
                    Mark::Done => {}
                }
            }
        }

        None
    }

    /// Check if the graph has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Fail with the cycle members if the graph is not acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] listing the cycle in order.
    pub fn check_acyclic(&self) -> Result<()> {
        match self.find_cycle() {
            Some(members) => Err(Error::CycleDetected { members }),
            None => Ok(()),
        }
    }

    /// Whether the chain can be fully completed in some order.
    ///
    /// A chain is completable exactly when it is acyclic.
    #[must_use]
    pub fn completability(&self) -> Completability {
        match self.find_cycle() {
            Some(cycle) => Completability::Blocked { cycle },
            None => Completability::Completable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrerequisiteEdge;

    fn graph(ids: &[&str], pairs: &[(&str, &str)]) -> QuestGraph {
        QuestGraph::build(
            ids.iter().map(|id| QuestNodeRef::unlabeled(*id)),
            pairs.iter().map(|(f, t)| PrerequisiteEdge::new(*f, *t)),
        )
        .unwrap()
    }

    fn cycle_ids(graph: &QuestGraph) -> Option<Vec<String>> {
        graph
            .find_cycle()
            .map(|members| members.into_iter().map(|n| n.id.to_string()).collect())
    }

    #[test]
    fn test_acyclic_chain() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert!(!g.has_cycles());
        assert!(g.check_acyclic().is_ok());
        assert_eq!(g.completability(), Completability::Completable);
    }

    #[test]
    fn test_three_node_cycle_in_order() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(
            cycle_ids(&g),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_cycle_excludes_lead_in_path() {
        // s -> a -> b -> c -> a: s is on the stack but not in the cycle
        let g = graph(
            &["s", "a", "b", "c"],
            &[("s", "a"), ("a", "b"), ("b", "c"), ("c", "a")],
        );
        assert_eq!(
            cycle_ids(&g),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_self_loop() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "b")]);
        assert_eq!(cycle_ids(&g), Some(vec!["b".to_string()]));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        // Cross edges into finished nodes must not be reported
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        assert!(g.find_cycle().is_none());
    }

    #[test]
    fn test_check_acyclic_error_carries_members() {
        let g = graph(&["x", "y"], &[("x", "y"), ("y", "x")]);
        let err = g.check_acyclic().unwrap_err();
        let members: Vec<&str> = err
            .cycle_members()
            .unwrap()
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(members, vec!["x", "y"]);
    }

    #[test]
    fn test_blocked_completability() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a")]);
        let verdict = g.completability();
        assert!(!verdict.is_completable());
        assert_eq!(verdict.blocking_cycle().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let ids: Vec<String> = (0..50_000).map(|i| format!("q{i}")).collect();
        let g = QuestGraph::build(
            ids.iter().map(|id| QuestNodeRef::unlabeled(id.as_str())),
            ids.windows(2)
                .map(|w| PrerequisiteEdge::new(w[0].as_str(), w[1].as_str())),
        )
        .unwrap();
        assert!(!g.has_cycles());
    }
}
