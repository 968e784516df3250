//! Ordering and eligibility queries over quest graphs.

use crate::{Error, QuestGraph, QuestId, QuestNodeRef, Result};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// Quests in an order where every prerequisite precedes its dependents.
pub type ResolutionOrder = Vec<QuestNodeRef>;

/// Quests grouped by dependency depth.
///
/// Tier 0 holds the roots; every quest sits one tier after its deepest
/// prerequisite, so all quests within a tier are independent of each other.
pub type Tiers = Vec<Vec<QuestNodeRef>>;

impl QuestGraph {
    /// Get the quests in completion order.
    ///
    /// Kahn's algorithm. Whenever several quests are eligible at once, the
    /// one inserted earliest into the chain is emitted first, so the result
    /// is identical across runs for the same chain definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] if the graph contains cycles.
    pub fn topological_order(&self) -> Result<ResolutionOrder> {
        Ok(self
            .sorted_indices()?
            .into_iter()
            .map(|idx| self.nodes[idx].clone())
            .collect())
    }

    /// Group quests into dependency tiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] if the graph contains cycles.
    pub fn tiers(&self) -> Result<Tiers> {
        let sorted = self.sorted_indices()?;
        let mut depth = vec![0_usize; self.nodes.len()];
        let mut tiers: Vec<Vec<usize>> = Vec::new();

        for &idx in &sorted {
            let level = self.prerequisites[idx]
                .iter()
                .map(|&p| depth[p] + 1)
                .max()
                .unwrap_or(0);
            depth[idx] = level;
            if level >= tiers.len() {
                tiers.resize(level + 1, Vec::new());
            }
            tiers[level].push(idx);
        }

        Ok(tiers
            .into_iter()
            .map(|mut tier| {
                tier.sort_unstable();
                tier.into_iter().map(|idx| self.nodes[idx].clone()).collect()
            })
            .collect())
    }

    /// Quests the player can start next.
    ///
    /// A quest is in the frontier when it is not completed and every one of
    /// its prerequisites is. Ids in `completed` that are not part of the graph
    /// are ignored. The result is in insertion order.
    #[must_use]
    pub fn frontier(&self, completed: &HashSet<QuestId>) -> Vec<QuestNodeRef> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(idx, node)| {
                !completed.contains(&node.id)
                    && self.prerequisites[*idx]
                        .iter()
                        .all(|&p| completed.contains(&self.nodes[p].id))
            })
            .map(|(_, node)| node.clone())
            .collect()
    }

    /// Node indices in Kahn order with insertion-order tie-breaking.
    fn sorted_indices(&self) -> Result<Vec<usize>> {
        let mut remaining = self.in_degree.clone();
        let mut ready: BinaryHeap<Reverse<usize>> = remaining
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();
        let mut sorted = Vec::with_capacity(self.nodes.len());

        while let Some(Reverse(idx)) = ready.pop() {
            sorted.push(idx);
            for &next in &self.dependents[idx] {
                remaining[next] -= 1;
                if remaining[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if sorted.len() == self.nodes.len() {
            return Ok(sorted);
        }

        // Kahn stalls exactly when a cycle exists
        let members = self
            .find_cycle()
            .unwrap_or_else(|| unsorted_remainder(&self.nodes, &sorted));
        Err(Error::CycleDetected { members })
    }
}

/// Nodes Kahn's algorithm never emitted.
fn unsorted_remainder(nodes: &[QuestNodeRef], sorted: &[usize]) -> Vec<QuestNodeRef> {
    let emitted: HashSet<usize> = sorted.iter().copied().collect();
    nodes
        .iter()
        .enumerate()
        .filter(|(idx, _)| !emitted.contains(idx))
        .map(|(_, node)| node.clone())
        .collect()
}
