//! Quest graph construction and structural lookups.
//!
//! The graph is stored as dense indices: a node's index is its insertion
//! position, which doubles as the deterministic tie-break key for every
//! ordering produced in [`crate::traversal`].

use crate::{Error, PrerequisiteEdge, QuestId, QuestNodeRef, Result};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Immutable adjacency snapshot of one quest chain.
#[derive(Debug, Clone, Default)]
pub struct QuestGraph {
    /// Nodes in insertion order.
    pub(crate) nodes: Vec<QuestNodeRef>,
    /// Map from quest id to node index.
    pub(crate) index: HashMap<QuestId, usize>,
    /// Forward edges: quests unlocked by each node, in edge order.
    pub(crate) dependents: Vec<Vec<usize>>,
    /// Reverse edges: direct prerequisites of each node.
    pub(crate) prerequisites: Vec<Vec<usize>>,
    /// Number of distinct incoming edges per node.
    pub(crate) in_degree: Vec<usize>,
    edge_count: usize,
}

impl QuestGraph {
    /// Build a graph from a node set and prerequisite edges.
    ///
    /// Repeated edges collapse into one.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateQuest`] if a quest id is listed twice.
    /// - [`Error::DanglingReference`] for the first edge whose endpoint is not
    ///   in `nodes`. No partial graph is returned.
    pub fn build<N, E>(nodes: N, edges: E) -> Result<Self>
    where
        N: IntoIterator<Item = QuestNodeRef>,
        E: IntoIterator<Item = PrerequisiteEdge>,
    {
        let mut graph = Self::default();

        for node in nodes {
            if graph.index.contains_key(&node.id) {
                return Err(Error::DuplicateQuest { id: node.id });
            }
            graph.index.insert(node.id.clone(), graph.nodes.len());
            graph.nodes.push(node);
        }

        let count = graph.nodes.len();
        graph.dependents = vec![Vec::new(); count];
        graph.prerequisites = vec![Vec::new(); count];
        graph.in_degree = vec![0; count];

        let mut seen = HashSet::new();
        for edge in edges {
            let (Some(&from), Some(&to)) = (graph.index.get(&edge.from), graph.index.get(&edge.to))
            else {
                return Err(Error::DanglingReference { edge });
            };

            if !seen.insert((from, to)) {
                continue;
            }
            graph.dependents[from].push(to);
            graph.prerequisites[to].push(from);
            graph.in_degree[to] += 1;
            graph.edge_count += 1;
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edge_count,
            "Built quest graph"
        );
        Ok(graph)
    }

    /// Number of quests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no quests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct prerequisite edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Check if a quest is part of the graph.
    #[must_use]
    pub fn contains(&self, id: &QuestId) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a quest by id.
    #[must_use]
    pub fn node(&self, id: &QuestId) -> Option<&QuestNodeRef> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// All quests in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[QuestNodeRef] {
        &self.nodes
    }

    /// Quests without prerequisites, in insertion order.
    #[must_use]
    pub fn roots(&self) -> Vec<&QuestNodeRef> {
        self.nodes
            .iter()
            .zip(&self.in_degree)
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| node)
            .collect()
    }

    /// Direct prerequisites of a quest, in edge order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuestNotInGraph`] for an unknown id.
    pub fn direct_prerequisites(&self, id: &QuestId) -> Result<Vec<&QuestNodeRef>> {
        let idx = self.require(id)?;
        Ok(self.prerequisites[idx]
            .iter()
            .map(|&p| &self.nodes[p])
            .collect())
    }

    /// Every quest that must be completed before `id`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuestNotInGraph`] for an unknown id.
    pub fn prerequisites_of(&self, id: &QuestId) -> Result<Vec<QuestNodeRef>> {
        let idx = self.require(id)?;
        Ok(self.collect_reachable(idx, &self.prerequisites))
    }

    /// Every quest that `id` transitively unlocks, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuestNotInGraph`] for an unknown id.
    pub fn dependents_of(&self, id: &QuestId) -> Result<Vec<QuestNodeRef>> {
        let idx = self.require(id)?;
        Ok(self.collect_reachable(idx, &self.dependents))
    }

    pub(crate) fn require(&self, id: &QuestId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::QuestNotInGraph { id: id.clone() })
    }

    /// Nodes reachable from `start` along `adjacency`, excluding `start`
    /// unless it lies on a cycle.
    fn collect_reachable(&self, start: usize, adjacency: &[Vec<usize>]) -> Vec<QuestNodeRef> {
        let mut reached = vec![false; self.nodes.len()];
        let mut pending: Vec<usize> = adjacency[start].clone();

        while let Some(idx) = pending.pop() {
            if reached[idx] {
                continue;
            }
            reached[idx] = true;
            pending.extend(adjacency[idx].iter().copied().filter(|&n| !reached[n]));
        }

        self.nodes
            .iter()
            .zip(reached)
            .filter_map(|(node, hit)| hit.then(|| node.clone()))
            .collect()
    }
}
