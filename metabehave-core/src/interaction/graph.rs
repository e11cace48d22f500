//! Undirected influence graph built from an interaction log.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::{
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};

use super::{InteractionError, InteractionLog};

/// An undirected edge with its raw and normalised weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceEdge {
    /// Smaller member index.
    pub source: usize,
    /// Larger member index.
    pub target: usize,
    /// Number of window-level interactions between the two members.
    pub raw: u64,
    /// `raw / (2 × total_iterations)`, within `(0, 1]`.
    pub weight: f64,
}

/// Members that interacted, joined by edges weighted with interaction counts.
#[derive(Debug, Clone)]
pub struct InfluenceGraph {
    graph: UnGraph<usize, u64>,
    index: HashMap<usize, NodeIndex>,
    normaliser: f64,
}

impl InfluenceGraph {
    /// Builds the graph from `log`.
    ///
    /// Iterations after `until_iteration` are ignored. The remaining ones are
    /// grouped in windows of `window_size` consecutive entries; every ordered
    /// pair that interacted in a window adds one unit to its undirected edge.
    ///
    /// A log holding exactly `total_iterations + 1` entries whose first entry
    /// is numbered 0 starts with the initial population; that entry is
    /// skipped so every weight stays within `(0, 1]`.
    ///
    /// # Errors
    /// Returns [`InteractionError::InvalidTotalIterations`] for a zero
    /// iteration count, [`InteractionError::InvalidWindowSize`] for a zero
    /// window, and [`InteractionError::IterationCountMismatch`] when the log
    /// holds more iterations than `total_iterations` once any initial entry
    /// is skipped.
    pub fn from_log(
        log: &InteractionLog,
        window_size: usize,
        until_iteration: Option<u64>,
        total_iterations: u64,
    ) -> Result<Self, InteractionError> {
        if total_iterations == 0 {
            return Err(InteractionError::InvalidTotalIterations);
        }
        if window_size == 0 {
            return Err(InteractionError::InvalidWindowSize);
        }

        let mut used: Vec<_> = log
            .iterations()
            .iter()
            .filter(|matrix| until_iteration.is_none_or(|until| matrix.iteration() <= until))
            .collect();
        let initial_entry = used.len() as u64 == total_iterations.saturating_add(1)
            && used.first().is_some_and(|matrix| matrix.iteration() == 0);
        if initial_entry {
            used.remove(0);
        }
        if used.len() as u64 > total_iterations {
            return Err(InteractionError::IterationCountMismatch {
                used: used.len(),
                total_iterations,
            });
        }

        let mut raw: BTreeMap<(usize, usize), u64> = BTreeMap::new();
        for window in used.chunks(window_size) {
            let pairs: BTreeSet<(usize, usize)> = window
                .iter()
                .flat_map(|matrix| matrix.interacting_pairs())
                .collect();
            for (from, to) in pairs {
                *raw.entry((from.min(to), from.max(to))).or_default() += 1;
            }
        }

        let members: BTreeSet<usize> = raw.keys().flat_map(|&(a, b)| [a, b]).collect();
        let mut graph = UnGraph::<usize, u64>::with_capacity(members.len(), raw.len());
        let index: HashMap<usize, NodeIndex> = members
            .into_iter()
            .map(|member| (member, graph.add_node(member)))
            .collect();
        for ((a, b), weight) in raw {
            graph.add_edge(index[&a], index[&b], weight);
        }

        Ok(Self {
            graph,
            index,
            normaliser: 2.0 * total_iterations as f64,
        })
    }

    /// Returns the number of members that interacted.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of distinct member pairs that interacted.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns whether `member` took part in at least one interaction.
    #[must_use]
    pub fn contains(&self, member: usize) -> bool {
        self.index.contains_key(&member)
    }

    /// Returns the weight normaliser, `2 × total_iterations`.
    #[must_use]
    pub const fn normaliser(&self) -> f64 {
        self.normaliser
    }

    /// Iterates over edges in ascending `(source, target)` order.
    pub fn edges(&self) -> impl Iterator<Item = InfluenceEdge> + '_ {
        self.graph.edge_references().map(|edge| {
            let (a, b) = (self.graph[edge.source()], self.graph[edge.target()]);
            InfluenceEdge {
                source: a.min(b),
                target: a.max(b),
                raw: *edge.weight(),
                weight: *edge.weight() as f64 / self.normaliser,
            }
        })
    }

    /// Returns the normalised weight between two members, if they interacted.
    #[must_use]
    pub fn weight(&self, a: usize, b: usize) -> Option<f64> {
        let (a, b) = (*self.index.get(&a)?, *self.index.get(&b)?);
        self.graph
            .find_edge(a, b)
            .map(|edge| self.graph[edge] as f64 / self.normaliser)
    }

    /// Returns the normalised weighted degree of `member`.
    ///
    /// # Errors
    /// Returns [`InteractionError::UnknownSolutionIndex`] when `member` is not
    /// a node of the graph.
    pub fn strength(&self, member: usize) -> Result<f64, InteractionError> {
        let node = self
            .index
            .get(&member)
            .ok_or(InteractionError::UnknownSolutionIndex {
                index: member,
                nodes: self.graph.node_count(),
            })?;
        let raw: u64 = self.graph.edges(*node).map(|edge| *edge.weight()).sum();
        Ok(raw as f64 / self.normaliser)
    }

    /// Dense member indices `0..node_count` paired with normalised weights.
    pub(super) fn dense_edges(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    edge.source().index(),
                    edge.target().index(),
                    *edge.weight() as f64 / self.normaliser,
                )
            })
            .collect()
    }
}
