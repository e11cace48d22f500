//! Graph storage for search trajectory networks.

use std::collections::{BTreeMap, HashMap};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use super::{StnError, StnSummary, TrajectoryRecord};

/// A distinct visited state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateNode {
    state: String,
    visits: u64,
    best: bool,
}

impl StateNode {
    /// Returns the structural key of the state.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns how many records observed the state.
    #[must_use]
    pub const fn visits(&self) -> u64 {
        self.visits
    }

    /// Returns whether any observation of the state matched the global best.
    #[must_use]
    pub const fn is_best(&self) -> bool {
        self.best
    }

    /// Returns whether the state was visited more than once.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        self.visits >= 2
    }
}

/// Directed network of visited states weighted by transition counts.
#[derive(Debug, Clone)]
pub struct StnGraph {
    graph: DiGraph<StateNode, u64>,
    index: HashMap<String, NodeIndex>,
    runs: usize,
}

impl StnGraph {
    /// Nodes are created in first-occurrence order; transitions follow
    /// iteration order within each run, with ties kept in input order.
    pub(super) fn build(
        records: &[TrajectoryRecord],
        is_best: impl Fn(f64) -> bool,
    ) -> Result<Self, StnError> {
        if records.is_empty() {
            return Err(StnError::EmptyTrajectory);
        }

        let mut graph = DiGraph::<StateNode, u64>::new();
        let mut index: HashMap<String, NodeIndex> = HashMap::new();
        let mut runs: BTreeMap<u64, Vec<(u64, NodeIndex)>> = BTreeMap::new();

        for record in records {
            if !record.fitness.is_finite() {
                return Err(StnError::NonFiniteFitness {
                    run: record.run,
                    iteration: record.iteration,
                });
            }
            let best = is_best(record.fitness);
            let node = match index.get(record.state.as_str()) {
                Some(&node) => {
                    let weight = &mut graph[node];
                    weight.visits += 1;
                    weight.best |= best;
                    node
                }
                None => {
                    let node = graph.add_node(StateNode {
                        state: record.state.clone(),
                        visits: 1,
                        best,
                    });
                    index.insert(record.state.clone(), node);
                    node
                }
            };
            runs.entry(record.run)
                .or_default()
                .push((record.iteration, node));
        }

        for steps in runs.values_mut() {
            steps.sort_by_key(|&(iteration, _)| iteration);
            for pair in steps.windows(2) {
                let [(_, from), (_, to)] = [pair[0], pair[1]];
                match graph.find_edge(from, to) {
                    Some(edge) => graph[edge] += 1,
                    None => {
                        graph.add_edge(from, to, 1);
                    }
                }
            }
        }

        Ok(Self {
            graph,
            index,
            runs: runs.len(),
        })
    }

    /// Returns the number of distinct states.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of distinct edges, self-loops included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the node for `state`, if it was visited.
    #[must_use]
    pub fn node(&self, state: &str) -> Option<&StateNode> {
        self.index.get(state).map(|&node| &self.graph[node])
    }

    /// Iterates over nodes in first-occurrence order.
    pub fn nodes(&self) -> impl Iterator<Item = &StateNode> {
        self.graph.node_weights()
    }

    /// Returns the transition count of `from -> to`, if observed.
    #[must_use]
    pub fn transitions(&self, from: &str, to: &str) -> Option<u64> {
        let from = *self.index.get(from)?;
        let to = *self.index.get(to)?;
        self.graph.find_edge(from, to).map(|edge| self.graph[edge])
    }

    /// Returns the number of distinct predecessors of `state`, excluding the
    /// state itself. Unknown states and states without incoming edges yield 0.
    #[must_use]
    pub fn in_degree(&self, state: &str) -> usize {
        self.index
            .get(state)
            .map_or(0, |&node| self.in_degree_of(node))
    }

    fn in_degree_of(&self, node: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .filter(|&predecessor| predecessor != node)
            .count()
    }

    /// Summarises the network topology.
    #[must_use]
    pub fn summary(&self) -> StnSummary {
        let proper_edges = self
            .graph
            .edge_references()
            .filter(|edge| edge.source() != edge.target())
            .count();
        let best_in_degree: usize = self
            .graph
            .node_indices()
            .filter(|&node| self.graph[node].best)
            .map(|node| self.in_degree_of(node))
            .sum();
        let best_strength = if proper_edges == 0 {
            0.0
        } else {
            best_in_degree as f64 / proper_edges as f64
        };

        StnSummary {
            n_total: self.graph.node_count(),
            n_best: self.nodes().filter(|node| node.best).count(),
            n_shared: self.nodes().filter(|node| node.is_shared()).count(),
            best_strength,
            n_edges: self.graph.edge_count(),
            n_transitions: self.graph.edge_weights().sum(),
            n_runs: self.runs,
        }
    }
}
