use anyhow::bail;
use hashbrown::HashMap;
use itertools::Itertools;
use num::BigRational;
use petgraph::{
    Direction,
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::automaton::{AutomatonEdge, AutomatonNode, dfa::DFA};

/// An edge label in the refinement multigraph.
///
/// Labels start out as the raw input letter and become vectors of rationals
/// once the first refinement round assigns potentials. Later rounds append to
/// the vector instead of replacing it, so a label carries the full history of
/// potentials ever assigned to its edge. Equality compares the entire
/// history.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeLabel<E: AutomatonEdge> {
    Letter(E),
    Potential(Vec<BigRational>),
}

impl<E: AutomatonEdge> EdgeLabel<E> {
    /// Appends a newly computed potential segment. The first segment replaces
    /// the raw letter; every later one extends the history.
    pub fn extend(&mut self, segment: Vec<BigRational>) {
        match self {
            EdgeLabel::Letter(_) => *self = EdgeLabel::Potential(segment),
            EdgeLabel::Potential(history) => history.extend(segment),
        }
    }
}

/// The transition structure of a DFA viewed as a labeled directed multigraph:
/// one node per state, one edge per (state, letter) transition.
pub struct LabeledGraph<E: AutomatonEdge> {
    pub graph: DiGraph<(), EdgeLabel<E>>,
}

impl<E: AutomatonEdge> LabeledGraph<E> {
    /// Builds the multigraph from a DFA. The initial and accepting states are
    /// irrelevant here, only the transition structure matters.
    pub fn from_dfa<N: AutomatonNode>(dfa: &DFA<N, E>) -> anyhow::Result<Self> {
        if dfa.state_count() == 0 {
            bail!("invalid automaton: empty state set");
        }
        if !dfa.is_total() {
            bail!("invalid automaton: transition function is not total");
        }

        let mut graph = DiGraph::new();
        for _ in dfa.graph.node_indices() {
            graph.add_node(());
        }
        for edge in dfa.graph.edge_references() {
            graph.add_edge(
                edge.source(),
                edge.target(),
                EdgeLabel::Letter(edge.weight().clone()),
            );
        }

        Ok(LabeledGraph { graph })
    }

    /// Decomposes the graph into its strongly connected components, each as
    /// an owned induced subgraph.
    pub fn scc_subgraphs(&self) -> Vec<SccGraph<E>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .map(|component| SccGraph::induced(&self.graph, component))
            .collect()
    }
}

/// The induced subgraph of one strongly connected component. Owns its nodes
/// and edges; refinement rounds mutate the edge labels in place, never the
/// edge set.
pub struct SccGraph<E: AutomatonEdge> {
    pub graph: DiGraph<(), EdgeLabel<E>>,
}

impl<E: AutomatonEdge> SccGraph<E> {
    fn induced(full: &DiGraph<(), EdgeLabel<E>>, mut nodes: Vec<NodeIndex>) -> Self {
        nodes.sort_unstable();

        let mut graph = DiGraph::new();
        let mut local = HashMap::new();
        for node in &nodes {
            local.insert(*node, graph.add_node(()));
        }

        // only edges with both endpoints inside the component take part in
        // any cycle, so cross-component edges are left out
        for node in &nodes {
            for edge in full.edges_directed(*node, Direction::Outgoing) {
                if let Some(target) = local.get(&edge.target()) {
                    graph.add_edge(local[node], *target, edge.weight().clone());
                }
            }
        }

        SccGraph { graph }
    }

    /// The canonical ordered alphabet of the subgraph: the sorted,
    /// deduplicated list of its current edge labels. Sorting fixes the column
    /// order of the loop equations across rounds.
    pub fn ordered_alphabet(&self) -> Vec<EdgeLabel<E>> {
        self.graph
            .edge_references()
            .map(|edge| edge.weight().clone())
            .sorted()
            .dedup()
            .collect()
    }

    /// A graph is separated iff no two edges sharing a label lead to
    /// different target nodes. A graph without edges is trivially separated.
    pub fn is_separated(&self) -> bool {
        let mut targets: HashMap<&EdgeLabel<E>, NodeIndex> = HashMap::new();

        for edge in self.graph.edge_references() {
            match targets.insert(edge.weight(), edge.target()) {
                Some(previous) if previous != edge.target() => return false,
                _ => {}
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter_graph(nodes: usize, edges: &[(usize, usize, char)]) -> SccGraph<char> {
        let mut graph = DiGraph::new();
        let indices: Vec<_> = (0..nodes).map(|_| graph.add_node(())).collect();
        for (u, v, c) in edges {
            graph.add_edge(indices[*u], indices[*v], EdgeLabel::Letter(*c));
        }
        SccGraph { graph }
    }

    #[test]
    fn separated_distinct_labels() {
        let graph = letter_graph(1, &[(0, 0, 'a'), (0, 0, 'b')]);
        assert!(graph.is_separated());
    }

    #[test]
    fn unseparated_same_label_different_targets() {
        let graph = letter_graph(2, &[(0, 0, 'a'), (1, 1, 'a')]);
        assert!(!graph.is_separated());
    }

    #[test]
    fn separated_same_label_same_target() {
        let graph = letter_graph(2, &[(0, 1, 'a'), (1, 1, 'a')]);
        assert!(graph.is_separated());
    }

    #[test]
    fn alphabet_is_sorted_and_deduplicated() {
        let graph = letter_graph(2, &[(0, 1, 'b'), (1, 0, 'a'), (1, 1, 'a')]);
        assert_eq!(
            graph.ordered_alphabet(),
            vec![EdgeLabel::Letter('a'), EdgeLabel::Letter('b')]
        );
    }
}
