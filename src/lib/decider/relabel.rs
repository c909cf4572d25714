use anyhow::Context;
use hashbrown::HashMap;
use num::{BigRational, Zero};
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use crate::{
    automaton::AutomatonEdge,
    decider::multigraph::{EdgeLabel, SccGraph},
};

/// Reads a balanced morphism off a null space basis: letter `i` of the
/// ordered alphabet maps to the vector of `i`-th coordinates across the
/// basis vectors. By construction the morphism sums to zero around every
/// cycle of the graph the basis was computed from.
pub fn morphism_from_basis<E: AutomatonEdge>(
    alphabet: &[EdgeLabel<E>],
    basis: &[Vec<BigRational>],
) -> HashMap<EdgeLabel<E>, Vec<BigRational>> {
    alphabet
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let image = basis.iter().map(|vector| vector[i].clone()).collect();
            (label.clone(), image)
        })
        .collect()
}

/// Refines the labels of a strongly connected graph under a balanced
/// morphism. Every node gets a potential, the morphism summed along a path
/// from a fixed root; every edge `u -> v` with label `l` then gets
/// `potential(u) + morphism(l)` appended to its label history. Balancedness
/// makes the potentials path independent, so the appended segment is the
/// potential of `v` no matter which path reached `u`, and two edges end up
/// with equal segments iff their targets carry the same potential.
///
/// All new segments are computed against the current labels before any edge
/// is touched, so edges relabeled early do not feed into segments of edges
/// relabeled later.
pub fn relabel<E: AutomatonEdge>(
    scc: &mut SccGraph<E>,
    morphism: &HashMap<EdgeLabel<E>, Vec<BigRational>>,
) -> anyhow::Result<()> {
    let potentials = node_potentials(&scc.graph, morphism)?;

    let mut segments: Vec<(EdgeIndex, Vec<BigRational>)> =
        Vec::with_capacity(scc.graph.edge_count());

    for edge in scc.graph.edge_references() {
        let image = morphism
            .get(edge.weight())
            .context("edge label missing from morphism")?;
        let source = &potentials[&edge.source()];

        let segment = image.iter().zip(source).map(|(m, s)| m + s).collect();
        segments.push((edge.id(), segment));
    }

    for (edge, segment) in segments {
        scc.graph[edge].extend(segment);
    }

    Ok(())
}

/// Potentials of all nodes relative to the smallest node index, summing the
/// morphism along breadth first paths. Assumes the graph is strongly
/// connected, so every node is reachable from the root.
fn node_potentials<E: AutomatonEdge>(
    graph: &DiGraph<(), EdgeLabel<E>>,
    morphism: &HashMap<EdgeLabel<E>, Vec<BigRational>>,
) -> anyhow::Result<HashMap<NodeIndex, Vec<BigRational>>> {
    let dimension = morphism.values().next().map_or(0, |image| image.len());
    let zero = vec![BigRational::zero(); dimension];

    let mut potentials = HashMap::new();
    let Some(root) = graph.node_indices().min() else {
        return Ok(potentials);
    };
    potentials.insert(root, zero);

    let mut queue = std::collections::VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        for edge in graph.edges_directed(node, Direction::Outgoing) {
            if potentials.contains_key(&edge.target()) {
                continue;
            }

            let image = morphism
                .get(edge.weight())
                .context("edge label missing from morphism")?;
            let potential = potentials[&node]
                .iter()
                .zip(image)
                .map(|(p, m)| p + m)
                .collect();

            potentials.insert(edge.target(), potential);
            queue.push_back(edge.target());
        }
    }

    Ok(potentials)
}

#[cfg(test)]
mod tests {
    use petgraph::graph::DiGraph;

    use super::*;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    #[test]
    fn morphism_reads_basis_columns() {
        let alphabet = vec![EdgeLabel::Letter('a'), EdgeLabel::Letter('b')];
        let basis = vec![vec![rat(1), rat(-1)], vec![rat(0), rat(2)]];

        let morphism = morphism_from_basis(&alphabet, &basis);
        assert_eq!(morphism[&EdgeLabel::Letter('a')], vec![rat(1), rat(0)]);
        assert_eq!(morphism[&EdgeLabel::Letter('b')], vec![rat(-1), rat(2)]);
    }

    #[test]
    fn relabel_assigns_target_potentials() {
        // diamond closed into cycles through u -> r; both branches reach u,
        // so both edges into u must end up with the same label
        let mut graph = DiGraph::new();
        let r = graph.add_node(());
        let x = graph.add_node(());
        let y = graph.add_node(());
        let u = graph.add_node(());
        let ra = graph.add_edge(r, x, EdgeLabel::Letter('a'));
        let xb = graph.add_edge(x, u, EdgeLabel::Letter('b'));
        let rc = graph.add_edge(r, y, EdgeLabel::Letter('c'));
        let yd = graph.add_edge(y, u, EdgeLabel::Letter('d'));
        let ue = graph.add_edge(u, r, EdgeLabel::Letter('e'));
        let mut scc = SccGraph { graph };

        // balanced on both cycles a+b+e and c+d+e
        let morphism = HashMap::from([
            (EdgeLabel::Letter('a'), vec![rat(1)]),
            (EdgeLabel::Letter('b'), vec![rat(2)]),
            (EdgeLabel::Letter('c'), vec![rat(0)]),
            (EdgeLabel::Letter('d'), vec![rat(3)]),
            (EdgeLabel::Letter('e'), vec![rat(-3)]),
        ]);

        relabel(&mut scc, &morphism).unwrap();

        // potentials: r = 0, x = 1, y = 0, u = 3; each edge takes the
        // potential of its target
        assert_eq!(scc.graph[ra], EdgeLabel::Potential(vec![rat(1)]));
        assert_eq!(scc.graph[xb], EdgeLabel::Potential(vec![rat(3)]));
        assert_eq!(scc.graph[rc], EdgeLabel::Potential(vec![rat(0)]));
        assert_eq!(scc.graph[yd], EdgeLabel::Potential(vec![rat(3)]));
        assert_eq!(scc.graph[ue], EdgeLabel::Potential(vec![rat(0)]));
    }

    #[test]
    fn relabel_appends_to_history() {
        let mut graph = DiGraph::new();
        let a = graph.add_node(());
        let e0 = graph.add_edge(a, a, EdgeLabel::Letter('a'));
        let e1 = graph.add_edge(a, a, EdgeLabel::Letter('b'));
        let mut scc = SccGraph { graph };

        let first = HashMap::from([
            (EdgeLabel::Letter('a'), vec![rat(0)]),
            (EdgeLabel::Letter('b'), vec![rat(0)]),
        ]);
        relabel(&mut scc, &first).unwrap();
        assert_eq!(scc.graph[e0], EdgeLabel::Potential(vec![rat(0)]));

        let second = HashMap::from([(EdgeLabel::Potential(vec![rat(0)]), vec![rat(0), rat(0)])]);
        relabel(&mut scc, &second).unwrap();

        // the second round extends the existing label instead of replacing it
        assert_eq!(
            scc.graph[e0],
            EdgeLabel::Potential(vec![rat(0), rat(0), rat(0)])
        );
        assert_eq!(scc.graph[e0], scc.graph[e1]);
    }
}
