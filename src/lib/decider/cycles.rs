use petgraph::{
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

/// Enumerates all simple cycles of the graph as node sequences, ignoring
/// parallel edges. A cycle `[n0, n1, .., nk]` visits each node once and
/// closes back from `nk` to `n0`; self loops show up as singleton sequences.
///
/// Each cycle is reported exactly once, rooted at its smallest node index:
/// the search from root `r` only walks nodes `>= r`, so a cycle is found
/// from its minimum node and nowhere else.
pub fn simple_node_cycles<N, E>(graph: &DiGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let mut cycles = Vec::new();

    for root in graph.node_indices() {
        let mut path = vec![root];
        let mut on_path = vec![false; graph.node_count()];
        on_path[root.index()] = true;

        dfs_from_root(graph, root, &mut path, &mut on_path, &mut cycles);
    }

    cycles
}

fn dfs_from_root<N, E>(
    graph: &DiGraph<N, E>,
    root: NodeIndex,
    path: &mut Vec<NodeIndex>,
    on_path: &mut Vec<bool>,
    cycles: &mut Vec<Vec<NodeIndex>>,
) {
    let current = *path.last().unwrap();

    let mut successors: Vec<_> = graph.neighbors(current).collect();
    successors.sort_unstable();
    successors.dedup();

    for next in successors {
        if next == root {
            cycles.push(path.clone());
        } else if next > root && !on_path[next.index()] {
            path.push(next);
            on_path[next.index()] = true;
            dfs_from_root(graph, root, path, on_path, cycles);
            on_path[next.index()] = false;
            path.pop();
        }
    }
}

/// Lazily expands a node cycle into all edge walks realizing it. Between two
/// consecutive nodes there may be several parallel edges; the walks are the
/// Cartesian product of the per-hop choices, stepped through odometer style.
pub struct EdgeWalks {
    hops: Vec<Vec<EdgeIndex>>,
    choice: Vec<usize>,
    done: bool,
}

impl EdgeWalks {
    pub fn new<N, E>(graph: &DiGraph<N, E>, cycle: &[NodeIndex]) -> Self {
        let mut hops = Vec::with_capacity(cycle.len());

        for i in 0..cycle.len() {
            let from = cycle[i];
            let to = cycle[(i + 1) % cycle.len()];
            let mut parallel: Vec<_> = graph.edges_connecting(from, to).map(|e| e.id()).collect();
            parallel.sort_unstable();
            hops.push(parallel);
        }

        let done = hops.iter().any(|hop| hop.is_empty());
        let choice = vec![0; hops.len()];

        EdgeWalks { hops, choice, done }
    }
}

impl Iterator for EdgeWalks {
    type Item = Vec<EdgeIndex>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let walk = self
            .choice
            .iter()
            .zip(&self.hops)
            .map(|(&c, hop)| hop[c])
            .collect();

        self.done = true;
        for i in (0..self.hops.len()).rev() {
            if self.choice[i] + 1 < self.hops[i].len() {
                self.choice[i] += 1;
                self.done = false;
                break;
            }
            self.choice[i] = 0;
        }

        Some(walk)
    }
}

/// All edge walks over all simple cycles of the graph.
pub fn simple_cycle_edge_walks<N, E>(
    graph: &DiGraph<N, E>,
) -> impl Iterator<Item = Vec<EdgeIndex>> + '_ {
    simple_node_cycles(graph)
        .into_iter()
        .flat_map(|cycle| EdgeWalks::new(graph, &cycle))
}
