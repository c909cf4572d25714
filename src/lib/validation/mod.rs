//! Helpers for validating the decision procedure: random complete DFAs and
//! state permutations. The decision only depends on the transition
//! structure, so it must be invariant under renaming the states.

use hashbrown::HashMap;
use petgraph::visit::EdgeRef;
use rand::{RngExt, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::automaton::{
    AutBuild, Automaton, AutomatonEdge, AutomatonNode,
    dfa::{DFA, node::DfaNode},
};

/// Generates a random complete DFA with the given number of states over the
/// alphabet `0..alphabet_size`. Every state gets a transition for every
/// letter to a uniformly random state, and is accepting with probability one
/// half. Deterministic in the seed.
pub fn random_complete_dfa(seed: u64, states: usize, alphabet_size: usize) -> DFA<usize, usize> {
    assert!(states > 0, "a DFA needs at least one state");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut dfa = DFA::new((0..alphabet_size).collect());

    let nodes: Vec<_> = (0..states)
        .map(|i| dfa.add_state(DfaNode::new(rng.random_bool(0.5), i)))
        .collect();
    dfa.set_start(nodes[0]);

    for &from in &nodes {
        for letter in 0..alphabet_size {
            let to = nodes[rng.random_range(0..states)];
            dfa.add_transition(from, to, letter);
        }
    }

    dfa.set_complete_unchecked();
    dfa
}

/// A uniformly random permutation of `0..n`, as a map from old position to
/// new position.
pub fn random_permutation(seed: u64, n: usize) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut permutation: Vec<usize> = (0..n).collect();
    permutation.shuffle(&mut rng);
    permutation
}

/// Rebuilds the DFA with its states renamed by the permutation: the state at
/// index `i` moves to index `permutation[i]`. Accepting flags, the start
/// state and all transitions move along.
pub fn permute_states<N: AutomatonNode, E: AutomatonEdge>(
    dfa: &DFA<N, E>,
    permutation: &[usize],
) -> DFA<N, E> {
    assert_eq!(permutation.len(), dfa.state_count());

    let old: Vec<_> = dfa.graph.node_indices().collect();
    let mut slots = vec![0; old.len()];
    for (i, &slot) in permutation.iter().enumerate() {
        slots[slot] = i;
    }

    let mut permuted = DFA::new(dfa.alphabet().clone());
    let mut mapping = HashMap::new();

    for &i in &slots {
        let node = old[i];
        let new_node = permuted.add_state(dfa.graph[node].clone());
        mapping.insert(node, new_node);
    }

    for edge in dfa.graph.edge_references() {
        permuted.add_transition(
            mapping[&edge.source()],
            mapping[&edge.target()],
            edge.weight().clone(),
        );
    }

    if let Some(start) = dfa.get_start() {
        permuted.set_start(mapping[&start]);
    }

    permuted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_dfa_is_total_and_seed_deterministic() {
        let a = random_complete_dfa(7, 5, 3);
        let b = random_complete_dfa(7, 5, 3);

        assert!(a.is_total());
        assert_eq!(a.state_count(), 5);
        assert_eq!(a.transition_count(), 15);
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }

    #[test]
    fn permutation_preserves_the_language() {
        let dfa = random_complete_dfa(11, 6, 2);
        let permutation = random_permutation(3, 6);
        let permuted = permute_states(&dfa, &permutation);

        let words = [vec![], vec![0], vec![1, 0], vec![0, 0, 1], vec![1, 1, 1, 0]];
        for word in &words {
            assert_eq!(
                dfa.accepts(word.iter()),
                permuted.accepts(word.iter()),
                "word {:?}",
                word
            );
        }
    }
}
