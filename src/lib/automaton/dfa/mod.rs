use std::fmt::Debug;

use itertools::Itertools;
use node::DfaNode;
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use crate::automaton::{AutBuild, Automaton, AutomatonEdge, AutomatonNode};

pub mod node;
pub mod spec;

#[derive(Clone)]
pub struct DFA<N: AutomatonNode, E: AutomatonEdge> {
    start: Option<NodeIndex<u32>>,
    pub graph: DiGraph<DfaNode<N>, E>,
    alphabet: Vec<E>,
    complete: bool,
}

impl<N: AutomatonNode, E: AutomatonEdge> DFA<N, E> {
    pub fn new(alphabet: Vec<E>) -> Self {
        DFA {
            alphabet,
            start: None,
            graph: DiGraph::new(),
            complete: false,
        }
    }

    pub fn set_start(&mut self, start: NodeIndex<u32>) {
        self.start = Some(start);
    }

    pub fn get_start(&self) -> Option<NodeIndex<u32>> {
        self.start
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Marks the DFA as complete without checking. This is useful when we
    /// don't want to spend the time to verify completeness.
    pub fn set_complete_unchecked(&mut self) {
        self.complete = true;
    }

    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn transition_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks whether the transition function is total, i.e. every state has
    /// an outgoing transition for every letter of the alphabet.
    pub fn is_total(&self) -> bool {
        self.graph.node_indices().all(|state| {
            self.alphabet.iter().all(|letter| {
                self.graph
                    .edges_directed(state, Direction::Outgoing)
                    .any(|edge| edge.weight() == letter)
            })
        })
    }

    /// Adds a failure state if needed. This turns the DFA into a complete
    /// DFA, which is required by algorithms that assume a total transition
    /// function.
    pub fn add_failure_state(&mut self, data: N) -> Option<NodeIndex<u32>> {
        let mut failure_transitions = Vec::new();

        for state in self.graph.node_indices() {
            for letter in self.alphabet.iter() {
                let edge = self
                    .graph
                    .edges_directed(state, Direction::Outgoing)
                    .find(|edge| edge.weight() == letter);

                if edge.is_none() {
                    failure_transitions.push((state, letter.clone()));
                }
            }
        }

        if failure_transitions.is_empty() {
            self.complete = true;
            return None;
        }

        let failure_state = self.add_state(DfaNode::non_accepting(data));

        for (state, letter) in failure_transitions {
            self.add_transition(state, failure_state, letter);
        }

        for letter in self.alphabet.clone().iter() {
            self.add_transition(failure_state, failure_state, letter.clone());
        }

        self.complete = true;

        Some(failure_state)
    }

    pub fn accepting_states(&self) -> Vec<NodeIndex<u32>> {
        self.graph
            .node_indices()
            .filter(|node| self.graph[*node].accepting)
            .collect()
    }
}

impl<N: AutomatonNode, E: AutomatonEdge> AutBuild<NodeIndex, EdgeIndex, DfaNode<N>, E>
    for DFA<N, E>
{
    fn add_state(&mut self, data: DfaNode<N>) -> NodeIndex<u32> {
        self.graph.add_node(data)
    }

    fn add_transition(
        &mut self,
        from: NodeIndex<u32>,
        to: NodeIndex<u32>,
        label: E,
    ) -> EdgeIndex<u32> {
        let existing_edge = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .find(|edge| *edge.weight() == label);
        if let Some(edge) = existing_edge {
            let target = edge.target();
            if target != to {
                panic!(
                    "Transition conflict, adding the new transition causes this automaton to no longer be a DFA. Existing: {:?} -{:?}-> {:?}. New: {:?} -{:?}-> {:?}",
                    from, label, target, from, label, to
                );
            }
        }

        self.graph.add_edge(from, to, label)
    }
}

impl<N: AutomatonNode, E: AutomatonEdge> Automaton<E> for DFA<N, E> {
    fn accepts<'a>(&self, input: impl IntoIterator<Item = &'a E>) -> bool
    where
        E: 'a,
    {
        assert!(self.start.is_some(), "Self must have a start state");

        let mut current_state = self.start;
        for symbol in input {
            assert!(
                self.alphabet.contains(symbol),
                "Symbol {:?} not in alphabet",
                symbol
            );

            if let Some(state) = current_state {
                current_state = self
                    .graph
                    .edges_directed(state, Direction::Outgoing)
                    .find(|neighbor| neighbor.weight() == symbol)
                    .map(|edge| edge.target());
            } else {
                return false;
            }
        }

        match current_state.and_then(|state| self.graph.node_weight(state)) {
            Some(data) => data.accepting,
            None => false,
        }
    }

    fn alphabet(&self) -> &Vec<E> {
        &self.alphabet
    }
}

impl<N: AutomatonNode, E: AutomatonEdge> Debug for DFA<N, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DFA")
            .field("alphabet", &self.alphabet)
            .field("state_count", &self.graph.node_count())
            .field(
                "states",
                &self
                    .graph
                    .node_indices()
                    .map(|node| (&self.graph[node].data, node))
                    .collect_vec(),
            )
            .field("initial_state", &self.start)
            .field("final_states", &self.accepting_states())
            .field("edge_count", &self.graph.edge_count())
            .field(
                "edges",
                &self
                    .graph
                    .edge_references()
                    .map(|edge| {
                        format!(
                            "{:?} --- {:?} --> {:?}",
                            edge.source(),
                            edge.weight(),
                            edge.target()
                        )
                    })
                    .collect_vec(),
            )
            .finish()
    }
}
