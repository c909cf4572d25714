use std::{fmt::Debug, hash::Hash};

pub mod dfa;

/// This trait represents types that can be used as node data in an automaton.
pub trait AutomatonNode: Debug + Clone + PartialEq + Eq + Hash {}
impl<T> AutomatonNode for T where T: Debug + Clone + PartialEq + Eq + Hash {}

/// This trait represents types that can be used as edge labels in an
/// automaton. Labels must be orderable, so that structures derived from an
/// automaton can fix a canonical ordering of the alphabet.
pub trait AutomatonEdge: Debug + Clone + PartialEq + Eq + Hash + Ord {}
impl<T> AutomatonEdge for T where T: Debug + Clone + PartialEq + Eq + Hash + Ord {}

/// Incremental construction of automata.
pub trait AutBuild<NIndex, EIndex, N: AutomatonNode, E: AutomatonEdge> {
    /// Adds a new state with the given data. Returns the index of the newly
    /// added state.
    fn add_state(&mut self, data: N) -> NIndex;

    /// Adds a transition from `from` to `to` consuming `label`. Returns the
    /// index of the newly added transition.
    fn add_transition(&mut self, from: NIndex, to: NIndex, label: E) -> EIndex;
}

/// The basic trait for anything that defines a language over a set alphabet.
pub trait Automaton<E: AutomatonEdge> {
    fn accepts<'a>(&self, input: impl IntoIterator<Item = &'a E>) -> bool
    where
        E: 'a;

    fn alphabet(&self) -> &Vec<E>;
}
