pub mod automaton;
pub mod decider;
pub mod logger;
pub mod validation;
