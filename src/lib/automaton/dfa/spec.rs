//! In this file, we parse textual JSON representations of DFAs.
//!
//! An example DFA description is as follows:
//!
//! ```json
//! {
//!     "states": ["q0", "q1"],
//!     "alphabet": ["a", "b"],
//!     "transitions": {
//!         "q0": { "a": "q1", "b": "q0" },
//!         "q1": { "a": "q0", "b": "q1" }
//!     },
//!     "initial": "q0",
//!     "accepting": ["q1"]
//! }
//! ```
//!
//! The transition table must be total over the declared states and alphabet;
//! totality is not enforced here but by the decision procedure consuming the
//! DFA.

use anyhow::{Context, bail};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::automaton::{
    AutBuild,
    dfa::{DFA, node::DfaNode},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaSpec {
    pub states: Vec<String>,
    pub alphabet: Vec<String>,
    pub transitions: HashMap<String, HashMap<String, String>>,
    pub initial: String,
    pub accepting: Vec<String>,
}

impl DfaSpec {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read DFA description from {}", path))?;
        let spec: DfaSpec = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse DFA description from {}", path))?;
        Ok(spec)
    }

    pub fn to_dfa(&self) -> anyhow::Result<DFA<String, String>> {
        if self.states.is_empty() {
            bail!("invalid automaton: empty state set");
        }
        if !self.states.contains(&self.initial) {
            bail!("invalid automaton: unknown initial state {:?}", self.initial);
        }
        for state in &self.accepting {
            if !self.states.contains(state) {
                bail!("invalid automaton: unknown accepting state {:?}", state);
            }
        }

        let mut dfa = DFA::new(self.alphabet.clone());
        let mut indices = HashMap::new();

        for state in &self.states {
            let node = dfa.add_state(DfaNode::new(
                self.accepting.contains(state),
                state.clone(),
            ));
            if indices.insert(state.clone(), node).is_some() {
                bail!("invalid automaton: duplicate state {:?}", state);
            }
            if *state == self.initial {
                dfa.set_start(node);
            }
        }

        for (state, successors) in &self.transitions {
            let from = *indices
                .get(state)
                .with_context(|| format!("invalid automaton: unknown state {:?}", state))?;

            for (letter, target) in successors {
                if !self.alphabet.contains(letter) {
                    bail!("invalid automaton: unknown letter {:?}", letter);
                }
                let to = *indices
                    .get(target)
                    .with_context(|| format!("invalid automaton: unknown state {:?}", target))?;

                dfa.add_transition(from, to, letter.clone());
            }
        }

        Ok(dfa)
    }
}
