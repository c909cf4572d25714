use crasp_membership::automaton::{
    AutBuild, Automaton,
    dfa::{DFA, node::DfaNode, spec::DfaSpec},
};

fn ab_star() -> DFA<&'static str, char> {
    let mut dfa = DFA::new(vec!['a', 'b']);

    let q0 = dfa.add_state(DfaNode::accepting("q0"));
    let q1 = dfa.add_state(DfaNode::non_accepting("q1"));
    let trap = dfa.add_state(DfaNode::non_accepting("trap"));
    dfa.set_start(q0);

    dfa.add_transition(q0, q1, 'a');
    dfa.add_transition(q0, trap, 'b');
    dfa.add_transition(q1, q0, 'b');
    dfa.add_transition(q1, trap, 'a');
    dfa.add_transition(trap, trap, 'a');
    dfa.add_transition(trap, trap, 'b');

    dfa
}

#[test]
fn accepts_walks_the_transitions() {
    let dfa = ab_star();

    assert!(dfa.accepts(&[]));
    assert!(dfa.accepts(&['a', 'b']));
    assert!(dfa.accepts(&['a', 'b', 'a', 'b']));
    assert!(!dfa.accepts(&['a']));
    assert!(!dfa.accepts(&['b']));
    assert!(!dfa.accepts(&['a', 'a', 'b']));
}

#[test]
fn totality_check() {
    let dfa = ab_star();
    assert!(dfa.is_total());

    let mut partial = DFA::new(vec!['a', 'b']);
    let q0 = partial.add_state(DfaNode::accepting("q0"));
    partial.set_start(q0);
    partial.add_transition(q0, q0, 'a');
    assert!(!partial.is_total());
}

#[test]
fn failure_state_completes_the_dfa() {
    let mut dfa = DFA::new(vec!['a', 'b']);
    let q0 = dfa.add_state(DfaNode::non_accepting("q0"));
    let q1 = dfa.add_state(DfaNode::accepting("q1"));
    dfa.set_start(q0);
    dfa.add_transition(q0, q1, 'a');

    assert!(!dfa.is_total());

    let failure = dfa.add_failure_state("fail");
    assert!(failure.is_some());
    assert!(dfa.is_total());
    assert!(dfa.is_complete());
    assert_eq!(dfa.state_count(), 3);

    assert!(dfa.accepts(&['a']));
    assert!(!dfa.accepts(&['b']));
    assert!(!dfa.accepts(&['a', 'a']));
}

#[test]
fn failure_state_is_skipped_when_already_total() {
    let mut dfa = ab_star();
    assert!(dfa.add_failure_state("fail").is_none());
    assert_eq!(dfa.state_count(), 3);
}

#[test]
#[should_panic]
fn conflicting_transition_panics() {
    let mut dfa = DFA::new(vec!['a']);
    let q0 = dfa.add_state(DfaNode::non_accepting("q0"));
    let q1 = dfa.add_state(DfaNode::non_accepting("q1"));
    dfa.add_transition(q0, q0, 'a');
    dfa.add_transition(q0, q1, 'a');
}

#[test]
fn spec_parses_into_a_dfa() {
    let json = r#"{
        "states": ["q0", "q1"],
        "alphabet": ["a", "b"],
        "transitions": {
            "q0": { "a": "q1", "b": "q0" },
            "q1": { "a": "q0", "b": "q1" }
        },
        "initial": "q0",
        "accepting": ["q1"]
    }"#;

    let spec: DfaSpec = serde_json::from_str(json).unwrap();
    let dfa = spec.to_dfa().unwrap();

    assert_eq!(dfa.state_count(), 2);
    assert_eq!(dfa.transition_count(), 4);
    assert!(dfa.is_total());
    assert!(dfa.get_start().is_some());

    let a = "a".to_string();
    let b = "b".to_string();
    assert!(dfa.accepts(&[a.clone()]));
    assert!(!dfa.accepts(&[b.clone()]));
    assert!(dfa.accepts(&[b, a]));
}

#[test]
fn spec_rejects_unknown_names() {
    let base = r#"{
        "states": ["q0"],
        "alphabet": ["a"],
        "transitions": { "q0": { "a": "q0" } },
        "initial": "q0",
        "accepting": []
    }"#;
    let spec: DfaSpec = serde_json::from_str(base).unwrap();
    assert!(spec.to_dfa().is_ok());

    let mut bad_initial = spec.clone();
    bad_initial.initial = "nope".to_string();
    assert!(bad_initial.to_dfa().is_err());

    let mut bad_accepting = spec.clone();
    bad_accepting.accepting = vec!["nope".to_string()];
    assert!(bad_accepting.to_dfa().is_err());

    let mut bad_letter = spec.clone();
    bad_letter
        .transitions
        .get_mut("q0")
        .unwrap()
        .insert("z".to_string(), "q0".to_string());
    assert!(bad_letter.to_dfa().is_err());

    let mut empty = spec;
    empty.states.clear();
    assert!(empty.to_dfa().is_err());
}
