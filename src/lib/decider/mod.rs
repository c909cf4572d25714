//! Decides whether the language of a DFA is expressible in C-RASP.
//!
//! The decision runs per strongly connected component of the transition
//! graph. Each component is refined by repeatedly computing the space of
//! balanced morphisms over its current edge labels (the null space of the
//! Parikh matrix of its simple cycles) and rewriting the labels with the
//! potentials the morphism induces. Once the label partition stops changing
//! the component is checked for separation; the language is expressible iff
//! every component ends up separated.

use std::time::{Duration, Instant};

use anyhow::bail;
use hashbrown::HashMap;
use num::{BigRational, One, Zero};
use serde::Serialize;

use crate::{
    automaton::{Automaton, AutomatonEdge, AutomatonNode, dfa::DFA},
    decider::{
        cycles::simple_cycle_edge_walks,
        linalg::RationalMatrix,
        multigraph::{EdgeLabel, LabeledGraph, SccGraph},
        relabel::{morphism_from_basis, relabel},
    },
    logger::{LogLevel, Logger},
};

pub mod cycles;
pub mod linalg;
pub mod multigraph;
pub mod relabel;

#[derive(Debug, Clone)]
pub struct CraspSolverOptions {
    pub log_level: LogLevel,
    pub log_file: Option<String>,
    pub thread_count: usize,
    pub max_rounds: Option<u32>,
}

impl Default for CraspSolverOptions {
    fn default() -> Self {
        CraspSolverOptions {
            log_level: LogLevel::Warn,
            log_file: None,
            thread_count: 1,
            max_rounds: None,
        }
    }
}

impl CraspSolverOptions {
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn with_log_file(mut self, log_file: String) -> Self {
        self.log_file = Some(log_file);
        self
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        assert!(thread_count > 0, "thread count must be positive");
        self.thread_count = thread_count;
        self
    }

    /// Overrides the refinement round cap. The default cap is derived from
    /// the component size and is only ever hit on an internal error, so this
    /// is mostly useful to make misbehavior fail fast in experiments.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SolverResult {
    pub member: bool,
    pub statistics: SolverStatistics,
}

/// Statistics of one decision run. With a single thread the components are
/// evaluated lazily, so counts only cover components up to the first
/// unseparated one.
#[derive(Debug, Clone, Serialize)]
pub struct SolverStatistics {
    pub scc_count: usize,
    pub evaluated_sccs: usize,
    pub refinement_rounds: u32,
    pub time: Duration,
}

struct SccOutcome {
    separated: bool,
    rounds: u32,
}

pub struct CraspSolver<'a, N: AutomatonNode, E: AutomatonEdge> {
    dfa: &'a DFA<N, E>,
    options: CraspSolverOptions,
    logger: Logger,
}

impl<'a, N: AutomatonNode, E: AutomatonEdge + Send> CraspSolver<'a, N, E> {
    pub fn new(dfa: &'a DFA<N, E>, options: CraspSolverOptions) -> Self {
        let logger = Logger::new(
            options.log_level,
            "crasp".to_string(),
            options.log_file.clone(),
        );

        CraspSolver {
            dfa,
            options,
            logger,
        }
    }

    pub fn decide(&self) -> anyhow::Result<SolverResult> {
        let start = Instant::now();

        let graph = LabeledGraph::from_dfa(self.dfa)?;
        let sccs = graph.scc_subgraphs();
        let scc_count = sccs.len();

        self.logger
            .object("CraspSolver")
            .add_field("states", self.dfa.state_count().to_string())
            .add_field("transitions", self.dfa.transition_count().to_string())
            .add_field("alphabet", self.dfa.alphabet().len().to_string())
            .add_field("sccs", scc_count.to_string())
            .add_field("threads", self.options.thread_count.to_string())
            .log(LogLevel::Info);

        let outcomes = if self.options.thread_count > 1 {
            self.evaluate_parallel(sccs)?
        } else {
            self.evaluate_sequential(sccs)?
        };

        let member = outcomes.iter().all(|outcome| outcome.separated);
        let statistics = SolverStatistics {
            scc_count,
            evaluated_sccs: outcomes.len(),
            refinement_rounds: outcomes.iter().map(|outcome| outcome.rounds).sum(),
            time: start.elapsed(),
        };

        self.logger
            .object("SolverResult")
            .add_field("member", member.to_string())
            .add_field("evaluated_sccs", statistics.evaluated_sccs.to_string())
            .add_field(
                "refinement_rounds",
                statistics.refinement_rounds.to_string(),
            )
            .add_field("time", format!("{:?}", statistics.time))
            .log(LogLevel::Info);

        Ok(SolverResult { member, statistics })
    }

    /// Evaluates the components one after another, stopping at the first
    /// unseparated one since a single failure already decides the answer.
    fn evaluate_sequential(&self, sccs: Vec<SccGraph<E>>) -> anyhow::Result<Vec<SccOutcome>> {
        let mut outcomes = Vec::with_capacity(sccs.len());

        for (i, scc) in sccs.into_iter().enumerate() {
            let outcome = decide_scc(scc, self.options.max_rounds, Some(&self.logger))?;
            self.logger.debug(&format!(
                "scc {}: separated = {}, rounds = {}",
                i, outcome.separated, outcome.rounds
            ));

            let separated = outcome.separated;
            outcomes.push(outcome);
            if !separated {
                break;
            }
        }

        Ok(outcomes)
    }

    /// Distributes the components round robin over scoped worker threads.
    /// All components are evaluated; the conjunction over the outcomes does
    /// not depend on the order they finish in.
    fn evaluate_parallel(&self, sccs: Vec<SccGraph<E>>) -> anyhow::Result<Vec<SccOutcome>> {
        let mut buckets: Vec<Vec<SccGraph<E>>> = (0..self.options.thread_count)
            .map(|_| Vec::new())
            .collect();
        for (i, scc) in sccs.into_iter().enumerate() {
            buckets[i % self.options.thread_count].push(scc);
        }

        let max_rounds = self.options.max_rounds;
        let logger = &self.logger;
        let results: Vec<anyhow::Result<SccOutcome>> = std::thread::scope(|scope| {
            let handles: Vec<_> = buckets
                .into_iter()
                .map(|bucket| {
                    scope.spawn(move || {
                        bucket
                            .into_iter()
                            .map(|scc| decide_scc(scc, max_rounds, Some(logger)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| handle.join().expect("worker thread panicked"))
                .collect()
        });

        results.into_iter().collect()
    }
}

/// Decides whether the language of the DFA is expressible in C-RASP.
pub fn decide_membership<N: AutomatonNode, E: AutomatonEdge + Send>(
    dfa: &DFA<N, E>,
) -> anyhow::Result<bool> {
    let solver = CraspSolver::new(dfa, CraspSolverOptions::default());
    Ok(solver.decide()?.member)
}

/// Runs the refinement fixed point on one strongly connected component and
/// checks separation of the stable labeling.
///
/// The loop terminates because every relabeling either refines the label
/// partition or leaves it unchanged, and an unchanged partition reproduces
/// the previous null space basis. The partition can refine at most once per
/// edge, so hitting the cap means an internal invariant was violated.
fn decide_scc<E: AutomatonEdge>(
    mut scc: SccGraph<E>,
    max_rounds: Option<u32>,
    logger: Option<&Logger>,
) -> anyhow::Result<SccOutcome> {
    let cap = max_rounds.unwrap_or(scc.graph.edge_count() as u32 + 2);

    let mut previous: Option<Vec<Vec<BigRational>>> = None;
    let mut rounds = 0;

    loop {
        let alphabet = scc.ordered_alphabet();
        let matrix = parikh_matrix(&scc, &alphabet);
        let walks = matrix.row_count();
        let basis = matrix.null_space();

        if let Some(logger) = logger {
            logger.debug(&format!(
                "round {}: alphabet = {}, cycle walks = {}, null space dim = {}",
                rounds + 1,
                alphabet.len(),
                walks,
                basis.len()
            ));
        }

        // no balanced morphism left means no refinement can distinguish
        // anything further; the labeling is already as fine as it gets
        if basis.is_empty() {
            break;
        }
        if previous.as_ref() == Some(&basis) {
            break;
        }
        if rounds >= cap {
            bail!("refinement did not converge within {} rounds", cap);
        }

        let morphism = morphism_from_basis(&alphabet, &basis);
        relabel(&mut scc, &morphism)?;

        previous = Some(basis);
        rounds += 1;
    }

    Ok(SccOutcome {
        separated: scc.is_separated(),
        rounds,
    })
}

/// The Parikh matrix of the component: one row per edge walk of a simple
/// cycle, one column per label of the ordered alphabet, counting how often
/// the walk uses the label. Its null space is the space of balanced
/// morphisms.
fn parikh_matrix<E: AutomatonEdge>(
    scc: &SccGraph<E>,
    alphabet: &[EdgeLabel<E>],
) -> RationalMatrix {
    let index: HashMap<&EdgeLabel<E>, usize> = alphabet
        .iter()
        .enumerate()
        .map(|(i, label)| (label, i))
        .collect();

    let mut matrix = RationalMatrix::new(alphabet.len());
    for walk in simple_cycle_edge_walks(&scc.graph) {
        let mut row = vec![BigRational::zero(); alphabet.len()];
        for edge in walk {
            row[index[&scc.graph[edge]]] += BigRational::one();
        }
        matrix.push_row(row);
    }

    matrix
}
