use anyhow::Context;
use clap::Parser;
use crasp_membership::{
    automaton::dfa::spec::DfaSpec,
    decider::{CraspSolver, CraspSolverOptions},
    logger::LogLevel,
};

/// Decides whether the language of a DFA is expressible in C-RASP.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to a JSON DFA description
    input: String,

    /// Log verbosity on stderr
    #[arg(short, long, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Mirror the full log into this file
    #[arg(long)]
    log_file: Option<String>,

    /// Mirror the full log into a timestamped file in the working directory
    #[arg(long, default_value_t = false)]
    log_to_file: bool,

    /// Number of worker threads for evaluating components
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Cap on refinement rounds per component
    #[arg(long)]
    max_rounds: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let dfa = DfaSpec::from_file(&args.input)?.to_dfa()?;

    let log_file = args.log_file.or_else(|| {
        args.log_to_file.then(|| {
            format!(
                "crasp_{}.log",
                chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
            )
        })
    });

    let mut options = CraspSolverOptions::default()
        .with_log_level(args.log_level)
        .with_thread_count(args.threads);
    if let Some(path) = log_file {
        options = options.with_log_file(path);
    }
    if let Some(max_rounds) = args.max_rounds {
        options = options.with_max_rounds(max_rounds);
    }

    let result = CraspSolver::new(&dfa, options)
        .decide()
        .context("decision procedure failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
