use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use hanasolve::{BatchJob, BatchVerdict, Instance, decompress_deck, link, solve_batch};

/// Per-seed wall-clock budget, matching the batch production setting.
const DEFAULT_TIMEOUT_SECS: u64 = 150;

#[derive(Parser, Debug)]
#[command(
    name = "solve-seeds",
    about = "Decide feasibility for a batch of compressed decks."
)]
struct Args {
    /// File with one seed per line: "<label> <num_players> <deck>"
    #[arg(required = true)]
    seeds: PathBuf,

    /// Per-seed timeout in seconds; timed-out seeds stay unresolved
    #[arg(short = 't', long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Print a replay link for every feasible seed
    #[arg(long = "links")]
    links: bool,
}

fn main() {
    flexi_logger::Logger::try_with_env_or_str("info")
        .expect("logger spec")
        .start()
        .expect("logger start");
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let contents = std::fs::read_to_string(&args.seeds)?;
    let mut jobs = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (label, players, deck) = match (fields.next(), fields.next(), fields.next()) {
            (Some(l), Some(p), Some(d)) => (l, p, d),
            _ => return Err(format!("line {}: expected 'label players deck'", line_no + 1).into()),
        };
        let num_players: usize = players
            .parse()
            .map_err(|_| format!("line {}: bad player count {players:?}", line_no + 1))?;
        let deck = decompress_deck(deck)?;
        jobs.push(BatchJob {
            seed: label.to_string(),
            instance: Instance::new(deck, num_players)?,
        });
    }

    let total = jobs.len();
    println!("Solving {total} seeds with a {}s timeout each.", args.timeout);
    let reports = solve_batch(jobs, Duration::from_secs(args.timeout));

    let mut feasible = 0usize;
    let mut infeasible = 0usize;
    let mut unresolved = 0usize;
    for report in &reports {
        match &report.verdict {
            BatchVerdict::Feasible(state) => {
                feasible += 1;
                print!("{:<20} feasible   ({:.2?})", report.seed, report.elapsed);
                if args.links {
                    print!("  {}", link(state)?);
                }
                println!();
            }
            BatchVerdict::Infeasible => {
                infeasible += 1;
                println!("{:<20} infeasible ({:.2?})", report.seed, report.elapsed);
            }
            BatchVerdict::Unknown => {
                unresolved += 1;
                println!("{:<20} unresolved ({:.2?})", report.seed, report.elapsed);
            }
        }
    }
    println!("\n{feasible} feasible, {infeasible} infeasible, {unresolved} unresolved of {total}.");
    Ok(())
}
