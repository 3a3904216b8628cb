use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use rayon::prelude::*;

use crate::instance::Instance;
use crate::solver;
use crate::state::GameState;

/// One feasibility job: a seed label plus its dealt instance.
#[derive(Clone, Debug)]
pub struct BatchJob {
    pub seed: String,
    pub instance: Instance,
}

/// Verdict for a seed. `Unknown` marks timeouts and solver faults; it is
/// never collapsed into feasible or infeasible.
#[derive(Debug)]
pub enum BatchVerdict {
    Feasible(Box<GameState>),
    Infeasible,
    Unknown,
}

#[derive(Debug)]
pub struct BatchReport {
    pub seed: String,
    pub verdict: BatchVerdict,
    pub elapsed: Duration,
}

/// Solves every job on the rayon pool, each under its own wall-clock
/// timeout. Workers share nothing; finished reports are serialized into
/// the sink under a single mutex. Reports keep the input order.
pub fn solve_batch(jobs: Vec<BatchJob>, timeout: Duration) -> Vec<BatchReport> {
    let sink: Mutex<Vec<(usize, BatchReport)>> = Mutex::new(Vec::with_capacity(jobs.len()));

    jobs.into_par_iter().enumerate().for_each(|(index, job)| {
        let started = Instant::now();
        let verdict = solve_with_timeout(&job, timeout);
        let report = BatchReport {
            seed: job.seed,
            verdict,
            elapsed: started.elapsed(),
        };
        sink.lock().expect("batch sink poisoned").push((index, report));
    });

    let mut reports = sink.into_inner().expect("batch sink poisoned");
    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

/// Runs one solve on a watchdog thread. On timeout the worker is abandoned
/// (its eventual result is discarded) and the seed reported unresolved.
fn solve_with_timeout(job: &BatchJob, timeout: Duration) -> BatchVerdict {
    let (tx, rx) = mpsc::channel();
    let instance = job.instance.clone();
    thread::spawn(move || {
        let result = solver::solve_instance(&instance);
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok((true, solution))) => {
            info!("seed {} is feasible", job.seed);
            match solution {
                Some(state) => BatchVerdict::Feasible(Box::new(state)),
                None => BatchVerdict::Unknown,
            }
        }
        Ok(Ok((false, _))) => {
            info!("seed {} is infeasible", job.seed);
            BatchVerdict::Infeasible
        }
        Ok(Err(err)) => {
            warn!("seed {} failed to solve: {err}", job.seed);
            BatchVerdict::Unknown
        }
        Err(_) => {
            warn!("seed {} timed out after {timeout:?}", job.seed);
            BatchVerdict::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    fn tiny_feasible_deck() -> Vec<Card> {
        "r1 y1 r2 y2 r3 y3 r4 y4 r5 y5"
            .split_whitespace()
            .map(|s| s.parse().unwrap())
            .collect()
    }

    #[test]
    fn batch_keeps_input_order_and_verdicts() {
        let feasible = Instance::builder(tiny_feasible_deck(), 2)
            .hand_size(1)
            .build()
            .unwrap();
        let mut bottom_heavy = tiny_feasible_deck();
        bottom_heavy.reverse();
        let infeasible = Instance::builder(bottom_heavy, 2)
            .hand_size(1)
            .build()
            .unwrap();

        let jobs = vec![
            BatchJob {
                seed: "good".into(),
                instance: feasible,
            },
            BatchJob {
                seed: "bad".into(),
                instance: infeasible,
            },
        ];
        let reports = solve_batch(jobs, Duration::from_secs(60));
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].seed, "good");
        assert!(matches!(reports[0].verdict, BatchVerdict::Feasible(_)));
        assert_eq!(reports[1].seed, "bad");
        assert!(matches!(reports[1].verdict, BatchVerdict::Infeasible));
    }
}
