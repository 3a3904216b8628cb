use std::sync::Arc;

use log::debug;

use crate::analyzer::analyze;
use crate::error::GameError;
use crate::greedy::GreedyStrategy;
use crate::instance::Instance;
use crate::sat;
use crate::state::GameState;

/// Greedy prefixes to try before falling back to a full SAT solve: run the
/// strategy until this many cards remain, then hand over to the encoder.
const GREEDY_CUTOFFS: [usize; 2] = [0, 20];

/// Feasibility of a position: winnable from here (with a certificate), or
/// not. Timeouts are reported separately by the batch layer.
pub fn solve(state: &GameState) -> Result<(bool, Option<GameState>), GameError> {
    if state.is_over() {
        return Ok((state.is_won(), state.is_won().then(|| state.clone())));
    }

    // Fast path: the static sieve can certify fresh instances infeasible.
    if state.actions().is_empty() {
        let result = analyze(state.instance(), false);
        if result.is_infeasible() {
            debug!("infeasible by static analysis: {:?}", result.reasons);
            return Ok((false, None));
        }
    }

    // Warm attempts: a greedy prefix either wins outright or seeds the
    // encoder with a shorter remaining game.
    for cutoff in GREEDY_CUTOFFS {
        let mut attempt = state.clone();
        GreedyStrategy::new().run(&mut attempt, Some(cutoff))?;
        if attempt.is_won() {
            debug!("greedy won with cutoff {cutoff}");
            return Ok((true, Some(attempt)));
        }
        if !attempt.is_over() && cutoff != 0 {
            let (solvable, solution) = sat::solve(&attempt)?;
            if solvable {
                debug!("sat solved the greedy warm start at cutoff {cutoff}");
                return Ok((true, solution));
            }
        }
    }

    // Full solve from the starting position.
    sat::solve(state)
}

/// Convenience entry for whole instances.
pub fn solve_instance(instance: &Instance) -> Result<(bool, Option<GameState>), GameError> {
    solve(&GameState::new(Arc::new(instance.clone())))
}
