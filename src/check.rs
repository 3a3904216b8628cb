use std::sync::Arc;

use log::{debug, info};

use crate::action::Action;
use crate::error::GameError;
use crate::instance::Instance;
use crate::solver;
use crate::state::GameState;

/// A replay as delivered by storage: the dealt instance plus the recorded
/// action sequence (terminal actions included in the basis).
#[derive(Clone, Debug)]
pub struct RecordedGame {
    pub instance: Instance,
    pub actions: Vec<Action>,
}

/// Outcome of checking a recorded game.
#[derive(Debug)]
pub struct CheckOutcome {
    /// 1-based turn whose action lost the game; 0 if the instance was
    /// infeasible from the start, `actions.len() + 1` if the recorded
    /// replay already wins.
    pub first_losing_turn: usize,
    /// A maximum-score replay extending the last winnable prefix.
    pub certificate: Option<GameState>,
}

/// Locates the maximal recorded prefix after which the game was still
/// winnable, bisecting with the feasibility oracle.
pub fn check_game(record: &RecordedGame) -> Result<CheckOutcome, GameError> {
    let instance = Arc::new(record.instance.clone());
    let total = record.actions.len();

    // A recorded win needs no solving at all.
    let mut replayed = GameState::new(Arc::clone(&instance));
    for &action in &record.actions {
        replayed.make_action(action)?;
    }
    if replayed.is_won() {
        debug!("recorded replay already wins with {total} actions");
        return Ok(CheckOutcome {
            first_losing_turn: total + 1,
            certificate: Some(replayed),
        });
    }

    let base = GameState::new(Arc::clone(&instance));
    let (solvable, solution) = solver::solve(&base)?;
    if !solvable {
        info!("instance is infeasible from the start");
        return Ok(CheckOutcome {
            first_losing_turn: 0,
            certificate: None,
        });
    }
    let mut certificate = solution;
    if total == 0 {
        return Ok(CheckOutcome {
            first_losing_turn: 1,
            certificate,
        });
    }

    // Invariant: the game is winnable after `lo` recorded actions and lost
    // after `hi`. `game` tracks the state after `lo` actions.
    let mut lo = 0usize;
    let mut hi = total;
    let mut game = base;

    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        let mut probe = game.clone();
        for &action in &record.actions[lo..mid] {
            probe.make_action(action)?;
        }
        debug!("probing feasibility after {mid} recorded actions");
        let (solvable, solution) = solver::solve(&probe)?;
        if solvable {
            certificate = solution;
            game = probe;
            lo = mid;
            debug!("still winnable after {mid} actions");
        } else {
            hi = mid;
            debug!("lost after {mid} actions");
        }
    }

    info!("first losing turn is {hi} of {total}");
    Ok(CheckOutcome {
        first_losing_turn: hi,
        certificate,
    })
}
