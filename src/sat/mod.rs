mod encode;
mod literals;

use log::{debug, trace};
use varisat::{Lit, Solver};

use crate::error::GameError;
use crate::state::GameState;

use encode::Encoder;
use literals::Literals;

/// Decides whether the given position admits a winning continuation, and
/// decodes one into a full replay if so. A fresh solver is constructed per
/// call and dropped with it.
pub fn solve(state: &GameState) -> Result<(bool, Option<GameState>), GameError> {
    if state.is_over() {
        return Ok((state.is_won(), state.is_won().then(|| state.clone())));
    }
    if state.pace() < 0 {
        return Ok((false, None));
    }
    if state.actions().len() as i32 >= state.instance().max_winning_moves() as i32 {
        return Ok((false, None));
    }

    let mut encoder = Encoder::new(state);
    encoder.encode();
    let Encoder { formula, lits, .. } = encoder;
    debug!(
        "sat query: {} vars, {} clauses, turns {}..{}",
        formula.var_count(),
        formula.len(),
        lits.t0,
        lits.horizon
    );

    let mut solver = Solver::new();
    solver.add_formula(&formula);
    let satisfiable = solver
        .solve()
        .map_err(|e| GameError::SatBackend(e.to_string()))?;
    if !satisfiable {
        return Ok((false, None));
    }

    let model = solver
        .model()
        .ok_or_else(|| GameError::SatBackend("satisfiable but no model".into()))?;
    let assignment = Assignment::new(model);
    let solution = decode(state, &lits, &assignment)?;
    if !solution.is_won() {
        return Err(GameError::ModelMismatch(
            "decoded replay does not reach the maximum score",
        ));
    }
    Ok((true, Some(solution)))
}

struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    fn new(model: Vec<Lit>) -> Self {
        let max_index = model
            .iter()
            .map(|l| l.var().index())
            .max()
            .map_or(0, |i| i + 1);
        let mut values = vec![false; max_index];
        for lit in model {
            values[lit.var().index()] = lit.is_positive();
        }
        Self { values }
    }

    fn is_true(&self, lit: Lit) -> bool {
        self.values
            .get(lit.var().index())
            .map(|&v| v == lit.is_positive())
            .unwrap_or(false)
    }
}

/// Replays the model on a clone of the starting state: stop at the first
/// dummy turn, otherwise clue, play or discard as assigned.
fn decode(
    state: &GameState,
    lits: &Literals,
    assignment: &Assignment,
) -> Result<GameState, GameError> {
    let mut replay = state.clone();
    for m in lits.t0..lits.horizon {
        if assignment.is_true(lits.dummy(m)) || replay.is_over() {
            break;
        }
        if assignment.is_true(lits.use_any(m)) {
            let target = (0..lits.deck_size)
                .find(|&i| lits.usable(i) && assignment.is_true(lits.use_card(m, i)))
                .ok_or(GameError::ModelMismatch("use turn without a used card"))?;
            if assignment.is_true(lits.play(m)) || assignment.is_true(lits.strike(m)) {
                trace!("decode turn {m}: play {target}");
                replay.play(target)?;
            } else {
                trace!("decode turn {m}: discard {target}");
                replay.discard(target)?;
            }
        } else {
            trace!("decode turn {m}: clue");
            replay.clue()?;
        }
    }
    Ok(replay)
}
