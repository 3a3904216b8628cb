use varisat::{CnfFormula, ExtendFormula, Lit};

use crate::card::Card;
use crate::instance::Instance;
use crate::state::GameState;

use super::literals::Literals;

/// Builds the CNF whose models are the winning continuations of a state.
pub(crate) struct Encoder<'a> {
    instance: &'a Instance,
    pub formula: CnfFormula,
    pub lits: Literals,
}

impl<'a> Encoder<'a> {
    pub fn new(state: &'a GameState) -> Self {
        let mut formula = CnfFormula::new();
        let tru = formula.new_lit();
        formula.add_clause(&[tru]);
        let lits = Literals::new(&mut formula, state, tru);
        Self {
            instance: state.instance().as_ref(),
            formula,
            lits,
        }
    }

    /// Emits every clause family. Afterwards the formula is ready to solve.
    pub fn encode(&mut self) {
        let t0 = self.lits.t0;
        let horizon = self.lits.horizon;

        self.draw_window_check();
        for m in t0..horizon {
            self.action_shape(m);
            self.draw_ordering(m);
            self.use_linkage(m);
            self.uniqueness(m);
            self.playability(m);
            self.progress_transition(m);
            self.clue_economy(m);
            self.strike_rules(m);
            self.pace_rules(m);
            self.round_chains(m);
        }
        // The boundary definition of draws needs the layer at the horizon.
        self.draw_boundary(horizon);
        self.win_condition();
        self.eventual_use();
        self.earliest_draws();
        self.pace_at_draw();
        if t0 == 0 {
            self.game_length(0);
            self.game_length(1);
        }
    }

    /// Clause with constant folding: satisfied clauses are dropped, false
    /// literals removed. An emptied clause makes the formula unsatisfiable.
    fn clause(&mut self, lits: &[Lit]) {
        let tru = self.lits.tru();
        let mut out: Vec<Lit> = Vec::with_capacity(lits.len());
        for &lit in lits {
            if lit == tru {
                return;
            }
            if lit == !tru {
                continue;
            }
            out.push(lit);
        }
        self.formula.add_clause(&out);
    }

    /// `a <-> b` under the guard literals (each guard clause side carries
    /// the negated guards).
    fn guarded_eq(&mut self, guards: &[Lit], a: Lit, b: Lit) {
        let mut first: Vec<Lit> = guards.to_vec();
        first.push(!a);
        first.push(b);
        self.clause(&first);
        let mut second: Vec<Lit> = guards.to_vec();
        second.push(a);
        second.push(!b);
        self.clause(&second);
    }

    fn add_at_most_one(&mut self, items: &[Lit]) {
        let tru = self.lits.tru();
        let active: Vec<Lit> = items
            .iter()
            .copied()
            .filter(|&l| l != !tru && l != tru)
            .collect();
        if active.len() <= 1 {
            return;
        }
        if active.len() <= 4 {
            for (a, &x) in active.iter().enumerate() {
                for &y in &active[a + 1..] {
                    self.clause(&[!x, !y]);
                }
            }
            return;
        }
        // Sequential (ladder) encoding: aux[j] == "some item <= j is set".
        let aux: Vec<Lit> = (0..active.len() - 1)
            .map(|_| self.formula.new_lit())
            .collect();
        for j in 0..active.len() {
            if j < aux.len() {
                self.clause(&[!active[j], aux[j]]);
            }
            if j > 0 && j < aux.len() {
                self.clause(&[!aux[j - 1], aux[j]]);
            }
            if j > 0 {
                self.clause(&[!active[j], !aux[j - 1]]);
            }
        }
    }

    /// Every remaining card needs enough turns to be drawn before the extra
    /// round; a wasteful prefix can make that impossible outright.
    fn draw_window_check(&mut self) {
        let lits = &self.lits;
        if lits.p0 < lits.deck_size {
            let slack = lits.horizon
                - lits.num_players as i32
                - (lits.deck_size - lits.p0) as i32
                - lits.t0;
            if slack < 0 {
                self.formula.add_clause(&[]);
            }
        }
    }

    /// Mutual exclusion of the three turn shapes and the draw bookkeeping:
    /// a turn is a clue (possibly a dummy) or uses exactly one card, and
    /// uses draw unless the extra round has started.
    fn action_shape(&mut self, m: i32) {
        let use_any = self.lits.use_any(m);
        let draw_any = self.lits.draw_any(m);
        let play = self.lits.play(m);
        let play5 = self.lits.play5(m);
        let dummy = self.lits.dummy(m);
        let extra = self.lits.extra(m);
        let uses: Vec<Lit> = (0..self.lits.deck_size)
            .map(|i| self.lits.use_card(m, i))
            .collect();
        let draws: Vec<Lit> = (self.lits.p0..self.lits.deck_size)
            .map(|i| self.lits.draw(m, i))
            .collect();
        let fives: Vec<Lit> = (0..self.lits.deck_size)
            .filter(|&i| self.instance.deck[i].is_five())
            .map(|i| self.lits.use_card(m, i))
            .collect();

        self.clause(&[!dummy, !use_any]);
        self.clause(&[!play, use_any]);
        self.clause(&[!draw_any, use_any]);
        self.clause(&[!use_any, extra, draw_any]);

        let mut any = vec![!use_any];
        any.extend(uses.iter().copied());
        self.clause(&any);
        for &u in &uses {
            self.clause(&[!u, use_any]);
        }
        self.add_at_most_one(&uses);

        let mut any_draw = vec![!draw_any];
        any_draw.extend(draws.iter().copied());
        self.clause(&any_draw);
        for &d in &draws {
            self.clause(&[!d, draw_any]);
        }
        self.add_at_most_one(&draws);

        // play5 <-> play and the used card is a five.
        self.clause(&[!play5, play]);
        let mut five_any = vec![!play5];
        five_any.extend(fives.iter().copied());
        self.clause(&five_any);
        for &f in &fives {
            self.clause(&[!play, !f, play5]);
        }
    }

    /// `draw_ge` is monotone in the turn, respects deck order, and `draw`
    /// is its boundary.
    fn draw_ordering(&mut self, m: i32) {
        for i in self.lits.p0..self.lits.deck_size {
            let ge_now = self.lits.draw_ge(m, i);
            let ge_prev = self.lits.draw_ge(m - 1, i);
            self.clause(&[!ge_now, ge_prev]);
            if i > self.lits.p0 {
                let prev_card = self.lits.draw_ge(m - 1, i - 1);
                self.clause(&[!prev_card, ge_now]);
            }
        }
        self.draw_boundary(m);
    }

    fn draw_boundary(&mut self, m: i32) {
        // draw[m-1, i] <-> draw_ge[m-1, i] and not draw_ge[m, i].
        for i in self.lits.p0..self.lits.deck_size {
            let draw = self.lits.draw(m - 1, i);
            let ge_prev = self.lits.draw_ge(m - 1, i);
            let ge_now = self.lits.draw_ge(m, i);
            self.clause(&[!draw, ge_prev]);
            self.clause(&[!draw, !ge_now]);
            self.clause(&[draw, !ge_prev, ge_now]);
        }
    }

    /// A used card was drawn by the same player on an earlier turn, or is
    /// part of that player's current hand (encoded in the variable domain).
    fn use_linkage(&mut self, m: i32) {
        let n = self.lits.num_players as i32;
        for i in self.lits.p0..self.lits.deck_size {
            let mut clause = vec![!self.lits.use_card(m, i)];
            let mut m0 = m - n;
            while m0 >= self.lits.t0 {
                clause.push(self.lits.draw(m0, i));
                m0 -= n;
            }
            self.clause(&clause);
        }
    }

    /// `use_le` is the monotone closure of `use`; no card is used twice.
    fn uniqueness(&mut self, m: i32) {
        for i in 0..self.lits.deck_size {
            if !self.lits.usable(i) {
                continue;
            }
            let use_now = self.lits.use_card(m, i);
            let le_now = self.lits.use_le(m, i);
            let le_prev = self.lits.use_le(m - 1, i);
            self.clause(&[!le_now, le_prev, use_now]);
            self.clause(&[!le_prev, le_now]);
            self.clause(&[!use_now, le_now]);
            self.clause(&[!use_now, !le_prev]);
        }
    }

    /// Successful plays demand the exact stack height; strikes must target
    /// a card that is not currently playable (the engine cannot fail an
    /// eligible card).
    fn playability(&mut self, m: i32) {
        let play = self.lits.play(m);
        let strike = self.lits.strike(m);
        for i in 0..self.lits.deck_size {
            if !self.lits.usable(i) {
                continue;
            }
            let card = self.instance.deck[i];
            let use_card = self.lits.use_card(m, i);
            let below = self.lits.progress(m - 1, card.suit, card.rank as i32 - 1);
            let reached = self.lits.progress(m - 1, card.suit, card.rank as i32);
            self.clause(&[!use_card, !play, below]);
            self.clause(&[!use_card, !play, !reached]);
            self.clause(&[!use_card, !strike, !below, reached]);
        }
    }

    /// Progress is monotone and increases exactly through plays.
    fn progress_transition(&mut self, m: i32) {
        let play = self.lits.play(m);
        for suit in 0..self.lits.num_suits as u8 {
            for rank in 1..=5 {
                let now = self.lits.progress(m, suit, rank);
                let prev = self.lits.progress(m - 1, suit, rank);
                self.clause(&[!prev, now]);

                let copies: Vec<Lit> = (0..self.lits.deck_size)
                    .filter(|&i| self.instance.deck[i] == Card::new(suit, rank as u8))
                    .map(|i| self.lits.use_card(m, i))
                    .collect();
                for &copy in &copies {
                    self.clause(&[!play, !copy, now]);
                }
                self.clause(&[!now, prev, play]);
                let mut frame = vec![!now, prev];
                frame.extend(copies);
                self.clause(&frame);
            }
        }
    }

    /// Unary clue chain: clue turns pay the cost, discards and non-capped
    /// five plays restore one unit, everything else leaves it unchanged.
    fn clue_economy(&mut self, m: i32) {
        let use_any = self.lits.use_any(m);
        let dummy = self.lits.dummy(m);
        let play = self.lits.play(m);
        let play5 = self.lits.play5(m);
        let incr = self.lits.incr_clues(m);
        let at_cap = self.lits.at_cap(m - 1);
        let cost = self.lits.clue_cost;
        let cap = self.lits.cap;

        // incr <-> used a card, not at cap, and any play was a five that
        // still grants a clue.
        self.clause(&[!incr, use_any]);
        self.clause(&[!incr, !at_cap]);
        if self.instance.fives_give_clue {
            self.clause(&[!incr, !play, play5]);
            self.clause(&[!use_any, at_cap, play, incr]);
            self.clause(&[!use_any, at_cap, !play5, incr]);
        } else {
            self.clause(&[!incr, !play]);
            self.clause(&[!use_any, at_cap, play, incr]);
        }

        for k in -1..cap {
            let now = self.lits.clues_gt(m, k);
            // Clue turn: drop by the clue cost (also enforces the minimum).
            let prev_paid = self.lits.clues_gt(m - 1, k + cost);
            self.guarded_eq(&[use_any, dummy], now, prev_paid);
            // Restored unit.
            let prev_gain = self.lits.clues_gt(m - 1, k - 1);
            self.guarded_eq(&[!incr], now, prev_gain);
            // Unchanged.
            let prev = self.lits.clues_gt(m - 1, k);
            self.guarded_eq(&[!use_any, incr], now, prev);
            self.guarded_eq(&[!dummy], now, prev);
        }
    }

    /// Strikes happen exactly on non-play uses at the clue cap (delaying
    /// misplays until the cap loses no solutions) and never reach the
    /// strike limit.
    fn strike_rules(&mut self, m: i32) {
        let strike = self.lits.strike(m);
        let use_any = self.lits.use_any(m);
        let play = self.lits.play(m);
        let at_cap = self.lits.at_cap(m - 1);
        let num_strikes = self.lits.num_strikes;

        self.clause(&[!strike, use_any]);
        self.clause(&[!strike, !play]);
        self.clause(&[!strike, at_cap]);
        self.clause(&[!use_any, play, !at_cap, strike]);

        for j in 1..=num_strikes {
            let now = self.lits.strikes_ge(m, j);
            let prev = self.lits.strikes_ge(m - 1, j);
            let prev_below = self.lits.strikes_ge(m - 1, j - 1);
            self.clause(&[!now, prev, prev_below]);
            self.clause(&[!now, prev, strike]);
            self.clause(&[!prev, now]);
            self.clause(&[!prev_below, !strike, now]);
        }
    }

    /// Pace drops on discards and misplays, with a hard floor at zero.
    fn pace_rules(&mut self, m: i32) {
        let use_any = self.lits.use_any(m);
        let play = self.lits.play(m);
        for k in -1..self.lits.pace0 {
            let now = self.lits.pace_gt(m, k);
            let prev = self.lits.pace_gt(m - 1, k);
            let prev_paid = self.lits.pace_gt(m - 1, k + 1);
            self.guarded_eq(&[use_any], now, prev);
            self.guarded_eq(&[!play], now, prev);
            self.guarded_eq(&[!use_any, play], now, prev_paid);
        }
    }

    /// Extra-round and dummy-turn chains. Skipped when the deck is already
    /// empty: the layers are then fixed from `remaining_extra_turns`.
    fn round_chains(&mut self, m: i32) {
        if self.lits.deck_empty {
            return;
        }
        let last = self.lits.deck_size - 1;
        let extra = self.lits.extra(m);
        let extra_prev = self.lits.extra(m - 1);
        let last_drawn = self.lits.draw(m - 1, last);
        let dummy = self.lits.dummy(m);
        let dummy_prev = self.lits.dummy(m - 1);
        let round_over = self
            .lits
            .draw(m - 1 - self.lits.num_players as i32, last);

        self.clause(&[!extra, extra_prev, last_drawn]);
        self.clause(&[!extra_prev, extra]);
        self.clause(&[!last_drawn, extra]);

        self.clause(&[!dummy, dummy_prev, round_over]);
        self.clause(&[!dummy_prev, dummy]);
        self.clause(&[!round_over, dummy]);
    }

    fn win_condition(&mut self) {
        for suit in 0..self.lits.num_suits as u8 {
            let done = self.lits.progress(self.lits.horizon - 1, suit, 5);
            self.clause(&[done]);
        }
    }

    /// Every still-needed card value must eventually be used (its played
    /// copy is). Redundant, but guides the solver and fails fast when all
    /// copies of a needed card are gone.
    fn eventual_use(&mut self) {
        let last = self.lits.horizon - 1;
        for suit in 0..self.lits.num_suits as u8 {
            for rank in (self.lits.stacks0[suit as usize] + 1)..=5 {
                let mut clause = Vec::new();
                for i in 0..self.lits.deck_size {
                    if self.instance.deck[i] == Card::new(suit, rank) && self.lits.usable(i) {
                        clause.push(self.lits.use_le(last, i));
                    }
                }
                self.clause(&clause);
            }
        }
    }

    /// Per-card lower bounds on the draw turn, from counting how many plays
    /// the prefix sub-deck can fund; tightened for near-maximal games.
    fn earliest_draws(&mut self) {
        for i in self.lits.p0..self.lits.deck_size {
            let floor = min_turn(self.instance, i, None);
            if floor > self.lits.t0 {
                let ge = self.lits.draw_ge(floor, i);
                self.clause(&[ge]);
            }
            for k in 0..2 {
                let floor = min_turn(self.instance, i, Some(k));
                if floor > self.lits.t0 {
                    let long_game = self.lits.dummy(self.lits.horizon - 1 - k);
                    let ge = self.lits.draw_ge(floor, i);
                    self.clause(&[long_game, ge]);
                }
            }
        }
    }

    /// Drawing a card late in the deck caps the pace and forces stacks to
    /// have kept up with the draw depth: by the (depth+1)-th draw the other
    /// suits can have absorbed at most their prefix maxima in plays, and
    /// discards at most the initial pace.
    fn pace_at_draw(&mut self) {
        for i in self.lits.p0..self.lits.deck_size {
            let scores = max_scores(self.instance, i);
            let total: i32 = scores.iter().map(|&s| s as i32).sum();
            let depth = (i - self.instance.num_dealt_cards()) as i32;
            let pace_cap = max_pace(self.instance, i);
            for m in self.lits.t0..self.lits.horizon {
                let draw = self.lits.draw(m, i);
                let over_cap = self.lits.pace_gt(m, pace_cap);
                self.clause(&[!draw, !over_cap]);
                for (suit, &score) in scores.iter().enumerate() {
                    let required =
                        score as i32 + depth + 1 - total - self.instance.initial_pace();
                    if required > 0 {
                        let reached = self.lits.progress(m, suit as u8, required);
                        self.clause(&[!draw, reached]);
                    }
                }
            }
        }
    }

    /// Waste accounting for games within `k` turns of the maximum length:
    /// at most `k + 1 + n/5` clues may be wasted (strikes, five plays at
    /// the cap, suits whose five misses the final round). Emitted for
    /// fresh starts only, where the zero-waste anchor is exact.
    fn game_length(&mut self, k: i32) {
        let l = &self.lits;
        let horizon = l.horizon;
        let n = l.num_players as i32;
        let suits = l.num_suits;
        let late_five_layer = horizon - n - 3 - k;
        if late_five_layer < l.t0 - 1 || horizon - 1 - k < l.t0 {
            return;
        }

        if k == 0 {
            let full_length = self.lits.dummy(horizon - 1);
            for m in self.lits.t0..horizon {
                let strike = self.lits.strike(m);
                self.clause(&[full_length, !strike]);
                let play5 = self.lits.play5(m);
                let at_cap = self.lits.at_cap(m - 1);
                self.clause(&[full_length, !play5, !at_cap]);
            }
            // In a full-length game, at most 1 + n/5 suits may finish their
            // five after the final round begins: every larger subset holds
            // a finished one.
            let late_budget = (1 + n / 5) as usize;
            if suits > late_budget {
                let fives: Vec<Lit> = (0..suits)
                    .map(|s| self.lits.progress(late_five_layer, s as u8, 5))
                    .collect();
                let mut subset = vec![0usize; late_budget + 1];
                self.forbid_all_late(&fives, &mut subset, 0, 0, full_length);
            }
            return;
        }

        // Unary wasted-clue counter across the turns, then one step per
        // suit for fives missing the final round.
        let budget = k + 1 + n / 5;
        let width = (budget + 1) as usize;
        let layers = (horizon - l.t0) as usize + suits;
        let mut counter: Vec<Vec<Lit>> = Vec::with_capacity(layers);
        for _ in 0..layers {
            counter.push((0..width).map(|_| self.formula.new_lit()).collect());
        }
        let gt = |counter: &Vec<Vec<Lit>>, layer: i32, k: i32, fals: Lit, tru_: Lit| -> Lit {
            debug_assert!(k < width as i32);
            if k < 0 {
                return tru_;
            }
            if layer < 0 {
                return fals;
            }
            counter[layer as usize][k as usize]
        };
        let tru = self.lits.tru();
        let fals = !tru;

        for m in self.lits.t0..horizon {
            let layer = m - self.lits.t0;
            let strike = self.lits.strike(m);
            let play5 = self.lits.play5(m);
            let at_cap = self.lits.at_cap(m - 1);
            let waste = self.formula.new_lit();
            self.clause(&[!strike, waste]);
            self.clause(&[!play5, !at_cap, waste]);
            self.clause(&[!waste, strike, play5]);
            self.clause(&[!waste, strike, at_cap]);
            for kk in 0..width as i32 {
                let now = gt(&counter, layer, kk, fals, tru);
                let prev = gt(&counter, layer - 1, kk, fals, tru);
                let prev_below = gt(&counter, layer - 1, kk - 1, fals, tru);
                self.guarded_eq(&[!waste], now, prev_below);
                self.guarded_eq(&[waste], now, prev);
            }
        }
        for s in 0..suits {
            let layer = (horizon - self.lits.t0) + s as i32;
            let five_done = self.lits.progress(late_five_layer, s as u8, 5);
            for kk in 0..width as i32 {
                let now = gt(&counter, layer, kk, fals, tru);
                let prev = gt(&counter, layer - 1, kk, fals, tru);
                let prev_below = gt(&counter, layer - 1, kk - 1, fals, tru);
                self.guarded_eq(&[five_done], now, prev_below);
                self.guarded_eq(&[!five_done], now, prev);
            }
        }

        // A game of exactly `horizon - k` turns keeps the waste in budget.
        let boundary_real = self.lits.dummy(horizon - 1 - k);
        let boundary_dummy = self.lits.dummy(horizon - k);
        let total_over = gt(&counter, layers as i32 - 1, budget, fals, tru);
        self.clause(&[boundary_real, !boundary_dummy, !total_over]);
    }

    /// Emits, for every subset of `subset.len()` suits, the clause "one of
    /// these finished its five in time, unless the game is short".
    fn forbid_all_late(
        &mut self,
        fives: &[Lit],
        subset: &mut Vec<usize>,
        depth: usize,
        start: usize,
        full_length: Lit,
    ) {
        if depth == subset.len() {
            let mut clause = vec![full_length];
            clause.extend(subset.iter().map(|&s| fives[s]));
            self.clause(&clause);
            return;
        }
        for s in start..fives.len() {
            subset[depth] = s;
            self.forbid_all_late(fives, subset, depth + 1, s + 1, full_length);
        }
    }
}

/// Highest rank each suit can have reached before card `i` is drawn.
pub(crate) fn max_scores(instance: &Instance, i: usize) -> Vec<u8> {
    let mut seen = vec![[false; 6]; instance.num_suits];
    for &card in &instance.deck[..i] {
        seen[card.suit as usize][card.rank as usize] = true;
    }
    seen.iter()
        .map(|ranks| {
            let mut top = 0u8;
            while top < 5 && ranks[(top + 1) as usize] {
                top += 1;
            }
            top
        })
        .collect()
}

/// Highest pace still possible when card `i` is drawn.
pub(crate) fn max_pace(instance: &Instance, i: usize) -> i32 {
    let depth = (i - instance.num_dealt_cards()) as i32;
    let total: i32 = max_scores(instance, i).iter().map(|&s| s as i32).sum();
    instance.initial_pace() - (depth + 1 - total).max(0)
}

/// Earliest turn at which card `i` can be drawn; with `near_max = Some(k)`,
/// for games at most `k` turns short of the maximum length.
pub(crate) fn min_turn(instance: &Instance, i: usize, near_max: Option<i32>) -> i32 {
    let depth = (i - instance.num_dealt_cards()) as i32;
    let scores = max_scores(instance, i);
    let score: i32 = scores.iter().map(|&s| s as i32).sum();
    let possible_five_plays = scores.iter().filter(|&&s| s == 5).count() as i32;
    let minimum_five_plays = (possible_five_plays - max_pace(instance, i)).max(0);
    let clues_modifier = match near_max {
        None => -2,
        Some(k) => (minimum_five_plays - k).max(-2),
    };
    depth + (depth + 1 - score + clues_modifier).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::standard_deck;

    #[test]
    fn max_scores_reads_the_prefix() {
        let instance = Instance::new(standard_deck(5, 0), 4).unwrap();
        // The unshuffled deck lists suit 0 completely before suit 1.
        let scores = max_scores(&instance, 10);
        assert_eq!(scores, vec![5, 0, 0, 0, 0]);
        let scores = max_scores(&instance, 3);
        assert_eq!(scores, vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn min_turn_grows_with_depth() {
        let instance = Instance::new(standard_deck(5, 0), 4).unwrap();
        let dealt = instance.num_dealt_cards();
        assert_eq!(min_turn(&instance, dealt, None), 0);
        let deep = min_turn(&instance, 49, None);
        assert!(deep >= (49 - dealt) as i32);
    }
}
