use varisat::{ExtendFormula, Lit};

use crate::action::PlayerId;
use crate::instance::Instance;
use crate::state::GameState;

/// CNF variable families for one feasibility query. Turns are indexed on
/// the absolute game clock: `t0` is the first turn to decide, `t0 - 1` the
/// fixed initial layer, `horizon` the exclusive upper bound. Integer
/// quantities (clues, pace, strikes, wasted clues) use unary order
/// encodings; layer accessors fold the fixed bounds and the initial state
/// into constant literals so clause emission never special-cases them.
pub(crate) struct Literals {
    pub t0: i32,
    pub horizon: i32,
    pub p0: usize,
    pub deck_size: usize,
    pub num_players: usize,
    pub starting_player: PlayerId,
    pub cap: i32,
    pub clue_cost: i32,
    pub num_strikes: i32,
    pub clues0: i32,
    pub pace0: i32,
    pub strikes0: i32,
    pub stacks0: Vec<u8>,
    pub num_suits: usize,
    /// Deck indices the player acting at turn `m` may still use from the
    /// initial deal: `holder_of[i]` for `i < p0`.
    pub holder_of: Vec<Option<PlayerId>>,
    /// Deck empty at `t0`: the extra-round layers are fixed exactly.
    pub deck_empty: bool,
    pub extra0: bool,
    pub dummy_from: i32,

    tru: Lit,
    use_card: Vec<Vec<Option<Lit>>>,
    use_le: Vec<Vec<Option<Lit>>>,
    draw: Vec<Vec<Lit>>,
    draw_ge: Vec<Vec<Option<Lit>>>,
    use_any: Vec<Lit>,
    play: Vec<Lit>,
    play5: Vec<Lit>,
    strike: Vec<Lit>,
    incr: Vec<Lit>,
    draw_any: Vec<Lit>,
    extra: Vec<Option<Lit>>,
    dummy: Vec<Option<Lit>>,
    clues_gt: Vec<Vec<Lit>>,
    pace_gt: Vec<Vec<Lit>>,
    strikes_ge: Vec<Vec<Lit>>,
    progress: Vec<Vec<Lit>>,
}

impl Literals {
    pub fn new(formula: &mut impl ExtendFormula, state: &GameState, tru: Lit) -> Self {
        let instance: &Instance = state.instance();
        let t0 = state.actions().len() as i32;
        let horizon = instance.max_winning_moves() as i32;
        let p0 = state.progress();
        let deck_size = instance.deck_size();
        let n = instance.num_players;
        let turns = (horizon - t0).max(0) as usize;
        let draw_width = deck_size - p0;

        let mut holder_of = vec![None; p0];
        for (player, hand) in state.hands().iter().enumerate() {
            for &held in hand {
                holder_of[held] = Some(player);
            }
        }

        let deck_empty = p0 == deck_size;
        let extra0 = state.remaining_extra_turns() <= n;
        let dummy_from = t0 + state.remaining_extra_turns() as i32;

        let mut lits = Self {
            t0,
            horizon,
            p0,
            deck_size,
            num_players: n,
            starting_player: instance.starting_player,
            cap: instance.clue_cap() as i32,
            clue_cost: instance.clue_cost() as i32,
            num_strikes: instance.num_strikes as i32,
            clues0: state.clues() as i32,
            pace0: state.pace(),
            strikes0: state.strikes() as i32,
            stacks0: state.stacks().to_vec(),
            num_suits: instance.num_suits,
            holder_of,
            deck_empty,
            extra0,
            dummy_from,
            tru,
            use_card: Vec::new(),
            use_le: Vec::new(),
            draw: Vec::new(),
            draw_ge: Vec::new(),
            use_any: Vec::new(),
            play: Vec::new(),
            play5: Vec::new(),
            strike: Vec::new(),
            incr: Vec::new(),
            draw_any: Vec::new(),
            extra: Vec::new(),
            dummy: Vec::new(),
            clues_gt: Vec::new(),
            pace_gt: Vec::new(),
            strikes_ge: Vec::new(),
            progress: Vec::new(),
        };

        for m in t0..horizon {
            let player = lits.player_of(m);
            let mut use_row: Vec<Option<Lit>> = Vec::with_capacity(deck_size);
            let mut le_row: Vec<Option<Lit>> = Vec::with_capacity(deck_size);
            for i in 0..deck_size {
                use_row.push(
                    (i >= p0 || lits.holder_of[i] == Some(player)).then(|| formula.new_lit()),
                );
                le_row.push((i >= p0 || lits.holder_of[i].is_some()).then(|| formula.new_lit()));
            }
            lits.use_card.push(use_row);
            lits.use_le.push(le_row);
            lits.draw
                .push((0..draw_width).map(|_| formula.new_lit()).collect());
            lits.use_any.push(formula.new_lit());
            lits.play.push(formula.new_lit());
            lits.play5.push(formula.new_lit());
            lits.strike.push(formula.new_lit());
            lits.incr.push(formula.new_lit());
            lits.draw_any.push(formula.new_lit());
            lits.extra.push(
                (!deck_empty && m - t0 >= draw_width as i32).then(|| formula.new_lit()),
            );
            lits.dummy.push(
                (!deck_empty && m - t0 >= (draw_width + n) as i32).then(|| formula.new_lit()),
            );
            lits.clues_gt
                .push((0..lits.cap).map(|_| formula.new_lit()).collect());
            lits.pace_gt
                .push((0..lits.pace0.max(0)).map(|_| formula.new_lit()).collect());
            lits.strikes_ge
                .push((1..lits.num_strikes).map(|_| formula.new_lit()).collect());
            lits.progress.push(
                (0..instance.num_suits * 5)
                    .map(|_| formula.new_lit())
                    .collect(),
            );
        }

        // draw_ge needs one extra layer (the boundary definition of draw at
        // the last turn references it).
        for m in t0..=horizon {
            let mut ge_row: Vec<Option<Lit>> = Vec::with_capacity(draw_width);
            for i in p0..deck_size {
                ge_row.push(lits.draw_ge_const(m, i).is_none().then(|| formula.new_lit()));
            }
            lits.draw_ge.push(ge_row);
        }

        debug_assert_eq!(turns, lits.use_any.len());
        debug_assert_eq!(state.turn(), lits.player_of(t0));
        lits
    }

    #[inline]
    pub fn tru(&self) -> Lit {
        self.tru
    }

    #[inline]
    pub fn fals(&self) -> Lit {
        !self.tru
    }

    #[inline]
    fn of(&self, value: bool) -> Lit {
        if value { self.tru } else { !self.tru }
    }

    #[inline]
    pub fn player_of(&self, m: i32) -> PlayerId {
        (self.starting_player + m as usize) % self.num_players
    }

    #[inline]
    fn l(&self, m: i32) -> usize {
        debug_assert!(m >= self.t0);
        (m - self.t0) as usize
    }

    /// `use[m, i]`: the card with deck index `i` is played or discarded at
    /// turn `m`. Constant false for cards no longer reachable by the
    /// player acting at `m`.
    pub fn use_card(&self, m: i32, i: usize) -> Lit {
        self.use_card[self.l(m)][i].unwrap_or(self.fals())
    }

    /// `use_le[m, i]`: card `i` has been used at turn `m` or earlier.
    pub fn use_le(&self, m: i32, i: usize) -> Lit {
        if m < self.t0 {
            return self.fals();
        }
        self.use_le[self.l(m)][i].unwrap_or(self.fals())
    }

    /// Deck indices that some turn may use.
    pub fn usable(&self, i: usize) -> bool {
        i >= self.p0 || self.holder_of[i].is_some()
    }

    /// `draw[m, i]`: card `i` is drawn at turn `m`. The card most recently
    /// drawn before `t0` is modeled as drawn at `t0 - 1` to anchor the
    /// ordering chain.
    pub fn draw(&self, m: i32, i: usize) -> Lit {
        if i < self.p0 {
            let synthetic = self.p0 > 0 && i == self.p0 - 1 && m == self.t0 - 1;
            return self.of(synthetic);
        }
        if m < self.t0 || m >= self.horizon {
            return self.fals();
        }
        self.draw[self.l(m)][i - self.p0]
    }

    fn draw_ge_const(&self, m: i32, i: usize) -> Option<bool> {
        // A single card is drawn per turn, so card i cannot come up before
        // t0 + (i - p0); and every remaining card must be drawn in time for
        // the full extra round to fit under the horizon.
        if m <= self.t0 + (i - self.p0) as i32 {
            Some(true)
        } else if self.horizon - self.num_players as i32 - m < (self.deck_size - i) as i32 {
            Some(false)
        } else {
            None
        }
    }

    /// `draw_ge[m, i]`: card `i` is drawn at turn `m` or later.
    pub fn draw_ge(&self, m: i32, i: usize) -> Lit {
        debug_assert!((self.p0..self.deck_size).contains(&i));
        if m < self.t0 {
            return self.tru;
        }
        if m > self.horizon {
            return self.fals();
        }
        match self.draw_ge_const(m, i) {
            Some(value) => self.of(value),
            None => self.draw_ge[self.l(m)][i - self.p0].expect("non-constant draw_ge slot"),
        }
    }

    pub fn use_any(&self, m: i32) -> Lit {
        self.use_any[self.l(m)]
    }

    pub fn play(&self, m: i32) -> Lit {
        self.play[self.l(m)]
    }

    pub fn play5(&self, m: i32) -> Lit {
        self.play5[self.l(m)]
    }

    pub fn strike(&self, m: i32) -> Lit {
        self.strike[self.l(m)]
    }

    pub fn incr_clues(&self, m: i32) -> Lit {
        self.incr[self.l(m)]
    }

    pub fn draw_any(&self, m: i32) -> Lit {
        self.draw_any[self.l(m)]
    }

    /// `extra_turn[m]`: turn `m` happens after the last card was drawn.
    pub fn extra(&self, m: i32) -> Lit {
        if m < self.t0 {
            return self.of(self.extra0);
        }
        if self.deck_empty {
            return self.tru;
        }
        self.extra[self.l(m)].unwrap_or(self.fals())
    }

    /// `dummy_turn[m]`: turn `m` lies beyond the true end of the game.
    pub fn dummy(&self, m: i32) -> Lit {
        if m < self.t0 {
            return self.fals();
        }
        if self.deck_empty {
            return self.of(m >= self.dummy_from);
        }
        self.dummy[self.l(m)].unwrap_or(self.fals())
    }

    /// `clues_gt[m, k]`: more than `k` clue units after turn `m`.
    pub fn clues_gt(&self, m: i32, k: i32) -> Lit {
        if k < 0 {
            return self.tru;
        }
        if k >= self.cap {
            return self.fals();
        }
        if m < self.t0 {
            return self.of(k < self.clues0);
        }
        self.clues_gt[self.l(m)][k as usize]
    }

    /// Exactly at the clue cap after turn `m`.
    pub fn at_cap(&self, m: i32) -> Lit {
        self.clues_gt(m, self.cap - 1)
    }

    /// `pace_gt[m, k]`: pace above `k` after turn `m`. Pace below zero is
    /// excluded outright, which halves the search space.
    pub fn pace_gt(&self, m: i32, k: i32) -> Lit {
        if k < 0 {
            return self.tru;
        }
        if k >= self.pace0 {
            return self.fals();
        }
        if m < self.t0 {
            return self.of(k < self.pace0);
        }
        self.pace_gt[self.l(m)][k as usize]
    }

    /// `strikes_ge[m, j]`: at least `j` strikes after turn `m`. Striking
    /// out is excluded outright.
    pub fn strikes_ge(&self, m: i32, j: i32) -> Lit {
        if j <= 0 {
            return self.tru;
        }
        if j >= self.num_strikes {
            return self.fals();
        }
        if m < self.t0 {
            return self.of(j <= self.strikes0);
        }
        self.strikes_ge[self.l(m)][(j - 1) as usize]
    }

    /// `progress[m, s, r]`: stack `s` has reached at least rank `r` after
    /// turn `m`.
    pub fn progress(&self, m: i32, suit: u8, rank: i32) -> Lit {
        if rank <= 0 {
            return self.tru;
        }
        if rank > 5 {
            return self.fals();
        }
        if m < self.t0 {
            return self.of(rank <= self.stacks0[suit as usize] as i32);
        }
        self.progress[self.l(m)][suit as usize * 5 + (rank - 1) as usize]
    }
}
