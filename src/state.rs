use std::sync::Arc;

use serde_json::{Value, json};

use crate::action::{Action, PlayerId};
use crate::card::Card;
use crate::error::GameError;
use crate::instance::Instance;

const PLAYER_NAMES: [&str; 6] = ["Alice", "Bob", "Cathy", "Donald", "Emily", "Frank"];

/// Mutable state of a running game. Hands and trash store deck indices so
/// that physical copies of equal cards stay distinguishable; the shared
/// immutable deck lives on the instance.
#[derive(Clone, Debug)]
pub struct GameState {
    instance: Arc<Instance>,
    hands: Vec<Vec<usize>>,
    stacks: Vec<u8>,
    progress: usize,
    turn: PlayerId,
    clues: u8,
    strikes: u8,
    pace: i32,
    remaining_extra_turns: usize,
    trash: Vec<usize>,
    in_lost_state: bool,
    over: bool,
    actions: Vec<Action>,
}

impl GameState {
    pub fn new(instance: Arc<Instance>) -> Self {
        let hands = (0..instance.num_players)
            .map(|p| instance.starting_hand(p).collect())
            .collect();
        Self {
            hands,
            stacks: vec![0; instance.num_suits],
            progress: instance.num_dealt_cards(),
            turn: instance.starting_player,
            clues: instance.clue_cap(),
            strikes: 0,
            pace: instance.initial_pace(),
            remaining_extra_turns: instance.num_players + 1,
            trash: Vec::new(),
            in_lost_state: false,
            over: false,
            actions: Vec::new(),
            instance,
        }
    }

    // Read access

    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    pub fn hands(&self) -> &[Vec<usize>] {
        &self.hands
    }

    pub fn cur_hand(&self) -> &[usize] {
        &self.hands[self.turn]
    }

    pub fn stacks(&self) -> &[u8] {
        &self.stacks
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn turn(&self) -> PlayerId {
        self.turn
    }

    /// Clue count in internal units (half-clues when clue-starved).
    pub fn clues(&self) -> u8 {
        self.clues
    }

    pub fn strikes(&self) -> u8 {
        self.strikes
    }

    pub fn pace(&self) -> i32 {
        self.pace
    }

    pub fn remaining_extra_turns(&self) -> usize {
        self.remaining_extra_turns
    }

    pub fn trash(&self) -> &[usize] {
        &self.trash
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn card(&self, deck_index: usize) -> Card {
        self.instance.deck[deck_index]
    }

    pub fn score(&self) -> usize {
        if self.strikes >= self.instance.num_strikes {
            return 0;
        }
        self.stacks.iter().map(|&s| s as usize).sum()
    }

    pub fn is_over(&self) -> bool {
        self.over || self.in_lost_state
    }

    pub fn is_won(&self) -> bool {
        self.score() == self.instance.max_score()
    }

    pub fn is_known_lost(&self) -> bool {
        self.in_lost_state
    }

    /// Marks the state as unwinnable from here on (used by strategies).
    pub fn mark_lost(&mut self) {
        self.in_lost_state = true;
    }

    pub fn is_in_extra_round(&self) -> bool {
        self.remaining_extra_turns <= self.instance.num_players
    }

    pub fn draw_pile_size(&self) -> usize {
        self.instance.deck_size() - self.progress
    }

    pub fn is_playable(&self, card: Card) -> bool {
        self.stacks[card.suit as usize] + 1 == card.rank
    }

    pub fn is_trash_card(&self, card: Card) -> bool {
        self.stacks[card.suit as usize] >= card.rank
    }

    /// True if this is the last usable copy of a still-needed card.
    pub fn is_critical(&self, card: Card) -> bool {
        if self.is_trash_card(card) {
            return false;
        }
        let held = self
            .hands
            .iter()
            .flatten()
            .filter(|&&i| self.card(i) == card)
            .count();
        let in_deck = self.instance.deck[self.progress..]
            .iter()
            .filter(|&&c| c == card)
            .count();
        held + in_deck == 1
    }

    /// Players currently holding a copy of the given card value.
    pub fn holding_players(&self, card: Card) -> impl Iterator<Item = PlayerId> + '_ {
        self.hands
            .iter()
            .enumerate()
            .filter(move |(_, hand)| hand.iter().any(|&i| self.card(i) == card))
            .map(|(player, _)| player)
    }

    // State changes

    pub fn make_action(&mut self, action: Action) -> Result<(), GameError> {
        match action {
            Action::Play { target } => self.play(target),
            Action::Discard { target } => self.discard(target),
            Action::ColorClue { player, .. } | Action::RankClue { player, .. } => {
                self.ensure_running()?;
                if player >= self.instance.num_players {
                    return Err(GameError::InvalidPlayer(player));
                }
                if self.clues < self.instance.clue_cost() {
                    return Err(GameError::NoCluesAvailable);
                }
                self.actions.push(action);
                self.clues -= self.instance.clue_cost();
                self.advance_turn();
                Ok(())
            }
            Action::EndGame { .. } | Action::VoteTerminate { .. } => {
                self.ensure_running()?;
                self.actions.push(action);
                self.over = true;
                Ok(())
            }
        }
    }

    /// Plays the card with the given deck index from the current hand.
    pub fn play(&mut self, deck_index: usize) -> Result<(), GameError> {
        self.ensure_running()?;
        let allow_not_present = self.instance.deck_plays
            && deck_index == self.instance.deck_size() - 1
            && self.progress == self.instance.deck_size() - 1;
        if !allow_not_present && !self.cur_hand().contains(&deck_index) {
            return Err(GameError::CardNotInHand(deck_index));
        }

        let card = self.card(deck_index);
        if self.is_playable(card) {
            self.stacks[card.suit as usize] += 1;
            if card.is_five()
                && self.instance.fives_give_clue
                && self.clues < self.instance.clue_cap()
            {
                self.clues += 1;
            }
        } else {
            self.strikes += 1;
            self.trash.push(deck_index);
            self.pace -= 1;
        }
        self.actions.push(Action::Play { target: deck_index });
        self.replace(deck_index, allow_not_present);
        self.advance_turn();
        if self.stacks.iter().all(|&s| s == 5) || self.strikes >= self.instance.num_strikes {
            self.over = true;
        }
        Ok(())
    }

    /// Discards the card with the given deck index from the current hand.
    pub fn discard(&mut self, deck_index: usize) -> Result<(), GameError> {
        self.ensure_running()?;
        if self.clues >= self.instance.clue_cap() {
            return Err(GameError::DiscardAtClueCap);
        }
        if !self.cur_hand().contains(&deck_index) {
            return Err(GameError::CardNotInHand(deck_index));
        }
        self.actions.push(Action::Discard { target: deck_index });
        self.clues += 1;
        self.pace -= 1;
        self.trash.push(deck_index);
        self.replace(deck_index, false);
        self.advance_turn();
        Ok(())
    }

    /// Spends a clue on some legal clue, chosen through the variant hook.
    /// Which clue is given does not matter to the solver.
    pub fn clue(&mut self) -> Result<(), GameError> {
        self.ensure_running()?;
        if self.clues < self.instance.clue_cost() {
            return Err(GameError::NoCluesAvailable);
        }
        let action = self.waste_clue()?;
        self.make_action(action)
    }

    /// Ends the game by explicit termination.
    pub fn terminate(&mut self) -> Result<(), GameError> {
        self.make_action(Action::EndGame {
            player: self.turn,
            code: Some(0),
        })
    }

    /// Replay export in the hanab.live JSON shape.
    pub fn to_json(&self) -> Value {
        let actions: Vec<Value> = if self.actions.is_empty() {
            vec![json!({"type": 4, "target": 0, "value": Value::Null})]
        } else {
            self.actions
                .iter()
                .map(|a| json!({"type": a.kind(), "target": a.target(), "value": a.value()}))
                .collect()
        };
        json!({
            "deck": self.instance.deck,
            "players": &PLAYER_NAMES[..self.instance.num_players],
            "actions": actions,
            "first_player": self.instance.starting_player,
            "options": { "variant": "No Variant" },
        })
    }

    // Private helpers

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.over {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    /// Finds a clue that touches at least one card of another player.
    fn waste_clue(&self) -> Result<Action, GameError> {
        let n = self.instance.num_players;
        for offset in 1..n {
            let player = (self.turn + offset) % n;
            for &held in &self.hands[player] {
                let card = self.card(held);
                for rank in self.instance.variant.ranks() {
                    if self.instance.variant.rank_touches(card, rank) {
                        return Ok(Action::RankClue { player, rank });
                    }
                }
                for color in 0..self.instance.variant.num_colors as u8 {
                    if self.instance.variant.color_touches(card, color) {
                        return Ok(Action::ColorClue { player, color });
                    }
                }
            }
        }
        Err(GameError::NoLegalClue)
    }

    /// Removes the card from the current hand, preserving order, and draws
    /// the next deck card into the last slot if the pile is non-empty.
    fn replace(&mut self, deck_index: usize, allow_not_present: bool) {
        let hand = &mut self.hands[self.turn];
        match hand.iter().position(|&i| i == deck_index) {
            Some(pos) => {
                hand.remove(pos);
                if self.progress < self.instance.deck_size() {
                    hand.push(self.progress);
                    self.progress += 1;
                }
            }
            None => {
                debug_assert!(allow_not_present);
                self.progress += 1;
            }
        }
    }

    fn advance_turn(&mut self) {
        debug_assert!(!self.over && self.remaining_extra_turns > 0);
        self.turn = (self.turn + 1) % self.instance.num_players;
        if self.progress == self.instance.deck_size() {
            self.remaining_extra_turns -= 1;
            if self.remaining_extra_turns == 0 {
                self.over = true;
            }
        }
    }
}
