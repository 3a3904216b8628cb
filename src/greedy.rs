use log::trace;

use crate::action::PlayerId;
use crate::card::Card;
use crate::error::GameError;
use crate::state::GameState;

/// Full-knowledge classification of a held card against the current stacks.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum CardClass {
    /// Already played; free to discard.
    Trash,
    /// Continues its stack right now.
    Playable,
    /// Last usable copy of a still-needed card; must not be discarded.
    Critical,
    /// Needed eventually but replaceable; may be discarded at a price.
    Dispensable,
}

#[derive(Copy, Clone, Debug)]
struct ClassifiedCard {
    deck_index: usize,
    card: Card,
    class: CardClass,
    weight: i32,
}

/// Cheating strategy: plays the most urgent playable card, keeps clues
/// flowing and discards the cheapest dispensable card when forced. Used as
/// a fast warm attempt before the SAT solver.
pub struct GreedyStrategy;

impl GreedyStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Advances the game by one move. Marks the state lost instead of
    /// discarding a critical card.
    pub fn make_move(&self, state: &mut GameState) -> Result<(), GameError> {
        let hands = self.classify_hands(state);
        let cur = &hands[state.turn()];

        let best_play = cur
            .iter()
            .filter(|c| c.class == CardClass::Playable)
            .max_by_key(|c| c.weight);
        if let Some(play) = best_play {
            trace!("greedy plays {} ({})", play.card, play.deck_index);
            return state.play(play.deck_index);
        }

        let at_cap = state.clues() >= state.instance().clue_cap();
        if at_cap {
            return state.clue();
        }

        let trash = cur.iter().find(|c| c.class == CardClass::Trash);
        if let Some(trash) = trash {
            return state.discard(trash.deck_index);
        }

        if state.clues() < state.instance().clue_cost() {
            let discard = cur
                .iter()
                .filter(|c| c.class == CardClass::Dispensable)
                .min_by_key(|c| c.weight);
            return match discard {
                Some(discard) => {
                    trace!("greedy forced to discard {}", discard.card);
                    state.discard(discard.deck_index)
                }
                None => {
                    // Only critical cards in hand and no clue to stall with.
                    state.mark_lost();
                    Ok(())
                }
            };
        }

        state.clue()
    }

    /// Runs the strategy until the game ends or is known lost, optionally
    /// stopping once only `stop_at_remaining` cards are left in the deck.
    pub fn run(
        &self,
        state: &mut GameState,
        stop_at_remaining: Option<usize>,
    ) -> Result<(), GameError> {
        while !state.is_over() {
            if let Some(remaining) = stop_at_remaining {
                if remaining != 0 && state.draw_pile_size() <= remaining {
                    break;
                }
            }
            self.make_move(state)?;
        }
        Ok(())
    }

    fn classify_hands(&self, state: &GameState) -> Vec<Vec<ClassifiedCard>> {
        let mut hands: Vec<Vec<ClassifiedCard>> = state
            .hands()
            .iter()
            .map(|hand| {
                hand.iter()
                    .map(|&deck_index| {
                        let card = state.card(deck_index);
                        ClassifiedCard {
                            deck_index,
                            card,
                            class: classify(state, card),
                            weight: 0,
                        }
                    })
                    .collect()
            })
            .collect();

        // Within a hand, duplicates collapse: keep one copy (critical if it
        // was dispensable, since the other copy is about to become trash).
        for hand in &mut hands {
            for slot in 0..hand.len() {
                let card = hand[slot].card;
                let first = hand.iter().position(|c| c.card == card).unwrap();
                if first < slot {
                    if hand[first].class == CardClass::Dispensable {
                        hand[first].class = CardClass::Critical;
                    }
                    hand[slot].class = CardClass::Trash;
                }
            }
        }

        for player in 0..hands.len() {
            for slot in 0..hands[player].len() {
                let entry = hands[player][slot];
                hands[player][slot].weight = match entry.class {
                    CardClass::Playable => self.playable_weight(state, player, entry.card),
                    CardClass::Dispensable => self.dispensable_weight(state, entry.card),
                    _ => 0,
                };
            }
        }

        hands
    }

    /// Urgency of playing a card now. Doubled relative to the natural scale
    /// so the half-weight tiers stay integral.
    fn playable_weight(&self, state: &GameState, player: PlayerId, card: Card) -> i32 {
        let base = 6 - card.rank as i32;
        let copy_holders: Vec<PlayerId> = state
            .holding_players(card)
            .filter(|&p| p != player)
            .collect();
        let connecting_holders: Vec<PlayerId> = if card.rank < 5 {
            let connecting = Card::new(card.suit, card.rank + 1);
            state.holding_players(connecting).collect()
        } else {
            Vec::new()
        };

        if copy_holders.is_empty() {
            // Unique playable; urgent when its continuation is visible.
            return if connecting_holders.is_empty() {
                2 * base
            } else {
                12 * base
            };
        }
        if connecting_holders.is_empty() {
            return base;
        }
        let turns_to_copy = copy_holders
            .iter()
            .map(|&h| player_distance(state, player, h))
            .min()
            .unwrap();
        let turns_to_conn = connecting_holders
            .iter()
            .map(|&h| player_distance(state, player, h))
            .max()
            .unwrap();
        if turns_to_copy < turns_to_conn {
            // The other copy reaches the connecting card first.
            base
        } else {
            8 * base
        }
    }

    /// Cost of discarding a dispensable card: cheap when the next copy
    /// comes up soon and the rank is high.
    fn dispensable_weight(&self, state: &GameState, card: Card) -> i32 {
        let next_copy = state.instance().deck[state.progress()..]
            .iter()
            .position(|&c| c == card);
        let distance = next_copy.map_or(1, |offset| offset as i32 + 1);
        distance + 2 * (5 - card.rank as i32)
    }
}

impl Default for GreedyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(state: &GameState, card: Card) -> CardClass {
    if state.is_trash_card(card) {
        CardClass::Trash
    } else if state.is_playable(card) {
        CardClass::Playable
    } else if card.is_five() || state.is_critical(card) {
        CardClass::Critical
    } else {
        CardClass::Dispensable
    }
}

fn player_distance(state: &GameState, from: PlayerId, to: PlayerId) -> usize {
    let n = state.instance().num_players;
    (to + n - from - 1) % n + 1
}
