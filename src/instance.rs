use serde::{Deserialize, Serialize};

use crate::action::PlayerId;
use crate::card::{
    Card, DEFAULT_NUM_STRIKES, MAX_PLAYERS, MAX_RANK, MIN_PLAYERS, MIN_RANK, hand_size_for,
};
use crate::error::GameError;
use crate::variant::Variant;

/// Immutable description of a dealt game: the deck, the table and the rule
/// flags, plus every constant derivable from them. Created once, shared by
/// all game states through `Arc`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub deck: Vec<Card>,
    pub num_players: usize,
    pub hand_size: usize,
    pub num_strikes: u8,
    pub starting_player: PlayerId,
    pub clue_starved: bool,
    pub fives_give_clue: bool,
    pub deck_plays: bool,
    pub all_or_nothing: bool,
    pub variant: Variant,
    pub num_suits: usize,
    pub num_dark_suits: usize,
}

/// Builder for `Instance`, defaulting every option to the standard rules.
pub struct InstanceBuilder {
    deck: Vec<Card>,
    num_players: usize,
    hand_size: Option<usize>,
    num_strikes: u8,
    starting_player: PlayerId,
    clue_starved: bool,
    fives_give_clue: bool,
    deck_plays: bool,
    all_or_nothing: bool,
    variant: Option<Variant>,
}

impl InstanceBuilder {
    pub fn new(deck: Vec<Card>, num_players: usize) -> Self {
        Self {
            deck,
            num_players,
            hand_size: None,
            num_strikes: DEFAULT_NUM_STRIKES,
            starting_player: 0,
            clue_starved: false,
            fives_give_clue: true,
            deck_plays: false,
            all_or_nothing: false,
            variant: None,
        }
    }

    pub fn hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = Some(hand_size);
        self
    }

    pub fn num_strikes(mut self, num_strikes: u8) -> Self {
        self.num_strikes = num_strikes;
        self
    }

    pub fn starting_player(mut self, player: PlayerId) -> Self {
        self.starting_player = player;
        self
    }

    pub fn clue_starved(mut self, on: bool) -> Self {
        self.clue_starved = on;
        self
    }

    pub fn fives_give_clue(mut self, on: bool) -> Self {
        self.fives_give_clue = on;
        self
    }

    pub fn deck_plays(mut self, on: bool) -> Self {
        self.deck_plays = on;
        self
    }

    pub fn all_or_nothing(mut self, on: bool) -> Self {
        self.all_or_nothing = on;
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn build(self) -> Result<Instance, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(GameError::InvalidConfiguration(
                "player count must be between 2 and 6",
            ));
        }
        if self.all_or_nothing {
            return Err(GameError::InvalidConfiguration(
                "the all-or-nothing variant is not supported",
            ));
        }
        if self.deck.is_empty() {
            return Err(GameError::InvalidConfiguration("deck must not be empty"));
        }
        if self
            .deck
            .iter()
            .any(|c| !(MIN_RANK..=MAX_RANK).contains(&c.rank))
        {
            return Err(GameError::InvalidConfiguration(
                "deck contains a rank outside 1..=5",
            ));
        }
        let num_suits = self.deck.iter().map(|c| c.suit as usize).max().unwrap() + 1;
        let deck_size = self.deck.len();
        if 10 * num_suits < deck_size || (10 * num_suits - deck_size) % 5 != 0 {
            return Err(GameError::InvalidConfiguration(
                "deck size does not match a standard suit distribution",
            ));
        }
        let num_dark_suits = (10 * num_suits - deck_size) / 5;
        if num_dark_suits > num_suits {
            return Err(GameError::InvalidConfiguration(
                "deck is too small for its number of suits",
            ));
        }

        let hand_size = self.hand_size.unwrap_or(hand_size_for(self.num_players));
        if hand_size == 0 {
            return Err(GameError::InvalidConfiguration("hand size must be positive"));
        }
        if self.num_players * hand_size > deck_size {
            return Err(GameError::InvalidConfiguration(
                "deck cannot cover the starting hands",
            ));
        }
        if self.starting_player >= self.num_players {
            return Err(GameError::InvalidPlayer(self.starting_player));
        }
        if self.num_strikes == 0 {
            return Err(GameError::InvalidConfiguration(
                "strike limit must be positive",
            ));
        }

        let variant = self
            .variant
            .unwrap_or_else(|| Variant::standard(num_suits, num_dark_suits));
        if variant.suits.len() != num_suits {
            return Err(GameError::InvalidConfiguration(
                "variant suit count does not match the deck",
            ));
        }

        Ok(Instance {
            deck: self.deck,
            num_players: self.num_players,
            hand_size,
            num_strikes: self.num_strikes,
            starting_player: self.starting_player,
            clue_starved: self.clue_starved,
            fives_give_clue: self.fives_give_clue,
            deck_plays: self.deck_plays,
            all_or_nothing: self.all_or_nothing,
            variant,
            num_suits,
            num_dark_suits,
        })
    }
}

impl Instance {
    /// Standard-rules instance for a deck and table size.
    pub fn new(deck: Vec<Card>, num_players: usize) -> Result<Self, GameError> {
        Self::builder(deck, num_players).build()
    }

    pub fn builder(deck: Vec<Card>, num_players: usize) -> InstanceBuilder {
        InstanceBuilder::new(deck, num_players)
    }

    #[inline]
    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    #[inline]
    pub fn num_dealt_cards(&self) -> usize {
        self.num_players * self.hand_size
    }

    #[inline]
    pub fn draw_pile_size(&self) -> usize {
        self.deck_size() - self.num_dealt_cards()
    }

    #[inline]
    pub fn max_score(&self) -> usize {
        5 * self.num_suits
    }

    pub fn initial_pace(&self) -> i32 {
        self.deck_size() as i32
            - 5 * self.num_suits as i32
            - (self.num_players * (self.hand_size - 1)) as i32
    }

    /// Upper bound on the length of any game reaching the maximum score.
    pub fn max_winning_moves(&self) -> usize {
        let moves = 15 * self.num_suits as i32 - 10 * self.num_dark_suits as i32
            - 2 * (self.num_players * (self.hand_size - 1)) as i32
            + 8
            + (self.num_suits as i32 - 1)
            - if self.num_players >= 5 { 1 } else { 0 };
        moves.max(0) as usize
    }

    /// Clue cap in internal units (half-clues when clue-starved).
    #[inline]
    pub fn clue_cap(&self) -> u8 {
        if self.clue_starved { 16 } else { 8 }
    }

    /// Cost of giving a clue, in internal units.
    #[inline]
    pub fn clue_cost(&self) -> u8 {
        if self.clue_starved { 2 } else { 1 }
    }

    #[inline]
    pub fn is_dark(&self, suit: u8) -> bool {
        (suit as usize) >= self.num_suits - self.num_dark_suits
    }

    /// Deck indices initially held by the given player.
    pub fn starting_hand(&self, player: PlayerId) -> std::ops::Range<usize> {
        player * self.hand_size..(player + 1) * self.hand_size
    }

    /// Copies of the given card value in the whole deck.
    pub fn total_copies(&self, card: Card) -> usize {
        self.deck.iter().filter(|&&c| c == card).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::standard_deck;

    #[test]
    fn derived_constants_for_no_variant() {
        let instance = Instance::new(standard_deck(5, 0), 4).unwrap();
        assert_eq!(instance.num_suits, 5);
        assert_eq!(instance.num_dark_suits, 0);
        assert_eq!(instance.hand_size, 4);
        assert_eq!(instance.max_score(), 25);
        assert_eq!(instance.initial_pace(), 13);
        // 75 - 0 - 24 + 8 + 4 - 0
        assert_eq!(instance.max_winning_moves(), 63);
    }

    #[test]
    fn dark_suits_are_derived_from_deck_size() {
        let instance = Instance::new(standard_deck(6, 2), 5).unwrap();
        assert_eq!(instance.num_dark_suits, 2);
        assert!(instance.is_dark(4));
        assert!(!instance.is_dark(3));
        // 90 - 20 - 30 + 8 + 5 - 1
        assert_eq!(instance.max_winning_moves(), 52);
    }

    #[test]
    fn clue_starved_halves_the_unit() {
        let instance = Instance::builder(standard_deck(5, 0), 2)
            .clue_starved(true)
            .build()
            .unwrap();
        assert_eq!(instance.clue_cap(), 16);
        assert_eq!(instance.clue_cost(), 2);
    }

    #[test]
    fn rejects_bad_configurations() {
        assert!(Instance::new(standard_deck(5, 0), 7).is_err());
        assert!(Instance::new(Vec::new(), 2).is_err());
        assert!(
            Instance::builder(standard_deck(1, 1), 2)
                .hand_size(5)
                .build()
                .is_err(),
            "hands must fit in the deck"
        );
        assert!(
            Instance::builder(standard_deck(5, 0), 2)
                .all_or_nothing(true)
                .build()
                .is_err()
        );
    }
}
