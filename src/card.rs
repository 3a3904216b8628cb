use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub const MIN_RANK: u8 = 1;
pub const MAX_RANK: u8 = 5;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
pub const DEFAULT_NUM_STRIKES: u8 = 3;

/// Suit initials used by replay output, matching hanab.live ordering.
pub const SUIT_INITIALS: [char; 6] = ['r', 'y', 'g', 'b', 'p', 't'];

/// Cards a light suit contributes to a standard deck, by rank.
const SUIT_DISTRIBUTION: [u8; 5] = [3, 2, 2, 2, 1];

/// Representation of a Hanabi card. Physical copies of the same value
/// compare equal; deck indices disambiguate them where it matters.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "suitIndex")]
    pub suit: u8,
    pub rank: u8,
}

impl Card {
    pub fn new(suit: u8, rank: u8) -> Self {
        debug_assert!((MIN_RANK..=MAX_RANK).contains(&rank));
        Self { suit, rank }
    }

    #[inline]
    pub fn is_five(&self) -> bool {
        self.rank == MAX_RANK
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SUIT_INITIALS.get(self.suit as usize) {
            Some(initial) => write!(f, "{}{}", initial, self.rank),
            None => write!(f, "s{}r{}", self.suit, self.rank),
        }
    }
}

impl FromStr for Card {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (initial, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(i), Some(r), None) => (i, r),
            _ => return Err(ParseError::InvalidCard(s.to_string())),
        };
        let suit = SUIT_INITIALS
            .iter()
            .position(|&c| c == initial)
            .ok_or_else(|| ParseError::InvalidCard(s.to_string()))?;
        let rank = rank
            .to_digit(10)
            .filter(|&r| (MIN_RANK as u32..=MAX_RANK as u32).contains(&r))
            .ok_or_else(|| ParseError::InvalidCard(s.to_string()))?;
        Ok(Card::new(suit as u8, rank as u8))
    }
}

/// Standard hand size for the given table size.
pub fn hand_size_for(num_players: usize) -> usize {
    match num_players {
        2 | 3 => 5,
        4 | 5 => 4,
        _ => 3,
    }
}

/// Builds an unshuffled standard deck: light suits contribute
/// [1,1,1,2,2,3,3,4,4,5], dark suits a single copy of each rank.
pub fn standard_deck(num_suits: usize, num_dark_suits: usize) -> Vec<Card> {
    debug_assert!(num_dark_suits <= num_suits);
    let mut deck = Vec::with_capacity(10 * num_suits - 5 * num_dark_suits);
    for suit in 0..num_suits {
        let dark = suit >= num_suits - num_dark_suits;
        for rank in MIN_RANK..=MAX_RANK {
            let copies = if dark {
                1
            } else {
                SUIT_DISTRIBUTION[(rank - 1) as usize]
            };
            for _ in 0..copies {
                deck.push(Card::new(suit as u8, rank));
            }
        }
    }
    deck
}

/// Deterministically shuffled standard deck for seed generation.
pub fn shuffled_deck(num_suits: usize, num_dark_suits: usize, seed: u64) -> Vec<Card> {
    let mut deck = standard_deck(num_suits, num_dark_suits);
    let mut rng = StdRng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
    deck
}
