use serde::{Deserialize, Serialize};

use crate::card::{Card, MAX_RANK, MIN_RANK};

/// How a suit reacts to one family of clues.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ClueBehaviour {
    /// Clues of this family never touch the suit.
    Never,
    /// Clues touch the suit by exact match.
    Default,
    /// Every clue of this family touches the suit.
    All,
}

/// Clue-relevant profile of a single suit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SuitProfile {
    pub dark: bool,
    pub rank_clues: ClueBehaviour,
    pub color_clues: ClueBehaviour,
    /// Clue colors that touch this suit under `Default` behaviour.
    pub colors: Vec<u8>,
}

/// Pluggable clue-legality layer. The rule engine records clue content
/// without validating it; this type decides which clues touch which cards
/// for callers that need a concrete legal clue.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub suits: Vec<SuitProfile>,
    pub num_colors: usize,
}

impl Variant {
    /// Standard variant: one clue color per suit, dark suits at the end.
    pub fn standard(num_suits: usize, num_dark_suits: usize) -> Self {
        let suits = (0..num_suits)
            .map(|suit| SuitProfile {
                dark: suit >= num_suits - num_dark_suits,
                rank_clues: ClueBehaviour::Default,
                color_clues: ClueBehaviour::Default,
                colors: vec![suit as u8],
            })
            .collect();
        Self {
            suits,
            num_colors: num_suits,
        }
    }

    pub fn ranks(&self) -> impl Iterator<Item = u8> {
        MIN_RANK..=MAX_RANK
    }

    pub fn max_score(&self) -> usize {
        5 * self.suits.len()
    }

    pub fn rank_touches(&self, card: Card, clue_rank: u8) -> bool {
        match self.suits[card.suit as usize].rank_clues {
            ClueBehaviour::Never => false,
            ClueBehaviour::Default => card.rank == clue_rank,
            ClueBehaviour::All => true,
        }
    }

    pub fn color_touches(&self, card: Card, clue_color: u8) -> bool {
        let profile = &self.suits[card.suit as usize];
        match profile.color_clues {
            ClueBehaviour::Never => false,
            ClueBehaviour::Default => profile.colors.contains(&clue_color),
            ClueBehaviour::All => true,
        }
    }
}

/// hanab.live variant id for a standard (num_suits, num_dark_suits)
/// distribution, used when exporting replay links.
pub fn standard_variant_id(num_suits: usize, num_dark_suits: usize) -> Option<u32> {
    match (num_suits, num_dark_suits) {
        (3, 0) => Some(18),
        (4, 0) => Some(15),
        (5, 0) => Some(0),
        (5, 1) => Some(21),
        (6, 0) => Some(1),
        (6, 1) => Some(2),
        (6, 2) => Some(60),
        _ => None,
    }
}
