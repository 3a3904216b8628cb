use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Zero-based index of a player at the table.
pub type PlayerId = usize;

/// A single move of the game. Play and discard targets are deck indices of
/// the card acted on; clue targets are the receiving player.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Play the card with the given deck index from the acting player's hand.
    Play { target: usize },
    /// Discard the card with the given deck index from the acting player's hand.
    Discard { target: usize },
    /// Clue the given color to a player. Content is not validated by the engine.
    ColorClue { player: PlayerId, color: u8 },
    /// Clue the given rank to a player. Content is not validated by the engine.
    RankClue { player: PlayerId, rank: u8 },
    /// A player ends the game, optionally with a termination code.
    EndGame { player: PlayerId, code: Option<u8> },
    /// The table votes to terminate, optionally with a termination code.
    VoteTerminate { player: PlayerId, code: Option<u8> },
}

impl Action {
    /// Wire index of the action kind, shared with the replay format.
    pub fn kind(&self) -> u8 {
        match self {
            Action::Play { .. } => 0,
            Action::Discard { .. } => 1,
            Action::ColorClue { .. } => 2,
            Action::RankClue { .. } => 3,
            Action::EndGame { .. } => 4,
            Action::VoteTerminate { .. } => 5,
        }
    }

    pub fn target(&self) -> usize {
        match *self {
            Action::Play { target } | Action::Discard { target } => target,
            Action::ColorClue { player, .. }
            | Action::RankClue { player, .. }
            | Action::EndGame { player, .. }
            | Action::VoteTerminate { player, .. } => player,
        }
    }

    pub fn value(&self) -> Option<u8> {
        match *self {
            Action::Play { .. } | Action::Discard { .. } => None,
            Action::ColorClue { color, .. } => Some(color),
            Action::RankClue { rank, .. } => Some(rank),
            Action::EndGame { code, .. } | Action::VoteTerminate { code, .. } => code,
        }
    }

    /// Rebuilds an action from its wire triple.
    pub fn from_parts(kind: u8, target: usize, value: Option<u8>) -> Result<Self, ParseError> {
        match kind {
            0 | 1 => {
                if value.is_some() {
                    return Err(ParseError::UnexpectedActionValue { kind });
                }
                Ok(if kind == 0 {
                    Action::Play { target }
                } else {
                    Action::Discard { target }
                })
            }
            2 => Ok(Action::ColorClue {
                player: target,
                color: value.ok_or(ParseError::MissingClueValue { kind })?,
            }),
            3 => Ok(Action::RankClue {
                player: target,
                rank: value.ok_or(ParseError::MissingClueValue { kind })?,
            }),
            4 => Ok(Action::EndGame {
                player: target,
                code: value,
            }),
            5 => Ok(Action::VoteTerminate {
                player: target,
                code: value,
            }),
            _ => Err(ParseError::InvalidActionType(kind)),
        }
    }

    /// True for the actions that end the game outright.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::EndGame { .. } | Action::VoteTerminate { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::Play { target } => write!(f, "play card {target}"),
            Action::Discard { target } => write!(f, "discard card {target}"),
            Action::ColorClue { player, color } => {
                write!(f, "clue color {color} to player {player}")
            }
            Action::RankClue { player, rank } => write!(f, "clue rank {rank} to player {player}"),
            Action::EndGame { player, code } => {
                write!(f, "player {player} ends the game (code {code:?})")
            }
            Action::VoteTerminate { code, .. } => {
                write!(f, "players vote to terminate the game (code {code:?})")
            }
        }
    }
}
