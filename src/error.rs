use thiserror::Error;

use crate::action::PlayerId;

/// Errors raised by the rule engine and solver plumbing. Rule violations
/// signal programmer bugs in the caller, not recoverable game states.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("card with deck index {0} is not in the acting player's hand")]
    CardNotInHand(usize),
    #[error("cannot discard while at the clue cap")]
    DiscardAtClueCap,
    #[error("not enough clues available")]
    NoCluesAvailable,
    #[error("no legal clue exists for the current hands")]
    NoLegalClue,
    #[error("player index {0} is out of range")]
    InvalidPlayer(PlayerId),
    #[error("game is already over")]
    GameOver,
    #[error("decoded replay disagrees with the model: {0}")]
    ModelMismatch(&'static str),
    #[error("SAT backend failure: {0}")]
    SatBackend(String),
}

/// Errors from parsing the compact replay exchange format. Parsing never
/// leaves partially mutated state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("input too short, missing min/max header in {0:?}")]
    MissingHeader(String),
    #[error("min/max header is not numeric: {0:?}")]
    HeaderNotNumeric(String),
    #[error("min/max range is inverted: [{min},{max}]")]
    InvertedRange { min: u8, max: u8 },
    #[error("invalid character {found:?} at index {index}")]
    InvalidCharacter { index: usize, found: char },
    #[error("action string must contain an even number of characters")]
    OddActionLength,
    #[error("invalid action type {0}")]
    InvalidActionType(u8),
    #[error("action kind {kind} does not carry a value")]
    UnexpectedActionValue { kind: u8 },
    #[error("action kind {kind} requires a clue value")]
    MissingClueValue { kind: u8 },
    #[error("cannot encode card {0}, suit or rank out of range")]
    CardOutOfRange(String),
    #[error("cannot encode action target {0}")]
    TargetOutOfRange(usize),
    #[error("cannot encode action value {0}")]
    ValueOutOfRange(u8),
    #[error("invalid card literal {0:?}")]
    InvalidCard(String),
    #[error("expected {expected} comma-separated sections, found {found}")]
    BadSectionCount { expected: usize, found: usize },
    #[error("invalid player count {0:?}")]
    BadPlayerCount(String),
    #[error("invalid variant id {0:?}")]
    BadVariantId(String),
}
