//! Full-information Hanabi feasibility: a rule engine, a static deck
//! analyzer, a greedy warm-start strategy, a SAT-based winnability solver
//! and a bisection driver locating where a recorded replay went wrong.

pub mod action;
pub mod analyzer;
pub mod batch;
pub mod card;
pub mod check;
pub mod compress;
pub mod error;
pub mod greedy;
pub mod instance;
pub mod sat;
pub mod solver;
pub mod state;
pub mod variant;

pub use crate::action::{Action, PlayerId};
pub use crate::analyzer::{AnalysisResult, InfeasibilityReason, analyze};
pub use crate::batch::{BatchJob, BatchReport, BatchVerdict, solve_batch};
pub use crate::card::{Card, hand_size_for, shuffled_deck, standard_deck};
pub use crate::check::{CheckOutcome, RecordedGame, check_game};
pub use crate::compress::{
    CompressedGame, compress_actions, compress_deck, compress_game_state, decompress_actions,
    decompress_deck, decompress_game, decompress_link, link,
};
pub use crate::error::{GameError, ParseError};
pub use crate::greedy::GreedyStrategy;
pub use crate::instance::{Instance, InstanceBuilder};
pub use crate::solver::{solve, solve_instance};
pub use crate::state::GameState;
pub use crate::variant::{ClueBehaviour, SuitProfile, Variant, standard_variant_id};
