use crate::action::Action;
use crate::card::{Card, MAX_RANK, MIN_RANK};
use crate::error::ParseError;
use crate::state::GameState;
use crate::variant::standard_variant_id;

/// Alphabet shared with hanab.live replay links.
const BASE62: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const LINK_PREFIX: &str = "https://hanab.live/replay-json/";
const DASH_EVERY: usize = 20;

/// A decompressed replay record, ready for the bisection driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedGame {
    pub num_players: usize,
    pub deck: Vec<Card>,
    pub actions: Vec<Action>,
    pub variant_id: u32,
}

fn encode62(index: usize) -> Option<char> {
    BASE62.as_bytes().get(index).map(|&b| b as char)
}

fn decode62(c: char, index: usize) -> Result<usize, ParseError> {
    BASE62
        .find(c)
        .ok_or(ParseError::InvalidCharacter { index, found: c })
}

fn parse_header(s: &str) -> Result<(u8, u8), ParseError> {
    let mut chars = s.chars();
    let (lo, hi) = match (chars.next(), chars.next()) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => return Err(ParseError::MissingHeader(s.to_string())),
    };
    let header: String = [lo, hi].iter().collect();
    let lo = lo
        .to_digit(10)
        .ok_or_else(|| ParseError::HeaderNotNumeric(header.clone()))?;
    let hi = hi
        .to_digit(10)
        .ok_or_else(|| ParseError::HeaderNotNumeric(header))?;
    if lo > hi {
        return Err(ParseError::InvertedRange {
            min: lo as u8,
            max: hi as u8,
        });
    }
    Ok((lo as u8, hi as u8))
}

/// Deck as `"{min_rank}{max_rank}"` plus one base-62 character per card.
pub fn compress_deck(deck: &[Card]) -> Result<String, ParseError> {
    debug_assert!(!deck.is_empty());
    let min_rank = deck.iter().map(|c| c.rank).min().unwrap_or(MIN_RANK);
    let max_rank = deck.iter().map(|c| c.rank).max().unwrap_or(MAX_RANK);
    let rank_range = (max_rank - min_rank + 1) as usize;

    let mut out = format!("{min_rank}{max_rank}");
    for card in deck {
        let index = rank_range * card.suit as usize + (card.rank - min_rank) as usize;
        let encoded =
            encode62(index).ok_or_else(|| ParseError::CardOutOfRange(card.to_string()))?;
        out.push(encoded);
    }
    Ok(out)
}

pub fn decompress_deck(deck_str: &str) -> Result<Vec<Card>, ParseError> {
    let (min_rank, max_rank) = parse_header(deck_str)?;
    let rank_range = (max_rank - min_rank + 1) as usize;

    let mut deck = Vec::with_capacity(deck_str.len() - 2);
    for (index, c) in deck_str.chars().skip(2).enumerate() {
        let encoded = decode62(c, index)?;
        let suit = (encoded / rank_range) as u8;
        let rank = (encoded % rank_range) as u8 + min_rank;
        deck.push(Card::new(suit, rank));
    }
    Ok(deck)
}

/// Actions as `"{min_type}{max_type}"` plus two characters per action:
/// kind and value folded into the first, target in the second. Values are
/// stored off by one so that absent and zero stay distinct; vote
/// terminations always encode value zero (format compatibility hack).
pub fn compress_actions(actions: &[Action]) -> Result<String, ParseError> {
    let min_type = actions.iter().map(|a| a.kind()).min().unwrap_or(0);
    let max_type = actions.iter().map(|a| a.kind()).max().unwrap_or(0);
    let type_range = (max_type - min_type + 1) as usize;

    let mut out = format!("{min_type}{max_type}");
    for action in actions {
        let value = match action {
            Action::VoteTerminate { .. } => 0,
            _ => action.value().map(|v| v as usize + 1).unwrap_or(0),
        };
        let first = encode62(type_range * value + (action.kind() - min_type) as usize)
            .ok_or_else(|| ParseError::ValueOutOfRange(value as u8))?;
        let second =
            encode62(action.target()).ok_or(ParseError::TargetOutOfRange(action.target()))?;
        out.push(first);
        out.push(second);
    }
    Ok(out)
}

pub fn decompress_actions(actions_str: &str) -> Result<Vec<Action>, ParseError> {
    let (min_type, max_type) = parse_header(actions_str)?;
    let type_range = (max_type - min_type + 1) as usize;

    let body: Vec<char> = actions_str.chars().skip(2).collect();
    if body.len() % 2 != 0 {
        return Err(ParseError::OddActionLength);
    }

    let mut actions = Vec::with_capacity(body.len() / 2);
    for (pair_index, pair) in body.chunks(2).enumerate() {
        let first = decode62(pair[0], 2 * pair_index)?;
        let second = decode62(pair[1], 2 * pair_index + 1)?;
        let kind = (first % type_range) as u8 + min_type;
        let value = match first / type_range {
            0 => None,
            v => Some((v - 1) as u8),
        };
        actions.push(Action::from_parts(kind, second, value)?);
    }
    Ok(actions)
}

/// Whole game as `"{num_players}{deck},{actions},{variant_id}"` with a dash
/// inserted every 20 characters.
pub fn compress_game_state(state: &GameState) -> Result<String, ParseError> {
    let instance = state.instance();
    let variant_id =
        standard_variant_id(instance.num_suits, instance.num_dark_suits).unwrap_or(0);
    let raw = format!(
        "{}{},{},{}",
        instance.num_players,
        compress_deck(&instance.deck)?,
        compress_actions(state.actions())?,
        variant_id
    );
    let mut out = String::with_capacity(raw.len() + raw.len() / DASH_EVERY + 1);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && i % DASH_EVERY == 0 {
            out.push('-');
        }
        out.push(c);
    }
    Ok(out)
}

pub fn decompress_game(game_str: &str) -> Result<CompressedGame, ParseError> {
    let stripped: String = game_str.chars().filter(|&c| c != '-').collect();
    let parts: Vec<&str> = stripped.split(',').collect();
    if parts.len() != 3 {
        return Err(ParseError::BadSectionCount {
            expected: 3,
            found: parts.len(),
        });
    }

    let players_deck = parts[0];
    let num_players = players_deck
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| ParseError::BadPlayerCount(players_deck.chars().take(1).collect()))?
        as usize;
    let deck = decompress_deck(&players_deck[1..])?;
    let actions = decompress_actions(parts[1])?;
    let variant_id = parts[2]
        .parse::<u32>()
        .map_err(|_| ParseError::BadVariantId(parts[2].to_string()))?;

    Ok(CompressedGame {
        num_players,
        deck,
        actions,
        variant_id,
    })
}

/// Shareable replay link for a finished game.
pub fn link(state: &GameState) -> Result<String, ParseError> {
    Ok(format!("{LINK_PREFIX}{}", compress_game_state(state)?))
}

/// Accepts both bare compressed games and full replay links.
pub fn decompress_link(link_or_game: &str) -> Result<CompressedGame, ParseError> {
    let body = link_or_game
        .strip_prefix(LINK_PREFIX)
        .unwrap_or(link_or_game);
    decompress_game(body)
}
