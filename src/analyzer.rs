use std::collections::{HashMap, HashSet};

use log::debug;
use serde::Serialize;

use crate::action::PlayerId;
use crate::card::Card;
use crate::instance::Instance;

/// Certificate of infeasibility produced by the static sieve. Payloads are
/// diagnostic: draw positions, remaining-deck counts or the doomed suit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
pub enum InfeasibilityReason {
    /// Pace dropped below zero; `cards_left` cards were still in the deck.
    Pace { cards_left: usize },
    /// 2-player special: the two bottom non-fives are the same 2.
    DoubleBottom2With5s { deck_index: usize },
    /// 2-player special: the three bottom non-fives are the same 1.
    TripleBottom1With5s { deck_index: usize },
    /// Too many critical cards to hold after drawing `draw_index`.
    HandSize { draw_index: usize },
    /// Pace ran out after the squeeze dropped non-critical stored cards.
    PaceAfterSqueeze { cards_left: usize },
    /// No endgame assignment finishes the suit within the final round.
    BottomTopDeck { suit: u8 },
    /// The bottom deck card is a dark non-five.
    CritAtBottom { deck_index: usize },
}

/// Extremum tracker with the draw index where it was reached.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrackedValue {
    pub value: i32,
    pub index: usize,
}

impl TrackedValue {
    fn update_min(&mut self, value: i32, index: usize) {
        if value < self.value {
            *self = TrackedValue { value, index };
        }
    }

    fn update_max(&mut self, value: i32, index: usize) {
        if value > self.value {
            *self = TrackedValue { value, index };
        }
    }
}

/// Outcome of the static analysis: zero or more infeasibility certificates
/// plus sweep diagnostics. An empty reason list proves nothing.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AnalysisResult {
    pub reasons: Vec<InfeasibilityReason>,
    pub min_pace: TrackedValue,
    pub max_stored_cards: TrackedValue,
    pub max_stored_crits: TrackedValue,
}

impl AnalysisResult {
    pub fn is_infeasible(&self) -> bool {
        !self.reasons.is_empty()
    }
}

/// Runs every static check against the instance.
pub fn analyze(instance: &Instance, list_all_pace_cuts: bool) -> AnalysisResult {
    let mut result = sweep_pace_and_hand_size(instance, true, list_all_pace_cuts);

    // A pace cut found under squeeze conditions may be an artifact of the
    // squeeze; rerun without it so genuine pace cuts are reported as such.
    if result
        .reasons
        .iter()
        .any(|r| matches!(r, InfeasibilityReason::PaceAfterSqueeze { .. }))
    {
        let clean = sweep_pace_and_hand_size(instance, false, list_all_pace_cuts);
        result.reasons.extend(clean.reasons);
    }

    if let Some(suit) = bottom_top_deck_loss(instance) {
        result.reasons.push(InfeasibilityReason::BottomTopDeck { suit });
    }

    if instance.num_players == 2 {
        result.reasons.extend(two_player_bottom_loss(instance));
    }

    let bottom = *instance.deck.last().expect("instance decks are non-empty");
    if !bottom.is_five() && instance.is_dark(bottom.suit) {
        result.reasons.push(InfeasibilityReason::CritAtBottom {
            deck_index: instance.deck_size() - 1,
        });
    }

    result.reasons.sort();
    result.reasons.dedup();
    if result.is_infeasible() {
        debug!("static analysis found {:?}", result.reasons);
    }
    result
}

/// Forward sweep assuming instant recursive plays and unlimited storage for
/// non-critical cards; critical cards compete for real hand space.
fn sweep_pace_and_hand_size(
    instance: &Instance,
    do_squeeze: bool,
    list_all_pace_cuts: bool,
) -> AnalysisResult {
    let deck_size = instance.deck_size();
    let capacity = instance.num_players * instance.hand_size;

    let mut stacks = vec![0u8; instance.num_suits];
    let mut stored: HashSet<Card> = HashSet::new();
    let mut stored_crits: HashSet<Card> = HashSet::new();
    let mut result = AnalysisResult {
        min_pace: TrackedValue {
            value: i32::MAX,
            index: 0,
        },
        ..AnalysisResult::default()
    };

    let artificial_crits = artificial_crits(instance);
    let mut pace_found = false;
    let mut hand_size_found = false;
    let mut squeeze = false;

    for (index, &card) in instance.deck.iter().enumerate() {
        let stack = &mut stacks[card.suit as usize];
        if card.rank == *stack + 1 {
            *stack += 1;
            for rank in card.rank + 1..=5 {
                let chained = Card::new(card.suit, rank);
                if stored.remove(&chained) {
                    *stack += 1;
                    stored_crits.remove(&chained);
                } else {
                    break;
                }
            }
        } else if card.rank > *stack + 1 {
            if stored.contains(&card) || card.is_five() || artificial_crits.contains(&card) {
                stored_crits.insert(card);
            }
            stored.insert(card);
        }
        // Cards at or below the stack are trash and drop out immediately.

        let space_left = capacity as i32 - stored_crits.len() as i32 - 1;
        if space_left == 0 && do_squeeze {
            stored = stored_crits.clone();
            squeeze = true;
        }
        if space_left < 0 && !hand_size_found {
            result
                .reasons
                .push(InfeasibilityReason::HandSize { draw_index: index });
            hand_size_found = true;
        }

        let max_remaining_plays =
            (deck_size - index - 1) as i32 + instance.num_players as i32 - 1;
        let needed_plays =
            instance.max_score() as i32 - stacks.iter().map(|&s| s as i32).sum::<i32>();
        let cur_pace = max_remaining_plays - needed_plays;
        if cur_pace < 0 && (list_all_pace_cuts || !pace_found) {
            let cards_left = deck_size - index - 1;
            result.reasons.push(if squeeze {
                InfeasibilityReason::PaceAfterSqueeze { cards_left }
            } else {
                InfeasibilityReason::Pace { cards_left }
            });
            pace_found = true;
        }

        result.min_pace.update_min(cur_pace, index);
        result
            .max_stored_cards
            .update_max(stored.len() as i32, index);
        result
            .max_stored_crits
            .update_max(stored_crits.len() as i32, index);
    }

    result
}

/// Cards that behave as critical because of where they sit in the deck,
/// even though another copy exists.
fn artificial_crits(instance: &Instance) -> HashSet<Card> {
    let mut crits = HashSet::new();
    let filtered: Vec<Card> = instance
        .deck
        .iter()
        .copied()
        .filter(|c| !c.is_five())
        .collect();
    let len = filtered.len();

    if instance.num_players == 2 && len >= 3 {
        // The second-to-last non-five cannot be played if it is a 2: its 1
        // would have to come up even later.
        if filtered[len - 2].rank == 2 {
            crits.insert(filtered[len - 2]);
        }
        // Double bottom 3: after the first 3 plays, exactly 3,4,5 of that
        // suit remain, so the card right before the pair is dead.
        if filtered[len - 1] == filtered[len - 2] && filtered[len - 2].rank == 3 {
            crits.insert(filtered[len - 3]);
        }
    } else if instance.num_players == 3 && len >= 3 {
        if filtered[len - 1] == filtered[len - 2] && filtered[len - 2].rank == 2 {
            crits.insert(filtered[len - 3]);
        }
    }

    // The bottom card can never be played unless it is a five.
    let bottom = *instance.deck.last().expect("instance decks are non-empty");
    if !bottom.is_five() {
        crits.insert(bottom);
    }

    crits
}

/// 2-player pace specials caused by identical cards at the very bottom.
fn two_player_bottom_loss(instance: &Instance) -> Vec<InfeasibilityReason> {
    let filtered: Vec<(usize, Card)> = instance
        .deck
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, c)| !c.is_five())
        .collect();
    let len = filtered.len();
    let mut reasons = Vec::new();
    if len < 3 {
        return reasons;
    }

    let (_, last) = filtered[len - 1];
    let (second_idx, second) = filtered[len - 2];
    let (third_idx, third) = filtered[len - 3];

    if last == second && last.rank == 2 {
        reasons.push(InfeasibilityReason::Pace {
            cards_left: instance.deck_size() - second_idx,
        });
        reasons.push(InfeasibilityReason::DoubleBottom2With5s {
            deck_index: second_idx,
        });
    }
    if last == second && second == third && third.rank == 1 {
        reasons.push(InfeasibilityReason::Pace {
            cards_left: instance.deck_size() - third_idx,
        });
        reasons.push(InfeasibilityReason::TripleBottom1With5s {
            deck_index: second_idx,
        });
    }
    reasons
}

/// Looks for a suit whose forced late ranks cannot all be played within the
/// final round, no matter which starting-hand copies are used.
fn bottom_top_deck_loss(instance: &Instance) -> Option<u8> {
    let deck_size = instance.deck_size();
    let num_players = instance.num_players;

    let mut found: HashMap<Card, usize> = HashMap::new();
    // Only the last four cards can force a single-suit distribution loss.
    for back in 0..4.min(deck_size) {
        let deck_index = deck_size - 1 - back;
        let card = instance.deck[deck_index];
        let seen = found.entry(card).or_insert(0);
        *seen += 1;

        if !(*seen >= 3 || (card.rank != 1 && *seen >= 2)) {
            continue;
        }

        // Ranks that can only start playing once the extra round begins.
        let first_late_rank = card.rank as usize + (deck_size - deck_index - 2);
        if first_late_rank > 5 {
            continue;
        }

        // Fixed starting-hand positions per late rank; one entry per copy.
        let mut positions_by_rank: Vec<Vec<Option<PlayerId>>> = Vec::new();
        for rank in first_late_rank..=5 {
            let mut positions: Vec<Option<PlayerId>> = Vec::new();
            for player in 0..num_players {
                for held in instance.starting_hand(player) {
                    if instance.deck[held] == Card::new(card.suit, rank as u8) {
                        positions.push(Some(player));
                    }
                }
            }
            // A single non-five copy leaves a free choice (the deck copy).
            if rank != 5 && positions.len() < 2 {
                positions.clear();
            }
            if positions.is_empty() {
                positions.push(None);
            }
            positions_by_rank.push(positions);
        }

        if !any_assignment_fits(&positions_by_rank, num_players) {
            return Some(card.suit);
        }
    }
    None
}

/// Tries every choice of holders for the late ranks and checks whether the
/// suit can be finished within `num_players + 1` turns.
fn any_assignment_fits(positions_by_rank: &[Vec<Option<PlayerId>>], num_players: usize) -> bool {
    fn recurse(
        positions_by_rank: &[Vec<Option<PlayerId>>],
        chosen: &mut Vec<Option<PlayerId>>,
        num_players: usize,
    ) -> bool {
        if chosen.len() == positions_by_rank.len() {
            return turns_for_assignment(chosen, num_players) <= num_players + 1;
        }
        for &option in &positions_by_rank[chosen.len()] {
            chosen.push(option);
            if recurse(positions_by_rank, chosen, num_players) {
                chosen.pop();
                return true;
            }
            chosen.pop();
        }
        false
    }
    recurse(positions_by_rank, &mut Vec::new(), num_players)
}

fn turns_for_assignment(assignment: &[Option<PlayerId>], num_players: usize) -> usize {
    let mut cur_player: Option<PlayerId> = None;
    let mut num_turns = 0;
    for &holder in assignment {
        match (holder, cur_player) {
            (Some(holder), Some(cur)) => {
                num_turns += (holder + num_players - cur - 1) % num_players + 1;
            }
            _ => num_turns += 1,
        }
        match holder {
            Some(holder) => cur_player = Some(holder),
            None => {
                if let Some(cur) = cur_player {
                    cur_player = Some((cur + 1) % num_players);
                }
            }
        }
    }
    num_turns
}
