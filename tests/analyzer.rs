use assert_matches::assert_matches;

use hanasolve::{Card, GameError, Instance, InfeasibilityReason, analyze, standard_deck};

fn deck_of(cards: &str) -> Vec<Card> {
    cards.split_whitespace()
        .map(|s| s.parse().expect("valid card literal"))
        .collect()
}

/// Moves every copy of the given card values to the bottom of the deck,
/// keeping all other cards in order.
fn with_bottom(mut deck: Vec<Card>, bottom: &[Card]) -> Vec<Card> {
    for &card in bottom {
        let pos = deck.iter().position(|&c| c == card).expect("card in deck");
        deck.remove(pos);
    }
    deck.extend(bottom.iter().copied());
    deck
}

#[test]
fn clean_deck_has_no_reasons() -> Result<(), GameError> {
    // In deal order every suit comes up sorted, which is trivially winnable.
    let instance = Instance::new(standard_deck(5, 0), 4)?;
    let result = analyze(&instance, false);
    assert!(!result.is_infeasible(), "found {:?}", result.reasons);
    assert!(result.min_pace.value >= 0);
    Ok(())
}

#[test]
fn dark_non_five_at_the_bottom_is_fatal() -> Result<(), GameError> {
    // 5 suits with one dark suit; bury the dark 4 at the very bottom.
    let deck = with_bottom(standard_deck(5, 1), &[Card::new(4, 4)]);
    let instance = Instance::new(deck, 5)?;
    let result = analyze(&instance, false);
    assert!(
        result
            .reasons
            .iter()
            .any(|r| matches!(r, InfeasibilityReason::CritAtBottom { deck_index: 44 })),
        "found {:?}",
        result.reasons
    );
    Ok(())
}

#[test]
fn unholdable_critical_cards_cut_the_deck() -> Result<(), GameError> {
    // Two one-copy suits and one-card hands: both fives pile up at once.
    let instance = Instance::builder(deck_of("r1 y1 r5 y5 r2 y2 r3 y3 r4 y4"), 2)
        .hand_size(1)
        .build()?;
    let result = analyze(&instance, false);
    assert!(
        result
            .reasons
            .iter()
            .any(|r| matches!(r, InfeasibilityReason::HandSize { draw_index: 3 })),
        "found {:?}",
        result.reasons
    );
    assert!(result.max_stored_crits.value >= 2);
    Ok(())
}

#[test]
fn triple_bottom_ones_break_two_player_pace() -> Result<(), GameError> {
    // All three p1 copies at the very bottom of a 2-player deck.
    let p1 = Card::new(4, 1);
    let deck = with_bottom(standard_deck(5, 0), &[p1, p1, p1]);
    let instance = Instance::new(deck, 2)?;
    let result = analyze(&instance, false);
    assert!(
        result
            .reasons
            .iter()
            .any(|r| matches!(r, InfeasibilityReason::TripleBottom1With5s { .. })),
        "found {:?}",
        result.reasons
    );
    assert!(
        result
            .reasons
            .iter()
            .any(|r| matches!(r, InfeasibilityReason::Pace { .. })),
        "found {:?}",
        result.reasons
    );
    Ok(())
}

#[test]
fn double_bottom_twos_break_two_player_pace() -> Result<(), GameError> {
    let p2 = Card::new(4, 2);
    let deck = with_bottom(standard_deck(5, 0), &[p2, p2]);
    let instance = Instance::new(deck, 2)?;
    let result = analyze(&instance, false);
    assert_matches!(
        result
            .reasons
            .iter()
            .find(|r| matches!(r, InfeasibilityReason::DoubleBottom2With5s { .. })),
        Some(_)
    );
    Ok(())
}

#[test]
fn stranded_suit_tail_is_detected() -> Result<(), GameError> {
    // Both b3 copies sit at the bottom while player 0 starts with both b4s
    // and the b5: the blue tail cannot be played inside the final round.
    let b3 = Card::new(3, 3);
    let b4 = Card::new(3, 4);
    let b5 = Card::new(3, 5);
    let mut deck: Vec<Card> = Vec::new();
    deck.push(b4);
    deck.push(b4);
    deck.push(b5);
    for card in standard_deck(5, 0) {
        if card != b3 && card != b4 && card != b5 {
            deck.push(card);
        }
    }
    deck.push(b3);
    deck.push(b3);
    assert_eq!(deck.len(), 50);

    let instance = Instance::new(deck, 2)?;
    let result = analyze(&instance, false);
    assert!(
        result
            .reasons
            .iter()
            .any(|r| matches!(r, InfeasibilityReason::BottomTopDeck { suit: 3 })),
        "found {:?}",
        result.reasons
    );
    Ok(())
}

#[test]
fn list_all_pace_cuts_reports_every_cut() -> Result<(), GameError> {
    let p1 = Card::new(4, 1);
    let deck = with_bottom(standard_deck(5, 0), &[p1, p1, p1]);
    let instance = Instance::new(deck, 2)?;
    let some = analyze(&instance, false);
    let all = analyze(&instance, true);
    let count = |result: &hanasolve::AnalysisResult| {
        result
            .reasons
            .iter()
            .filter(|r| matches!(r, InfeasibilityReason::Pace { .. }))
            .count()
    };
    assert!(count(&all) >= count(&some));
    Ok(())
}
