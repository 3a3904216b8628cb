use std::sync::Arc;

use hanasolve::{Action, Card, GameError, GameState, Instance, standard_deck};

fn deck_of(cards: &str) -> Vec<Card> {
    cards.split_whitespace()
        .map(|s| s.parse().expect("valid card literal"))
        .collect()
}

/// Two interleaved one-copy suits: every draw is immediately playable.
fn mini_instance() -> Instance {
    Instance::builder(deck_of("r1 y1 r2 y2 r3 y3 r4 y4 r5 y5"), 2)
        .hand_size(1)
        .build()
        .expect("valid mini instance")
}

fn accounting_holds(state: &GameState) -> bool {
    let held: usize = state.hands().iter().map(|h| h.len()).sum();
    let played: usize = state.stacks().iter().map(|&s| s as usize).sum();
    held + state.trash().len() + played == state.progress()
}

#[test]
fn card_accounting_stays_balanced() -> Result<(), GameError> {
    let instance = Instance::new(standard_deck(5, 0), 4)?;
    let mut state = GameState::new(Arc::new(instance));
    assert!(accounting_holds(&state));

    state.play(0)?; // r1
    assert!(accounting_holds(&state));
    state.clue()?;
    assert!(accounting_holds(&state));
    state.play(9)?; // player 2 misplays r5
    assert!(accounting_holds(&state));
    state.clue()?;
    state.play(1)?; // second r1 is now trash, strikes again
    assert!(accounting_holds(&state));
    assert_eq!(state.strikes(), 2);
    assert_eq!(state.pace(), 11);
    assert_eq!(
        state.pace(),
        state.instance().initial_pace() - state.trash().len() as i32
    );
    Ok(())
}

#[test]
fn bomb_out_zeroes_the_score() -> Result<(), GameError> {
    let instance = Instance::new(standard_deck(5, 0), 2)?;
    let mut state = GameState::new(Arc::new(instance));
    // Misplays until the third strike ends the game.
    state.play(4)?; // r2 on empty stack
    assert_eq!(state.score(), 0); // nothing played yet
    state.play(7)?; // r3
    assert_eq!(state.strikes(), 2);
    assert!(!state.is_over());
    state.play(3)?;
    assert_eq!(state.strikes(), 3);
    assert!(state.is_over());
    assert_eq!(state.score(), 0);
    assert!(matches!(state.play(0), Err(GameError::GameOver)));
    Ok(())
}

#[test]
fn extra_round_grants_each_player_one_more_turn() -> Result<(), GameError> {
    let mut state = GameState::new(Arc::new(mini_instance()));
    // One clue first, so the last play lands on the final extra turn.
    state.clue()?;
    let plays = [1, 0, 2, 3, 4, 5, 6, 7, 8, 9];
    for (i, &target) in plays.iter().enumerate() {
        assert!(!state.is_over(), "game ended early at play {i}");
        state.play(target)?;
    }
    assert!(state.is_over());
    assert!(state.is_won());
    assert_eq!(state.score(), 10);
    assert_eq!(state.remaining_extra_turns(), 0);
    Ok(())
}

#[test]
fn game_ends_when_extra_turns_run_out() -> Result<(), GameError> {
    let mut state = GameState::new(Arc::new(mini_instance()));
    // Play out the deck but waste the extra round on clues.
    for target in [0, 1, 2, 3, 4, 5, 6, 7] {
        state.play(target)?;
    }
    assert_eq!(state.draw_pile_size(), 0);
    assert_eq!(state.remaining_extra_turns(), 2);
    state.clue()?;
    state.clue()?;
    assert!(state.is_over());
    assert!(!state.is_won());
    assert_eq!(state.score(), 8);
    Ok(())
}

#[test]
fn discard_needs_clue_headroom_and_restores_a_clue() -> Result<(), GameError> {
    let instance = Instance::new(standard_deck(5, 0), 3)?;
    let mut state = GameState::new(Arc::new(instance));
    assert!(matches!(state.discard(0), Err(GameError::DiscardAtClueCap)));
    state.clue()?;
    assert_eq!(state.clues(), 7);
    state.discard(5)?;
    assert_eq!(state.clues(), 8);
    assert_eq!(state.trash(), &[5]);
    Ok(())
}

#[test]
fn clue_starved_restores_half_units() -> Result<(), GameError> {
    let instance = Instance::builder(deck_of("r1 r2 r3 r4 r5 y1 y2 y3 y4 y5"), 2)
        .hand_size(1)
        .clue_starved(true)
        .build()?;
    let mut state = GameState::new(Arc::new(instance));
    assert_eq!(state.clues(), 16);
    state.clue()?; // a full clue costs two half-units
    state.clue()?;
    assert_eq!(state.clues(), 12);
    for target in [0, 1, 2, 3] {
        state.play(target)?;
    }
    assert_eq!(state.clues(), 12);
    state.play(4)?; // r5: restores one half-unit below the cap
    assert_eq!(state.clues(), 13);
    Ok(())
}

#[test]
fn fives_do_not_restore_at_the_cap() -> Result<(), GameError> {
    let instance = Instance::builder(deck_of("r1 r2 r3 r4 r5 y1 y2 y3 y4 y5"), 2)
        .hand_size(1)
        .build()?;
    let mut state = GameState::new(Arc::new(instance));
    for target in [0, 1, 2, 3, 4] {
        state.play(target)?;
    }
    assert_eq!(state.clues(), 8);
    Ok(())
}

#[test]
fn deck_play_of_the_final_card_needs_an_empty_draw_pile() -> Result<(), GameError> {
    let instance = Instance::builder(deck_of("r1 y1 r2 y2 r3 y3 r4 y4 y5 r5"), 2)
        .hand_size(1)
        .deck_plays(true)
        .build()?;
    let mut state = GameState::new(Arc::new(instance));
    // Too early: the last card is still buried.
    assert!(matches!(
        state.play(9),
        Err(GameError::CardNotInHand(9))
    ));
    for target in [0, 1, 2, 3, 4, 5, 6] {
        state.play(target)?;
    }
    // Card 9 (r5) is the lone card left on the pile and r4 just played.
    assert_eq!(state.progress(), 9);
    state.play(9)?; // played straight off the deck
    assert_eq!(state.progress(), 10);
    assert_eq!(state.stacks()[0], 5);
    assert_eq!(state.hands()[1], vec![7]);
    Ok(())
}

#[test]
fn recorded_clues_are_not_content_checked() -> Result<(), GameError> {
    let instance = Instance::new(standard_deck(5, 0), 2)?;
    let mut state = GameState::new(Arc::new(instance));
    // Clue content is recorded as-is; the engine never checks what it touches.
    state.make_action(Action::RankClue { player: 1, rank: 5 })?;
    assert_eq!(state.clues(), 7);
    assert!(matches!(
        state.make_action(Action::ColorClue { player: 7, color: 0 }),
        Err(GameError::InvalidPlayer(7))
    ));
    Ok(())
}

#[test]
fn terminal_actions_end_the_game() -> Result<(), GameError> {
    let instance = Instance::new(standard_deck(5, 0), 2)?;
    let mut state = GameState::new(Arc::new(instance));
    state.play(0)?;
    state.make_action(Action::EndGame {
        player: 1,
        code: Some(2),
    })?;
    assert!(state.is_over());
    assert!(!state.is_won());
    assert_eq!(state.score(), 1);
    assert!(matches!(state.clue(), Err(GameError::GameOver)));
    Ok(())
}

#[test]
fn replay_json_lists_deck_players_and_actions() -> Result<(), GameError> {
    let mut state = GameState::new(Arc::new(mini_instance()));
    state.play(0)?;
    state.clue()?;
    let json = state.to_json();
    assert_eq!(json["players"].as_array().unwrap().len(), 2);
    assert_eq!(json["deck"].as_array().unwrap().len(), 10);
    assert_eq!(json["actions"][0]["type"], 0);
    assert_eq!(json["actions"][0]["target"], 0);
    Ok(())
}
