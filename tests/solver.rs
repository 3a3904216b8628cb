use std::sync::Arc;

use hanasolve::{
    Action, Card, GameError, GameState, Instance, RecordedGame, analyze, check_game, sat,
    solve, solve_instance,
};

fn deck_of(cards: &str) -> Vec<Card> {
    cards.split_whitespace()
        .map(|s| s.parse().expect("valid card literal"))
        .collect()
}

/// Two interleaved one-copy suits with one-card hands: winnable exactly by
/// running the table, with zero pace to spare.
fn mini_instance() -> Instance {
    Instance::builder(deck_of("r1 y1 r2 y2 r3 y3 r4 y4 r5 y5"), 2)
        .hand_size(1)
        .build()
        .expect("valid mini instance")
}

/// One light and one dark suit with two-card hands and a little pace slack.
fn slack_instance() -> Instance {
    Instance::builder(
        deck_of("r4 r4 y1 r1 r1 r1 r2 r2 r3 r3 r5 y2 y3 y4 y5"),
        2,
    )
    .hand_size(2)
    .build()
    .expect("valid slack instance")
}

fn fresh(instance: &Instance) -> GameState {
    GameState::new(Arc::new(instance.clone()))
}

/// Replays a certificate from scratch and checks it wins without any rule
/// violation.
fn assert_winning_certificate(instance: &Instance, certificate: &GameState) {
    let mut replay = fresh(instance);
    for &action in certificate.actions() {
        replay.make_action(action).expect("legal certificate action");
    }
    assert!(replay.is_won(), "certificate does not win");
    assert_eq!(replay.score(), instance.max_score());
}

#[test]
fn sat_finds_a_replay_for_the_mini_deck() -> Result<(), GameError> {
    let instance = mini_instance();
    let (solvable, solution) = sat::solve(&fresh(&instance))?;
    assert!(solvable);
    assert_winning_certificate(&instance, &solution.expect("certificate"));
    Ok(())
}

#[test]
fn sat_refutes_the_reversed_mini_deck() -> Result<(), GameError> {
    let mut deck = deck_of("r1 y1 r2 y2 r3 y3 r4 y4 r5 y5");
    deck.reverse();
    let instance = Instance::builder(deck, 2).hand_size(1).build()?;
    let (solvable, solution) = sat::solve(&fresh(&instance))?;
    assert!(!solvable);
    assert!(solution.is_none());
    // The static sieve agrees (S2): the bottom card is a dark non-five.
    assert!(analyze(&instance, false).is_infeasible());
    Ok(())
}

#[test]
fn sat_solves_the_slack_deck_with_discards() -> Result<(), GameError> {
    let instance = slack_instance();
    assert!(!analyze(&instance, false).is_infeasible());
    let (solvable, solution) = sat::solve(&fresh(&instance))?;
    assert!(solvable);
    assert_winning_certificate(&instance, &solution.expect("certificate"));
    Ok(())
}

#[test]
fn sat_warm_start_mid_game() -> Result<(), GameError> {
    let instance = mini_instance();
    let mut state = fresh(&instance);
    // One clue, then ride the table for a few plays.
    state.clue()?;
    for target in [1, 0, 2, 3] {
        state.play(target)?;
    }
    let (solvable, solution) = sat::solve(&state)?;
    assert!(solvable);
    let finished = solution.expect("certificate");
    assert!(finished.is_won());
    // The certificate extends the probed prefix, never rewrites it.
    assert_eq!(&finished.actions()[..state.actions().len()], state.actions());
    Ok(())
}

#[test]
fn sat_warm_start_inside_the_extra_round() -> Result<(), GameError> {
    let instance = mini_instance();
    let mut state = fresh(&instance);
    state.clue()?;
    for target in [1, 0, 2, 3, 4, 5, 6, 7, 8] {
        state.play(target)?;
    }
    // Deck is gone; only the final extra turn remains, and it must be the
    // winning y5 play.
    assert_eq!(state.draw_pile_size(), 0);
    assert_eq!(state.remaining_extra_turns(), 1);
    let (solvable, solution) = sat::solve(&state)?;
    assert!(solvable);
    let finished = solution.expect("certificate");
    assert!(finished.is_won());
    assert_eq!(finished.actions().len(), state.actions().len() + 1);
    Ok(())
}

#[test]
fn sat_refutes_a_state_that_trashed_a_needed_card() -> Result<(), GameError> {
    let instance = slack_instance();
    let mut state = fresh(&instance);
    // Burn both r4 copies; the red stack can never finish.
    state.clue()?;
    state.clue()?;
    state.discard(0)?;
    state.clue()?;
    state.discard(1)?;
    let (solvable, _) = sat::solve(&state)?;
    assert!(!solvable);
    Ok(())
}

#[test]
fn solver_cascade_short_circuits_on_static_reasons() -> Result<(), GameError> {
    // Big deck, fatal bottom: the analyzer certificate must answer without
    // any SAT work (this returns quickly even at 50 cards).
    let p4 = Card::new(4, 4);
    let mut deck: Vec<Card> = hanasolve::standard_deck(5, 1)
        .into_iter()
        .filter(|&c| c != p4)
        .collect();
    deck.push(p4);
    let instance = Instance::new(deck, 5)?;
    let (solvable, solution) = solve_instance(&instance)?;
    assert!(!solvable);
    assert!(solution.is_none());
    Ok(())
}

#[test]
fn solver_cascade_wins_with_greedy_before_sat() -> Result<(), GameError> {
    let instance = mini_instance();
    let (solvable, solution) = solve(&fresh(&instance))?;
    assert!(solvable);
    assert_winning_certificate(&instance, &solution.expect("certificate"));
    Ok(())
}

#[test]
fn bisection_reports_a_winning_replay_untouched() -> Result<(), GameError> {
    let instance = mini_instance();
    let actions: Vec<Action> = (0..10).map(|target| Action::Play { target }).collect();
    let outcome = check_game(&RecordedGame {
        instance: instance.clone(),
        actions,
    })?;
    assert_eq!(outcome.first_losing_turn, 11);
    let certificate = outcome.certificate.expect("replayed state");
    assert!(certificate.is_won());
    Ok(())
}

#[test]
fn bisection_pinpoints_the_losing_discard() -> Result<(), GameError> {
    let instance = mini_instance();
    // Two harmless clues, then a discard that butchers the red suit, then
    // noise until the recorded game gives up.
    let actions = vec![
        Action::RankClue { player: 1, rank: 1 },
        Action::RankClue { player: 0, rank: 1 },
        Action::Discard { target: 0 },
        Action::RankClue { player: 0, rank: 1 },
        Action::EndGame {
            player: 1,
            code: Some(1),
        },
    ];
    let outcome = check_game(&RecordedGame {
        instance: instance.clone(),
        actions,
    })?;
    assert_eq!(outcome.first_losing_turn, 3);
    let certificate = outcome.certificate.expect("certificate");
    assert!(certificate.is_won());
    // The certificate honors the two recorded clues (S3: feasibility is
    // monotone, so the prefix of length 2 is the last winnable one).
    assert_eq!(certificate.actions()[0].kind(), 3);
    assert_eq!(certificate.actions()[1].kind(), 3);
    assert!(matches!(certificate.actions()[2], Action::Play { .. }));
    Ok(())
}

#[test]
fn bisection_flags_unwinnable_instances_immediately() -> Result<(), GameError> {
    let mut deck = deck_of("r1 y1 r2 y2 r3 y3 r4 y4 r5 y5");
    deck.reverse();
    let instance = Instance::builder(deck, 2).hand_size(1).build()?;
    let actions = vec![Action::RankClue { player: 1, rank: 5 }];
    let outcome = check_game(&RecordedGame { instance, actions })?;
    assert_eq!(outcome.first_losing_turn, 0);
    assert!(outcome.certificate.is_none());
    Ok(())
}
