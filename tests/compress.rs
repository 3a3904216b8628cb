use std::sync::Arc;

use hanasolve::{
    Action, Card, GameError, GameState, Instance, ParseError, compress_actions,
    compress_game_state, decompress_actions, decompress_deck, decompress_link, link,
    standard_deck,
};

#[test]
fn deck_round_trips_for_every_standard_distribution() {
    for (suits, dark) in [(3, 0), (4, 0), (5, 0), (5, 1), (6, 0), (6, 1), (6, 2)] {
        let deck = standard_deck(suits, dark);
        let compressed = hanasolve::compress_deck(&deck).unwrap();
        assert_eq!(
            decompress_deck(&compressed).unwrap(),
            deck,
            "round trip failed for {suits} suits / {dark} dark"
        );
    }
}

#[test]
fn known_deck_encoding() {
    // Rank range 1..=5, so a card encodes as BASE62[5*suit + rank - 1].
    let deck = vec![Card::new(0, 1), Card::new(0, 5), Card::new(1, 1), Card::new(2, 3)];
    assert_eq!(hanasolve::compress_deck(&deck).unwrap(), "15aefm");
    assert_eq!(decompress_deck("15aefm").unwrap(), deck);
}

#[test]
fn actions_round_trip_including_terminals() {
    let actions = vec![
        Action::RankClue { player: 1, rank: 1 },
        Action::Play { target: 3 },
        Action::Discard { target: 0 },
        Action::ColorClue { player: 0, color: 4 },
        Action::EndGame {
            player: 1,
            code: Some(3),
        },
    ];
    let compressed = compress_actions(&actions).unwrap();
    assert_eq!(decompress_actions(&compressed).unwrap(), actions);
}

#[test]
fn vote_terminations_lose_their_code() {
    // Compatibility hack: vote terminations always encode value zero.
    let actions = vec![Action::VoteTerminate {
        player: 0,
        code: Some(7),
    }];
    let compressed = compress_actions(&actions).unwrap();
    assert_eq!(
        decompress_actions(&compressed).unwrap(),
        vec![Action::VoteTerminate {
            player: 0,
            code: None,
        }]
    );
}

#[test]
fn game_state_round_trips_through_the_link_format() -> Result<(), GameError> {
    let instance = Instance::new(standard_deck(5, 0), 3)?;
    let mut state = GameState::new(Arc::new(instance.clone()));
    state.play(0)?;
    state.clue()?;
    state.play(10)?;
    state.clue()?;

    let compressed = compress_game_state(&state).unwrap();
    // A dash every 20 characters, none of them load-bearing.
    assert!(compressed.contains('-'));
    let replay_link = link(&state).unwrap();
    assert!(replay_link.starts_with("https://hanab.live/replay-json/"));

    let decoded = decompress_link(&replay_link).unwrap();
    assert_eq!(decoded.num_players, 3);
    assert_eq!(decoded.deck, instance.deck);
    assert_eq!(decoded.actions, state.actions());
    assert_eq!(decoded.variant_id, 0);

    // Re-applying the decoded actions reproduces the position.
    let rebuilt_instance = Instance::new(decoded.deck, decoded.num_players)?;
    let mut rebuilt = GameState::new(Arc::new(rebuilt_instance));
    for &action in &decoded.actions {
        rebuilt.make_action(action)?;
    }
    assert_eq!(rebuilt.stacks(), state.stacks());
    assert_eq!(rebuilt.trash(), state.trash());
    assert_eq!(rebuilt.score(), state.score());
    Ok(())
}

#[test]
fn malformed_input_is_reported_not_mangled() {
    assert!(matches!(
        decompress_deck(""),
        Err(ParseError::MissingHeader(_))
    ));
    assert!(matches!(
        decompress_deck("x5abc"),
        Err(ParseError::HeaderNotNumeric(_))
    ));
    assert!(matches!(
        decompress_deck("15ab#"),
        Err(ParseError::InvalidCharacter { found: '#', .. })
    ));
    assert!(matches!(
        decompress_actions("30aa"),
        Err(ParseError::InvertedRange { min: 3, max: 0 })
    ));
    assert!(matches!(
        decompress_actions("01aab"),
        Err(ParseError::OddActionLength)
    ));
    assert!(matches!(
        decompress_link("15abc,00,0,extra"),
        Err(ParseError::BadSectionCount {
            expected: 3,
            found: 4
        })
    ));
    assert!(matches!(
        decompress_link("215ab,00,seven"),
        Err(ParseError::BadVariantId(_))
    ));
}
