//! Property-based tests for outcome labelling.

use proptest::prelude::*;
use qumalaq_core::{Game, Outcome, Player};
use qumalaq_mcts::games::TicTacToe;
use qumalaq_selfplay::{assign_outcomes, resolve_outcome, CappedGamePolicy, PendingStep};

fn arb_player() -> impl Strategy<Value = Player> {
    prop_oneof![Just(Player::First), Just(Player::Second)]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Draw), arb_player().prop_map(Outcome::Win)]
}

fn arb_policy() -> impl Strategy<Value = CappedGamePolicy> {
    prop_oneof![
        Just(CappedGamePolicy::Adjudicate),
        Just(CappedGamePolicy::Exclude),
        Just(CappedGamePolicy::Draw),
    ]
}

/// Tic-tac-toe after playing `picks` as indices into the valid actions,
/// stopping once the game is over.
fn play(picks: &[usize]) -> TicTacToe {
    let mut game = TicTacToe::new();
    for &pick in picks {
        if game.is_terminal() {
            break;
        }
        let actions = game.valid_actions();
        game.apply(actions[pick % actions.len()]).unwrap();
    }
    game
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every step keeps its data and is labelled from its own mover's view.
    #[test]
    fn prop_values_follow_mover(
        movers in prop::collection::vec(arb_player(), 0..40),
        outcome in arb_outcome(),
    ) {
        let steps: Vec<PendingStep> = movers
            .iter()
            .enumerate()
            .map(|(i, &mover)| PendingStep {
                state: vec![i as f32],
                policy: vec![1.0],
                mover,
            })
            .collect();

        let examples = assign_outcomes(steps, outcome);
        prop_assert_eq!(examples.len(), movers.len());

        for (i, (example, &mover)) in examples.iter().zip(&movers).enumerate() {
            prop_assert_eq!(example.mover, mover);
            prop_assert_eq!(example.state[0], i as f32);
            let expected = match outcome.winner() {
                None => 0.0,
                Some(winner) if winner == mover => 1.0,
                Some(_) => -1.0,
            };
            prop_assert_eq!(example.value, expected);
        }
    }

    /// Finished games always keep their rules result; unfinished ones depend
    /// on the capped-game policy.
    #[test]
    fn prop_resolve_outcome(
        picks in prop::collection::vec(0usize..9, 0..9),
        policy in arb_policy(),
    ) {
        let game = play(&picks);
        let resolved = resolve_outcome(&game, policy);

        if game.is_terminal() {
            prop_assert_eq!(resolved, game.winner());
            prop_assert!(resolved.is_some());
        } else {
            match policy {
                CappedGamePolicy::Adjudicate => {
                    prop_assert_eq!(resolved, game.winner());
                }
                CappedGamePolicy::Exclude => {
                    prop_assert_eq!(resolved, None);
                }
                CappedGamePolicy::Draw => {
                    prop_assert_eq!(resolved, Some(Outcome::Draw));
                }
            }
        }
    }
}
