//! Training examples and outcome assignment.

use crate::config::CappedGamePolicy;
use qumalaq_core::{Game, Outcome, Player};
use serde::{Deserialize, Serialize};

/// One position of a finished game, labelled for training.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Encoded position, from the mover's point of view.
    pub state: Vec<f32>,

    /// Search visit distribution over the full action space.
    pub policy: Vec<f32>,

    /// Final result for the mover: +1 win, -1 loss, 0 draw.
    pub value: f32,

    /// Player to move in this position.
    pub mover: Player,
}

/// A recorded position whose game has not finished yet.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingStep {
    pub state: Vec<f32>,
    pub policy: Vec<f32>,
    pub mover: Player,
}

/// Result used to label a game's positions, or `None` to drop the game.
///
/// Finished games use the rules' result. Games stopped by the ply cap are
/// scored according to `policy`.
pub fn resolve_outcome<G: Game>(game: &G, policy: CappedGamePolicy) -> Option<Outcome> {
    if game.is_terminal() {
        return game.winner();
    }
    match policy {
        CappedGamePolicy::Adjudicate => game.winner(),
        CappedGamePolicy::Exclude => None,
        CappedGamePolicy::Draw => Some(Outcome::Draw),
    }
}

/// Label every step with the final result seen from its mover.
pub fn assign_outcomes(steps: Vec<PendingStep>, outcome: Outcome) -> Vec<TrainingExample> {
    steps
        .into_iter()
        .map(|step| TrainingExample {
            value: outcome.value_for(step.mover).get(),
            state: step.state,
            policy: step.policy,
            mover: step.mover,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qumalaq_mcts::games::TicTacToe;

    fn step(mover: Player) -> PendingStep {
        PendingStep {
            state: vec![0.0; 2],
            policy: vec![1.0, 0.0],
            mover,
        }
    }

    #[test]
    fn test_assign_outcomes_sign_per_mover() {
        let steps = vec![step(Player::First), step(Player::Second), step(Player::First)];
        let examples = assign_outcomes(steps, Outcome::Win(Player::Second));

        let values: Vec<f32> = examples.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![-1.0, 1.0, -1.0]);
        assert_eq!(examples[1].mover, Player::Second);
    }

    #[test]
    fn test_assign_outcomes_draw() {
        let examples = assign_outcomes(vec![step(Player::First), step(Player::Second)], Outcome::Draw);
        assert!(examples.iter().all(|e| e.value == 0.0));
    }

    #[test]
    fn test_resolve_outcome_for_unfinished_game() {
        let mut game = TicTacToe::new();
        game.apply(4).unwrap();

        // Tic-tac-toe has no verdict for an unfinished board.
        assert_eq!(resolve_outcome(&game, CappedGamePolicy::Adjudicate), None);
        assert_eq!(resolve_outcome(&game, CappedGamePolicy::Exclude), None);
        assert_eq!(resolve_outcome(&game, CappedGamePolicy::Draw), Some(Outcome::Draw));
    }

    #[test]
    fn test_resolve_outcome_for_finished_game() {
        let mut game = TicTacToe::new();
        for action in [0, 3, 1, 4, 2] {
            game.apply(action).unwrap();
        }

        for policy in [
            CappedGamePolicy::Adjudicate,
            CappedGamePolicy::Exclude,
            CappedGamePolicy::Draw,
        ] {
            assert_eq!(
                resolve_outcome(&game, policy),
                Some(Outcome::Win(Player::First))
            );
        }
    }
}
