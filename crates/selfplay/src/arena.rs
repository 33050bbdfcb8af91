//! Matches between a search player and a baseline opponent.

use crate::error::SelfPlayError;
use qumalaq_core::{Game, Outcome, Player};
use qumalaq_mcts::{Evaluator, RootSearch};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A non-search player used as a baseline.
pub trait Opponent<G: Game> {
    fn name(&self) -> &str;

    /// Pick a valid action for the side to move.
    fn select(&mut self, game: &G) -> Result<usize, SelfPlayError>;
}

/// Plays a uniformly random valid action.
pub struct RandomOpponent<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomOpponent<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<G: Game, R: Rng> Opponent<G> for RandomOpponent<R> {
    fn name(&self) -> &str {
        "random"
    }

    fn select(&mut self, game: &G) -> Result<usize, SelfPlayError> {
        game.valid_actions()
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| SelfPlayError::NoMove("no valid actions".to_string()))
    }
}

/// Score of the search player over a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaResult {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub games: usize,
    pub plies: usize,
}

impl ArenaResult {
    /// Fraction of points won, draws counting half.
    pub fn win_rate(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        (self.wins as f32 + 0.5 * self.draws as f32) / self.games as f32
    }

    pub fn avg_plies(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.plies as f32 / self.games as f32
    }

    fn record(&mut self, outcome: Outcome, search_player: Player, plies: usize) {
        match outcome.winner() {
            Some(winner) if winner == search_player => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
        self.games += 1;
        self.plies += plies;
    }
}

/// Play `num_games` games of the search player against `opponent`.
///
/// The search player always plays its most visited action, so `search`
/// should be configured without exploration noise. It moves first in even
/// games and second in odd ones. Games reaching `max_plies` are scored by
/// [`Game::winner`], or as a draw if the game has no result yet.
pub fn play_arena<G, E, R, O>(
    search: &mut RootSearch<E, R>,
    opponent: &mut O,
    prototype: &G,
    num_games: usize,
    max_plies: usize,
) -> Result<ArenaResult, SelfPlayError>
where
    G: Game,
    E: Evaluator,
    R: Rng,
    O: Opponent<G> + ?Sized,
{
    let mut result = ArenaResult::default();

    for i in 0..num_games {
        let search_player = if i % 2 == 0 {
            Player::First
        } else {
            Player::Second
        };

        let mut game = prototype.clone();
        let mut plies = 0;
        while !game.is_terminal() && plies < max_plies {
            let action = if game.current_player() == search_player {
                search.search(&game)?.best_action()
            } else {
                opponent.select(&game)?
            };
            game.apply(action)?;
            plies += 1;
        }

        let outcome = game.winner().unwrap_or(Outcome::Draw);
        result.record(outcome, search_player, plies);
        debug!(game = i, %search_player, ?outcome, plies, "arena game finished");

        if (i + 1) % 10 == 0 || i + 1 == num_games {
            info!(
                played = i + 1,
                total = num_games,
                wins = result.wins,
                losses = result.losses,
                draws = result.draws,
                opponent = opponent.name(),
                "arena progress"
            );
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qumalaq_mcts::games::TicTacToe;
    use qumalaq_mcts::{MctsConfig, UniformEvaluator};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_win_rate_counts_draws_half() {
        let result = ArenaResult {
            wins: 3,
            losses: 1,
            draws: 2,
            games: 6,
            plies: 60,
        };
        assert!((result.win_rate() - 4.0 / 6.0).abs() < 1e-6);
        assert_eq!(result.avg_plies(), 10.0);
        assert_eq!(ArenaResult::default().win_rate(), 0.0);
    }

    #[test]
    fn test_random_opponent_plays_valid_actions() {
        let mut opponent = RandomOpponent::new(ChaCha8Rng::seed_from_u64(1));
        let mut game = TicTacToe::new();
        while !game.is_terminal() {
            let action = Opponent::<TicTacToe>::select(&mut opponent, &game).unwrap();
            assert!(game.valid_mask()[action]);
            game.apply(action).unwrap();
        }
        assert!(Opponent::<TicTacToe>::select(&mut opponent, &game).is_err());
    }

    #[test]
    fn test_arena_totals() {
        let mut search = RootSearch::new(
            MctsConfig::for_evaluation(32),
            UniformEvaluator::new(9),
            ChaCha8Rng::seed_from_u64(2),
        )
        .unwrap();
        let mut opponent = RandomOpponent::new(ChaCha8Rng::seed_from_u64(3));

        let result = play_arena(&mut search, &mut opponent, &TicTacToe::new(), 6, 9).unwrap();

        assert_eq!(result.games, 6);
        assert_eq!(result.wins + result.losses + result.draws, 6);
        assert!(result.plies >= 6 * 5);
    }

    #[test]
    fn test_ply_cap_scores_unfinished_games() {
        let mut search = RootSearch::new(
            MctsConfig::for_evaluation(8),
            UniformEvaluator::new(9),
            ChaCha8Rng::seed_from_u64(2),
        )
        .unwrap();
        let mut opponent = RandomOpponent::new(ChaCha8Rng::seed_from_u64(3));

        // Two plies never finish a game of tic-tac-toe.
        let result = play_arena(&mut search, &mut opponent, &TicTacToe::new(), 4, 2).unwrap();
        assert_eq!(result.draws, 4);
        assert_eq!(result.plies, 8);
    }
}
