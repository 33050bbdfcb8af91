//! Batched self-play driver.
//!
//! Plays a batch of games in lockstep: every ply, all still-running games
//! are searched with one [`RootSearch::search_batch`] call, each records its
//! position and visit distribution, and each plays a move. Early moves are
//! sampled from the visit distribution, later ones are greedy.

use crate::config::SelfPlayConfig;
use crate::error::SelfPlayError;
use crate::example::{assign_outcomes, resolve_outcome, PendingStep, TrainingExample};
use qumalaq_core::{Game, Outcome, Player};
use qumalaq_mcts::{Evaluator, RootSearch, SearchStats};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// How a single self-play game went.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub plies: usize,
    /// Result used for labelling; `None` if the game was dropped.
    pub outcome: Option<Outcome>,
    /// Stopped by the ply cap rather than by the rules.
    pub capped: bool,
    pub examples: usize,
}

/// Everything produced by a self-play run.
#[derive(Clone, Debug, Default)]
pub struct SelfPlayReport {
    pub examples: Vec<TrainingExample>,
    pub games: Vec<GameSummary>,
    pub search: SearchStats,
    pub elapsed_ms: u64,
}

impl SelfPlayReport {
    pub fn num_games(&self) -> usize {
        self.games.len()
    }

    pub fn wins(&self, player: Player) -> usize {
        self.games
            .iter()
            .filter(|g| g.outcome == Some(Outcome::Win(player)))
            .count()
    }

    pub fn draws(&self) -> usize {
        self.games
            .iter()
            .filter(|g| g.outcome == Some(Outcome::Draw))
            .count()
    }

    pub fn capped(&self) -> usize {
        self.games.iter().filter(|g| g.capped).count()
    }

    /// Games that produced no training data.
    pub fn dropped(&self) -> usize {
        self.games.iter().filter(|g| g.outcome.is_none()).count()
    }

    pub fn avg_plies(&self) -> f64 {
        if self.games.is_empty() {
            return 0.0;
        }
        self.games.iter().map(|g| g.plies).sum::<usize>() as f64 / self.games.len() as f64
    }

    /// Append another report, e.g. from a parallel shard.
    pub fn merge(&mut self, other: SelfPlayReport) {
        self.examples.extend(other.examples);
        self.games.extend(other.games);
        self.search.merge(&other.search);
        self.elapsed_ms = self.elapsed_ms.max(other.elapsed_ms);
    }
}

/// Self-play driver owning a search engine and a move-sampling RNG.
pub struct SelfPlay<E: Evaluator, R: Rng> {
    config: SelfPlayConfig,
    search: RootSearch<E, R>,
    rng: R,
}

impl<E: Evaluator, R: Rng + SeedableRng> SelfPlay<E, R> {
    /// Create a driver. The search engine gets its own RNG seeded from
    /// `rng`, so noise and move sampling use independent streams.
    pub fn new(config: SelfPlayConfig, evaluator: E, mut rng: R) -> Result<Self, SelfPlayError> {
        config.validate()?;
        let search_rng = R::seed_from_u64(rng.gen());
        let search = RootSearch::new(config.mcts.clone(), evaluator, search_rng)?;

        Ok(Self {
            config,
            search,
            rng,
        })
    }

    pub fn config(&self) -> &SelfPlayConfig {
        &self.config
    }

    pub fn search(&self) -> &RootSearch<E, R> {
        &self.search
    }

    /// Play `num_games` games starting from copies of `prototype`, in
    /// batches of `games_per_batch`.
    pub fn play_games<G: Game>(
        &mut self,
        prototype: &G,
        num_games: usize,
    ) -> Result<SelfPlayReport, SelfPlayError> {
        let start = Instant::now();
        let mut report = SelfPlayReport::default();
        let stats_before = *self.search.total_stats();

        let mut remaining = num_games;
        while remaining > 0 {
            let count = remaining.min(self.config.games_per_batch);
            let games = vec![prototype.clone(); count];
            let (examples, summaries) = self.play_batch(games)?;
            report.examples.extend(examples);
            report.games.extend(summaries);
            remaining -= count;

            info!(
                played = report.num_games(),
                total = num_games,
                examples = report.examples.len(),
                "self-play batch finished"
            );
        }

        report.search = stats_delta(self.search.total_stats(), &stats_before);
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Play the given games to the end (or the ply cap) in lockstep.
    ///
    /// Returns the labelled examples of every scored game and one summary
    /// per input game, in input order.
    pub fn play_batch<G: Game>(
        &mut self,
        mut games: Vec<G>,
    ) -> Result<(Vec<TrainingExample>, Vec<GameSummary>), SelfPlayError> {
        let mut steps: Vec<Vec<PendingStep>> = vec![Vec::new(); games.len()];
        let mut plies = vec![0usize; games.len()];
        let mut active: Vec<usize> = (0..games.len())
            .filter(|&i| !games[i].is_terminal())
            .collect();

        while !active.is_empty() {
            let roots: Vec<&G> = active.iter().map(|&i| &games[i]).collect();
            let results = self.search.search_batch(&roots)?;

            for (&i, result) in active.iter().zip(results) {
                let game = &mut games[i];
                let action = if plies[i] < self.config.temperature_threshold {
                    result.sample_action(&mut self.rng).ok_or_else(|| {
                        SelfPlayError::NoMove(format!("game {i}: visit distribution is empty"))
                    })?
                } else {
                    result.best_action()
                };

                steps[i].push(PendingStep {
                    state: game.encode(),
                    policy: result.policy,
                    mover: game.current_player(),
                });
                game.apply(action)?;
                plies[i] += 1;
            }

            let max_plies = self.config.max_plies;
            active.retain(|&i| !games[i].is_terminal() && plies[i] < max_plies);
            debug!(active = active.len(), "self-play ply done");
        }

        let mut examples = Vec::new();
        let mut summaries = Vec::with_capacity(games.len());
        for ((game, game_steps), plies) in games.iter().zip(steps).zip(plies) {
            let terminal = game.is_terminal();
            if terminal && game.winner().is_none() {
                return Err(SelfPlayError::MissingResult);
            }

            let outcome = resolve_outcome(game, self.config.capped_policy);
            let labelled = match outcome {
                Some(outcome) => assign_outcomes(game_steps, outcome),
                None => Vec::new(),
            };

            summaries.push(GameSummary {
                plies,
                outcome,
                capped: !terminal,
                examples: labelled.len(),
            });
            examples.extend(labelled);
        }

        Ok((examples, summaries))
    }
}

fn stats_delta(after: &SearchStats, before: &SearchStats) -> SearchStats {
    SearchStats {
        searches: after.searches - before.searches,
        games: after.games - before.games,
        simulations: after.simulations - before.simulations,
        evaluator_calls: after.evaluator_calls - before.evaluator_calls,
        root_evaluations: after.root_evaluations - before.root_evaluations,
        leaf_batches: after.leaf_batches - before.leaf_batches,
        leaf_evaluations: after.leaf_evaluations - before.leaf_evaluations,
        terminal_hits: after.terminal_hits - before.terminal_hits,
        elapsed_us: after.elapsed_us - before.elapsed_us,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CappedGamePolicy;
    use qumalaq_mcts::{games::TicTacToe, MctsConfig, UniformEvaluator};
    use rand_chacha::ChaCha8Rng;

    fn driver(config: SelfPlayConfig) -> SelfPlay<UniformEvaluator, ChaCha8Rng> {
        SelfPlay::new(config, UniformEvaluator::new(9), ChaCha8Rng::seed_from_u64(5)).unwrap()
    }

    fn small_config() -> SelfPlayConfig {
        SelfPlayConfig::default()
            .with_mcts(MctsConfig::with_simulations(16).with_leaf_batch_size(8))
            .with_games_per_batch(4)
            .with_temperature_threshold(2)
    }

    #[test]
    fn test_one_example_per_ply() {
        let mut selfplay = driver(small_config());
        let report = selfplay.play_games(&TicTacToe::new(), 6).unwrap();

        assert_eq!(report.num_games(), 6);
        let plies: usize = report.games.iter().map(|g| g.plies).sum();
        assert_eq!(report.examples.len(), plies);
        assert!(report.games.iter().all(|g| !g.capped && g.outcome.is_some()));
        // One search per ply across the longest game of each batch at most.
        assert!(report.search.searches as usize <= plies);
        assert_eq!(report.search.games as usize, plies);
    }

    #[test]
    fn test_already_finished_game_plays_no_moves() {
        let mut finished = TicTacToe::new();
        for action in [0, 3, 1, 4, 2] {
            finished.apply(action).unwrap();
        }

        let mut selfplay = driver(small_config());
        let (examples, summaries) = selfplay.play_batch(vec![finished]).unwrap();

        assert!(examples.is_empty());
        assert_eq!(summaries[0].plies, 0);
        assert_eq!(summaries[0].outcome, Some(Outcome::Win(Player::First)));
    }

    #[test]
    fn test_capped_games_follow_policy() {
        let config = small_config().with_max_plies(3);

        let mut exclude = driver(config.clone().with_capped_policy(CappedGamePolicy::Exclude));
        let report = exclude.play_games(&TicTacToe::new(), 3).unwrap();
        assert!(report.examples.is_empty());
        assert_eq!(report.capped(), 3);
        assert_eq!(report.dropped(), 3);

        let mut draw = driver(config.with_capped_policy(CappedGamePolicy::Draw));
        let report = draw.play_games(&TicTacToe::new(), 3).unwrap();
        assert_eq!(report.examples.len(), 9);
        assert!(report.examples.iter().all(|e| e.value == 0.0));
        assert_eq!(report.draws(), 3);
    }

    #[test]
    fn test_report_merge() {
        let mut a = SelfPlayReport::default();
        let mut selfplay = driver(small_config());
        let b = selfplay.play_games(&TicTacToe::new(), 2).unwrap();
        let games = b.num_games();
        a.merge(b);
        assert_eq!(a.num_games(), games);
        assert!(a.avg_plies() >= 5.0);
    }
}
