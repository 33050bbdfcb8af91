//! Batched depth-1 root search.
//!
//! A search call takes a batch of live games and runs the same number of
//! simulations for each of them. Statistics exist only at the root: each
//! simulation picks a root action with PUCT, plays it on a scratch copy of
//! the root and scores the resulting position. Terminal positions are
//! scored on the spot; everything else is queued and evaluated in batches
//! shared across all games.
//!
//! Leaf statistics are only updated when the queue is flushed, so with a
//! large `leaf_batch_size` several simulations select against the same
//! (stale) statistics. This is what keeps evaluator calls large.

use crate::{
    config::{ConfigError, MctsConfig},
    evaluator::{Evaluation, Evaluator, EvaluatorError},
    queue::LeafQueue,
    root::RootSlot,
};
use qumalaq_core::{Game, Player, Policy};
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors returned by [`RootSearch`].
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid game state: {0}")]
    InvalidGameState(String),

    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),

    #[error("malformed evaluation: {0}")]
    MalformedEvaluation(String),

    #[error("invalid search config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("root noise: {0}")]
    Noise(String),
}

/// Result of searching one root.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// Visit distribution over the full action space. Sums to 1; zero on
    /// invalid actions.
    pub policy: Vec<f32>,

    /// Root prior actually used for selection (masked, possibly noised).
    pub prior: Vec<f32>,

    /// Visits per root action.
    pub visit_counts: Vec<u32>,

    /// Accumulated values per root action, from the root mover's view.
    pub value_sums: Vec<f32>,
}

impl SearchResult {
    pub fn total_visits(&self) -> u32 {
        self.visit_counts.iter().sum()
    }

    /// Mean value of `action` from the root mover's view, 0.0 if unvisited.
    pub fn q_value(&self, action: usize) -> f32 {
        match self.visit_counts.get(action) {
            Some(&n) if n > 0 => self.value_sums[action] / n as f32,
            _ => 0.0,
        }
    }

    /// Most visited action (first one on ties).
    pub fn best_action(&self) -> usize {
        let mut best = 0;
        for (action, &p) in self.policy.iter().enumerate() {
            if p > self.policy[best] {
                best = action;
            }
        }
        best
    }

    /// Visit-weighted value of the root from the mover's view.
    pub fn root_value(&self) -> f32 {
        match self.total_visits() {
            0 => 0.0,
            total => self.value_sums.iter().sum::<f32>() / total as f32,
        }
    }

    /// Sample an action in proportion to the visit distribution.
    pub fn sample_action<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        WeightedIndex::new(&self.policy)
            .ok()
            .map(|dist| dist.sample(rng))
    }

    /// The visit distribution as a checked [`Policy`].
    pub fn typed_policy(&self) -> qumalaq_core::Result<Policy> {
        Policy::new(self.policy.clone())
    }
}

/// Counters for one or more search calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub searches: u64,
    pub games: u64,
    pub simulations: u64,
    pub evaluator_calls: u64,
    pub root_evaluations: u64,
    pub leaf_batches: u64,
    pub leaf_evaluations: u64,
    pub terminal_hits: u64,
    pub elapsed_us: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.searches += other.searches;
        self.games += other.games;
        self.simulations += other.simulations;
        self.evaluator_calls += other.evaluator_calls;
        self.root_evaluations += other.root_evaluations;
        self.leaf_batches += other.leaf_batches;
        self.leaf_evaluations += other.leaf_evaluations;
        self.terminal_hits += other.terminal_hits;
        self.elapsed_us += other.elapsed_us;
    }

    /// Average number of leaves per flushed batch.
    pub fn avg_leaf_batch(&self) -> f64 {
        if self.leaf_batches == 0 {
            0.0
        } else {
            self.leaf_evaluations as f64 / self.leaf_batches as f64
        }
    }
}

/// Batched root search with PUCT selection.
///
/// Generic over:
/// - `E`: the batched evaluator
/// - `R`: the random number generator used for root noise
pub struct RootSearch<E: Evaluator, R: Rng> {
    config: MctsConfig,
    evaluator: E,
    rng: R,
    last_stats: SearchStats,
    total_stats: SearchStats,
}

impl<E: Evaluator, R: Rng> RootSearch<E, R> {
    /// Create a search engine.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the config fails validation.
    pub fn new(config: MctsConfig, evaluator: E, rng: R) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            config,
            evaluator,
            rng,
            last_stats: SearchStats::default(),
            total_stats: SearchStats::default(),
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Counters of the most recent search call.
    pub fn last_stats(&self) -> &SearchStats {
        &self.last_stats
    }

    /// Counters accumulated over the lifetime of this engine.
    pub fn total_stats(&self) -> &SearchStats {
        &self.total_stats
    }

    /// Search a single game.
    pub fn search<G: Game>(&mut self, game: &G) -> Result<SearchResult, SearchError> {
        self.search_batch(&[game])?
            .pop()
            .ok_or_else(|| SearchError::InvalidGameState("search returned no result".to_string()))
    }

    /// Search every game of the batch, returning one result per game in
    /// input order.
    ///
    /// The evaluator is called once for all roots and then once per flush
    /// of the shared leaf queue. An empty batch returns immediately without
    /// touching the evaluator.
    ///
    /// # Errors
    /// - `InvalidGameState` if a game is terminal or has no valid action
    /// - `Evaluator` if the evaluator fails
    /// - `MalformedEvaluation` if the evaluator returns the wrong number of
    ///   results, a policy of the wrong length or a non-finite value
    pub fn search_batch<G: Game>(&mut self, games: &[&G]) -> Result<Vec<SearchResult>, SearchError> {
        if games.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let mut stats = SearchStats {
            searches: 1,
            games: games.len() as u64,
            ..Default::default()
        };

        let mut slots = games
            .iter()
            .enumerate()
            .map(|(index, game)| RootSlot::new(*game, index))
            .collect::<Result<Vec<_>, _>>()?;

        // Root priors: one evaluator call for the whole batch.
        let encodings = games
            .iter()
            .map(|game| checked_encoding(*game))
            .collect::<Result<Vec<_>, _>>()?;
        let evaluations = self.evaluate(&encodings, &mut stats)?;
        stats.root_evaluations += evaluations.len() as u64;

        for (slot, evaluation) in slots.iter_mut().zip(&evaluations) {
            let prior = self.root_prior(slot.mask(), evaluation)?;
            slot.set_prior(prior);
        }

        let num_simulations = self.config.num_simulations;
        let c_puct = self.config.c_puct;
        let mut queue = LeafQueue::with_capacity(self.config.leaf_batch_size.min(4096));

        for sim in 0..num_simulations {
            for (index, slot) in slots.iter_mut().enumerate() {
                let action = slot.select(c_puct)?;
                let mover = slot.mover();
                let leaf = slot.fork(action)?;
                stats.simulations += 1;

                if leaf.is_terminal() {
                    let value = terminal_value(leaf, mover)?;
                    slot.record(action, value);
                    stats.terminal_hits += 1;
                } else {
                    let encoding = checked_encoding(leaf)?;
                    queue.push(encoding, index, action);
                }
            }

            let last = sim + 1 == num_simulations;
            if queue.len() >= self.config.leaf_batch_size || (last && !queue.is_empty()) {
                self.flush(&mut queue, &mut slots, &mut stats)?;
            }
        }

        let results = slots
            .into_iter()
            .map(RootSlot::into_result)
            .collect::<Result<Vec<_>, _>>()?;

        stats.elapsed_us = start.elapsed().as_micros() as u64;
        debug!(
            games = stats.games,
            simulations = stats.simulations,
            evaluator_calls = stats.evaluator_calls,
            leaf_batches = stats.leaf_batches,
            terminal_hits = stats.terminal_hits,
            elapsed_us = stats.elapsed_us,
            "root search finished"
        );

        self.total_stats.merge(&stats);
        self.last_stats = stats;
        Ok(results)
    }

    /// Call the evaluator and check that it answered every encoding.
    fn evaluate(
        &self,
        batch: &[Vec<f32>],
        stats: &mut SearchStats,
    ) -> Result<Vec<Evaluation>, SearchError> {
        let evaluations = self.evaluator.evaluate(batch)?;
        stats.evaluator_calls += 1;

        if evaluations.len() != batch.len() {
            return Err(SearchError::MalformedEvaluation(format!(
                "evaluator returned {} results for {} positions",
                evaluations.len(),
                batch.len()
            )));
        }
        Ok(evaluations)
    }

    /// Mask and renormalize the evaluator policy, then mix in root noise.
    fn root_prior(&mut self, mask: &[bool], evaluation: &Evaluation) -> Result<Vec<f32>, SearchError> {
        let num_actions = mask.len();
        if evaluation.policy.len() != num_actions {
            return Err(SearchError::MalformedEvaluation(format!(
                "policy has {} entries, expected {num_actions}",
                evaluation.policy.len()
            )));
        }

        let prior = Policy::masked(&evaluation.policy, mask)
            .map_err(|e| SearchError::MalformedEvaluation(e.to_string()))?;

        // Dirichlet needs at least two components.
        if !self.config.noise_enabled() || num_actions < 2 {
            return Ok(prior.into_inner());
        }

        let alpha = vec![self.config.dirichlet_alpha; num_actions];
        let dirichlet = Dirichlet::new(&alpha).map_err(|e| SearchError::Noise(e.to_string()))?;
        let noise: Vec<f32> = dirichlet.sample(&mut self.rng);

        let eps = self.config.dirichlet_epsilon;
        let mixed: Vec<f32> = prior
            .iter()
            .zip(&noise)
            .zip(mask)
            .map(|((&p, &n), &valid)| if valid { (1.0 - eps) * p + eps * n } else { 0.0 })
            .collect();

        Ok(Policy::masked(&mixed, mask)
            .map_err(|e| SearchError::MalformedEvaluation(e.to_string()))?
            .into_inner())
    }

    /// Evaluate every queued leaf and back its value up to the owning root.
    fn flush<G: Game>(
        &mut self,
        queue: &mut LeafQueue,
        slots: &mut [RootSlot<G>],
        stats: &mut SearchStats,
    ) -> Result<(), SearchError> {
        let evaluations = self.evaluate(queue.encodings(), stats)?;
        stats.leaf_batches += 1;
        stats.leaf_evaluations += evaluations.len() as u64;
        trace!(leaves = evaluations.len(), "flushing leaf queue");

        for (owner, evaluation) in queue.owners().iter().zip(&evaluations) {
            if !evaluation.value.is_finite() {
                return Err(SearchError::MalformedEvaluation(format!(
                    "non-finite leaf value {}",
                    evaluation.value
                )));
            }
            // Leaf values are from the leaf mover's view, i.e. the opponent
            // of the root mover.
            slots[owner.game].record(owner.action, -evaluation.value);
        }

        queue.clear();
        Ok(())
    }
}

/// Exact result of a finished leaf from `root_mover`'s view.
fn terminal_value<G: Game>(leaf: &G, root_mover: Player) -> Result<f32, SearchError> {
    leaf.winner()
        .map(|outcome| outcome.value_for(root_mover).get())
        .ok_or_else(|| SearchError::InvalidGameState("terminal position has no result".to_string()))
}

fn checked_encoding<G: Game>(game: &G) -> Result<Vec<f32>, SearchError> {
    let encoding = game.encode();
    if encoding.len() != game.encoding_len() {
        return Err(SearchError::InvalidGameState(format!(
            "encoding has {} entries, expected {}",
            encoding.len(),
            game.encoding_len()
        )));
    }
    Ok(encoding)
}
