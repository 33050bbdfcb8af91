//! Per-game root statistics.
//!
//! Statistics live only at the root: every simulation expands a single ply,
//! so one pair of arrays indexed by action is all the "tree" there is. A
//! [`RootSlot`] is allocated per game at the start of a search call and
//! dropped when the call returns; nothing carries over between plies.

use crate::search::{SearchError, SearchResult};
use qumalaq_core::{Game, Player, Policy};

/// Visit counts and accumulated values, indexed by action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionStats {
    visit_counts: Vec<u32>,
    value_sums: Vec<f32>,
}

impl ActionStats {
    /// Zeroed statistics for `num_actions` actions.
    pub fn new(num_actions: usize) -> Self {
        Self {
            visit_counts: vec![0; num_actions],
            value_sums: vec![0.0; num_actions],
        }
    }

    /// Count one visit of `action` with `value` from the root mover's view.
    pub fn record(&mut self, action: usize, value: f32) {
        self.visit_counts[action] += 1;
        self.value_sums[action] += value;
    }

    pub fn visit_count(&self, action: usize) -> u32 {
        self.visit_counts[action]
    }

    pub fn value_sum(&self, action: usize) -> f32 {
        self.value_sums[action]
    }

    /// Sum of visits over all actions.
    pub fn total_visits(&self) -> u32 {
        self.visit_counts.iter().sum()
    }

    /// Mean value (Q-value) of an action, 0.0 if never visited.
    pub fn mean_value(&self, action: usize) -> f32 {
        match self.visit_counts[action] {
            0 => 0.0,
            n => self.value_sums[action] / n as f32,
        }
    }

    /// Pick the action with the highest PUCT score.
    ///
    /// `score(a) = Q(a) + c_puct * P(a) * sqrt(N + 1) / (1 + N(a))`
    ///
    /// Invalid actions are never chosen. Ties go to the lowest index.
    /// Returns `None` only if `mask` has no valid entry.
    pub fn select(&self, prior: &[f32], mask: &[bool], c_puct: f32) -> Option<usize> {
        let sqrt_total = (self.total_visits() as f32 + 1.0).sqrt();

        let mut best: Option<(usize, f32)> = None;
        for (action, &valid) in mask.iter().enumerate() {
            if !valid {
                continue;
            }
            let visits = self.visit_counts[action] as f32;
            let score =
                self.mean_value(action) + c_puct * prior[action] * sqrt_total / (1.0 + visits);

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((action, score)),
            }
        }

        best.map(|(action, _)| action)
    }

    /// Normalized visit counts, or uniform over `mask` if nothing was visited.
    pub fn visit_policy(&self, mask: &[bool]) -> qumalaq_core::Result<Policy> {
        let total = self.total_visits();
        if total == 0 {
            return Policy::uniform_over(mask);
        }
        Policy::from_unnormalized(self.visit_counts.iter().map(|&n| n as f32).collect())
    }

    pub fn into_parts(self) -> (Vec<u32>, Vec<f32>) {
        (self.visit_counts, self.value_sums)
    }
}

/// Search state for one game of the batch.
pub(crate) struct RootSlot<G: Game> {
    root: G::State,
    scratch: G,
    mover: Player,
    mask: Vec<bool>,
    prior: Vec<f32>,
    stats: ActionStats,
}

impl<G: Game> RootSlot<G> {
    /// Snapshot `game` as the root of a search.
    ///
    /// # Errors
    /// `InvalidGameState` if the game is over, the mask has the wrong length,
    /// or no action is valid.
    pub(crate) fn new(game: &G, index: usize) -> Result<Self, SearchError> {
        let num_actions = game.num_actions();

        if game.is_terminal() {
            return Err(SearchError::InvalidGameState(format!(
                "game {index} is already over"
            )));
        }

        let mask = game.valid_mask();
        if mask.len() != num_actions {
            return Err(SearchError::InvalidGameState(format!(
                "game {index}: valid mask has {} entries, expected {num_actions}",
                mask.len()
            )));
        }
        if !mask.iter().any(|&valid| valid) {
            return Err(SearchError::InvalidGameState(format!(
                "game {index} has no valid actions"
            )));
        }

        Ok(Self {
            root: game.snapshot(),
            scratch: game.clone(),
            mover: game.current_player(),
            mask,
            prior: Vec::new(),
            stats: ActionStats::new(num_actions),
        })
    }

    pub(crate) fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub(crate) fn mover(&self) -> Player {
        self.mover
    }

    pub(crate) fn set_prior(&mut self, prior: Vec<f32>) {
        self.prior = prior;
    }

    pub(crate) fn select(&self, c_puct: f32) -> Result<usize, SearchError> {
        self.stats
            .select(&self.prior, &self.mask, c_puct)
            .ok_or_else(|| SearchError::InvalidGameState("no selectable action".to_string()))
    }

    /// Reset the scratch game to the root and play `action` on it.
    pub(crate) fn fork(&mut self, action: usize) -> Result<&G, SearchError> {
        self.scratch.restore(&self.root);
        self.scratch.apply(action).map_err(|e| {
            SearchError::InvalidGameState(format!("simulated action {action} failed: {e}"))
        })?;
        Ok(&self.scratch)
    }

    pub(crate) fn record(&mut self, action: usize, value: f32) {
        self.stats.record(action, value);
    }

    pub(crate) fn into_result(self) -> Result<SearchResult, SearchError> {
        let policy = self
            .stats
            .visit_policy(&self.mask)
            .map_err(|e| SearchError::InvalidGameState(e.to_string()))?
            .into_inner();
        let (visit_counts, value_sums) = self.stats.into_parts();

        Ok(SearchResult {
            policy,
            prior: self.prior,
            visit_counts,
            value_sums,
        })
    }
}
