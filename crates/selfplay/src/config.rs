//! Self-play configuration.

use clap::ValueEnum;
use qumalaq_mcts::{ConfigError, MctsConfig};
use serde::{Deserialize, Serialize};

/// How games cut off by the ply cap are scored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CappedGamePolicy {
    /// Ask the game for a result; drop the game if it has none.
    #[default]
    Adjudicate,
    /// Drop capped games from the training data.
    Exclude,
    /// Score capped games as draws.
    Draw,
}

/// Configuration for batched self-play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    /// Search parameters used for every move.
    pub mcts: MctsConfig,

    /// Games played in lockstep by one driver.
    pub games_per_batch: usize,

    /// Moves before this ply are sampled from the visit distribution;
    /// from this ply on the most visited action is played.
    pub temperature_threshold: usize,

    /// Games still running after this many plies are cut off.
    pub max_plies: usize,

    pub capped_policy: CappedGamePolicy,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            mcts: MctsConfig::default(),
            games_per_batch: 32,
            temperature_threshold: 15,
            max_plies: 200,
            capped_policy: CappedGamePolicy::default(),
        }
    }
}

impl SelfPlayConfig {
    /// Builder pattern: set the search parameters.
    pub fn with_mcts(mut self, mcts: MctsConfig) -> Self {
        self.mcts = mcts;
        self
    }

    /// Builder pattern: set the number of concurrent games.
    pub fn with_games_per_batch(mut self, games: usize) -> Self {
        self.games_per_batch = games;
        self
    }

    /// Builder pattern: set the sampling/greedy switch ply.
    pub fn with_temperature_threshold(mut self, ply: usize) -> Self {
        self.temperature_threshold = ply;
        self
    }

    /// Builder pattern: set the ply cap.
    pub fn with_max_plies(mut self, plies: usize) -> Self {
        self.max_plies = plies;
        self
    }

    /// Builder pattern: set how capped games are scored.
    pub fn with_capped_policy(mut self, policy: CappedGamePolicy) -> Self {
        self.capped_policy = policy;
        self
    }

    /// Check the search parameters and the driver limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mcts.validate()?;
        if self.games_per_batch == 0 {
            return Err(ConfigError::invalid(
                "games_per_batch",
                ">= 1",
                self.games_per_batch,
            ));
        }
        if self.max_plies == 0 {
            return Err(ConfigError::invalid("max_plies", ">= 1", self.max_plies));
        }
        if self.mcts.num_simulations == 0 {
            return Err(ConfigError::invalid(
                "num_simulations",
                ">= 1 for self-play",
                self.mcts.num_simulations,
            ));
        }
        Ok(())
    }
}
