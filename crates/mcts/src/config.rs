//! Root search configuration parameters.
//!
//! Defaults follow the self-play training setup: 200 simulations per move,
//! `c_puct` 1.5, Dirichlet(0.3) noise mixed in at 25%, and leaf evaluations
//! flushed in batches of 64.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be {requirement} (got {value})")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
        value: String,
    },
}

impl ConfigError {
    /// Build a [`ConfigError::Invalid`] for `field`.
    pub fn invalid(
        field: &'static str,
        requirement: &'static str,
        value: impl ToString,
    ) -> Self {
        ConfigError::Invalid {
            field,
            requirement,
            value: value.to_string(),
        }
    }
}

/// Configuration for the batched root search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Number of simulations per game per search call.
    pub num_simulations: usize,

    /// Exploration constant in the PUCT score.
    pub c_puct: f32,

    /// Dirichlet noise concentration, repeated over the whole action space.
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior replaced with Dirichlet noise.
    /// 0 disables noise (evaluation and arena play).
    pub dirichlet_epsilon: f32,

    /// Pending leaves are evaluated together once the queue holds at least
    /// this many encodings. Independent of the number of games in the batch.
    pub leaf_batch_size: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 200,
            c_puct: 1.5,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
            leaf_batch_size: 64,
        }
    }
}

impl MctsConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Create a config for evaluation (no exploration noise).
    pub fn for_evaluation(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            dirichlet_epsilon: 0.0,
            ..Default::default()
        }
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c_puct: f32) -> Self {
        self.c_puct = c_puct;
        self
    }

    /// Builder pattern: set the leaf flush threshold.
    pub fn with_leaf_batch_size(mut self, size: usize) -> Self {
        self.leaf_batch_size = size;
        self
    }

    /// Builder pattern: disable root noise.
    pub fn without_noise(mut self) -> Self {
        self.dirichlet_epsilon = 0.0;
        self
    }

    /// Whether Dirichlet noise is mixed into the root prior.
    pub fn noise_enabled(&self) -> bool {
        self.dirichlet_epsilon > 0.0
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.c_puct.is_finite() && self.c_puct >= 0.0) {
            return Err(ConfigError::invalid("c_puct", "finite and >= 0", self.c_puct));
        }
        if !(0.0..=1.0).contains(&self.dirichlet_epsilon) {
            return Err(ConfigError::invalid(
                "dirichlet_epsilon",
                "in [0, 1]",
                self.dirichlet_epsilon,
            ));
        }
        let alpha_ok = self.dirichlet_alpha.is_finite() && self.dirichlet_alpha > 0.0;
        if self.noise_enabled() && !alpha_ok {
            return Err(ConfigError::invalid(
                "dirichlet_alpha",
                "finite and > 0 when noise is enabled",
                self.dirichlet_alpha,
            ));
        }
        if self.leaf_batch_size == 0 {
            return Err(ConfigError::invalid(
                "leaf_batch_size",
                ">= 1",
                self.leaf_batch_size,
            ));
        }
        Ok(())
    }
}
