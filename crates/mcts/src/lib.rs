//! Batched root search for two-player board games.
//!
//! This crate provides a depth-1 PUCT search that runs many games in
//! lockstep and funnels all position evaluation through batched calls to
//! an [`Evaluator`]. It works with any game implementing
//! `qumalaq_core::Game`.
//!
//! # Features
//!
//! - **Batched**: one evaluator call for all roots, then one per leaf flush
//! - **PUCT Selection**: prior-guided selection over root actions
//! - **Dirichlet Noise**: optional exploration noise on the root prior
//! - **Exact terminals**: finished leaves are scored without the evaluator
//!
//! # Example
//!
//! ```
//! use qumalaq_mcts::{games::TicTacToe, MctsConfig, RootSearch, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let games = vec![TicTacToe::new(), TicTacToe::new()];
//! let refs: Vec<&TicTacToe> = games.iter().collect();
//!
//! let config = MctsConfig::with_simulations(50);
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let mut search = RootSearch::new(config, UniformEvaluator::new(9), rng).unwrap();
//!
//! let results = search.search_batch(&refs).unwrap();
//! assert_eq!(results.len(), 2);
//! println!("Best action: {}", results[0].best_action());
//! println!("Root value: {}", results[0].root_value());
//! ```

pub mod config;
pub mod evaluator;
pub mod games;
mod queue;
mod root;
pub mod search;

pub use config::{ConfigError, MctsConfig};
pub use evaluator::{Evaluation, Evaluator, EvaluatorError, UniformEvaluator};
pub use root::ActionStats;
pub use search::{RootSearch, SearchError, SearchResult, SearchStats};
