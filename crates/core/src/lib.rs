//! Qumalaq Core - Game abstraction and common types
//!
//! This crate provides the [`Game`] trait consumed by the batched root
//! search and the self-play driver, plus the shared domain types.
//!
//! # Types
//!
//! - [`Game`] - Trait for game implementations (mutable position + snapshots)
//! - [`Player`] / [`Outcome`] - Sides and game results
//! - [`Policy`] - Probability distribution over actions (sums to 1.0)
//! - [`Value`] - Game result from one player's view

mod error;
mod game;
mod types;

pub use error::{GameError, Result};
pub use game::{Game, Outcome, Player};
pub use types::{Policy, Value, POLICY_SUM_TOLERANCE};
