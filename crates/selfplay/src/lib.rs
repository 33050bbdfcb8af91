//! Batched self-play and evaluation for Togyz Qumalaq training.
//!
//! - [`SelfPlay`] plays games in lockstep with one batched search per ply
//!   and labels every recorded position with the final result.
//! - [`run_sharded`] spreads games over rayon workers.
//! - [`ExampleWriter`] stores examples as MessagePack for the trainer.
//! - [`play_arena`] measures a search player against a baseline such as
//!   [`MinimaxOpponent`].

pub mod arena;
pub mod buffer;
pub mod config;
pub mod driver;
pub mod error;
pub mod example;
pub mod minimax;
pub mod runner;
pub mod writer;

pub use arena::{play_arena, ArenaResult, Opponent, RandomOpponent};
pub use buffer::ReplayBuffer;
pub use config::{CappedGamePolicy, SelfPlayConfig};
pub use driver::{GameSummary, SelfPlay, SelfPlayReport};
pub use error::SelfPlayError;
pub use example::{assign_outcomes, resolve_outcome, PendingStep, TrainingExample};
pub use minimax::MinimaxOpponent;
pub use runner::{run_sharded, shard_sizes};
pub use writer::{read_examples, ExampleWriter, RunMetadata};
