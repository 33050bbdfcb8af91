use qumalaq_core::GameError;
use qumalaq_mcts::{ConfigError, SearchError};
use thiserror::Error;

/// Errors from the self-play driver and arena.
#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("game rejected a move: {0}")]
    Game(#[from] GameError),

    #[error("invalid self-play config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("finished game reported no result")]
    MissingResult,

    #[error("no move available: {0}")]
    NoMove(String),
}
