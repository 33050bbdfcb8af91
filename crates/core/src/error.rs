use thiserror::Error;

/// Errors raised by game implementations and the shared domain types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Action index {action} is out of range (action space has {num_actions})")]
    ActionOutOfRange { action: usize, num_actions: usize },

    #[error("Action {0} is not valid in the current position")]
    InvalidAction(usize),

    #[error("Game is already over")]
    GameOver,

    #[error("No valid actions available")]
    NoValidActions,

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
}

/// Convenience Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;
