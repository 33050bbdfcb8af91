use crate::{Result, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    First,
    Second,
}

impl Player {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// Stable index (0 or 1) for per-player arrays.
    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::First => write!(f, "first"),
            Player::Second => write!(f, "second"),
        }
    }
}

/// Result of a finished (or adjudicated) game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win(Player),
    Draw,
}

impl Outcome {
    /// Value of this outcome for `player`: +1 win, -1 loss, 0 draw.
    pub fn value_for(self, player: Player) -> Value {
        match self {
            Outcome::Draw => Value::DRAW,
            Outcome::Win(winner) if winner == player => Value::WIN,
            Outcome::Win(_) => Value::LOSS,
        }
    }

    /// The winning player, if any.
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Win(player) => Some(player),
            Outcome::Draw => None,
        }
    }
}

/// A two-player game with a small, fixed action space.
///
/// Implementors own their current (mutable) position. Search forks
/// simulations by cloning a game once and then restoring snapshots into the
/// clone, so `snapshot`/`restore` must round-trip exactly: restoring a
/// snapshot and applying the same actions must reproduce identical encodings.
pub trait Game: Clone + Send {
    /// Opaque snapshot of a position.
    type State: Clone + Send;

    /// Size of the action space (length of every policy vector and mask).
    fn num_actions(&self) -> usize;

    /// Length of the vector returned by [`Game::encode`].
    fn encoding_len(&self) -> usize;

    /// The player to move.
    fn current_player(&self) -> Player;

    /// Fixed-size numeric encoding of the current position.
    fn encode(&self) -> Vec<f32>;

    /// Validity mask over the action space.
    fn valid_mask(&self) -> Vec<bool>;

    /// Returns true once the game has ended.
    fn is_terminal(&self) -> bool;

    /// The game result.
    ///
    /// Terminal positions must return `Some`. Non-terminal positions may
    /// return an adjudicated result (used when a ply cap cuts a game short)
    /// or `None` when the rules define no winner yet.
    fn winner(&self) -> Option<Outcome>;

    /// Take a snapshot of the current position.
    fn snapshot(&self) -> Self::State;

    /// Restore a position previously returned by [`Game::snapshot`].
    fn restore(&mut self, state: &Self::State);

    /// Play `action` for the player to move.
    ///
    /// # Errors
    /// Fails if the action is out of range, invalid, or the game is over.
    fn apply(&mut self, action: usize) -> Result<()>;

    /// Indices of the valid actions, in ascending order.
    fn valid_actions(&self) -> Vec<usize> {
        self.valid_mask()
            .iter()
            .enumerate()
            .filter(|&(_, &valid)| valid)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Player::First.opponent(), Player::Second);
        assert_eq!(Player::Second.opponent(), Player::First);
        assert_ne!(Player::First.index(), Player::Second.index());
    }

    #[test]
    fn test_outcome_value_for() {
        let win = Outcome::Win(Player::First);
        assert_eq!(win.value_for(Player::First), Value::WIN);
        assert_eq!(win.value_for(Player::Second), Value::LOSS);
        assert_eq!(Outcome::Draw.value_for(Player::Second), Value::DRAW);
        assert_eq!(win.winner(), Some(Player::First));
        assert_eq!(Outcome::Draw.winner(), None);
    }
}
