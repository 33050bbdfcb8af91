//! `Game` trait implementation for Togyz Qumalaq.

use qumalaq_core::{Game, Outcome, Player, Result};

use crate::observation::{self, ENCODING_LEN};
use crate::position::{Position, PITS};

/// A Togyz Qumalaq game owning its current position.
///
/// Actions are pit indices 0-8 of the side to move.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TogyzQumalaq {
    position: Position,
}

impl TogyzQumalaq {
    /// New game from the starting position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Game continuing from `position`.
    pub fn from_position(position: Position) -> Self {
        Self { position }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
}

impl Game for TogyzQumalaq {
    type State = Position;

    fn num_actions(&self) -> usize {
        PITS
    }

    fn encoding_len(&self) -> usize {
        ENCODING_LEN
    }

    fn current_player(&self) -> Player {
        self.position.side_to_move()
    }

    fn encode(&self) -> Vec<f32> {
        observation::encode(&self.position)
    }

    fn valid_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; PITS];
        for pit in self.position.legal_moves() {
            mask[pit] = true;
        }
        mask
    }

    fn is_terminal(&self) -> bool {
        self.position.is_terminal()
    }

    /// Always defined: unfinished games are scored by kazan count.
    fn winner(&self) -> Option<Outcome> {
        Some(self.position.adjudicate())
    }

    fn snapshot(&self) -> Position {
        self.position
    }

    fn restore(&mut self, state: &Position) {
        self.position = *state;
    }

    fn apply(&mut self, action: usize) -> Result<()> {
        self.position.make_move(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let game = TogyzQumalaq::new();
        assert_eq!(game.num_actions(), 9);
        assert_eq!(game.current_player(), Player::First);
        assert!(game.valid_mask().iter().all(|&v| v));
        assert_eq!(game.encode().len(), game.encoding_len());
    }

    #[test]
    fn test_apply_switches_player() {
        let mut game = TogyzQumalaq::new();
        game.apply(4).unwrap();
        assert_eq!(game.current_player(), Player::Second);
        assert_eq!(game.position().pits(Player::First)[4], 1);
    }

    #[test]
    fn test_finished_game_has_empty_mask() {
        let pos = Position::from_notation("1,0,0,0,0,0,0,0,0/1,0,0,0,0,0,0,0,0/82,0/-,-/b").unwrap();
        let game = TogyzQumalaq::from_position(pos);
        assert!(game.is_terminal());
        assert!(game.valid_mask().iter().all(|&v| !v));
        assert_eq!(game.winner(), Some(Outcome::Win(Player::First)));
    }
}
