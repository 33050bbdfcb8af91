//! Tic-tac-toe.
//!
//! Solved game with a 9-action space. Small enough to search exhaustively
//! in tests and to play full self-play games in milliseconds.
//! `Player::First` plays X and moves first.

use qumalaq_core::{Game, GameError, Outcome, Player, Result};
use std::fmt;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Board position: 9 cells, indexed 0-8 (row-major).
/// ```text
/// 0 | 1 | 2
/// ---------
/// 3 | 4 | 5
/// ---------
/// 6 | 7 | 8
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Board {
    cells: [Option<Player>; 9],
    current: Player,
    winner: Option<Player>,
}

impl Board {
    fn empty() -> Self {
        Self {
            cells: [None; 9],
            current: Player::First,
            winner: None,
        }
    }

    fn line_winner(&self) -> Option<Player> {
        LINES.iter().find_map(|line| {
            let player = self.cells[line[0]]?;
            (self.cells[line[1]] == Some(player) && self.cells[line[2]] == Some(player))
                .then_some(player)
        })
    }

    fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }
}

/// Tic-tac-toe game owning its current board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicTacToe {
    board: Board,
}

impl TicTacToe {
    /// Empty board, X to move.
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
        }
    }

    /// Piece at `cell`, if any.
    pub fn get(&self, cell: usize) -> Option<Player> {
        self.board.cells.get(cell).copied().flatten()
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for TicTacToe {
    type State = Board;

    fn num_actions(&self) -> usize {
        9
    }

    fn encoding_len(&self) -> usize {
        18
    }

    fn current_player(&self) -> Player {
        self.board.current
    }

    /// Two planes of 9 cells: the mover's pieces, then the opponent's.
    fn encode(&self) -> Vec<f32> {
        let mut encoding = vec![0.0; 18];
        for (i, cell) in self.board.cells.iter().enumerate() {
            match cell {
                Some(p) if *p == self.board.current => encoding[i] = 1.0,
                Some(_) => encoding[i + 9] = 1.0,
                None => {}
            }
        }
        encoding
    }

    fn valid_mask(&self) -> Vec<bool> {
        if self.is_terminal() {
            return vec![false; 9];
        }
        self.board.cells.iter().map(|c| c.is_none()).collect()
    }

    fn is_terminal(&self) -> bool {
        self.board.winner.is_some() || self.board.is_full()
    }

    fn winner(&self) -> Option<Outcome> {
        match self.board.winner {
            Some(player) => Some(Outcome::Win(player)),
            None if self.board.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }

    fn snapshot(&self) -> Board {
        self.board
    }

    fn restore(&mut self, state: &Board) {
        self.board = *state;
    }

    fn apply(&mut self, action: usize) -> Result<()> {
        if action >= 9 {
            return Err(GameError::ActionOutOfRange {
                action,
                num_actions: 9,
            });
        }
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if self.board.cells[action].is_some() {
            return Err(GameError::InvalidAction(action));
        }

        self.board.cells[action] = Some(self.board.current);
        self.board.current = self.board.current.opponent();
        self.board.winner = self.board.line_winner();
        Ok(())
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "-----------")?;
            }
            for col in 0..3 {
                if col > 0 {
                    write!(f, " | ")?;
                }
                match self.board.cells[row * 3 + col] {
                    Some(Player::First) => write!(f, " X ")?,
                    Some(Player::Second) => write!(f, " O ")?,
                    None => write!(f, "   ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(moves: &[usize]) -> TicTacToe {
        let mut game = TicTacToe::new();
        for &m in moves {
            game.apply(m).unwrap();
        }
        game
    }

    #[test]
    fn test_initial_position() {
        let game = TicTacToe::new();
        assert_eq!(game.current_player(), Player::First);
        assert_eq!(game.valid_actions().len(), 9);
        assert!(!game.is_terminal());
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn test_apply_and_mask() {
        let game = play(&[4]);
        assert_eq!(game.get(4), Some(Player::First));
        assert_eq!(game.current_player(), Player::Second);
        assert!(!game.valid_mask()[4]);
        assert_eq!(game.valid_actions().len(), 8);
    }

    #[test]
    fn test_rejects_bad_actions() {
        let mut game = play(&[4]);
        assert_eq!(game.apply(4), Err(GameError::InvalidAction(4)));
        assert!(matches!(game.apply(9), Err(GameError::ActionOutOfRange { .. })));
    }

    #[test]
    fn test_x_wins_top_row() {
        let mut game = play(&[0, 3, 1, 4, 2]);
        assert!(game.is_terminal());
        assert_eq!(game.winner(), Some(Outcome::Win(Player::First)));
        assert!(game.valid_mask().iter().all(|&v| !v));
        assert_eq!(game.apply(5), Err(GameError::GameOver));
    }

    #[test]
    fn test_o_wins_anti_diagonal() {
        let game = play(&[0, 2, 1, 4, 3, 6]);
        assert_eq!(game.winner(), Some(Outcome::Win(Player::Second)));
    }

    #[test]
    fn test_draw() {
        // X O X
        // X O O
        // O X X
        let game = play(&[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert!(game.is_terminal());
        assert_eq!(game.winner(), Some(Outcome::Draw));
    }

    #[test]
    fn test_encoding_is_relative_to_mover() {
        let game = play(&[0, 4]);
        // X to move: own plane has cell 0, opponent plane has cell 4.
        let encoding = game.encode();
        assert_eq!(encoding.len(), game.encoding_len());
        assert_eq!(encoding[0], 1.0);
        assert_eq!(encoding[9 + 4], 1.0);

        let game = play(&[0]);
        let encoding = game.encode();
        assert_eq!(encoding[0], 0.0);
        assert_eq!(encoding[9], 1.0);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut game = play(&[0, 4]);
        let snapshot = game.snapshot();
        let before = game.encode();

        game.apply(8).unwrap();
        assert_ne!(game.encode(), before);

        game.restore(&snapshot);
        assert_eq!(game.encode(), before);
        assert_eq!(game.current_player(), Player::First);
    }

    #[test]
    fn test_display() {
        let display = format!("{}", play(&[0, 4]));
        assert!(display.contains('X'));
        assert!(display.contains('O'));
    }
}
