//! Small reference games used to exercise the search.

pub mod tictactoe;

pub use tictactoe::{Board, TicTacToe};
