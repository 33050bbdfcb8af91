//! Togyz Qumalaq - the Kazakh nine-pit mancala.
//!
//! This crate implements the rules (sowing, even captures, tuzdyks) and
//! the perspective-relative encoding used as network input.

mod game_impl;
pub mod observation;
mod position;

pub use game_impl::TogyzQumalaq;
pub use observation::{encode, ENCODING_LEN};
pub use position::{Position, PITS, STONES_PER_PIT, TOTAL_STONES, WINNING_KAZAN};
