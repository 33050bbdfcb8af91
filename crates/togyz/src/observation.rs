//! Network input encoding.
//!
//! A position is encoded from the point of view of the player to move, so
//! the same network weights serve both sides.

use crate::position::{Position, PITS, TOTAL_STONES, WINNING_KAZAN};

/// Length of the encoding.
pub const ENCODING_LEN: usize = 4 * PITS + 2;

/// Offsets of the feature groups.
#[allow(dead_code)]
mod layout {
    use super::PITS;

    pub const OWN_PITS: usize = 0;
    pub const OPPONENT_PITS: usize = OWN_PITS + PITS;
    pub const OWN_KAZAN: usize = OPPONENT_PITS + PITS;
    pub const OPPONENT_KAZAN: usize = OWN_KAZAN + 1;
    pub const OWN_TUZDYK: usize = OPPONENT_KAZAN + 1;
    pub const OPPONENT_TUZDYK: usize = OWN_TUZDYK + PITS;
}

/// Encode `pos` into a flat vector of [`ENCODING_LEN`] floats:
///
/// | range  | feature                                   |
/// |--------|-------------------------------------------|
/// | 0-8    | mover's pits / 162                        |
/// | 9-17   | opponent's pits / 162                     |
/// | 18     | mover's kazan / 82                        |
/// | 19     | opponent's kazan / 82                     |
/// | 20-28  | one-hot of the mover's tuzdyk pit         |
/// | 29-37  | one-hot of the opponent's tuzdyk pit      |
pub fn encode(pos: &Position) -> Vec<f32> {
    let mut obs = vec![0.0f32; ENCODING_LEN];
    let me = pos.side_to_move();
    let them = me.opponent();

    for pit in 0..PITS {
        obs[layout::OWN_PITS + pit] = pos.pits(me)[pit] as f32 / TOTAL_STONES as f32;
        obs[layout::OPPONENT_PITS + pit] = pos.pits(them)[pit] as f32 / TOTAL_STONES as f32;
    }

    obs[layout::OWN_KAZAN] = pos.kazan(me) as f32 / WINNING_KAZAN as f32;
    obs[layout::OPPONENT_KAZAN] = pos.kazan(them) as f32 / WINNING_KAZAN as f32;

    if let Some(pit) = pos.tuzdyk(me) {
        obs[layout::OWN_TUZDYK + pit] = 1.0;
    }
    if let Some(pit) = pos.tuzdyk(them) {
        obs[layout::OPPONENT_TUZDYK + pit] = 1.0;
    }

    obs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_len() {
        assert_eq!(ENCODING_LEN, 38);
        assert_eq!(encode(&Position::starting()).len(), ENCODING_LEN);
    }

    #[test]
    fn test_starting_encoding() {
        let obs = encode(&Position::starting());
        let pit = 9.0 / 162.0;
        assert!(obs[..18].iter().all(|&x| (x - pit).abs() < 1e-6));
        assert!(obs[18..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_encoding_is_relative_to_mover() {
        let white = Position::from_notation("1,0,0,0,0,0,0,0,0/0,0,0,0,0,0,0,0,4/41,0/3,-/w").unwrap();
        let black = Position::from_notation("1,0,0,0,0,0,0,0,0/0,0,0,0,0,0,0,0,4/41,0/3,-/b").unwrap();

        let w = encode(&white);
        let b = encode(&black);

        assert_eq!(w[0], 1.0 / 162.0);
        assert_eq!(w[9 + 8], 4.0 / 162.0);
        assert_eq!(w[18], 0.5);
        assert_eq!(w[20 + 2], 1.0);

        // Same board seen by the second player: groups swap.
        assert_eq!(b[8], 4.0 / 162.0);
        assert_eq!(b[9], 1.0 / 162.0);
        assert_eq!(b[19], 0.5);
        assert_eq!(b[29 + 2], 1.0);
        assert!(b[20..29].iter().all(|&x| x == 0.0));
    }
}
