//! Alpha-beta minimax baseline for Togyz Qumalaq.
//!
//! Scores positions with a hand-written heuristic built around kazan
//! difference and tuzdyks. This gives a deterministic opponent to measure
//! search players against.

use crate::arena::Opponent;
use crate::error::SelfPlayError;
use qumalaq_core::Player;
use qumalaq_togyz::{Position, TogyzQumalaq, PITS, WINNING_KAZAN};

/// Score for a decided game.
const WIN_SCORE: f32 = 10_000.0;

/// Below this many stones on the board, kazan lead counts extra.
const ENDGAME_STONES: u32 = 50;

/// Value of holding a tuzdyk on pit `pit`; central pits are worth more.
fn tuzdyk_value(pit: usize) -> f32 {
    25.0 + (4.0 - (4.0 - pit as f32).abs()) * 3.0
}

/// Heuristic score of `pos` from `player`'s point of view.
pub fn evaluate(pos: &Position, player: Player) -> f32 {
    let opponent = player.opponent();
    let own_kazan = pos.kazan(player) as f32;
    let opp_kazan = pos.kazan(opponent) as f32;

    if pos.kazan(player) >= WINNING_KAZAN {
        return WIN_SCORE;
    }
    if pos.kazan(opponent) >= WINNING_KAZAN {
        return -WIN_SCORE;
    }

    let mut score = (own_kazan - opp_kazan) * 10.0;

    if let Some(pit) = pos.tuzdyk(player) {
        score += tuzdyk_value(pit);
    }
    if let Some(pit) = pos.tuzdyk(opponent) {
        score -= tuzdyk_value(pit);
    }

    // Opponent pits one stone short of becoming a tuzdyk.
    if pos.tuzdyk(player).is_none() {
        let threats = (0..PITS - 1)
            .filter(|&pit| pos.pits(opponent)[pit] == 2 && pos.can_create_tuzdyk(player, pit))
            .count();
        score += threats as f32 * 8.0;
    }

    let own_pits = pos.pits(player);
    let opp_pits = pos.pits(opponent);
    for pit in 0..PITS {
        let weight = if (3..=5).contains(&pit) { 0.36 } else { 0.3 };
        score += (own_pits[pit] as f32 - opp_pits[pit] as f32) * weight;

        // One more stone makes these capturable.
        if opp_pits[pit] % 2 == 1 {
            score += 0.5;
        }
    }

    let mobility = pos.moves_for(player).len() as f32 - pos.moves_for(opponent).len() as f32;
    score += mobility * 1.5;

    if pos.stones_on_board() < ENDGAME_STONES {
        score += (own_kazan - opp_kazan) * 5.0;
    }

    score
}

/// Legal moves of the side to move, most promising first.
///
/// Each move is played on a copy: creating a tuzdyk ranks highest, then
/// the number of stones gained. Equal moves keep pit order.
pub fn order_moves(pos: &Position) -> Vec<usize> {
    let mover = pos.side_to_move();
    let mut scored: Vec<(usize, u32)> = pos
        .legal_moves()
        .into_iter()
        .map(|pit| {
            let mut next = *pos;
            if next.make_move(pit).is_err() {
                return (pit, 0);
            }
            let mut priority = 2 * (next.kazan(mover) - pos.kazan(mover)) as u32;
            if pos.tuzdyk(mover).is_none() && next.tuzdyk(mover).is_some() {
                priority += 50;
            }
            (pit, priority)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(pit, _)| pit).collect()
}

/// Minimax player with alpha-beta pruning.
pub struct MinimaxOpponent {
    max_depth: usize,
}

impl MinimaxOpponent {
    /// Create a player searching `max_depth` plies (at least one).
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// Get the best move for the side to move, `None` if the game is over.
    pub fn best_move(&self, pos: &Position) -> Option<usize> {
        let player = pos.side_to_move();
        let moves = order_moves(pos);

        let mut best: Option<(usize, f32)> = None;
        let mut alpha = f32::NEG_INFINITY;
        for pit in moves {
            let mut next = *pos;
            if next.make_move(pit).is_err() {
                continue;
            }
            let score = self.alphabeta(
                &next,
                self.max_depth - 1,
                alpha,
                f32::INFINITY,
                player,
            );
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((pit, score));
                alpha = alpha.max(score);
            }
        }

        best.map(|(pit, _)| pit)
    }

    /// Alpha-beta search scored from `player`'s point of view.
    fn alphabeta(
        &self,
        pos: &Position,
        depth: usize,
        mut alpha: f32,
        mut beta: f32,
        player: Player,
    ) -> f32 {
        if depth == 0 || pos.is_terminal() {
            return evaluate(pos, player);
        }

        let moves = order_moves(pos);
        if moves.is_empty() {
            return evaluate(pos, player);
        }

        let maximizing = pos.side_to_move() == player;
        let mut best = if maximizing {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        };

        for pit in moves {
            let mut next = *pos;
            if next.make_move(pit).is_err() {
                continue;
            }
            let score = self.alphabeta(&next, depth - 1, alpha, beta, player);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        best
    }
}

impl Opponent<TogyzQumalaq> for MinimaxOpponent {
    fn name(&self) -> &str {
        "minimax"
    }

    fn select(&mut self, game: &TogyzQumalaq) -> Result<usize, SelfPlayError> {
        self.best_move(game.position()).ok_or_else(|| {
            SelfPlayError::NoMove(format!(
                "minimax found no move in {}",
                game.position().to_notation()
            ))
        })
    }
}
