//! Board representation and rules.

use qumalaq_core::{GameError, Outcome, Player};
use std::fmt;

/// Pits per side.
pub const PITS: usize = 9;

/// Stones in every pit at the start.
pub const STONES_PER_PIT: u8 = 9;

/// Stones in the game. Pits plus kazans always add up to this.
pub const TOTAL_STONES: u32 = 2 * PITS as u32 * STONES_PER_PIT as u32;

/// A kazan holding this many stones wins outright (more than half).
pub const WINNING_KAZAN: u8 = 82;

/// A Togyz Qumalaq position.
///
/// Each player owns a row of nine pits (indexed 0-8 from their own left)
/// and a kazan for captured stones. Sowing runs counter-clockwise: from pit
/// 8 of one side it continues at pit 0 of the other.
///
/// A tuzdyk is a pit on the *opponent's* side claimed for the rest of the
/// game; every stone that would land in it goes to the owner's kazan.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pits: [[u8; PITS]; 2],
    kazans: [u8; 2],
    /// `tuzdyks[p]` is the pit index on `p.opponent()`'s side owned by `p`.
    tuzdyks: [Option<usize>; 2],
    side_to_move: Player,
}

impl Position {
    /// Starting position: nine stones in every pit, first player to move.
    pub fn starting() -> Self {
        Self {
            pits: [[STONES_PER_PIT; PITS]; 2],
            kazans: [0; 2],
            tuzdyks: [None; 2],
            side_to_move: Player::First,
        }
    }

    /// Parse a position from its compact notation.
    ///
    /// Format: `<first pits>/<second pits>/<kazans>/<tuzdyks>/<side>`, e.g.
    /// the starting position is
    /// `9,9,9,9,9,9,9,9,9/9,9,9,9,9,9,9,9,9/0,0/-,-/w`.
    ///
    /// Tuzdyks are given as 1-based pit numbers on the opponent's side, `-`
    /// for none. The side is `w` (first player) or `b` (second player).
    /// Positions may hold fewer stones than a real game, so test positions
    /// can be sparse, but never more than [`TOTAL_STONES`].
    pub fn from_notation(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 5 {
            return Err(format!("expected 5 fields, got {}", parts.len()));
        }

        let mut pos = Self {
            pits: [[0; PITS]; 2],
            kazans: [0; 2],
            tuzdyks: [None; 2],
            side_to_move: Player::First,
        };

        for (side, field) in parts[..2].iter().enumerate() {
            let counts: Vec<&str> = field.split(',').collect();
            if counts.len() != PITS {
                return Err(format!("side {} has {} pits", side + 1, counts.len()));
            }
            for (i, count) in counts.iter().enumerate() {
                pos.pits[side][i] = count
                    .parse()
                    .map_err(|_| format!("invalid stone count: {count}"))?;
            }
        }

        let kazans: Vec<&str> = parts[2].split(',').collect();
        if kazans.len() != 2 {
            return Err(format!("invalid kazans: {}", parts[2]));
        }
        for (side, kazan) in kazans.iter().enumerate() {
            pos.kazans[side] = kazan
                .parse()
                .map_err(|_| format!("invalid kazan: {kazan}"))?;
        }

        let tuzdyks: Vec<&str> = parts[3].split(',').collect();
        if tuzdyks.len() != 2 {
            return Err(format!("invalid tuzdyks: {}", parts[3]));
        }
        for (side, tuzdyk) in tuzdyks.iter().enumerate() {
            pos.tuzdyks[side] = match *tuzdyk {
                "-" => None,
                n => {
                    let number: usize = n.parse().map_err(|_| format!("invalid tuzdyk: {n}"))?;
                    if !(1..PITS).contains(&number) {
                        return Err(format!("tuzdyk must be in 1..=8, got {number}"));
                    }
                    Some(number - 1)
                }
            };
        }
        if pos.tuzdyks[0].is_some() && pos.tuzdyks[0] == pos.tuzdyks[1] {
            return Err("both tuzdyks on the same pit number".to_string());
        }
        for owner in [Player::First, Player::Second] {
            if let Some(pit) = pos.tuzdyks[owner.index()] {
                if pos.pits[owner.opponent().index()][pit] != 0 {
                    return Err(format!("tuzdyk pit {} is not empty", pit + 1));
                }
            }
        }

        if pos.total_stones() > TOTAL_STONES {
            return Err(format!(
                "{} stones on the board and in kazans, at most {TOTAL_STONES} allowed",
                pos.total_stones()
            ));
        }

        pos.side_to_move = match parts[4] {
            "w" => Player::First,
            "b" => Player::Second,
            other => return Err(format!("invalid side to move: {other}")),
        };

        Ok(pos)
    }

    /// Compact notation, see [`Position::from_notation`].
    pub fn to_notation(&self) -> String {
        let pits = |side: usize| {
            self.pits[side]
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        let tuzdyk = |side: usize| match self.tuzdyks[side] {
            Some(pit) => (pit + 1).to_string(),
            None => "-".to_string(),
        };
        let side = match self.side_to_move {
            Player::First => "w",
            Player::Second => "b",
        };

        format!(
            "{}/{}/{},{}/{},{}/{}",
            pits(0),
            pits(1),
            self.kazans[0],
            self.kazans[1],
            tuzdyk(0),
            tuzdyk(1),
            side
        )
    }

    pub fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    /// The nine pits of `player`.
    pub fn pits(&self, player: Player) -> &[u8; PITS] {
        &self.pits[player.index()]
    }

    pub fn kazan(&self, player: Player) -> u8 {
        self.kazans[player.index()]
    }

    /// Pit on the opponent's side claimed by `player`, if any.
    pub fn tuzdyk(&self, player: Player) -> Option<usize> {
        self.tuzdyks[player.index()]
    }

    /// Stones still in play on both sides.
    pub fn stones_on_board(&self) -> u32 {
        self.pits.iter().flatten().map(|&n| n as u32).sum()
    }

    /// Stones on the board plus both kazans.
    pub fn total_stones(&self) -> u32 {
        self.stones_on_board() + self.kazans.iter().map(|&k| k as u32).sum::<u32>()
    }

    /// Whether `player` may turn the opponent's pit `pit` into a tuzdyk:
    /// one per player, never the last pit, and not mirroring the
    /// opponent's own tuzdyk.
    pub fn can_create_tuzdyk(&self, player: Player, pit: usize) -> bool {
        self.tuzdyks[player.index()].is_none()
            && pit != PITS - 1
            && self.tuzdyks[player.opponent().index()] != Some(pit)
    }

    /// Non-empty pits of the side to move.
    pub fn legal_moves(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.moves_for(self.side_to_move)
    }

    /// Non-empty pits of `player`, ignoring whose turn it is.
    pub fn moves_for(&self, player: Player) -> Vec<usize> {
        (0..PITS)
            .filter(|&pit| self.pits[player.index()][pit] > 0)
            .collect()
    }

    /// Sow the stones of pit `pit` for the side to move and resolve
    /// captures.
    ///
    /// # Errors
    /// Fails if the pit is out of range or empty, or the game is over.
    pub fn make_move(&mut self, pit: usize) -> Result<(), GameError> {
        if pit >= PITS {
            return Err(GameError::ActionOutOfRange {
                action: pit,
                num_actions: PITS,
            });
        }
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }

        let mover = self.side_to_move;
        let stones = self.pits[mover.index()][pit];
        if stones == 0 {
            return Err(GameError::InvalidAction(pit));
        }

        let (side, last) = self.sow(mover, pit, stones);
        if side != mover {
            self.capture(mover, last);
        }

        self.side_to_move = mover.opponent();
        Ok(())
    }

    /// Distribute `stones` from `pit`, returning where the last one landed.
    ///
    /// A single stone moves to the next pit. Otherwise the first stone goes
    /// back into the emptied pit and the rest follow one per pit.
    fn sow(&mut self, mover: Player, pit: usize, stones: u8) -> (Player, usize) {
        self.pits[mover.index()][pit] = 0;

        let mut side = mover;
        let mut current = pit;
        let mut remaining = stones;
        if remaining > 1 {
            self.drop_stone(side, current);
            remaining -= 1;
        }

        for _ in 0..remaining {
            current += 1;
            if current == PITS {
                current = 0;
                side = side.opponent();
            }
            self.drop_stone(side, current);
        }

        (side, current)
    }

    fn drop_stone(&mut self, side: Player, pit: usize) {
        let owner = side.opponent();
        if self.tuzdyks[owner.index()] == Some(pit) {
            self.kazans[owner.index()] += 1;
        } else {
            self.pits[side.index()][pit] += 1;
        }
    }

    /// Resolve the last stone landing in the opponent's pit `pit`.
    fn capture(&mut self, mover: Player, pit: usize) {
        if self.tuzdyks[mover.index()] == Some(pit) {
            return;
        }

        let opponent = mover.opponent().index();
        let count = self.pits[opponent][pit];

        if count == 3 && self.can_create_tuzdyk(mover, pit) {
            self.tuzdyks[mover.index()] = Some(pit);
        } else if count == 0 || count % 2 == 1 {
            return;
        }

        self.kazans[mover.index()] += count;
        self.pits[opponent][pit] = 0;
    }

    /// The game ends once a kazan holds a majority or either side has no
    /// stones left.
    pub fn is_terminal(&self) -> bool {
        self.kazans.iter().any(|&k| k >= WINNING_KAZAN)
            || self.pits.iter().any(|side| side.iter().all(|&n| n == 0))
    }

    /// Result of a finished game, `None` while it is still running.
    pub fn outcome(&self) -> Option<Outcome> {
        self.is_terminal().then(|| self.adjudicate())
    }

    /// Result by kazan count, whether or not the game is over: a winning
    /// kazan first, then the larger kazan, otherwise a draw.
    pub fn adjudicate(&self) -> Outcome {
        let [first, second] = self.kazans;
        if first >= WINNING_KAZAN {
            Outcome::Win(Player::First)
        } else if second >= WINNING_KAZAN {
            Outcome::Win(Player::Second)
        } else if first > second {
            Outcome::Win(Player::First)
        } else if second > first {
            Outcome::Win(Player::Second)
        } else {
            Outcome::Draw
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Display for Position {
    /// Second player's row on top (right to left), first player's below.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |player: Player, reversed: bool| {
            let mut cells: Vec<String> = (0..PITS)
                .map(|pit| {
                    if self.tuzdyk(player.opponent()) == Some(pit) {
                        " X".to_string()
                    } else {
                        format!("{:>2}", self.pits[player.index()][pit])
                    }
                })
                .collect();
            if reversed {
                cells.reverse();
            }
            cells.join(" ")
        };

        writeln!(f, "  [{:>3}] {}", self.kazans[1], row(Player::Second, true))?;
        writeln!(f, "  [{:>3}] {}", self.kazans[0], row(Player::First, false))?;
        write!(f, "  {} to move", self.side_to_move)
    }
}
