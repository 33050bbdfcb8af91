//! Shared fixtures for the search integration tests.
#![allow(dead_code)]

use qumalaq_core::{Game, GameError, Outcome, Player, Result};
use qumalaq_mcts::{Evaluation, Evaluator, EvaluatorError};
use std::cell::RefCell;

/// What happens after a root action of [`Toy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// The mover wins on the spot.
    Win,
    Draw,
    /// The game goes on; the position is a leaf for the evaluator.
    Continue,
}

/// One-decision game with three actions.
#[derive(Clone, Debug)]
pub struct Toy {
    effects: [Effect; 3],
    blocked: [bool; 3],
    played: Option<usize>,
}

impl Toy {
    pub fn new(effects: [Effect; 3]) -> Self {
        Self {
            effects,
            blocked: [false; 3],
            played: None,
        }
    }

    /// Action 0 wins, the others lead to ordinary positions.
    pub fn win_in_one() -> Self {
        Self::new([Effect::Win, Effect::Continue, Effect::Continue])
    }

    pub fn with_blocked(mut self, blocked: [bool; 3]) -> Self {
        self.blocked = blocked;
        self
    }
}

impl Game for Toy {
    type State = Option<usize>;

    fn num_actions(&self) -> usize {
        3
    }

    fn encoding_len(&self) -> usize {
        4
    }

    fn current_player(&self) -> Player {
        match self.played {
            None => Player::First,
            Some(_) => Player::Second,
        }
    }

    fn encode(&self) -> Vec<f32> {
        let mut encoding = vec![0.0, 0.0, 0.0, 1.0];
        if let Some(action) = self.played {
            encoding[action] = 1.0;
        }
        encoding
    }

    fn valid_mask(&self) -> Vec<bool> {
        match self.played {
            None => self.blocked.iter().map(|&b| !b).collect(),
            Some(_) => vec![false; 3],
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self.played, Some(a) if self.effects[a] != Effect::Continue)
    }

    fn winner(&self) -> Option<Outcome> {
        match self.played.map(|a| self.effects[a]) {
            Some(Effect::Win) => Some(Outcome::Win(Player::First)),
            Some(Effect::Draw) => Some(Outcome::Draw),
            _ => None,
        }
    }

    fn snapshot(&self) -> Option<usize> {
        self.played
    }

    fn restore(&mut self, state: &Option<usize>) {
        self.played = *state;
    }

    fn apply(&mut self, action: usize) -> Result<()> {
        if action >= 3 {
            return Err(GameError::ActionOutOfRange {
                action,
                num_actions: 3,
            });
        }
        if self.played.is_some() {
            return Err(GameError::GameOver);
        }
        if self.blocked[action] {
            return Err(GameError::InvalidAction(action));
        }
        self.played = Some(action);
        Ok(())
    }
}

/// Evaluator returning a fixed answer and recording every batch size.
pub struct ScriptedEvaluator {
    policy: Vec<f32>,
    value: f32,
    fail_after: Option<usize>,
    truncate: bool,
    calls: RefCell<Vec<usize>>,
}

impl ScriptedEvaluator {
    pub fn new(policy: Vec<f32>, value: f32) -> Self {
        Self {
            policy,
            value,
            fail_after: None,
            truncate: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn uniform(num_actions: usize, value: f32) -> Self {
        Self::new(vec![1.0 / num_actions as f32; num_actions], value)
    }

    /// Fail every call after the first `calls` ones.
    pub fn fail_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    /// Answer one position short.
    pub fn truncated(mut self) -> Self {
        self.truncate = true;
        self
    }

    /// Batch size of every successful call, in order.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.borrow().clone()
    }
}

impl Evaluator for ScriptedEvaluator {
    fn evaluate(&self, batch: &[Vec<f32>]) -> std::result::Result<Vec<Evaluation>, EvaluatorError> {
        let mut calls = self.calls.borrow_mut();
        if matches!(self.fail_after, Some(limit) if calls.len() >= limit) {
            return Err(EvaluatorError::EvaluationFailed("scripted failure".to_string()));
        }
        calls.push(batch.len());

        let answered = if self.truncate {
            batch.len().saturating_sub(1)
        } else {
            batch.len()
        };
        Ok((0..answered)
            .map(|_| Evaluation {
                policy: self.policy.clone(),
                value: self.value,
            })
            .collect())
    }
}
