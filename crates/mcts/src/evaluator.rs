//! Batched position evaluation.
//!
//! The root search funnels every evaluation through one [`Evaluator`] call
//! per batch: once for all roots at the start of a search, then once per
//! flush of the pending-leaf queue. How the evaluator computes its answer
//! (neural network, compiled or eager, mixed precision) is its own business.

use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Malformed batch: {0}")]
    MalformedBatch(String),

    #[error("Model error: {0}")]
    ModelError(String),
}

/// Evaluation result: prior policy + value estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Probability for each action index. Length equals the action space;
    /// no masking is required, the search masks to valid actions itself.
    pub policy: Vec<f32>,

    /// Value estimate in [-1, 1] from the perspective of the player to move
    /// in the evaluated position.
    pub value: f32,
}

/// Trait for batched position evaluators.
///
/// Implementations must be length- and order-preserving: the i-th returned
/// evaluation belongs to the i-th encoding.
pub trait Evaluator {
    /// Evaluate a batch of encoded positions.
    fn evaluate(&self, batch: &[Vec<f32>]) -> Result<Vec<Evaluation>, EvaluatorError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, batch: &[Vec<f32>]) -> Result<Vec<Evaluation>, EvaluatorError> {
        (**self).evaluate(batch)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, batch: &[Vec<f32>]) -> Result<Vec<Evaluation>, EvaluatorError> {
        (**self).evaluate(batch)
    }
}

/// Evaluator that assigns equal probability to every action and a neutral
/// value. Search then relies on terminal results alone; useful for bootstrap
/// self-play before a model exists, and for testing.
#[derive(Debug, Clone)]
pub struct UniformEvaluator {
    num_actions: usize,
}

impl UniformEvaluator {
    pub fn new(num_actions: usize) -> Self {
        Self { num_actions }
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, batch: &[Vec<f32>]) -> Result<Vec<Evaluation>, EvaluatorError> {
        if self.num_actions == 0 {
            return Err(EvaluatorError::EvaluationFailed(
                "uniform evaluator has an empty action space".to_string(),
            ));
        }

        let prob = 1.0 / self.num_actions as f32;
        Ok(batch
            .iter()
            .map(|_| Evaluation {
                policy: vec![prob; self.num_actions],
                value: 0.0,
            })
            .collect())
    }
}
