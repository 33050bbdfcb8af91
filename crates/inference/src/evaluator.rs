//! Neural network evaluator implementing the search `Evaluator` trait.

use crate::inference::{probabilities, OnnxModel};
use qumalaq_mcts::{Evaluation, Evaluator, EvaluatorError};
use std::path::Path;

/// Batched evaluator backed by an ONNX policy/value network.
///
/// Policies are returned over the full action space without masking; the
/// search masks them to valid actions itself.
pub struct OnnxEvaluator {
    model: OnnxModel,
}

impl OnnxEvaluator {
    /// Load the model at `path`.
    pub fn new(
        path: impl AsRef<Path>,
        encoding_len: usize,
        num_actions: usize,
    ) -> anyhow::Result<Self> {
        let model = OnnxModel::load(path, encoding_len, num_actions)?;
        Ok(Self { model })
    }

    pub fn from_model(model: OnnxModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &OnnxModel {
        &self.model
    }
}

impl Evaluator for OnnxEvaluator {
    fn evaluate(&self, batch: &[Vec<f32>]) -> Result<Vec<Evaluation>, EvaluatorError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let prediction = self
            .model
            .predict(batch)
            .map_err(|e| EvaluatorError::ModelError(format!("{e:#}")))?;

        Ok(prediction
            .log_policy
            .rows()
            .into_iter()
            .zip(prediction.values)
            .map(|(row, value)| Evaluation {
                policy: probabilities(row),
                value,
            })
            .collect())
    }
}
