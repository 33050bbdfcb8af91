//! ONNX Runtime session management for batched evaluation.

use anyhow::{bail, ensure, Context, Result};
use ndarray::{Array2, ArrayView1};
use ort::{session::Session, value::Value};
use std::cell::RefCell;
use std::path::Path;
use tracing::{debug, info};

/// Raw network output for one batch.
pub struct Prediction {
    /// Log-probabilities, one row per position (batch, num_actions).
    pub log_policy: Array2<f32>,

    /// Value per position, from the mover's point of view.
    pub values: Vec<f32>,
}

/// ONNX policy/value network.
///
/// The model takes a single `[batch, encoding_len]` float input and returns
/// two outputs in this order: log-policy `[batch, num_actions]` and value
/// `[batch, 1]`.
pub struct OnnxModel {
    session: RefCell<Session>,
    encoding_len: usize,
    num_actions: usize,
}

impl OnnxModel {
    /// Load a model from file.
    ///
    /// # Arguments
    /// * `path` - Path to the exported `.onnx` file
    /// * `encoding_len` - Length of one encoded position
    /// * `num_actions` - Size of the action space
    pub fn load(path: impl AsRef<Path>, encoding_len: usize, num_actions: usize) -> Result<Self> {
        let path = path.as_ref();
        let session = Session::builder()?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {:?}", path))?;

        info!(?path, encoding_len, num_actions, "loaded ONNX model");

        Ok(Self {
            session: RefCell::new(session),
            encoding_len,
            num_actions,
        })
    }

    pub fn encoding_len(&self) -> usize {
        self.encoding_len
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Run the network on a batch of encoded positions.
    pub fn predict(&self, batch: &[Vec<f32>]) -> Result<Prediction> {
        let rows = batch.len();
        let input = flatten_batch(batch, self.encoding_len)?;

        let shape: Vec<i64> = vec![rows as i64, self.encoding_len as i64];
        let input_value = Value::from_array((shape, input))?;

        let mut session = self.session.borrow_mut();
        let outputs = session.run(ort::inputs![input_value])?;

        let output_names: Vec<_> = outputs.keys().collect();
        ensure!(
            output_names.len() >= 2,
            "Model has {} outputs, expected policy and value",
            output_names.len()
        );

        let policy_tensor = outputs
            .get(output_names[0])
            .context("Failed to get policy tensor")?;
        let (_, policy_data) = policy_tensor.try_extract_tensor::<f32>()?;
        let log_policy = Array2::from_shape_vec((rows, self.num_actions), policy_data.to_vec())
            .context("Policy output has the wrong shape")?;

        let value_tensor = outputs
            .get(output_names[1])
            .context("Failed to get value tensor")?;
        let (_, value_data) = value_tensor.try_extract_tensor::<f32>()?;
        if value_data.len() != rows {
            bail!("Value output has {} entries for {} positions", value_data.len(), rows);
        }

        debug!(batch = rows, "model inference done");

        Ok(Prediction {
            log_policy,
            values: value_data.to_vec(),
        })
    }
}

/// Concatenate encodings row-major, checking every row's length.
pub(crate) fn flatten_batch(batch: &[Vec<f32>], encoding_len: usize) -> Result<Vec<f32>> {
    let mut flat = Vec::with_capacity(batch.len() * encoding_len);
    for (i, row) in batch.iter().enumerate() {
        ensure!(
            row.len() == encoding_len,
            "Encoding {} has {} values, expected {}",
            i,
            row.len(),
            encoding_len
        );
        flat.extend_from_slice(row);
    }
    Ok(flat)
}

/// Turn one row of log-probabilities (or logits) into probabilities.
///
/// Shifted by the row maximum before exponentiating, so it is equally
/// valid for raw logits.
pub(crate) fn probabilities(log_policy: ArrayView1<f32>) -> Vec<f32> {
    let max = log_policy.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; log_policy.len()];
    }

    let exp: Vec<f32> = log_policy.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|p| p / sum).collect()
}
