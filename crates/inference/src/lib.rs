//! ONNX Runtime inference for the batched root search.
//!
//! This crate provides neural network evaluation using ONNX Runtime,
//! implementing the `Evaluator` trait from `qumalaq_mcts`. One evaluator
//! call maps to one session run over the whole batch.

mod evaluator;
mod inference;

pub use evaluator::OnnxEvaluator;
pub use inference::{OnnxModel, Prediction};
