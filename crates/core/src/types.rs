//! Domain types with enforced invariants.
//!
//! - Policy: probability distribution summing to 1.0
//! - Value: game result (+1, 0 or -1) from one player's view

use crate::{GameError, Result};

/// Tolerance for policy sum validation.
pub const POLICY_SUM_TOLERANCE: f32 = 1e-5;

/// A probability distribution over actions.
///
/// Invariant: All values are non-negative and sum to 1.0 (±1e-5).
///
/// # Example
/// ```
/// use qumalaq_core::Policy;
///
/// let policy = Policy::masked(&[0.2, 0.5, 0.3], &[true, false, true]).unwrap();
/// assert_eq!(policy[1], 0.0);
/// assert!((policy.sum() - 1.0).abs() < 1e-5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Policy(Vec<f32>);

impl Policy {
    /// Create a new policy from a probability distribution.
    ///
    /// # Errors
    /// Returns `GameError::InvalidPolicy` if the vector is empty, contains
    /// negative values, or doesn't sum to 1.0 (±1e-5).
    pub fn new(probs: Vec<f32>) -> Result<Self> {
        if probs.is_empty() {
            return Err(GameError::InvalidPolicy(
                "policy cannot be empty".to_string(),
            ));
        }

        if probs.iter().any(|&p| p < 0.0) {
            return Err(GameError::InvalidPolicy(
                "policy contains negative values".to_string(),
            ));
        }

        let sum: f32 = probs.iter().sum();
        if (sum - 1.0).abs() > POLICY_SUM_TOLERANCE {
            return Err(GameError::InvalidPolicy(format!(
                "policy sum {} is not 1.0 (tolerance {})",
                sum, POLICY_SUM_TOLERANCE
            )));
        }

        Ok(Self(probs))
    }

    /// Create a policy from raw values, normalizing them to sum to 1.0.
    ///
    /// # Errors
    /// Returns error if any value is negative or all values are zero.
    pub fn from_unnormalized(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(GameError::InvalidPolicy(
                "policy cannot be empty".to_string(),
            ));
        }

        if values.iter().any(|&v| v < 0.0) {
            return Err(GameError::InvalidPolicy(
                "policy contains negative values".to_string(),
            ));
        }

        let sum: f32 = values.iter().sum();
        if sum <= 0.0 {
            return Err(GameError::InvalidPolicy(
                "cannot normalize: all values are zero".to_string(),
            ));
        }

        Ok(Self(values.iter().map(|&v| v / sum).collect()))
    }

    /// Uniform distribution over the valid entries of `mask`.
    ///
    /// # Errors
    /// Returns `GameError::NoValidActions` if no entry is valid.
    pub fn uniform_over(mask: &[bool]) -> Result<Self> {
        let num_valid = mask.iter().filter(|&&v| v).count();
        if num_valid == 0 {
            return Err(GameError::NoValidActions);
        }

        let prob = 1.0 / num_valid as f32;
        Ok(Self(
            mask.iter()
                .map(|&valid| if valid { prob } else { 0.0 })
                .collect(),
        ))
    }

    /// Restrict `raw` to the valid entries of `mask` and renormalize.
    ///
    /// Falls back to [`Policy::uniform_over`] when the masked mass is not
    /// positive. Non-finite or negative entries count as zero mass.
    ///
    /// # Errors
    /// Returns an error if the lengths differ or no entry is valid.
    pub fn masked(raw: &[f32], mask: &[bool]) -> Result<Self> {
        if raw.len() != mask.len() {
            return Err(GameError::InvalidPolicy(format!(
                "policy has {} entries but mask has {}",
                raw.len(),
                mask.len()
            )));
        }

        let masked: Vec<f32> = raw
            .iter()
            .zip(mask)
            .map(|(&p, &valid)| if valid && p.is_finite() && p > 0.0 { p } else { 0.0 })
            .collect();

        let sum: f32 = masked.iter().sum();
        if sum > 0.0 {
            Ok(Self(masked.iter().map(|&p| p / sum).collect()))
        } else {
            Self::uniform_over(mask)
        }
    }

    /// Get the number of actions in this policy.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the policy is empty (never true for valid policies).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the sum of all probabilities (should be ~1.0).
    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Get the underlying vector (consumes self).
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Get a reference to the underlying slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Iterate over the probabilities.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Policy {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// A game result from one player's view.
///
/// Only the three result constants exist:
/// - +1 means the player in question wins
/// - -1 means the player in question loses
/// - 0 means a draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value(f32);

impl Value {
    /// Value for a win.
    pub const WIN: Self = Self(1.0);

    /// Value for a loss.
    pub const LOSS: Self = Self(-1.0);

    /// Value for a draw.
    pub const DRAW: Self = Self(0.0);

    /// Get the underlying value.
    pub fn get(self) -> f32 {
        self.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_new_valid() {
        let policy = Policy::new(vec![0.3, 0.5, 0.2]).unwrap();
        assert_eq!(policy.len(), 3);
        assert!((policy.sum() - 1.0).abs() < POLICY_SUM_TOLERANCE);
    }

    #[test]
    fn test_policy_new_invalid_sum() {
        assert!(Policy::new(vec![0.3, 0.3, 0.3]).is_err());
    }

    #[test]
    fn test_policy_new_negative() {
        assert!(Policy::new(vec![0.5, -0.2, 0.7]).is_err());
    }

    #[test]
    fn test_policy_new_empty() {
        assert!(Policy::new(vec![]).is_err());
    }

    #[test]
    fn test_policy_from_unnormalized() {
        let policy = Policy::from_unnormalized(vec![1.0, 2.0, 1.0]).unwrap();
        assert!((policy[0] - 0.25).abs() < 1e-5);
        assert!((policy[1] - 0.50).abs() < 1e-5);
        assert!((policy[2] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_policy_uniform_over_mask() {
        let policy = Policy::uniform_over(&[true, false, true, true]).unwrap();
        assert_eq!(policy[1], 0.0);
        for i in [0, 2, 3] {
            assert!((policy[i] - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_policy_uniform_over_empty_mask() {
        assert_eq!(
            Policy::uniform_over(&[false, false]),
            Err(GameError::NoValidActions)
        );
    }

    #[test]
    fn test_policy_masked_renormalizes() {
        let policy = Policy::masked(&[0.5, 0.25, 0.25], &[false, true, true]).unwrap();
        assert_eq!(policy[0], 0.0);
        assert!((policy[1] - 0.5).abs() < 1e-6);
        assert!((policy[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_policy_masked_zero_mass_falls_back_to_uniform() {
        let policy = Policy::masked(&[1.0, 0.0, 0.0], &[false, true, true]).unwrap();
        assert_eq!(policy[0], 0.0);
        assert!((policy[1] - 0.5).abs() < 1e-6);
        assert!((policy[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_policy_masked_ignores_nan() {
        let policy = Policy::masked(&[f32::NAN, 1.0], &[true, true]).unwrap();
        assert_eq!(policy[0], 0.0);
        assert_eq!(policy[1], 1.0);
    }

    #[test]
    fn test_policy_masked_length_mismatch() {
        assert!(Policy::masked(&[1.0], &[true, true]).is_err());
    }

    #[test]
    fn test_value_constants() {
        assert_eq!(Value::WIN.get(), 1.0);
        assert_eq!(Value::LOSS.get(), -1.0);
        assert_eq!(Value::DRAW.get(), 0.0);
    }
}
