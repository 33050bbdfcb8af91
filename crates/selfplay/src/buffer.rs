//! Bounded replay buffer of training examples.

use crate::example::TrainingExample;
use rand::seq::index;
use rand::Rng;
use std::collections::VecDeque;

/// FIFO buffer: once full, the oldest examples are evicted first.
///
/// Training should not start before [`ReplayBuffer::is_ready`], i.e. until
/// at least `min_size` examples have been collected.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    capacity: usize,
    min_size: usize,
    items: VecDeque<TrainingExample>,
}

impl ReplayBuffer {
    /// Defaults of the training loop: 100k examples, 2k before sampling.
    pub const DEFAULT_CAPACITY: usize = 100_000;
    pub const DEFAULT_MIN_SIZE: usize = 2_000;

    pub fn new(capacity: usize, min_size: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            min_size: min_size.min(capacity),
            items: VecDeque::with_capacity(capacity.min(4096)),
        }
    }

    pub fn push(&mut self, example: TrainingExample) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(example);
    }

    pub fn extend(&mut self, examples: impl IntoIterator<Item = TrainingExample>) {
        for example in examples {
            self.push(example);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether enough examples have been collected to start sampling.
    pub fn is_ready(&self) -> bool {
        self.items.len() >= self.min_size
    }

    /// Up to `batch_size` distinct examples, uniformly at random.
    pub fn sample<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Vec<&TrainingExample> {
        let amount = batch_size.min(self.items.len());
        index::sample(rng, self.items.len(), amount)
            .into_iter()
            .map(|i| &self.items[i])
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainingExample> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Default for ReplayBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Self::DEFAULT_MIN_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qumalaq_core::Player;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn example(tag: f32) -> TrainingExample {
        TrainingExample {
            state: vec![tag],
            policy: vec![1.0],
            value: 0.0,
            mover: Player::First,
        }
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut buffer = ReplayBuffer::new(3, 1);
        buffer.extend((0..5).map(|i| example(i as f32)));

        assert_eq!(buffer.len(), 3);
        let tags: Vec<f32> = buffer.iter().map(|e| e.state[0]).collect();
        assert_eq!(tags, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_ready_after_min_size() {
        let mut buffer = ReplayBuffer::new(10, 2);
        assert!(!buffer.is_ready());
        buffer.push(example(0.0));
        assert!(!buffer.is_ready());
        buffer.push(example(1.0));
        assert!(buffer.is_ready());
    }

    #[test]
    fn test_sample_is_distinct_and_seeded() {
        let mut buffer = ReplayBuffer::new(100, 0);
        buffer.extend((0..50).map(|i| example(i as f32)));

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let batch = buffer.sample(10, &mut rng);
        let mut tags: Vec<i32> = batch.iter().map(|e| e.state[0] as i32).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), 10);

        let again: Vec<f32> = buffer
            .sample(10, &mut ChaCha8Rng::seed_from_u64(9))
            .iter()
            .map(|e| e.state[0])
            .collect();
        let first: Vec<f32> = batch.iter().map(|e| e.state[0]).collect();
        assert_eq!(again, first);

        // Asking for more than is stored returns everything once.
        assert_eq!(buffer.sample(500, &mut rng).len(), 50);
    }
}
