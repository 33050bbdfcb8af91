//! Pending-leaf queue.
//!
//! Leaves from every game of the batch share one queue so that evaluator
//! calls stay full regardless of how many games are still active. The
//! queue is local to one search call and is always flushed before the call
//! returns.

/// Owner of a queued leaf: the game it was reached from and the root action
/// that reached it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingLeaf {
    pub game: usize,
    pub action: usize,
}

/// Encodings awaiting evaluation, stored parallel to their owners so the
/// encodings can be handed to the evaluator as one contiguous batch.
#[derive(Debug, Default)]
pub(crate) struct LeafQueue {
    encodings: Vec<Vec<f32>>,
    owners: Vec<PendingLeaf>,
}

impl LeafQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            encodings: Vec::with_capacity(capacity),
            owners: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, encoding: Vec<f32>, game: usize, action: usize) {
        self.encodings.push(encoding);
        self.owners.push(PendingLeaf { game, action });
    }

    pub(crate) fn len(&self) -> usize {
        self.owners.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub(crate) fn encodings(&self) -> &[Vec<f32>] {
        &self.encodings
    }

    pub(crate) fn owners(&self) -> &[PendingLeaf] {
        &self.owners
    }

    /// Drop all queued leaves, keeping the allocations.
    pub(crate) fn clear(&mut self) {
        self.encodings.clear();
        self.owners.clear();
    }
}
