//! Deduplicated FIFO of world grid slot indices.

use std::collections::VecDeque;

use bitvec::prelude::*;

use crate::engine_state::voxels::world::WORLD_SLOT_COUNT;

/// A FIFO of slot indices in which each slot appears at most once.
///
/// Membership is tracked in a bit per slot, so pushing a slot that is already
/// queued is O(1) and leaves the queue unchanged.
#[derive(Debug, Clone)]
pub struct ChunkQueue {
    entries: VecDeque<usize>,
    queued: BitVec,
}

impl Default for ChunkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkQueue {
    /// Creates an empty queue sized for the world grid.
    pub fn new() -> Self {
        ChunkQueue {
            entries: VecDeque::new(),
            queued: bitvec![0; WORLD_SLOT_COUNT],
        }
    }

    /// Appends `index` unless it is already queued or not a valid slot.
    ///
    /// # Returns
    /// `true` if the slot was added.
    pub fn push(&mut self, index: usize) -> bool {
        match self.queued.get(index).map(|bit| *bit) {
            Some(false) => {
                self.queued.set(index, true);
                self.entries.push_back(index);
                true
            }
            _ => false,
        }
    }

    /// Removes and returns the oldest slot.
    pub fn pop_front(&mut self) -> Option<usize> {
        let index = self.entries.pop_front()?;
        self.queued.set(index, false);
        Some(index)
    }

    /// Drops every queued slot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.queued.fill(false);
    }

    /// Whether `index` is queued.
    pub fn contains(&self, index: usize) -> bool {
        self.queued.get(index).is_some_and(|bit| *bit)
    }

    /// Number of queued slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued slots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }
}
