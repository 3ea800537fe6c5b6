//! Rolling buffers for session state
//!
//! Three independent fixed-capacity windows: angle frames, raw phase
//! candidates and committed phase history. All are oldest-first.

use crate::config::BufferConfig;
use crate::phase::PhaseLabel;
use crate::pose::AngleFrame;
use std::collections::VecDeque;

/// Fixed-capacity FIFO; pushing into a full buffer evicts the oldest entry
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning whatever was evicted to make room
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Revert the most recent `push`, given what it returned
    pub fn undo_push(&mut self, evicted: Option<T>) {
        self.items.pop_back();
        if let Some(item) = evicted {
            self.items.push_front(item);
        }
    }

    /// The most recent `n` entries, oldest first
    pub fn window(&self, n: usize) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter().skip(self.items.len().saturating_sub(n))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// The three windows owned by a session
#[derive(Clone, Debug)]
pub struct TemporalBuffers {
    pub angles: RingBuffer<AngleFrame>,
    pub candidates: RingBuffer<PhaseLabel>,
    pub history: RingBuffer<PhaseLabel>,
}

impl TemporalBuffers {
    pub fn new(config: &BufferConfig) -> Self {
        Self {
            angles: RingBuffer::new(config.angle_capacity),
            candidates: RingBuffer::new(config.candidate_capacity),
            history: RingBuffer::new(config.history_capacity),
        }
    }

    /// Committed phases, oldest first
    pub fn history_labels(&self) -> Vec<PhaseLabel> {
        self.history.iter().copied().collect()
    }

    /// Drop motion data; committed history survives
    pub fn clear_motion(&mut self) {
        self.angles.clear();
        self.candidates.clear();
    }

    pub fn clear(&mut self) {
        self.clear_motion();
        self.history.clear();
    }
}

impl Default for TemporalBuffers {
    fn default() -> Self {
        Self::new(&BufferConfig::default())
    }
}
