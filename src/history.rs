//! Rolling window of aggregate points
//!
//! Fixed-capacity FIFO: once full, every append evicts exactly the oldest
//! point. Readers get an owned copy so the buffer itself is never shared.

use std::collections::VecDeque;

use crate::aggregation::AggregatePoint;

/// Default number of points kept (one minute at a one second tick)
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<AggregatePoint>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer; a capacity of `0` is raised to `1`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    pub fn append(&mut self, point: AggregatePoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Points ordered oldest to newest
    pub fn snapshot(&self) -> Vec<AggregatePoint> {
        self.points.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&AggregatePoint> {
        self.points.back()
    }

    /// Change the capacity, dropping the oldest points if the buffer shrinks
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
