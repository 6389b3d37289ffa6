//! Work partitioning for progressive rendering.
//!
//! The image is split into ranges of consecutive pixels. Each range goes
//! through the queue once per sample, and the queue always serves the range
//! with the fewest samples, so the whole image converges evenly and every
//! intermediate save looks like a complete (if noisy) render.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A pixel range `[begin, end)` and the samples it has received so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    pub begin: usize,
    pub end: usize,
    pub samples: u32,
}

impl WorkUnit {
    pub fn new(begin: usize, end: usize) -> Self {
        Self {
            begin,
            end,
            samples: 0,
        }
    }
}

/// `BinaryHeap` is a max-heap, so the unit that should be served first
/// compares greatest: fewest samples, then lowest `begin`.
impl Ord for WorkUnit {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .samples
            .cmp(&self.samples)
            .then_with(|| other.begin.cmp(&self.begin))
            .then_with(|| other.end.cmp(&self.end))
    }
}

impl PartialOrd for WorkUnit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split `total` pixels into at most `partitions` contiguous units.
///
/// Units are `ceil(total / partitions)` pixels long, the last one possibly
/// shorter. An empty image yields no units.
pub fn partition(total: usize, partitions: usize) -> Vec<WorkUnit> {
    let size = total.div_ceil(partitions.max(1)).max(1);
    (0..total)
        .step_by(size)
        .map(|begin| WorkUnit::new(begin, (begin + size).min(total)))
        .collect()
}

/// Thread safe priority queue of work units.
#[derive(Debug, Default)]
pub struct WorkQueue {
    heap: Mutex<BinaryHeap<WorkUnit>>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue holding every unit of `partition(total, partitions)`.
    pub fn partitioned(total: usize, partitions: usize) -> Self {
        Self {
            heap: Mutex::new(partition(total, partitions).into()),
        }
    }

    pub fn push(&self, unit: WorkUnit) {
        self.lock().push(unit);
    }

    /// Remove the unit with the fewest samples.
    pub fn try_pop(&self) -> Option<WorkUnit> {
        self.lock().pop()
    }

    /// Copy of the unit `try_pop` would return next.
    pub fn peek(&self) -> Option<WorkUnit> {
        self.lock().peek().copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking holder cannot leave the heap half-updated, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, BinaryHeap<WorkUnit>> {
        self.heap.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
