//! Deferred task scheduling for spawns and flight completions.
//!
//! All delayed work (spawn staggering, the mid-flight reparent through the
//! portal, the final removal) goes through one time-ordered queue
//! instead of real-time sleeps or timer callbacks. The engine drains due
//! tasks from its `update` entry point, which makes every schedule fully
//! deterministic under an injected clock.
//!
//! Ties on the fire time resolve by insertion order, so a tick's spawn
//! sequence executes in program order even when staggers collapse to zero.

use crate::params::SpawnRequest;
use crate::pool::SlotHandle;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One unit of deferred work.
#[derive(Clone, Debug)]
pub enum Task {
    /// Execute a spawn.
    Spawn(SpawnRequest),
    /// Move an in-flight object from the near side into the portal world,
    /// preserving its world transform.
    Reparent(SlotHandle),
    /// Strip overlays, detach the object, and free its pool slot.
    Remove(SlotHandle),
}

struct Scheduled {
    fire_at: f64,
    seq: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest first.
        // Fire times are finite by construction (schedule asserts).
        other
            .fire_at
            .partial_cmp(&self.fire_at)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time-ordered queue of deferred tasks.
#[derive(Default)]
pub struct TaskQueue {
    heap: BinaryHeap<Scheduled>,
    seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a task to fire at an absolute time in seconds.
    pub fn schedule(&mut self, fire_at: f64, task: Task) {
        debug_assert!(fire_at.is_finite());
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Scheduled { fire_at, seq, task });
    }

    /// Pop the next task whose fire time is at or before `now`.
    ///
    /// Returns the task together with its scheduled fire time so follow-up
    /// delays chain from the scheduled moment, not the drained moment.
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, Task)> {
        if self.heap.peek().map(|s| s.fire_at <= now)? {
            self.heap.pop().map(|s| (s.fire_at, s.task))
        } else {
            None
        }
    }

    /// Fire time of the next scheduled task.
    pub fn next_fire_at(&self) -> Option<f64> {
        self.heap.peek().map(|s| s.fire_at)
    }

    /// Number of tasks waiting.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
