//! Timed callbacks keyed by a generation counter.
//!
//! Everything the UI wants to happen later (the opponent's move, animation
//! frames, the next poll) is queued here. Bumping the generation drops the
//! queue, and results coming back from background tasks are tagged with the
//! generation they were started under so stale ones can be discarded.

use std::time::{Duration, Instant};
use tracing::trace;

/// A value produced under a particular generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged<T> {
    /// Generation current when the work was started.
    pub generation: u64,
    /// The result.
    pub value: T,
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    at: Instant,
    seq: u64,
    task: T,
}

/// Single-threaded queue of deferred tasks.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    generation: u64,
    next_seq: u64,
    tasks: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler at generation zero.
    pub fn new() -> Self {
        Self {
            generation: 0,
            next_seq: 0,
            tasks: Vec::new(),
        }
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if `generation` is still current.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Wraps `value` with the current generation.
    pub fn tag<V>(&self, value: V) -> Tagged<V> {
        Tagged {
            generation: self.generation,
            value,
        }
    }

    /// Queues `task` to run at `at`.
    pub fn schedule_at(&mut self, at: Instant, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Scheduled { at, seq, task });
    }

    /// Queues `task` to run `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) {
        self.schedule_at(now + delay, task);
    }

    /// Drops every queued task and starts a new generation.
    pub fn advance_generation(&mut self) -> u64 {
        trace!(dropped = self.tasks.len(), "Advancing generation");
        self.tasks.clear();
        self.generation += 1;
        self.generation
    }

    /// Drops queued tasks matching `predicate` without changing generation.
    pub fn cancel_where(&mut self, predicate: impl Fn(&T) -> bool) {
        self.tasks.retain(|s| !predicate(&s.task));
    }

    /// True if a queued task matches `predicate`.
    pub fn contains(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.tasks.iter().any(|s| predicate(&s.task))
    }

    /// Removes and returns tasks due at `now`, earliest first.
    ///
    /// Tasks due at the same instant come out in the order they were queued.
    pub fn due(&mut self, now: Instant) -> Vec<T> {
        let (mut ready, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|s| s.at <= now);
        self.tasks = pending;
        ready.sort_by_key(|s| (s.at, s.seq));
        ready.into_iter().map(|s| s.task).collect()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|s| s.at).min()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
