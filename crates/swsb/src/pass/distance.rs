//! In-order issue counters and the distance tracker.
//!
//! Every in-order instruction takes the current value of its counter as its
//! issue id and advances the counter. A producer with issue id `p` is at
//! distance `counter - p` from the next instruction on that counter, and is
//! guaranteed complete once that distance reaches the counter's latency.

use std::collections::VecDeque;

use crate::common::DepId;

/// An in-order producer whose result may still be in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistanceEntry {
    /// Destination set of the producer.
    pub output: DepId,
    /// Counter value when the producer issued.
    pub issue: u32,
}

/// Per-counter FIFO of in-flight in-order producers.
#[derive(Clone, Debug)]
pub struct DistanceTracker {
    lanes: Vec<VecDeque<DistanceEntry>>,
}

impl DistanceTracker {
    /// Creates a tracker with `counters` independent lanes.
    pub fn new(counters: usize) -> Self {
        Self {
            lanes: vec![VecDeque::new(); counters],
        }
    }

    /// Records a producer on `counter`. Issue ids within a lane are increasing.
    pub fn push(&mut self, counter: usize, entry: DistanceEntry) {
        self.lanes[counter].push_back(entry);
    }

    /// Removes and returns the producers on `counter` that are complete at
    /// counter value `now`.
    pub fn expire(&mut self, counter: usize, now: u32, latency: u32) -> Vec<DistanceEntry> {
        let lane = &mut self.lanes[counter];
        let done = lane
            .iter()
            .take_while(|e| now.wrapping_sub(e.issue) >= latency)
            .count();
        lane.drain(..done).collect()
    }

    /// Whether no producer is tracked.
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(VecDeque::is_empty)
    }

    /// Number of tracked producers across all lanes.
    pub fn len(&self) -> usize {
        self.lanes.iter().map(VecDeque::len).sum()
    }

    /// Forgets every producer.
    pub fn clear(&mut self) {
        for lane in &mut self.lanes {
            lane.clear();
        }
    }
}

/// In-order instruction counters.
#[derive(Clone, Debug)]
pub struct IssueCounters {
    values: Vec<u32>,
}

impl IssueCounters {
    /// Creates `counters` counters at zero.
    pub fn new(counters: usize) -> Self {
        Self {
            values: vec![0; counters],
        }
    }

    /// Current value of `counter`, which is the issue id of the next instruction on it.
    pub fn get(&self, counter: usize) -> u32 {
        self.values[counter]
    }

    /// Takes an issue id on `counter` and advances it.
    pub fn advance(&mut self, counter: usize) -> u32 {
        let issue = self.values[counter];
        self.values[counter] = issue.wrapping_add(1);
        issue
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        self.values.fill(0);
    }
}
