use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::task::TaskId;

/// A sleeping task and the sample it wakes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sleeper {
    deadline: u64,
    /// Insertion sequence; breaks deadline ties first-come first-served.
    seq: u64,
    task: TaskId,
}

// BinaryHeap is a max-heap, so the comparison is reversed: the earliest
// (deadline, seq) pair sits on top.
impl Ord for Sleeper {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Sleeper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Tasks waiting for a future sample, ordered by `(deadline, insertion order)`.
#[derive(Debug, Default)]
pub struct WaitQueue {
    heap: BinaryHeap<Sleeper>,
    next_seq: u64,
}

impl WaitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, deadline: u64, task: TaskId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Sleeper { deadline, seq, task });
    }

    /// Earliest wake sample, if anything is waiting.
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|s| s.deadline)
    }

    /// Pop the front waiter if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, TaskId)> {
        if self.next_deadline()? > now {
            return None;
        }
        self.heap.pop().map(|s| (s.deadline, s.task))
    }

    /// Snapshot of the queue in wake order.
    pub fn to_sorted_vec(&self) -> Vec<(u64, TaskId)> {
        let mut sleepers: Vec<Sleeper> = self.heap.iter().copied().collect();
        // Ord is reversed for the heap; sort_by(reverse) restores ascending order.
        sleepers.sort_by(|a, b| b.cmp(a));
        sleepers.into_iter().map(|s| (s.deadline, s.task)).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}
