//! Ready queue with pluggable ordering.

use std::cmp::Ordering;
use std::collections::VecDeque;

use itertools::Itertools;
use serde::Serialize;

use crate::process::Process;
use crate::Tick;

/// Ordering of waiting processes, ties are broken by earlier arrival and then by insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOrdering {
    /// Earlier arrival first.
    ArrivalTime,
    /// Smaller total workload first.
    TotalWorkload,
    /// Smaller remaining workload first.
    RemainingWorkload,
    /// Insertion order, re-admitted processes go to the tail.
    Fifo,
    /// Higher `(waiting + workload) / workload` first.
    ResponseRatio,
}

struct Entry {
    process: Process,
    seq: u64,
}

/// Processes that have arrived and wait for a processor.
///
/// Entries are kept in insertion order and the ordering is applied on every extraction,
/// so keys which change while a process waits (waiting time) are always taken into account.
pub struct ReadyQueue {
    ordering: QueueOrdering,
    entries: Vec<Entry>,
    next_seq: u64,
}

impl ReadyQueue {
    pub fn new(ordering: QueueOrdering) -> Self {
        Self {
            ordering,
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends a process to the queue.
    pub fn push(&mut self, process: Process) {
        self.entries.push(Entry {
            process,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Moves processes arriving at `time` from the front of `not_arrived` (sorted by arrival time) to the queue.
    ///
    /// Returns the number of admitted processes.
    pub fn admit_arrivals(&mut self, not_arrived: &mut VecDeque<Process>, time: Tick) -> usize {
        let mut admitted = 0;
        while not_arrived.front().map_or(false, |p| p.arrival_time <= time) {
            let process = not_arrived.pop_front().unwrap();
            assert!(
                process.arrival_time == time,
                "Process {} arriving at {} was admitted late at {}",
                process.id,
                process.arrival_time,
                time
            );
            self.push(process);
            admitted += 1;
        }
        admitted
    }

    /// Removes and returns the highest-priority process.
    pub fn next_process(&mut self) -> Option<Process> {
        let pos = self.entries.iter().position_min_by(|a, b| self.compare(a, b))?;
        Some(self.entries.remove(pos).process)
    }

    /// Increments waiting time of every queued process.
    pub fn age_waiting_processes(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.process.wait();
        }
    }

    /// Returns queued processes in priority order without removing them.
    pub fn ordered(&self) -> Vec<&Process> {
        self.entries
            .iter()
            .sorted_by(|a, b| self.compare(a, b))
            .map(|e| &e.process)
            .collect()
    }

    /// Returns an owned copy of the queue contents in priority order.
    pub fn snapshot(&self) -> Vec<QueuedProcess> {
        self.ordered().into_iter().map(QueuedProcess::from).collect()
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let (pa, pb) = (&a.process, &b.process);
        let primary = match self.ordering {
            QueueOrdering::ArrivalTime => Ordering::Equal,
            QueueOrdering::TotalWorkload => pa.total_workload.cmp(&pb.total_workload),
            QueueOrdering::RemainingWorkload => pa.remaining_workload.cmp(&pb.remaining_workload),
            QueueOrdering::Fifo => return a.seq.cmp(&b.seq),
            QueueOrdering::ResponseRatio => {
                let (na, da) = pa.response_ratio();
                let (nb, db) = pb.response_ratio();
                (nb as u128 * da as u128).cmp(&(na as u128 * db as u128))
            }
        };
        primary
            .then(pa.arrival_time.cmp(&pb.arrival_time))
            .then(a.seq.cmp(&b.seq))
    }
}

/// Snapshot of a waiting process for reporting.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QueuedProcess {
    pub id: String,
    pub remaining_workload: u64,
    pub waiting_time: u64,
}

impl From<&Process> for QueuedProcess {
    fn from(process: &Process) -> Self {
        Self {
            id: process.id.clone(),
            remaining_workload: process.remaining_workload,
            waiting_time: process.waiting_time,
        }
    }
}
