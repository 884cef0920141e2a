//! Simulation output: per-tick snapshots and results of terminated processes.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::pair::PairView;
use crate::process::ProcessResult;
use crate::processor::ProcessorPower;
use crate::queue::QueuedProcess;
use crate::Tick;

/// Observable state of the system at the end of a tick.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TickSnapshot {
    pub tick: Tick,
    pub ready_queue: Vec<QueuedProcess>,
    /// Running pairs ordered by processor id.
    pub pairs: Vec<PairView>,
    /// Power of all processors ordered by processor id.
    pub processors: Vec<ProcessorPower>,
    /// Power consumed by the system since the simulation start.
    pub total_power: f64,
}

impl TickSnapshot {
    /// Power drawn by all processors during this tick.
    pub fn power(&self) -> f64 {
        self.processors.iter().map(|p| p.power).sum()
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub snapshots: Vec<TickSnapshot>,
    /// Results in termination order.
    pub results: Vec<ProcessResult>,
}

/// Aggregated metrics of a simulation run.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub processes: usize,
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
    pub average_normalized_turnaround_time: f64,
    pub total_power: f64,
    /// Tick at which the last process terminated.
    pub makespan: Tick,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_snapshot(&mut self, snapshot: TickSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn add_results(&mut self, results: impl IntoIterator<Item = ProcessResult>) {
        self.results.extend(results);
    }

    pub fn result(&self, process_id: &str) -> Option<&ProcessResult> {
        self.results.iter().find(|r| r.id == process_id)
    }

    pub fn total_power(&self) -> f64 {
        self.snapshots.last().map_or(0., |s| s.total_power)
    }

    pub fn summary(&self) -> Summary {
        let count = self.results.len();
        let average = |f: fn(&ProcessResult) -> f64| {
            if count == 0 {
                0.
            } else {
                self.results.iter().map(f).sum::<f64>() / count as f64
            }
        };
        Summary {
            processes: count,
            average_waiting_time: average(|r| r.waiting_time as f64),
            average_turnaround_time: average(|r| r.turnaround_time as f64),
            average_normalized_turnaround_time: average(|r| r.normalized_turnaround_time),
            total_power: self.total_power(),
            makespan: self.results.iter().map(|r| r.finish_time).max().unwrap_or(0),
        }
    }

    /// Writes response as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())
    }
}
