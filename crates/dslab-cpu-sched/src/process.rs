//! Process model.

use serde::Serialize;

use crate::Tick;

/// A unit of work competing for processors.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Process {
    pub id: String,
    pub arrival_time: Tick,
    pub total_workload: u64,
    pub remaining_workload: u64,
    /// Ticks spent in the ready queue.
    pub waiting_time: u64,
    /// Ticks spent running since the last assignment to a processor.
    pub current_burst: u64,
}

impl Process {
    pub fn new(id: &str, arrival_time: Tick, workload: u64) -> Self {
        Self {
            id: id.to_string(),
            arrival_time,
            total_workload: workload,
            remaining_workload: workload,
            waiting_time: 0,
            current_burst: 0,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.remaining_workload == 0
    }

    /// Performs one tick of work.
    pub fn work(&mut self) {
        assert!(
            self.remaining_workload > 0,
            "Process {} is running with no remaining workload",
            self.id
        );
        self.remaining_workload -= 1;
        self.current_burst += 1;
    }

    pub fn wait(&mut self) {
        self.waiting_time += 1;
    }

    pub fn reset_burst(&mut self) {
        self.current_burst = 0;
    }

    /// Response ratio `(waiting + workload) / workload` as a fraction.
    pub fn response_ratio(&self) -> (u64, u64) {
        (self.waiting_time + self.total_workload, self.total_workload)
    }

    /// Builds the final record of a process terminated at `finish_time`.
    pub fn into_result(self, finish_time: Tick) -> ProcessResult {
        let turnaround_time = finish_time - self.arrival_time;
        ProcessResult {
            normalized_turnaround_time: turnaround_time as f64 / self.total_workload as f64,
            id: self.id,
            arrival_time: self.arrival_time,
            workload: self.total_workload,
            waiting_time: self.waiting_time,
            turnaround_time,
            finish_time,
        }
    }
}

/// Final metrics of a terminated process.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub id: String,
    pub arrival_time: Tick,
    pub workload: u64,
    pub waiting_time: u64,
    pub turnaround_time: u64,
    /// Turnaround time divided by workload.
    pub normalized_turnaround_time: f64,
    pub finish_time: Tick,
}
