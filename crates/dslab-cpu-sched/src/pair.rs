//! Binding of a running process to a processor.

use serde::Serialize;

use crate::process::Process;
use crate::processor::{Processor, ProcessorId};
use crate::Tick;

pub struct Pair {
    pub process: Process,
    pub processor: Processor,
    /// Tick at which the binding was created.
    pub assigned_at: Tick,
}

impl Pair {
    pub fn new(process: Process, processor: Processor, assigned_at: Tick) -> Self {
        Self {
            process,
            processor,
            assigned_at,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.process.is_terminated()
    }

    pub fn is_quantum_expired(&self, quantum: Tick) -> bool {
        self.process.current_burst >= quantum
    }

    pub fn into_parts(self) -> (Process, Processor) {
        (self.process, self.processor)
    }
}

/// Snapshot of a pair for reporting.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PairView {
    pub process: String,
    pub processor: ProcessorId,
    pub remaining_workload: u64,
    pub current_burst: u64,
}

impl From<&Pair> for PairView {
    fn from(pair: &Pair) -> Self {
        Self {
            process: pair.process.id.clone(),
            processor: pair.processor.id,
            remaining_workload: pair.process.remaining_workload,
            current_burst: pair.process.current_burst,
        }
    }
}
