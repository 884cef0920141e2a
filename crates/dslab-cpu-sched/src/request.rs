//! Simulation request and its loading from files.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::error::ValidationError;
use crate::processor::ProcessorId;
use crate::Tick;

/// Process description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessSpec {
    pub id: String,
    pub arrival_time: Tick,
    pub workload: u64,
}

impl ProcessSpec {
    pub fn new(id: &str, arrival_time: Tick, workload: u64) -> Self {
        Self {
            id: id.to_string(),
            arrival_time,
            workload,
        }
    }
}

/// Processor description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessorSpec {
    pub id: ProcessorId,
    pub startup_power: f64,
    pub running_power: f64,
}

impl ProcessorSpec {
    pub fn new(id: ProcessorId, startup_power: f64, running_power: f64) -> Self {
        Self {
            id,
            startup_power,
            running_power,
        }
    }
}

/// Full description of a simulation run.
///
/// YAML example:
///
/// ```yaml
/// algorithm: RR
/// time_quantum: 2
/// processors:
///   - id: 0
///     startup_power: 0.5
///     running_power: 3
/// processes:
///   - id: P1
///     arrival_time: 0
///     workload: 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub processes: Vec<ProcessSpec>,
    pub processors: Vec<ProcessorSpec>,
    pub algorithm: Algorithm,
    #[serde(default)]
    pub time_quantum: Option<Tick>,
}

impl Request {
    /// Loads request from YAML (`.yaml`, `.yml`) or JSON (`.json`) file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| format!("Can't read file {}: {}", path.display(), e))?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&data)
                .map_err(|e| format!("Can't parse YAML from file {}: {}", path.display(), e)),
            "json" => serde_json::from_str(&data)
                .map_err(|e| format!("Can't parse JSON from file {}: {}", path.display(), e)),
            _ => Err(format!(
                "Unsupported request format of file {}, expected .yaml, .yml or .json",
                path.display()
            )),
        }
    }

    /// Checks request bounds, returns the first found violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.processors.is_empty() {
            return Err(ValidationError::NoProcessors);
        }
        let mut processor_ids = HashSet::new();
        for processor in self.processors.iter() {
            if !processor_ids.insert(processor.id) {
                return Err(ValidationError::DuplicateProcessor { id: processor.id });
            }
            let valid_power = |power: f64| power.is_finite() && power >= 0.;
            if !valid_power(processor.startup_power) || !valid_power(processor.running_power) {
                return Err(ValidationError::InvalidPower { processor: processor.id });
            }
        }
        let mut process_ids = HashSet::new();
        for process in self.processes.iter() {
            if !process_ids.insert(process.id.as_str()) {
                return Err(ValidationError::DuplicateProcess {
                    id: process.id.clone(),
                });
            }
            if process.workload == 0 {
                return Err(ValidationError::ZeroWorkload {
                    process: process.id.clone(),
                });
            }
        }
        match self.time_quantum {
            Some(0) => Err(ValidationError::ZeroTimeQuantum),
            None if self.algorithm.requires_time_quantum() => Err(ValidationError::MissingTimeQuantum),
            _ => Ok(()),
        }
    }
}
