//! Scheduling algorithms and their parameters.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::queue::QueueOrdering;
use crate::Tick;

/// Scheduling algorithm selected for a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// First come, first served.
    Fcfs,
    /// Shortest process next (by total workload), non-preemptive.
    Spn,
    /// Shortest remaining time next, preemptive.
    Srtn,
    /// Round robin with a fixed time quantum.
    RoundRobin,
    /// Highest response ratio next, non-preemptive.
    Hrrn,
}

/// Rule for taking processors away from running processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preemption {
    /// Processes run until termination.
    None,
    /// A ready process with strictly smaller remaining workload displaces a running one.
    ShorterRemaining,
    /// A process is displaced after running for the given number of ticks.
    QuantumExpiry(Tick),
}

impl Algorithm {
    /// All supported algorithms.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Fcfs,
        Algorithm::Spn,
        Algorithm::Srtn,
        Algorithm::RoundRobin,
        Algorithm::Hrrn,
    ];

    /// Returns the ready queue ordering used by the algorithm.
    pub fn ordering(&self) -> QueueOrdering {
        match self {
            Algorithm::Fcfs => QueueOrdering::ArrivalTime,
            Algorithm::Spn => QueueOrdering::TotalWorkload,
            Algorithm::Srtn => QueueOrdering::RemainingWorkload,
            Algorithm::RoundRobin => QueueOrdering::Fifo,
            Algorithm::Hrrn => QueueOrdering::ResponseRatio,
        }
    }

    /// Returns the preemption rule of the algorithm.
    ///
    /// Panics if called for round robin without a time quantum, requests are validated before this point.
    pub fn preemption(&self, time_quantum: Option<Tick>) -> Preemption {
        match self {
            Algorithm::Srtn => Preemption::ShorterRemaining,
            Algorithm::RoundRobin => {
                Preemption::QuantumExpiry(time_quantum.expect("round robin requires a time quantum"))
            }
            _ => Preemption::None,
        }
    }

    /// Returns true if the algorithm needs a time quantum.
    pub fn requires_time_quantum(&self) -> bool {
        matches!(self, Algorithm::RoundRobin)
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Algorithm::Fcfs => "FCFS",
            Algorithm::Spn => "SPN",
            Algorithm::Srtn => "SRTN",
            Algorithm::RoundRobin => "RR",
            Algorithm::Hrrn => "HRRN",
        };
        f.write_str(name)
    }
}

impl FromStr for Algorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fcfs" => Ok(Algorithm::Fcfs),
            "spn" => Ok(Algorithm::Spn),
            "srtn" => Ok(Algorithm::Srtn),
            "rr" | "roundrobin" | "round-robin" => Ok(Algorithm::RoundRobin),
            "hrrn" => Ok(Algorithm::Hrrn),
            _ => Err(ValidationError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
