//! Request validation errors.

use std::fmt::{Display, Formatter};

use crate::processor::ProcessorId;

/// Describes why a simulation request was rejected before the simulation started.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Algorithm name is not recognized.
    UnknownAlgorithm(String),
    /// Request contains no processors.
    NoProcessors,
    /// Process requires no work.
    ZeroWorkload {
        /// Process id.
        process: String,
    },
    /// Several processes share the same id.
    DuplicateProcess {
        /// Process id.
        id: String,
    },
    /// Several processors share the same id.
    DuplicateProcessor {
        /// Processor id.
        id: ProcessorId,
    },
    /// Processor power is negative or not a finite number.
    InvalidPower {
        /// Processor id.
        processor: ProcessorId,
    },
    /// Round robin was requested without a time quantum.
    MissingTimeQuantum,
    /// Time quantum is zero.
    ZeroTimeQuantum,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UnknownAlgorithm(name) => write!(f, "unknown scheduling algorithm: {}", name),
            ValidationError::NoProcessors => write!(f, "at least one processor is required"),
            ValidationError::ZeroWorkload { process } => {
                write!(f, "process {} has zero workload", process)
            }
            ValidationError::DuplicateProcess { id } => write!(f, "duplicate process id: {}", id),
            ValidationError::DuplicateProcessor { id } => write!(f, "duplicate processor id: {}", id),
            ValidationError::InvalidPower { processor } => {
                write!(f, "processor {} has negative or non-finite power", processor)
            }
            ValidationError::MissingTimeQuantum => write!(f, "round robin requires a time quantum"),
            ValidationError::ZeroTimeQuantum => write!(f, "time quantum must be at least 1"),
        }
    }
}

impl std::error::Error for ValidationError {}
