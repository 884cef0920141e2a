#![doc = include_str!("../README.md")]

pub mod algorithm;
pub mod error;
pub mod log;
pub mod pair;
pub mod pool;
pub mod process;
pub mod processor;
pub mod queue;
pub mod request;
pub mod response;
pub mod scheduler;
pub mod status;

pub use colored;

pub use algorithm::Algorithm;
pub use error::ValidationError;
pub use request::Request;
pub use response::Response;
pub use scheduler::{simulate, Scheduler};

/// Discrete simulation time.
pub type Tick = u64;
