//! Processor and power consumption model.

use serde::Serialize;

pub type ProcessorId = u32;

/// Power state of a processor.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Not bound to a process, the next tick of work requires a startup.
    Idle,
    /// Spending the first tick of an assignment on startup.
    Startup,
    Running,
}

/// Per-state power consumption of a processor.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ProcessorPowerModel {
    startup_power: f64,
    running_power: f64,
}

impl ProcessorPowerModel {
    /// Creates power model with specified parameters.
    ///
    /// * `startup_power` - Power consumed during the first tick of an assignment.
    /// * `running_power` - Power consumed during each following tick.
    pub fn new(startup_power: f64, running_power: f64) -> Self {
        Self {
            startup_power,
            running_power,
        }
    }

    /// Returns the power consumed per tick in the given state.
    pub fn get_power(&self, state: PowerState) -> f64 {
        match state {
            PowerState::Idle => 0.,
            PowerState::Startup => self.startup_power,
            PowerState::Running => self.running_power,
        }
    }
}

/// A simulated unit of capacity.
#[derive(Debug, Clone)]
pub struct Processor {
    pub id: ProcessorId,
    state: PowerState,
    power_model: ProcessorPowerModel,
    current_power: f64,
    consumed_power: f64,
}

impl Processor {
    pub fn new(id: ProcessorId, power_model: ProcessorPowerModel) -> Self {
        Self {
            id,
            state: PowerState::Idle,
            power_model,
            current_power: 0.,
            consumed_power: 0.,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Power drawn during the last accounted tick.
    pub fn current_power(&self) -> f64 {
        self.current_power
    }

    /// Power consumed since the simulation start.
    pub fn consumed_power(&self) -> f64 {
        self.consumed_power
    }

    /// Accounts one tick of work and returns the power drawn.
    ///
    /// The first tick after leaving the idle state is spent on startup.
    pub fn consume(&mut self) -> f64 {
        self.state = match self.state {
            PowerState::Idle => PowerState::Startup,
            PowerState::Startup | PowerState::Running => PowerState::Running,
        };
        self.current_power = self.power_model.get_power(self.state);
        self.consumed_power += self.current_power;
        self.current_power
    }

    /// Returns the processor to the state requiring a startup.
    pub fn reset(&mut self) {
        self.state = PowerState::Idle;
        self.current_power = 0.;
    }
}

/// Power report of a single processor for one tick.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProcessorPower {
    pub id: ProcessorId,
    pub state: PowerState,
    pub power: f64,
    pub consumed_power: f64,
}

impl From<&Processor> for ProcessorPower {
    fn from(processor: &Processor) -> Self {
        Self {
            id: processor.id,
            state: processor.state,
            power: processor.current_power,
            consumed_power: processor.consumed_power,
        }
    }
}
