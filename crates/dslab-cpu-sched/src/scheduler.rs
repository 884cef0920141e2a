//! Tick-by-tick scheduling engine.

use std::collections::{HashSet, VecDeque};

use crate::algorithm::{Algorithm, Preemption};
use crate::error::ValidationError;
use crate::pair::Pair;
use crate::pool::ProcessorPool;
use crate::process::Process;
use crate::processor::{Processor, ProcessorPower, ProcessorPowerModel};
use crate::queue::ReadyQueue;
use crate::request::Request;
use crate::response::{Response, TickSnapshot};
use crate::status::RunningStatus;
use crate::{log_debug, log_info, log_trace, Tick};

/// Simulates a single scheduling policy over a validated request.
///
/// Every call to [`step`](Scheduler::step) performs one tick:
///
/// 1. processes arriving at the current tick enter the ready queue;
/// 2. terminated processes release their processors and are reported;
/// 3. running processes are preempted according to the policy and return to the ready queue;
/// 4. free processors are assigned to ready processes in the queue order;
/// 5. waiting processes age, running processes do one unit of work and draw power;
/// 6. a snapshot of the system is recorded;
/// 7. the clock advances.
///
/// The simulation is finished when all processes have arrived and none is waiting or running.
pub struct Scheduler {
    name: String,
    algorithm: Algorithm,
    preemption: Preemption,
    not_arrived: VecDeque<Process>,
    ready_queue: ReadyQueue,
    pool: ProcessorPool,
    status: RunningStatus,
    processor_count: usize,
    response: Response,
}

impl Scheduler {
    /// Creates scheduler for the request, fails if the request is invalid.
    pub fn new(request: &Request) -> Result<Self, ValidationError> {
        request.validate()?;
        let mut processes: Vec<Process> = request
            .processes
            .iter()
            .map(|p| Process::new(&p.id, p.arrival_time, p.workload))
            .collect();
        processes.sort_by_key(|p| p.arrival_time);
        let processors: Vec<Processor> = request
            .processors
            .iter()
            .map(|p| Processor::new(p.id, ProcessorPowerModel::new(p.startup_power, p.running_power)))
            .collect();
        Ok(Self {
            name: request.algorithm.to_string(),
            algorithm: request.algorithm,
            preemption: request.algorithm.preemption(request.time_quantum),
            not_arrived: processes.into(),
            ready_queue: ReadyQueue::new(request.algorithm.ordering()),
            processor_count: processors.len(),
            pool: ProcessorPool::new(processors),
            status: RunningStatus::new(),
            response: Response::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the current tick.
    pub fn time(&self) -> Tick {
        self.status.time()
    }

    pub fn is_finished(&self) -> bool {
        self.not_arrived.is_empty() && self.ready_queue.is_empty() && self.status.is_empty()
    }

    /// Output collected so far.
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    /// Runs the simulation until no work remains.
    pub fn run(mut self) -> Response {
        log_info!(
            self,
            "started with {} processes and {} processors",
            self.not_arrived.len(),
            self.processor_count
        );
        while self.step() {}
        log_info!(self, "finished, total power consumption {:.3}", self.status.total_power());
        self.response
    }

    /// Performs one tick of the simulation.
    ///
    /// Returns false without doing anything if the simulation is finished.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let time = self.time();

        let admitted = self.ready_queue.admit_arrivals(&mut self.not_arrived, time);
        if admitted > 0 {
            log_debug!(self, "{} processes arrived", admitted);
        }

        if self.status.has_terminated_pair() {
            let (processes, processors) = self.status.extract_terminated();
            for process in processes.iter() {
                log_debug!(self, "process {} terminated", process.id);
            }
            self.response.add_results(processes.into_iter().map(|p| p.into_result(time)));
            self.pool.release(processors);
        }

        match self.preemption {
            Preemption::None => {}
            Preemption::ShorterRemaining => {
                if self.status.has_preemptible(&self.ready_queue, self.pool.len()) {
                    let (processes, processors) = self.status.extract_preempted(&self.ready_queue, self.pool.len());
                    self.requeue(processes, processors, "preempted");
                }
            }
            Preemption::QuantumExpiry(quantum) => {
                if self.status.has_quantum_expired(quantum) {
                    let (processes, processors) = self.status.extract_quantum_expired(quantum);
                    self.requeue(processes, processors, "exhausted its time quantum");
                }
            }
        }

        while !self.ready_queue.is_empty() {
            let Some(processor) = self.pool.take_next() else {
                break;
            };
            let process = self.ready_queue.next_process().unwrap();
            log_debug!(self, "assigned process {} to processor {}", process.id, processor.id);
            self.status.add_pair(Pair::new(process, processor, time));
        }

        self.check_invariants();

        self.ready_queue.age_waiting_processes();
        self.status.advance_workload();
        let power = self.status.advance_power();
        log_trace!(self, "power {:.3}, total {:.3}", power, self.status.total_power());

        let snapshot = self.snapshot();
        self.response.add_snapshot(snapshot);

        self.status.advance_tick();
        true
    }

    fn requeue(&mut self, processes: Vec<Process>, processors: Vec<Processor>, reason: &str) {
        for (process, processor) in processes.iter().zip(processors.iter()) {
            log_debug!(
                self,
                "process {} {} on processor {}, {} workload left",
                process.id,
                reason,
                processor.id,
                process.remaining_workload
            );
        }
        self.pool.release(processors);
        for process in processes {
            self.ready_queue.push(process);
        }
    }

    fn snapshot(&self) -> TickSnapshot {
        let mut processors: Vec<ProcessorPower> = self
            .pool
            .iter()
            .chain(self.status.processors())
            .map(ProcessorPower::from)
            .collect();
        processors.sort_by_key(|p| p.id);
        TickSnapshot {
            tick: self.time(),
            ready_queue: self.ready_queue.snapshot(),
            pairs: self.status.snapshot(),
            processors,
            total_power: self.status.total_power(),
        }
    }

    // Every process is in exactly one of: not arrived, ready queue, running.
    // Every processor is either available or bound to exactly one pair.
    fn check_invariants(&self) {
        let mut seen = HashSet::new();
        let not_arrived = self.not_arrived.iter().map(|p| (p, "not arrived"));
        let ready = self.ready_queue.ordered().into_iter().map(|p| (p, "ready"));
        let running = self.status.pairs().iter().map(|p| (&p.process, "running"));
        for (process, location) in not_arrived.chain(ready).chain(running) {
            assert!(
                seen.insert(process.id.as_str()),
                "Process {} is found {} while being in another state at tick {}",
                process.id,
                location,
                self.time()
            );
        }
        for processor in self.status.processors() {
            assert!(
                !self.pool.contains(processor.id),
                "Processor {} is assigned while marked available at tick {}",
                processor.id,
                self.time()
            );
        }
        assert_eq!(
            self.pool.len() + self.status.len(),
            self.processor_count,
            "Processor count changed at tick {}",
            self.time()
        );
    }
}

/// Runs the whole simulation for the request.
pub fn simulate(request: &Request) -> Result<Response, ValidationError> {
    Ok(Scheduler::new(request)?.run())
}
