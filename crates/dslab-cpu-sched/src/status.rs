//! Running processes, system power consumption and current time.

use std::cmp::Reverse;

use crate::pair::{Pair, PairView};
use crate::process::Process;
use crate::processor::{Processor, ProcessorId};
use crate::queue::ReadyQueue;
use crate::Tick;

/// Live state of the simulated system.
pub struct RunningStatus {
    /// Active pairs ordered by processor id.
    pairs: Vec<Pair>,
    total_power: f64,
    current_time: Tick,
}

impl Default for RunningStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStatus {
    pub fn new() -> Self {
        Self {
            pairs: Vec::new(),
            total_power: 0.,
            current_time: 0,
        }
    }

    pub fn time(&self) -> Tick {
        self.current_time
    }

    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn processors(&self) -> impl Iterator<Item = &Processor> {
        self.pairs.iter().map(|p| &p.processor)
    }

    pub fn snapshot(&self) -> Vec<PairView> {
        self.pairs.iter().map(PairView::from).collect()
    }

    /// Registers a new pair.
    pub fn add_pair(&mut self, pair: Pair) {
        let pos = match self.pairs.binary_search_by_key(&pair.processor.id, |p| p.processor.id) {
            Ok(_) => panic!(
                "Processor {} is assigned to {} while running another process at {}",
                pair.processor.id, pair.process.id, self.current_time
            ),
            Err(pos) => pos,
        };
        self.pairs.insert(pos, pair);
    }

    pub fn has_terminated_pair(&self) -> bool {
        self.pairs.iter().any(|p| p.is_terminated())
    }

    /// Removes pairs whose processes have no remaining workload.
    pub fn extract_terminated(&mut self) -> (Vec<Process>, Vec<Processor>) {
        self.extract_where(|p| p.is_terminated())
    }

    /// Returns true if some ready process has strictly smaller remaining workload than a running process
    /// it would displace.
    ///
    /// `free_processors` best ready processes are assumed to take free processors and are not compared.
    pub fn has_preemptible(&self, ready_queue: &ReadyQueue, free_processors: usize) -> bool {
        !self.preemption_victims(ready_queue, free_processors).is_empty()
    }

    /// Removes pairs displaced by ready processes with smaller remaining workload.
    ///
    /// Returned processes have their burst reset and are ready to re-enter the queue.
    pub fn extract_preempted(
        &mut self,
        ready_queue: &ReadyQueue,
        free_processors: usize,
    ) -> (Vec<Process>, Vec<Processor>) {
        let victims = self.preemption_victims(ready_queue, free_processors);
        let (mut processes, processors) = self.extract_where(|p| victims.contains(&p.processor.id));
        processes.iter_mut().for_each(Process::reset_burst);
        (processes, processors)
    }

    pub fn has_quantum_expired(&self, quantum: Tick) -> bool {
        self.pairs.iter().any(|p| p.is_quantum_expired(quantum))
    }

    /// Removes pairs whose processes have run for `quantum` ticks.
    ///
    /// Returned processes have their burst reset and are ready to re-enter the queue.
    pub fn extract_quantum_expired(&mut self, quantum: Tick) -> (Vec<Process>, Vec<Processor>) {
        let (mut processes, processors) = self.extract_where(|p| p.is_quantum_expired(quantum));
        processes.iter_mut().for_each(Process::reset_burst);
        (processes, processors)
    }

    /// Performs one tick of work on every running process.
    pub fn advance_workload(&mut self) {
        for pair in self.pairs.iter_mut() {
            pair.process.work();
        }
    }

    /// Accounts power drawn by running processors during the current tick and returns it.
    pub fn advance_power(&mut self) -> f64 {
        let power: f64 = self.pairs.iter_mut().map(|p| p.processor.consume()).sum();
        self.total_power += power;
        power
    }

    pub fn advance_tick(&mut self) {
        self.current_time += 1;
    }

    // Pairwise matching: the i-th best ready candidate (by remaining workload) is compared with
    // the i-th running process with the largest remaining workload.
    fn preemption_victims(&self, ready_queue: &ReadyQueue, free_processors: usize) -> Vec<ProcessorId> {
        let mut candidates: Vec<u64> = ready_queue
            .ordered()
            .iter()
            .map(|p| p.remaining_workload)
            .collect();
        candidates.sort();
        let mut running: Vec<&Pair> = self.pairs.iter().collect();
        running.sort_by_key(|p| {
            (
                Reverse(p.process.remaining_workload),
                Reverse(p.assigned_at),
                Reverse(p.processor.id),
            )
        });
        candidates
            .into_iter()
            .skip(free_processors)
            .zip(running)
            .take_while(|(ready, pair)| *ready < pair.process.remaining_workload)
            .map(|(_, pair)| pair.processor.id)
            .collect()
    }

    fn extract_where<F>(&mut self, predicate: F) -> (Vec<Process>, Vec<Processor>)
    where
        F: Fn(&Pair) -> bool,
    {
        let (extracted, kept): (Vec<Pair>, Vec<Pair>) =
            std::mem::take(&mut self.pairs).into_iter().partition(|p| predicate(p));
        self.pairs = kept;
        extracted.into_iter().map(Pair::into_parts).unzip()
    }
}
