//! Processors not bound to any process.

use std::collections::BTreeMap;

use crate::processor::{Processor, ProcessorId};

/// Available processors ordered by id, so that assignment is deterministic.
#[derive(Default)]
pub struct ProcessorPool {
    available: BTreeMap<ProcessorId, Processor>,
}

impl ProcessorPool {
    pub fn new(processors: Vec<Processor>) -> Self {
        let mut pool = Self::default();
        pool.release(processors);
        pool
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn contains(&self, id: ProcessorId) -> bool {
        self.available.contains_key(&id)
    }

    /// Removes and returns the available processor with the lowest id.
    pub fn take_next(&mut self) -> Option<Processor> {
        self.available.pop_first().map(|(_, processor)| processor)
    }

    /// Returns processors to the pool, they will require a startup on the next assignment.
    pub fn release(&mut self, processors: Vec<Processor>) {
        for mut processor in processors {
            processor.reset();
            let id = processor.id;
            assert!(
                self.available.insert(id, processor).is_none(),
                "Processor {} is released while being available",
                id
            );
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Processor> {
        self.available.values()
    }
}
