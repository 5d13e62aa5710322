//! Module for running the same simulation repeatedly.

use crate::delay::DelayGenerator;
use crate::engine::Engine;
use crate::notification::{Collector, Notification};
use crate::topology::Topology;
use crate::{NodeId, SimulationError, Time};
use log::*;

/// Outcome of a single repetition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// number of the repetition, starting at 1
    pub repetition: usize,
    /// seed of the delay generator used for this repetition
    pub seed: u64,
    /// false if the threshold was exceeded
    pub terminated: bool,
    /// time of the last processed event
    pub time: Time,
    /// number of messages that were sent
    pub messages: usize,
    /// number of exports
    pub exports: usize,
    /// number of recurrent loops detected
    pub detections: usize,
}

/// Runs a simulation towards the same destination a number of times. After every repetition, the
/// delay generator picks a new seed.
#[derive(Debug, Clone)]
pub struct RepetitionRunner {
    destination: NodeId,
    repetitions: usize,
    threshold: Time,
}

impl RepetitionRunner {
    /// Create a new runner
    pub fn new(destination: NodeId, repetitions: usize, threshold: Time) -> Self {
        Self {
            destination,
            repetitions,
            threshold,
        }
    }

    /// Run all repetitions using `delay_generator`. The topology and the engine are reset before
    /// every repetition, and the engine is always reverted to its defaults at the end.
    pub fn run(
        &self,
        engine: &mut Engine,
        topology: &mut Topology,
        delay_generator: impl DelayGenerator + 'static,
    ) -> Result<Vec<RunSummary>, SimulationError> {
        if !topology.contains(self.destination) {
            return Err(SimulationError::DestinationNotFound(self.destination));
        }

        engine.set_delay_generator(delay_generator);
        let collector = Collector::new();
        let listener = engine.notifier_mut().subscribe(collector.clone());

        let result: Result<Vec<RunSummary>, SimulationError> = (1..=self.repetitions)
            .map(|repetition| self.run_once(engine, topology, &collector, repetition))
            .collect();

        engine.notifier_mut().unsubscribe(listener);
        engine.reset_to_defaults();
        result
    }

    fn run_once(
        &self,
        engine: &mut Engine,
        topology: &mut Topology,
        collector: &Collector,
        repetition: usize,
    ) -> Result<RunSummary, SimulationError> {
        engine.reset();
        topology.reset();
        collector.clear();

        let seed = engine.delay_generator().seed();
        info!("Repetition {} of {} (seed: {})", repetition, self.repetitions, seed);
        let terminated = engine.simulate(topology, self.destination, self.threshold)?;

        let messages = collector
            .notifications()
            .iter()
            .filter(|n| matches!(n, Notification::MessageSent { .. }))
            .count();
        let summary = RunSummary {
            repetition,
            seed,
            terminated,
            time: engine.now(),
            messages,
            exports: collector.exports().len(),
            detections: collector.detections().len(),
        };

        engine.delay_generator_mut().generate_new_seed();
        Ok(summary)
    }
}
