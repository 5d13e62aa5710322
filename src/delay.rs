//! Module containing the message delay generators.

use crate::Time;
use rand::prelude::*;
use std::fmt::Debug;

/// Generator for the delay of each message sent in the simulation.
pub trait DelayGenerator: Debug {
    /// Delay of the next message.
    fn next_delay(&mut self) -> Time;
    /// Smallest delay that is ever generated
    fn min(&self) -> Time;
    /// Largest delay that is ever generated
    fn max(&self) -> Time;
    /// Seed currently in use
    fn seed(&self) -> u64;
    /// Pick a new seed, derived from the current one, and restart the sequence of delays.
    fn generate_new_seed(&mut self);
    /// Restart the sequence of delays with the current seed.
    fn reset(&mut self);
}

/// Generator for instantaneous messages
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroDelayGenerator;

impl DelayGenerator for ZeroDelayGenerator {
    fn next_delay(&mut self) -> Time {
        0
    }

    fn min(&self) -> Time {
        0
    }

    fn max(&self) -> Time {
        0
    }

    fn seed(&self) -> u64 {
        0
    }

    fn generate_new_seed(&mut self) {}

    fn reset(&mut self) {}
}

/// Generator drawing delays uniformly from `[min, max]` using a seeded random number generator.
#[derive(Debug, Clone)]
pub struct RandomDelayGenerator {
    min: Time,
    max: Time,
    seed: u64,
    rng: StdRng,
}

impl RandomDelayGenerator {
    /// Create a new generator. If `max < min`, the bounds are swapped.
    pub fn new(min: Time, max: Time, seed: u64) -> Self {
        let (min, max) = if max < min { (max, min) } else { (min, max) };
        Self {
            min,
            max,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a new generator with a seed drawn from the operating system.
    pub fn with_random_seed(min: Time, max: Time) -> Self {
        Self::new(min, max, thread_rng().gen())
    }
}

impl DelayGenerator for RandomDelayGenerator {
    fn next_delay(&mut self) -> Time {
        self.rng.gen_range(self.min..=self.max)
    }

    fn min(&self) -> Time {
        self.min
    }

    fn max(&self) -> Time {
        self.max
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn generate_new_seed(&mut self) {
        self.seed = StdRng::seed_from_u64(self.seed).gen();
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}
