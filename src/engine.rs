//! Module containing the simulation engine.
//!
//! The engine is the context of a simulation: it owns the scheduler, the message delay generator
//! and the notifier. The same engine can be reused for many simulations, as long as
//! [`Engine::reset`] is called (and the topology is reset) between them.

use crate::bgp::BgpRoute;
use crate::delay::{DelayGenerator, ZeroDelayGenerator};
use crate::event::Event;
use crate::notification::{Notification, Notifier};
use crate::protocol::Context;
use crate::scheduler::Scheduler;
use crate::topology::Topology;
use crate::{NodeId, SimulationError, Time, TopologyError};
use log::*;

static DEFAULT_STOP_AFTER: usize = 10_000;

/// Configuration of the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Stop the simulation after this many events were processed. If set to `None`, the
    /// simulation only stops on the time threshold.
    pub max_events: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_events: Some(DEFAULT_STOP_AFTER),
        }
    }
}

/// Simulation engine
#[derive(Debug)]
pub struct Engine {
    scheduler: Scheduler,
    delay_generator: Box<dyn DelayGenerator>,
    notifier: Notifier,
    config: SimulationConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with instantaneous messages and the default configuration.
    pub fn new() -> Self {
        Self {
            scheduler: Scheduler::new(),
            delay_generator: Box::new(ZeroDelayGenerator),
            notifier: Notifier::new(),
            config: SimulationConfig::default(),
        }
    }

    /// Create an engine using the given delay generator.
    pub fn with_delay_generator(delay_generator: impl DelayGenerator + 'static) -> Self {
        let mut engine = Self::new();
        engine.set_delay_generator(delay_generator);
        engine
    }

    /// Replace the message delay generator
    pub fn set_delay_generator(&mut self, delay_generator: impl DelayGenerator + 'static) {
        self.delay_generator = Box::new(delay_generator);
    }

    /// Get the message delay generator
    pub fn delay_generator(&self) -> &dyn DelayGenerator {
        self.delay_generator.as_ref()
    }

    /// Get the message delay generator mutably, e.g., to pick a new seed.
    pub fn delay_generator_mut(&mut self) -> &mut dyn DelayGenerator {
        self.delay_generator.as_mut()
    }

    /// Get the engine configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replace the engine configuration
    pub fn set_config(&mut self, config: SimulationConfig) {
        self.config = config;
    }

    /// Get the notifier to subscribe or unsubscribe listeners
    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Get the scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Current simulated time
    pub fn now(&self) -> Time {
        self.scheduler.now()
    }

    /// Prepare the engine for the next simulation: drop all pending events, move the clock back
    /// to 0 and restart the delay generator with its current seed.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.delay_generator.reset();
    }

    /// Reset the engine, and replace the delay generator and the configuration with the defaults.
    /// Subscribed listeners are kept.
    pub fn reset_to_defaults(&mut self) {
        self.reset();
        self.delay_generator = Box::new(ZeroDelayGenerator);
        self.config = SimulationConfig::default();
    }

    /// Simulate the topology until the queue is empty.
    ///
    /// The destination starts by exporting its self route. The function returns `Ok(true)` if the
    /// simulation terminated before any event after `threshold` must be processed (and before the
    /// configured maximum number of events), and `Ok(false)` otherwise.
    pub fn simulate(
        &mut self,
        topology: &mut Topology,
        destination: NodeId,
        threshold: Time,
    ) -> Result<bool, SimulationError> {
        if !topology.contains(destination) {
            return Err(SimulationError::DestinationNotFound(destination));
        }
        if self.scheduler.has_events() {
            warn!(
                "Simulation starts with {} pending events. Was the engine reset?",
                self.scheduler.len()
            );
        }

        info!(
            "Start simulation towards {} (threshold: {}, seed: {})",
            destination,
            threshold,
            self.delay_generator.seed()
        );
        self.notifier.notify(Notification::Start { destination });

        let mut ctx = Context::new(self.scheduler.now(), &mut self.notifier);
        topology
            .node_mut(destination)?
            .protocol
            .start(destination, &mut ctx);
        let (exported, timer) = ctx.finish();
        self.apply(topology, destination, exported, timer)?;

        let mut processed: usize = 0;
        let mut terminated = true;
        while let Some(time) = self.scheduler.peek_time() {
            let exceeded = time > threshold
                || self
                    .config
                    .max_events
                    .map(|max| processed >= max)
                    .unwrap_or(false);
            if exceeded {
                warn!(
                    "Threshold exceeded at time {} after {} events",
                    self.scheduler.now(),
                    processed
                );
                self.notifier.notify(Notification::ThresholdReached {
                    time: self.scheduler.now(),
                });
                terminated = false;
                break;
            }

            // the queue is not empty, since we were able to peek
            if let Some((time, event)) = self.scheduler.pop() {
                processed += 1;
                self.handle_event(topology, time, event)?;
            }
        }

        info!(
            "Simulation {} at time {} after {} events",
            if terminated { "terminated" } else { "stopped" },
            self.scheduler.now(),
            processed
        );
        self.notifier.notify(Notification::End {
            time: self.scheduler.now(),
            terminated,
        });
        Ok(terminated)
    }

    // -----------------
    // Private Functions
    // -----------------

    fn handle_event(
        &mut self,
        topology: &mut Topology,
        time: Time,
        event: Event,
    ) -> Result<(), TopologyError> {
        match event {
            Event::Message {
                sender,
                recipient,
                route,
            } => {
                debug!("t={}: {} => {}: {}", time, sender, recipient, route);
                self.notifier.notify(Notification::MessageReceived {
                    sender,
                    recipient,
                    route: route.clone(),
                    time,
                });
                let mut ctx = Context::new(time, &mut self.notifier);
                topology.deliver(sender, recipient, &route, &mut ctx)?;
                let (exported, timer) = ctx.finish();
                self.apply(topology, recipient, exported, timer)
            }
            Event::MraiExpired { node } => {
                debug!("t={}: MRAI timer of {} expired", time, node);
                let mut ctx = Context::new(time, &mut self.notifier);
                topology
                    .node_mut(node)?
                    .protocol
                    .on_mrai_expired(node, &mut ctx);
                let (exported, timer) = ctx.finish();
                self.apply(topology, node, exported, timer)
            }
        }
    }

    /// Send the exported route to all in-neighbors and start the MRAI timer.
    fn apply(
        &mut self,
        topology: &mut Topology,
        node: NodeId,
        exported: Option<BgpRoute>,
        timer: Option<Time>,
    ) -> Result<(), TopologyError> {
        if let Some(route) = exported {
            self.transmit(topology, node, route)?;
        }
        if let Some(delay) = timer {
            self.scheduler.schedule(Event::MraiExpired { node }, delay);
        }
        Ok(())
    }

    /// Put the route on every link towards the in-neighbors of `sender`. Messages on the same link
    /// are delivered in the order in which they are sent, and each one takes at least one time
    /// unit. Links with their own delay generator don't draw from the engine's one.
    fn transmit(
        &mut self,
        topology: &mut Topology,
        sender: NodeId,
        route: BgpRoute,
    ) -> Result<(), TopologyError> {
        let now = self.scheduler.now();
        for recipient in topology.in_neighbors(sender) {
            let link = topology
                .link_mut(recipient, sender)
                .ok_or(TopologyError::LinkNotFound(recipient, sender))?;
            let delay = match link.delay_generator.as_mut() {
                Some(generator) => generator.next_delay(),
                None => self.delay_generator.next_delay(),
            };
            let delivery_time = (now + delay).max(link.last_delivery) + 1;
            link.last_delivery = delivery_time;

            self.scheduler.schedule_at(
                Event::Message {
                    sender,
                    recipient,
                    route: route.clone(),
                },
                delivery_time,
            );
            self.notifier.notify(Notification::MessageSent {
                sender,
                recipient,
                route: route.clone(),
                delivery_time,
            });
        }
        Ok(())
    }
}
