//! # SS-BGP Simulation
//!
//! Discrete-event simulator for BGP and its self-stabilizing variants SS-BGP and ISS-BGP. The
//! simulator is used to study how the protocols converge, and how they detect and break routing
//! loops, in topologies whose links carry arbitrary export policies.
//!
//! A [`topology::Topology`] is created with the [`topology::TopologyBuilder`]. Every node runs a
//! [`protocol::Protocol`], and every link applies an [`bgp::Extender`] to the routes sent over
//! it. The [`engine::Engine`] then simulates the propagation of the route towards a destination
//! until the network converges, or until a threshold is exceeded.
//!
//! ```
//! use ssbgpsim::bgp::{BgpRoute, ShortestPathExtender};
//! use ssbgpsim::engine::Engine;
//! use ssbgpsim::protocol::Protocol;
//! use ssbgpsim::topology::TopologyBuilder;
//!
//! let mut builder = TopologyBuilder::new();
//! builder.add_node(1, Protocol::ssbgp(0));
//! builder.add_node(2, Protocol::ssbgp(0));
//! builder.add_link(2, 1, ShortestPathExtender::new(10)).unwrap();
//! let mut topology = builder.build();
//!
//! let mut engine = Engine::new();
//! assert_eq!(engine.simulate(&mut topology, 1, 1000), Ok(true));
//! assert_eq!(
//!     topology.protocol(2).unwrap().selected_route(),
//!     &BgpRoute::with(10, vec![1])
//! );
//! ```

#![deny(missing_docs)]

pub mod bgp;
pub mod delay;
pub mod engine;
pub mod event;
pub mod notification;
pub mod protocol;
pub mod routing_table;
pub mod runner;
pub mod scheduler;
pub mod selector;
pub mod topology;
mod types;

pub use types::*;

#[cfg(test)]
mod test;
