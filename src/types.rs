//! Module containing all type definitions

use thiserror::Error;

/// Node Identification. Unique within a topology and totally ordered.
pub type NodeId = u32;
/// Simulated time
pub type Time = u64;

/// Topology Errors
#[derive(Error, Debug, PartialEq)]
pub enum TopologyError {
    /// Node is not present in the topology
    #[error("Node was not found in topology: {0}")]
    NodeNotFound(NodeId),
    /// A link between the two nodes already exists
    #[error("Link from {0} to {1} already exists!")]
    LinkAlreadyExists(NodeId, NodeId),
    /// There is no link between the two nodes
    #[error("No link from {0} to {1}")]
    LinkNotFound(NodeId, NodeId),
    /// A node cannot learn routes from itself
    #[error("Cannot create a link from node {0} to itself")]
    SelfLink(NodeId),
}

/// Simulation Errors
#[derive(Error, Debug, PartialEq)]
pub enum SimulationError {
    /// Topology error which cannot be handled
    #[error("Topology Error: {0}")]
    TopologyError(#[from] TopologyError),
    /// The destination is not part of the topology
    #[error("Destination {0} is not part of the topology")]
    DestinationNotFound(NodeId),
}
