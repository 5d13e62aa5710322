//! Module containing the topology, i.e., all nodes and the links between them.
//!
//! A link `tail -> head` means that `tail` learns routes from `head`. Hence, `head` is an
//! out-neighbor of `tail` (and has an entry in its routing table), and `tail` is an in-neighbor
//! of `head` (and receives the routes it exports).

use crate::bgp::{BgpRoute, Extender};
use crate::delay::DelayGenerator;
use crate::protocol::{Context, Protocol};
use crate::{NodeId, Time, TopologyError};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::BTreeMap;

/// Directed link with its export policy, and optionally its own message delays.
#[derive(Debug)]
pub struct Link {
    extender: Box<dyn Extender>,
    pub(crate) delay_generator: Option<Box<dyn DelayGenerator>>,
    /// time at which the last message on this link is delivered
    pub(crate) last_delivery: Time,
}

impl Link {
    /// Export policy of the link
    pub fn extender(&self) -> &dyn Extender {
        self.extender.as_ref()
    }

    /// Delay generator of the link. If `None`, the delays are drawn from the engine.
    pub fn delay_generator(&self) -> Option<&dyn DelayGenerator> {
        self.delay_generator.as_deref()
    }

    fn reset(&mut self) {
        self.last_delivery = 0;
        if let Some(generator) = self.delay_generator.as_mut() {
            generator.reset();
        }
    }
}

/// Node in the topology
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    /// protocol deployed on the node
    pub protocol: Protocol,
}

impl Node {
    /// Return the ID of the node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Restore the state of the protocol
    pub fn reset(&mut self) {
        self.protocol.reset()
    }
}

/// Builder for a [`Topology`].
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    nodes: BTreeMap<NodeId, Protocol>,
    graph: DiGraphMap<NodeId, Link>,
}

impl TopologyBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with the given protocol. Returns false if a node with this id was already
    /// added, in which case the existing node is kept.
    pub fn add_node(&mut self, id: NodeId, protocol: Protocol) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, protocol);
        self.graph.add_node(id);
        true
    }

    /// Add a link from `tail` to `head`, such that `tail` learns the routes exported by `head`
    /// through `extender`. Both nodes must be added before.
    pub fn add_link(
        &mut self,
        tail: NodeId,
        head: NodeId,
        extender: impl Extender + 'static,
    ) -> Result<(), TopologyError> {
        self.insert_link(tail, head, Box::new(extender), None)
    }

    /// Add a link like [`TopologyBuilder::add_link`], whose messages are delayed by
    /// `delay_generator` instead of the generator of the engine.
    pub fn add_link_with_delay(
        &mut self,
        tail: NodeId,
        head: NodeId,
        extender: impl Extender + 'static,
        delay_generator: impl DelayGenerator + 'static,
    ) -> Result<(), TopologyError> {
        self.insert_link(
            tail,
            head,
            Box::new(extender),
            Some(Box::new(delay_generator)),
        )
    }

    fn insert_link(
        &mut self,
        tail: NodeId,
        head: NodeId,
        extender: Box<dyn Extender>,
        delay_generator: Option<Box<dyn DelayGenerator>>,
    ) -> Result<(), TopologyError> {
        if tail == head {
            return Err(TopologyError::SelfLink(tail));
        }
        for id in [tail, head] {
            if !self.nodes.contains_key(&id) {
                return Err(TopologyError::NodeNotFound(id));
            }
        }
        if self.graph.contains_edge(tail, head) {
            return Err(TopologyError::LinkAlreadyExists(tail, head));
        }
        self.graph.add_edge(
            tail,
            head,
            Link {
                extender,
                delay_generator,
                last_delivery: 0,
            },
        );
        Ok(())
    }

    /// Build the topology. Every node gets a routing table entry for itself and for each of its
    /// out-neighbors.
    pub fn build(self) -> Topology {
        let graph = self.graph;
        let nodes = self
            .nodes
            .into_iter()
            .map(|(id, mut protocol)| {
                protocol.add_neighbor(id);
                for head in graph.neighbors_directed(id, Outgoing) {
                    protocol.add_neighbor(head);
                }
                (id, Node { id, protocol })
            })
            .collect();
        Topology { nodes, graph }
    }
}

/// The topology, owning all nodes and links.
#[derive(Debug)]
pub struct Topology {
    nodes: BTreeMap<NodeId, Node>,
    graph: DiGraphMap<NodeId, Link>,
}

impl Topology {
    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the topology has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of links
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the node is part of the topology
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get a reference to a node
    pub fn node(&self, id: NodeId) -> Result<&Node, TopologyError> {
        self.nodes.get(&id).ok_or(TopologyError::NodeNotFound(id))
    }

    /// Get a mutable reference to a node
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TopologyError> {
        self.nodes
            .get_mut(&id)
            .ok_or(TopologyError::NodeNotFound(id))
    }

    /// Get the protocol deployed on a node
    pub fn protocol(&self, id: NodeId) -> Result<&Protocol, TopologyError> {
        self.node(id).map(|n| &n.protocol)
    }

    /// Iterate over all nodes, ordered by their ID.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the link from `tail` to `head`
    pub fn link(&self, tail: NodeId, head: NodeId) -> Option<&Link> {
        self.graph.edge_weight(tail, head)
    }

    /// Nodes receiving the routes exported by `id`, in the order in which the links were added.
    pub fn in_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.graph.neighbors_directed(id, Incoming).collect()
    }

    /// Nodes from which `id` learns routes, in the order in which the links were added.
    pub fn out_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.graph.neighbors_directed(id, Outgoing).collect()
    }

    /// Returns true if `tail` still accepts routes from `head`.
    pub fn is_link_enabled(&self, tail: NodeId, head: NodeId) -> Result<bool, TopologyError> {
        Ok(self.protocol(tail)?.is_enabled(head))
    }

    /// Bring every node and link back into the state right after building the topology.
    pub fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
        for (_, _, link) in self.graph.all_edges_mut() {
            link.reset();
        }
    }

    /// Let `recipient` process the route exported by `sender`.
    pub(crate) fn deliver(
        &mut self,
        sender: NodeId,
        recipient: NodeId,
        route: &BgpRoute,
        ctx: &mut Context<'_>,
    ) -> Result<(), TopologyError> {
        let link = self
            .graph
            .edge_weight(recipient, sender)
            .ok_or(TopologyError::LinkNotFound(recipient, sender))?;
        let node = self
            .nodes
            .get_mut(&recipient)
            .ok_or(TopologyError::NodeNotFound(recipient))?;
        node.protocol
            .on_receive(recipient, sender, route, link.extender(), ctx);
        Ok(())
    }

    pub(crate) fn link_mut(&mut self, tail: NodeId, head: NodeId) -> Option<&mut Link> {
        self.graph.edge_weight_mut(tail, head)
    }
}
