use crate::bgp::ShortestPathExtender;
use crate::protocol::Protocol;
use crate::topology::{Topology, TopologyBuilder};
use crate::NodeId;

mod test_protocol;
mod test_scheduler;

/// Build a topology with shortest-path links `(tail, head, cost)`, deploying `protocol` on every
/// node.
pub(crate) fn shortest_path_topology(
    protocol: &Protocol,
    links: &[(NodeId, NodeId, i32)],
) -> Topology {
    let mut builder = TopologyBuilder::new();
    for (tail, head, _) in links {
        builder.add_node(*tail, protocol.clone());
        builder.add_node(*head, protocol.clone());
    }
    for (tail, head, cost) in links {
        builder
            .add_link(*tail, *head, ShortestPathExtender::new(*cost))
            .unwrap();
    }
    builder.build()
}

pub(crate) const SINGLE_LINK: [(NodeId, NodeId, i32); 1] = [(2, 1, 10)];

pub(crate) const RECURRENT_CYCLE: [(NodeId, NodeId, i32); 6] = [
    (1, 0, 0),
    (2, 0, 0),
    (3, 0, 0),
    (1, 2, 1),
    (2, 3, -1),
    (3, 1, 2),
];

pub(crate) const ABSORBENT_CYCLE: [(NodeId, NodeId, i32); 6] = [
    (1, 0, 0),
    (2, 0, 0),
    (3, 0, 0),
    (1, 2, -3),
    (2, 3, 1),
    (3, 1, 2),
];
