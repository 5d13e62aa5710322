//! Module for defining events

use crate::bgp::BgpRoute;
use crate::NodeId;

/// Event to handle
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Route advertisement exported by `sender`, arriving at `recipient`.
    Message {
        /// node that exported the route
        sender: NodeId,
        /// node which learns the route
        recipient: NodeId,
        /// the exported route, before the extender of the link is applied
        route: BgpRoute,
    },
    /// The MRAI timer of the node expired.
    MraiExpired {
        /// node owning the timer
        node: NodeId,
    },
}

impl Event {
    /// Return the node where the event is processed
    pub fn node(&self) -> NodeId {
        match self {
            Event::Message { recipient, .. } => *recipient,
            Event::MraiExpired { node } => *node,
        }
    }
}
