//! Module containing definitions for BGP

use crate::NodeId;
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;

/// AS-PATH of a route. The destination is first, and every node that exports the route is
/// appended at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<NodeId>);

impl Path {
    /// Create an empty path
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of nodes in the path
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path does not contain any node
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `node` is traversed by the path
    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    /// Returns a new path with `node` appended at the end.
    pub fn append(&self, node: NodeId) -> Self {
        let mut nodes = self.0.clone();
        nodes.push(node);
        Self(nodes)
    }

    /// Returns the sub-path with all nodes before the first occurrence of `node`. If `node` is not
    /// in the path, the whole path is returned.
    pub fn sub_path_before(&self, node: NodeId) -> Self {
        self.iter().take_while(|n| **n != node).copied().collect()
    }

    /// The node which was appended last, i.e., the neighbor a route was learned from.
    pub fn next_hop(&self) -> Option<NodeId> {
        self.0.last().copied()
    }

    /// Iterate over all nodes, starting at the destination
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.0.iter()
    }
}

impl From<Vec<NodeId>> for Path {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self(nodes)
    }
}

impl FromIterator<NodeId> for Path {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.iter().join(", "))
    }
}

/// Bgp Route
///
/// Only LOCAL-PREF and AS-PATH are modelled. Two distinguished values exist: the
/// [`BgpRoute::invalid`] route, which is worse than every other route, and the
/// [`BgpRoute::self_route`], which a node uses to reach itself and which is better than every
/// other route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BgpRoute {
    /// LOCAL-PREF (higher is better)
    pub local_pref: i32,
    /// AS-PATH
    pub as_path: Path,
}

impl BgpRoute {
    /// Create a new route
    pub fn with(local_pref: i32, as_path: impl Into<Path>) -> Self {
        Self {
            local_pref,
            as_path: as_path.into(),
        }
    }

    /// The invalid route
    pub fn invalid() -> Self {
        Self {
            local_pref: i32::MIN,
            as_path: Path::empty(),
        }
    }

    /// The route of a node to itself
    pub fn self_route() -> Self {
        Self {
            local_pref: i32::MAX,
            as_path: Path::empty(),
        }
    }

    /// Returns false only for the invalid route
    pub fn is_valid(&self) -> bool {
        *self != Self::invalid()
    }

    /// Returns true if this is the self route
    pub fn is_self(&self) -> bool {
        *self == Self::self_route()
    }

    /// Compare two routes by preference. `Ordering::Greater` means that `self` is preferred.
    /// Higher LOCAL-PREF wins, then the shorter AS-PATH.
    ///
    /// This is not the `Ord` implementation, since two different routes may be equally preferred.
    pub fn preference_cmp(&self, other: &Self) -> Ordering {
        match self.local_pref.cmp(&other.local_pref) {
            Ordering::Equal => other.as_path.len().cmp(&self.as_path.len()),
            o => o,
        }
    }
}

impl fmt::Display for BgpRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_self() {
            write!(f, "BgpRoute(self)")
        } else if !self.is_valid() {
            write!(f, "BgpRoute(invalid)")
        } else {
            write!(
                f,
                "BgpRoute(local_pref: {}, as_path: {})",
                self.local_pref, self.as_path
            )
        }
    }
}

/// Export policy of a link. The extender transforms the route exported by `sender` before the
/// receiving node learns it.
pub trait Extender: fmt::Debug {
    /// Transform the route exported by `sender`.
    fn extend(&self, route: &BgpRoute, sender: NodeId) -> BgpRoute;
}

/// Extender which keeps the LOCAL-PREF of the exported route and only appends the sender to the
/// AS-PATH.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtender;

impl Extender for NoopExtender {
    fn extend(&self, route: &BgpRoute, sender: NodeId) -> BgpRoute {
        if !route.is_valid() {
            BgpRoute::invalid()
        } else if route.is_self() {
            BgpRoute::with(0, vec![sender])
        } else {
            BgpRoute::with(route.local_pref, route.as_path.append(sender))
        }
    }
}

/// Shortest-path routing policy: the cost of the link is added to the LOCAL-PREF.
#[derive(Debug, Clone, Copy)]
pub struct ShortestPathExtender {
    /// cost of the link
    pub cost: i32,
}

impl ShortestPathExtender {
    /// Create a new extender with the given link cost
    pub fn new(cost: i32) -> Self {
        Self { cost }
    }
}

impl Extender for ShortestPathExtender {
    fn extend(&self, route: &BgpRoute, sender: NodeId) -> BgpRoute {
        if !route.is_valid() {
            BgpRoute::invalid()
        } else if route.is_self() {
            BgpRoute::with(self.cost, vec![sender])
        } else {
            BgpRoute::with(
                route.local_pref.saturating_add(self.cost),
                route.as_path.append(sender),
            )
        }
    }
}
