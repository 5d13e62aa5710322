//! Module defining the routing table of a single node.
//!
//! The routing table stores one candidate route for every configured out-neighbor, together with
//! a flag telling if the neighbor is enabled. It does not perform any route selection; see
//! [`crate::selector::RouteSelector`] for that.

use crate::NodeId;
use std::collections::BTreeMap;

/// Data stored for every neighbor
#[derive(Debug, Clone, PartialEq)]
pub struct EntryData<R> {
    /// candidate route via the neighbor
    pub route: R,
    /// disabled neighbors must never be selected
    pub enabled: bool,
}

/// Routing table, mapping each configured neighbor to its candidate route.
#[derive(Debug, Clone)]
pub struct RoutingTable<R> {
    invalid_route: R,
    routes: BTreeMap<NodeId, EntryData<R>>,
}

impl<R: Clone> RoutingTable<R> {
    /// Create a table without any configured neighbor.
    pub fn empty(invalid_route: R) -> Self {
        Self {
            invalid_route,
            routes: BTreeMap::new(),
        }
    }

    /// Create a table with the given neighbors configured. Every neighbor starts enabled with the
    /// invalid route.
    pub fn with_neighbors(invalid_route: R, neighbors: impl IntoIterator<Item = NodeId>) -> Self {
        let routes = neighbors
            .into_iter()
            .map(|n| {
                (
                    n,
                    EntryData {
                        route: invalid_route.clone(),
                        enabled: true,
                    },
                )
            })
            .collect();
        Self {
            invalid_route,
            routes,
        }
    }

    /// Configure a new neighbor. Returns false if the neighbor was already configured, in which
    /// case its entry is left untouched.
    pub fn add_neighbor(&mut self, neighbor: NodeId) -> bool {
        if self.routes.contains_key(&neighbor) {
            return false;
        }
        self.routes.insert(
            neighbor,
            EntryData {
                route: self.invalid_route.clone(),
                enabled: true,
            },
        );
        true
    }

    /// The route returned for neighbors without a candidate
    pub fn invalid_route(&self) -> &R {
        &self.invalid_route
    }

    /// Number of configured neighbors
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no neighbor is configured
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns true if the neighbor is configured
    pub fn contains(&self, neighbor: NodeId) -> bool {
        self.routes.contains_key(&neighbor)
    }

    /// Returns the candidate route via `neighbor`, or the invalid route if the neighbor is not
    /// configured.
    pub fn get(&self, neighbor: NodeId) -> &R {
        self.routes
            .get(&neighbor)
            .map(|e| &e.route)
            .unwrap_or(&self.invalid_route)
    }

    /// Set the candidate route via `neighbor`. If the neighbor is not configured, the table is
    /// not modified.
    pub fn set(&mut self, neighbor: NodeId, route: R) {
        if let Some(entry) = self.routes.get_mut(&neighbor) {
            entry.route = route;
        }
    }

    /// Set the enable flag of `neighbor` and return its candidate route. Returns the invalid
    /// route if the neighbor is not configured.
    pub fn set_enabled(&mut self, neighbor: NodeId, enabled: bool) -> R {
        match self.routes.get_mut(&neighbor) {
            Some(entry) => {
                entry.enabled = enabled;
                entry.route.clone()
            }
            None => self.invalid_route.clone(),
        }
    }

    /// Returns true if `neighbor` is enabled. Neighbors that are not configured are enabled.
    pub fn is_enabled(&self, neighbor: NodeId) -> bool {
        self.routes.get(&neighbor).map(|e| e.enabled).unwrap_or(true)
    }

    /// Remove all entries, including the configured neighbors.
    pub fn clear(&mut self) {
        self.routes.clear();
    }

    /// Restore every configured neighbor to the invalid route and enable it.
    pub fn reset(&mut self) {
        for entry in self.routes.values_mut() {
            entry.route = self.invalid_route.clone();
            entry.enabled = true;
        }
    }

    /// Iterate over all entries, ordered by neighbor.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &EntryData<R>)> {
        self.routes.iter().map(|(n, e)| (*n, e))
    }
}
