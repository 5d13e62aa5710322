//! Module containing the route selector, which keeps track of the best route in a routing table.

use crate::routing_table::RoutingTable;
use crate::NodeId;
use std::cmp::Ordering;

/// Function comparing two routes. `Ordering::Greater` means that the first route is preferred.
pub type RouteCompare<R> = fn(&R, &R) -> Ordering;

/// Route selector wrapping a [`RoutingTable`]. All writes to the table go through the selector,
/// such that the selected route is always up to date.
///
/// If two routes are equally preferred, the selector keeps the neighbor that is currently
/// selected. If a new selection must be made from scratch, the neighbor with the smallest id
/// wins.
#[derive(Debug, Clone)]
pub struct RouteSelector<R> {
    table: RoutingTable<R>,
    compare: RouteCompare<R>,
    selected_route: R,
    selected_neighbor: Option<NodeId>,
}

impl<R: Clone + PartialEq> RouteSelector<R> {
    /// Wrap the table. The initial selection is computed from the table content.
    pub fn wrap(table: RoutingTable<R>, compare: RouteCompare<R>) -> Self {
        let selected_route = table.invalid_route().clone();
        let mut selector = Self {
            table,
            compare,
            selected_route,
            selected_neighbor: None,
        };
        selector.reselect();
        selector
    }

    /// Get the currently selected route
    pub fn selected_route(&self) -> &R {
        &self.selected_route
    }

    /// Get the neighbor of the currently selected route
    pub fn selected_neighbor(&self) -> Option<NodeId> {
        self.selected_neighbor
    }

    /// Get a reference to the wrapped table
    pub fn table(&self) -> &RoutingTable<R> {
        &self.table
    }

    /// Configure a new neighbor in the wrapped table. The selection is not affected, since the
    /// new neighbor only knows the invalid route.
    pub fn add_neighbor(&mut self, neighbor: NodeId) -> bool {
        self.table.add_neighbor(neighbor)
    }

    /// Write the route into the table and update the selection. Returns true if the selected route
    /// or the selected neighbor changed.
    pub fn update(&mut self, neighbor: NodeId, route: R) -> bool {
        if !self.table.contains(neighbor) {
            return false;
        }
        self.table.set(neighbor, route.clone());

        if self.table.is_enabled(neighbor)
            && (self.compare)(&route, &self.selected_route) == Ordering::Greater
        {
            self.selected_route = route;
            self.selected_neighbor = Some(neighbor);
            true
        } else if self.selected_neighbor == Some(neighbor) && route != self.selected_route {
            self.reselect()
        } else {
            false
        }
    }

    /// Enable the neighbor. Returns true if the selection changed.
    pub fn enable(&mut self, neighbor: NodeId) -> bool {
        if !self.table.contains(neighbor) {
            return false;
        }
        let route = self.table.set_enabled(neighbor, true);
        if (self.compare)(&route, &self.selected_route) == Ordering::Greater {
            self.selected_route = route;
            self.selected_neighbor = Some(neighbor);
            true
        } else {
            false
        }
    }

    /// Disable the neighbor. Returns true if the selection changed.
    pub fn disable(&mut self, neighbor: NodeId) -> bool {
        self.table.set_enabled(neighbor, false);
        if self.selected_neighbor == Some(neighbor) {
            self.reselect()
        } else {
            false
        }
    }

    /// Recompute the selection from all enabled entries. Returns true if the selection changed.
    pub fn reselect(&mut self) -> bool {
        let invalid = self.table.invalid_route();
        let mut best_route = invalid.clone();
        let mut best_neighbor = None;

        // start with the previous choice, such that equally good routes do not replace it
        if let Some(previous) = self.selected_neighbor {
            let route = self.table.get(previous);
            if self.table.contains(previous)
                && self.table.is_enabled(previous)
                && (self.compare)(route, invalid) == Ordering::Greater
            {
                best_route = route.clone();
                best_neighbor = Some(previous);
            }
        }

        for (neighbor, entry) in self.table.iter() {
            if entry.enabled && (self.compare)(&entry.route, &best_route) == Ordering::Greater {
                best_route = entry.route.clone();
                best_neighbor = Some(neighbor);
            }
        }

        let changed = best_neighbor != self.selected_neighbor || best_route != self.selected_route;
        self.selected_route = best_route;
        self.selected_neighbor = best_neighbor;
        changed
    }

    /// Restore the table to its defaults and clear the selection.
    pub fn reset(&mut self) {
        self.table.reset();
        self.selected_route = self.table.invalid_route().clone();
        self.selected_neighbor = None;
    }
}
