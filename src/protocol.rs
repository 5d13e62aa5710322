//! Module defining the BGP protocol state machine running on every node.
//!
//! All protocol variants share the same processing of a message: the route is extended by the
//! policy of the link, checked for loops, admitted into the routing table, and the new selected
//! route is exported if it changed. The variants only differ in how they react to a routing loop,
//! which is captured by [`Detection`].

use crate::bgp::{BgpRoute, Extender};
use crate::notification::{DetectNotification, ExportNotification, Notification, Notifier};
use crate::routing_table::RoutingTable;
use crate::selector::RouteSelector;
use crate::{NodeId, Time};
use log::*;

/// How a node reacts to a routing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Plain BGP: the looping route is discarded.
    None,
    /// SS-BGP: the loop is recurrent if the looping route is preferred over the alternative.
    Weak,
    /// ISS-BGP: the weak condition holds, and the alternative route follows the same path as the
    /// looping route up to this node.
    Strong,
}

impl Detection {
    /// Check if the routing loop detected at `node` is recurrent.
    pub fn is_recurrent(
        &self,
        node: NodeId,
        learned_route: &BgpRoute,
        alternative_route: &BgpRoute,
    ) -> bool {
        match self {
            Detection::None => false,
            Detection::Weak => learned_route.local_pref > alternative_route.local_pref,
            Detection::Strong => {
                learned_route.local_pref > alternative_route.local_pref
                    && alternative_route.as_path == learned_route.as_path.sub_path_before(node)
            }
        }
    }

    /// Name of the protocol using this detection
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Detection::None => "BGP",
            Detection::Weak => "SS-BGP",
            Detection::Strong => "ISS-BGP",
        }
    }
}

/// Interface between a protocol and the engine while handling a single event.
#[derive(Debug)]
pub struct Context<'a> {
    now: Time,
    notifier: &'a mut Notifier,
    exported: Option<BgpRoute>,
    timer: Option<Time>,
}

impl<'a> Context<'a> {
    /// Create a new context at time `now`.
    pub fn new(now: Time, notifier: &'a mut Notifier) -> Self {
        Self {
            now,
            notifier,
            exported: None,
            timer: None,
        }
    }

    /// Current simulated time
    pub fn now(&self) -> Time {
        self.now
    }

    /// Route that must be sent to all in-neighbors
    pub fn exported(&self) -> Option<&BgpRoute> {
        self.exported.as_ref()
    }

    /// Delay after which the MRAI timer expires, if it was started.
    pub fn timer(&self) -> Option<Time> {
        self.timer
    }

    /// Consume the context, returning the exported route and the timer delay.
    pub fn finish(self) -> (Option<BgpRoute>, Option<Time>) {
        (self.exported, self.timer)
    }

    fn notify(&mut self, notification: Notification) {
        self.notifier.notify(notification)
    }
}

/// BGP protocol of a single node.
#[derive(Debug, Clone)]
pub struct Protocol {
    detection: Detection,
    mrai: Time,
    selector: RouteSelector<BgpRoute>,
    /// time at which a running MRAI timer expires
    mrai_expiry: Option<Time>,
    last_exported: BgpRoute,
    /// set if the selection changed since the last export attempt
    selection_updated: bool,
}

impl Protocol {
    /// Create a new protocol instance without any configured neighbor.
    pub fn new(detection: Detection, mrai: Time) -> Self {
        Self {
            detection,
            mrai,
            selector: RouteSelector::wrap(
                RoutingTable::empty(BgpRoute::invalid()),
                BgpRoute::preference_cmp,
            ),
            mrai_expiry: None,
            last_exported: BgpRoute::invalid(),
            selection_updated: false,
        }
    }

    /// Plain BGP
    pub fn bgp(mrai: Time) -> Self {
        Self::new(Detection::None, mrai)
    }

    /// SS-BGP, using the weak detection condition
    pub fn ssbgp(mrai: Time) -> Self {
        Self::new(Detection::Weak, mrai)
    }

    /// ISS-BGP, using the strong detection condition
    pub fn issbgp(mrai: Time) -> Self {
        Self::new(Detection::Strong, mrai)
    }

    /// Loop detection of the protocol
    pub fn detection(&self) -> Detection {
        self.detection
    }

    /// Minimum route advertisement interval
    pub fn mrai(&self) -> Time {
        self.mrai
    }

    /// Currently selected route
    pub fn selected_route(&self) -> &BgpRoute {
        self.selector.selected_route()
    }

    /// Neighbor of the currently selected route. For the destination, this is the node itself.
    pub fn selected_neighbor(&self) -> Option<NodeId> {
        self.selector.selected_neighbor()
    }

    /// Returns true if the neighbor is enabled
    pub fn is_enabled(&self, neighbor: NodeId) -> bool {
        self.selector.table().is_enabled(neighbor)
    }

    /// Read-only access to the routing table
    pub fn table(&self) -> &RoutingTable<BgpRoute> {
        self.selector.table()
    }

    /// Route exported last (the invalid route if nothing was exported yet)
    pub fn last_exported(&self) -> &BgpRoute {
        &self.last_exported
    }

    /// Returns true if the MRAI timer is running at time `now`.
    pub fn is_mrai_running(&self, now: Time) -> bool {
        self.mrai_expiry.map(|t| t > now).unwrap_or(false)
    }

    pub(crate) fn add_neighbor(&mut self, neighbor: NodeId) -> bool {
        self.selector.add_neighbor(neighbor)
    }

    /// Start the protocol on the destination: select the self route and export it.
    pub fn start(&mut self, node: NodeId, ctx: &mut Context<'_>) {
        let updated = self.selector.update(node, BgpRoute::self_route());
        self.selection_updated = self.selection_updated || updated;
        self.export_if_updated(node, ctx);
    }

    /// Process the `route` exported by `sender`. The `extender` is the policy of the link over
    /// which the route was received.
    pub fn on_receive(
        &mut self,
        node: NodeId,
        sender: NodeId,
        route: &BgpRoute,
        extender: &dyn Extender,
        ctx: &mut Context<'_>,
    ) {
        let imported = extender.extend(route, sender);
        let learned = self.learn(node, sender, imported, ctx);
        self.admit(node, sender, learned, ctx);
    }

    /// Write the learned route into the table, and export the selected route if it changed. The
    /// route must not contain `node`.
    pub(crate) fn admit(
        &mut self,
        node: NodeId,
        sender: NodeId,
        route: BgpRoute,
        ctx: &mut Context<'_>,
    ) {
        debug_assert!(
            !route.as_path.contains(node),
            "node {} admits a route containing itself: {}",
            node,
            route
        );

        let updated = self.selector.update(sender, route);
        self.selection_updated = self.selection_updated || updated;
        self.export_if_updated(node, ctx);
    }

    /// Handle the expiry of the MRAI timer. Any change of the selection that happened while the
    /// timer was running is exported now.
    pub fn on_mrai_expired(&mut self, node: NodeId, ctx: &mut Context<'_>) {
        match self.mrai_expiry {
            Some(t) if t <= ctx.now() => self.mrai_expiry = None,
            // stale timer of a previous run
            _ => return,
        }
        self.export(node, ctx);
    }

    /// Enable a neighbor. A change of the selection is exported with the next processed event.
    pub fn enable_neighbor(&mut self, neighbor: NodeId) -> bool {
        let updated = self.selector.enable(neighbor);
        self.selection_updated = self.selection_updated || updated;
        updated
    }

    /// Disable a neighbor. A change of the selection is exported with the next processed event.
    pub fn disable_neighbor(&mut self, neighbor: NodeId) -> bool {
        let updated = self.selector.disable(neighbor);
        self.selection_updated = self.selection_updated || updated;
        updated
    }

    /// Restore the state of a fresh protocol, keeping the configured neighbors.
    pub fn reset(&mut self) {
        self.selector.reset();
        self.mrai_expiry = None;
        self.last_exported = BgpRoute::invalid();
        self.selection_updated = false;
    }

    // -----------------
    // Private Functions
    // -----------------

    /// Returns the route to admit into the table. Routes containing the node itself are replaced
    /// by the invalid route.
    fn learn(
        &mut self,
        node: NodeId,
        sender: NodeId,
        route: BgpRoute,
        ctx: &mut Context<'_>,
    ) -> BgpRoute {
        if route.as_path.contains(node) {
            debug!("node {} detected a loop in {} from {}", node, route, sender);
            self.on_loop_detected(node, sender, &route, ctx);
            BgpRoute::invalid()
        } else {
            route
        }
    }

    fn on_loop_detected(
        &mut self,
        node: NodeId,
        sender: NodeId,
        route: &BgpRoute,
        ctx: &mut Context<'_>,
    ) {
        if self.detection == Detection::None {
            return;
        }

        // routes from disabled neighbors are never selected anyways
        if !self.is_enabled(sender) {
            return;
        }

        // invalidate the route via the sender, such that the alternative route gets selected.
        let updated = self.selector.update(sender, BgpRoute::invalid());
        self.selection_updated = self.selection_updated || updated;

        let alternative_route = self.selector.selected_route().clone();
        if self.detection.is_recurrent(node, route, &alternative_route) {
            info!(
                "{}: node {} disables {} (alternative: {})",
                self.detection.protocol_name(),
                node,
                sender,
                alternative_route
            );
            self.disable_neighbor(sender);
            ctx.notify(Notification::Detect(DetectNotification {
                node,
                route: route.clone(),
                alternative_route,
                disabled_neighbor: sender,
            }));
        }
    }

    fn export_if_updated(&mut self, node: NodeId, ctx: &mut Context<'_>) {
        if self.selection_updated {
            self.export(node, ctx);
            self.selection_updated = false;
        }
    }

    /// Export the selected route, unless the MRAI timer is running or the route was exported
    /// already.
    fn export(&mut self, node: NodeId, ctx: &mut Context<'_>) {
        if self.is_mrai_running(ctx.now()) {
            return;
        }

        let selected = self.selector.selected_route().clone();
        if selected == self.last_exported {
            return;
        }

        self.last_exported = selected.clone();
        ctx.exported = Some(selected.clone());
        ctx.notify(Notification::Export(ExportNotification {
            node,
            route: selected,
        }));

        if self.mrai > 0 {
            self.mrai_expiry = Some(ctx.now() + self.mrai);
            ctx.timer = Some(self.mrai);
        }
    }
}
