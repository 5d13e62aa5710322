//! Module containing the notifications published during a simulation, and the registry of
//! listeners receiving them.
//!
//! Publishing is synchronous: every listener is called in the order in which it subscribed,
//! before the simulation continues with the next step.

use crate::bgp::BgpRoute;
use crate::{NodeId, Time};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Published when a node detects a recurrent routing loop and disables the neighbor that exported
/// the route.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectNotification {
    /// node detecting the loop
    pub node: NodeId,
    /// route that contained the loop
    pub route: BgpRoute,
    /// route selected without the looping route
    pub alternative_route: BgpRoute,
    /// neighbor that was disabled
    pub disabled_neighbor: NodeId,
}

/// Published once every time a node exports its selected route to its in-neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportNotification {
    /// exporting node
    pub node: NodeId,
    /// exported route
    pub route: BgpRoute,
}

/// Notification to publish
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The simulation started towards the destination
    Start {
        /// destination node
        destination: NodeId,
    },
    /// The simulation ended
    End {
        /// time of the last processed event
        time: Time,
        /// false if the threshold was reached
        terminated: bool,
    },
    /// The simulation was stopped before the queue was empty
    ThresholdReached {
        /// time at which the simulation was stopped
        time: Time,
    },
    /// A message was put on a link
    MessageSent {
        /// sender of the route
        sender: NodeId,
        /// recipient of the route
        recipient: NodeId,
        /// the exported route
        route: BgpRoute,
        /// time at which the message will be delivered
        delivery_time: Time,
    },
    /// A message reached its recipient
    MessageReceived {
        /// sender of the route
        sender: NodeId,
        /// recipient of the route
        recipient: NodeId,
        /// the exported route
        route: BgpRoute,
        /// time of the delivery
        time: Time,
    },
    /// See [`DetectNotification`]
    Detect(DetectNotification),
    /// See [`ExportNotification`]
    Export(ExportNotification),
}

/// Type of a notification, used to subscribe to a subset of all notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// [`Notification::Start`]
    Start,
    /// [`Notification::End`]
    End,
    /// [`Notification::ThresholdReached`]
    ThresholdReached,
    /// [`Notification::MessageSent`]
    MessageSent,
    /// [`Notification::MessageReceived`]
    MessageReceived,
    /// [`Notification::Detect`]
    Detect,
    /// [`Notification::Export`]
    Export,
}

impl Notification {
    /// Get the kind of the notification
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Start { .. } => NotificationKind::Start,
            Notification::End { .. } => NotificationKind::End,
            Notification::ThresholdReached { .. } => NotificationKind::ThresholdReached,
            Notification::MessageSent { .. } => NotificationKind::MessageSent,
            Notification::MessageReceived { .. } => NotificationKind::MessageReceived,
            Notification::Detect(_) => NotificationKind::Detect,
            Notification::Export(_) => NotificationKind::Export,
        }
    }
}

/// Receiver of notifications
pub trait Listener {
    /// Called for every published notification the listener subscribed to.
    fn notify(&mut self, notification: &Notification);
}

impl<F> Listener for F
where
    F: FnMut(&Notification),
{
    fn notify(&mut self, notification: &Notification) {
        self(notification)
    }
}

/// Handle returned on subscription, used to unsubscribe again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

struct Subscription {
    id: ListenerId,
    kind: Option<NotificationKind>,
    listener: Box<dyn Listener>,
}

/// Registry of listeners.
#[derive(Default)]
pub struct Notifier {
    subscriptions: Vec<Subscription>,
    next_id: usize,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}

impl Notifier {
    /// Create a registry without any listener
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to all notifications
    pub fn subscribe(&mut self, listener: impl Listener + 'static) -> ListenerId {
        self.add(None, Box::new(listener))
    }

    /// Subscribe to notifications of a single kind
    pub fn subscribe_to(
        &mut self,
        kind: NotificationKind,
        listener: impl Listener + 'static,
    ) -> ListenerId {
        self.add(Some(kind), Box::new(listener))
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let len = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != len
    }

    /// Remove all listeners
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// Number of subscribed listeners
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Deliver the notification to all listeners subscribed to its kind.
    pub fn notify(&mut self, notification: Notification) {
        let kind = notification.kind();
        for subscription in self.subscriptions.iter_mut() {
            if subscription.kind.map(|k| k == kind).unwrap_or(true) {
                subscription.listener.notify(&notification);
            }
        }
    }

    fn add(&mut self, kind: Option<NotificationKind>, listener: Box<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, listener });
        id
    }
}

/// Listener storing every notification it receives. Clones share the same storage, so one clone
/// can be subscribed while the other one is used to read the notifications.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    notifications: Rc<RefCell<Vec<Notification>>>,
}

impl Collector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    /// All detect notifications received so far
    pub fn detections(&self) -> Vec<DetectNotification> {
        self.notifications
            .borrow()
            .iter()
            .filter_map(|n| match n {
                Notification::Detect(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    /// All export notifications received so far
    pub fn exports(&self) -> Vec<ExportNotification> {
        self.notifications
            .borrow()
            .iter()
            .filter_map(|n| match n {
                Notification::Export(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget all received notifications
    pub fn clear(&self) {
        self.notifications.borrow_mut().clear();
    }
}

impl Listener for Collector {
    fn notify(&mut self, notification: &Notification) {
        self.notifications.borrow_mut().push(notification.clone());
    }
}
