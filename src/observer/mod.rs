//! Viewport intersection capability.
//!
//! The engine never talks to a platform observer directly. It depends on the
//! [`ViewportObserver`] trait, which reports edge-triggered visibility
//! crossings for registered elements. Two implementations ship with the crate:
//!
//! - [`GeometryObserver`] computes visible fractions from element bounds and
//!   the current [`ViewportGeometry`].
//! - [`ManualObserver`] lets tests set visible fractions directly.
//!
//! Both share [`CrossingTracker`], which turns level samples ("this element is
//! 70% visible") into crossing events ("this element entered").

pub mod geometry;
pub mod manual;

pub use geometry::GeometryObserver;
pub use manual::ManualObserver;

use crate::model::identifiers::HandleAllocator;
use crate::model::{ElementId, RootMargin, Subscription, Threshold, ViewportGeometry};
use std::collections::BTreeMap;
use tracing::trace;

/// Direction of a threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityChange {
    /// Visible fraction rose to or above the threshold.
    Entered,
    /// Visible fraction fell below the threshold (or the element left the root).
    Exited,
}

/// One threshold crossing for one registered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEvent {
    /// Registration that produced the event.
    pub subscription: Subscription,
    /// Element the registration was made for.
    pub element: ElementId,
    /// Crossing direction.
    pub change: VisibilityChange,
}

/// Capability that reports visibility crossings for registered elements.
///
/// Implementations must be edge-triggered: an element that stays above its
/// threshold produces exactly one `Entered` event until it drops below again.
pub trait ViewportObserver {
    /// Start observing `element`.
    fn register(
        &mut self,
        element: ElementId,
        threshold: Threshold,
        root_margin: RootMargin,
    ) -> Subscription;

    /// Stop observing. Undelivered events for the subscription are discarded.
    ///
    /// Returns `false` if the subscription was unknown.
    fn unregister(&mut self, subscription: Subscription) -> bool;

    /// Notification that scroll position or viewport size changed.
    fn viewport_changed(&mut self, _geometry: &ViewportGeometry) {}

    /// Drain crossings recorded since the last call, in the order they happened.
    fn take_events(&mut self) -> Vec<VisibilityEvent>;
}

#[derive(Debug, Clone)]
struct Observed {
    element: ElementId,
    threshold: Threshold,
    root_margin: RootMargin,
    intersecting: bool,
}

/// Edge detector shared by the observer implementations.
#[derive(Debug, Clone, Default)]
pub struct CrossingTracker {
    handles: HandleAllocator,
    observed: BTreeMap<Subscription, Observed>,
    pending: Vec<VisibilityEvent>,
}

impl CrossingTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new element. It starts out not intersecting.
    pub fn register(
        &mut self,
        element: ElementId,
        threshold: Threshold,
        root_margin: RootMargin,
    ) -> Subscription {
        let subscription = self.handles.next();
        self.observed.insert(
            subscription,
            Observed {
                element,
                threshold,
                root_margin,
                intersecting: false,
            },
        );
        subscription
    }

    /// Forget a subscription and drop its undelivered events.
    pub fn unregister(&mut self, subscription: Subscription) -> bool {
        let removed = self.observed.remove(&subscription).is_some();
        if removed {
            self.pending.retain(|event| event.subscription != subscription);
        }
        removed
    }

    /// Record a new visibility sample. `None` means not intersecting at all.
    ///
    /// Emits an event only when the threshold state flips.
    pub fn sample(&mut self, subscription: Subscription, visible_fraction: Option<f64>) {
        let Some(observed) = self.observed.get_mut(&subscription) else {
            return;
        };
        let satisfied = observed.threshold.is_met_by(visible_fraction);
        if satisfied == observed.intersecting {
            return;
        }
        observed.intersecting = satisfied;
        let change = if satisfied {
            VisibilityChange::Entered
        } else {
            VisibilityChange::Exited
        };
        trace!(%subscription, element = %observed.element, ?change, "visibility crossing");
        self.pending.push(VisibilityEvent {
            subscription,
            element: observed.element,
            change,
        });
    }

    /// Whether the subscription is currently above its threshold.
    pub fn is_intersecting(&self, subscription: Subscription) -> bool {
        self.observed
            .get(&subscription)
            .is_some_and(|observed| observed.intersecting)
    }

    /// Root margin of a subscription.
    pub fn root_margin(&self, subscription: Subscription) -> Option<RootMargin> {
        self.observed.get(&subscription).map(|o| o.root_margin)
    }

    /// Latest subscription made for `element`.
    pub fn subscription_of(&self, element: ElementId) -> Option<Subscription> {
        self.observed
            .iter()
            .rev()
            .find(|(_, observed)| observed.element == element)
            .map(|(subscription, _)| *subscription)
    }

    /// All live subscriptions, in registration order.
    pub fn subscriptions(&self) -> impl Iterator<Item = Subscription> + '_ {
        self.observed.keys().copied()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// Whether nothing is being observed.
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<VisibilityEvent> {
        std::mem::take(&mut self.pending)
    }
}
