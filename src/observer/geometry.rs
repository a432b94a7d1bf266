//! Observer driven by element bounds and viewport geometry.

use super::{CrossingTracker, ViewportObserver, VisibilityEvent};
use crate::model::{ElementId, Rect, RootMargin, Subscription, Threshold, ViewportGeometry};
use std::collections::HashMap;

/// Computes visible fractions from element bounds on every viewport change.
///
/// Elements without bounds are treated as not intersecting. Setting bounds
/// re-evaluates the element against the last known viewport immediately.
#[derive(Debug, Clone)]
pub struct GeometryObserver {
    tracker: CrossingTracker,
    bounds: HashMap<Subscription, Rect>,
    viewport: ViewportGeometry,
}

impl GeometryObserver {
    /// Observer for the given initial viewport.
    pub fn new(viewport: ViewportGeometry) -> Self {
        Self {
            tracker: CrossingTracker::new(),
            bounds: HashMap::new(),
            viewport,
        }
    }

    /// Set the document-space bounds of a subscription.
    ///
    /// Returns `false` if the subscription is unknown.
    pub fn set_bounds(&mut self, subscription: Subscription, bounds: Rect) -> bool {
        let Some(margin) = self.tracker.root_margin(subscription) else {
            return false;
        };
        self.bounds.insert(subscription, bounds);
        let fraction = self.viewport.visible_fraction(&bounds, &margin);
        self.tracker.sample(subscription, fraction);
        true
    }

    /// Bounds last set for a subscription.
    pub fn bounds(&self, subscription: Subscription) -> Option<Rect> {
        self.bounds.get(&subscription).copied()
    }

    /// Last viewport seen.
    pub fn viewport(&self) -> ViewportGeometry {
        self.viewport
    }

    /// Whether a subscription is currently above its threshold.
    pub fn is_intersecting(&self, subscription: Subscription) -> bool {
        self.tracker.is_intersecting(subscription)
    }

    fn evaluate(&mut self) {
        let subscriptions: Vec<Subscription> = self.tracker.subscriptions().collect();
        for subscription in subscriptions {
            let fraction = match (
                self.bounds.get(&subscription),
                self.tracker.root_margin(subscription),
            ) {
                (Some(bounds), Some(margin)) => self.viewport.visible_fraction(bounds, &margin),
                _ => None,
            };
            self.tracker.sample(subscription, fraction);
        }
    }
}

impl Default for GeometryObserver {
    fn default() -> Self {
        Self::new(ViewportGeometry::default())
    }
}

impl ViewportObserver for GeometryObserver {
    fn register(
        &mut self,
        element: ElementId,
        threshold: Threshold,
        root_margin: RootMargin,
    ) -> Subscription {
        self.tracker.register(element, threshold, root_margin)
    }

    fn unregister(&mut self, subscription: Subscription) -> bool {
        self.bounds.remove(&subscription);
        self.tracker.unregister(subscription)
    }

    fn viewport_changed(&mut self, geometry: &ViewportGeometry) {
        self.viewport = *geometry;
        self.evaluate();
    }

    fn take_events(&mut self) -> Vec<VisibilityEvent> {
        self.tracker.take_events()
    }
}
