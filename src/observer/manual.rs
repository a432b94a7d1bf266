//! Test double that synthesizes crossings from explicit visibility samples.

use super::{CrossingTracker, ViewportObserver, VisibilityEvent};
use crate::model::{ElementId, RootMargin, Subscription, Threshold};

/// Observer whose visible fractions are set by hand.
///
/// Useful for deterministic tests of anything built on [`ViewportObserver`]:
/// push a sequence of fractions for an element and the usual edge detection
/// turns them into `Entered`/`Exited` events.
#[derive(Debug, Clone, Default)]
pub struct ManualObserver {
    tracker: CrossingTracker,
}

impl ManualObserver {
    /// Empty observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that `element` is now `fraction` visible.
    ///
    /// Returns `false` when the element has no live subscription.
    pub fn set_visible_fraction(&mut self, element: ElementId, fraction: f64) -> bool {
        self.sample(element, Some(fraction))
    }

    /// Report that `element` no longer touches the viewport at all.
    pub fn set_hidden(&mut self, element: ElementId) -> bool {
        self.sample(element, None)
    }

    /// Live subscription count.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    fn sample(&mut self, element: ElementId, fraction: Option<f64>) -> bool {
        match self.tracker.subscription_of(element) {
            Some(subscription) => {
                self.tracker.sample(subscription, fraction);
                true
            }
            None => false,
        }
    }
}

impl ViewportObserver for ManualObserver {
    fn register(
        &mut self,
        element: ElementId,
        threshold: Threshold,
        root_margin: RootMargin,
    ) -> Subscription {
        self.tracker.register(element, threshold, root_margin)
    }

    fn unregister(&mut self, subscription: Subscription) -> bool {
        self.tracker.unregister(subscription)
    }

    fn take_events(&mut self) -> Vec<VisibilityEvent> {
        self.tracker.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_drive_crossings() {
        let mut observer = ManualObserver::new();
        let element = ElementId::new(1);
        observer.register(element, Threshold::new(0.5).unwrap(), RootMargin::ZERO);
        assert!(observer.set_visible_fraction(element, 0.7));
        assert!(observer.set_hidden(element));
        assert_eq!(observer.take_events().len(), 2);
    }

    #[test]
    fn unknown_element_reports_false() {
        let mut observer = ManualObserver::new();
        assert!(!observer.set_visible_fraction(ElementId::new(3), 1.0));
        assert!(observer.is_empty());
    }
}
