//! Engine façade wiring observer, reveal scheduler, state store and parallax.
//!
//! [`ScrollFx`] is single-threaded and cooperative. The host calls it from its
//! UI loop:
//!
//! - [`ScrollFx::on_scroll`] / [`ScrollFx::on_resize`] on every scroll or resize event
//! - [`ScrollFx::on_animation_frame`] before each paint
//! - [`ScrollFx::advance_to`] as its clock moves, to run due reveal timers
//!
//! and then reads [`ScrollFx::take_directives`] or polls the read model. No
//! call blocks, and nothing here needs a lock: every mutation goes through
//! `&mut self`.

use crate::model::identifiers::HandleAllocator;
use crate::model::{
    BindingId, ChildId, ConfigurationError, ElementId, ParallaxOptions, Rect, RevealOptions,
    ViewportGeometry,
};
use crate::observer::{GeometryObserver, ViewportObserver, VisibilityChange};
use crate::parallax::{ParallaxDriver, DEFAULT_MOBILE_BREAKPOINT};
use crate::reveal::RevealScheduler;
use crate::store::{AnimationStateStore, Directive, RevealPhase, TimingVars, Transform};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Engine-wide behavior switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Reveal immediately on entry, ignoring delays and stagger offsets.
    pub reduced_motion: bool,
    /// Viewport width below which parallax bindings default to inert.
    pub mobile_breakpoint: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
        }
    }
}

/// Scroll-reveal and parallax engine over an injected viewport observer.
#[derive(Debug)]
pub struct ScrollFx<O> {
    observer: O,
    store: AnimationStateStore,
    reveals: RevealScheduler,
    parallax: ParallaxDriver,
    viewport: ViewportGeometry,
    settings: EngineSettings,
    handles: HandleAllocator,
    now: Duration,
}

impl<O: ViewportObserver> ScrollFx<O> {
    /// Engine at time zero over `observer`, starting from `viewport`.
    pub fn new(observer: O, settings: EngineSettings, viewport: ViewportGeometry) -> Self {
        Self {
            observer,
            store: AnimationStateStore::new(),
            reveals: RevealScheduler::new(),
            parallax: ParallaxDriver::new(settings.mobile_breakpoint),
            viewport,
            settings,
            handles: HandleAllocator::default(),
            now: Duration::ZERO,
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Last viewport reported by the host.
    pub fn viewport(&self) -> ViewportGeometry {
        self.viewport
    }

    /// Active settings.
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// The injected observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the injected observer (e.g. to feed a test double).
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Read model.
    pub fn store(&self) -> &AnimationStateStore {
        &self.store
    }

    // ===== Reveal registration =====

    /// Register an element for scroll reveal. Each call yields a fresh handle.
    ///
    /// # Errors
    ///
    /// Rejects invalid options with a [`ConfigurationError`] before anything
    /// is registered.
    pub fn register(&mut self, options: &RevealOptions) -> Result<ElementId, ConfigurationError> {
        let mut spec = options.validate()?;
        if self.settings.reduced_motion {
            spec = spec.without_delays();
        }
        let element: ElementId = self.handles.next();
        let subscription = self
            .observer
            .register(element, spec.threshold(), spec.root_margin());
        debug!(
            %element,
            %subscription,
            animation = %spec.animation(),
            staggered = spec.is_staggered(),
            "element registered"
        );
        self.store.insert(element, spec, subscription);
        Ok(element)
    }

    /// Set an element's direct children in document order.
    ///
    /// Only children present at the element's first entry take part in the
    /// stagger sequence. Returns `false` for unknown elements.
    pub fn set_children(
        &mut self,
        element: ElementId,
        children: impl IntoIterator<Item = ChildId>,
    ) -> bool {
        let updated = self.store.set_children(element, children.into_iter().collect());
        if !updated {
            debug!(%element, "set_children on unknown element ignored");
        }
        updated
    }

    /// Tear down an element: cancel its timers, drop its state and stop observing.
    ///
    /// Takes effect synchronously; no directive for the element or its
    /// children is emitted afterwards. Returns `false` for unknown elements.
    pub fn unregister(&mut self, element: ElementId) -> bool {
        let Some(subscription) = self.store.remove(element) else {
            debug!(%element, "unregister of unknown element ignored");
            return false;
        };
        let cancelled = self.reveals.cancel(element);
        self.observer.unregister(subscription);
        debug!(%element, cancelled, "element unregistered");
        true
    }

    // ===== Parallax =====

    /// Bind an element for parallax. The mobile check uses the current viewport.
    ///
    /// # Errors
    ///
    /// Rejects a non-finite speed.
    pub fn bind_parallax(&mut self, options: ParallaxOptions) -> Result<BindingId, ConfigurationError> {
        self.parallax.bind(options, &self.viewport)
    }

    /// Remove a parallax binding.
    pub fn unbind_parallax(&mut self, binding: BindingId) -> bool {
        self.parallax.unbind(binding)
    }

    // ===== Host events =====

    /// Scroll event.
    pub fn on_scroll(&mut self, viewport: ViewportGeometry) {
        self.viewport_changed(viewport);
    }

    /// Resize event. Parallax mobile checks are not re-evaluated.
    pub fn on_resize(&mut self, viewport: ViewportGeometry) {
        trace!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport_changed(viewport);
    }

    /// Animation frame: write pending parallax transforms.
    pub fn on_animation_frame(&mut self) -> usize {
        self.parallax.on_frame(self.now)
    }

    /// Whether a parallax binding is waiting for a frame.
    pub fn has_pending_frame(&self) -> bool {
        self.parallax.has_pending_frame()
    }

    /// Deliver observer events and run reveal timers due at the current time.
    pub fn pump(&mut self) {
        for event in self.observer.take_events() {
            if self.store.subscription(event.element) != Some(event.subscription) {
                warn!(element = %event.element, subscription = %event.subscription, "stale visibility event dropped");
                continue;
            }
            match event.change {
                VisibilityChange::Entered => {
                    let outcome = self.reveals.on_entered(&mut self.store, event.element, self.now);
                    trace!(element = %event.element, ?outcome, "entered");
                }
                VisibilityChange::Exited => {
                    trace!(element = %event.element, "exited");
                }
            }
        }
        self.reveals.fire_due(&mut self.store, self.now);
    }

    /// Move the clock forward to `time`, firing timers in deadline order.
    ///
    /// The clock visits each due deadline in turn, so directives carry the
    /// exact time their timer fired. Times in the past are ignored.
    pub fn advance_to(&mut self, time: Duration) {
        self.pump();
        while let Some(deadline) = self.reveals.next_deadline() {
            if deadline > time {
                break;
            }
            self.now = self.now.max(deadline);
            self.reveals.fire_due(&mut self.store, self.now);
        }
        self.now = self.now.max(time);
    }

    /// Move the clock forward by `delta`.
    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.now.saturating_add(delta));
    }

    /// Earliest pending reveal deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.reveals.next_deadline()
    }

    /// Pending reveal timers for an element (its own or its children's).
    pub fn pending_timers(&self, element: ElementId) -> usize {
        self.reveals.pending_for(element)
    }

    // ===== Read model =====

    /// Drain every queued directive, ordered by issue time.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        let mut directives = self.store.take_directives();
        directives.extend(self.parallax.take_directives());
        directives.sort_by_key(Directive::at);
        directives
    }

    /// Reveal phase of an element.
    pub fn phase(&self, element: ElementId) -> Option<RevealPhase> {
        self.store.phase(element)
    }

    /// Whether an element has revealed.
    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.store.is_revealed(element)
    }

    /// Presentation tags for an element.
    pub fn classes_for(&self, element: ElementId) -> BTreeSet<String> {
        self.store.classes_for(element)
    }

    /// Reveal phase of one child of a staggered element.
    pub fn child_phase(&self, element: ElementId, child: ChildId) -> Option<RevealPhase> {
        self.store.child_phase(element, child)
    }

    /// Presentation tags for one child of a staggered element.
    pub fn child_classes_for(&self, element: ElementId, child: ChildId) -> BTreeSet<String> {
        self.store.child_classes_for(element, child)
    }

    /// Timing parameters for an element.
    pub fn timing_vars(&self, element: ElementId) -> Option<TimingVars> {
        self.store.timing_vars(element)
    }

    /// Timing parameters for one child of a staggered element.
    pub fn child_timing_vars(&self, element: ElementId, child: ChildId) -> Option<TimingVars> {
        self.store.child_timing_vars(element, child)
    }

    /// Latest parallax transform for a binding.
    pub fn transform_for(&self, binding: BindingId) -> Option<Transform> {
        self.parallax.transform_for(binding)
    }

    /// Whether a binding was disabled by the mobile check.
    pub fn is_parallax_inert(&self, binding: BindingId) -> Option<bool> {
        self.parallax.is_inert(binding)
    }

    fn viewport_changed(&mut self, viewport: ViewportGeometry) {
        self.viewport = viewport;
        self.observer.viewport_changed(&viewport);
        self.parallax.on_scroll(&viewport);
        self.pump();
    }
}

impl ScrollFx<GeometryObserver> {
    /// Engine with a [`GeometryObserver`] for `viewport`.
    pub fn with_geometry(settings: EngineSettings, viewport: ViewportGeometry) -> Self {
        Self::new(GeometryObserver::new(viewport), settings, viewport)
    }

    /// Set an element's document-space bounds and re-check its visibility.
    pub fn set_bounds(&mut self, element: ElementId, bounds: Rect) -> bool {
        let Some(subscription) = self.store.subscription(element) else {
            return false;
        };
        let known = self.observer.set_bounds(subscription, bounds);
        self.pump();
        known
    }
}
