//! Test harness for engine-level tests.
//!
//! Wraps `ScrollFx<ManualObserver>` so tests can say "this element is 40%
//! visible" and "half a second passes" instead of computing geometry.

use crate::engine::{EngineSettings, ScrollFx};
use crate::model::{
    BindingId, ChildId, ElementId, ParallaxOptions, RevealOptions, ViewportGeometry,
};
use crate::observer::ManualObserver;
use crate::store::{Directive, RevealTarget, Transform};
use std::time::Duration;

/// A reveal observed in the directive stream, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealAt {
    pub target: RevealTarget,
    pub at: f64,
}

/// Engine over a manual observer, plus a record of drained directives.
pub struct RevealHarness {
    fx: ScrollFx<ManualObserver>,
    next_child: u64,
    log: Vec<Directive>,
}

impl RevealHarness {
    /// Desktop-sized viewport, default settings.
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::with_viewport(settings, ViewportGeometry::new(1280.0, 800.0))
    }

    pub fn with_viewport(settings: EngineSettings, viewport: ViewportGeometry) -> Self {
        Self {
            fx: ScrollFx::new(ManualObserver::new(), settings, viewport),
            next_child: 1,
            log: Vec::new(),
        }
    }

    pub fn fx(&self) -> &ScrollFx<ManualObserver> {
        &self.fx
    }

    pub fn fx_mut(&mut self) -> &mut ScrollFx<ManualObserver> {
        &mut self.fx
    }

    /// Register with valid options; panics on rejection.
    pub fn register(&mut self, options: RevealOptions) -> ElementId {
        self.fx.register(&options).expect("options should be valid")
    }

    /// Register a staggered element with `count` fresh children.
    pub fn register_staggered(
        &mut self,
        options: RevealOptions,
        count: usize,
    ) -> (ElementId, Vec<ChildId>) {
        let element = self.register(options);
        let children = self.children(count);
        self.fx.set_children(element, children.clone());
        (element, children)
    }

    /// Allocate `count` child handles not used before in this harness.
    pub fn children(&mut self, count: usize) -> Vec<ChildId> {
        let start = self.next_child;
        self.next_child += count as u64;
        (start..self.next_child).map(ChildId::new).collect()
    }

    /// Report `fraction` visibility for `element` and deliver events.
    pub fn show(&mut self, element: ElementId, fraction: f64) {
        self.fx.observer_mut().set_visible_fraction(element, fraction);
        self.fx.pump();
    }

    /// Report `element` as fully outside the viewport and deliver events.
    pub fn hide(&mut self, element: ElementId) {
        self.fx.observer_mut().set_hidden(element);
        self.fx.pump();
    }

    /// Advance simulated time by `seconds`.
    pub fn advance(&mut self, seconds: f64) {
        self.fx.advance_by(Duration::from_secs_f64(seconds));
    }

    pub fn bind(&mut self, options: ParallaxOptions) -> BindingId {
        self.fx
            .bind_parallax(options)
            .expect("parallax options should be valid")
    }

    /// Scroll to `scroll_y`, keeping the current viewport size.
    pub fn scroll_to(&mut self, scroll_y: f64) {
        let viewport = self.fx.viewport();
        self.fx.on_scroll(viewport.scrolled_to(viewport.scroll_x, scroll_y));
    }

    pub fn frame(&mut self) -> usize {
        self.fx.on_animation_frame()
    }

    /// Drain the engine's directives into the harness log and return them.
    pub fn drain(&mut self) -> Vec<Directive> {
        let drained = self.fx.take_directives();
        self.log.extend(drained.iter().cloned());
        drained
    }

    /// Every reveal drained so far, in order.
    pub fn reveals(&mut self) -> Vec<RevealAt> {
        self.drain();
        self.log
            .iter()
            .filter_map(|directive| {
                directive.reveal_target().map(|target| RevealAt {
                    target,
                    at: directive.at().as_secs_f64(),
                })
            })
            .collect()
    }

    /// Every transform drained so far for `binding`, in order.
    pub fn transforms(&mut self, binding: BindingId) -> Vec<Transform> {
        self.drain();
        self.log
            .iter()
            .filter_map(|directive| match directive {
                Directive::Transform {
                    binding: b,
                    transform,
                    ..
                } if *b == binding => Some(*transform),
                _ => None,
            })
            .collect()
    }
}

/// Whether `a` and `b` agree to within a microsecond.
pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
