//! Scroll-linked parallax transforms.
//!
//! Scroll and resize ticks only mark bindings dirty; the transform itself is
//! computed on the next animation frame. A burst of ticks between two frames
//! therefore costs one computation per binding, using the latest offset.

use crate::model::identifiers::HandleAllocator;
use crate::model::{BindingId, ConfigurationError, Direction, ParallaxOptions, ViewportGeometry};
use crate::store::{Directive, Transform};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Viewport width below which parallax is off unless a binding opts in.
pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 768.0;

/// Transform for a scroll offset: `rate = offset * -speed`, signed by direction.
pub fn compute_transform(scroll_offset: f64, speed: f64, direction: Direction) -> Transform {
    // `+ 0.0` folds -0.0 into 0.0 so a resting page renders "0px".
    let rate = scroll_offset * -speed + 0.0;
    match direction {
        Direction::Up => Transform::TranslateY(rate),
        Direction::Down => Transform::TranslateY(-rate + 0.0),
        Direction::Left => Transform::TranslateX(rate),
        Direction::Right => Transform::TranslateX(-rate + 0.0),
    }
}

#[derive(Debug, Clone)]
struct Binding {
    options: ParallaxOptions,
    inert: bool,
    frame_pending: bool,
    transform: Option<Transform>,
}

/// Tracks parallax bindings and writes their transforms once per frame.
#[derive(Debug, Clone)]
pub struct ParallaxDriver {
    handles: HandleAllocator,
    bindings: BTreeMap<BindingId, Binding>,
    scroll_offset: f64,
    mobile_breakpoint: f64,
    outbox: Vec<Directive>,
}

impl Default for ParallaxDriver {
    fn default() -> Self {
        Self::new(DEFAULT_MOBILE_BREAKPOINT)
    }
}

impl ParallaxDriver {
    /// Driver with the given mobile breakpoint in logical pixels.
    pub fn new(mobile_breakpoint: f64) -> Self {
        Self {
            handles: HandleAllocator::default(),
            bindings: BTreeMap::new(),
            scroll_offset: 0.0,
            mobile_breakpoint,
            outbox: Vec::new(),
        }
    }

    /// Bind a new element.
    ///
    /// The mobile check runs once, here, against `viewport`; later resizes do
    /// not revisit it. Active bindings get a frame requested immediately so
    /// their first transform reflects the current scroll position.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NonFiniteSpeed`] for a NaN or infinite speed.
    pub fn bind(
        &mut self,
        options: ParallaxOptions,
        viewport: &ViewportGeometry,
    ) -> Result<BindingId, ConfigurationError> {
        options.validate()?;
        let id: BindingId = self.handles.next();
        let inert = viewport.is_narrower_than(self.mobile_breakpoint) && !options.enable_on_mobile;
        self.scroll_offset = viewport.scroll_y;
        self.bindings.insert(
            id,
            Binding {
                options,
                inert,
                frame_pending: !inert,
                transform: None,
            },
        );
        debug!(binding = %id, speed = options.speed, direction = %options.direction, inert, "parallax bound");
        Ok(id)
    }

    /// Remove a binding. Its pending frame, if any, is dropped.
    pub fn unbind(&mut self, id: BindingId) -> bool {
        let removed = self.bindings.remove(&id).is_some();
        if removed {
            self.outbox.retain(|directive| {
                !matches!(directive, Directive::Transform { binding, .. } if *binding == id)
            });
            debug!(binding = %id, "parallax unbound");
        }
        removed
    }

    /// Record a scroll or resize tick and request a frame for every active binding.
    ///
    /// Returns how many bindings newly requested a frame; bindings that
    /// already have one pending are coalesced.
    pub fn on_scroll(&mut self, viewport: &ViewportGeometry) -> usize {
        self.scroll_offset = viewport.scroll_y;
        let mut requested = 0;
        for binding in self.bindings.values_mut().filter(|b| !b.inert) {
            if !binding.frame_pending {
                binding.frame_pending = true;
                requested += 1;
            }
        }
        requested
    }

    /// Whether any binding is waiting for a frame.
    pub fn has_pending_frame(&self) -> bool {
        self.bindings.values().any(|b| b.frame_pending)
    }

    /// Animation frame: compute every pending transform. Returns how many were written.
    pub fn on_frame(&mut self, now: Duration) -> usize {
        let mut written = 0;
        for (&id, binding) in self.bindings.iter_mut() {
            if !binding.frame_pending {
                continue;
            }
            binding.frame_pending = false;
            let transform = compute_transform(
                self.scroll_offset,
                binding.options.speed,
                binding.options.direction,
            );
            binding.transform = Some(transform);
            self.outbox.push(Directive::Transform {
                at: now,
                binding: id,
                transform,
            });
            written += 1;
        }
        written
    }

    /// Latest transform written for a binding.
    pub fn transform_for(&self, id: BindingId) -> Option<Transform> {
        self.bindings.get(&id).and_then(|b| b.transform)
    }

    /// Whether a binding was disabled by the mobile check. `None` if unknown.
    pub fn is_inert(&self, id: BindingId) -> Option<bool> {
        self.bindings.get(&id).map(|b| b.inert)
    }

    /// Live binding count.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drain queued transform directives.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> ViewportGeometry {
        ViewportGeometry::new(1280.0, 800.0)
    }

    fn phone() -> ViewportGeometry {
        ViewportGeometry::new(390.0, 844.0)
    }

    mod compute {
        use super::*;

        #[test]
        fn up_moves_against_scroll() {
            assert_eq!(
                compute_transform(100.0, 0.5, Direction::Up),
                Transform::TranslateY(-50.0)
            );
        }

        #[test]
        fn down_moves_with_scroll() {
            assert_eq!(
                compute_transform(100.0, 0.5, Direction::Down),
                Transform::TranslateY(50.0)
            );
        }

        #[test]
        fn horizontal_directions_mirror_vertical() {
            assert_eq!(
                compute_transform(100.0, 0.5, Direction::Left),
                Transform::TranslateX(-50.0)
            );
            assert_eq!(
                compute_transform(100.0, 0.5, Direction::Right),
                Transform::TranslateX(50.0)
            );
        }

        #[test]
        fn resting_page_has_no_negative_zero() {
            for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
                let transform = compute_transform(0.0, 0.5, direction);
                assert!(transform.to_string().contains("(0px)"), "{transform}");
            }
        }

        #[test]
        fn negative_speed_inverts() {
            assert_eq!(
                compute_transform(100.0, -0.25, Direction::Up),
                Transform::TranslateY(25.0)
            );
        }
    }

    #[test]
    fn bind_requests_initial_frame() {
        let mut driver = ParallaxDriver::default();
        let id = driver
            .bind(ParallaxOptions::default(), &desktop().scrolled_to(0.0, 40.0))
            .unwrap();
        assert!(driver.has_pending_frame());
        assert_eq!(driver.on_frame(Duration::ZERO), 1);
        assert_eq!(driver.transform_for(id), Some(Transform::TranslateY(-20.0)));
    }

    #[test]
    fn scroll_bursts_coalesce_into_one_computation() {
        let mut driver = ParallaxDriver::default();
        let id = driver.bind(ParallaxOptions::default(), &desktop()).unwrap();
        driver.on_frame(Duration::ZERO);
        driver.take_directives();

        assert_eq!(driver.on_scroll(&desktop().scrolled_to(0.0, 10.0)), 1);
        assert_eq!(driver.on_scroll(&desktop().scrolled_to(0.0, 20.0)), 0);
        assert_eq!(driver.on_scroll(&desktop().scrolled_to(0.0, 100.0)), 0);
        assert_eq!(driver.on_frame(Duration::from_millis(16)), 1);

        let directives = driver.take_directives();
        assert_eq!(directives.len(), 1);
        assert_eq!(driver.transform_for(id), Some(Transform::TranslateY(-50.0)));
        assert_eq!(driver.on_frame(Duration::from_millis(32)), 0, "nothing pending");
    }

    #[test]
    fn narrow_viewport_makes_binding_inert() {
        let mut driver = ParallaxDriver::default();
        let id = driver.bind(ParallaxOptions::default(), &phone()).unwrap();
        assert_eq!(driver.is_inert(id), Some(true));
        assert_eq!(driver.on_scroll(&phone().scrolled_to(0.0, 300.0)), 0);
        assert_eq!(driver.on_frame(Duration::ZERO), 0);
        assert_eq!(driver.transform_for(id), None);
    }

    #[test]
    fn mobile_opt_in_stays_active() {
        let mut driver = ParallaxDriver::default();
        let id = driver
            .bind(ParallaxOptions::default().enabled_on_mobile(), &phone())
            .unwrap();
        assert_eq!(driver.is_inert(id), Some(false));
    }

    #[test]
    fn mobile_check_is_not_revisited_on_resize() {
        let mut driver = ParallaxDriver::default();
        let id = driver.bind(ParallaxOptions::default(), &phone()).unwrap();
        let widened = phone().resized(1440.0, 900.0).scrolled_to(0.0, 200.0);
        assert_eq!(driver.on_scroll(&widened), 0);
        assert_eq!(driver.is_inert(id), Some(true));
    }

    #[test]
    fn unbind_drops_queued_transforms() {
        let mut driver = ParallaxDriver::default();
        let id = driver.bind(ParallaxOptions::default(), &desktop()).unwrap();
        driver.on_frame(Duration::ZERO);
        assert!(driver.unbind(id));
        assert!(driver.take_directives().is_empty());
        assert!(!driver.unbind(id));
        assert_eq!(driver.on_scroll(&desktop().scrolled_to(0.0, 50.0)), 0);
    }

    #[test]
    fn non_finite_speed_is_rejected() {
        let mut driver = ParallaxDriver::default();
        let result = driver.bind(ParallaxOptions::new(f64::NAN, Direction::Up), &desktop());
        assert!(matches!(result, Err(ConfigurationError::NonFiniteSpeed(_))));
        assert!(driver.is_empty());
    }
}
