//! Options supplied by consuming views, and their validated forms.

use super::animation::{AnimationType, Direction};
use super::error::ConfigurationError;
use super::geometry::{InvalidRootMargin, RootMargin, Threshold};
use std::time::Duration;

/// Reveal configuration for one element, as written by a consuming view.
///
/// All times are continuous seconds. Call [`RevealOptions::validate`] (the
/// engine does this on registration) to obtain a [`RevealSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    /// Visible fraction required to trigger, within `[0, 1]`.
    pub threshold: f64,
    /// Adjustment applied to the viewport edges before intersection.
    pub root_margin: RootMargin,
    /// Transition to apply on reveal.
    pub animation: AnimationType,
    /// Seconds between entry and reveal. Not used in stagger mode.
    pub delay: f64,
    /// Transition length in seconds.
    pub duration: f64,
    /// Reveal the direct children one after another instead of the element itself.
    pub stagger: bool,
    /// Seconds between consecutive children in stagger mode.
    pub stagger_delay: f64,
    /// Easing curve forwarded verbatim to the rendering layer.
    pub easing: Option<String>,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::ZERO,
            animation: AnimationType::default(),
            delay: 0.0,
            duration: 0.6,
            stagger: false,
            stagger_delay: 0.1,
            easing: None,
        }
    }
}

impl RevealOptions {
    /// Default options with the given animation.
    pub fn new(animation: AnimationType) -> Self {
        Self {
            animation,
            ..Self::default()
        }
    }

    /// Set the trigger threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the root margin.
    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    /// Set the reveal delay.
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Set the transition duration.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Enable stagger mode with the given per-child delay.
    pub fn with_stagger(mut self, stagger_delay: f64) -> Self {
        self.stagger = true;
        self.stagger_delay = stagger_delay;
        self
    }

    /// Set the easing curve.
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    /// Check every field and produce the engine-side spec.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint; values are never clamped.
    pub fn validate(&self) -> Result<RevealSpec, ConfigurationError> {
        let threshold = Threshold::new(self.threshold)?;
        if !(self.delay.is_finite() && self.delay >= 0.0) {
            return Err(ConfigurationError::NegativeDelay(self.delay));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ConfigurationError::NonPositiveDuration(self.duration));
        }
        if !(self.stagger_delay.is_finite() && self.stagger_delay >= 0.0) {
            return Err(ConfigurationError::NegativeStaggerDelay(self.stagger_delay));
        }
        let margin = self.root_margin;
        if ![margin.top, margin.right, margin.bottom, margin.left]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(InvalidRootMargin::InvalidLength(margin.to_string()).into());
        }

        Ok(RevealSpec {
            threshold,
            root_margin: margin,
            animation: self.animation,
            delay: self.delay,
            duration: self.duration,
            stagger_delay: self.stagger.then_some(self.stagger_delay),
            easing: self.easing.clone(),
        })
    }
}

/// Validated reveal configuration held by the engine for a registered element.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealSpec {
    threshold: Threshold,
    root_margin: RootMargin,
    animation: AnimationType,
    delay: f64,
    duration: f64,
    stagger_delay: Option<f64>,
    easing: Option<String>,
}

impl RevealSpec {
    /// Trigger threshold.
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Root margin.
    pub fn root_margin(&self) -> RootMargin {
        self.root_margin
    }

    /// Animation type.
    pub fn animation(&self) -> AnimationType {
        self.animation
    }

    /// Reveal delay in seconds.
    pub fn delay_seconds(&self) -> f64 {
        self.delay
    }

    /// Transition duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration
    }

    /// Per-child delay in seconds, `Some` only in stagger mode.
    pub fn stagger_delay_seconds(&self) -> Option<f64> {
        self.stagger_delay
    }

    /// Whether children are revealed in sequence.
    pub fn is_staggered(&self) -> bool {
        self.stagger_delay.is_some()
    }

    /// Easing curve, if any.
    pub fn easing(&self) -> Option<&str> {
        self.easing.as_deref()
    }

    /// Delay between entry and the single-element reveal.
    pub fn delay_offset(&self) -> Duration {
        seconds(self.delay)
    }

    /// Delay between entry and the reveal of the child at `index`.
    pub fn child_delay_seconds(&self, index: usize) -> f64 {
        self.stagger_delay.unwrap_or(0.0) * index as f64
    }

    /// Same settings with every delay and stagger offset removed.
    pub fn without_delays(mut self) -> Self {
        self.delay = 0.0;
        if self.stagger_delay.is_some() {
            self.stagger_delay = Some(0.0);
        }
        self
    }
}

/// Parallax configuration for one binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxOptions {
    /// Unitless multiplier applied to the scroll offset.
    pub speed: f64,
    /// Axis and sign of the offset.
    pub direction: Direction,
    /// Keep the binding active on viewports narrower than the mobile breakpoint.
    pub enable_on_mobile: bool,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            speed: 0.5,
            direction: Direction::Up,
            enable_on_mobile: false,
        }
    }
}

impl ParallaxOptions {
    /// Options with the given speed and direction; mobile stays disabled.
    pub fn new(speed: f64, direction: Direction) -> Self {
        Self {
            speed,
            direction,
            enable_on_mobile: false,
        }
    }

    /// Keep the binding active on narrow viewports.
    pub fn enabled_on_mobile(mut self) -> Self {
        self.enable_on_mobile = true;
        self
    }

    /// Reject non-finite speeds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NonFiniteSpeed`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.speed.is_finite() {
            Ok(())
        } else {
            Err(ConfigurationError::NonFiniteSpeed(self.speed))
        }
    }
}

/// Convert validated seconds into a `Duration`, saturating on overflow.
pub fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
