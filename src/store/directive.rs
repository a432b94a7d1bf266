//! Presentation directives handed to the rendering layer.

use crate::model::{AnimationType, BindingId, ChildId, ElementId};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Continuous timing parameters for a reveal transition.
///
/// The engine has already waited out the delay by the time a reveal
/// directive is emitted; the delay is reported so renderers that prefer
/// to schedule the transition themselves have it available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingVars {
    /// Transition length in seconds.
    pub duration_seconds: f64,
    /// Delay between entry and reveal in seconds.
    pub delay_seconds: f64,
    /// Opaque easing curve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
}

impl TimingVars {
    /// Render as CSS custom properties.
    pub fn css_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            ("--scroll-reveal-duration", format!("{}s", self.duration_seconds)),
            ("--scroll-reveal-delay", format!("{}s", self.delay_seconds)),
        ];
        if let Some(easing) = &self.easing {
            vars.push(("--scroll-reveal-easing", easing.clone()));
        }
        vars
    }
}

/// Continuous parallax offset for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Transform {
    /// Horizontal offset in pixels.
    TranslateX(f64),
    /// Vertical offset in pixels.
    TranslateY(f64),
}

impl Transform {
    /// Signed offset in pixels.
    pub fn offset(&self) -> f64 {
        match self {
            Transform::TranslateX(offset) | Transform::TranslateY(offset) => *offset,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::TranslateX(offset) => write!(f, "translateX({offset}px)"),
            Transform::TranslateY(offset) => write!(f, "translateY({offset}px)"),
        }
    }
}

/// What a reveal directive applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealTarget {
    /// The registered element itself.
    Element {
        /// Element handle.
        element: ElementId,
    },
    /// One child of a staggered element.
    Child {
        /// Staggered parent.
        parent: ElementId,
        /// Child handle.
        child: ChildId,
        /// Position in the child sequence.
        index: usize,
    },
}

impl RevealTarget {
    /// The registered element this target belongs to.
    pub fn element(&self) -> ElementId {
        match self {
            RevealTarget::Element { element } => *element,
            RevealTarget::Child { parent, .. } => *parent,
        }
    }
}

impl fmt::Display for RevealTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealTarget::Element { element } => write!(f, "{element}"),
            RevealTarget::Child {
                parent,
                child,
                index,
            } => write!(f, "{parent}/{child}[{index}]"),
        }
    }
}

/// Instruction for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    /// Apply a reveal transition.
    Reveal {
        /// Simulated time the directive was issued.
        #[serde(serialize_with = "as_seconds")]
        at: Duration,
        /// Element or child to animate.
        target: RevealTarget,
        /// Transition to apply.
        animation: AnimationType,
        /// Timing parameters.
        timing: TimingVars,
    },
    /// Apply a parallax transform.
    Transform {
        /// Simulated time the directive was issued.
        #[serde(serialize_with = "as_seconds")]
        at: Duration,
        /// Binding the transform belongs to.
        binding: BindingId,
        /// Offset to apply.
        transform: Transform,
    },
}

impl Directive {
    /// Simulated time the directive was issued.
    pub fn at(&self) -> Duration {
        match self {
            Directive::Reveal { at, .. } | Directive::Transform { at, .. } => *at,
        }
    }

    /// Reveal target, if this is a reveal.
    pub fn reveal_target(&self) -> Option<RevealTarget> {
        match self {
            Directive::Reveal { target, .. } => Some(*target),
            Directive::Transform { .. } => None,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Reveal {
                at,
                target,
                animation,
                timing,
            } => write!(
                f,
                "{:.3}s reveal {target} {animation} {}s",
                at.as_secs_f64(),
                timing.duration_seconds
            ),
            Directive::Transform {
                at,
                binding,
                transform,
            } => write!(f, "{:.3}s transform {binding} {transform}", at.as_secs_f64()),
        }
    }
}

fn as_seconds<S: Serializer>(at: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(at.as_secs_f64())
}
