//! Animation kinds and parallax directions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reveal transition applied when an element first enters the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationType {
    /// Fade in while moving up.
    #[default]
    FadeUp,
    /// Fade in while moving down.
    FadeDown,
    /// Fade in while moving left.
    FadeLeft,
    /// Fade in while moving right.
    FadeRight,
    /// Scale up into place.
    Scale,
    /// Rotate into place.
    Rotate,
    /// Slide up without fading.
    SlideUp,
    /// Slide down without fading.
    SlideDown,
}

impl AnimationType {
    /// Every animation type, in declaration order.
    pub const ALL: [AnimationType; 8] = [
        AnimationType::FadeUp,
        AnimationType::FadeDown,
        AnimationType::FadeLeft,
        AnimationType::FadeRight,
        AnimationType::Scale,
        AnimationType::Rotate,
        AnimationType::SlideUp,
        AnimationType::SlideDown,
    ];

    /// Kebab-case name, e.g. `fade-up`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationType::FadeUp => "fade-up",
            AnimationType::FadeDown => "fade-down",
            AnimationType::FadeLeft => "fade-left",
            AnimationType::FadeRight => "fade-right",
            AnimationType::Scale => "scale",
            AnimationType::Rotate => "rotate",
            AnimationType::SlideUp => "slide-up",
            AnimationType::SlideDown => "slide-down",
        }
    }

    /// Base presentation tag, present whether or not the element has revealed.
    pub fn base_class(&self) -> String {
        format!("scroll-reveal-{}", self.as_str())
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown animation or direction name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl FromStr for AnimationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "animation type",
                value: s.to_string(),
            })
    }
}

/// Axis and sign of a parallax offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Moves against the scroll on the vertical axis.
    #[default]
    Up,
    /// Moves with the scroll on the vertical axis.
    Down,
    /// Horizontal, same sign as `Up`.
    Left,
    /// Horizontal, same sign as `Down`.
    Right,
}

impl Direction {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(UnknownVariant {
                kind: "direction",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_class_uses_kebab_name() {
        assert_eq!(AnimationType::FadeUp.base_class(), "scroll-reveal-fade-up");
        assert_eq!(AnimationType::SlideDown.base_class(), "scroll-reveal-slide-down");
        assert_eq!(AnimationType::Scale.base_class(), "scroll-reveal-scale");
    }

    #[test]
    fn from_str_accepts_every_name() {
        for kind in AnimationType::ALL {
            assert_eq!(kind.as_str().parse::<AnimationType>(), Ok(kind));
        }
    }

    #[test]
    fn from_str_rejects_unknown_animation() {
        let err = "zoom".parse::<AnimationType>().unwrap_err();
        assert_eq!(err.value, "zoom");
        assert!(err.to_string().contains("animation type"));
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&AnimationType::FadeRight).unwrap();
        assert_eq!(json, "\"fade-right\"");
        let direction: Direction = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(direction, Direction::Left);
    }

    #[test]
    fn direction_defaults_to_up() {
        assert_eq!(Direction::default(), Direction::Up);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
