//! Viewport geometry and intersection math.
//!
//! Element bounds are in document coordinates (logical pixels, y grows
//! downward). The viewport is the window `[scroll, scroll + size)` over the
//! document, optionally grown or shrunk by a [`RootMargin`].

use super::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, never negative.
    pub width: f64,
    /// Height, never negative.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle. Negative sizes are clamped to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Area in square pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Shift by the given offsets.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Overlap with `other`, or `None` when they are disjoint.
    ///
    /// Edge-adjacent rectangles intersect with zero area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Error returned when a root margin string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRootMargin {
    /// No values were given.
    #[error("root margin is empty")]
    Empty,
    /// More than four values were given.
    #[error("root margin takes 1 to 4 values (got {0})")]
    TooManyValues(usize),
    /// A value was not a finite pixel length.
    #[error("invalid length '{0}' in root margin (expected e.g. '-50px' or '0')")]
    InvalidLength(String),
}

/// Signed pixel offsets applied to the viewport edges before intersection.
///
/// Positive values grow the effective viewport, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    /// Offset applied to the top edge.
    pub top: f64,
    /// Offset applied to the right edge.
    pub right: f64,
    /// Offset applied to the bottom edge.
    pub bottom: f64,
    /// Offset applied to the left edge.
    pub left: f64,
}

impl RootMargin {
    /// No adjustment.
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    /// Create a margin from explicit edge offsets.
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Parse CSS margin shorthand: one to four lengths such as `"0px 0px -50px 0px"`.
    pub fn parse(input: &str) -> Result<Self, InvalidRootMargin> {
        let values = input
            .split_whitespace()
            .map(parse_length)
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [] => Err(InvalidRootMargin::Empty),
            [all] => Ok(Self::new(*all, *all, *all, *all)),
            [vertical, horizontal] => Ok(Self::new(*vertical, *horizontal, *vertical, *horizontal)),
            [top, horizontal, bottom] => Ok(Self::new(*top, *horizontal, *bottom, *horizontal)),
            [top, right, bottom, left] => Ok(Self::new(*top, *right, *bottom, *left)),
            more => Err(InvalidRootMargin::TooManyValues(more.len())),
        }
    }

    /// Grow (or shrink) `rect` by this margin. The result never has negative size.
    pub fn expand(&self, rect: &Rect) -> Rect {
        Rect::new(
            rect.x - self.left,
            rect.y - self.top,
            rect.width + self.left + self.right,
            rect.height + self.top + self.bottom,
        )
    }

    fn is_finite(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|v| v.is_finite())
    }
}

fn parse_length(token: &str) -> Result<f64, InvalidRootMargin> {
    let number = token.strip_suffix("px").unwrap_or(token);
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InvalidRootMargin::InvalidLength(token.to_string())),
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

impl FromStr for RootMargin {
    type Err = InvalidRootMargin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RootMargin {
    type Error = InvalidRootMargin;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_string()
    }
}

/// Visible fraction required before an element counts as entered. Always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Smart constructor: rejects values outside `[0, 1]` (including NaN).
    pub fn new(value: f64) -> Result<Self, ConfigurationError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigurationError::ThresholdOutOfRange(value))
        }
    }

    /// Get the raw fraction.
    pub fn get(&self) -> f64 {
        self.0
    }

    /// Whether an element with the given intersection state satisfies this threshold.
    ///
    /// `None` means the element does not intersect the root at all, which never
    /// satisfies, even at threshold zero.
    pub fn is_met_by(&self, visible_fraction: Option<f64>) -> bool {
        visible_fraction.is_some_and(|fraction| fraction >= self.0)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(0.1)
    }
}

/// Snapshot of the scroll position and viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportGeometry {
    /// Horizontal scroll offset.
    #[serde(default)]
    pub scroll_x: f64,
    /// Vertical scroll offset.
    #[serde(default)]
    pub scroll_y: f64,
    /// Viewport width in logical pixels.
    pub width: f64,
    /// Viewport height in logical pixels.
    pub height: f64,
}

impl ViewportGeometry {
    /// Viewport of the given size, scrolled to the top.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    /// Same viewport at a different scroll offset.
    pub fn scrolled_to(&self, scroll_x: f64, scroll_y: f64) -> Self {
        Self {
            scroll_x,
            scroll_y,
            ..*self
        }
    }

    /// Same scroll offset with a different viewport size.
    pub fn resized(&self, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..*self
        }
    }

    /// The viewport in viewport coordinates.
    pub fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Whether this viewport is narrower than `breakpoint`.
    pub fn is_narrower_than(&self, breakpoint: f64) -> bool {
        self.width < breakpoint
    }

    /// Fraction of `bounds` inside the margin-adjusted viewport.
    ///
    /// Returns `None` when the element does not touch the root at all. A
    /// zero-area element that touches the root counts as fully visible.
    pub fn visible_fraction(&self, bounds: &Rect, margin: &RootMargin) -> Option<f64> {
        if !margin.is_finite() {
            return None;
        }
        let element = bounds.translate(-self.scroll_x, -self.scroll_y);
        let root = margin.expand(&self.viewport_rect());
        let overlap = element.intersection(&root)?;
        let area = element.area();
        if area <= 0.0 {
            return Some(1.0);
        }
        Some((overlap.area() / area).clamp(0.0, 1.0))
    }
}

impl Default for ViewportGeometry {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod root_margin {
        use super::*;

        #[test]
        fn parses_single_value_for_all_edges() {
            assert_eq!(
                RootMargin::parse("10px").unwrap(),
                RootMargin::new(10.0, 10.0, 10.0, 10.0)
            );
        }

        #[test]
        fn parses_two_values_as_vertical_horizontal() {
            assert_eq!(
                RootMargin::parse("5px -20px").unwrap(),
                RootMargin::new(5.0, -20.0, 5.0, -20.0)
            );
        }

        #[test]
        fn parses_three_values() {
            assert_eq!(
                RootMargin::parse("1px 2px 3px").unwrap(),
                RootMargin::new(1.0, 2.0, 3.0, 2.0)
            );
        }

        #[test]
        fn parses_four_values_with_bare_zero() {
            assert_eq!(
                RootMargin::parse("0 0px -50px 0px").unwrap(),
                RootMargin::new(0.0, 0.0, -50.0, 0.0)
            );
        }

        #[test]
        fn rejects_empty_and_too_many() {
            assert_eq!(RootMargin::parse("   "), Err(InvalidRootMargin::Empty));
            assert_eq!(
                RootMargin::parse("1px 2px 3px 4px 5px"),
                Err(InvalidRootMargin::TooManyValues(5))
            );
        }

        #[test]
        fn rejects_percentages_and_garbage() {
            assert_eq!(
                RootMargin::parse("10%"),
                Err(InvalidRootMargin::InvalidLength("10%".to_string()))
            );
            assert!(RootMargin::parse("abc").is_err());
            assert!(RootMargin::parse("NaNpx").is_err());
        }

        #[test]
        fn display_uses_four_value_form() {
            let margin = RootMargin::new(0.0, 0.0, -50.0, 0.0);
            assert_eq!(margin.to_string(), "0px 0px -50px 0px");
            assert_eq!(RootMargin::parse(&margin.to_string()).unwrap(), margin);
        }

        #[test]
        fn expand_grows_and_shrinks() {
            let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
            let grown = RootMargin::new(10.0, 10.0, 10.0, 10.0).expand(&rect);
            assert_eq!(grown, Rect::new(-10.0, -10.0, 120.0, 120.0));
            let shrunk = RootMargin::new(0.0, 0.0, -50.0, 0.0).expand(&rect);
            assert_eq!(shrunk, Rect::new(0.0, 0.0, 100.0, 50.0));
        }
    }

    mod threshold {
        use super::*;

        #[test]
        fn accepts_closed_unit_interval() {
            assert!(Threshold::new(0.0).is_ok());
            assert!(Threshold::new(0.5).is_ok());
            assert!(Threshold::new(1.0).is_ok());
        }

        #[test]
        fn rejects_out_of_range_and_nan() {
            assert_eq!(
                Threshold::new(1.5),
                Err(ConfigurationError::ThresholdOutOfRange(1.5))
            );
            assert!(Threshold::new(-0.1).is_err());
            assert!(Threshold::new(f64::NAN).is_err());
        }

        #[test]
        fn zero_threshold_still_requires_intersection() {
            let threshold = Threshold::new(0.0).unwrap();
            assert!(!threshold.is_met_by(None));
            assert!(threshold.is_met_by(Some(0.0)));
        }
    }

    mod visible_fraction {
        use super::*;

        #[test]
        fn element_fully_inside_is_one() {
            let viewport = ViewportGeometry::new(1000.0, 800.0);
            let bounds = Rect::new(0.0, 100.0, 200.0, 200.0);
            assert_eq!(viewport.visible_fraction(&bounds, &RootMargin::ZERO), Some(1.0));
        }

        #[test]
        fn element_below_fold_is_none() {
            let viewport = ViewportGeometry::new(1000.0, 800.0);
            let bounds = Rect::new(0.0, 900.0, 200.0, 200.0);
            assert_eq!(viewport.visible_fraction(&bounds, &RootMargin::ZERO), None);
        }

        #[test]
        fn partially_scrolled_in() {
            let viewport = ViewportGeometry::new(1000.0, 800.0).scrolled_to(0.0, 150.0);
            // Element spans document y 900..1100, viewport covers 150..950.
            let bounds = Rect::new(0.0, 900.0, 200.0, 200.0);
            let fraction = viewport.visible_fraction(&bounds, &RootMargin::ZERO).unwrap();
            assert!((fraction - 0.25).abs() < 1e-9, "got {fraction}");
        }

        #[test]
        fn negative_bottom_margin_delays_entry() {
            let viewport = ViewportGeometry::new(1000.0, 800.0);
            let bounds = Rect::new(0.0, 760.0, 100.0, 100.0);
            assert!(viewport.visible_fraction(&bounds, &RootMargin::ZERO).is_some());
            let margin = RootMargin::new(0.0, 0.0, -50.0, 0.0);
            assert_eq!(viewport.visible_fraction(&bounds, &margin), None);
        }

        #[test]
        fn zero_area_element_inside_counts_as_visible() {
            let viewport = ViewportGeometry::new(1000.0, 800.0);
            let bounds = Rect::new(10.0, 10.0, 0.0, 0.0);
            assert_eq!(viewport.visible_fraction(&bounds, &RootMargin::ZERO), Some(1.0));
        }

        #[test]
        fn narrow_viewport_detection() {
            assert!(ViewportGeometry::new(375.0, 667.0).is_narrower_than(768.0));
            assert!(!ViewportGeometry::new(768.0, 1024.0).is_narrower_than(768.0));
        }
    }
}
