//! Scene files for the simulator.
//!
//! A scene describes a page: its viewport, the elements registered for
//! reveal (with document-space bounds and named children), the parallax
//! bindings, and a timeline of scroll, resize, mount and unmount steps.
//!
//! ```toml
//! [viewport]
//! width = 1280.0
//! height = 800.0
//!
//! [[elements]]
//! name = "cards"
//! bounds = { x = 0.0, y = 1200.0, width = 1280.0, height = 400.0 }
//! children = ["a", "b", "c"]
//! reveal = { stagger = true, stagger_delay = 0.1 }
//!
//! [[parallax]]
//! name = "backdrop"
//! speed = 0.3
//!
//! [[steps]]
//! at = 0.5
//! scroll_y = 900.0
//! ```

mod runner;

pub use runner::{simulate, TraceLine};

use crate::config::{ParallaxSection, RevealSection};
use crate::model::{ConfigurationError, Direction, Rect, ViewportGeometry};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or running a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The scene file could not be read.
    #[error("failed to read scene {path}: {reason}")]
    ReadError {
        /// Scene path.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// The scene file is not valid TOML for this schema.
    #[error("invalid scene {path}: {reason}")]
    ParseError {
        /// Scene path.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// Two elements or two bindings share a name.
    #[error("duplicate name `{0}`")]
    DuplicateName(String),

    /// A step refers to an element the scene does not define.
    #[error("step at {at}s refers to unknown element `{name}`")]
    UnknownElement {
        /// Step time.
        at: f64,
        /// Name used by the step.
        name: String,
    },

    /// An element's bounds are negative or not finite.
    #[error("element `{0}` has invalid bounds")]
    InvalidBounds(String),

    /// The viewport has a negative or non-finite size.
    #[error("viewport must have a finite, non-negative size")]
    InvalidViewport,

    /// A step time is negative or not finite.
    #[error("step time must be a non-negative number (got {0})")]
    InvalidStepTime(f64),

    /// The timeline needs more frames than the simulator will run.
    #[error("scene runs for {frames} frames, more than the limit of {limit}")]
    TooLong {
        /// Frames required.
        frames: u64,
        /// Frame limit.
        limit: u64,
    },

    /// Element or binding options were rejected.
    #[error("element `{name}`: {source}")]
    Options {
        /// Element or binding name.
        name: String,
        /// Validation failure.
        #[source]
        source: ConfigurationError,
    },
}

/// A complete scene.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Initial viewport.
    pub viewport: ViewportGeometry,
    /// Reveal targets, registered in order at time zero.
    #[serde(default)]
    pub elements: Vec<SceneElement>,
    /// Parallax bindings, bound in order at time zero.
    #[serde(default)]
    pub parallax: Vec<SceneBinding>,
    /// Timeline.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// An element registered for reveal.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SceneElement {
    /// Name used in steps and in the trace.
    pub name: String,
    /// Document-space bounds.
    pub bounds: Rect,
    /// Child names in document order.
    #[serde(default)]
    pub children: Vec<String>,
    /// Overrides on top of the configured reveal defaults.
    #[serde(default)]
    pub reveal: RevealSection,
    /// Whether the element is mounted at time zero.
    #[serde(default = "mounted_by_default")]
    pub mounted: bool,
}

fn mounted_by_default() -> bool {
    true
}

/// A parallax binding.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SceneBinding {
    /// Name used in the trace.
    pub name: String,
    /// Speed override.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Direction override.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Mobile override.
    #[serde(default)]
    pub enable_on_mobile: Option<bool>,
}

impl SceneBinding {
    /// Overrides as a config section.
    pub fn overrides(&self) -> ParallaxSection {
        ParallaxSection {
            speed: self.speed,
            direction: self.direction,
            enable_on_mobile: self.enable_on_mobile,
        }
    }
}

/// Viewport size used by resize steps.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Size {
    /// Width in logical pixels.
    pub width: f64,
    /// Height in logical pixels.
    pub height: f64,
}

/// One point on the timeline. Every field other than `at` is optional;
/// a step applies its resize, then its scroll, then unmount and mount.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Seconds from the start of the simulation.
    pub at: f64,
    /// New horizontal scroll offset.
    #[serde(default)]
    pub scroll_x: Option<f64>,
    /// New vertical scroll offset.
    #[serde(default)]
    pub scroll_y: Option<f64>,
    /// New viewport size.
    #[serde(default)]
    pub resize: Option<Size>,
    /// Element to unregister.
    #[serde(default)]
    pub unmount: Option<String>,
    /// Element to register again, as a fresh registration.
    #[serde(default)]
    pub mount: Option<String>,
}

impl Scene {
    /// Parse a scene from TOML text. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Parse failures and structural problems found by [`Scene::validate`].
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SceneError> {
        let scene: Scene = toml::from_str(text).map_err(|e| SceneError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        scene.validate()?;
        Ok(scene)
    }

    /// Check names, bounds and step times.
    ///
    /// # Errors
    ///
    /// The first problem found.
    pub fn validate(&self) -> Result<(), SceneError> {
        let ViewportGeometry { width, height, .. } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            return Err(SceneError::InvalidViewport);
        }

        let mut names = HashSet::new();
        for element in &self.elements {
            if !names.insert(element.name.as_str()) {
                return Err(SceneError::DuplicateName(element.name.clone()));
            }
            let Rect { x, y, width, height } = element.bounds;
            let finite = [x, y, width, height].iter().all(|v| v.is_finite());
            if !finite || width < 0.0 || height < 0.0 {
                return Err(SceneError::InvalidBounds(element.name.clone()));
            }
        }

        let mut bindings = HashSet::new();
        for binding in &self.parallax {
            if !bindings.insert(binding.name.as_str()) {
                return Err(SceneError::DuplicateName(binding.name.clone()));
            }
        }

        for step in &self.steps {
            if !step.at.is_finite() || step.at < 0.0 {
                return Err(SceneError::InvalidStepTime(step.at));
            }
            for name in step.unmount.iter().chain(step.mount.iter()) {
                if !names.contains(name.as_str()) {
                    return Err(SceneError::UnknownElement {
                        at: step.at,
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Time of the last step, or zero.
    pub fn last_step_at(&self) -> f64 {
        self.steps.iter().map(|s| s.at).fold(0.0, f64::max)
    }
}

/// Read and parse a scene file.
///
/// # Errors
///
/// The file cannot be read or is not a valid scene.
pub fn load_scene(path: &Path) -> Result<Scene, SceneError> {
    let text = std::fs::read_to_string(path).map_err(|e| SceneError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Scene::from_toml(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnimationType;

    fn parse(text: &str) -> Result<Scene, SceneError> {
        Scene::from_toml(text, Path::new("test.toml"))
    }

    const MINIMAL: &str = r#"
[viewport]
width = 1280.0
height = 800.0
"#;

    #[test]
    fn minimal_scene_has_no_content() {
        let scene = parse(MINIMAL).unwrap();
        assert!(scene.elements.is_empty());
        assert!(scene.steps.is_empty());
        assert_eq!(scene.viewport.scroll_y, 0.0);
        assert_eq!(scene.last_step_at(), 0.0);
    }

    #[test]
    fn element_overrides_and_defaults_parse() {
        let scene = parse(
            r#"
[viewport]
width = 1280.0
height = 800.0

[[elements]]
name = "cards"
bounds = { x = 0.0, y = 1200.0, width = 1280.0, height = 400.0 }
children = ["a", "b"]
reveal = { animation = "scale", stagger = true }

[[steps]]
at = 1.5
scroll_y = 900.0

[[steps]]
at = 0.5
unmount = "cards"
"#,
        )
        .unwrap();
        let cards = &scene.elements[0];
        assert!(cards.mounted);
        assert_eq!(cards.children, vec!["a", "b"]);
        assert_eq!(cards.reveal.animation, Some(AnimationType::Scale));
        assert_eq!(cards.reveal.stagger, Some(true));
        assert_eq!(scene.last_step_at(), 1.5);
    }

    #[test]
    fn duplicate_element_names_are_rejected() {
        let text = format!(
            "{MINIMAL}
[[elements]]
name = \"x\"
bounds = {{ x = 0.0, y = 0.0, width = 1.0, height = 1.0 }}

[[elements]]
name = \"x\"
bounds = {{ x = 0.0, y = 0.0, width = 1.0, height = 1.0 }}
"
        );
        assert!(matches!(parse(&text), Err(SceneError::DuplicateName(n)) if n == "x"));
    }

    #[test]
    fn steps_must_name_known_elements() {
        let text = format!("{MINIMAL}\n[[steps]]\nat = 1.0\nunmount = \"ghost\"\n");
        assert!(matches!(
            parse(&text),
            Err(SceneError::UnknownElement { name, .. }) if name == "ghost"
        ));
    }

    #[test]
    fn negative_step_time_is_rejected() {
        let text = format!("{MINIMAL}\n[[steps]]\nat = -1.0\n");
        assert!(matches!(parse(&text), Err(SceneError::InvalidStepTime(_))));
    }

    #[test]
    fn negative_bounds_are_rejected() {
        let text = format!(
            "{MINIMAL}
[[elements]]
name = \"bad\"
bounds = {{ x = 0.0, y = 0.0, width = -5.0, height = 1.0 }}
"
        );
        assert!(matches!(parse(&text), Err(SceneError::InvalidBounds(_))));
    }

    #[test]
    fn unknown_step_fields_are_parse_errors() {
        let text = format!("{MINIMAL}\n[[steps]]\nat = 1.0\nzoom = 2.0\n");
        assert!(matches!(parse(&text), Err(SceneError::ParseError { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            load_scene(Path::new("/nonexistent/scene.toml")),
            Err(SceneError::ReadError { .. })
        ));
    }
}
