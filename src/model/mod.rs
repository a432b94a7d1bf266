//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod animation;
pub mod error;
pub mod geometry;
pub mod identifiers;
pub mod options;

// Re-export for convenience
pub use animation::{AnimationType, Direction, UnknownVariant};
pub use error::{AppError, ConfigurationError};
pub use geometry::{InvalidRootMargin, Rect, RootMargin, Threshold, ViewportGeometry};
pub use identifiers::{BindingId, ChildId, ElementId, Subscription, TaskId};
pub use options::{ParallaxOptions, RevealOptions, RevealSpec};
