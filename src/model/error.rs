//! Error types for scrollfx.
//!
//! The engine's own taxonomy is deliberately narrow:
//!
//! - Operations against an unknown or torn-down handle are **not** errors.
//!   They are no-ops that report `false`/`None` and log at `debug`.
//! - Misconfiguration is rejected up front with a [`ConfigurationError`] when
//!   an element or binding is registered, never clamped.
//!
//! [`AppError`] is the binary's top-level error and wraps the impure-shell
//! failures (config files, logging, scene files, I/O).

use super::geometry::InvalidRootMargin;
use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::scene::SceneError;
use thiserror::Error;

/// Rejected reveal or parallax options.
///
/// Non-finite inputs are reported through the same variant as the range
/// violation they would otherwise cause.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Threshold outside `[0, 1]`.
    #[error("threshold must be within [0, 1] (got {0})")]
    ThresholdOutOfRange(f64),

    /// Reveal delay below zero or not finite.
    #[error("delay must be a finite, non-negative number of seconds (got {0})")]
    NegativeDelay(f64),

    /// Reveal duration zero, negative or not finite.
    #[error("duration must be a finite, positive number of seconds (got {0})")]
    NonPositiveDuration(f64),

    /// Per-child stagger delay below zero or not finite.
    #[error("stagger delay must be a finite, non-negative number of seconds (got {0})")]
    NegativeStaggerDelay(f64),

    /// Parallax speed not finite.
    #[error("parallax speed must be finite (got {0})")]
    NonFiniteSpeed(f64),

    /// Root margin with non-finite edges.
    #[error("invalid root margin: {0}")]
    RootMargin(#[from] InvalidRootMargin),
}

/// Top-level error for the `scrollfx` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Scene file could not be loaded or simulated.
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Writing the trace failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
