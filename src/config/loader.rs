//! Configuration file loading with precedence handling.
//!
//! Sources, lowest to highest: built-in defaults, config file,
//! `SCROLLFX_*` environment variables, CLI flags.

use crate::engine::EngineSettings;
use crate::model::{
    AnimationType, ConfigurationError, Direction, ParallaxOptions, RevealOptions, RootMargin,
};
use crate::parallax::DEFAULT_MOBILE_BREAKPOINT;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Env var naming a config file.
pub const CONFIG_ENV: &str = "SCROLLFX_CONFIG";
/// Env var forcing reduced motion (`1`/`true`/`0`/`false`).
pub const REDUCED_MOTION_ENV: &str = "SCROLLFX_REDUCED_MOTION";
/// Env var overriding the simulated frame rate.
pub const FRAME_RATE_ENV: &str = "SCROLLFX_FRAME_RATE";
/// Env var overriding the log file path.
pub const LOG_FILE_ENV: &str = "SCROLLFX_LOG_FILE";

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Config path is empty or cannot be resolved.
    #[error("invalid config path: {0}")]
    InvalidPath(String),

    /// Config file exists but could not be read.
    #[error("failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file is not valid TOML for this schema.
    #[error("invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// A setting is outside its allowed range.
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting {
        /// Setting name.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Reveal or parallax defaults are invalid.
    #[error(transparent)]
    Options(#[from] ConfigurationError),
}

/// TOML configuration file structure.
///
/// All fields are optional; anything omitted keeps its default.
/// Corresponds to `~/.config/scrollfx/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Collapse every reveal delay to zero.
    #[serde(default)]
    pub reduced_motion: Option<bool>,

    /// Viewport width below which parallax defaults to off.
    #[serde(default)]
    pub mobile_breakpoint: Option<f64>,

    /// Simulated animation frames per second.
    #[serde(default)]
    pub frame_rate: Option<u32>,

    /// Simulated seconds to keep running after the last scene step.
    #[serde(default)]
    pub settle_seconds: Option<f64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Reveal defaults.
    #[serde(default)]
    pub reveal: Option<RevealSection>,

    /// Parallax defaults.
    #[serde(default)]
    pub parallax: Option<ParallaxSection>,
}

/// `[reveal]` section. Also the shape of per-element overrides in scenes.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RevealSection {
    /// Visible fraction that triggers a reveal.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// CSS margin shorthand applied to the viewport.
    #[serde(default)]
    pub root_margin: Option<RootMargin>,
    /// Animation name, e.g. `"fade-up"`.
    #[serde(default)]
    pub animation: Option<AnimationType>,
    /// Seconds between entry and reveal.
    #[serde(default)]
    pub delay: Option<f64>,
    /// Animation length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Reveal children in sequence.
    #[serde(default)]
    pub stagger: Option<bool>,
    /// Seconds between consecutive children.
    #[serde(default)]
    pub stagger_delay: Option<f64>,
    /// Opaque timing curve.
    #[serde(default)]
    pub easing: Option<String>,
}

impl RevealSection {
    /// Overlay the fields that are set onto `base`.
    pub fn apply_to(&self, base: &RevealOptions) -> RevealOptions {
        let mut options = base.clone();
        if let Some(threshold) = self.threshold {
            options.threshold = threshold;
        }
        if let Some(margin) = self.root_margin {
            options.root_margin = margin;
        }
        if let Some(animation) = self.animation {
            options.animation = animation;
        }
        if let Some(delay) = self.delay {
            options.delay = delay;
        }
        if let Some(duration) = self.duration {
            options.duration = duration;
        }
        if let Some(stagger) = self.stagger {
            options.stagger = stagger;
        }
        if let Some(stagger_delay) = self.stagger_delay {
            options.stagger_delay = stagger_delay;
        }
        if let Some(easing) = &self.easing {
            options.easing = Some(easing.clone());
        }
        options
    }
}

/// `[parallax]` section. Also the shape of per-binding overrides in scenes.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParallaxSection {
    /// Scroll-to-offset multiplier.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Direction of travel.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Keep parallax active below the mobile breakpoint.
    #[serde(default)]
    pub enable_on_mobile: Option<bool>,
}

impl ParallaxSection {
    /// Overlay the fields that are set onto `base`.
    pub fn apply_to(&self, base: ParallaxOptions) -> ParallaxOptions {
        ParallaxOptions {
            speed: self.speed.unwrap_or(base.speed),
            direction: self.direction.unwrap_or(base.direction),
            enable_on_mobile: self.enable_on_mobile.unwrap_or(base.enable_on_mobile),
        }
    }
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Defaults for every reveal registration.
    pub reveal: RevealOptions,
    /// Defaults for every parallax binding.
    pub parallax: ParallaxOptions,
    /// Engine switches.
    pub engine: EngineSettings,
    /// Simulated frames per second.
    pub frame_rate: u32,
    /// Simulated seconds after the last scene step.
    pub settle_seconds: f64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            reveal: RevealOptions::default(),
            parallax: ParallaxOptions::default(),
            engine: EngineSettings::default(),
            frame_rate: 60,
            settle_seconds: 2.0,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Check every setting, including the reveal and parallax defaults.
    ///
    /// # Errors
    ///
    /// The first setting found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reveal.validate()?;
        self.parallax.validate()?;
        if self.frame_rate == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "frame_rate",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.settle_seconds.is_finite() || self.settle_seconds < 0.0 {
            return Err(ConfigError::InvalidSetting {
                key: "settle_seconds",
                reason: format!("must be a non-negative number (got {})", self.settle_seconds),
            });
        }
        let breakpoint = self.engine.mobile_breakpoint;
        if !breakpoint.is_finite() || breakpoint < 0.0 {
            return Err(ConfigError::InvalidSetting {
                key: "mobile_breakpoint",
                reason: format!("must be a non-negative number (got {breakpoint})"),
            });
        }
        Ok(())
    }
}

/// Resolve default log file path.
///
/// `<state_dir>/scrollfx/scrollfx.log`, or `scrollfx.log` in the current
/// directory when the platform has no state directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("scrollfx").join("scrollfx.log"),
        None => PathBuf::from("scrollfx.log"),
    }
}

/// Resolve default config file path (`<config_dir>/scrollfx/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scrollfx").join("config.toml"))
}

/// Load a config file.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// The file exists but cannot be read or parsed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` (CLI `--config`)
/// 2. `SCROLLFX_CONFIG` environment variable
/// 3. Default path `~/.config/scrollfx/config.toml`
///
/// # Errors
///
/// `SCROLLFX_CONFIG` is set but empty, or a file exists but cannot be read
/// or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if env_path.trim().is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge a config file into the defaults.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let reveal = match &config.reveal {
        Some(section) => section.apply_to(&defaults.reveal),
        None => defaults.reveal,
    };
    let parallax = match &config.parallax {
        Some(section) => section.apply_to(defaults.parallax),
        None => defaults.parallax,
    };

    ResolvedConfig {
        reveal,
        parallax,
        engine: EngineSettings {
            reduced_motion: config.reduced_motion.unwrap_or(defaults.engine.reduced_motion),
            mobile_breakpoint: config.mobile_breakpoint.unwrap_or(DEFAULT_MOBILE_BREAKPOINT),
        },
        frame_rate: config.frame_rate.unwrap_or(defaults.frame_rate),
        settle_seconds: config.settle_seconds.unwrap_or(defaults.settle_seconds),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply `SCROLLFX_*` environment overrides.
///
/// # Errors
///
/// A set variable does not parse.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(REDUCED_MOTION_ENV) {
        config.engine.reduced_motion = parse_flag(&raw).ok_or(ConfigError::InvalidEnv {
            var: REDUCED_MOTION_ENV,
            value: raw.clone(),
        })?;
    }

    if let Ok(raw) = std::env::var(FRAME_RATE_ENV) {
        config.frame_rate = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: FRAME_RATE_ENV,
            value: raw.clone(),
        })?;
    }

    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        if !path.is_empty() {
            config.log_file_path = PathBuf::from(path);
        }
    }

    Ok(config)
}

/// Apply CLI overrides. Only flags the user actually passed are `Some`.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    reduced_motion_override: Option<bool>,
    frame_rate_override: Option<u32>,
) -> ResolvedConfig {
    if let Some(reduced_motion) = reduced_motion_override {
        config.engine.reduced_motion = reduced_motion;
    }

    if let Some(frame_rate) = frame_rate_override {
        config.frame_rate = frame_rate;
    }

    config
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
