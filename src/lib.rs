//! scrollfx
//!
//! Scroll-triggered reveal animations and scroll-linked parallax, as a
//! host-agnostic engine. The host feeds viewport geometry, animation frames
//! and time; the engine answers with presentation directives.
//!
//! The core is pure and single-threaded: [`engine::ScrollFx`] owns a
//! [`observer::ViewportObserver`], the reveal scheduler, the state store and
//! the parallax driver. [`scene`] and the `scrollfx` binary drive it from a
//! TOML page description for offline inspection.

pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod observer;
pub mod parallax;
pub mod reveal;
pub mod scene;
pub mod scheduler;
pub mod store;

pub use engine::{EngineSettings, ScrollFx};

#[cfg(test)]
mod test_harness;

#[cfg(test)]
mod tests;
