//! Drives a [`ScrollFx`] engine through a scene and records its directives.

use super::{Scene, SceneError, Step};
use crate::config::ResolvedConfig;
use crate::engine::ScrollFx;
use crate::model::options::seconds;
use crate::model::{AnimationType, BindingId, ChildId, ElementId};
use crate::observer::GeometryObserver;
use crate::store::{Directive, RevealTarget};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Upper bound on simulated frames for one scene.
const MAX_FRAMES: u64 = 1_000_000;

/// One directive, with handles replaced by scene names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceLine {
    /// An element or child revealed.
    Reveal {
        /// Simulated seconds.
        at: f64,
        /// `element` or `element/child`.
        target: String,
        /// Animation applied.
        animation: AnimationType,
        /// Transition length in seconds.
        duration: f64,
        /// Configured delay (or stagger offset) in seconds.
        delay: f64,
        /// Easing curve, if configured.
        #[serde(skip_serializing_if = "Option::is_none")]
        easing: Option<String>,
    },
    /// A parallax transform was written.
    Transform {
        /// Simulated seconds.
        at: f64,
        /// Binding name.
        binding: String,
        /// CSS transform value.
        transform: String,
    },
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceLine::Reveal {
                at,
                target,
                animation,
                duration,
                delay,
                ..
            } => write!(
                f,
                "{at:.3}s reveal {target} {animation} duration={duration}s delay={delay}s"
            ),
            TraceLine::Transform {
                at,
                binding,
                transform,
            } => write!(f, "{at:.3}s transform {binding} {transform}"),
        }
    }
}

/// Handle-to-name lookups for one run.
#[derive(Debug, Default)]
struct Names {
    elements: HashMap<ElementId, String>,
    children: HashMap<ChildId, String>,
    bindings: HashMap<BindingId, String>,
}

impl Names {
    fn element(&self, element: ElementId) -> String {
        self.elements
            .get(&element)
            .cloned()
            .unwrap_or_else(|| element.to_string())
    }

    fn target(&self, target: RevealTarget) -> String {
        match target {
            RevealTarget::Element { element } => self.element(element),
            RevealTarget::Child { parent, child, .. } => {
                let child_name = self
                    .children
                    .get(&child)
                    .cloned()
                    .unwrap_or_else(|| child.to_string());
                format!("{}/{}", self.element(parent), child_name)
            }
        }
    }

    fn trace(&self, directive: Directive) -> TraceLine {
        match directive {
            Directive::Reveal {
                at,
                target,
                animation,
                timing,
            } => TraceLine::Reveal {
                at: at.as_secs_f64(),
                target: self.target(target),
                animation,
                duration: timing.duration_seconds,
                delay: timing.delay_seconds,
                easing: timing.easing,
            },
            Directive::Transform {
                at,
                binding,
                transform,
            } => TraceLine::Transform {
                at: at.as_secs_f64(),
                binding: self
                    .bindings
                    .get(&binding)
                    .cloned()
                    .unwrap_or_else(|| binding.to_string()),
                transform: transform.to_string(),
            },
        }
    }
}

struct Simulation<'a> {
    scene: &'a Scene,
    config: &'a ResolvedConfig,
    fx: ScrollFx<GeometryObserver>,
    names: Names,
    mounted: HashMap<&'a str, ElementId>,
    next_child: u64,
    trace: Vec<TraceLine>,
}

impl<'a> Simulation<'a> {
    fn new(scene: &'a Scene, config: &'a ResolvedConfig) -> Self {
        Self {
            scene,
            config,
            fx: ScrollFx::with_geometry(config.engine, scene.viewport),
            names: Names::default(),
            mounted: HashMap::new(),
            next_child: 1,
            trace: Vec::new(),
        }
    }

    fn mount(&mut self, name: &'a str) -> Result<(), SceneError> {
        if self.mounted.contains_key(name) {
            debug!(name, "element already mounted");
            return Ok(());
        }
        let scene = self.scene;
        let Some(element) = scene.elements.iter().find(|e| e.name == name) else {
            return Ok(());
        };
        let options = element.reveal.apply_to(&self.config.reveal);
        let id = self
            .fx
            .register(&options)
            .map_err(|source| SceneError::Options {
                name: name.to_string(),
                source,
            })?;
        self.names.elements.insert(id, element.name.clone());

        let mut children = Vec::with_capacity(element.children.len());
        for child_name in &element.children {
            let child = ChildId::new(self.next_child);
            self.next_child += 1;
            self.names.children.insert(child, child_name.clone());
            children.push(child);
        }
        self.fx.set_children(id, children);
        self.fx.set_bounds(id, element.bounds);
        self.mounted.insert(name, id);
        Ok(())
    }

    fn unmount(&mut self, name: &str) {
        match self.mounted.remove(name) {
            Some(id) => {
                self.fx.unregister(id);
            }
            None => debug!(name, "unmount of element that is not mounted"),
        }
    }

    fn apply(&mut self, step: &'a Step) -> Result<(), SceneError> {
        let mut viewport = self.fx.viewport();
        if let Some(size) = step.resize {
            viewport = viewport.resized(size.width, size.height);
            self.fx.on_resize(viewport);
        }
        if step.scroll_x.is_some() || step.scroll_y.is_some() {
            viewport = viewport.scrolled_to(
                step.scroll_x.unwrap_or(viewport.scroll_x),
                step.scroll_y.unwrap_or(viewport.scroll_y),
            );
            self.fx.on_scroll(viewport);
        }
        if let Some(name) = &step.unmount {
            self.unmount(name);
        }
        if let Some(name) = &step.mount {
            self.mount(name)?;
        }
        Ok(())
    }

    fn collect(&mut self) {
        for directive in self.fx.take_directives() {
            self.trace.push(self.names.trace(directive));
        }
    }
}

/// Run `scene` under `config` and return every directive in issue order.
///
/// The engine ticks at `config.frame_rate` frames per second from time zero
/// until `config.settle_seconds` after the last step. Steps run at their own
/// time, before the frame that follows them.
///
/// # Errors
///
/// Rejected element or binding options, or a timeline longer than the
/// simulator's frame limit.
pub fn simulate(scene: &Scene, config: &ResolvedConfig) -> Result<Vec<TraceLine>, SceneError> {
    let frame_rate = f64::from(config.frame_rate.max(1));
    let end = scene.last_step_at() + config.settle_seconds.max(0.0);
    let needed = (end * frame_rate).ceil() + 1.0;
    // Compare as a float: a huge `at` would saturate the cast.
    if !(needed <= MAX_FRAMES as f64) {
        return Err(SceneError::TooLong {
            frames: needed.min(u64::MAX as f64) as u64,
            limit: MAX_FRAMES,
        });
    }
    let frames = needed as u64;

    let mut sim = Simulation::new(scene, config);

    for binding in &scene.parallax {
        let options = binding.overrides().apply_to(config.parallax);
        let id = sim
            .fx
            .bind_parallax(options)
            .map_err(|source| SceneError::Options {
                name: binding.name.clone(),
                source,
            })?;
        sim.names.bindings.insert(id, binding.name.clone());
    }
    for element in scene.elements.iter().filter(|e| e.mounted) {
        sim.mount(&element.name)?;
    }

    let mut steps: Vec<&Step> = scene.steps.iter().collect();
    steps.sort_by(|a, b| a.at.total_cmp(&b.at));
    let mut pending = steps.into_iter().peekable();

    for frame in 0..frames {
        let frame_time = seconds(frame as f64 / frame_rate);
        while let Some(step) = pending.next_if(|s| seconds(s.at) <= frame_time) {
            sim.fx.advance_to(seconds(step.at));
            sim.apply(step)?;
            sim.collect();
        }
        sim.fx.advance_to(frame_time);
        sim.fx.on_animation_frame();
        sim.collect();
    }

    info!(
        frames,
        directives = sim.trace.len(),
        elements = scene.elements.len(),
        bindings = scene.parallax.len(),
        "simulation finished"
    );
    Ok(sim.trace)
}
