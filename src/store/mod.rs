//! Per-element reveal state and the read model consumed by renderers.
//!
//! The store is the only thing the reveal scheduler writes to. Renderers
//! either poll [`AnimationStateStore::classes_for`] / [`AnimationStateStore::timing_vars`]
//! or drain the directive queue.
//!
//! # State machine
//! ```text
//! Unrevealed --entered--> Scheduled --timer--> Revealed
//! ```
//! Staggered parents go straight to `Revealed` when their child timers are
//! scheduled; each child then walks `Scheduled -> Revealed` on its own timer.
//! Removing an element is valid from any state.

pub mod directive;

pub use directive::{Directive, RevealTarget, TimingVars, Transform};

use crate::model::{ChildId, ElementId, RevealSpec, Subscription};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

/// Tag added once a reveal has fired.
pub const REVEALED_CLASS: &str = "revealed";

/// Reveal progress of an element or child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealPhase {
    /// Waiting for the first entry.
    Unrevealed,
    /// Entered; reveal timer pending.
    Scheduled,
    /// Reveal fired. Terminal.
    Revealed,
}

#[derive(Debug, Clone)]
struct ChildState {
    child: ChildId,
    phase: RevealPhase,
}

#[derive(Debug, Clone)]
struct ElementState {
    spec: RevealSpec,
    subscription: Subscription,
    phase: RevealPhase,
    children: Vec<ChildId>,
    /// Snapshot taken at first entry in stagger mode.
    sequence: Option<Vec<ChildState>>,
}

impl ElementState {
    fn child_index(&self, child: ChildId) -> Option<usize> {
        match &self.sequence {
            Some(sequence) => sequence.iter().position(|c| c.child == child),
            None => self.children.iter().position(|c| *c == child),
        }
    }
}

/// Reveal state for every registered element.
#[derive(Debug, Clone, Default)]
pub struct AnimationStateStore {
    elements: HashMap<ElementId, ElementState>,
    outbox: Vec<Directive>,
}

impl AnimationStateStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, element: ElementId, spec: RevealSpec, subscription: Subscription) {
        self.elements.insert(
            element,
            ElementState {
                spec,
                subscription,
                phase: RevealPhase::Unrevealed,
                children: Vec::new(),
                sequence: None,
            },
        );
    }

    /// Drop an element's state and any directive still queued for it.
    pub(crate) fn remove(&mut self, element: ElementId) -> Option<Subscription> {
        let state = self.elements.remove(&element)?;
        self.outbox
            .retain(|d| d.reveal_target().is_none_or(|t| t.element() != element));
        Some(state.subscription)
    }

    /// Whether `element` is registered.
    pub fn contains(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    /// Registered element count.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Validated options of a registered element.
    pub fn spec(&self, element: ElementId) -> Option<&RevealSpec> {
        self.elements.get(&element).map(|s| &s.spec)
    }

    /// Observer subscription backing a registered element.
    pub fn subscription(&self, element: ElementId) -> Option<Subscription> {
        self.elements.get(&element).map(|s| s.subscription)
    }

    /// Reveal phase of a registered element.
    pub fn phase(&self, element: ElementId) -> Option<RevealPhase> {
        self.elements.get(&element).map(|s| s.phase)
    }

    /// Whether the element's reveal has fired (or, when staggered, been sequenced).
    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.phase(element) == Some(RevealPhase::Revealed)
    }

    /// Replace the element's direct children, in document order.
    ///
    /// Has no effect on a sequence that was already snapshotted. A repeated
    /// child keeps its first position. Returns `false` for unknown elements.
    pub fn set_children(&mut self, element: ElementId, children: Vec<ChildId>) -> bool {
        match self.elements.get_mut(&element) {
            Some(state) => {
                let mut seen = HashSet::with_capacity(children.len());
                state.children = children.into_iter().filter(|c| seen.insert(*c)).collect();
                true
            }
            None => false,
        }
    }

    /// Child sequence snapshotted at first entry, if any.
    pub fn sequence(&self, element: ElementId) -> Option<Vec<ChildId>> {
        let sequence = self.elements.get(&element)?.sequence.as_ref()?;
        Some(sequence.iter().map(|c| c.child).collect())
    }

    /// Reveal phase of one child of a registered element.
    pub fn child_phase(&self, element: ElementId, child: ChildId) -> Option<RevealPhase> {
        let state = self.elements.get(&element)?;
        match &state.sequence {
            Some(sequence) => sequence.iter().find(|c| c.child == child).map(|c| c.phase),
            None => state
                .children
                .contains(&child)
                .then_some(RevealPhase::Unrevealed),
        }
    }

    /// Presentation tags for an element.
    ///
    /// Always contains `scroll-reveal-<animation>` for registered elements and
    /// adds [`REVEALED_CLASS`] once revealed. Unknown elements get no tags, so
    /// a renderer that hides on the base tag leaves them visible.
    pub fn classes_for(&self, element: ElementId) -> BTreeSet<String> {
        let Some(state) = self.elements.get(&element) else {
            return BTreeSet::new();
        };
        tags(&state.spec, state.phase)
    }

    /// Presentation tags for one child of a staggered element.
    pub fn child_classes_for(&self, element: ElementId, child: ChildId) -> BTreeSet<String> {
        match (self.elements.get(&element), self.child_phase(element, child)) {
            (Some(state), Some(phase)) => tags(&state.spec, phase),
            _ => BTreeSet::new(),
        }
    }

    /// Timing parameters for an element.
    pub fn timing_vars(&self, element: ElementId) -> Option<TimingVars> {
        let state = self.elements.get(&element)?;
        Some(element_timing(&state.spec))
    }

    /// Timing parameters for one child; the delay is `index * staggerDelay`.
    pub fn child_timing_vars(&self, element: ElementId, child: ChildId) -> Option<TimingVars> {
        let state = self.elements.get(&element)?;
        let index = state.child_index(child)?;
        Some(child_timing(&state.spec, index))
    }

    /// Drain queued directives.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.outbox)
    }

    /// Whether any directive is queued.
    pub fn has_directives(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// `Unrevealed -> Scheduled`. Returns `false` in any other state.
    pub(crate) fn begin_reveal(&mut self, element: ElementId) -> bool {
        match self.elements.get_mut(&element) {
            Some(state) if state.phase == RevealPhase::Unrevealed => {
                state.phase = RevealPhase::Scheduled;
                true
            }
            _ => false,
        }
    }

    /// Snapshot the child sequence and mark the parent revealed.
    ///
    /// Returns `None` unless the element is `Unrevealed`.
    pub(crate) fn begin_sequence(&mut self, element: ElementId) -> Option<Vec<ChildId>> {
        let state = self.elements.get_mut(&element)?;
        if state.phase != RevealPhase::Unrevealed {
            return None;
        }
        let snapshot: Vec<ChildId> = state.children.clone();
        state.sequence = Some(
            snapshot
                .iter()
                .map(|&child| ChildState {
                    child,
                    phase: RevealPhase::Scheduled,
                })
                .collect(),
        );
        state.phase = RevealPhase::Revealed;
        Some(snapshot)
    }

    /// `Scheduled -> Revealed` for the element itself; queues its directive.
    pub(crate) fn complete_reveal(&mut self, element: ElementId, at: Duration) -> bool {
        let Some(state) = self.elements.get_mut(&element) else {
            return false;
        };
        if state.phase != RevealPhase::Scheduled {
            return false;
        }
        state.phase = RevealPhase::Revealed;
        let directive = Directive::Reveal {
            at,
            target: RevealTarget::Element { element },
            animation: state.spec.animation(),
            timing: element_timing(&state.spec),
        };
        self.outbox.push(directive);
        true
    }

    /// `Scheduled -> Revealed` for the child at `index`; queues its directive.
    pub(crate) fn complete_child_reveal(
        &mut self,
        element: ElementId,
        index: usize,
        at: Duration,
    ) -> bool {
        let Some(state) = self.elements.get_mut(&element) else {
            return false;
        };
        let Some(child) = state
            .sequence
            .as_mut()
            .and_then(|sequence| sequence.get_mut(index))
        else {
            return false;
        };
        if child.phase != RevealPhase::Scheduled {
            return false;
        }
        child.phase = RevealPhase::Revealed;
        let directive = Directive::Reveal {
            at,
            target: RevealTarget::Child {
                parent: element,
                child: child.child,
                index,
            },
            animation: state.spec.animation(),
            timing: child_timing(&state.spec, index),
        };
        self.outbox.push(directive);
        true
    }
}

fn tags(spec: &RevealSpec, phase: RevealPhase) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    tags.insert(spec.animation().base_class());
    if phase == RevealPhase::Revealed {
        tags.insert(REVEALED_CLASS.to_string());
    }
    tags
}

fn element_timing(spec: &RevealSpec) -> TimingVars {
    TimingVars {
        duration_seconds: spec.duration_seconds(),
        delay_seconds: spec.delay_seconds(),
        easing: spec.easing().map(str::to_string),
    }
}

fn child_timing(spec: &RevealSpec, index: usize) -> TimingVars {
    TimingVars {
        duration_seconds: spec.duration_seconds(),
        delay_seconds: spec.child_delay_seconds(index),
        easing: spec.easing().map(str::to_string),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
