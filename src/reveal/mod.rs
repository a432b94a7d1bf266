//! Reveal scheduling.
//!
//! Turns `entered` events into timed reveal directives:
//!
//! - Single elements reveal once, `delay` seconds after their first entry.
//! - Staggered elements snapshot their children at first entry and reveal
//!   child `i` at `i * staggerDelay` seconds after entry. Every child has its
//!   own timer; none waits on another.
//!
//! All waiting goes through the cancellable [`TaskScheduler`], keyed by the
//! owning element, so unregistering an element cancels everything it still
//! has in flight.

use crate::model::options::seconds;
use crate::model::ElementId;
use crate::scheduler::TaskScheduler;
use crate::store::AnimationStateStore;
use std::time::Duration;
use tracing::{debug, trace};

/// Payload of a pending reveal timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealTask {
    /// Reveal the element itself.
    Element,
    /// Reveal the child at this position in the snapshotted sequence.
    Child {
        /// Index into the child sequence.
        index: usize,
    },
}

/// What an `entered` event led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Single-element reveal timer started.
    Scheduled,
    /// Child timers started for a staggered element.
    Sequenced {
        /// Number of children in the snapshot.
        children: usize,
    },
    /// Element was already scheduled or revealed; nothing happened.
    AlreadyHandled,
    /// Element is not registered; nothing happened.
    Unknown,
}

/// Schedules reveal timers and completes them against the state store.
#[derive(Debug, Clone, Default)]
pub struct RevealScheduler {
    tasks: TaskScheduler<RevealTask>,
}

impl RevealScheduler {
    /// Scheduler with no pending timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the first (or a repeated) entry of `element` at time `now`.
    ///
    /// Idempotent: only the first entry of a registration starts timers.
    pub fn on_entered(
        &mut self,
        store: &mut AnimationStateStore,
        element: ElementId,
        now: Duration,
    ) -> EntryOutcome {
        let Some(spec) = store.spec(element).cloned() else {
            debug!(%element, "entered event for unknown element ignored");
            return EntryOutcome::Unknown;
        };

        if !spec.is_staggered() {
            if !store.begin_reveal(element) {
                return EntryOutcome::AlreadyHandled;
            }
            let deadline = now.saturating_add(spec.delay_offset());
            self.tasks.schedule(element, deadline, RevealTask::Element);
            trace!(%element, ?deadline, "reveal scheduled");
            return EntryOutcome::Scheduled;
        }

        let Some(sequence) = store.begin_sequence(element) else {
            return EntryOutcome::AlreadyHandled;
        };
        for index in 0..sequence.len() {
            let deadline = now.saturating_add(seconds(spec.child_delay_seconds(index)));
            self.tasks
                .schedule(element, deadline, RevealTask::Child { index });
        }
        trace!(%element, children = sequence.len(), "stagger sequence scheduled");
        EntryOutcome::Sequenced {
            children: sequence.len(),
        }
    }

    /// Complete every timer due at or before `now`. Returns how many reveals fired.
    pub fn fire_due(&mut self, store: &mut AnimationStateStore, now: Duration) -> usize {
        let mut fired = 0;
        while let Some(task) = self.tasks.pop_due(now) {
            let completed = match task.payload {
                RevealTask::Element => store.complete_reveal(task.owner, now),
                RevealTask::Child { index } => store.complete_child_reveal(task.owner, index, now),
            };
            if completed {
                trace!(element = %task.owner, task = %task.id, "reveal fired");
                fired += 1;
            }
        }
        fired
    }

    /// Cancel every pending timer for `element` and its children.
    pub fn cancel(&mut self, element: ElementId) -> usize {
        self.tasks.cancel_owner(element)
    }

    /// Pending timers for `element`.
    pub fn pending_for(&self, element: ElementId) -> usize {
        self.tasks.pending_for(element)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.next_deadline()
    }

    /// Whether any timer is pending.
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }
}
