//! Cancellable scheduled tasks keyed by owning element.
//!
//! Deadlines are measured on the engine's simulated clock. Nothing here ever
//! blocks: callers ask for tasks that are due at "now" and run them
//! cooperatively. Tasks with equal deadlines come out in scheduling order.

use crate::model::identifiers::HandleAllocator;
use crate::model::{ElementId, TaskId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

/// Task that reached its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueTask<T> {
    /// Task handle.
    pub id: TaskId,
    /// Element that owned the task.
    pub owner: ElementId,
    /// Deadline the task was scheduled for.
    pub deadline: Duration,
    /// Caller-defined payload.
    pub payload: T,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    owner: ElementId,
    payload: T,
}

/// Deadline-ordered queue with per-owner bulk cancellation.
#[derive(Debug, Clone)]
pub struct TaskScheduler<T> {
    handles: HandleAllocator,
    queue: BTreeMap<(Duration, TaskId), Pending<T>>,
    deadlines: HashMap<TaskId, Duration>,
    by_owner: HashMap<ElementId, BTreeSet<TaskId>>,
}

impl<T> Default for TaskScheduler<T> {
    fn default() -> Self {
        Self {
            handles: HandleAllocator::default(),
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            by_owner: HashMap::new(),
        }
    }
}

impl<T> TaskScheduler<T> {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `payload` to become due at `deadline`.
    pub fn schedule(&mut self, owner: ElementId, deadline: Duration, payload: T) -> TaskId {
        let id: TaskId = self.handles.next();
        self.queue.insert((deadline, id), Pending { owner, payload });
        self.deadlines.insert(id, deadline);
        self.by_owner.entry(owner).or_default().insert(id);
        id
    }

    /// Cancel one task. Returns `false` if it already ran or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let Some(deadline) = self.deadlines.remove(&id) else {
            return false;
        };
        if let Some(pending) = self.queue.remove(&(deadline, id)) {
            self.forget_owned(pending.owner, id);
        }
        true
    }

    /// Cancel every pending task owned by `owner`. Returns how many were cancelled.
    pub fn cancel_owner(&mut self, owner: ElementId) -> usize {
        let Some(ids) = self.by_owner.remove(&owner) else {
            return 0;
        };
        for id in &ids {
            if let Some(deadline) = self.deadlines.remove(id) {
                self.queue.remove(&(deadline, *id));
            }
        }
        ids.len()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest task whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<DueTask<T>> {
        let (&(deadline, id), _) = self.queue.first_key_value()?;
        if deadline > now {
            return None;
        }
        let pending = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.forget_owned(pending.owner, id);
        Some(DueTask {
            id,
            owner: pending.owner,
            deadline,
            payload: pending.payload,
        })
    }

    /// Pending task count for `owner`.
    pub fn pending_for(&self, owner: ElementId) -> usize {
        self.by_owner.get(&owner).map_or(0, BTreeSet::len)
    }

    /// Total pending task count.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no task is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn forget_owned(&mut self, owner: ElementId, id: TaskId) {
        if let Some(ids) = self.by_owner.get_mut(&owner) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_owner.remove(&owner);
            }
        }
    }
}
