//! Opaque handle newtypes.
//!
//! Handles are plain integers wrapped so they cannot be mixed up. Element,
//! binding, subscription and task handles are allocated by the engine;
//! child handles are supplied by the consuming view.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw handle value.
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw handle value.
            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

handle!(
    /// Handle for an element registered for scroll reveal.
    ///
    /// Every registration yields a fresh handle, so a re-mounted element
    /// starts from a clean reveal state.
    ElementId,
    "element"
);

handle!(
    /// Handle for a direct child of a staggered element, in document order.
    ChildId,
    "child"
);

handle!(
    /// Handle for a parallax binding.
    BindingId,
    "binding"
);

handle!(
    /// Handle returned by a [`ViewportObserver`](crate::observer::ViewportObserver)
    /// registration.
    Subscription,
    "subscription"
);

handle!(
    /// Handle for a pending scheduled task.
    TaskId,
    "task"
);

/// Monotonic allocator for engine-issued handles.
#[derive(Debug, Clone, Default)]
pub(crate) struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    /// Allocate the next raw handle value. Never returns the same value twice.
    pub(crate) fn next<H: From<u64>>(&mut self) -> H {
        self.next += 1;
        H::from(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_value() {
        assert_eq!(ElementId::new(7).to_string(), "element#7");
        assert_eq!(ChildId::new(3).to_string(), "child#3");
        assert_eq!(BindingId::new(1).to_string(), "binding#1");
        assert_eq!(TaskId::new(42).to_string(), "task#42");
    }

    #[test]
    fn allocator_never_repeats() {
        let mut alloc = HandleAllocator::default();
        let a: ElementId = alloc.next();
        let b: ElementId = alloc.next();
        let c: ElementId = alloc.next();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(a < b && b < c, "handles should be issued in increasing order");
    }

    #[test]
    fn handles_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&ElementId::new(5)).unwrap();
        assert_eq!(json, "5");
    }
}
