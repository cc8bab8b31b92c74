//! Change notifications emitted to the presentation layer

use crate::core::types::Address;
use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard};

/// What changed in the working set
///
/// Index ranges are rendering hints only; all transient state is keyed by
/// [`Address`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorksetEvent {
    /// The whole registry was swapped out
    RegistryReplaced {
        old_extent: Range<usize>,
        new_extent: Range<usize>,
    },
    /// Some entries in `range` changed, moved, appeared or disappeared
    RegistryChanged { range: Range<usize> },
    /// Selection membership changed
    SelectionChanged {
        selected_count: usize,
        /// Ids whose membership flipped; `None` for bulk operations
        affected: Option<Vec<Address>>,
    },
}

/// Receiver of working-set notifications
pub trait WorksetListener: Send {
    fn on_event(&mut self, event: &WorksetEvent);
}

impl<F> WorksetListener for F
where
    F: FnMut(&WorksetEvent) + Send,
{
    fn on_event(&mut self, event: &WorksetEvent) {
        self(event)
    }
}

/// Listener that records every event; clones share the same log
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Arc<Mutex<Vec<WorksetEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the recorded events
    pub fn take(&self) -> Vec<WorksetEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<WorksetEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WorksetListener for EventLog {
    fn on_event(&mut self, event: &WorksetEvent) {
        self.lock().push(event.clone());
    }
}
