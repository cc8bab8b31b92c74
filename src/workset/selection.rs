//! Complement-set selection over working-set identities
//!
//! Selection is stored as a mode plus a small exception set: in
//! [`SelectionState::Inclusive`] the set holds the selected ids, in
//! [`SelectionState::Exclusive`] it holds the deselected ids. Bulk operations
//! therefore never touch every entry.

use super::events::WorksetEvent;
use crate::core::types::{Address, AddressEntry};
use std::collections::HashSet;
use tracing::debug;

/// Selection membership representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    /// Only the ids in the set are selected
    Inclusive(HashSet<Address>),
    /// Every id except those in the set is selected
    Exclusive(HashSet<Address>),
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::Inclusive(HashSet::new())
    }
}

impl SelectionState {
    /// Whether every id is treated as selected unless excepted
    pub fn all_selected_flag(&self) -> bool {
        matches!(self, SelectionState::Exclusive(_))
    }

    pub fn exceptions(&self) -> &HashSet<Address> {
        match self {
            SelectionState::Inclusive(set) | SelectionState::Exclusive(set) => set,
        }
    }

    fn exceptions_mut(&mut self) -> &mut HashSet<Address> {
        match self {
            SelectionState::Inclusive(set) | SelectionState::Exclusive(set) => set,
        }
    }
}

/// Tracks which registry entries are selected
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    state: SelectionState,
    total: usize,
}

impl SelectionModel {
    /// Creates an empty selection over `total` entries
    pub fn new(total: usize) -> Self {
        SelectionModel {
            state: SelectionState::default(),
            total,
        }
    }

    /// Current representation
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Number of entries in the registry this selection refers to
    pub fn total(&self) -> usize {
        self.total
    }

    /// Keeps the registry size in sync for `selected_count`
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn exception_len(&self) -> usize {
        self.state.exceptions().len()
    }

    pub fn is_selected(&self, id: Address) -> bool {
        match &self.state {
            SelectionState::Inclusive(set) => set.contains(&id),
            SelectionState::Exclusive(set) => !set.contains(&id),
        }
    }

    pub fn selected_count(&self) -> usize {
        match &self.state {
            SelectionState::Inclusive(set) => set.len(),
            SelectionState::Exclusive(set) => self.total.saturating_sub(set.len()),
        }
    }

    /// Selected count over a registry of `total` entries, ignoring
    /// exceptions that `is_member` rejects
    pub fn selected_count_within<F>(&self, total: usize, is_member: F) -> usize
    where
        F: Fn(Address) -> bool,
    {
        let excepted = self
            .state
            .exceptions()
            .iter()
            .filter(|id| is_member(**id))
            .count();
        match &self.state {
            SelectionState::Inclusive(_) => excepted,
            SelectionState::Exclusive(_) => total.saturating_sub(excepted),
        }
    }

    /// Sets the membership of one id
    ///
    /// Ids unknown to the registry are tracked all the same.
    pub fn toggle(&mut self, id: Address, selected: bool) -> Option<WorksetEvent> {
        let changed = match &mut self.state {
            SelectionState::Inclusive(set) if selected => set.insert(id),
            SelectionState::Inclusive(set) => set.remove(&id),
            SelectionState::Exclusive(set) if selected => set.remove(&id),
            SelectionState::Exclusive(set) => set.insert(id),
        };

        if !changed {
            return None;
        }
        debug!(address = %id, selected, "selection toggled");
        Some(self.changed(Some(vec![id])))
    }

    pub fn select_all(&mut self) -> Option<WorksetEvent> {
        if matches!(&self.state, SelectionState::Exclusive(set) if set.is_empty()) {
            return None;
        }
        self.state = SelectionState::Exclusive(HashSet::new());
        debug!(total = self.total, "select all");
        Some(self.changed(None))
    }

    pub fn deselect_all(&mut self) -> Option<WorksetEvent> {
        if matches!(&self.state, SelectionState::Inclusive(set) if set.is_empty()) {
            return None;
        }
        self.state = SelectionState::Inclusive(HashSet::new());
        debug!("deselect all");
        Some(self.changed(None))
    }

    /// Flips every membership by swapping the mode; the set is reused as is
    pub fn invert(&mut self) -> Option<WorksetEvent> {
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            SelectionState::Inclusive(set) => SelectionState::Exclusive(set),
            SelectionState::Exclusive(set) => SelectionState::Inclusive(set),
        };
        debug!(selected = self.selected_count(), "selection inverted");
        Some(self.changed(None))
    }

    /// Clears everything after the registry was replaced; emits nothing
    pub fn reset(&mut self, total: usize) {
        self.state = SelectionState::default();
        self.total = total;
    }

    /// Drops an id that left the registry
    pub fn forget(&mut self, id: Address) {
        self.state.exceptions_mut().remove(&id);
    }

    /// Switches to the complement representation when the exception set is
    /// the larger side
    ///
    /// `universe` must yield every registry id; this is O(n) and meant to be
    /// called only once the exception set has outgrown half of the registry.
    pub fn rebalance<I>(&mut self, universe: I) -> bool
    where
        I: IntoIterator<Item = Address>,
    {
        let exceptions = self.exception_len();
        if exceptions * 2 <= self.total {
            return false;
        }

        let state = std::mem::take(&mut self.state);
        self.state = match state {
            SelectionState::Inclusive(set) => SelectionState::Exclusive(
                universe.into_iter().filter(|id| !set.contains(id)).collect(),
            ),
            SelectionState::Exclusive(set) => SelectionState::Inclusive(
                universe.into_iter().filter(|id| !set.contains(id)).collect(),
            ),
        };
        debug!(
            from = exceptions,
            to = self.exception_len(),
            "selection rebalanced"
        );
        true
    }

    /// Selected entries in registry order
    pub fn selected_items<'a>(&self, entries: &'a [AddressEntry]) -> Vec<&'a AddressEntry> {
        entries.iter().filter(|e| self.is_selected(e.address)).collect()
    }

    fn changed(&self, affected: Option<Vec<Address>>) -> WorksetEvent {
        WorksetEvent::SelectionChanged {
            selected_count: self.selected_count(),
            affected,
        }
    }
}
