//! Working set: registry, selection and change notification
//!
//! [`Workset`] owns an [`AddressRegistry`] and the [`SelectionModel`] keyed
//! off its identities. It keeps the two consistent (a full replace resets
//! the selection, a delete prunes it) and forwards every change to the
//! registered [`WorksetListener`]s.
//!
//! A `Workset` is a single-owner value with no internal locking. Producers
//! on other tasks go through [`WorksetHandle`], which hands commands to the
//! [`WorksetActor`] that owns the workset.

pub mod actor;
pub mod events;
pub mod refresh;
pub mod registry;
pub mod selection;

pub use actor::{WorksetActor, WorksetCommand, WorksetHandle, WorksetSnapshot};
pub use events::{EventLog, WorksetEvent, WorksetListener};
pub use refresh::{read_values, MemoryAccess, ValueRefresher};
#[cfg(target_os = "linux")]
pub use refresh::ProcMemory;
pub use registry::AddressRegistry;
pub use selection::{SelectionModel, SelectionState};

use crate::core::types::{Address, AddressEntry, WorksetResult};

/// Registry plus selection, with listeners
#[derive(Default)]
pub struct Workset {
    registry: AddressRegistry,
    selection: SelectionModel,
    listeners: Vec<Box<dyn WorksetListener>>,
}

impl std::fmt::Debug for Workset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workset")
            .field("registry", &self.registry)
            .field("selection", &self.selection)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Workset {
    /// Creates an empty working set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a working set around a preconfigured registry
    pub fn with_registry(registry: AddressRegistry) -> Self {
        let selection = SelectionModel::new(registry.len());
        Workset {
            registry,
            selection,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for subsequent changes
    pub fn subscribe(&mut self, listener: impl WorksetListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn registry(&self) -> &AddressRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Sorted entries
    pub fn entries(&self) -> &[AddressEntry] {
        self.registry.entries()
    }

    /// Adopts a new batch and clears the selection
    pub fn replace_all(&mut self, entries: Vec<AddressEntry>) {
        let had_selection = self.selection.selected_count() > 0;
        let event = self.registry.replace_all(entries);
        self.selection.reset(self.registry.len());
        self.emit(event);
        if had_selection {
            self.emit(WorksetEvent::SelectionChanged {
                selected_count: 0,
                affected: None,
            });
        }
    }

    pub fn insert(&mut self, entry: AddressEntry) -> WorksetResult<()> {
        let event = self.registry.insert(entry)?;
        self.selection.set_total(self.registry.len());
        self.emit(event);
        Ok(())
    }

    pub fn update(&mut self, entry: AddressEntry) -> WorksetResult<()> {
        let event = self.registry.update(entry)?;
        self.emit(event);
        Ok(())
    }

    pub fn rename(&mut self, address: Address, name: impl Into<String>) -> WorksetResult<()> {
        let event = self.registry.rename(address, name)?;
        self.emit(event);
        Ok(())
    }

    pub fn set_frozen(&mut self, address: Address, frozen: bool) -> WorksetResult<()> {
        let event = self.registry.set_frozen(address, frozen)?;
        self.emit(event);
        Ok(())
    }

    /// Removes an entry and its selection membership; absent ids are ignored
    pub fn delete(&mut self, address: Address) {
        let was_selected = self.selection.is_selected(address);
        let Some(event) = self.registry.delete(address) else {
            return;
        };
        self.selection.forget(address);
        self.selection.set_total(self.registry.len());
        self.emit(event);
        if was_selected {
            self.emit_selection(Some(vec![address]));
        }
    }

    /// Stores values read by the refresher
    pub fn apply_values(&mut self, values: Vec<(Address, String)>) {
        if let Some(event) = self.registry.apply_values(values) {
            self.emit(event);
        }
    }

    pub fn is_selected(&self, id: Address) -> bool {
        self.selection.is_selected(id)
    }

    /// Selected registry entries; ids the registry does not hold are not counted
    pub fn selected_count(&self) -> usize {
        self.selection
            .selected_count_within(self.registry.len(), |id| self.registry.contains(id))
    }

    /// Sets one membership, then keeps the exception set on the smaller side
    ///
    /// The complement swap only happens while every exception is a registry
    /// id, so ids the registry does not hold keep their recorded membership.
    pub fn toggle(&mut self, id: Address, selected: bool) {
        if self.selection.toggle(id, selected).is_none() {
            return;
        }

        let registry = &self.registry;
        let exceptions = self.selection.state().exceptions();
        if !registry.is_empty()
            && exceptions.len() * 2 > registry.len()
            && exceptions.iter().all(|e| registry.contains(*e))
        {
            self.selection.rebalance(registry.addresses());
        }
        self.emit_selection(Some(vec![id]));
    }

    pub fn select_all(&mut self) {
        if self.selection.select_all().is_some() {
            self.emit_selection(None);
        }
    }

    pub fn deselect_all(&mut self) {
        if self.selection.deselect_all().is_some() {
            self.emit_selection(None);
        }
    }

    pub fn invert_selection(&mut self) {
        if self.selection.invert().is_some() {
            self.emit_selection(None);
        }
    }

    /// Selected entries in registry order
    pub fn selected_items(&self) -> Vec<&AddressEntry> {
        self.selection.selected_items(self.registry.entries())
    }

    /// Notifies with the count as it stands after the operation
    fn emit_selection(&mut self, affected: Option<Vec<Address>>) {
        let selected_count = self.selected_count();
        self.emit(WorksetEvent::SelectionChanged {
            selected_count,
            affected,
        });
    }

    fn emit(&mut self, event: WorksetEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}
