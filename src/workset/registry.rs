//! Address registry: the sorted, unique-by-address working set
//!
//! Every mutator returns the notification the change implies instead of
//! dispatching it, so the registry stays a plain single-owner value.

use super::events::WorksetEvent;
use crate::core::types::{Address, AddressEntry, ValueType, WorksetError, WorksetResult};
use rayon::prelude::*;
use tracing::debug;

/// Batches larger than this are sorted on the rayon pool by default
pub const DEFAULT_PARALLEL_SORT_THRESHOLD: usize = 4096;

/// Working set of captured addresses, kept sorted ascending by address
#[derive(Debug, Clone)]
pub struct AddressRegistry {
    entries: Vec<AddressEntry>,
    parallel_sort_threshold: usize,
}

impl Default for AddressRegistry {
    fn default() -> Self {
        AddressRegistry::new()
    }
}

impl AddressRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        AddressRegistry {
            entries: Vec::new(),
            parallel_sort_threshold: DEFAULT_PARALLEL_SORT_THRESHOLD,
        }
    }

    /// Creates an empty registry with a custom parallel sort threshold
    pub fn with_parallel_sort_threshold(threshold: usize) -> Self {
        AddressRegistry {
            entries: Vec::new(),
            parallel_sort_threshold: threshold.max(1),
        }
    }

    /// Discards the current set and adopts `entries`
    ///
    /// Duplicate addresses in the batch collapse to their last occurrence.
    /// Reports the old extent as removed and the new one as inserted.
    pub fn replace_all(&mut self, entries: Vec<AddressEntry>) -> WorksetEvent {
        let old_len = self.entries.len();

        // Reversed so that the stable sort + dedup keeps the last occurrence
        let mut entries = entries;
        entries.reverse();
        if entries.len() > self.parallel_sort_threshold {
            entries.par_sort_by_key(|e| e.address);
        } else {
            entries.sort_by_key(|e| e.address);
        }
        entries.dedup_by_key(|e| e.address);

        self.entries = entries;
        debug!(old = old_len, new = self.entries.len(), "registry replaced");

        WorksetEvent::RegistryReplaced {
            old_extent: 0..old_len,
            new_extent: 0..self.entries.len(),
        }
    }

    /// Inserts a new entry at its sorted position
    pub fn insert(&mut self, entry: AddressEntry) -> WorksetResult<WorksetEvent> {
        match self.position(entry.address) {
            Ok(_) => Err(WorksetError::DuplicateAddress(entry.address)),
            Err(index) => {
                debug!(address = %entry.address, index, "registry insert");
                self.entries.insert(index, entry);
                Ok(self.full_range())
            }
        }
    }

    /// Replaces the entry with the same address
    pub fn update(&mut self, entry: AddressEntry) -> WorksetResult<WorksetEvent> {
        let index = self
            .position(entry.address)
            .map_err(|_| WorksetError::NotFound(entry.address))?;
        debug!(address = %entry.address, index, "registry update");
        // Identity is unchanged, so the sort order already holds
        self.entries[index] = entry;
        Ok(self.full_range())
    }

    /// Removes an entry; absent addresses are ignored
    pub fn delete(&mut self, address: Address) -> Option<WorksetEvent> {
        let index = self.position(address).ok()?;
        let removed = self.entries.remove(index);
        debug!(address = %removed.address, index, "registry delete");
        Some(WorksetEvent::RegistryChanged {
            range: 0..self.entries.len() + 1,
        })
    }

    /// Applies a change to one entry in place
    ///
    /// The closure cannot move the entry to a different address.
    pub fn modify<F>(&mut self, address: Address, f: F) -> WorksetResult<WorksetEvent>
    where
        F: FnOnce(&mut AddressEntry),
    {
        let index = self
            .position(address)
            .map_err(|_| WorksetError::NotFound(address))?;
        let entry = &mut self.entries[index];
        f(entry);
        entry.address = address;
        Ok(self.full_range())
    }

    /// Renames an entry
    pub fn rename(&mut self, address: Address, name: impl Into<String>) -> WorksetResult<WorksetEvent> {
        let name = name.into();
        self.modify(address, |e| e.name = name)
    }

    /// Marks an entry as frozen or not
    pub fn set_frozen(&mut self, address: Address, frozen: bool) -> WorksetResult<WorksetEvent> {
        self.modify(address, |e| e.is_frozen = frozen)
    }

    /// Stores freshly read values for addresses that are still present
    ///
    /// Addresses that vanished while the values were being read are skipped.
    pub fn apply_values<I>(&mut self, values: I) -> Option<WorksetEvent>
    where
        I: IntoIterator<Item = (Address, String)>,
    {
        let mut changed = 0usize;
        for (address, value) in values {
            if let Ok(index) = self.position(address) {
                let entry = &mut self.entries[index];
                if entry.current_value != value {
                    entry.current_value = value;
                    changed += 1;
                }
            }
        }

        if changed == 0 {
            return None;
        }
        debug!(changed, "registry values refreshed");
        Some(self.full_range())
    }

    /// Read-only view of the sorted entries
    pub fn entries(&self) -> &[AddressEntry] {
        &self.entries
    }

    /// Looks up an entry by address
    pub fn get(&self, address: Address) -> Option<&AddressEntry> {
        self.position(address).ok().map(|i| &self.entries[i])
    }

    pub fn contains(&self, address: Address) -> bool {
        self.position(address).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identities in sort order
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.entries.iter().map(|e| e.address)
    }

    /// `(address, value type)` pairs for the value refresher
    pub fn read_targets(&self) -> Vec<(Address, ValueType)> {
        self.entries.iter().map(|e| (e.address, e.value_type)).collect()
    }

    fn position(&self, address: Address) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&address, |e| e.address)
    }

    fn full_range(&self) -> WorksetEvent {
        WorksetEvent::RegistryChanged {
            range: 0..self.entries.len(),
        }
    }
}
