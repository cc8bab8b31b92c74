//! Working-set entries and the scan hits they are created from

use super::{Address, ValueType};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Memory region an address was found in
///
/// The code and color are chosen by the scan engine and only carried through
/// for display; the code doubles as the range label in offset analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRangeTag {
    pub code: String,
    /// ARGB display color
    pub color: u32,
}

impl MemoryRangeTag {
    /// Creates a new range tag
    pub fn new(code: impl Into<String>, color: u32) -> Self {
        MemoryRangeTag {
            code: code.into(),
            color,
        }
    }

    /// Tag for addresses whose region could not be determined
    pub fn unknown() -> Self {
        MemoryRangeTag::new("O", 0xFF9E9E9E)
    }
}

/// Candidate address produced by the scan engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHit {
    pub address: Address,
    pub value_type: ValueType,
    pub range: MemoryRangeTag,
}

impl ScanHit {
    /// Creates a new scan hit
    pub fn new(address: Address, value_type: ValueType, range: MemoryRangeTag) -> Self {
        ScanHit {
            address,
            value_type,
            range,
        }
    }
}

/// One captured memory location in the working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressEntry {
    /// Stable identity, unique within a registry
    pub address: Address,
    pub name: String,
    pub value_type: ValueType,
    /// Last observed rendering of the value
    pub current_value: String,
    pub is_frozen: bool,
    pub range: MemoryRangeTag,
    /// Milliseconds since the Unix epoch
    pub captured_at: i64,
}

impl AddressEntry {
    /// Creates an unnamed, unfrozen entry captured now
    pub fn new(address: Address, value_type: ValueType, range: MemoryRangeTag) -> Self {
        AddressEntry {
            address,
            name: String::new(),
            value_type,
            current_value: String::new(),
            is_frozen: false,
            range,
            captured_at: now_millis(),
        }
    }

    /// Creates an entry from a scan hit
    pub fn from_hit(hit: ScanHit) -> Self {
        AddressEntry::new(hit.address, hit.value_type, hit.range)
    }

    /// Sets the user label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the last observed value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.current_value = value.into();
        self
    }

    /// Label shown for this entry, falling back to the address
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            self.address.to_string()
        } else {
            self.name.clone()
        }
    }
}

impl From<ScanHit> for AddressEntry {
    fn from(hit: ScanHit) -> Self {
        AddressEntry::from_hit(hit)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
