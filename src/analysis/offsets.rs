//! Offset and XOR analysis over a group of addresses
//!
//! Given a subset of working-set entries (usually the selection), computes
//! each member's offset from the lowest address, the gap to its predecessor,
//! and an XOR signature fingerprinting the relative layout. Used to spot
//! recurring structure layouts behind pointer chains.

use crate::core::types::{Address, AddressEntry, MemoryRangeTag, Offset, ValueType};
use serde::{Deserialize, Serialize};

/// One member of an analyzed group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetEntry {
    pub address: Address,
    pub range_label: String,
    /// Distance from the group base
    pub offset: Offset,
    /// Distance from the previous member; `None` for the base
    pub delta: Option<Offset>,
}

/// Result of [`analyze`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetAnalysis {
    pub base: Address,
    /// XOR of every offset except the base's
    pub xor_signature: Offset,
    /// Members ascending by address
    pub entries: Vec<OffsetEntry>,
}

impl OffsetAnalysis {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// XOR of the gaps between neighbours
    ///
    /// Kept apart from `xor_signature` until usage shows which of the two
    /// fingerprints recurring layouts better.
    pub fn delta_xor_signature(&self) -> Offset {
        self.entries
            .iter()
            .filter_map(|e| e.delta)
            .fold(0, |acc, d| acc ^ d)
    }
}

/// Analyzes an address group given in any order
///
/// An empty group yields the empty analysis (base 0, signature 0).
pub fn analyze<'a, I>(entries: I) -> OffsetAnalysis
where
    I: IntoIterator<Item = &'a AddressEntry>,
{
    let mut members: Vec<(Address, &str)> = entries
        .into_iter()
        .map(|e| (e.address, e.range.code.as_str()))
        .collect();
    members.sort_by_key(|(address, _)| *address);

    let Some(&(base, _)) = members.first() else {
        return OffsetAnalysis::default();
    };

    let mut previous: Option<Address> = None;
    let entries: Vec<OffsetEntry> = members
        .iter()
        .map(|&(address, label)| {
            let delta = previous.map(|p| address.offset_from(p));
            previous = Some(address);
            OffsetEntry {
                address,
                range_label: label.to_string(),
                offset: address.offset_from(base),
                delta,
            }
        })
        .collect();

    let xor_signature = entries.iter().skip(1).fold(0, |acc, e| acc ^ e.offset);

    OffsetAnalysis {
        base,
        xor_signature,
        entries,
    }
}

/// Analyzes bare addresses, labelling every member with `range_label`
pub fn analyze_addresses<I>(addresses: I, range_label: &str) -> OffsetAnalysis
where
    I: IntoIterator<Item = Address>,
{
    let entries: Vec<AddressEntry> = addresses
        .into_iter()
        .map(|address| AddressEntry {
            address,
            name: String::new(),
            value_type: ValueType::Dword,
            current_value: String::new(),
            is_frozen: false,
            range: MemoryRangeTag::new(range_label, 0),
            captured_at: 0,
        })
        .collect();
    analyze(&entries)
}

/// Renders a signed offset as a prefixed hex magnitude (`+0x20`, `-0x10`)
pub fn format_signed_hex(value: Offset) -> String {
    let sign = if value < 0 { '-' } else { '+' };
    format!("{}0x{:X}", sign, value.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addrs(raw: &[u64]) -> Vec<Address> {
        raw.iter().copied().map(Address::new).collect()
    }

    #[test]
    fn test_three_member_group() {
        let analysis = analyze_addresses(addrs(&[0x130, 0x100, 0x120]), "Ca");

        assert_eq!(analysis.base, Address::new(0x100));
        let offsets: Vec<i64> = analysis.entries.iter().map(|e| e.offset).collect();
        let deltas: Vec<Option<i64>> = analysis.entries.iter().map(|e| e.delta).collect();
        assert_eq!(offsets, vec![0x0, 0x20, 0x30]);
        assert_eq!(deltas, vec![None, Some(0x20), Some(0x10)]);
        assert_eq!(analysis.xor_signature, 0x20 ^ 0x30);
        assert_eq!(analysis.xor_signature, 0x10);
        assert!(analysis.entries.iter().all(|e| e.range_label == "Ca"));
    }

    #[test]
    fn test_single_member_group() {
        let analysis = analyze_addresses(addrs(&[0x500]), "A");

        assert_eq!(analysis.base, Address::new(0x500));
        assert_eq!(analysis.len(), 1);
        assert_eq!(analysis.entries[0].offset, 0);
        assert_eq!(analysis.entries[0].delta, None);
        assert_eq!(analysis.xor_signature, 0);
    }

    #[test]
    fn test_empty_group() {
        let analysis = analyze_addresses(Vec::new(), "A");
        assert!(analysis.is_empty());
        assert_eq!(analysis, OffsetAnalysis::default());
        assert_eq!(analysis.base, Address::null());
        assert_eq!(analysis.xor_signature, 0);
    }

    #[test]
    fn test_delta_signature_is_separate() {
        let analysis = analyze_addresses(addrs(&[0x100, 0x120, 0x130]), "A");
        assert_eq!(analysis.delta_xor_signature(), 0x20 ^ 0x10);
        assert_ne!(analysis.delta_xor_signature(), analysis.xor_signature);
    }

    #[test]
    fn test_high_addresses_wrap_into_signed_range() {
        let analysis = analyze_addresses(addrs(&[0x10, u64::MAX]), "A");
        assert_eq!(analysis.entries[1].offset, (u64::MAX - 0x10) as i64);
    }

    #[test]
    fn test_format_signed_hex() {
        assert_eq!(format_signed_hex(0x20), "+0x20");
        assert_eq!(format_signed_hex(0), "+0x0");
        assert_eq!(format_signed_hex(-0x10), "-0x10");
        assert_eq!(format_signed_hex(i64::MIN), "-0x8000000000000000");
    }
}
