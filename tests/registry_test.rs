//! Registry ordering and identity tests

use memory_workset::core::types::{
    Address, AddressEntry, MemoryRangeTag, ScanHit, ValueType, WorksetError,
};
use memory_workset::workset::{AddressRegistry, EventLog, Workset, WorksetEvent};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn entry(address: u64) -> AddressEntry {
    AddressEntry::new(Address::new(address), ValueType::Qword, MemoryRangeTag::new("Cd", 0xFFFF5722))
}

#[derive(Debug, Clone)]
enum Op {
    Replace(Vec<u64>),
    Insert(u64),
    Update(u64),
    Delete(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => prop::collection::vec(0u64..64, 0..16).prop_map(Op::Replace),
        4 => (0u64..64).prop_map(Op::Insert),
        2 => (0u64..64).prop_map(Op::Update),
        2 => (0u64..64).prop_map(Op::Delete),
    ]
}

fn snapshot(registry: &AddressRegistry) -> Vec<AddressEntry> {
    registry.entries().to_vec()
}

#[cfg(test)]
mod registry_properties {
    use super::*;
    use pretty_assertions::assert_eq;

    proptest! {
        #[test]
        fn stays_sorted_and_unique(ops in prop::collection::vec(op(), 0..48)) {
            let mut registry = AddressRegistry::new();
            for op in ops {
                match op {
                    Op::Replace(batch) => {
                        registry.replace_all(batch.into_iter().map(entry).collect());
                    }
                    Op::Insert(a) => {
                        let before = snapshot(&registry);
                        let present = registry.contains(Address::new(a));
                        let result = registry.insert(entry(a));
                        if present {
                            let is_duplicate = matches!(result, Err(WorksetError::DuplicateAddress(_)));
                            prop_assert!(is_duplicate);
                            prop_assert_eq!(snapshot(&registry), before);
                        } else {
                            prop_assert!(result.is_ok());
                        }
                    }
                    Op::Update(a) => {
                        let present = registry.contains(Address::new(a));
                        let result = registry.update(entry(a).with_name("updated"));
                        prop_assert_eq!(result.is_ok(), present);
                    }
                    Op::Delete(a) => {
                        registry.delete(Address::new(a));
                        prop_assert!(!registry.contains(Address::new(a)));
                    }
                }

                let addresses: Vec<Address> = registry.addresses().collect();
                prop_assert!(addresses.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}

#[cfg(test)]
mod registry_notifications {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_is_remove_then_insert() {
        let mut workset = Workset::new();
        let log = EventLog::new();
        workset.subscribe(log.clone());

        workset.replace_all(vec![entry(3), entry(1)]);
        workset.replace_all(vec![entry(9), entry(8), entry(7)]);

        assert_eq!(
            log.take(),
            vec![
                WorksetEvent::RegistryReplaced {
                    old_extent: 0..0,
                    new_extent: 0..2,
                },
                WorksetEvent::RegistryReplaced {
                    old_extent: 0..2,
                    new_extent: 0..3,
                },
            ]
        );
    }

    #[test]
    fn test_insert_and_update_report_full_range() {
        let mut workset = Workset::new();
        workset.replace_all(vec![entry(0x10), entry(0x30)]);
        let log = EventLog::new();
        workset.subscribe(log.clone());

        workset.insert(entry(0x20)).unwrap();
        workset.update(entry(0x20).with_value("7")).unwrap();

        assert_eq!(
            log.take(),
            vec![
                WorksetEvent::RegistryChanged { range: 0..3 },
                WorksetEvent::RegistryChanged { range: 0..3 },
            ]
        );
    }

    #[test]
    fn test_update_missing_surfaces_not_found() {
        let mut workset = Workset::new();
        let err = workset.update(entry(0x40)).unwrap_err();
        assert!(matches!(err, WorksetError::NotFound(a) if a == Address::new(0x40)));
    }

    #[test]
    fn test_scan_hits_become_entries() {
        let hits = vec![
            ScanHit::new(Address::new(0x2000), ValueType::Float, MemoryRangeTag::new("Ca", 0)),
            ScanHit::new(Address::new(0x1000), ValueType::Dword, MemoryRangeTag::new("Ch", 0)),
        ];
        let mut registry = AddressRegistry::new();
        registry.replace_all(hits.into_iter().map(AddressEntry::from).collect());

        assert_eq!(registry.entries()[0].address, Address::new(0x1000));
        assert_eq!(registry.entries()[0].range.code, "Ch");
        assert_eq!(registry.entries()[1].value_type, ValueType::Float);
    }
}
