//! Property tests for the complement-set selection model

use memory_workset::core::types::{Address, AddressEntry, MemoryRangeTag, ValueType};
use memory_workset::workset::{EventLog, SelectionModel, Workset, WorksetEvent};
use proptest::prelude::*;
use std::collections::BTreeSet;

const TOTAL: u64 = 24;
/// Ids in `TOTAL..TOTAL + UNKNOWN` are never in the registry
const UNKNOWN: u64 = 8;

#[derive(Debug, Clone)]
enum Op {
    Toggle(u64, bool),
    SelectAll,
    DeselectAll,
    Invert,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..TOTAL, any::<bool>()).prop_map(|(id, selected)| Op::Toggle(id, selected)),
        1 => Just(Op::SelectAll),
        1 => Just(Op::DeselectAll),
        1 => Just(Op::Invert),
    ]
}

/// Like `op`, but toggles may target ids the registry does not hold
fn op_with_unknown() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0..TOTAL + UNKNOWN, any::<bool>()).prop_map(|(id, selected)| Op::Toggle(id, selected)),
        1 => Just(Op::SelectAll),
        1 => Just(Op::DeselectAll),
        1 => Just(Op::Invert),
    ]
}

/// Expected selection of registry ids; toggles of unknown ids change nothing
fn apply_expected(expected: &mut BTreeSet<u64>, op: &Op) {
    match *op {
        Op::Toggle(i, _) if i >= TOTAL => {}
        Op::Toggle(i, true) => {
            expected.insert(i);
        }
        Op::Toggle(i, false) => {
            expected.remove(&i);
        }
        Op::SelectAll => expected.extend(0..TOTAL),
        Op::DeselectAll => expected.clear(),
        Op::Invert => *expected = (0..TOTAL).filter(|i| !expected.contains(i)).collect(),
    }
}

fn ids() -> impl Iterator<Item = Address> {
    (0..TOTAL).map(|i| Address::new(0x1000 + i * 4))
}

fn id(i: u64) -> Address {
    Address::new(0x1000 + i * 4)
}

fn populated_workset() -> Workset {
    let mut workset = Workset::new();
    workset.replace_all(
        ids()
            .map(|a| AddressEntry::new(a, ValueType::Dword, MemoryRangeTag::unknown()))
            .collect(),
    );
    workset
}

fn apply_model(selection: &mut SelectionModel, op: &Op) {
    match *op {
        Op::Toggle(i, selected) => {
            selection.toggle(id(i), selected);
        }
        Op::SelectAll => {
            selection.select_all();
        }
        Op::DeselectAll => {
            selection.deselect_all();
        }
        Op::Invert => {
            selection.invert();
        }
    }
}

fn apply_workset(workset: &mut Workset, op: &Op) {
    match *op {
        Op::Toggle(i, selected) => workset.toggle(id(i), selected),
        Op::SelectAll => workset.select_all(),
        Op::DeselectAll => workset.deselect_all(),
        Op::Invert => workset.invert_selection(),
    }
}

#[cfg(test)]
mod model_properties {
    use super::*;

    proptest! {
        #[test]
        fn count_matches_membership(ops in prop::collection::vec(op(), 0..64)) {
            let mut selection = SelectionModel::new(TOTAL as usize);
            for op in &ops {
                apply_model(&mut selection, op);

                let members = ids().filter(|a| selection.is_selected(*a)).count();
                prop_assert_eq!(selection.selected_count(), members);

                let selected = selection.selected_count();
                let unselected = TOTAL as usize - selected;
                prop_assert!(selection.exception_len() <= selected.max(unselected));
            }
        }

        #[test]
        fn double_invert_is_identity(ops in prop::collection::vec(op(), 0..32)) {
            let mut selection = SelectionModel::new(TOTAL as usize);
            for op in &ops {
                apply_model(&mut selection, op);
            }

            let before = selection.state().clone();
            selection.invert();
            selection.invert();
            prop_assert_eq!(selection.state(), &before);
        }
    }
}

#[cfg(test)]
mod workset_properties {
    use super::*;

    proptest! {
        #[test]
        fn exceptions_stay_on_smaller_side(ops in prop::collection::vec(op(), 0..64)) {
            let mut workset = populated_workset();
            for op in &ops {
                apply_workset(&mut workset, op);

                let members = workset
                    .entries()
                    .iter()
                    .filter(|e| workset.is_selected(e.address))
                    .count();
                prop_assert_eq!(workset.selected_count(), members);
                prop_assert_eq!(workset.selected_items().len(), members);

                let selected = workset.selected_count();
                let unselected = TOTAL as usize - selected;
                prop_assert!(workset.selection().exception_len() <= selected.min(unselected));
            }
        }

        #[test]
        fn replace_always_clears(ops in prop::collection::vec(op(), 1..32)) {
            let mut workset = populated_workset();
            for op in &ops {
                apply_workset(&mut workset, op);
            }

            workset.replace_all(Vec::new());
            prop_assert_eq!(workset.selected_count(), 0);
            prop_assert_eq!(workset.selection().exception_len(), 0);
            prop_assert!(!workset.selection().state().all_selected_flag());
        }
    }
}

#[cfg(test)]
mod unknown_id_properties {
    use super::*;

    proptest! {
        #[test]
        fn unknown_ids_leave_registry_selection_alone(
            ops in prop::collection::vec(op_with_unknown(), 0..64)
        ) {
            let mut workset = populated_workset();
            let log = EventLog::new();
            workset.subscribe(log.clone());
            let mut expected = BTreeSet::new();

            for op in &ops {
                apply_workset(&mut workset, op);
                apply_expected(&mut expected, op);

                let selected: BTreeSet<u64> = (0..TOTAL)
                    .filter(|i| workset.is_selected(id(*i)))
                    .collect();
                prop_assert_eq!(&selected, &expected);
                prop_assert_eq!(workset.selected_count(), expected.len());
                prop_assert_eq!(workset.selected_items().len(), expected.len());

                if let Some(WorksetEvent::SelectionChanged { selected_count, .. }) = log.take().last() {
                    prop_assert_eq!(*selected_count, expected.len());
                }
            }
        }

        #[test]
        fn empty_registry_never_selects_later_inserts(
            toggles in prop::collection::vec((0..TOTAL, any::<bool>()), 0..32)
        ) {
            let mut workset = Workset::new();
            let mut toggled_on = BTreeSet::new();
            for (i, selected) in &toggles {
                workset.toggle(id(*i), *selected);
                if *selected {
                    toggled_on.insert(*i);
                } else {
                    toggled_on.remove(i);
                }
            }
            prop_assert!(!workset.selection().state().all_selected_flag());

            for a in ids() {
                workset
                    .insert(AddressEntry::new(a, ValueType::Dword, MemoryRangeTag::unknown()))
                    .unwrap();
            }
            for i in 0..TOTAL {
                prop_assert_eq!(workset.is_selected(id(i)), toggled_on.contains(&i));
            }
            prop_assert_eq!(workset.selected_count(), toggled_on.len());
        }
    }
}
