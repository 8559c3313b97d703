//! Compact renumbering of the states of a finished transformation.

use std::collections::BTreeMap;

use bit_vec::BitVec;

use crate::dfa::{DFAState, DFATables};
use crate::nfa::StateNumber;

/// Maps every key to its rank among the sorted keys.
///
/// Must be called once, after the state set is final: the numbering of a
/// key depends on all the other keys.
pub fn canonicalize<'k, K, I>(keys: I) -> BTreeMap<&'k K, StateNumber>
where
    K: Ord + 'k,
    I: IntoIterator<Item = &'k K>,
{
    let mut mapping: BTreeMap<&K, StateNumber> = keys.into_iter().map(|k| (k, 0)).collect();
    for (number, slot) in mapping.values_mut().enumerate() {
        *slot = number;
    }
    mapping
}

/// Turns a key-ordered mapping into a table indexed by the old positions.
///
/// `keys[i]` is the key of old state `i`.
pub fn renumbering<K: Ord>(keys: &[K]) -> Vec<StateNumber> {
    let mapping = canonicalize(keys);
    keys.iter().map(|k| mapping[k]).collect()
}

/// A finished transition table whose states are still named by keys.
///
/// Rows, acceptance and the start state refer to states by their position
/// in `keys`.
pub(crate) struct KeyedTable<K> {
    pub keys: Vec<K>,
    pub rows: Vec<Vec<StateNumber>>,
    pub accepting: Vec<bool>,
    pub start: StateNumber,
}

impl<K: Ord> KeyedTable<K> {
    /// Rewrites every state reference through the sorted-key numbering.
    pub fn canonicalize(self) -> DFATables {
        let numbers = renumbering(&self.keys);

        let mut states: Vec<DFAState> = self.rows.iter().map(|_| DFAState::default()).collect();
        let mut finals = BitVec::from_elem(self.rows.len(), false);
        for (old, row) in self.rows.into_iter().enumerate() {
            states[numbers[old]] = DFAState {
                transitions: row.into_iter().map(|to| numbers[to]).collect(),
            };
            finals.set(numbers[old], self.accepting[old]);
        }

        DFATables {
            states: states.into_boxed_slice(),
            finals,
            start: numbers[self.start],
        }
    }
}
