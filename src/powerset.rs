//! Subset construction: NFA to total DFA.

use std::collections::HashMap;

use bit_set::BitSet;
use log::trace;

use crate::canonical::KeyedTable;
use crate::dfa::DFATables;
use crate::nfa::{StateNumber, NFA};

/// Name of a discovered DFA state before canonicalization.
///
/// The dead state sorts after every subset.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum SubsetKey {
    /// Sorted NFA states of the subset.
    Members(Vec<StateNumber>),
    Dead,
}

struct Subset {
    key: SubsetKey,
    members: BitSet,
}

/// Worklist-driven subset construction over the sorted `alphabet`.
///
/// An empty target subset is routed to a dead state that is created the
/// first time it is needed.
pub(crate) fn subset_construction(nfa: &NFA, alphabet: &[char]) -> DFATables {
    let closures = nfa.epsilon_closures();
    let nfa_final = nfa.final_state();

    // arena of discovered states, in discovery order
    let mut subsets: Vec<Subset> = Vec::new();
    let mut rows: Vec<Vec<StateNumber>> = Vec::new();
    let mut index: HashMap<SubsetKey, StateNumber> = HashMap::new();
    let mut dead: Option<StateNumber> = None;

    let start_members = closures[nfa.start_state()].clone();
    let start_key = SubsetKey::Members(start_members.iter().collect());
    index.insert(start_key.clone(), 0);
    subsets.push(Subset {
        key: start_key,
        members: start_members,
    });
    rows.push(Vec::new());

    let mut worklist = vec![0];
    while let Some(current) = worklist.pop() {
        let mut row = Vec::with_capacity(alphabet.len());

        for &symbol in alphabet {
            let mut target = BitSet::with_capacity(closures.len());
            for state in subsets[current].members.iter() {
                if let Some(next) = nfa.targets(state, symbol) {
                    for &to in next {
                        target.union_with(&closures[to]);
                    }
                }
            }

            let to = if target.is_empty() {
                match dead {
                    Some(dead) => dead,
                    None => {
                        let id = subsets.len();
                        trace!("Add dead state: {}", id);
                        subsets.push(Subset {
                            key: SubsetKey::Dead,
                            members: BitSet::new(),
                        });
                        rows.push(vec![id; alphabet.len()]);
                        dead = Some(id);
                        id
                    }
                }
            } else {
                let key = SubsetKey::Members(target.iter().collect());
                match index.get(&key) {
                    Some(&id) => id,
                    None => {
                        let id = subsets.len();
                        trace!("Add state: {}: {:?}", id, key);
                        index.insert(key.clone(), id);
                        subsets.push(Subset {
                            key,
                            members: target,
                        });
                        rows.push(Vec::new());
                        worklist.push(id);
                        id
                    }
                }
            };
            row.push(to);
        }

        rows[current] = row;
    }

    let accepting = subsets
        .iter()
        .map(|subset| subset.members.contains(nfa_final))
        .collect();
    KeyedTable {
        keys: subsets.into_iter().map(|subset| subset.key).collect(),
        rows,
        accepting,
        start: 0,
    }
    .canonicalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_state_sorts_last() {
        assert!(SubsetKey::Members(vec![9, 10]) < SubsetKey::Dead);
        assert!(SubsetKey::Members(vec![0, 1]) < SubsetKey::Members(vec![0, 2]));
    }

    #[test]
    fn union_subsets() {
        // start {0,2,4}, {1,5} on a, {3,5} on b, dead
        let nfa = NFA::new("a+b").unwrap();
        let tables = subset_construction(&nfa, &['a', 'b']);
        assert_eq!(tables.states.len(), 4);
        assert_eq!(tables.start, 0);
        assert_eq!(&*tables.states[0].transitions, &[1, 2]);
        assert_eq!(&*tables.states[1].transitions, &[3, 3]);
        assert_eq!(&*tables.states[2].transitions, &[3, 3]);
        assert_eq!(&*tables.states[3].transitions, &[3, 3]);
        let finals: Vec<bool> = tables.finals.iter().collect();
        assert_eq!(finals, vec![false, true, true, false]);
    }

    #[test]
    fn closure_start_is_not_zero() {
        // subsets {0,1,2,4,5,7,8} {0,2,3,4,5,7,8} {0,2,4,6,7,8} {9} and dead
        let nfa = NFA::new("(a+b)*c").unwrap();
        let tables = subset_construction(&nfa, &['a', 'b', 'c']);
        assert_eq!(tables.states.len(), 5);
        assert_eq!(tables.start, 2);
        assert_eq!(&*tables.states[2].transitions, &[0, 1, 3]);
        assert_eq!(&*tables.states[3].transitions, &[4, 4, 4]);
        assert!(tables.finals[3]);
        assert_eq!(tables.finals.iter().filter(|&f| f).count(), 1);
    }

    #[test]
    fn revisited_subsets_are_shared() {
        // {0,2,3} -a-> {0,1,3} -a-> {0,1,3}
        let nfa = NFA::new("a*").unwrap();
        let tables = subset_construction(&nfa, &['a']);
        assert_eq!(tables.states.len(), 2);
        assert_eq!(tables.start, 1);
        assert_eq!(&*tables.states[0].transitions, &[0]);
        assert_eq!(&*tables.states[1].transitions, &[0]);
        assert!(tables.finals.all());
    }
}
