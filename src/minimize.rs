//!
//! Minimization of deterministic finite-state automata
//!

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::canonical::KeyedTable;
use crate::dfa::DFA;
use crate::nfa::StateNumber;

//
// Partition refinement (Moore)
// ----------------------------
// - start with two blocks: the final states and the others
// - the signature of a state s is the list, over the sorted alphabet, of
//   the blocks containing delta(s, c)
// - split every block by signature
// - stop when a round creates no new block
//
// Blocks are only ever split, so a block is either wholly final or wholly
// non-final, and the block count is bounded by the state count.
//

/// Sorted member lists of the equivalence classes of `dfa`'s states.
pub(crate) fn partition(dfa: &DFA) -> Vec<Vec<StateNumber>> {
    let (finals, others): (Vec<StateNumber>, Vec<StateNumber>) =
        dfa.states().partition(|&state| dfa.is_final(state));
    let mut blocks: Vec<Vec<StateNumber>> = vec![finals, others];
    blocks.retain(|block| !block.is_empty());

    let mut block_of = vec![0; dfa.state_count()];
    let mut round = 0;
    loop {
        assign_blocks(&blocks, &mut block_of);

        let mut refined = Vec::with_capacity(blocks.len());
        for block in &blocks {
            let mut by_signature: BTreeMap<Vec<usize>, Vec<StateNumber>> = BTreeMap::new();
            for &state in block {
                let signature = dfa.row(state).iter().map(|&to| block_of[to]).collect();
                by_signature.entry(signature).or_insert_with(Vec::new).push(state);
            }
            refined.extend(by_signature.into_iter().map(|(_, states)| states));
        }

        round += 1;
        trace!("refinement round {}: {} -> {} blocks", round, blocks.len(), refined.len());
        let stable = refined.len() == blocks.len();
        blocks = refined;
        if stable {
            return blocks;
        }
    }
}

fn assign_blocks(blocks: &[Vec<StateNumber>], block_of: &mut [usize]) {
    for (index, block) in blocks.iter().enumerate() {
        for &state in block {
            block_of[state] = index;
        }
    }
}

impl DFA {
    /// Returns the minimal DFA for the same language.
    ///
    /// The receiver is left untouched; the result keeps the same source
    /// regex and alphabet.
    pub fn minimize(&self) -> DFA {
        let blocks = partition(self);

        let mut block_of = vec![0; self.state_count()];
        assign_blocks(&blocks, &mut block_of);

        // The fixed point guarantees any member is a valid representative.
        let rows = blocks
            .iter()
            .map(|block| self.row(block[0]).iter().map(|&to| block_of[to]).collect())
            .collect();
        let accepting = blocks
            .iter()
            .map(|block| block.iter().any(|&state| self.is_final(state)))
            .collect();
        let start = block_of[self.start_state()];

        debug!(
            "minimization of {:?}: {} -> {} states",
            self.nfa().expression().infix(),
            self.state_count(),
            blocks.len()
        );

        let tables = KeyedTable {
            keys: blocks,
            rows,
            accepting,
            start,
        }
        .canonicalize();
        self.with_tables(tables)
    }
}
