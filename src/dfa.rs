use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use bit_vec::BitVec;
use log::debug;

use crate::automaton::{Automaton, RegexAlgebra};
use crate::error::{Error, Result};
use crate::nfa::{fmt_symbols, StateNumber, StateSet, NFA};
use crate::powerset;

/// One row of the transition table, indexed like the alphabet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DFAState {
    pub(crate) transitions: Box<[StateNumber]>,
}

/// Canonically numbered tables produced by a transformation.
pub(crate) struct DFATables {
    pub states: Box<[DFAState]>,
    pub finals: BitVec,
    pub start: StateNumber,
}

/// A total DFA: every state has a successor for every alphabet symbol.
#[derive(Clone, Debug)]
pub struct DFA {
    nfa: NFA,
    // sorted
    alphabet: Box<[char]>,
    states: Box<[DFAState]>,
    finals: BitVec,
    start: StateNumber,
}

impl DFA {
    /// Builds a DFA from exactly one of `regex` or `nfa`.
    pub fn new(regex: Option<&str>, nfa: Option<&NFA>) -> Result<Self> {
        match (regex, nfa) {
            (Some(regex), None) => DFA::from_regex(regex),
            (None, Some(nfa)) => Ok(DFA::from_nfa(nfa)),
            (None, None) => Err(Error::InvalidArguments("DFA should be given a regex or an NFA")),
            (Some(_), Some(_)) => Err(Error::InvalidArguments(
                "DFA should be given a regex or an NFA, not both",
            )),
        }
    }

    pub fn from_regex(regex: &str) -> Result<Self> {
        Ok(DFA::build(NFA::new(regex)?))
    }

    /// Subset construction over a private copy of `nfa`.
    pub fn from_nfa(nfa: &NFA) -> Self {
        DFA::build(nfa.clone())
    }

    fn build(nfa: NFA) -> Self {
        let alphabet: Box<[char]> = nfa.alphabet().iter().copied().collect();
        let tables = powerset::subset_construction(&nfa, &alphabet);
        debug!(
            "subset construction of {:?}: {} NFA states -> {} DFA states",
            nfa.expression().infix(),
            nfa.state_count(),
            tables.states.len()
        );
        DFA {
            nfa,
            alphabet,
            states: tables.states,
            finals: tables.finals,
            start: tables.start,
        }
    }

    /// A DFA over the same source and alphabet with different tables.
    pub(crate) fn with_tables(&self, tables: DFATables) -> Self {
        DFA {
            nfa: self.nfa.clone(),
            alphabet: self.alphabet.clone(),
            states: tables.states,
            finals: tables.finals,
            start: tables.start,
        }
    }

    /// The NFA this DFA was built from.
    pub fn nfa(&self) -> &NFA {
        &self.nfa
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> Range<StateNumber> {
        0..self.states.len()
    }

    pub fn start_state(&self) -> StateNumber {
        self.start
    }

    pub fn final_states(&self) -> StateSet {
        self.states().filter(|&state| self.is_final(state)).collect()
    }

    pub fn is_final(&self, state: StateNumber) -> bool {
        self.finals.get(state).unwrap_or(false)
    }

    /// A non-accepting state that loops to itself on every symbol.
    pub fn is_dead(&self, state: StateNumber) -> bool {
        match self.states.get(state) {
            Some(st) => !self.is_final(state) && st.transitions.iter().all(|&to| to == state),
            None => false,
        }
    }

    pub(crate) fn row(&self, state: StateNumber) -> &[StateNumber] {
        &self.states[state].transitions
    }

    /// The successor of `state` on `symbol`; `None` outside the alphabet.
    pub fn transition(&self, state: StateNumber, symbol: char) -> Option<StateNumber> {
        let column = self.alphabet.binary_search(&symbol).ok()?;
        self.states.get(state)?.transitions.get(column).copied()
    }

    pub fn transitions(&self, state: StateNumber) -> Result<BTreeMap<char, StateNumber>> {
        let st = self.states.get(state).ok_or(Error::InvalidState(state))?;
        Ok(self
            .alphabet
            .iter()
            .copied()
            .zip(st.transitions.iter().copied())
            .collect())
    }

    /// Iterates over `(state, symbol -> state)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (StateNumber, BTreeMap<char, StateNumber>)> + '_ {
        self.states.iter().enumerate().map(move |(n, st)| {
            let row: BTreeMap<char, StateNumber> = self
                .alphabet
                .iter()
                .copied()
                .zip(st.transitions.iter().copied())
                .collect();
            (n, row)
        })
    }

    /// Returns whether `input` is accepted, and the state it ends in.
    ///
    /// A symbol outside the alphabet rejects the input; no state is reached.
    pub fn check_input(&self, input: &str) -> (bool, Option<StateNumber>) {
        self.run(input)
    }

    pub fn check_bytes(&self, input: &[u8]) -> Result<(bool, Option<StateNumber>)> {
        let input = std::str::from_utf8(input)?;
        Ok(self.check_input(input))
    }
}

impl Automaton for DFA {
    type State = Option<StateNumber>;

    fn initial_state(&self) -> Self::State {
        Some(self.start)
    }

    fn next_state(&self, state: &Self::State, symbol: char) -> Self::State {
        state.and_then(|state| self.transition(state, symbol))
    }

    fn is_accepting(&self, state: &Self::State) -> bool {
        state.map_or(false, |state| self.is_final(state))
    }

    fn is_stuck(&self, state: &Self::State) -> bool {
        state.map_or(true, |state| self.is_dead(state))
    }
}

impl RegexAlgebra for DFA {
    fn from_regex(regex: &str) -> Result<Self> {
        DFA::from_regex(regex)
    }

    fn regex(&self) -> &str {
        self.nfa.regex()
    }
}

impl fmt::Display for DFA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "< Symbols: ")?;
        fmt_symbols(f, self.nfa.alphabet())?;
        writeln!(f)?;
        writeln!(f, "  States: {:?}", self.states().collect::<Vec<_>>())?;
        write!(f, "  Transitions Table: {{")?;
        for (state, row) in self.iter() {
            if state != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {{", state)?;
            for (index, (symbol, to)) in row.iter().enumerate() {
                if index != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", symbol, to)?;
            }
            write!(f, "}}")?;
        }
        writeln!(f, "}}")?;
        writeln!(f, "  Start State: {}", self.start)?;
        write!(f, "  Final States: {:?} >", self.final_states())
    }
}
