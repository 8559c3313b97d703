use std::fmt::Debug;

use crate::error::Result;
use crate::regex::{CLOSURE, UNION};

/// Step-wise simulation shared by the NFA and the DFA.
pub trait Automaton {
    type State: Debug;

    fn initial_state(&self) -> Self::State;

    fn next_state(&self, state: &Self::State, input: char) -> Self::State;

    fn is_accepting(&self, state: &Self::State) -> bool;

    /// No input can lead from `state` to acceptance anymore.
    fn is_stuck(&self, _state: &Self::State) -> bool {
        false
    }

    /// Runs the whole input, returning acceptance and the last state.
    fn run(&self, input: &str) -> (bool, Self::State) {
        let mut state = self.initial_state();
        for c in input.chars() {
            state = self.next_state(&state, c);
        }
        (self.is_accepting(&state), state)
    }

    fn accepted_prefixes<'i, 'a>(&'a self, s: &'i str) -> Matches<'i, 'a, Self>
    where
        Self: Sized,
    {
        Matches {
            aut: self,
            input: s,
            offset: 0,
            state: Some(self.initial_state()),
            started: false,
        }
    }
}

/// Records an accepted prefix of the input.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct Match {
    /// The ending byte offset of the prefix in the input.
    pub end: usize,
}

/// An iterator over the accepted prefixes of some text, shortest first.
///
/// This iterator yields `Match` values.
#[derive(Debug)]
pub struct Matches<'i, 'a, A: 'a + Automaton> {
    aut: &'a A,
    input: &'i str,
    offset: usize,
    state: Option<A::State>,
    started: bool,
}

impl<'i, 'a, A: Automaton> Iterator for Matches<'i, 'a, A> {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        let mut state = self.state.take()?;
        if !self.started {
            self.started = true;
            if self.aut.is_accepting(&state) {
                self.state = Some(state);
                return Some(Match { end: 0 });
            }
        }
        while let Some(c) = self.input[self.offset..].chars().next() {
            // Return early if in stuck state
            if self.aut.is_stuck(&state) {
                return None;
            }
            state = self.aut.next_state(&state, c);
            self.offset += c.len_utf8();
            if self.aut.is_accepting(&state) {
                self.state = Some(state);
                return Some(Match { end: self.offset });
            }
        }
        None
    }
}

/// Regex algebra by rewriting the expression text and rebuilding.
pub trait RegexAlgebra: Sized {
    fn from_regex(regex: &str) -> Result<Self>;

    /// The normalized expression this automaton was built from.
    fn regex(&self) -> &str;

    /// Accepts the language repeated zero or more times.
    fn closure(&self) -> Result<Self> {
        Self::from_regex(&format!("({}){}", self.regex(), CLOSURE))
    }

    fn union(&self, regex: &str) -> Result<Self> {
        Self::from_regex(&format!("({}){}({})", self.regex(), UNION, regex))
    }

    fn concatenate(&self, regex: &str) -> Result<Self> {
        Self::from_regex(&format!("({})({})", self.regex(), regex))
    }
}
