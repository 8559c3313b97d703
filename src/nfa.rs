use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::iter;
use std::ops::Range;
use std::slice;

use bit_set::BitSet;
use log::debug;

use crate::automaton::{Automaton, RegexAlgebra};
use crate::error::{Error, Result};
use crate::expression::{Expression, Token};
use crate::regex::{self, CLOSURE, CONCAT, UNION};

pub type StateNumber = usize;
pub type StateSet = BTreeSet<StateNumber>;

/// Outgoing edges of one NFA state; `None` is the epsilon symbol.
pub type NFATransitions = BTreeMap<Option<char>, StateSet>;

// NFAs

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct NFAState {
    transitions: NFATransitions,
}

/// A Thompson NFA with exactly one start state and one final state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NFA {
    expression: Expression,
    states: Vec<NFAState>,
    start: StateNumber,
    end: StateNumber,
}

#[derive(Copy, Clone, Debug)]
struct Fragment {
    entry: StateNumber,
    exit: StateNumber,
}

/// Private state table of one Thompson construction.
struct ThompsonBuilder {
    states: Vec<NFAState>,
}

impl ThompsonBuilder {
    fn allocate(&mut self) -> Fragment {
        let entry = self.states.len();
        self.states.push(NFAState::default());
        self.states.push(NFAState::default());
        Fragment {
            entry,
            exit: entry + 1,
        }
    }

    fn add_edge(&mut self, from: StateNumber, on: Option<char>, to: StateNumber) {
        self.states[from]
            .transitions
            .entry(on)
            .or_insert_with(BTreeSet::new)
            .insert(to);
    }

    fn epsilon(&mut self, from: StateNumber, to: StateNumber) {
        self.add_edge(from, None, to);
    }
}

impl NFA {
    pub fn new(regex: &str) -> Result<Self> {
        let expression = regex::parse(regex)?;
        NFA::from_expression(expression)
    }

    /// Thompson construction over the postfix tokens of `expression`.
    pub fn from_expression(expression: Expression) -> Result<Self> {
        let infix = expression.infix();
        let mut builder = ThompsonBuilder {
            states: Vec::with_capacity(expression.postfix().len() * 2),
        };
        let mut stack: Vec<Fragment> = Vec::new();

        for token in expression.postfix() {
            let mut pop = || {
                stack.pop().ok_or_else(|| {
                    Error::invalid_regex(infix, format!("missing operand for `{}`", token.symbol()))
                })
            };
            let fragment = match *token {
                Token::Operand(symbol) => {
                    let new = builder.allocate();
                    builder.add_edge(new.entry, Some(symbol), new.exit);
                    new
                }
                Token::BinaryOperator(CONCAT) => {
                    let b = pop()?;
                    let a = pop()?;
                    builder.epsilon(a.exit, b.entry);
                    Fragment {
                        entry: a.entry,
                        exit: b.exit,
                    }
                }
                Token::BinaryOperator(UNION) => {
                    let b = pop()?;
                    let a = pop()?;
                    let new = builder.allocate();
                    builder.epsilon(new.entry, a.entry);
                    builder.epsilon(new.entry, b.entry);
                    builder.epsilon(a.exit, new.exit);
                    builder.epsilon(b.exit, new.exit);
                    new
                }
                Token::UnaryOperator(CLOSURE) => {
                    let a = pop()?;
                    let new = builder.allocate();
                    builder.epsilon(new.entry, a.entry);
                    builder.epsilon(new.entry, new.exit);
                    builder.epsilon(a.exit, new.exit);
                    builder.epsilon(a.exit, a.entry);
                    new
                }
                Token::UnaryOperator(op) | Token::BinaryOperator(op) => {
                    return Err(Error::invalid_regex(
                        infix,
                        format!("unsupported operator `{}`", op),
                    ))
                }
            };
            stack.push(fragment);
        }

        if stack.len() != 1 {
            return Err(Error::invalid_regex(
                infix,
                format!("expected one expression, found {}", stack.len()),
            ));
        }
        let Fragment { entry, exit } = stack[0];

        debug!(
            "Thompson construction of {:?}: {} states, start {}, final {}",
            infix,
            builder.states.len(),
            entry,
            exit
        );

        Ok(NFA {
            expression,
            states: builder.states,
            start: entry,
            end: exit,
        })
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The literal symbols, epsilon excluded.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        self.expression.operands()
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

    pub fn final_state(&self) -> StateNumber {
        self.end
    }

    pub fn transitions(&self, state: StateNumber) -> Result<&NFATransitions> {
        self.states
            .get(state)
            .map(|st| &st.transitions)
            .ok_or(Error::InvalidState(state))
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.states.iter().enumerate(),
        }
    }

    /// Direct successors of `state` on `symbol`, without epsilon moves.
    pub(crate) fn targets(&self, state: StateNumber, symbol: char) -> Option<&StateSet> {
        self.states[state].transitions.get(&Some(symbol))
    }

    /// Depth-first search along epsilon edges from all `seeds`.
    fn close<I: IntoIterator<Item = StateNumber>>(&self, seeds: I) -> BitSet {
        let mut closure = BitSet::with_capacity(self.states.len());
        let mut stack: Vec<StateNumber> = seeds.into_iter().collect();
        while let Some(state) = stack.pop() {
            if !closure.insert(state) {
                continue;
            }
            if let Some(targets) = self.states[state].transitions.get(&None) {
                stack.extend(targets.iter().copied().filter(|&t| !closure.contains(t)));
            }
        }
        closure
    }

    /// Epsilon closure of every state, indexed by state number.
    pub(crate) fn epsilon_closures(&self) -> Vec<BitSet> {
        self.states().map(|state| self.close(iter::once(state))).collect()
    }

    /// States reachable from `state` through zero or more epsilon edges.
    pub fn state_epsilon_closure(&self, state: StateNumber) -> Result<StateSet> {
        if state >= self.states.len() {
            return Err(Error::InvalidState(state));
        }
        Ok(self.close(iter::once(state)).iter().collect())
    }

    /// Returns whether `input` is accepted, and the states the input reaches.
    pub fn check_input(&self, input: &str) -> (bool, StateSet) {
        let (accepted, reached) = self.run(input);
        (accepted, reached.iter().collect())
    }

    /// Like [`NFA::check_input`], for input that still has to be decoded.
    pub fn check_bytes(&self, input: &[u8]) -> Result<(bool, StateSet)> {
        let input = std::str::from_utf8(input)?;
        Ok(self.check_input(input))
    }
}

impl Automaton for NFA {
    type State = BitSet;

    fn initial_state(&self) -> BitSet {
        self.close(iter::once(self.start))
    }

    fn next_state(&self, states: &BitSet, symbol: char) -> BitSet {
        let mut nxt_states = Vec::new();
        for state in states.iter() {
            if let Some(targets) = self.targets(state, symbol) {
                nxt_states.extend(targets.iter().copied());
            }
        }
        self.close(nxt_states)
    }

    fn is_accepting(&self, states: &BitSet) -> bool {
        states.contains(self.end)
    }

    fn is_stuck(&self, states: &BitSet) -> bool {
        states.is_empty()
    }
}

impl RegexAlgebra for NFA {
    fn from_regex(regex: &str) -> Result<Self> {
        NFA::new(regex)
    }

    fn regex(&self) -> &str {
        self.expression.infix()
    }
}

/// Iterator over `(state, transitions)` pairs of an [`NFA`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    inner: iter::Enumerate<slice::Iter<'a, NFAState>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (StateNumber, &'a NFATransitions);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(n, st)| (n, &st.transitions))
    }
}

impl<'a> IntoIterator for &'a NFA {
    type Item = (StateNumber, &'a NFATransitions);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub(crate) fn fmt_symbols(f: &mut fmt::Formatter<'_>, symbols: &BTreeSet<char>) -> fmt::Result {
    let symbols: Vec<String> = symbols.iter().map(|c| c.to_string()).collect();
    write!(f, "{{{}}}", symbols.join(", "))
}

impl fmt::Display for NFA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "< Symbols: ")?;
        fmt_symbols(f, self.alphabet())?;
        writeln!(f)?;
        writeln!(f, "  States: {:?}", self.states().collect::<Vec<_>>())?;
        write!(f, "  Transitions Table: {{")?;
        for (state, transitions) in self {
            if state != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {{", state)?;
            for (index, (symbol, targets)) in transitions.iter().enumerate() {
                if index != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {:?}", symbol.unwrap_or('ε'), targets)?;
            }
            write!(f, "}}")?;
        }
        writeln!(f, "}}")?;
        writeln!(f, "  Start State: {}", self.start)?;
        write!(f, "  Final State: {} >", self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(states: &[StateNumber]) -> StateSet {
        states.iter().copied().collect()
    }

    fn edge(nfa: &NFA, from: StateNumber, on: Option<char>) -> StateSet {
        nfa.transitions(from).unwrap().get(&on).cloned().unwrap_or_default()
    }

    #[test]
    fn operand() {
        let nfa = NFA::new("a").unwrap();
        assert_eq!(nfa.state_count(), 2);
        assert_eq!((nfa.start_state(), nfa.final_state()), (0, 1));
        assert_eq!(edge(&nfa, 0, Some('a')), set(&[1]));
        assert!(nfa.transitions(1).unwrap().is_empty());
    }

    #[test]
    fn concatenation() {
        let nfa = NFA::new("ab").unwrap();
        assert_eq!(nfa.regex(), "a&b");
        assert_eq!(nfa.state_count(), 4);
        assert_eq!((nfa.start_state(), nfa.final_state()), (0, 3));
        assert_eq!(edge(&nfa, 1, None), set(&[2]));
    }

    #[test]
    fn union() {
        let nfa = NFA::new("a+b").unwrap();
        assert_eq!(nfa.state_count(), 6);
        assert_eq!((nfa.start_state(), nfa.final_state()), (4, 5));
        assert_eq!(edge(&nfa, 4, None), set(&[0, 2]));
        assert_eq!(edge(&nfa, 1, None), set(&[5]));
        assert_eq!(edge(&nfa, 3, None), set(&[5]));
    }

    #[test]
    fn closure() {
        let nfa = NFA::new("a*").unwrap();
        assert_eq!(nfa.state_count(), 4);
        assert_eq!((nfa.start_state(), nfa.final_state()), (2, 3));
        assert_eq!(edge(&nfa, 2, None), set(&[0, 3]));
        assert_eq!(edge(&nfa, 1, None), set(&[0, 3]));
    }

    #[test]
    fn every_state_has_an_entry() {
        let nfa = NFA::new("(a+b)*c").unwrap();
        assert_eq!(nfa.iter().count(), nfa.state_count());
        for state in nfa.states() {
            assert!(nfa.transitions(state).is_ok());
        }
        assert_eq!(nfa.transitions(nfa.state_count()), Err(Error::InvalidState(nfa.state_count())));
    }

    #[test]
    fn epsilon_closure() {
        let nfa = NFA::new("a*").unwrap();
        assert_eq!(nfa.state_epsilon_closure(2).unwrap(), set(&[0, 2, 3]));
        assert_eq!(nfa.state_epsilon_closure(1).unwrap(), set(&[0, 1, 3]));
        assert_eq!(nfa.state_epsilon_closure(3).unwrap(), set(&[3]));
        assert_eq!(nfa.state_epsilon_closure(4), Err(Error::InvalidState(4)));
    }

    #[test]
    fn check_input() {
        let nfa = NFA::new("a*").unwrap();
        assert_eq!(nfa.check_input(""), (true, set(&[0, 2, 3])));
        assert_eq!(nfa.check_input("aa"), (true, set(&[0, 1, 3])));
        assert_eq!(nfa.check_input("b"), (false, set(&[])));

        let nfa = NFA::new("a&b").unwrap();
        assert!(nfa.check_input("ab").0);
        assert!(!nfa.check_input("a").0);
        assert!(!nfa.check_input("ba").0);
    }

    #[test]
    fn check_bytes() {
        let nfa = NFA::new("ab").unwrap();
        assert_eq!(nfa.check_bytes(b"ab").unwrap().0, true);
        assert!(matches!(nfa.check_bytes(&[b'a', 0xff]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn literal_dollar() {
        let nfa = NFA::new("a$").unwrap();
        assert!(nfa.alphabet().contains(&'$'));
        assert!(nfa.check_input("a$").0);
        assert!(!nfa.check_input("a").0);
    }

    #[test]
    fn algebra() {
        let nfa = NFA::new("ab").unwrap();

        let star = nfa.closure().unwrap();
        assert_eq!(star.regex(), "(a&b)*");
        assert!(star.check_input("").0);
        assert!(star.check_input("abab").0);
        assert!(!star.check_input("aba").0);

        let either = nfa.union("c").unwrap();
        assert_eq!(either.regex(), "(a&b)+(c)");
        assert!(either.check_input("c").0);
        assert!(either.check_input("ab").0);

        let both = nfa.concatenate("c*").unwrap();
        assert_eq!(both.regex(), "(a&b)&(c*)");
        assert!(both.check_input("abcc").0);
        assert!(!both.check_input("c").0);

        // the receiver is left untouched
        assert_eq!(nfa.regex(), "a&b");
        assert!(matches!(nfa.union("(c"), Err(Error::InvalidRegex { .. })));
    }

    #[test]
    fn accepted_prefixes() {
        let nfa = NFA::new("(ab)*").unwrap();
        let ends: Vec<usize> = nfa.accepted_prefixes("ababx").map(|m| m.end).collect();
        assert_eq!(ends, vec![0, 2, 4]);
    }

    #[test]
    fn display() {
        let nfa = NFA::new("a").unwrap();
        assert_eq!(
            nfa.to_string(),
            "< Symbols: {a}\n  States: [0, 1]\n  Transitions Table: {0: {a: {1}}, 1: {}}\n  Start State: 0\n  Final State: 1 >"
        );
    }
}
