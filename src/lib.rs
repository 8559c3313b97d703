//! Regular expressions compiled to finite automata.
//!
//! A pattern over a literal alphabet, with `+` (union), `&` or juxtaposition
//! (concatenation) and postfix `*` (closure), is turned into a Thompson
//! [`NFA`], which can be turned into a total [`DFA`] by subset construction
//! and then minimized by partition refinement.
//!
//! ```
//! use finite_automata::{DFA, NFA};
//!
//! let nfa = NFA::new("(a+b)*c").unwrap();
//! assert!(nfa.check_input("abc").0);
//!
//! let dfa = DFA::from_nfa(&nfa).minimize();
//! assert!(dfa.check_input("bbac").0);
//! assert!(!dfa.check_input("ab").0);
//! ```

pub mod automaton;
mod canonical;
pub mod dfa;
pub mod error;
pub mod expression;
mod minimize;
pub mod nfa;
mod powerset;
pub mod regex;

pub use automaton::{Automaton, Match, Matches, RegexAlgebra};
pub use dfa::DFA;
pub use error::{Error, Result};
pub use nfa::{StateNumber, StateSet, NFA};

#[cfg(test)]
mod tests {
    use super::*;

    fn check(pattern: &str, accepted: &[&str], rejected: &[&str]) {
        let nfa = NFA::new(pattern).unwrap();
        let dfa = DFA::from_nfa(&nfa);
        let min = dfa.minimize();
        for input in accepted {
            assert!(nfa.check_input(input).0, "NFA {} should accept {:?}", pattern, input);
            assert!(dfa.check_input(input).0, "DFA {} should accept {:?}", pattern, input);
            assert!(min.check_input(input).0, "minimal DFA {} should accept {:?}", pattern, input);
        }
        for input in rejected {
            assert!(!nfa.check_input(input).0, "NFA {} should reject {:?}", pattern, input);
            assert!(!dfa.check_input(input).0, "DFA {} should reject {:?}", pattern, input);
            assert!(!min.check_input(input).0, "minimal DFA {} should reject {:?}", pattern, input);
        }
    }

    #[test]
    fn concatenation() {
        check("a&b", &["ab"], &["", "a", "b", "ba"]);
    }

    #[test]
    fn union() {
        check("a+b", &["a", "b"], &["", "ab", "ba"]);
    }

    #[test]
    fn closure() {
        check("a*", &["", "a", "aa", "aaa"], &["b", "ab"]);
    }

    #[test]
    fn closure_of_union() {
        check("(a+b)*c", &["c", "ac", "bc", "abc", "aabbc"], &["", "a", "ab"]);
    }

    #[test]
    fn brackets() {
        check("[a+b]{c}", &["ac", "bc"], &["a", "c", "abc"]);
    }

    /// All strings over `alphabet` up to `max_len` symbols.
    fn strings(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut all = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for prefix in &frontier {
                for &c in alphabet {
                    let mut s = prefix.clone();
                    s.push(c);
                    next.push(s);
                }
            }
            all.extend(next.iter().cloned());
            frontier = next;
        }
        all
    }

    #[test]
    fn nfa_and_dfa_agree() {
        let patterns = [
            "a&b",
            "a+b",
            "a*",
            "(a+b)*c",
            "(a+b)*abb",
            "a(b+c)*a",
            "(ab+ba)*",
            "((a*b)*c)*",
            "a**",
            "(a+ab)(c+bc)",
        ];
        // 'x' is outside every alphabet
        let inputs = strings(&['a', 'b', 'c', 'x'], 5);
        for pattern in &patterns {
            let nfa = NFA::new(pattern).unwrap();
            let dfa = DFA::from_nfa(&nfa);
            let min = dfa.minimize();
            for input in &inputs {
                let expected = nfa.check_input(input).0;
                assert_eq!(dfa.check_input(input).0, expected, "{} on {:?}", pattern, input);
                assert_eq!(min.check_input(input).0, expected, "{} on {:?}", pattern, input);
            }
        }
    }

    #[test]
    fn algebra_agrees_across_automata() {
        let nfa = NFA::new("ab").unwrap().union("c").unwrap().closure().unwrap();
        let dfa = DFA::from_regex("ab").unwrap().union("c").unwrap().closure().unwrap();
        assert_eq!(nfa.regex(), dfa.regex());
        for input in strings(&['a', 'b', 'c'], 4) {
            assert_eq!(nfa.check_input(&input).0, dfa.check_input(&input).0, "{:?}", input);
        }
    }

    #[test]
    fn invalid_regex_is_propagated() {
        for bad in &["", "a+", "(a", "a)", "*a", "a++b"] {
            assert!(matches!(NFA::new(bad), Err(Error::InvalidRegex { .. })), "{:?}", bad);
            assert!(matches!(DFA::from_regex(bad), Err(Error::InvalidRegex { .. })), "{:?}", bad);
        }
    }
}
