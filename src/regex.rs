//! Normalization of regex pattern text.
//!
//! Patterns use `+` for union, `&` for concatenation and a postfix `*` for
//! closure. Concatenation may be left implicit (`ab(c)` means `a&b&(c)`);
//! [`parse`] makes it explicit before handing the text to the expression
//! converter.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use log::trace;

use crate::error::Result;
use crate::expression::{Arity, Associativity, Expression, OperatorTable};

pub const UNION: char = '+';
pub const CONCAT: char = '&';
pub const CLOSURE: char = '*';

lazy_static! {
    pub static ref REGEX_OPERATORS: OperatorTable =
        OperatorTable::new(&[('(', ')'), ('[', ']'), ('{', '}')])
            .with_operator(UNION, Arity::Binary, 1, Associativity::Left)
            .with_operator(CONCAT, Arity::Binary, 2, Associativity::Left)
            .with_operator(CLOSURE, Arity::Unary, 3, Associativity::Left);
}

/// Every character that is neither an operator nor a delimiter.
pub fn symbols(regex: &str) -> BTreeSet<char> {
    regex.chars().filter(|&c| is_symbol(c)).collect()
}

fn is_symbol(c: char) -> bool {
    !REGEX_OPERATORS.is_operator(c) && !REGEX_OPERATORS.is_delimiter(c)
}

fn remove_whitespace(regex: &str) -> String {
    regex.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Inserts the concatenation operator wherever it is implicit.
/// Example: `ab(a)` -> `a&b&(a)`.
pub fn insert_concatenation(regex: &str) -> String {
    let mut res = String::with_capacity(regex.len() * 2);
    let mut prev: Option<char> = None;
    for c in regex.chars() {
        if let Some(p) = prev {
            let ends_operand = is_symbol(p) || REGEX_OPERATORS.is_closing(p) || p == CLOSURE;
            let starts_operand = is_symbol(c) || REGEX_OPERATORS.is_opening(c);
            if ends_operand && starts_operand {
                res.push(CONCAT);
            }
        }
        res.push(c);
        prev = Some(c);
    }
    res
}

/// Normalizes `regex` and converts it to postfix.
pub fn parse(regex: &str) -> Result<Expression> {
    let normalized = insert_concatenation(&remove_whitespace(regex));
    trace!("regex {:?} normalized to {:?}", regex, normalized);
    let operands = symbols(&normalized);
    Expression::new(&normalized, &REGEX_OPERATORS, operands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn implicit_concatenation() {
        assert_eq!(insert_concatenation("ab(a)"), "a&b&(a)");
        assert_eq!(insert_concatenation("a*b"), "a*&b");
        assert_eq!(insert_concatenation("(a)(b)"), "(a)&(b)");
        assert_eq!(insert_concatenation("[a]{b}c"), "[a]&{b}&c");
        assert_eq!(insert_concatenation("a+b"), "a+b");
        assert_eq!(insert_concatenation("a&b"), "a&b");
        assert_eq!(insert_concatenation("(a+b)*c"), "(a+b)*&c");
    }

    #[test]
    fn whitespace_is_ignored() {
        let expr = parse(" a b\n+ c\t").unwrap();
        assert_eq!(expr.infix(), "a&b+c");
    }

    #[test]
    fn alphabet() {
        let expected: BTreeSet<char> = ['a', 'b', 'c', '$'].iter().copied().collect();
        assert_eq!(symbols("(a+b)*&c&$"), expected);
        assert!(symbols("()+&*[]{}").is_empty());
    }

    #[test]
    fn postfix() {
        let expr = parse("(a+b)*c").unwrap();
        let postfix: String = expr.postfix().iter().map(|t| t.symbol()).collect();
        assert_eq!(postfix, "ab+*c&");
    }

    #[test]
    fn malformed() {
        assert!(matches!(parse("a+"), Err(Error::InvalidRegex { .. })));
        assert!(matches!(parse("(ab"), Err(Error::InvalidRegex { .. })));
        assert!(matches!(parse("   "), Err(Error::InvalidRegex { .. })));
    }
}
