//! Infix to postfix conversion for single-character algebraic expressions.
//!
//! The converter knows nothing about regular expressions: it is driven by an
//! [`OperatorTable`] that lists the operator characters with their arity,
//! precedence and associativity, and by the pairs of grouping delimiters.
//! Every other character must be one of the declared operands.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Postfix unary operator, applies to the operand on its left.
    Unary,
    Binary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OperatorInfo {
    pub arity: Arity,
    pub precedence: u8,
    pub associativity: Associativity,
}

/// Operator metadata and grouping delimiters of an expression language.
#[derive(Clone, Debug, Default)]
pub struct OperatorTable {
    operators: HashMap<char, OperatorInfo>,
    // (opening, closing)
    groups: Vec<(char, char)>,
}

impl OperatorTable {
    pub fn new(groups: &[(char, char)]) -> Self {
        OperatorTable {
            operators: HashMap::new(),
            groups: groups.to_vec(),
        }
    }

    pub fn with_operator(
        mut self,
        symbol: char,
        arity: Arity,
        precedence: u8,
        associativity: Associativity,
    ) -> Self {
        self.operators.insert(
            symbol,
            OperatorInfo {
                arity,
                precedence,
                associativity,
            },
        );
        self
    }

    pub fn operator(&self, symbol: char) -> Option<OperatorInfo> {
        self.operators.get(&symbol).copied()
    }

    pub fn is_operator(&self, symbol: char) -> bool {
        self.operators.contains_key(&symbol)
    }

    /// The closing delimiter matching `symbol`, if `symbol` opens a group.
    pub fn closing_for(&self, symbol: char) -> Option<char> {
        self.groups
            .iter()
            .find(|&&(open, _)| open == symbol)
            .map(|&(_, close)| close)
    }

    pub fn is_opening(&self, symbol: char) -> bool {
        self.groups.iter().any(|&(open, _)| open == symbol)
    }

    pub fn is_closing(&self, symbol: char) -> bool {
        self.groups.iter().any(|&(_, close)| close == symbol)
    }

    pub fn is_delimiter(&self, symbol: char) -> bool {
        self.is_opening(symbol) || self.is_closing(symbol)
    }
}

/// A postfix token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Operand(char),
    UnaryOperator(char),
    BinaryOperator(char),
}

impl Token {
    fn operator(symbol: char, info: OperatorInfo) -> Self {
        match info.arity {
            Arity::Unary => Token::UnaryOperator(symbol),
            Arity::Binary => Token::BinaryOperator(symbol),
        }
    }

    pub fn symbol(&self) -> char {
        match *self {
            Token::Operand(c) | Token::UnaryOperator(c) | Token::BinaryOperator(c) => c,
        }
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Operand(_))
    }

    pub fn is_unary_operator(&self) -> bool {
        matches!(self, Token::UnaryOperator(_))
    }

    pub fn is_binary_operator(&self) -> bool {
        matches!(self, Token::BinaryOperator(_))
    }
}

/// A validated expression together with its postfix form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    infix: String,
    postfix: Vec<Token>,
    operands: BTreeSet<char>,
}

enum Pending {
    Operator(char, OperatorInfo),
    // holds the expected closing delimiter
    Group(char),
}

impl Expression {
    /// Converts `infix` to postfix order (shunting-yard).
    ///
    /// Operators must appear explicitly: two adjacent operands are an error.
    pub fn new(infix: &str, table: &OperatorTable, operands: BTreeSet<char>) -> Result<Self> {
        let fail = |reason: String| Err(Error::invalid_regex(infix, reason));

        let mut postfix = Vec::with_capacity(infix.len());
        let mut stack: Vec<Pending> = Vec::new();
        // true when the tokens read so far end with a complete operand
        let mut has_value = false;

        for c in infix.chars() {
            if let Some(info) = table.operator(c) {
                if !has_value {
                    return fail(format!("missing operand before `{}`", c));
                }
                while let Some(&Pending::Operator(top, top_info)) = stack.last() {
                    let pops = top_info.precedence > info.precedence
                        || (top_info.precedence == info.precedence
                            && info.associativity == Associativity::Left);
                    if !pops {
                        break;
                    }
                    postfix.push(Token::operator(top, top_info));
                    stack.pop();
                }
                stack.push(Pending::Operator(c, info));
                has_value = info.arity == Arity::Unary;
            } else if let Some(close) = table.closing_for(c) {
                if has_value {
                    return fail(format!("missing operator before `{}`", c));
                }
                stack.push(Pending::Group(close));
            } else if table.is_closing(c) {
                if !has_value {
                    return fail(format!("missing operand before `{}`", c));
                }
                loop {
                    match stack.pop() {
                        Some(Pending::Operator(op, info)) => postfix.push(Token::operator(op, info)),
                        Some(Pending::Group(expected)) if expected == c => break,
                        Some(Pending::Group(expected)) => {
                            return fail(format!("expected `{}` but found `{}`", expected, c))
                        }
                        None => return fail(format!("unbalanced `{}`", c)),
                    }
                }
            } else if operands.contains(&c) {
                if has_value {
                    return fail(format!("missing operator before `{}`", c));
                }
                postfix.push(Token::Operand(c));
                has_value = true;
            } else {
                return fail(format!("unknown symbol `{}`", c));
            }
        }

        if !has_value {
            return if infix.is_empty() {
                fail("empty expression".to_string())
            } else {
                fail("missing operand at end of expression".to_string())
            };
        }

        while let Some(pending) = stack.pop() {
            match pending {
                Pending::Operator(op, info) => postfix.push(Token::operator(op, info)),
                Pending::Group(expected) => return fail(format!("missing `{}`", expected)),
            }
        }

        Ok(Expression {
            infix: infix.to_string(),
            postfix,
            operands,
        })
    }

    pub fn infix(&self) -> &str {
        &self.infix
    }

    pub fn postfix(&self) -> &[Token] {
        &self.postfix
    }

    pub fn operands(&self) -> &BTreeSet<char> {
        &self.operands
    }

    pub fn is_operand(&self, token: &Token) -> bool {
        token.is_operand() && self.operands.contains(&token.symbol())
    }
}
