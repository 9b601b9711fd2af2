// This file is part of posh, a POSIX command language interpreter.
// Copyright (C) 2024 the posh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Evaluation of arithmetic expansion expressions
//!
//! This crate evaluates the expression between `$((` and `))` after the
//! shell has performed parameter expansion on it. Supported syntax is
//! signed 64-bit integer constants (decimal, octal with a leading `0`,
//! hexadecimal with `0x`), variable references, parentheses, the unary
//! `+` and `-` operators, and the binary `*`, `/`, `%`, `+` and `-`
//! operators with the usual precedence.
//!
//! ```
//! # use posh_arith::{eval, EmptyEnv};
//! assert_eq!(eval("2 + 3 * 4", &EmptyEnv), Ok(14));
//! ```

use std::fmt::Display;
use std::iter::Peekable;
use std::ops::Range;

mod env;
mod token;

pub use env::{EmptyEnv, Env};
pub use token::TokenError;
use token::{Operator, Term, Token, Tokens};

/// Cause of an arithmetic expansion error
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCause {
    /// Error in tokenization
    TokenError(TokenError),
    /// Missing or surplus token making the expression ungrammatical
    InvalidExpression,
    /// An opening parenthesis without a matching closing parenthesis
    UnclosedParenthesis,
    /// A variable value that is not a valid number
    InvalidVariableValue(String),
    /// Result out of the `i64` range
    Overflow,
    /// Division by zero
    DivisionByZero,
}

impl Display for ErrorCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorCause::*;
        match self {
            TokenError(e) => e.fmt(f),
            InvalidExpression => "invalid expression".fmt(f),
            UnclosedParenthesis => "unmatched parenthesis".fmt(f),
            InvalidVariableValue(v) => {
                write!(f, "variable value {v:?} cannot be parsed as a number")
            }
            Overflow => "overflow".fmt(f),
            DivisionByZero => "division by zero".fmt(f),
        }
    }
}

impl From<TokenError> for ErrorCause {
    fn from(e: TokenError) -> Self {
        ErrorCause::TokenError(e)
    }
}

/// Description of an error that occurred during evaluation
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error {
    /// Cause of the error
    pub cause: ErrorCause,
    /// Range of the substring in the evaluated expression where the error occurred
    pub location: Range<usize>,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cause.fmt(f)
    }
}

impl std::error::Error for Error {}

impl From<token::Error> for Error {
    fn from(e: token::Error) -> Self {
        Error {
            cause: e.cause.into(),
            location: e.location,
        }
    }
}

/// Expands a variable to its numeric value.
fn expand_variable<E: Env>(
    name: &str,
    location: &Range<usize>,
    env: &E,
) -> Result<i64, Error> {
    match env.get_variable(name) {
        // An unset variable evaluates to zero.
        None => Ok(0),
        Some(value) if value.trim().is_empty() => Ok(0),
        Some(value) => match value.trim().parse() {
            Ok(number) => Ok(number),
            Err(_) => Err(Error {
                cause: ErrorCause::InvalidVariableValue(value.to_string()),
                location: location.clone(),
            }),
        },
    }
}

impl Term<'_> {
    fn into_value<E: Env>(self, env: &E) -> Result<i64, Error> {
        match self {
            Term::Value(value) => Ok(value),
            Term::Variable { name, location } => expand_variable(name, &location, env),
        }
    }
}

fn unwrap_or_overflow(result: Option<i64>, location: Range<usize>) -> Result<i64, Error> {
    result.ok_or(Error {
        cause: ErrorCause::Overflow,
        location,
    })
}

/// Parses and evaluates a leaf expression.
///
/// A leaf expression is a constant, a variable, or a parenthesized
/// expression, optionally preceded by unary operators.
fn parse_leaf<E: Env>(tokens: &mut Peekable<Tokens<'_>>, env: &E) -> Result<i64, Error> {
    let end = usize::MAX;
    match tokens.next().transpose()? {
        Some(Token::Term { term, .. }) => term.into_value(env),

        Some(Token::Operator {
            operator: Operator::OpenParen,
            location,
        }) => {
            let inner = parse_binary(tokens, 1, env)?;
            match tokens.next().transpose()? {
                Some(Token::Operator {
                    operator: Operator::CloseParen,
                    ..
                }) => Ok(inner),
                _ => Err(Error {
                    cause: ErrorCause::UnclosedParenthesis,
                    location,
                }),
            }
        }

        Some(Token::Operator {
            operator: Operator::Plus,
            ..
        }) => parse_leaf(tokens, env),

        Some(Token::Operator {
            operator: Operator::Minus,
            location,
        }) => {
            let operand = parse_leaf(tokens, env)?;
            unwrap_or_overflow(operand.checked_neg(), location)
        }

        Some(Token::Operator { location, .. }) => Err(Error {
            cause: ErrorCause::InvalidExpression,
            location,
        }),

        None => Err(Error {
            cause: ErrorCause::InvalidExpression,
            location: end..end,
        }),
    }
}

/// Parses and evaluates an expression by precedence climbing.
fn parse_binary<E: Env>(
    tokens: &mut Peekable<Tokens<'_>>,
    min_precedence: u8,
    env: &E,
) -> Result<i64, Error> {
    let mut accumulator = parse_leaf(tokens, env)?;

    while let Some(Ok(Token::Operator { operator, location })) = tokens.peek() {
        let precedence = operator.precedence();
        if precedence < min_precedence {
            break;
        }
        let (operator, location) = (*operator, location.clone());
        tokens.next();

        let rhs = parse_binary(tokens, precedence + 1, env)?;
        accumulator = match operator {
            Operator::Plus => unwrap_or_overflow(accumulator.checked_add(rhs), location)?,
            Operator::Minus => unwrap_or_overflow(accumulator.checked_sub(rhs), location)?,
            Operator::Asterisk => unwrap_or_overflow(accumulator.checked_mul(rhs), location)?,
            Operator::Slash | Operator::Percent if rhs == 0 => {
                return Err(Error {
                    cause: ErrorCause::DivisionByZero,
                    location,
                })
            }
            Operator::Slash => unwrap_or_overflow(accumulator.checked_div(rhs), location)?,
            Operator::Percent => unwrap_or_overflow(accumulator.checked_rem(rhs), location)?,
            Operator::OpenParen | Operator::CloseParen => unreachable!("precedence 0"),
        };
    }

    Ok(accumulator)
}

/// Evaluates an arithmetic expression.
///
/// Variables are resolved through the given environment; an unset variable
/// evaluates to zero. The result is a signed 64-bit integer.
pub fn eval<E: Env>(expression: &str, env: &E) -> Result<i64, Error> {
    let mut tokens = Tokens::new(expression).peekable();
    let value = parse_binary(&mut tokens, 1, env)?;
    match tokens.next().transpose()? {
        None => Ok(value),
        Some(Token::Term { location, .. } | Token::Operator { location, .. }) => Err(Error {
            cause: ErrorCause::InvalidExpression,
            location,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    #[test]
    fn constants_and_precedence() {
        assert_eq!(eval("0", &EmptyEnv), Ok(0));
        assert_eq!(eval("1 + 2 * 3", &EmptyEnv), Ok(7));
        assert_eq!(eval("(1 + 2) * 3", &EmptyEnv), Ok(9));
        assert_eq!(eval("7 % 4 + 10 / 3", &EmptyEnv), Ok(6));
    }

    #[test]
    fn unary_operators() {
        assert_eq!(eval("-3", &EmptyEnv), Ok(-3));
        assert_eq!(eval("+3", &EmptyEnv), Ok(3));
        assert_eq!(eval("- - 3", &EmptyEnv), Ok(3));
        assert_eq!(eval("10 - -3", &EmptyEnv), Ok(13));
    }

    #[test]
    fn left_associativity() {
        assert_eq!(eval("10 - 4 - 3", &EmptyEnv), Ok(3));
        assert_eq!(eval("100 / 10 / 2", &EmptyEnv), Ok(5));
    }

    #[test]
    fn variables() {
        let mut env = HashMap::new();
        env.insert("x".to_string(), "5".to_string());
        env.insert("empty".to_string(), "".to_string());
        assert_eq!(eval("x * x", &env), Ok(25));
        assert_eq!(eval("unset_variable + 1", &env), Ok(1));
        assert_eq!(eval("empty + 1", &env), Ok(1));
    }

    #[test]
    fn invalid_variable_value() {
        let mut env = HashMap::new();
        env.insert("x".to_string(), "oops".to_string());
        assert_matches!(
            eval("x + 1", &env),
            Err(Error { cause: ErrorCause::InvalidVariableValue(v), .. }) => {
                assert_eq!(v, "oops");
            }
        );
    }

    #[test]
    fn division_by_zero() {
        assert_matches!(
            eval("1 / 0", &EmptyEnv),
            Err(Error { cause: ErrorCause::DivisionByZero, location }) => {
                assert_eq!(location, 2..3);
            }
        );
        assert_matches!(
            eval("1 % (2 - 2)", &EmptyEnv),
            Err(Error { cause: ErrorCause::DivisionByZero, .. })
        );
    }

    #[test]
    fn overflow() {
        let max = i64::MAX.to_string();
        assert_matches!(
            eval(&format!("{max} + 1"), &EmptyEnv),
            Err(Error { cause: ErrorCause::Overflow, .. })
        );
    }

    #[test]
    fn ungrammatical_expressions() {
        assert_matches!(
            eval("", &EmptyEnv),
            Err(Error { cause: ErrorCause::InvalidExpression, .. })
        );
        assert_matches!(
            eval("1 2", &EmptyEnv),
            Err(Error { cause: ErrorCause::InvalidExpression, .. })
        );
        assert_matches!(
            eval("(1", &EmptyEnv),
            Err(Error { cause: ErrorCause::UnclosedParenthesis, location }) => {
                assert_eq!(location, 0..1);
            }
        );
    }
}
