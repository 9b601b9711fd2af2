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

//! Tokenization of arithmetic expressions

use std::iter::FusedIterator;
use std::ops::Range;
use thiserror::Error;

/// Cause of a tokenization error
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum TokenError {
    /// A number that cannot be parsed as an integer
    #[error("invalid numeric constant")]
    InvalidNumericConstant,
    /// A character that is not part of any valid token
    #[error("invalid character")]
    InvalidCharacter,
}

/// Description of an error that occurred during tokenization
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error {
    /// Cause of the error
    pub cause: TokenError,
    /// Range of the substring in the parsed expression where the error occurred
    pub location: Range<usize>,
}

/// Operator token
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `%`
    Percent,
}

impl Operator {
    /// Precedence of this operator used as a binary operator
    ///
    /// A higher value binds tighter. Operators that cannot be used as a
    /// binary operator have precedence 0.
    #[must_use]
    pub fn precedence(self) -> u8 {
        use Operator::*;
        match self {
            OpenParen | CloseParen => 0,
            Plus | Minus => 1,
            Asterisk | Slash | Percent => 2,
        }
    }
}

/// Value or variable occurring in an expression
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Term<'a> {
    /// Constant value
    Value(i64),
    /// Variable reference
    Variable {
        /// Variable name
        name: &'a str,
        /// Range of the substring where the variable occurs
        location: Range<usize>,
    },
}

/// Atomic lexical element of an expression
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Token<'a> {
    /// Term
    Term { term: Term<'a>, location: Range<usize> },
    /// Operator
    Operator {
        operator: Operator,
        location: Range<usize>,
    },
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Parses a numeric constant, honoring the `0x` and leading-`0` prefixes.
fn parse_number(source: &str) -> Option<i64> {
    if let Some(hex) = source.strip_prefix("0x").or_else(|| source.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if source != "0" && source.starts_with('0') {
        i64::from_str_radix(&source[1..], 8).ok()
    } else {
        source.parse().ok()
    }
}

/// Iterator that splits an expression into tokens
///
/// Blank characters between tokens are skipped. After an error is yielded,
/// the iterator returns `None`.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    source: &'a str,
    index: usize,
    failed: bool,
}

impl<'a> Tokens<'a> {
    /// Creates a tokenizer for the given expression.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Tokens {
            source,
            index: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let rest = &self.source[self.index..];
        let blanks = rest.len() - rest.trim_start().len();
        let start = self.index + blanks;
        let rest = &self.source[start..];
        let first = rest.chars().next()?;

        let operator = match first {
            '(' => Some(Operator::OpenParen),
            ')' => Some(Operator::CloseParen),
            '+' => Some(Operator::Plus),
            '-' => Some(Operator::Minus),
            '*' => Some(Operator::Asterisk),
            '/' => Some(Operator::Slash),
            '%' => Some(Operator::Percent),
            _ => None,
        };
        if let Some(operator) = operator {
            let location = start..start + first.len_utf8();
            self.index = location.end;
            return Some(Ok(Token::Operator { operator, location }));
        }

        if first.is_ascii_digit() {
            let len = rest
                .find(|c: char| !is_name_char(c))
                .unwrap_or(rest.len());
            let location = start..start + len;
            self.index = location.end;
            return match parse_number(&rest[..len]) {
                Some(value) => Some(Ok(Token::Term {
                    term: Term::Value(value),
                    location: location.clone(),
                })),
                None => {
                    self.failed = true;
                    Some(Err(Error {
                        cause: TokenError::InvalidNumericConstant,
                        location,
                    }))
                }
            };
        }

        if is_name_start(first) {
            let len = rest
                .find(|c: char| !is_name_char(c))
                .unwrap_or(rest.len());
            let location = start..start + len;
            self.index = location.end;
            return Some(Ok(Token::Term {
                term: Term::Variable {
                    name: &rest[..len],
                    location: location.clone(),
                },
                location,
            }));
        }

        self.failed = true;
        Some(Err(Error {
            cause: TokenError::InvalidCharacter,
            location: start..start + first.len_utf8(),
        }))
    }
}

impl FusedIterator for Tokens<'_> {}
