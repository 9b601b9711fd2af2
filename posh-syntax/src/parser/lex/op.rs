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

//! Operator recognition in the lexer

use super::core::Lexer;
use super::core::Token;
use super::core::TokenId;
use crate::parser::core::Result;
use crate::syntax::Literal;
use crate::syntax::Unquoted;
use crate::syntax::Word;
use std::fmt;

/// Operator token identifier
///
/// Operators are recognized by maximal munch: a two-character operator
/// takes precedence over its one-character prefix. The newline is treated
/// as an operator token of its own.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `\n`
    Newline,
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `;`
    Semicolon,
    /// `;;`
    SemicolonSemicolon,
    /// `|`
    Bar,
    /// `||`
    BarBar,
    /// `<`
    Less,
    /// `<&`
    LessAnd,
    /// `<<`
    LessLess,
    /// `<<-`
    LessLessDash,
    /// `<>`
    LessGreater,
    /// `>`
    Greater,
    /// `>&`
    GreaterAnd,
    /// `>>`
    GreaterGreater,
    /// `>|`
    GreaterBar,
}

impl Operator {
    /// Returns the string representation of the operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        use Operator::*;
        match self {
            Newline => "\n",
            And => "&",
            AndAnd => "&&",
            OpenParen => "(",
            CloseParen => ")",
            Semicolon => ";",
            SemicolonSemicolon => ";;",
            Bar => "|",
            BarBar => "||",
            Less => "<",
            LessAnd => "<&",
            LessLess => "<<",
            LessLessDash => "<<-",
            LessGreater => "<>",
            Greater => ">",
            GreaterAnd => ">&",
            GreaterGreater => ">>",
            GreaterBar => ">|",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Returns true if the character can start an operator.
#[must_use]
pub fn is_operator_char(c: char) -> bool {
    matches!(c, '\n' | '&' | '(' | ')' | ';' | '|' | '<' | '>')
}

impl Lexer<'_> {
    /// Consumes the next character if it equals `expected`, honoring line
    /// continuations before it.
    fn next_operator_char_is(&mut self, expected: char) -> Result<bool> {
        while self.line_continuation()? {}
        Ok(self.consume_char_if(|c| c == expected)?.is_some())
    }

    /// Parses an operator token at the current position, if any.
    ///
    /// This function must be called after blanks and comments have been
    /// skipped. The index must be saved by the caller beforehand to fill
    /// in [`Token::index`].
    pub(crate) fn operator(&mut self, index: usize) -> Result<Option<Token>> {
        use Operator::*;

        let Some(sc) = self.consume_char_if(is_operator_char)? else {
            return Ok(None);
        };
        let location = sc.location;
        let first = sc.value;

        let operator = match first {
            '\n' => Newline,
            '(' => OpenParen,
            ')' => CloseParen,
            '&' => {
                if self.next_operator_char_is('&')? {
                    AndAnd
                } else {
                    And
                }
            }
            ';' => {
                if self.next_operator_char_is(';')? {
                    SemicolonSemicolon
                } else {
                    Semicolon
                }
            }
            '|' => {
                if self.next_operator_char_is('|')? {
                    BarBar
                } else {
                    Bar
                }
            }
            '<' => {
                if self.next_operator_char_is('<')? {
                    if self.next_operator_char_is('-')? {
                        LessLessDash
                    } else {
                        LessLess
                    }
                } else if self.next_operator_char_is('&')? {
                    LessAnd
                } else if self.next_operator_char_is('>')? {
                    LessGreater
                } else {
                    Less
                }
            }
            '>' => {
                if self.next_operator_char_is('>')? {
                    GreaterGreater
                } else if self.next_operator_char_is('&')? {
                    GreaterAnd
                } else if self.next_operator_char_is('|')? {
                    GreaterBar
                } else {
                    Greater
                }
            }
            _ => unreachable!("is_operator_char returned true for {first:?}"),
        };

        let units = operator
            .as_str()
            .chars()
            .map(|c| Unquoted(Literal(c)))
            .collect();
        let word = Word { units, location };
        Ok(Some(Token {
            word,
            id: TokenId::Operator(operator),
            index,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_operator(code: &str) -> Operator {
        let mut lexer = Lexer::with_code(code);
        let token = lexer.token().unwrap();
        match token.id {
            TokenId::Operator(op) => op,
            id => panic!("not an operator: {id:?}"),
        }
    }

    #[test]
    fn single_character_operators() {
        assert_eq!(lex_operator("&"), Operator::And);
        assert_eq!(lex_operator(";"), Operator::Semicolon);
        assert_eq!(lex_operator("("), Operator::OpenParen);
        assert_eq!(lex_operator("<"), Operator::Less);
    }

    #[test]
    fn maximal_munch() {
        assert_eq!(lex_operator("&&"), Operator::AndAnd);
        assert_eq!(lex_operator(";;"), Operator::SemicolonSemicolon);
        assert_eq!(lex_operator("<<-"), Operator::LessLessDash);
        assert_eq!(lex_operator("<<"), Operator::LessLess);
        assert_eq!(lex_operator(">|"), Operator::GreaterBar);
        assert_eq!(lex_operator(">>"), Operator::GreaterGreater);
        assert_eq!(lex_operator("<>"), Operator::LessGreater);
    }

    #[test]
    fn operator_with_line_continuation() {
        assert_eq!(lex_operator("<\\\n<"), Operator::LessLess);
    }

    #[test]
    fn operator_followed_by_other_characters() {
        assert_eq!(lex_operator("<;"), Operator::Less);
        assert_eq!(lex_operator("&|"), Operator::And);
    }
}
