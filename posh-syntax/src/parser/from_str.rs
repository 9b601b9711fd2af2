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

//! Implementations of [`FromStr`] for the syntax types
//!
//! These implementations construct a throwaway lexer and parser over the
//! given string. They are mainly useful in tests and for re-parsing
//! captured command substitution contents.

use super::core::{Error, Parser, Result};
use super::lex::{is_token_delimiter, Lexer};
use crate::syntax::{List, Word};
use std::str::FromStr;

impl FromStr for Word {
    type Err = Error;

    /// Parses a single word from the string.
    ///
    /// Characters after the first token delimiter are ignored.
    fn from_str(s: &str) -> Result<Word> {
        let mut lexer = Lexer::with_code(s);
        lexer.word(is_token_delimiter)
    }
}

impl FromStr for List {
    type Err = Error;

    /// Parses a whole program from the string.
    fn from_str(s: &str) -> Result<List> {
        let mut lexer = Lexer::with_code(s);
        let mut parser = Parser::new(&mut lexer);
        let mut items = Vec::new();
        while let Some(list) = parser.command_line()? {
            items.extend(list.0);
        }
        Ok(List(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_from_str() {
        let word: Word = "foo'bar'".parse().unwrap();
        assert_eq!(word.units.len(), 4);
    }

    #[test]
    fn list_from_str() {
        let list: List = "echo a; echo b\necho c\n".parse().unwrap();
        assert_eq!(list.0.len(), 3);
    }

    #[test]
    fn list_from_str_with_here_doc() {
        let list: List = "cat <<EOF\nhello\nEOF\n".parse().unwrap();
        assert_eq!(list.0.len(), 1);
    }
}
