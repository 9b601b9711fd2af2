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

//! Lexical analyzer
//!
//! The [`Lexer`] scans the source code and yields [`Token`]s on demand.
//! It is a single pass over the character stream with rewind support,
//! which the word sub-parsers use for backtracking and the parser uses
//! for alias substitution.

mod core;
mod heredoc;
mod keyword;
mod op;
mod probe;
mod word;

pub use self::core::{is_blank, Lexer, SourceChar, Token, TokenId};
pub use self::keyword::{Keyword, ParseKeywordError};
pub use self::op::{is_operator_char, Operator};
pub use self::probe::{probe_line, LineStatus};

/// Returns true if the character delimits an ordinary token.
#[must_use]
pub fn is_token_delimiter(c: char) -> bool {
    is_blank(c) || is_operator_char(c)
}
