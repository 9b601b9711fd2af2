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

//! Syntax parser for the shell language
//!
//! This module implements a recursive-descent parser with one token of
//! lookahead over the POSIX shell grammar. The parser reads tokens from a
//! [lexer](lex::Lexer) and produces the abstract syntax tree defined in
//! [`crate::syntax`].
//!
//! The typical usage is to repeatedly call [`Parser::command_line`],
//! which parses one line of commands together with the contents of any
//! here-documents started on it:
//!
//! ```
//! # use posh_syntax::parser::{Parser, lex::Lexer};
//! let mut lexer = Lexer::with_code("echo hello; echo world\n");
//! let mut parser = Parser::new(&mut lexer);
//! let list = parser.command_line().unwrap().unwrap();
//! assert_eq!(list.to_string(), "echo hello; echo world");
//! ```
//!
//! Errors are values: a failed parse returns an [`Error`] and never
//! panics or unwinds across the read-eval loop. The caller inspects
//! [`ErrorCause::is_incomplete_input`] to decide whether to read more
//! lines (interactive continuation) or report the error.

pub mod lex;

mod compound_command;
mod core;
mod from_str;
mod list;
mod redir;
mod simple_command;

pub use self::core::{Config, Error, ErrorCause, Parser, Result, SyntaxError};
