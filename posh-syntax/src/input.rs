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

//! Reading source code for the lexer
//!
//! The lexer reads the source code line by line through the [`Input`]
//! trait. Implementations decide where the code comes from: a string
//! already in memory, a script file, or an interactive terminal that
//! prints a prompt before reading.

use std::fmt::Debug;

/// Current state of the lexer passed to the input function
///
/// The input function can use the context to decide which prompt to show
/// before reading a line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct Context {
    /// Whether the line to be read starts a new command
    ///
    /// This is `false` when the lexer needs more lines to complete the
    /// command it is currently reading, in which case an interactive
    /// input function shows the secondary prompt (`$PS2`).
    pub is_first_line: bool,
}

/// Error returned by an input function
///
/// The inner error is reference-counted so that the lexer can replay the
/// error when it is polled again after a failure.
pub type Error = std::rc::Rc<std::io::Error>;

/// Line-oriented source code reader
pub trait Input: Debug {
    /// Reads the next line.
    ///
    /// The result should contain exactly one line including the trailing
    /// newline character, except that the last line of the input may lack
    /// one. An empty string signals the end of input.
    fn next_line(&mut self, context: &Context) -> Result<String, Error>;
}

/// Input function that reads from a string in memory
#[derive(Clone, Debug)]
pub struct Memory<'a> {
    code: &'a str,
}

impl<'a> Memory<'a> {
    /// Creates a new `Memory` that reads the given code.
    #[must_use]
    pub fn new(code: &'a str) -> Self {
        Memory { code }
    }
}

impl Input for Memory<'_> {
    fn next_line(&mut self, _context: &Context) -> Result<String, Error> {
        let line_end = match self.code.find('\n') {
            Some(index) => index + 1,
            None => self.code.len(),
        };
        let (line, rest) = self.code.split_at(line_end);
        self.code = rest;
        Ok(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_yields_lines_then_empty() {
        let mut input = Memory::new("one\ntwo");
        let context = Context::default();
        assert_eq!(input.next_line(&context).unwrap(), "one\n");
        assert_eq!(input.next_line(&context).unwrap(), "two");
        assert_eq!(input.next_line(&context).unwrap(), "");
        assert_eq!(input.next_line(&context).unwrap(), "");
    }
}
