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

//! Source code positions
//!
//! Every token and AST node carries a [`Location`] identifying where it
//! came from, so that diagnostics can name the line that caused them.

use std::fmt;
use std::num::NonZeroU64;

/// Position of a syntactic element in the source code
///
/// Lines and columns are counted from 1. The column is measured in
/// characters, not bytes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    /// Line number
    pub line: NonZeroU64,
    /// Column number
    pub column: NonZeroU64,
}

impl Location {
    /// Creates a location for the given line and column.
    ///
    /// # Panics
    ///
    /// If either argument is zero.
    #[must_use]
    pub fn new(line: u64, column: u64) -> Self {
        Location {
            line: NonZeroU64::new(line).expect("line number must be positive"),
            column: NonZeroU64::new(column).expect("column number must be positive"),
        }
    }

    /// Creates a dummy location for tests and synthesized code.
    #[inline]
    #[must_use]
    pub fn dummy() -> Self {
        Self::new(1, 1)
    }

    /// Increases the column number by `count`.
    pub fn advance(&mut self, count: u64) {
        let column = self.column.get().saturating_add(count);
        self.column = NonZeroU64::new(column).unwrap();
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_column_only() {
        let mut location = Location::new(3, 1);
        location.advance(4);
        assert_eq!(location, Location::new(3, 5));
    }

    #[test]
    fn display_names_the_line() {
        assert_eq!(Location::new(42, 7).to_string(), "line 42");
    }
}
