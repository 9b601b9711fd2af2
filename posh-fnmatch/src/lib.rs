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

//! Pattern matching based on POSIX globbing patterns
//!
//! This crate performs matching by converting the pattern to a regular
//! expression. Supported syntax:
//!
//! - Any single character (`?`)
//! - Any character sequence (`*`)
//! - Bracket expression (`[...]`)
//!     - Character literals and ranges (e.g. `a-z`)
//!     - Complement (`[!...]`)
//!     - Collating symbols (e.g. `[.ch.]`) and equivalence classes
//!       (e.g. `[=a=]`), matching the spelled characters only
//!     - Character classes (`[:alpha:]`)
//!
//! A [`Pattern`] always matches the whole subject string. Quoted
//! characters in the source word are passed as [`PatternChar::Literal`]
//! so that they lose their special meaning, which is how the shell
//! implements the quoting rules for `case`, pathname expansion, and the
//! `%`/`#` parameter modifiers.
//!
//! ```
//! # use posh_fnmatch::{Pattern, without_escape};
//! let p = Pattern::parse(without_escape("foo*.txt")).unwrap();
//! assert!(p.is_match("foobar.txt"));
//! assert!(!p.is_match("foobar.text"));
//! ```

use regex::Regex;
use thiserror::Error;

pub mod ast;
mod char_iter;

pub use char_iter::{with_escape, without_escape, PatternChar, WithEscape, WithoutEscape};

/// Error that may happen in pattern parsing and compilation
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A character class with an unsupported name, e.g. `[[:bogus:]]`
    #[error("undefined character class [:{0}:]")]
    UndefinedCharClass(String),

    /// Error in the underlying regular expression engine
    #[error("cannot compile pattern: {0}")]
    RegexError(String),
}

/// Configuration for a pattern
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct Config {
    /// Whether a leading period must be matched explicitly
    ///
    /// When `true`, a `*`, `?`, or bracket expression at the start of the
    /// pattern does not match a period at the start of the subject, as
    /// required for pathname expansion.
    pub literal_period: bool,
}

impl Config {
    /// Creates a new configuration with the given `literal_period` setting
    /// and all other fields at their default value.
    pub fn with_literal_period(literal_period: bool) -> Self {
        Self {
            literal_period,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
enum Body {
    /// Optimized form for a pattern without metacharacters
    Literal(String),
    /// General form
    Regex(Regex),
}

/// Compiled globbing pattern
#[derive(Clone, Debug)]
#[must_use = "creating a pattern without doing pattern matching is nonsense"]
pub struct Pattern {
    body: Body,
}

impl Pattern {
    /// Compiles a pattern with the default configuration.
    #[inline]
    pub fn parse<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
    {
        Self::parse_with_config(pattern, Config::default())
    }

    /// Compiles a pattern with the specified configuration.
    pub fn parse_with_config<I>(pattern: I, config: Config) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
    {
        let ast = ast::Ast::new(pattern)?;
        let body = match ast.to_literal() {
            Some(literal) => Body::Literal(literal),
            None => {
                let regex = ast::to_regex(&ast, config);
                match Regex::new(&regex) {
                    Ok(regex) => Body::Regex(regex),
                    Err(e) => return Err(Error::RegexError(e.to_string())),
                }
            }
        };
        Ok(Pattern { body })
    }

    /// Returns the pattern as a literal string if it contains no
    /// metacharacters.
    ///
    /// Callers use this to skip the file system walk in pathname
    /// expansion and to fall back to string comparison in `case`.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match &self.body {
            Body::Literal(s) => Some(s),
            Body::Regex(_) => None,
        }
    }

    /// Returns whether this pattern matches the whole given string.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match &self.body {
            Body::Literal(s) => s == text,
            Body::Regex(regex) => regex.is_match(text),
        }
    }
}
