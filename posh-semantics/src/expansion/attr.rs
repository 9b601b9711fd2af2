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

//! Attributed characters
//!
//! The initial expansion produces characters annotated with where they
//! came from and how they were quoted. The later stages examine the
//! attributes: field splitting only acts on unquoted characters from
//! [`Origin::SoftExpansion`], pathname expansion treats quoted
//! characters as pattern literals, and quote removal deletes the
//! characters that did the quoting.

use posh_env::semantics::Field;
use posh_syntax::source::Location;

/// Origin of an attributed character
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Origin {
    /// The character appeared in the word itself.
    ///
    /// Literal characters are subject to pathname expansion but not to
    /// field splitting.
    Literal,

    /// The character resulted from a tilde expansion.
    ///
    /// Such characters are subject to neither field splitting nor
    /// pathname expansion.
    HardExpansion,

    /// The character resulted from a parameter expansion, command
    /// substitution, or arithmetic expansion.
    ///
    /// Such characters are subject to both field splitting and pathname
    /// expansion when unquoted.
    SoftExpansion,
}

/// Character with attributes describing its origin and quotation
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AttrChar {
    /// Character value
    pub value: char,
    /// Where the character came from
    pub origin: Origin,
    /// Whether the character is quoted by another character
    pub is_quoted: bool,
    /// Whether the character is quoting other characters
    ///
    /// Quoting characters are removed in the quote removal stage.
    pub is_quoting: bool,
}

/// Field of attributed characters
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttrField {
    /// Characters of the field
    pub chars: Vec<AttrChar>,
    /// Location of the word this field resulted from
    pub origin: Location,
}

impl AttrField {
    /// Creates an empty field.
    #[must_use]
    pub fn new(origin: Location) -> Self {
        AttrField {
            chars: Vec::new(),
            origin,
        }
    }

    /// Removes the quoting characters and returns the plain field.
    #[must_use]
    pub fn remove_quotes(self) -> Field {
        let value = self
            .chars
            .iter()
            .filter(|c| !c.is_quoting)
            .map(|c| c.value)
            .collect();
        Field {
            value,
            origin: self.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_quotes_drops_quoting_chars_only() {
        let field = AttrField {
            chars: vec![
                AttrChar {
                    value: '"',
                    origin: Origin::Literal,
                    is_quoted: false,
                    is_quoting: true,
                },
                AttrChar {
                    value: 'a',
                    origin: Origin::Literal,
                    is_quoted: true,
                    is_quoting: false,
                },
                AttrChar {
                    value: '"',
                    origin: Origin::Literal,
                    is_quoted: false,
                    is_quoting: true,
                },
            ],
            origin: Location::dummy(),
        };
        let field = field.remove_quotes();
        assert_eq!(field.value, "a");
    }
}
