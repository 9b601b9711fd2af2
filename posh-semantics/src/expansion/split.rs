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

//! Field splitting
//!
//! Field splitting divides a field into parts delimited by the field
//! separator characters of `$IFS`. Only unquoted characters originating
//! from a [`SoftExpansion`](Origin::SoftExpansion) are eligible as
//! separators.
//!
//! A run of whitespace separators acts as one delimiter, and is ignored
//! at the beginning and end of the input. A non-whitespace separator
//! delimits exactly one field, optionally flanked by whitespace
//! separators, so `a::b` with `IFS=:` splits into `a`, an empty field,
//! and `b`. As a side effect, a field that is entirely empty (no
//! characters at all) is removed, which makes an unquoted expansion of
//! an empty variable vanish.

use super::attr::{AttrChar, AttrField, Origin};

fn is_separator(c: &AttrChar, ifs: &str) -> bool {
    !c.is_quoted && !c.is_quoting && c.origin == Origin::SoftExpansion && ifs.contains(c.value)
}

fn is_whitespace_separator(c: &AttrChar, ifs: &str) -> bool {
    is_separator(c, ifs) && c.value.is_whitespace()
}

/// Splits a field on the given separator characters.
///
/// With an empty `ifs`, the field is returned intact (unless it is
/// completely empty, in which case the result is empty).
pub fn split(field: AttrField, ifs: &str) -> Vec<AttrField> {
    let origin = field.origin;
    let chars = field.chars;
    let mut fields = Vec::new();
    let mut current = Vec::new();

    let mut i = 0;
    // Ignore leading whitespace separators.
    while i < chars.len() && is_whitespace_separator(&chars[i], ifs) {
        i += 1;
    }

    while i < chars.len() {
        let c = chars[i];
        if is_separator(&c, ifs) {
            // Consume one delimiter: a run of whitespace separators
            // containing at most one non-whitespace separator.
            let mut non_whitespace_seen = false;
            while i < chars.len() && is_separator(&chars[i], ifs) {
                if !is_whitespace_separator(&chars[i], ifs) {
                    if non_whitespace_seen {
                        break;
                    }
                    non_whitespace_seen = true;
                }
                i += 1;
            }
            fields.push(AttrField {
                chars: std::mem::take(&mut current),
                origin,
            });
        } else {
            current.push(c);
            i += 1;
        }
    }

    if !current.is_empty() {
        fields.push(AttrField {
            chars: current,
            origin,
        });
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::source::Location;

    fn soft_field(s: &str) -> AttrField {
        AttrField {
            chars: s
                .chars()
                .map(|value| AttrChar {
                    value,
                    origin: Origin::SoftExpansion,
                    is_quoted: false,
                    is_quoting: false,
                })
                .collect(),
            origin: Location::dummy(),
        }
    }

    fn values(fields: &[AttrField]) -> Vec<String> {
        fields
            .iter()
            .map(|f| f.chars.iter().map(|c| c.value).collect())
            .collect()
    }

    #[test]
    fn whitespace_runs_collapse() {
        let fields = split(soft_field("  a  b \t c  "), " \t\n");
        assert_eq!(values(&fields), ["a", "b", "c"]);
    }

    #[test]
    fn non_whitespace_separators_delimit_exactly_once() {
        let fields = split(soft_field("a::b"), ":");
        assert_eq!(values(&fields), ["a", "", "b"]);

        let fields = split(soft_field(":a"), ":");
        assert_eq!(values(&fields), ["", "a"]);

        // A trailing separator does not create a trailing empty field.
        let fields = split(soft_field("a:"), ":");
        assert_eq!(values(&fields), ["a"]);
    }

    #[test]
    fn mixed_whitespace_and_non_whitespace() {
        let fields = split(soft_field("a : : b"), " :");
        assert_eq!(values(&fields), ["a", "", "b"]);

        let fields = split(soft_field(" a :b"), " :");
        assert_eq!(values(&fields), ["a", "b"]);
    }

    #[test]
    fn empty_field_is_removed() {
        assert_eq!(split(soft_field(""), " \t\n"), []);
    }

    #[test]
    fn empty_ifs_does_not_split() {
        let fields = split(soft_field("a b:c"), "");
        assert_eq!(values(&fields), ["a b:c"]);
    }

    #[test]
    fn quoted_and_literal_characters_are_not_separators() {
        let mut field = soft_field("a b");
        field.chars[1].is_quoted = true;
        let fields = split(field, " ");
        assert_eq!(values(&fields), ["a b"]);

        let mut field = soft_field("a b");
        field.chars[1].origin = Origin::Literal;
        let fields = split(field, " ");
        assert_eq!(values(&fields), ["a b"]);
    }

    #[test]
    fn field_of_only_quoting_chars_survives() {
        // Splitting an empty quoted string keeps its (empty) field.
        let field = AttrField {
            chars: vec![
                AttrChar {
                    value: '"',
                    origin: Origin::Literal,
                    is_quoted: false,
                    is_quoting: true,
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
        let fields = split(field, " \t\n");
        assert_eq!(fields.len(), 1);
    }
}
