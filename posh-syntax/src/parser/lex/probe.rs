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

//! Quick incompleteness probe for a single input line
//!
//! The interactive driver wants to know whether a line the user typed can
//! possibly be a complete command before handing it to the parser, so
//! that it can keep reading continuation lines for an unclosed quote or a
//! trailing backslash. This scanner only examines quoting; deeper
//! incompleteness (an open `if` or a pending here-document) is detected
//! by the parser itself and reported through
//! [`ErrorCause::is_incomplete_input`](crate::parser::ErrorCause::is_incomplete_input).

/// Result of [`probe_line`]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct LineStatus {
    /// Whether the line is free of the conditions below
    pub complete: bool,
    /// Whether a single-quoted string is left open
    pub open_single_quote: bool,
    /// Whether a double-quoted string is left open
    pub open_double_quote: bool,
    /// Whether the line ends with an unquoted backslash, i.e. a line
    /// continuation
    pub trailing_backslash: bool,
}

/// Scans a candidate input line for quoting left open at its end.
///
/// The argument should not include the terminating newline.
#[must_use]
pub fn probe_line(line: &str) -> LineStatus {
    let mut single = false;
    let mut double = false;
    let mut escaped = false;

    for c in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            _ if single => {
                if c == '\'' {
                    single = false;
                }
            }
            '\\' => escaped = true,
            '\'' if !double => single = true,
            '"' => double = !double,
            _ => {}
        }
    }

    LineStatus {
        complete: !single && !double && !escaped,
        open_single_quote: single,
        open_double_quote: double,
        trailing_backslash: escaped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_lines() {
        assert!(probe_line("echo hello").complete);
        assert!(probe_line("echo 'a' \"b\" \\;").complete);
        assert!(probe_line("").complete);
    }

    #[test]
    fn open_single_quote() {
        let status = probe_line("echo 'abc");
        assert!(!status.complete);
        assert!(status.open_single_quote);
        assert!(!status.open_double_quote);
    }

    #[test]
    fn open_double_quote() {
        let status = probe_line("echo \"abc 'x'");
        assert!(!status.complete);
        assert!(status.open_double_quote);
        assert!(!status.open_single_quote);
    }

    #[test]
    fn trailing_backslash() {
        let status = probe_line("echo abc\\");
        assert!(!status.complete);
        assert!(status.trailing_backslash);
    }

    #[test]
    fn backslash_inside_single_quotes_is_literal() {
        let status = probe_line(r"echo 'a\");
        assert!(status.open_single_quote);
        assert!(!status.trailing_backslash);
    }

    #[test]
    fn escaped_quote_does_not_open() {
        assert!(probe_line(r"echo \'").complete);
        assert!(probe_line(r#"echo \""#).complete);
    }
}
