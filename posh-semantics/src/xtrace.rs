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

//! Execution tracing
//!
//! With the `XTrace` option on, the shell prints each simple command
//! after expansion to the standard error, prefixed with the value of
//! `$PS4`.

use posh_env::option::{Option as ShellOption, State};
use posh_env::semantics::Field;
use posh_env::variable::{PS4, PS4_INITIAL_VALUE};
use posh_env::Env;
use std::fmt::Write;

/// Quotes a field value for tracing output if it contains characters
/// that would not survive re-parsing.
fn quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+-./:=@_^,".contains(c))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Returns whether tracing is enabled.
#[must_use]
pub fn is_tracing(env: &Env) -> bool {
    env.options.get(ShellOption::XTrace) == State::On
}

/// Prints a trace line for the given assignments and fields.
pub fn trace_fields(env: &mut Env, assigns: &[(String, String)], fields: &[Field]) {
    if !is_tracing(env) {
        return;
    }

    let prefix = env
        .variables
        .get_scalar(PS4)
        .unwrap_or(PS4_INITIAL_VALUE)
        .to_string();
    let mut line = prefix;
    let mut first = true;
    for (name, value) in assigns {
        if !std::mem::take(&mut first) {
            line.push(' ');
        }
        let _ = write!(line, "{name}={}", quote(value));
    }
    for field in fields {
        if !std::mem::take(&mut first) {
            line.push(' ');
        }
        line.push_str(&quote(&field.value));
    }
    line.push('\n');
    env.print_raw_error(&line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a=b/c.txt"), "a=b/c.txt");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("has space"), "'has space'");
        assert_eq!(quote("a'b"), "'a'\\''b'");
    }

    #[test]
    fn trace_goes_to_stderr_with_ps4() {
        let mut env = Env::new_virtual();
        env.options.set(ShellOption::XTrace, State::On);
        trace_fields(
            &mut env,
            &[("x".to_string(), "1".to_string())],
            &Field::dummies(["echo", "a b"]),
        );
        assert_eq!(env.virtual_system().stderr(), "+ x=1 echo 'a b'\n");
    }

    #[test]
    fn no_trace_when_disabled() {
        let mut env = Env::new_virtual();
        trace_fields(&mut env, &[], &Field::dummies(["echo"]));
        assert_eq!(env.virtual_system().stderr(), "");
    }
}
