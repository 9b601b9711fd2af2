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

//! Echo built-in
//!
//! **`echo [-n] [argument...]`** writes its arguments to the standard
//! output, separated by spaces and followed by a newline. With `-n` the
//! newline is omitted. Backslash escapes are not interpreted.

use crate::common::output;
use posh_env::builtin::Result;
use posh_env::semantics::Field;
use posh_env::Env;

/// Entry point for executing the `echo` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut args = args.as_slice();
    let newline = match args.first() {
        Some(first) if first.value == "-n" => {
            args = &args[1..];
            false
        }
        _ => true,
    };

    let mut line = args
        .iter()
        .map(|field| field.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if newline {
        line.push('\n');
    }
    output(env, &line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_joins_arguments_with_spaces() {
        let mut env = Env::new_virtual();
        main(&mut env, Field::dummies(["a", "b c", "d"]));
        assert_eq!(env.virtual_system().stdout(), "a b c d\n");
    }

    #[test]
    fn echo_without_arguments_prints_newline() {
        let mut env = Env::new_virtual();
        main(&mut env, vec![]);
        assert_eq!(env.virtual_system().stdout(), "\n");
    }

    #[test]
    fn echo_n_suppresses_newline() {
        let mut env = Env::new_virtual();
        main(&mut env, Field::dummies(["-n", "x"]));
        assert_eq!(env.virtual_system().stdout(), "x");
    }
}
