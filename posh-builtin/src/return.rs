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

//! Return built-in
//!
//! **`return [n]`** returns from the current function with exit status
//! *n*, defaulting to the current value of `$?`. The `Return` divert
//! propagates until the function-call frame catches it; at the top
//! level of a script it behaves like `exit`.

use crate::common::report_error;
use posh_env::builtin::Result;
use posh_env::semantics::{Divert, Field};
use posh_env::Env;

/// Entry point for executing the `return` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let exit_status = match args.first() {
        None => None,
        Some(field) => match field.value.parse() {
            Ok(status) => Some(posh_env::semantics::ExitStatus(status)),
            Err(_) => {
                return report_error(
                    env,
                    "return",
                    &format!("`{}' is not a valid exit status", field.value),
                )
            }
        },
    };
    Result::with_exit_status_and_divert(
        exit_status.unwrap_or(env.exit_status),
        posh_env::semantics::Result::Break(Divert::Return(exit_status)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::semantics::ExitStatus;

    #[test]
    fn return_with_operand() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["7"]));
        assert_eq!(
            result.divert(),
            posh_env::semantics::Result::Break(Divert::Return(Some(ExitStatus(7))))
        );
    }

    #[test]
    fn return_defaults_to_current_status() {
        let mut env = Env::new_virtual();
        env.exit_status = ExitStatus(5);
        let result = main(&mut env, vec![]);
        assert_eq!(
            result.divert(),
            posh_env::semantics::Result::Break(Divert::Return(None))
        );
        assert_eq!(result.exit_status(), ExitStatus(5));
    }
}
