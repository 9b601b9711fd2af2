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

//! Shift built-in
//!
//! **`shift [n]`** discards the first *n* positional parameters,
//! defaulting to one. Shifting more parameters than exist is an error.

use crate::common::{parse_count, report_error};
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::Env;

/// Entry point for executing the `shift` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let count = match args.first() {
        None => 1,
        Some(field) => match parse_count(&field.value) {
            Some(count) => count,
            None => {
                return report_error(
                    env,
                    "shift",
                    &format!("`{}' is not a valid operand", field.value),
                )
            }
        },
    };

    let params = &mut env.variables.positional_params_mut().values;
    if count > params.len() {
        let message = format!(
            "cannot shift {count} parameters ({} available)",
            params.len()
        );
        return report_error(env, "shift", &message);
    }
    params.drain(..count);
    Result::new(ExitStatus::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::variable::PositionalParams;

    #[test]
    fn shift_discards_leading_parameters() {
        let mut env = Env::new_virtual();
        *env.variables.positional_params_mut() =
            PositionalParams::from_values(["a", "b", "c"]);
        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_eq!(env.variables.positional_params().values, ["b", "c"]);

        main(&mut env, Field::dummies(["2"]));
        assert!(env.variables.positional_params().values.is_empty());
    }

    #[test]
    fn shifting_too_many_is_an_error() {
        let mut env = Env::new_virtual();
        *env.variables.positional_params_mut() = PositionalParams::from_values(["a"]);
        let result = main(&mut env, Field::dummies(["2"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
        assert_eq!(env.variables.positional_params().values, ["a"]);
    }
}
