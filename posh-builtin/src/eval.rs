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

//! Eval built-in
//!
//! **`eval [arg...]`** concatenates the arguments with spaces and
//! executes the result as a shell program in the current environment.

use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::Env;
use posh_semantics::run_command_string;

/// Entry point for executing the `eval` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let command = args
        .iter()
        .map(|field| field.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if command.is_empty() {
        return Result::new(ExitStatus::SUCCESS);
    }

    let divert = run_command_string(env, &command);
    Result::with_exit_status_and_divert(env.exit_status, divert)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_eval_succeeds() {
        let mut env = Env::new_virtual();
        env.exit_status = ExitStatus(5);
        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
    }

    #[test]
    fn eval_runs_concatenated_arguments() {
        let mut env = Env::new_virtual();
        // No builtins registered: the evaluated command is not found,
        // which still proves the arguments were joined and parsed.
        env.arg0 = "posh".to_string();
        let result = main(&mut env, Field::dummies(["no-such", "command"]));
        assert_eq!(result.exit_status(), ExitStatus::NOT_FOUND);
        assert!(env
            .virtual_system()
            .stderr()
            .contains("no-such: command not found"));
    }
}
