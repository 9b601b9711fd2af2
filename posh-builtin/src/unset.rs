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

//! Unset built-in
//!
//! **`unset [-fv] name...`** removes variables (`-v`, the default) or
//! functions (`-f`). Unsetting a read-only variable fails and leaves it
//! intact; unsetting a name that is not set is not an error.

use crate::common::report_failure;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::Env;

/// Entry point for executing the `unset` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut functions = false;
    let mut operands = Vec::new();
    for arg in &args {
        match arg.value.as_str() {
            "-f" => functions = true,
            "-v" => functions = false,
            _ => operands.push(arg),
        }
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in operands {
        if functions {
            if env.functions.unset(&operand.value).is_err() {
                let result = report_failure(
                    env,
                    "unset",
                    &format!("{}: read-only function", operand.value),
                );
                exit_status = result.exit_status();
            }
        } else if env.variables.unset(operand.value.as_str()).is_err() {
            let result = report_failure(
                env,
                "unset",
                &format!("{}: read-only variable", operand.value),
            );
            exit_status = result.exit_status();
        }
    }
    Result::new(exit_status)
}
