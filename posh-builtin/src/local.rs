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

//! Local built-in
//!
//! **`local name[=value]...`** declares variables in the scope of the
//! calling function. The declaration hides any variable of the same
//! name in an outer scope; returning from the function reveals the
//! outer variable again, exactly restoring its value and attributes.

use crate::common::report_failure;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::variable::Scope;
use posh_env::Env;
use posh_syntax::syntax::is_name;

/// Entry point for executing the `local` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    for operand in args {
        let (name, value) = match operand.value.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (operand.value.as_str(), None),
        };
        if !is_name(name) {
            return report_failure(
                env,
                "local",
                &format!("`{}' is not a valid variable name", operand.value),
            );
        }

        let mut variable = env.get_or_create_variable(name.to_string(), Scope::Local);
        if let Some(value) = value {
            if variable.assign(value).is_err() {
                return report_failure(env, "local", &format!("{name}: read-only variable"));
            }
        }
    }
    Result::new(ExitStatus::SUCCESS)
}
