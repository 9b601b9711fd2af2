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

//! Exit built-in
//!
//! **`exit [n]`** makes the shell exit with status *n*, defaulting to
//! the current value of `$?`. The EXIT trap, if any, runs before
//! termination; that is the caller's responsibility when it observes
//! the `Exit` divert.

use crate::common::report_error;
use posh_env::builtin::Result;
use posh_env::semantics::{Divert, ExitStatus, Field};
use posh_env::Env;

/// Entry point for executing the `exit` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let exit_status = match args.first() {
        None => None,
        Some(field) => match field.value.parse() {
            Ok(status) => Some(ExitStatus(status)),
            Err(_) => {
                return report_error(
                    env,
                    "exit",
                    &format!("`{}' is not a valid exit status", field.value),
                )
            }
        },
    };
    Result::with_exit_status_and_divert(
        exit_status.unwrap_or(env.exit_status),
        posh_env::semantics::Result::Break(Divert::Exit(exit_status)),
    )
}
