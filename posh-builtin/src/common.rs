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

//! Common functions for implementing built-in utilities

use posh_env::builtin::Result;
use posh_env::io::Fd;
use posh_env::semantics::{Divert, ExitStatus};
use posh_env::Env;

/// Prints a message to the standard output.
///
/// On a write error, a diagnostic goes to the standard error and the
/// result is a failure.
pub fn output(env: &mut Env, content: &str) -> Result {
    match env.write_all(Fd::STDOUT, content.as_bytes()) {
        Ok(()) => Result::new(ExitStatus::SUCCESS),
        Err(errno) => {
            env.print_error(&format!("error printing results to stdout: {errno}"));
            Result::new(ExitStatus::FAILURE)
        }
    }
}

/// Reports a non-fatal error of a built-in.
///
/// The diagnostic is prefixed with the built-in name; the result is a
/// failure and execution continues.
pub fn report_failure(env: &mut Env, name: &str, message: &str) -> Result {
    env.print_error(&format!("{name}: {message}"));
    Result::new(ExitStatus::FAILURE)
}

/// Reports an error that interrupts the shell.
///
/// Special built-in errors terminate a non-interactive shell per POSIX;
/// the `Interrupt` divert implements that (an interactive shell merely
/// aborts the current command).
pub fn report_error(env: &mut Env, name: &str, message: &str) -> Result {
    env.print_error(&format!("{name}: {message}"));
    Result::with_exit_status_and_divert(
        ExitStatus::ERROR,
        posh_env::semantics::Result::Break(Divert::Interrupt(Some(ExitStatus::ERROR))),
    )
}

/// Parses an unsigned decimal operand.
pub fn parse_count(value: &str) -> Option<usize> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
