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

//! Exec built-in
//!
//! **`exec [command [argument...]]`** replaces the shell with the named
//! utility without creating a new process. Without a command, the
//! redirections applied to the built-in persist in the shell, which is
//! the idiomatic way to open file descriptors (`exec 3<file`).

use posh_env::builtin::Result;
use posh_env::semantics::{Divert, ExitStatus, Field};
use posh_env::variable::PATH;
use posh_env::Env;
use std::ffi::CString;

fn find_utility(env: &Env, name: &str) -> Option<CString> {
    if name.contains('/') {
        return CString::new(name).ok();
    }
    let search_path = env.variables.get_scalar(PATH).unwrap_or("").to_string();
    for dir in search_path.split(':') {
        let path = if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        };
        if let Ok(c_path) = CString::new(path) {
            if env.system.is_executable_file(&c_path) {
                return Some(c_path);
            }
        }
    }
    None
}

/// Entry point for executing the `exec` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some(command) = args.first() else {
        // Keep the redirections in effect.
        let mut result = Result::new(env.exit_status);
        result.retain_redirs();
        return result;
    };

    let fail = |env: &mut Env, status: ExitStatus, message: &str| {
        env.print_error(&format!("exec: {message}"));
        if env.is_interactive() {
            Result::new(status)
        } else {
            Result::with_exit_status_and_divert(
                status,
                posh_env::semantics::Result::Break(Divert::Exit(Some(status))),
            )
        }
    };

    let Some(path) = find_utility(env, &command.value) else {
        let message = format!("{}: not found", command.value);
        return fail(env, ExitStatus::NOT_FOUND, &message);
    };

    let environ = env.variables.environ();
    let arguments: std::result::Result<Vec<CString>, _> = args
        .iter()
        .map(|field| CString::new(field.value.clone()))
        .collect();
    let Ok(arguments) = arguments else {
        return fail(env, ExitStatus::ERROR, "invalid argument");
    };

    // Reset the dispositions of internally caught signals.
    let mut traps = std::mem::take(&mut env.traps);
    traps.disable_internal_catches(&mut *env.system);
    env.traps = traps;

    let errno = env.system.execve(&path, &arguments, &environ);
    let message = format!("{}: {errno}", command.value);
    fail(env, ExitStatus::NOEXEC, &message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_without_command_retains_redirections() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, vec![]);
        assert!(result.should_retain_redirs());
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
    }

    #[test]
    fn exec_of_missing_utility_exits_noninteractive_shell() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["no-such-utility"]));
        assert_eq!(result.exit_status(), ExitStatus::NOT_FOUND);
        assert_matches::assert_matches!(
            result.divert(),
            posh_env::semantics::Result::Break(Divert::Exit(_))
        );
    }
}
