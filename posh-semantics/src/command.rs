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

//! Command execution
//!
//! This module implements the [`Command`] trait, the recursive walk over
//! the abstract syntax tree. Executing a command updates
//! [`Env::exit_status`]; interruptions of the normal control flow
//! (`break`, `continue`, `return`, `exit`, errors that abort the
//! command) are communicated through the
//! [`Divert`](posh_env::semantics::Divert) break value of the result.

use posh_env::option::{Option as ShellOption, State};
use posh_env::semantics::{Divert, ExitStatus, Result};
use posh_env::system::Pid;
use posh_env::Env;

mod and_or;
mod compound_command;
mod function_definition;
mod item;
mod pipeline;
mod simple_command;

/// Syntactic construct that can be executed
pub trait Command {
    /// Executes this command, updating `env.exit_status`.
    fn execute(&self, env: &mut Env) -> Result;
}

impl Command for posh_syntax::syntax::Command {
    fn execute(&self, env: &mut Env) -> Result {
        use posh_syntax::syntax::Command::*;
        match self {
            Simple(command) => command.execute(env),
            Compound(command) => command.execute(env),
            Function(command) => command.execute(env),
        }
    }
}

impl Command for posh_syntax::syntax::List {
    fn execute(&self, env: &mut Env) -> Result {
        for item in &self.0 {
            item.execute(env)?;
        }
        Result::Continue(())
    }
}

/// Makes the shell exit if the `ErrExit` option demands it.
///
/// The exit is suppressed while a [`Condition`](posh_env::stack::Frame)
/// frame is on the stack, i.e. in the condition of `if`/`while`/`until`,
/// in all but the last element of `&&`/`||` lists, and under `!`.
pub(crate) fn apply_errexit(env: &mut Env) -> Result {
    if env.options.get(ShellOption::ErrExit) == State::On
        && !env.stack.errexit_is_suppressed()
        && !env.exit_status.is_successful()
    {
        Result::Break(Divert::Exit(None))
    } else {
        Result::Continue(())
    }
}

/// Waits for a child process and returns its exit status.
pub(crate) fn wait_for_child(env: &mut Env, pid: Pid) -> ExitStatus {
    loop {
        match env.system.waitpid(pid, false) {
            Ok(Some(status)) => {
                if let Some(exit_status) = ExitStatus::from_wait_status(status) {
                    return exit_status;
                }
            }
            Ok(None) => {}
            Err(_) => return ExitStatus::FAILURE,
        }
    }
}

/// Interprets the result of executing a loop body.
///
/// Returns `Ok(true)` to keep looping, `Ok(false)` to leave the loop,
/// or `Err(_)` with a result to propagate to the enclosing construct.
pub(crate) fn filter_loop_divert(result: Result) -> std::result::Result<bool, Result> {
    match result {
        Result::Continue(()) => Ok(true),
        Result::Break(Divert::Break { count: 0 }) => Ok(false),
        Result::Break(Divert::Break { count }) => {
            Err(Result::Break(Divert::Break { count: count - 1 }))
        }
        Result::Break(Divert::Continue { count: 0 }) => Ok(true),
        Result::Break(Divert::Continue { count }) => {
            Err(Result::Break(Divert::Continue { count: count - 1 }))
        }
        other => Err(other),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use posh_env::builtin::{Builtin, Type};
    use posh_env::io::Fd;
    use posh_env::semantics::Field;

    /// Builtin that writes its arguments to standard output, like echo.
    fn echo_main(env: &mut Env, args: Vec<Field>) -> posh_env::builtin::Result {
        let line = args
            .iter()
            .map(|field| field.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            + "\n";
        let _ = env.write_all(Fd::STDOUT, line.as_bytes());
        posh_env::builtin::Result::new(ExitStatus::SUCCESS)
    }

    /// Builtin that returns the status given as its argument.
    fn status_main(_env: &mut Env, args: Vec<Field>) -> posh_env::builtin::Result {
        let status = args
            .first()
            .and_then(|f| f.value.parse().ok())
            .unwrap_or(0);
        posh_env::builtin::Result::new(ExitStatus(status))
    }

    /// Builtin that breaks `n` loops, like the break builtin.
    fn break_main(_env: &mut Env, args: Vec<Field>) -> posh_env::builtin::Result {
        let count: usize = args
            .first()
            .and_then(|f| f.value.parse().ok())
            .unwrap_or(1);
        posh_env::builtin::Result::from(Divert::Break { count: count - 1 })
    }

    /// Builtin that continues `n` loops, like the continue builtin.
    fn continue_main(_env: &mut Env, args: Vec<Field>) -> posh_env::builtin::Result {
        let count: usize = args
            .first()
            .and_then(|f| f.value.parse().ok())
            .unwrap_or(1);
        posh_env::builtin::Result::from(Divert::Continue { count: count - 1 })
    }

    /// Builtin that returns from a function with an optional status.
    fn return_main(env: &mut Env, args: Vec<Field>) -> posh_env::builtin::Result {
        let status = args.first().and_then(|f| f.value.parse().ok());
        posh_env::builtin::Result::with_exit_status_and_divert(
            env.exit_status,
            Result::Break(Divert::Return(status.map(ExitStatus))),
        )
    }

    /// Builtin that does nothing, like the colon builtin.
    fn colon_main(_env: &mut Env, _args: Vec<Field>) -> posh_env::builtin::Result {
        posh_env::builtin::Result::new(ExitStatus::SUCCESS)
    }

    /// Creates a test environment with a minimal builtin set.
    pub(crate) fn test_env() -> Env {
        let mut env = Env::new_virtual();
        env.arg0 = "posh".to_string();
        for (name, execute) in [
            ("echo", echo_main as posh_env::builtin::Main),
            ("status", status_main),
        ] {
            env.builtins.insert(
                name,
                Builtin {
                    r#type: Type::Mandatory,
                    execute,
                },
            );
        }
        for (name, execute) in [
            ("break", break_main as posh_env::builtin::Main),
            ("continue", continue_main),
            ("return", return_main),
            (":", colon_main),
        ] {
            env.builtins.insert(
                name,
                Builtin {
                    r#type: Type::Special,
                    execute,
                },
            );
        }
        env
    }

    /// Parses and executes the given code in the environment.
    pub(crate) fn run(env: &mut Env, code: &str) -> Result {
        use std::str::FromStr;
        let list = posh_syntax::syntax::List::from_str(code).unwrap();
        list.execute(env)
    }

    #[test]
    fn list_runs_items_in_order() {
        let mut env = test_env();
        let result = run(&mut env, "echo one; echo two");
        assert_eq!(result, Result::Continue(()));
        assert_eq!(env.virtual_system().stdout(), "one\ntwo\n");
    }

    #[test]
    fn exit_status_of_last_command() {
        let mut env = test_env();
        run(&mut env, "status 3");
        assert_eq!(env.exit_status, ExitStatus(3));
        run(&mut env, "status 3; status 0");
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn errexit_exits_on_failure() {
        let mut env = test_env();
        env.options.set(ShellOption::ErrExit, State::On);
        let result = run(&mut env, "status 5; echo unreachable");
        assert_eq!(result, Result::Break(Divert::Exit(None)));
        assert_eq!(env.exit_status, ExitStatus(5));
        assert_eq!(env.virtual_system().stdout(), "");
    }

    #[test]
    fn errexit_suppressed_in_condition_contexts() {
        let mut env = test_env();
        env.options.set(ShellOption::ErrExit, State::On);
        let result = run(&mut env, "if status 1; then echo then; else echo else; fi");
        assert_eq!(result, Result::Continue(()));
        assert_eq!(env.virtual_system().stdout(), "else\n");

        let result = run(&mut env, "status 1 && echo and; echo after");
        assert_eq!(result, Result::Continue(()));
        assert_eq!(env.virtual_system().stdout(), "else\nafter\n");

        let result = run(&mut env, "! status 1; echo negated");
        assert_eq!(result, Result::Continue(()));
        assert!(env.virtual_system().stdout().ends_with("negated\n"));
    }
}
