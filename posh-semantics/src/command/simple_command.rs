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

//! Simple command semantics
//!
//! A simple command expands its words to fields and resolves the first
//! field through [command search](crate::command_search). Depending on
//! the target:
//!
//! - A built-in runs in the current shell process with its redirections
//!   saved and restored. Assignments persist for a special built-in and
//!   are temporary otherwise.
//! - A function call pushes a regular variable context carrying the new
//!   positional parameters, runs the body, and catches the `return`
//!   divert. The context guard guarantees the locals are popped exactly
//!   once however the body ends.
//! - An external utility runs in a forked child that applies its
//!   redirections, resets the signal dispositions the shell was
//!   catching, and calls `execve`. Assignments go into a volatile
//!   context so they reach the child environment without mutating the
//!   parent's variables.
//!
//! Without a command word, redirections are performed and undone, and
//! the assignments are applied persistently with exit status 0.

use super::{apply_errexit, wait_for_child, Command};
use crate::command_search::{search, Target};
use crate::expansion::{expand_word, expand_words};
use crate::handle::Handle;
use crate::redir::RedirGuard;
use crate::xtrace;
use posh_env::builtin::{Builtin, Type};
use posh_env::function::Function;
use posh_env::semantics::{Divert, ExitStatus, Field, Result};
use posh_env::stack::Frame;
use posh_env::system::Errno;
use posh_env::variable::{Context, PositionalParams, Scope};
use posh_env::Env;
use posh_syntax::syntax::{Assign, SimpleCommand};
use std::ffi::CString;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;

impl Command for SimpleCommand {
    fn execute(&self, env: &mut Env) -> Result {
        let fields = match expand_words(env, self.words.iter()) {
            Ok(fields) => fields,
            Err(error) => return error.handle(env),
        };

        if fields.is_empty() {
            return execute_absent(env, self);
        }

        match search(env, &fields[0].value) {
            Target::Builtin(builtin) => execute_builtin(env, self, builtin, fields),
            Target::Function(function) => execute_function(env, self, &function, fields),
            Target::External { path } => execute_external(env, self, path, fields),
            Target::NotFound => {
                env.print_error(&format!("{}: command not found", fields[0].value));
                env.exit_status = ExitStatus::NOT_FOUND;
                apply_errexit(env)
            }
        }
    }
}

/// Expands and applies the assignments of a simple command.
///
/// Returns the name-value pairs for tracing.
fn apply_assigns(
    env: &mut Env,
    assigns: &[Assign],
    scope: Scope,
    export: bool,
) -> std::result::Result<Vec<(String, String)>, crate::expansion::Error> {
    let mut applied = Vec::with_capacity(assigns.len());
    for assign in assigns {
        let value = expand_word(env, &assign.value)?;
        let mut variable = env.get_or_create_variable(assign.name.clone(), scope);
        variable
            .assign(value.value.clone())
            .map_err(|_| crate::expansion::Error {
                cause: crate::expansion::ErrorCause::AssignReadOnly {
                    name: assign.name.clone(),
                },
                location: assign.location,
            })?;
        if export {
            variable.export(true);
        }
        applied.push((assign.name.clone(), value.value));
    }
    Ok(applied)
}

fn execute_absent(env: &mut Env, command: &SimpleCommand) -> Result {
    if !command.redirs.is_empty() {
        let mut guard = RedirGuard::new(env);
        if let Err(error) = guard.perform_redirs(&*command.redirs) {
            drop(guard);
            return error.handle(env);
        }
    }

    match apply_assigns(env, &command.assigns, Scope::Global, false) {
        Ok(applied) => {
            xtrace::trace_fields(env, &applied, &[]);
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
        Err(error) => error.handle(env),
    }
}

/// Runs a built-in with a frame pushed, returning its result parts.
fn run_builtin(
    env: &mut Env,
    builtin: Builtin,
    mut fields: Vec<Field>,
) -> (ExitStatus, Result, bool) {
    let args = fields.split_off(1);
    let is_special = builtin.r#type == Type::Special;
    let result = {
        let mut env = env.push_frame(Frame::Builtin { is_special });
        (builtin.execute)(&mut env, args)
    };
    (
        result.exit_status(),
        result.divert(),
        result.should_retain_redirs(),
    )
}

fn execute_builtin(
    env: &mut Env,
    command: &SimpleCommand,
    builtin: Builtin,
    fields: Vec<Field>,
) -> Result {
    let mut guard = RedirGuard::new(env);
    if let Err(error) = guard.perform_redirs(&*command.redirs) {
        drop(guard);
        return error.handle(env);
    }

    let (exit_status, divert, retain_redirs) = if builtin.r#type == Type::Special {
        match apply_assigns(&mut guard, &command.assigns, Scope::Global, false) {
            Ok(applied) => xtrace::trace_fields(&mut guard, &applied, &fields),
            Err(error) => {
                drop(guard);
                return error.handle(env);
            }
        }
        run_builtin(&mut guard, builtin, fields)
    } else {
        let mut inner = guard.push_context(Context::Volatile);
        match apply_assigns(&mut inner, &command.assigns, Scope::Volatile, true) {
            Ok(applied) => xtrace::trace_fields(&mut inner, &applied, &fields),
            Err(error) => {
                drop(inner);
                drop(guard);
                return error.handle(env);
            }
        }
        run_builtin(&mut inner, builtin, fields)
    };

    if retain_redirs {
        guard.preserve_redirs();
    }
    drop(guard);

    env.exit_status = exit_status;
    divert?;
    apply_errexit(env)
}

fn execute_function(
    env: &mut Env,
    command: &SimpleCommand,
    function: &Rc<Function>,
    fields: Vec<Field>,
) -> Result {
    let mut guard = RedirGuard::new(env);
    if let Err(error) = guard.perform_redirs(&*command.redirs) {
        drop(guard);
        return error.handle(env);
    }

    let mut outer = guard.push_context(Context::Volatile);
    match apply_assigns(&mut outer, &command.assigns, Scope::Volatile, false) {
        Ok(applied) => xtrace::trace_fields(&mut outer, &applied, &fields),
        Err(error) => {
            drop(outer);
            drop(guard);
            return error.handle(env);
        }
    }

    let positional_params =
        PositionalParams::from_values(fields.into_iter().skip(1).map(|field| field.value));
    let result = {
        let mut inner = outer.push_context(Context::Regular { positional_params });
        function.body.execute(&mut inner)
    };
    drop(outer);
    drop(guard);

    match result {
        Break(Divert::Return(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
            apply_errexit(env)
        }
        Continue(()) => apply_errexit(env),
        other => other,
    }
}

fn execute_external(
    env: &mut Env,
    command: &SimpleCommand,
    path: CString,
    fields: Vec<Field>,
) -> Result {
    let mut outer = env.push_context(Context::Volatile);
    match apply_assigns(&mut outer, &command.assigns, Scope::Volatile, true) {
        Ok(applied) => xtrace::trace_fields(&mut outer, &applied, &fields),
        Err(error) => {
            drop(outer);
            return error.handle(env);
        }
    }

    let environ = outer.variables.environ();
    let args: std::result::Result<Vec<CString>, _> = fields
        .iter()
        .map(|field| CString::new(field.value.clone()))
        .collect();
    let Ok(args) = args else {
        drop(outer);
        env.print_error(&format!("{}: invalid command argument", fields[0].value));
        env.exit_status = ExitStatus::ERROR;
        return apply_errexit(env);
    };

    let redirs = Rc::clone(&command.redirs);
    let child_path = path;
    let child = outer.run_in_subshell(move |env| {
        let mut guard = RedirGuard::new(env);
        if let Err(error) = guard.perform_redirs(&*redirs) {
            drop(guard);
            let _ = error.handle(env);
            return Continue(());
        }
        guard.preserve_redirs();
        drop(guard);

        // Reset the dispositions of signals the shell was catching so
        // the utility starts with the default handling.
        let mut traps = std::mem::take(&mut env.traps);
        traps.disable_internal_catches(&mut *env.system);
        env.traps = traps;

        let errno = env.system.execve(&child_path, &args, &environ);
        let (status, message) = match errno {
            Errno::ENOENT | Errno::ENOTDIR => (ExitStatus::NOT_FOUND, "not found"),
            _ => (ExitStatus::NOEXEC, "cannot execute"),
        };
        env.print_error(&format!(
            "{}: {message}: {errno}",
            child_path.to_string_lossy()
        ));
        env.exit_status = status;
        Continue(())
    });

    match child {
        Ok(pid) => {
            let status = wait_for_child(&mut outer, pid);
            outer.exit_status = status;
        }
        Err(errno) => {
            outer.print_error(&format!("cannot start external utility: {errno}"));
            outer.exit_status = ExitStatus::NOEXEC;
        }
    }
    drop(outer);
    apply_errexit(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::{run, test_env};

    #[test]
    fn assignment_only_command() {
        let mut env = test_env();
        let result = run(&mut env, "x=hello");
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(env.variables.get_scalar("x"), Some("hello"));
        assert!(!env.variables.get("x").unwrap().exported);
    }

    #[test]
    fn assignment_values_are_expanded() {
        let mut env = test_env();
        run(&mut env, "a=1; b=$a$a");
        assert_eq!(env.variables.get_scalar("b"), Some("11"));
    }

    #[test]
    fn command_not_found() {
        let mut env = test_env();
        run(&mut env, "no-such-command");
        assert_eq!(env.exit_status, ExitStatus::NOT_FOUND);
        assert_eq!(
            env.virtual_system().stderr(),
            "posh: no-such-command: command not found\n"
        );
    }

    #[test]
    fn builtin_receives_expanded_arguments() {
        let mut env = test_env();
        run(&mut env, "msg='a b'; echo $msg c");
        assert_eq!(env.virtual_system().stdout(), "a b c\n");
    }

    #[test]
    fn assignment_prefix_on_regular_builtin_is_temporary() {
        let mut env = test_env();
        run(&mut env, "x=outer; x=temp echo $x");
        // The word is expanded before the assignment takes effect.
        assert_eq!(env.virtual_system().stdout(), "outer\n");
        assert_eq!(env.variables.get_scalar("x"), Some("outer"));
    }

    #[test]
    fn assignment_prefix_on_special_builtin_persists() {
        let mut env = test_env();
        run(&mut env, "x=kept :");
        assert_eq!(env.variables.get_scalar("x"), Some("kept"));
    }

    #[test]
    fn builtin_with_redirection_restores_fds() {
        let mut env = test_env();
        run(&mut env, "echo redirected >/file; echo direct");
        assert_eq!(env.virtual_system().stdout(), "direct\n");
        assert_eq!(
            env.virtual_system().file_content("/file").unwrap(),
            b"redirected\n"
        );
    }

    #[test]
    fn redirection_error_fails_command_without_executing() {
        let mut env = test_env();
        let result = run(&mut env, "echo hi </nonexistent; echo next");
        assert_eq!(result, Continue(()));
        // The failed command did not run, but the shell continued.
        assert_eq!(env.virtual_system().stdout(), "next\n");
    }

    #[test]
    fn function_call_with_positional_parameters() {
        let mut env = test_env();
        run(&mut env, "f() { echo $1 $#; }; f one two");
        assert_eq!(env.virtual_system().stdout(), "one 2\n");
        // The caller's positional parameters are untouched.
        assert_eq!(env.variables.positional_params().values.len(), 0);
    }

    #[test]
    fn function_return_divert_is_caught() {
        let mut env = test_env();
        let result = run(&mut env, "f() { return 7; echo no; }; f");
        assert_eq!(result, Continue(()));
        assert_eq!(env.exit_status, ExitStatus(7));
        assert_eq!(env.virtual_system().stdout(), "");
    }

    #[test]
    fn function_scope_restored_on_return() {
        let mut env = test_env();
        // Without a local builtin the function context itself holds the
        // positional parameters; verify the swap-and-restore.
        env.variables.positional_params_mut().values = vec!["outer".to_string()];
        run(&mut env, "f() { echo $1; }; f inner; echo $1");
        assert_eq!(env.virtual_system().stdout(), "inner\nouter\n");
    }

    #[test]
    fn expansion_error_interrupts_command() {
        let mut env = test_env();
        let result = run(&mut env, "echo ${nope:?missing}");
        assert_eq!(
            result,
            Break(Divert::Interrupt(Some(ExitStatus::ERROR)))
        );
        assert_eq!(env.virtual_system().stdout(), "");
        assert!(env.virtual_system().stderr().contains("missing"));
    }

    #[test]
    fn xtrace_prints_expanded_command() {
        use posh_env::option::{Option as ShellOption, State};
        let mut env = test_env();
        env.options.set(ShellOption::XTrace, State::On);
        run(&mut env, "x=1 echo foo");
        assert_eq!(env.virtual_system().stderr(), "+ x=1 echo foo\n");
    }
}
