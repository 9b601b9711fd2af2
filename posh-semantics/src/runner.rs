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

//! The read-eval loop
//!
//! [`read_eval_loop`] parses and executes commands one line at a time.
//! Before each line it dispatches pending traps and reaps finished
//! asynchronous jobs. A syntax error aborts a non-interactive shell
//! with exit status 2 and makes an interactive shell skip to the next
//! line.

use crate::command::Command;
use crate::handle::Handle;
use posh_env::job::Pid;
use posh_env::option::{Option as ShellOption, State};
use posh_env::semantics::{Divert, ExitStatus, Result};
use posh_env::Env;
use posh_syntax::parser::lex::Lexer;
use posh_syntax::parser::{Config, Parser};
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;

/// Reaps finished asynchronous jobs without blocking.
fn update_jobs(env: &mut Env) {
    loop {
        match env.system.waitpid(Pid::from_raw(-1), true) {
            Ok(Some(status)) => {
                if let Some(pid) = status.pid() {
                    env.jobs.update_status(pid, status);
                }
            }
            Ok(None) | Err(_) => break,
        }
    }

    let report = env.is_interactive()
        || env.options.get(ShellOption::Notify) == State::On;
    for line in env.jobs.take_finished_reports() {
        if report {
            env.print_raw_error(&format!("{line}\n"));
        }
    }
}

/// Interprets the result of executing one command line.
///
/// An `Interrupt` divert aborts the current command: an interactive
/// shell resumes prompting, a non-interactive shell exits. `Return` at
/// the top level is treated like `Exit`.
fn handle_divert(env: &mut Env, result: Result) -> Result {
    match result {
        Continue(()) => Continue(()),
        Break(Divert::Interrupt(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
            if env.is_interactive() {
                Continue(())
            } else {
                Break(Divert::Exit(None))
            }
        }
        Break(Divert::Return(exit_status)) => {
            Break(Divert::Exit(exit_status))
        }
        // A break or continue that reached the top level is a no-op.
        Break(Divert::Break { .. } | Divert::Continue { .. }) => Continue(()),
        other => other,
    }
}

/// Parses and executes commands from the lexer until the end of input.
///
/// The final exit status is left in `env.exit_status`; the result
/// carries an `Exit` or `Abort` divert when one terminated the loop.
pub fn read_eval_loop(env: &mut Env, lexer: &mut Lexer) -> Result {
    loop {
        let result = crate::trap::run_traps_for_caught_signals(env);
        handle_divert(env, result)?;
        update_jobs(env);

        lexer.flush();
        let config = Config {
            aliases: Rc::new(env.aliases.clone()),
        };
        let mut parser = Parser::with_config(lexer, config);
        let parsed = parser.command_line();
        drop(parser);

        match parsed {
            Ok(None) => return Continue(()),
            Ok(Some(list)) => {
                if env.options.get(ShellOption::Exec) == State::Off {
                    continue;
                }
                let result = list.execute(env);
                handle_divert(env, result)?;
            }
            Err(error) => {
                let _ = error.handle(env);
                if !env.is_interactive() {
                    return Break(Divert::Exit(Some(ExitStatus::ERROR)));
                }
                // Discard the rest of the erroneous line.
                while let Ok(Some(c)) = lexer.peek_char() {
                    lexer.consume_char();
                    if c == '\n' {
                        break;
                    }
                }
            }
        }
    }
}

/// Parses and executes a command string.
///
/// This re-enters the full lexer-parser-executor pipeline; it is how
/// command substitutions, trap actions, and the `eval` built-in run
/// their code.
pub fn run_command_string(env: &mut Env, code: &str) -> Result {
    let mut lexer = Lexer::with_code(code);
    read_eval_loop(env, &mut lexer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::test_env;

    #[test]
    fn empty_input_succeeds() {
        let mut env = test_env();
        env.exit_status = ExitStatus(9);
        let result = run_command_string(&mut env, "");
        assert_eq!(result, Continue(()));
        // An empty program leaves the exit status alone; the caller
        // decides the final status.
        assert_eq!(env.exit_status, ExitStatus(9));
    }

    #[test]
    fn commands_run_line_by_line() {
        let mut env = test_env();
        let result = run_command_string(&mut env, "echo one\necho two\n");
        assert_eq!(result, Continue(()));
        assert_eq!(env.virtual_system().stdout(), "one\ntwo\n");
    }

    #[test]
    fn syntax_error_exits_noninteractive_shell_with_status_2() {
        let mut env = test_env();
        let result = run_command_string(&mut env, "echo ok\nfi\necho not reached\n");
        assert_eq!(result, Break(Divert::Exit(Some(ExitStatus::ERROR))));
        assert_eq!(env.exit_status, ExitStatus::ERROR);
        assert_eq!(env.virtual_system().stdout(), "ok\n");
        assert!(env.virtual_system().stderr().contains("line 2"));
    }

    #[test]
    fn syntax_error_continues_interactive_shell() {
        use posh_env::option::Option as ShellOption;
        let mut env = test_env();
        env.options.set(ShellOption::Interactive, State::On);
        let result = run_command_string(&mut env, "fi\necho recovered\n");
        assert_eq!(result, Continue(()));
        assert_eq!(env.virtual_system().stdout(), "recovered\n");
    }

    #[test]
    fn noexec_parses_but_does_not_run() {
        let mut env = test_env();
        env.options.set(ShellOption::Exec, State::Off);
        let result = run_command_string(&mut env, "echo hi\n");
        assert_eq!(result, Continue(()));
        assert_eq!(env.virtual_system().stdout(), "");
    }

    #[test]
    fn aliases_are_substituted() {
        use posh_syntax::alias::HashEntry;
        use posh_syntax::source::Location;
        let mut env = test_env();
        env.aliases.insert(HashEntry::new(
            "greet".to_string(),
            "echo hello".to_string(),
            Location::dummy(),
        ));
        run_command_string(&mut env, "greet world\n");
        assert_eq!(env.virtual_system().stdout(), "hello world\n");
    }
}
