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

//! Entry point of the posh shell
//!
//! This crate ties the other crates together: it parses the invocation
//! arguments, prepares the execution environment, chooses the command
//! source, runs the read-eval loop, and propagates the final exit
//! status, re-raising a fatal signal when the last command died of one.

pub mod input;
pub mod startup;

use input::{Echo, FdReader, Prompts};
use posh_env::io::Fd;
use posh_env::option::{Option as ShellOption, State};
use posh_env::semantics::{Divert, ExitStatus, Result as ExecResult};
use posh_env::signal;
use posh_env::system::real::RealSystem;
use posh_env::variable::{self, Scope};
use posh_env::Env;
use posh_semantics::read_eval_loop;
use posh_syntax::parser::lex::Lexer;
use startup::{Invocation, Source};

/// Imports the process environment and seeds the standard variables.
fn init_variables(env: &mut Env) {
    for (name, value) in std::env::vars() {
        if posh_syntax::syntax::is_name(&name) {
            let mut variable = env.variables.get_or_new(name, Scope::Global);
            let _ = variable.assign(value);
            variable.export(true);
        }
    }

    for (name, default) in [
        (variable::IFS, variable::IFS_INITIAL_VALUE),
        (variable::PS1, variable::PS1_INITIAL_VALUE),
        (variable::PS2, variable::PS2_INITIAL_VALUE),
        (variable::PS4, variable::PS4_INITIAL_VALUE),
    ] {
        if env.variables.get_scalar(name).is_none() {
            let _ = env.variables.get_or_new(name, Scope::Global).assign(default);
        }
    }

    let ppid = env.system.getppid().to_string();
    let _ = env
        .variables
        .get_or_new(variable::PPID, Scope::Global)
        .assign(ppid);

    if env.variables.get_scalar(variable::PWD).is_none() {
        if let Ok(dir) = env.system.getcwd() {
            let _ = env
                .variables
                .get_or_new(variable::PWD, Scope::Global)
                .assign(dir);
        }
    }
}

/// Decides whether the shell is interactive and sets up the signal
/// handling that interactive use needs.
fn init_interactivity(env: &mut Env, invocation: &Invocation) {
    let reads_stdin = matches!(invocation.source, Source::Stdin);
    if !invocation.interactivity_forced
        && reads_stdin
        && env.system.isatty(Fd::STDIN)
        && env.system.isatty(Fd::STDERR)
    {
        env.options.set(ShellOption::Interactive, State::On);
    }

    if env.is_interactive() {
        // SIGINT aborts the current command instead of killing the
        // shell; SIGQUIT is ignored.
        let mut traps = std::mem::take(&mut env.traps);
        let _ = traps.catch_signal_internally(&mut *env.system, signal::sigint());
        env.traps = traps;
        let _ = env
            .system
            .sigaction(signal::sigquit(), posh_env::system::Disposition::Ignore);
    }
}

/// Runs an initialization file if it exists, ignoring a missing one.
fn run_init_file(env: &mut Env, path: &str) {
    if path.is_empty() {
        return;
    }
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let _ = posh_semantics::run_command_string(env, &content);
}

/// Runs the profile and `$ENV` files as appropriate.
fn init_files(env: &mut Env) {
    if env.options.get(ShellOption::Login) == State::On {
        run_init_file(env, "/etc/profile");
        if let Some(home) = env.variables.get_scalar(variable::HOME) {
            let profile = format!("{home}/.profile");
            run_init_file(env, &profile);
        }
    }
    if env.is_interactive() {
        if let Some(env_file) = env.variables.get_scalar(variable::ENV) {
            let env_file = env_file.to_string();
            run_init_file(env, &env_file);
        }
    }
}

/// Builds a lexer over in-memory source code, echoing it when verbose.
fn make_lexer(code: &str, verbose: bool) -> Lexer<'_> {
    if verbose {
        Lexer::new(Box::new(Echo::new(posh_syntax::input::Memory::new(code))))
    } else {
        Lexer::with_code(code)
    }
}

/// Computes the final exit status from the loop result and runs the
/// EXIT trap.
fn finalize(env: &mut Env, result: ExecResult) -> ExitStatus {
    let (status, run_exit_trap) = match result {
        ExecResult::Continue(()) => (env.exit_status, true),
        ExecResult::Break(divert) => {
            let status = divert.exit_status().unwrap_or(env.exit_status);
            (status, !matches!(divert, Divert::Abort(_)))
        }
    };
    env.exit_status = status;
    if run_exit_trap {
        posh_semantics::trap::run_exit_trap(env);
    }
    env.exit_status
}

/// Runs the shell for the given invocation. This function never
/// returns; the process terminates with the final exit status.
pub fn run(invocation: Invocation) -> ! {
    let mut env = Env::new(Box::new(RealSystem::new()));
    env.arg0 = invocation.arg0.clone();
    posh_builtin::register_builtins(&mut env);
    init_variables(&mut env);

    for &(option, state) in &invocation.options {
        env.options.set(option, state);
    }
    env.variables.positional_params_mut().values = invocation.positional_params.clone();

    init_interactivity(&mut env, &invocation);
    init_files(&mut env);

    let verbose = env.options.get(ShellOption::Verbose) == State::On;
    let result = match &invocation.source {
        Source::Command(command) => {
            let mut lexer = make_lexer(command, verbose);
            read_eval_loop(&mut env, &mut lexer)
        }
        Source::File(path) => match std::fs::read_to_string(path) {
            Ok(script) => {
                let mut lexer = make_lexer(&script, verbose);
                read_eval_loop(&mut env, &mut lexer)
            }
            Err(error) => {
                env.print_error(&format!("cannot open script `{path}': {error}"));
                ExecResult::Break(Divert::Abort(Some(ExitStatus::NOT_FOUND)))
            }
        },
        Source::Stdin => {
            let mut reader = FdReader::new(Fd::STDIN.0);
            if env.is_interactive() {
                let prompts = Prompts {
                    primary: env
                        .variables
                        .get_scalar(variable::PS1)
                        .unwrap_or(variable::PS1_INITIAL_VALUE)
                        .to_string(),
                    secondary: env
                        .variables
                        .get_scalar(variable::PS2)
                        .unwrap_or(variable::PS2_INITIAL_VALUE)
                        .to_string(),
                };
                reader = reader.with_prompts(prompts);
            }
            let mut lexer = if verbose {
                Lexer::new(Box::new(Echo::new(reader)))
            } else {
                Lexer::new(Box::new(reader))
            };
            read_eval_loop(&mut env, &mut lexer)
        }
    };

    let status = finalize(&mut env, result);
    posh_env::subshell::exit_or_raise(&mut env, status)
}

/// Parses the process arguments and runs the shell.
pub fn shell_main() -> ! {
    let args: Vec<String> = std::env::args().collect();
    match startup::parse_arguments(args) {
        Ok(invocation) => run(invocation),
        Err(error) => {
            eprintln!("posh: {error}");
            std::process::exit(ExitStatus::ERROR.0)
        }
    }
}
