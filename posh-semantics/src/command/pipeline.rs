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

//! Pipeline semantics
//!
//! A pipeline of one command runs in the current shell environment. A
//! longer pipeline creates one pipe per junction and forks one child
//! per stage; the stages run concurrently, and the exit status of the
//! pipeline is that of the last stage.

use super::{wait_for_child, Command};
use posh_env::io::Fd;
use posh_env::semantics::{ExitStatus, Result};
use posh_env::stack::Frame;
use posh_env::Env;
use posh_syntax::syntax::Pipeline;
use std::rc::Rc;

impl Command for Pipeline {
    fn execute(&self, env: &mut Env) -> Result {
        if self.negation {
            {
                let mut env = env.push_frame(Frame::Condition);
                execute_commands(&mut env, &self.commands)?;
            }
            env.exit_status = if env.exit_status.is_successful() {
                ExitStatus::FAILURE
            } else {
                ExitStatus::SUCCESS
            };
            Result::Continue(())
        } else {
            execute_commands(env, &self.commands)
        }
    }
}

fn execute_commands(
    env: &mut Env,
    commands: &[Rc<posh_syntax::syntax::Command>],
) -> Result {
    match commands {
        [] => Result::Continue(()),
        [command] => command.execute(env),
        _ => execute_multi_stage(env, commands),
    }
}

fn execute_multi_stage(
    env: &mut Env,
    commands: &[Rc<posh_syntax::syntax::Command>],
) -> Result {
    let mut pids = Vec::with_capacity(commands.len());
    let mut prev_reader: Option<Fd> = None;

    for (index, command) in commands.iter().enumerate() {
        let is_last = index + 1 == commands.len();
        let pipe = if is_last {
            None
        } else {
            match env.system.pipe() {
                Ok(pipe) => Some(pipe),
                Err(errno) => {
                    env.print_error(&format!("cannot open pipe: {errno}"));
                    break;
                }
            }
        };

        let command = Rc::clone(command);
        let child = env.run_in_subshell(move |env| {
            if let Some(reader) = prev_reader {
                let _ = env.system.dup2(reader, Fd::STDIN);
                let _ = env.system.close(reader);
            }
            if let Some((next_reader, writer)) = pipe {
                let _ = env.system.close(next_reader);
                let _ = env.system.dup2(writer, Fd::STDOUT);
                let _ = env.system.close(writer);
            }
            command.execute(env)
        });

        if let Some(reader) = prev_reader {
            let _ = env.system.close(reader);
        }
        prev_reader = match pipe {
            Some((next_reader, writer)) => {
                let _ = env.system.close(writer);
                Some(next_reader)
            }
            None => None,
        };

        match child {
            Ok(pid) => pids.push(pid),
            Err(errno) => {
                env.print_error(&format!("cannot start pipeline command: {errno}"));
                break;
            }
        }
    }

    if let Some(reader) = prev_reader {
        let _ = env.system.close(reader);
    }

    let mut status = ExitStatus::FAILURE;
    let complete = pids.len() == commands.len();
    for pid in pids {
        status = wait_for_child(env, pid);
    }
    env.exit_status = if complete { status } else { ExitStatus::FAILURE };
    Result::Continue(())
}
