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

//! Item semantics: sequential and asynchronous execution

use super::Command;
use posh_env::io::Fd;
use posh_env::job::Job;
use posh_env::option::{Option as ShellOption, State};
use posh_env::semantics::{ExitStatus, Result};
use posh_env::system::OfdAccess;
use posh_env::Env;
use posh_syntax::syntax::{AndOrList, Item};
use enumset::EnumSet;
use std::ffi::CString;
use std::rc::Rc;

impl Command for Item {
    /// Executes the item.
    ///
    /// Pending trap actions run before the item, so that signals caught
    /// during the previous command are dispatched at this command
    /// boundary.
    fn execute(&self, env: &mut Env) -> Result {
        crate::trap::run_traps_for_caught_signals(env)?;
        match self.async_flag {
            None => self.and_or.execute(env),
            Some(_) => start_async(env, &self.and_or),
        }
    }
}

/// Starts an asynchronous command.
///
/// The forked child runs the and-or list in its own right; the parent
/// registers a job, makes the child's process ID available as `$!`, and
/// proceeds immediately with exit status 0. Without job control, the
/// child's standard input is redirected from `/dev/null` so it does not
/// compete with the shell for input.
fn start_async(env: &mut Env, and_or: &Rc<AndOrList>) -> Result {
    let child_and_or = Rc::clone(and_or);
    let monitor = env.options.get(ShellOption::Monitor) == State::On;

    let child = env.run_in_subshell(move |env| {
        if !monitor {
            if let Ok(null) = CString::new("/dev/null") {
                if let Ok(fd) = env.system.open(
                    &null,
                    OfdAccess::ReadOnly,
                    EnumSet::empty(),
                    0,
                ) {
                    let _ = env.system.dup2(fd, Fd::STDIN);
                    let _ = env.system.close(fd);
                }
            }
        }
        child_and_or.execute(env)
    });

    match child {
        Ok(pid) => {
            if monitor {
                // The child becomes its own process group leader.
                let _ = env.system.setpgid(pid, pid);
            }
            let mut job = Job::new(pid);
            job.job_controlled = monitor;
            job.name = and_or.to_string();
            env.jobs.add(job);
            env.jobs.set_last_async_pid(pid);
            env.exit_status = ExitStatus::SUCCESS;
            Result::Continue(())
        }
        Err(errno) => {
            env.print_error(&format!("cannot start asynchronous command: {errno}"));
            env.exit_status = ExitStatus::FAILURE;
            Result::Continue(())
        }
    }
}
