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

//! Wait built-in
//!
//! **`wait [pid...]`** waits for the named asynchronous jobs, or for
//! all of them without operands. The exit status is that of the last
//! awaited process, or zero when waiting for all jobs. Waiting for an
//! unknown process yields 127.

use crate::common::report_failure;
use posh_env::builtin::Result;
use posh_env::job::Pid;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::system::Errno;
use posh_env::Env;

fn wait_for(env: &mut Env, target: Pid) -> std::result::Result<ExitStatus, Errno> {
    loop {
        if let Some(status) = env.system.waitpid(target, false)? {
            if let Some(pid) = status.pid() {
                env.jobs.update_status(pid, status);
            }
            if let Some(exit_status) = ExitStatus::from_wait_status(status) {
                return Ok(exit_status);
            }
        }
    }
}

/// Entry point for executing the `wait` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        // Wait for all children until none remain.
        loop {
            match env.system.waitpid(Pid::from_raw(-1), false) {
                Ok(Some(status)) => {
                    if let Some(pid) = status.pid() {
                        env.jobs.update_status(pid, status);
                    }
                }
                Ok(None) => {}
                Err(_) => break,
            }
        }
        let _ = env.jobs.take_finished_reports();
        return Result::new(ExitStatus::SUCCESS);
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in args {
        let Ok(raw) = operand.value.parse() else {
            return report_failure(
                env,
                "wait",
                &format!("`{}' is not a valid process ID", operand.value),
            );
        };
        let pid = Pid::from_raw(raw);

        // A job that has already been reaped has its status recorded.
        if let Some(status) = env.jobs.exit_status_of(pid) {
            exit_status = status;
            continue;
        }
        exit_status = match wait_for(env, pid) {
            Ok(status) => status,
            Err(_) => ExitStatus::NOT_FOUND,
        };
    }
    Result::new(exit_status)
}
