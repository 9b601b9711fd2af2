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

//! Running subshells
//!
//! A subshell is a forked child process that inherits a copy of the
//! shell state. The child runs a closure against the copied [`Env`] and
//! terminates through the async-safe exit path without returning to the
//! code that called [`Env::run_in_subshell`], so buffered output
//! inherited from the parent is never flushed twice.

use crate::semantics::{ExitStatus, Result as ExecResult};
use crate::stack::Frame;
use crate::system::{Errno, ForkResult, Pid};
use crate::Env;

impl Env {
    /// Forks a child process that runs the given closure.
    ///
    /// In the parent, this function returns the child's process ID.
    ///
    /// The child process resets the traps that would run commands, as
    /// required on entering a subshell, pushes a
    /// [`Subshell`](Frame::Subshell) frame, runs the closure, and exits
    /// with the resulting exit status. It never returns.
    pub fn run_in_subshell<F>(&mut self, f: F) -> std::result::Result<Pid, Errno>
    where
        F: FnOnce(&mut Env) -> ExecResult,
    {
        match self.system.fork()? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => {
                // A subshell is never interactive, whatever the parent was.
                self.options
                    .set(crate::option::Option::Interactive, crate::option::State::Off);
                let mut traps = std::mem::take(&mut self.traps);
                traps.enter_subshell(&mut *self.system);
                self.traps = traps;

                let result = {
                    let mut env = self.push_frame(Frame::Subshell);
                    f(&mut env)
                };

                let status = match result {
                    ExecResult::Continue(()) => self.exit_status,
                    ExecResult::Break(divert) => {
                        divert.exit_status().unwrap_or(self.exit_status)
                    }
                };
                self.system.exit(status)
            }
        }
    }
}

/// Propagates an exit status for a process killed by a signal.
///
/// If the exit status indicates death by a terminating signal, this
/// function re-raises the signal with the default disposition so that
/// the parent observes the same termination status. Otherwise it simply
/// exits with the status.
pub fn exit_or_raise(env: &mut Env, exit_status: ExitStatus) -> ! {
    if let Some(signal) = exit_status.to_signal() {
        let _: Result<_, _> = env
            .system
            .sigaction(signal, crate::system::Disposition::Default);
        let pid = env.system.getpid();
        let _: Result<_, _> = env.system.kill(pid, signal);
        // If the signal did not terminate us, fall through.
    }
    env.system.exit(exit_status)
}
