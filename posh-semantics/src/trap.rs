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

//! Trap dispatch
//!
//! The signal handler only marks signals as caught; this module runs the
//! corresponding trap actions at command boundaries. The value of `$?`
//! is saved before the action runs and restored afterwards.

use posh_env::semantics::{Divert, ExitStatus, Result};
use posh_env::signal;
use posh_env::stack::Frame;
use posh_env::trap::{Action, Condition};
use posh_env::Env;

/// Executes the trap actions for the signals caught since the last call.
///
/// A caught SIGINT without a user trap interrupts the current command
/// with exit status `128 + SIGINT`, so loops stop iterating promptly.
pub fn run_traps_for_caught_signals(env: &mut Env) -> Result {
    let signals = env.system.caught_signals();
    for signal in signals {
        let condition = Condition::Signal(signal);
        match env.traps.get_action(condition).clone() {
            Action::Command(command) => run_trap(env, condition, &command)?,
            Action::Default | Action::Ignore => {
                if signal == signal::sigint() {
                    env.exit_status = ExitStatus::from(signal);
                    return Result::Break(Divert::Interrupt(Some(env.exit_status)));
                }
                // Other internally caught signals need no action here.
            }
        }
    }
    Result::Continue(())
}

/// Executes one trap action with `$?` saved and restored.
fn run_trap(env: &mut Env, condition: Condition, command: &str) -> Result {
    let previous_exit_status = env.exit_status;
    let result = {
        let mut env = env.push_frame(Frame::Trap {
            condition,
            previous_exit_status,
        });
        crate::runner::run_command_string(&mut env, command)
    };
    env.exit_status = previous_exit_status;
    result
}

/// Runs the EXIT trap, if any, exactly once.
///
/// The trap action is removed before it runs so that an `exit` inside
/// the action cannot re-enter it.
pub fn run_exit_trap(env: &mut Env) {
    let Action::Command(command) = env.traps.get_action(Condition::Exit).clone() else {
        return;
    };
    let mut system_traps = std::mem::take(&mut env.traps);
    let _ = system_traps.set_action(
        &mut *env.system,
        Condition::Exit,
        Action::Default,
        true,
    );
    env.traps = system_traps;

    let _ = run_trap(env, Condition::Exit, &command);
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::system::Disposition;

    fn sigterm() -> signal::Number {
        signal::number_from_name("TERM").unwrap()
    }

    #[test]
    fn caught_signal_without_trap_is_ignored_except_sigint() {
        let mut env = Env::new_virtual();
        env.virtual_system_mut().pending_signals.push(sigterm());
        assert_eq!(run_traps_for_caught_signals(&mut env), Result::Continue(()));

        env.virtual_system_mut()
            .pending_signals
            .push(signal::sigint());
        let result = run_traps_for_caught_signals(&mut env);
        assert_eq!(
            result,
            Result::Break(Divert::Interrupt(Some(ExitStatus(
                libc::SIGINT + 0x80
            ))))
        );
    }

    #[test]
    fn trap_action_runs_with_exit_status_saved() {
        let mut env = Env::new_virtual();
        env.exit_status = ExitStatus(42);
        env.traps
            .set_action(
                &mut *env.system,
                Condition::Signal(sigterm()),
                posh_env::trap::Action::Command("true".into()),
                false,
            )
            .unwrap();
        // No builtins are registered, so running the action reports
        // "not found", but `$?` must be restored regardless.
        env.virtual_system_mut().pending_signals.push(sigterm());
        let result = run_traps_for_caught_signals(&mut env);
        assert_eq!(result, Result::Continue(()));
        assert_eq!(env.exit_status, ExitStatus(42));
    }

    #[test]
    fn exit_trap_removed_before_running() {
        let mut env = Env::new_virtual();
        env.traps
            .set_action(
                &mut *env.system,
                Condition::Exit,
                posh_env::trap::Action::Command(":".into()),
                false,
            )
            .unwrap();
        run_exit_trap(&mut env);
        assert_eq!(
            env.traps.get_action(Condition::Exit),
            &posh_env::trap::Action::Default
        );
        // The disposition bookkeeping is untouched for the exit trap.
        assert_eq!(
            env.virtual_system().disposition(sigterm()),
            Disposition::Default
        );
    }
}
