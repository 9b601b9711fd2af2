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

//! Type definitions for command execution

use crate::signal;
use nix::sys::wait::WaitStatus;
use posh_syntax::source::Location;
use std::ffi::c_int;
use std::ops::ControlFlow;
use std::process::{ExitCode, Termination};

/// Resultant string of word expansion
///
/// A field is a string accompanied with the original word location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    /// String value of the field
    pub value: String,
    /// Location of the word this field resulted from
    pub origin: Location,
}

impl Field {
    /// Creates a new field with a dummy origin location.
    #[inline]
    #[must_use]
    pub fn dummy<S: Into<String>>(value: S) -> Field {
        Field {
            value: value.into(),
            origin: Location::dummy(),
        }
    }

    /// Creates an array of fields with dummy origin locations.
    pub fn dummies<I, S>(values: I) -> Vec<Field>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Self::dummy).collect()
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

/// Number that summarizes the result of command execution
///
/// In the shell language, the special parameter `$?` expands to the exit
/// status of the last executed command.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub c_int);

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<c_int> for ExitStatus {
    fn from(value: c_int) -> ExitStatus {
        ExitStatus(value)
    }
}

impl From<ExitStatus> for c_int {
    fn from(exit_status: ExitStatus) -> c_int {
        exit_status.0
    }
}

/// Converts a signal number to the corresponding exit status.
///
/// POSIX requires the result to be greater than 128; this implementation
/// returns `signal_number + 128`.
impl From<signal::Number> for ExitStatus {
    fn from(number: signal::Number) -> Self {
        Self(number.as_raw() + 0x80)
    }
}

impl ExitStatus {
    /// Exit status of 0: success
    pub const SUCCESS: ExitStatus = ExitStatus(0);

    /// Exit status of 1: failure
    pub const FAILURE: ExitStatus = ExitStatus(1);

    /// Exit status of 2: error severer than failure
    pub const ERROR: ExitStatus = ExitStatus(2);

    /// Exit status of 126: command found but not executable
    pub const NOEXEC: ExitStatus = ExitStatus(126);

    /// Exit status of 127: command not found
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    /// Returns true if and only if `self` is zero.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.0 == 0
    }

    /// Converts a wait status to the exit status of the awaited process.
    ///
    /// A process killed by a signal yields `128 + signal_number`.
    #[must_use]
    pub fn from_wait_status(status: WaitStatus) -> Option<ExitStatus> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitStatus(code)),
            WaitStatus::Signaled(_, signal, _core_dumped) => {
                Some(ExitStatus(signal as c_int + 0x80))
            }
            WaitStatus::Stopped(_, signal) => Some(ExitStatus(signal as c_int + 0x80)),
            _ => None,
        }
    }

    /// Returns the signal that produced this exit status, if any.
    #[must_use]
    pub fn to_signal(self) -> Option<signal::Number> {
        let raw = self.0.checked_sub(0x80)?;
        signal::Number::from_raw(raw)
    }
}

/// Converts the exit status to `ExitCode`.
///
/// Only the lowest 8 bits of the exit status are used.
impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        (self.0 as u8).into()
    }
}

/// Result of interrupted command execution
///
/// `Divert` implements `Ord`. Values are ordered by severity.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Divert {
    /// Continue the current loop.
    Continue {
        /// Number of loops to break out of before continuing
        ///
        /// `0` continues the innermost loop, `1` the one-level outer
        /// loop, and so on.
        count: usize,
    },

    /// Break the current loop.
    Break {
        /// Number of loops to break
        ///
        /// `0` breaks the innermost loop, `1` the one-level outer loop,
        /// and so on.
        count: usize,
    },

    /// Return from the current function or script.
    Return(Option<ExitStatus>),

    /// Interrupt the current shell execution environment.
    ///
    /// In a non-interactive shell this is the same as `Exit`. An
    /// interactive shell aborts the current command and returns to the
    /// prompt.
    Interrupt(Option<ExitStatus>),

    /// Exit from the current shell execution environment.
    ///
    /// The shell exits after executing the EXIT trap, if any.
    Exit(Option<ExitStatus>),

    /// Exit from the current shell execution environment immediately,
    /// without executing the EXIT trap.
    Abort(Option<ExitStatus>),
}

impl Divert {
    /// Returns the exit status associated with the `Divert`, if any.
    #[must_use]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        use Divert::*;
        match self {
            Continue { .. } | Break { .. } => None,
            Return(exit_status)
            | Interrupt(exit_status)
            | Exit(exit_status)
            | Abort(exit_status) => *exit_status,
        }
    }
}

/// Result of command execution
///
/// If the command was interrupted in the middle of execution, the result
/// value is a `Break` having a [`Divert`] value which specifies what to
/// execute next.
pub type Result<T = ()> = ControlFlow<Divert, T>;

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn exit_status_from_wait_status() {
        let status = WaitStatus::Exited(Pid::from_raw(10), 42);
        assert_eq!(
            ExitStatus::from_wait_status(status),
            Some(ExitStatus(42))
        );

        let status = WaitStatus::Signaled(Pid::from_raw(10), Signal::SIGINT, false);
        assert_eq!(
            ExitStatus::from_wait_status(status),
            Some(ExitStatus(130))
        );
    }

    #[test]
    fn exit_status_to_signal() {
        assert_eq!(ExitStatus(0).to_signal(), None);
        assert_eq!(ExitStatus(1).to_signal(), None);
        let signal = ExitStatus(130).to_signal().unwrap();
        assert_eq!(signal.as_raw(), libc::SIGINT);
    }

    #[test]
    fn divert_severity_order() {
        assert!(Divert::Continue { count: 0 } < Divert::Break { count: 0 });
        assert!(Divert::Break { count: 0 } < Divert::Return(None));
        assert!(Divert::Return(None) < Divert::Exit(None));
    }
}
