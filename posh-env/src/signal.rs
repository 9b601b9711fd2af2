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

//! Signal names and numbers
//!
//! The shell refers to signals both by number and by name (without the
//! `SIG` prefix). This module maps between the two for the signals POSIX
//! names.

use std::ffi::c_int;
use std::fmt;
use std::num::NonZeroI32;

/// Signal number
///
/// A valid signal number is positive, hence the `NonZeroI32`
/// representation.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Number(NonZeroI32);

impl Number {
    /// Creates a signal number from a raw value.
    ///
    /// Returns `None` unless the value is positive.
    #[must_use]
    pub fn from_raw(raw: c_int) -> Option<Number> {
        if raw > 0 {
            NonZeroI32::new(raw).map(Number)
        } else {
            None
        }
    }

    /// Returns the raw signal number.
    #[inline]
    #[must_use]
    pub fn as_raw(self) -> c_int {
        self.0.get()
    }

    /// Returns the name of this signal, if it is a known one.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        TABLE
            .iter()
            .find(|&&(_, number)| number == self.as_raw())
            .map(|&(name, _)| name)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => name.fmt(f),
            None => self.as_raw().fmt(f),
        }
    }
}

/// Signal names without the `SIG` prefix, with their numbers
const TABLE: &[(&str, c_int)] = &[
    ("ABRT", libc::SIGABRT),
    ("ALRM", libc::SIGALRM),
    ("BUS", libc::SIGBUS),
    ("CHLD", libc::SIGCHLD),
    ("CONT", libc::SIGCONT),
    ("FPE", libc::SIGFPE),
    ("HUP", libc::SIGHUP),
    ("ILL", libc::SIGILL),
    ("INT", libc::SIGINT),
    ("KILL", libc::SIGKILL),
    ("PIPE", libc::SIGPIPE),
    ("QUIT", libc::SIGQUIT),
    ("SEGV", libc::SIGSEGV),
    ("STOP", libc::SIGSTOP),
    ("TERM", libc::SIGTERM),
    ("TSTP", libc::SIGTSTP),
    ("TTIN", libc::SIGTTIN),
    ("TTOU", libc::SIGTTOU),
    ("USR1", libc::SIGUSR1),
    ("USR2", libc::SIGUSR2),
];

/// Parses a signal name, with or without the `SIG` prefix.
#[must_use]
pub fn number_from_name(name: &str) -> Option<Number> {
    let name = name.strip_prefix("SIG").unwrap_or(name);
    TABLE
        .iter()
        .find(|&&(n, _)| n == name)
        .and_then(|&(_, number)| Number::from_raw(number))
}

/// Returns the signal number for SIGINT.
#[must_use]
pub fn sigint() -> Number {
    Number::from_raw(libc::SIGINT).unwrap()
}

/// Returns the signal number for SIGQUIT.
#[must_use]
pub fn sigquit() -> Number {
    Number::from_raw(libc::SIGQUIT).unwrap()
}

/// Returns the signal number for SIGKILL.
#[must_use]
pub fn sigkill() -> Number {
    Number::from_raw(libc::SIGKILL).unwrap()
}

/// Returns the signal number for SIGSTOP.
#[must_use]
pub fn sigstop() -> Number {
    Number::from_raw(libc::SIGSTOP).unwrap()
}

/// Returns the signal number for SIGCHLD.
#[must_use]
pub fn sigchld() -> Number {
    Number::from_raw(libc::SIGCHLD).unwrap()
}
