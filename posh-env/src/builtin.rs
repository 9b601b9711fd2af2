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

//! Type definitions for built-in utilities
//!
//! Concrete implementations of the built-ins are not in this crate; see
//! the `posh-builtin` crate. This module defines the types through which
//! the executor calls them.

use crate::semantics::{Divert, ExitStatus, Field};
use crate::Env;

/// Types of built-in utilities
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// Special built-in
    ///
    /// Special built-ins are found before functions in command search.
    /// Their variable assignments persist, and their errors cause a
    /// non-interactive shell to exit.
    Special,

    /// Built-in executed like a utility, but without the `$PATH` search
    ///
    /// Mandatory built-ins can be overridden by functions, and their
    /// assignment prefixes are temporary like those of external
    /// commands.
    Mandatory,
}

/// Function implementing a built-in
pub type Main = fn(&mut Env, Vec<Field>) -> Result;

/// Built-in utility definition
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Builtin {
    /// Type of the built-in
    pub r#type: Type,
    /// Function implementing the built-in
    pub execute: Main,
}

/// Result of built-in utility execution
///
/// The result contains an exit status and optional flags that affect
/// the behavior of the shell after the built-in returns.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[must_use]
pub struct Result {
    exit_status: ExitStatus,
    divert: crate::semantics::Result,
    should_retain_redirs: bool,
}

impl Result {
    /// Creates a new result with the given exit status.
    pub const fn new(exit_status: ExitStatus) -> Self {
        Self {
            exit_status,
            divert: crate::semantics::Result::Continue(()),
            should_retain_redirs: false,
        }
    }

    /// Creates a new result with an exit status and a divert.
    pub const fn with_exit_status_and_divert(
        exit_status: ExitStatus,
        divert: crate::semantics::Result,
    ) -> Self {
        Self {
            exit_status,
            divert,
            should_retain_redirs: false,
        }
    }

    /// Returns the exit status.
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    /// Returns the divert.
    #[must_use]
    pub const fn divert(&self) -> crate::semantics::Result {
        self.divert
    }

    /// Sets the divert.
    pub fn set_divert(&mut self, divert: crate::semantics::Result) {
        self.divert = divert;
    }

    /// Marks that the redirections applied to this built-in should not
    /// be restored when it finishes.
    ///
    /// The exec built-in uses this to make its redirections permanent.
    pub fn retain_redirs(&mut self) {
        self.should_retain_redirs = true;
    }

    /// Returns whether redirections should be retained.
    #[must_use]
    pub const fn should_retain_redirs(&self) -> bool {
        self.should_retain_redirs
    }
}

impl From<ExitStatus> for Result {
    fn from(exit_status: ExitStatus) -> Self {
        Self::new(exit_status)
    }
}

impl From<Divert> for Result {
    fn from(divert: Divert) -> Self {
        Self::with_exit_status_and_divert(
            ExitStatus::SUCCESS,
            crate::semantics::Result::Break(divert),
        )
    }
}
