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

//! Converting errors into diagnostics and exit statuses
//!
//! Non-fatal errors are values; this module implements the [`Handle`]
//! trait that prints the diagnostic to the standard error and decides
//! how execution continues:
//!
//! - An expansion error interrupts the current command. The interrupt
//!   makes a non-interactive shell exit and an interactive shell return
//!   to the prompt.
//! - A redirection error only fails the affected command; the shell
//!   continues.

use posh_env::semantics::{Divert, ExitStatus, Result};
use posh_env::Env;

/// Error handler
pub trait Handle {
    /// Prints an error message and returns the disposition for the
    /// executor.
    fn handle(&self, env: &mut Env) -> Result;
}

impl Handle for crate::expansion::Error {
    /// Prints the message and interrupts the current command with exit
    /// status [`ExitStatus::ERROR`].
    fn handle(&self, env: &mut Env) -> Result {
        let message = format!("{}: {}", self.location, self.cause);
        env.print_error(&message);
        env.exit_status = ExitStatus::ERROR;
        Result::Break(Divert::Interrupt(Some(ExitStatus::ERROR)))
    }
}

impl Handle for crate::redir::Error {
    /// Prints the message and fails the command with
    /// [`ExitStatus::FAILURE`]; the shell continues.
    fn handle(&self, env: &mut Env) -> Result {
        let message = format!("{}: {}", self.location, self.cause);
        env.print_error(&message);
        env.exit_status = ExitStatus::FAILURE;
        Result::Continue(())
    }
}

impl Handle for posh_syntax::parser::Error {
    /// Prints the message with its line number and sets the exit status
    /// to [`ExitStatus::ERROR`]; the caller decides whether to exit.
    fn handle(&self, env: &mut Env) -> Result {
        let message = format!("{}: {}", self.location, self.cause);
        env.print_error(&message);
        env.exit_status = ExitStatus::ERROR;
        Result::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion;
    use posh_syntax::source::Location;

    #[test]
    fn expansion_error_interrupts() {
        let mut env = Env::new_virtual();
        env.arg0 = "posh".to_string();
        let error = expansion::Error {
            cause: expansion::ErrorCause::UnsetParameter {
                name: "x".to_string(),
            },
            location: Location::new(3, 1),
        };
        let result = error.handle(&mut env);
        assert_eq!(
            result,
            Result::Break(Divert::Interrupt(Some(ExitStatus::ERROR)))
        );
        assert_eq!(
            env.virtual_system().stderr(),
            "posh: line 3: x: parameter not set\n"
        );
    }

    #[test]
    fn redir_error_continues() {
        let mut env = Env::new_virtual();
        let error = crate::redir::Error {
            cause: crate::redir::ErrorCause::Clobber("/f".to_string()),
            location: Location::dummy(),
        };
        let result = error.handle(&mut env);
        assert_eq!(result, Result::Continue(()));
        assert_eq!(env.exit_status, ExitStatus::FAILURE);
    }
}
