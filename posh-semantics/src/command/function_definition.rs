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

//! Function definition semantics
//!
//! Executing a function definition command registers the function in the
//! function table and yields exit status 0. The body is shared with the
//! AST by reference counting; no tree is cloned.

use super::Command;
use posh_env::function::Function;
use posh_env::semantics::{ExitStatus, Result};
use posh_env::Env;
use posh_syntax::syntax::FunctionDefinition;
use std::rc::Rc;

impl Command for FunctionDefinition {
    fn execute(&self, env: &mut Env) -> Result {
        let name = self
            .name
            .to_string_if_literal()
            .unwrap_or_else(|| self.name.to_string());
        let function = Function::new(name, Rc::clone(&self.body), self.name.location);

        match env.functions.define(function) {
            Ok(()) => {
                env.exit_status = ExitStatus::SUCCESS;
            }
            Err(error) => {
                env.print_error(&error.to_string());
                env.exit_status = ExitStatus::ERROR;
            }
        }
        Result::Continue(())
    }
}
