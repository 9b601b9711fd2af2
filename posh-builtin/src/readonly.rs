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

//! Readonly built-in
//!
//! **`readonly name[=value]...`** makes the named variables read-only,
//! optionally assigning values first. Without operands, the read-only
//! variables are printed.

use crate::common::output;
use crate::export::assign_operand;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::Env;

fn show_read_only(env: &mut Env) -> Result {
    let mut lines: Vec<String> = env
        .variables
        .iter()
        .filter(|(_, var)| var.is_read_only())
        .map(|(name, var)| match &var.value {
            Some(value) => format!("readonly {name}={value}\n"),
            None => format!("readonly {name}\n"),
        })
        .collect();
    lines.sort();
    output(env, &lines.concat())
}

/// Entry point for executing the `readonly` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands: Vec<&Field> = args.iter().filter(|f| f.value != "-p").collect();
    if operands.is_empty() {
        return show_read_only(env);
    }

    for operand in operands {
        if let Err(result) = assign_operand(env, "readonly", operand, |variable, operand| {
            variable.make_read_only(operand.origin);
        }) {
            return result;
        }
    }
    Result::new(ExitStatus::SUCCESS)
}
