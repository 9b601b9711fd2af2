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

//! Implementations of the built-in utilities
//!
//! Each submodule implements one utility as a function of type
//! [`Main`](posh_env::builtin::Main). The [`BUILTINS`] table associates
//! the utilities with their names and types; the shell startup copies
//! it into [`Env::builtins`](posh_env::Env::builtins).

pub mod alias;
pub mod r#break;
pub mod cd;
pub mod colon;
pub mod common;
pub mod r#continue;
pub mod echo;
pub mod eval;
pub mod exec;
pub mod exit;
pub mod export;
pub mod r#false;
pub mod local;
pub mod pwd;
pub mod readonly;
pub mod r#return;
pub mod set;
pub mod shift;
pub mod source;
pub mod trap;
pub mod r#true;
pub mod unalias;
pub mod unset;
pub mod wait;

use posh_env::builtin::{Builtin, Type};
use posh_env::Env;

/// All the built-ins implemented in this crate
pub const BUILTINS: &[(&str, Builtin)] = &[
    (
        ":",
        Builtin {
            r#type: Type::Special,
            execute: colon::main,
        },
    ),
    (
        ".",
        Builtin {
            r#type: Type::Special,
            execute: source::main,
        },
    ),
    (
        "alias",
        Builtin {
            r#type: Type::Mandatory,
            execute: alias::main,
        },
    ),
    (
        "break",
        Builtin {
            r#type: Type::Special,
            execute: r#break::main,
        },
    ),
    (
        "cd",
        Builtin {
            r#type: Type::Mandatory,
            execute: cd::main,
        },
    ),
    (
        "continue",
        Builtin {
            r#type: Type::Special,
            execute: r#continue::main,
        },
    ),
    (
        "echo",
        Builtin {
            r#type: Type::Mandatory,
            execute: echo::main,
        },
    ),
    (
        "eval",
        Builtin {
            r#type: Type::Special,
            execute: eval::main,
        },
    ),
    (
        "exec",
        Builtin {
            r#type: Type::Special,
            execute: exec::main,
        },
    ),
    (
        "exit",
        Builtin {
            r#type: Type::Special,
            execute: exit::main,
        },
    ),
    (
        "export",
        Builtin {
            r#type: Type::Special,
            execute: export::main,
        },
    ),
    (
        "false",
        Builtin {
            r#type: Type::Mandatory,
            execute: r#false::main,
        },
    ),
    (
        "local",
        Builtin {
            r#type: Type::Mandatory,
            execute: local::main,
        },
    ),
    (
        "pwd",
        Builtin {
            r#type: Type::Mandatory,
            execute: pwd::main,
        },
    ),
    (
        "readonly",
        Builtin {
            r#type: Type::Special,
            execute: readonly::main,
        },
    ),
    (
        "return",
        Builtin {
            r#type: Type::Special,
            execute: r#return::main,
        },
    ),
    (
        "set",
        Builtin {
            r#type: Type::Special,
            execute: set::main,
        },
    ),
    (
        "shift",
        Builtin {
            r#type: Type::Special,
            execute: shift::main,
        },
    ),
    (
        "trap",
        Builtin {
            r#type: Type::Special,
            execute: trap::main,
        },
    ),
    (
        "true",
        Builtin {
            r#type: Type::Mandatory,
            execute: r#true::main,
        },
    ),
    (
        "unalias",
        Builtin {
            r#type: Type::Mandatory,
            execute: unalias::main,
        },
    ),
    (
        "unset",
        Builtin {
            r#type: Type::Special,
            execute: unset::main,
        },
    ),
    (
        "wait",
        Builtin {
            r#type: Type::Mandatory,
            execute: wait::main,
        },
    ),
];

/// Registers all the built-ins in the environment.
pub fn register_builtins(env: &mut Env) {
    env.builtins.extend(BUILTINS.iter().copied());
}
