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

//! Interface between the arithmetic evaluator and its caller

use std::collections::HashMap;

/// Abstraction of the environment an expression is evaluated in
///
/// The evaluator only reads variables from the environment. An unset
/// variable expands to zero, so `get_variable` returning `None` is not an
/// error.
pub trait Env {
    /// Returns the value of the specified variable, if any.
    #[must_use]
    fn get_variable(&self, name: &str) -> Option<&str>;
}

impl<E: Env> Env for &E {
    fn get_variable(&self, name: &str) -> Option<&str> {
        (**self).get_variable(name)
    }
}

impl<E: Env> Env for &mut E {
    fn get_variable(&self, name: &str) -> Option<&str> {
        (**self).get_variable(name)
    }
}

/// Environment that provides no variables at all
///
/// This implementation is mainly useful in tests of constant expressions.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct EmptyEnv;

impl Env for EmptyEnv {
    fn get_variable(&self, _name: &str) -> Option<&str> {
        None
    }
}

/// Treats a hash map as a variable environment.
impl Env for HashMap<String, String> {
    fn get_variable(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}
