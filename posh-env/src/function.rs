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

//! Type definitions for functions

use posh_syntax::source::Location;
use posh_syntax::syntax::FullCompoundCommand;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use thiserror::Error;

/// Definition of a function
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Function {
    /// String that identifies the function
    pub name: String,

    /// Command that is executed when the function is called
    ///
    /// The body is shared with the abstract syntax tree the function
    /// definition command was parsed from. Cloning the `Rc` on
    /// definition means a function that redefines itself while running
    /// keeps executing its old body until the call returns.
    pub body: Rc<FullCompoundCommand>,

    /// Location of the function definition command
    pub origin: Location,

    /// Location where this function was made read-only, if it is
    pub read_only_location: Option<Location>,
}

impl Function {
    /// Creates a new function that is not read-only.
    #[inline]
    #[must_use]
    pub fn new<N: Into<String>>(
        name: N,
        body: Rc<FullCompoundCommand>,
        origin: Location,
    ) -> Self {
        Function {
            name: name.into(),
            body,
            origin,
            read_only_location: None,
        }
    }

    /// Returns whether the function is read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }
}

/// Wrapper of [`Function`] for hashing by name
#[derive(Clone, Debug, Eq)]
struct HashEntry(Rc<Function>);

impl PartialEq for HashEntry {
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Hash for HashEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Error redefining a read-only function
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("read-only function `{}` cannot be redefined", .existing.name)]
pub struct DefineError {
    /// Function that is already defined and read-only
    pub existing: Rc<Function>,
}

/// Collection of functions
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FunctionSet {
    functions: HashSet<HashEntry>,
}

impl FunctionSet {
    /// Creates an empty function set.
    #[must_use]
    pub fn new() -> FunctionSet {
        Default::default()
    }

    /// Looks up a function by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rc<Function>> {
        self.functions.get(name).map(|entry| &entry.0)
    }

    /// Defines a function, replacing any existing definition.
    ///
    /// The replacement is atomic: the old definition is dropped from the
    /// set, but any executor frame holding the old `Rc` keeps it alive
    /// until the call returns. Fails if the existing definition is
    /// read-only.
    pub fn define<F: Into<Rc<Function>>>(&mut self, function: F) -> Result<(), DefineError> {
        let function = function.into();
        if let Some(existing) = self.get(&function.name) {
            if existing.is_read_only() {
                return Err(DefineError {
                    existing: Rc::clone(existing),
                });
            }
        }
        self.functions.replace(HashEntry(function));
        Ok(())
    }

    /// Removes a function definition.
    ///
    /// Returns the removed function, if any. Fails if the definition is
    /// read-only.
    pub fn unset(&mut self, name: &str) -> Result<Option<Rc<Function>>, DefineError> {
        if let Some(existing) = self.get(name) {
            if existing.is_read_only() {
                return Err(DefineError {
                    existing: Rc::clone(existing),
                });
            }
        }
        Ok(self.functions.take(name).map(|entry| entry.0))
    }

    /// Returns an iterator over the functions.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Function>> {
        self.functions.iter().map(|entry| &entry.0)
    }

    /// Returns the number of functions in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::str::FromStr;

    fn body(code: &str) -> Rc<FullCompoundCommand> {
        use posh_syntax::syntax::{Command, List};
        let list = List::from_str(code).unwrap();
        let command = &list.0[0].and_or.first.commands[0];
        match &**command {
            Command::Compound(full) => Rc::new(full.clone()),
            _ => panic!("not a compound command"),
        }
    }

    #[test]
    fn define_and_get() {
        let mut set = FunctionSet::new();
        assert_eq!(set.get("f"), None);

        let function = Function::new("f", body("{ echo 1; }"), Location::dummy());
        set.define(function).unwrap();
        assert_eq!(set.get("f").unwrap().name, "f");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn redefinition_keeps_old_body_alive() {
        let mut set = FunctionSet::new();
        let old_body = body("{ echo old; }");
        set.define(Function::new("f", Rc::clone(&old_body), Location::dummy()))
            .unwrap();

        // An executor frame holds the body while the function runs.
        let running = Rc::clone(&set.get("f").unwrap().body);

        set.define(Function::new("f", body("{ echo new; }"), Location::dummy()))
            .unwrap();
        assert_eq!(running, old_body);
        assert_eq!(set.get("f").unwrap().body.to_string(), "{ echo new; }");
    }

    #[test]
    fn read_only_function_cannot_be_redefined_or_unset() {
        let mut set = FunctionSet::new();
        let mut function = Function::new("f", body("{ echo; }"), Location::dummy());
        function.read_only_location = Some(Location::dummy());
        set.define(function).unwrap();

        let e = set
            .define(Function::new("f", body("{ echo 2; }"), Location::dummy()))
            .unwrap_err();
        assert_eq!(e.existing.name, "f");

        assert_matches!(set.unset("f"), Err(DefineError { .. }));
        assert!(set.get("f").is_some());
    }

    #[test]
    fn unset_returns_removed_function() {
        let mut set = FunctionSet::new();
        set.define(Function::new("f", body("{ echo; }"), Location::dummy()))
            .unwrap();
        let removed = set.unset("f").unwrap().unwrap();
        assert_eq!(removed.name, "f");
        assert_eq!(set.unset("f").unwrap(), None);
    }
}
