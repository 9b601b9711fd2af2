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

//! Items for shell variables
//!
//! A [`VariableSet`] is a stack of [`Context`]s over a single hash map of
//! name-variable pairs. The first context in the stack is the _base
//! context_ and is always present. A regular context is pushed for every
//! function call and holds local variables and the positional
//! parameters; a volatile context holds the temporary assignments that
//! prefix a simple command. Variables in an upper context hide variables
//! of the same name in lower contexts, and popping a context reveals the
//! hidden ones again, which implements the save-and-restore semantics of
//! `local` declarations.
//!
//! ```
//! use posh_env::variable::{Context, Scope, VariableSet};
//! let mut set = VariableSet::new();
//!
//! set.get_or_new("foo", Scope::Global).assign("hello").unwrap();
//!
//! set.push_context(Context::default());
//! set.get_or_new("foo", Scope::Local).assign("world").unwrap();
//! assert_eq!(set.get_scalar("foo"), Some("world"));
//!
//! set.pop_context();
//! assert_eq!(set.get_scalar("foo"), Some("hello"));
//! ```

use posh_syntax::source::Location;
use std::borrow::Borrow;
use std::collections::hash_map::Entry::{Occupied, Vacant};
use std::collections::HashMap;
use std::ffi::CString;
use std::hash::Hash;
use thiserror::Error;

/// Name of the variable holding the field separators (`IFS`)
pub const IFS: &str = "IFS";
/// Default value of the `IFS` variable
pub const IFS_INITIAL_VALUE: &str = " \t\n";
/// Name of the variable naming the command search path
pub const PATH: &str = "PATH";
/// Name of the variable holding the user's home directory
pub const HOME: &str = "HOME";
/// Name of the variable holding the primary prompt
pub const PS1: &str = "PS1";
/// Default value of the `PS1` variable
pub const PS1_INITIAL_VALUE: &str = "$ ";
/// Name of the variable holding the continuation prompt
pub const PS2: &str = "PS2";
/// Default value of the `PS2` variable
pub const PS2_INITIAL_VALUE: &str = "> ";
/// Name of the variable holding the execution trace prompt
pub const PS4: &str = "PS4";
/// Default value of the `PS4` variable
pub const PS4_INITIAL_VALUE: &str = "+ ";
/// Name of the variable holding the shell's parent process ID
pub const PPID: &str = "PPID";
/// Name of the variable holding the working directory
pub const PWD: &str = "PWD";
/// Name of the variable holding the previous working directory
pub const OLDPWD: &str = "OLDPWD";
/// Name of the variable naming the interactive startup file
pub const ENV: &str = "ENV";
/// Name of the variable holding the current line number
pub const LINENO: &str = "LINENO";

/// Value and attributes of a shell variable
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variable {
    /// Value of the variable
    ///
    /// `None` means the variable is declared but unset: it has
    /// attributes (it may be exported or read-only) but no value, and it
    /// does not appear in the environment of child processes.
    pub value: Option<String>,

    /// Whether the variable is exported to child process environments
    pub exported: bool,

    /// Location of the command that made this variable read-only
    ///
    /// `None` if the variable is not read-only.
    pub read_only_location: Option<Location>,
}

impl Variable {
    /// Creates a variable with the given value and no attributes.
    #[must_use]
    pub fn new<V: Into<String>>(value: V) -> Variable {
        Variable {
            value: Some(value.into()),
            exported: false,
            read_only_location: None,
        }
    }

    /// Returns whether the variable is read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }
}

/// Error assigning to a read-only variable
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("read-only variable cannot be modified")]
pub struct AssignError {
    /// Location where the variable was made read-only
    pub read_only_location: Location,
}

/// Error unsetting a read-only variable
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("read-only variable `{name}` cannot be unset")]
pub struct UnsetError {
    /// Name of the variable
    pub name: String,
    /// Location where the variable was made read-only
    pub read_only_location: Location,
}

/// Mutable reference to a variable in a variable set
///
/// All mutation goes through this wrapper so that the read-only
/// attribute is enforced in one place.
#[derive(Debug)]
#[must_use]
pub struct VariableRefMut<'a>(&'a mut Variable);

impl VariableRefMut<'_> {
    /// Assigns a new value to the variable.
    ///
    /// Fails without changing anything if the variable is read-only.
    pub fn assign<V: Into<String>>(&mut self, value: V) -> Result<(), AssignError> {
        if let Some(read_only_location) = self.0.read_only_location {
            return Err(AssignError { read_only_location });
        }
        self.0.value = Some(value.into());
        Ok(())
    }

    /// Sets or clears the export attribute.
    pub fn export(&mut self, exported: bool) {
        self.0.exported = exported;
    }

    /// Makes the variable read-only.
    pub fn make_read_only(&mut self, location: Location) {
        self.0.read_only_location.get_or_insert(location);
    }
}

impl std::ops::Deref for VariableRefMut<'_> {
    type Target = Variable;
    fn deref(&self) -> &Variable {
        self.0
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct VariableInContext {
    variable: Variable,
    context_index: usize,
}

/// Positional parameters
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionalParams {
    /// Values of the positional parameters, `$1` first
    pub values: Vec<String>,
}

impl PositionalParams {
    /// Creates positional parameters from value strings.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PositionalParams {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Variable context
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Context {
    /// Context for normal assignments
    ///
    /// The base context is a regular context, and every function
    /// invocation pushes another one for its local variables and
    /// positional parameters.
    Regular {
        /// Positional parameters visible while this context is topmost
        positional_params: PositionalParams,
    },

    /// Context for temporary assignments
    ///
    /// A volatile context holds the variable assignments that prefix a
    /// simple command resolving to an external command or regular
    /// built-in; popping it undoes them.
    Volatile,
}

impl Default for Context {
    fn default() -> Self {
        Context::Regular {
            positional_params: PositionalParams::default(),
        }
    }
}

/// Choice of a context in which a variable is assigned or searched for
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The visible variable wherever it is, or the base context
    Global,
    /// The topmost regular context
    Local,
    /// The topmost context, which must be volatile
    Volatile,
}

/// Collection of variables
///
/// See the [module documentation](self) for details.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableSet {
    /// All variables, keyed by name
    ///
    /// The value of an entry is a stack of variables defined in
    /// different contexts, in ascending order of the context index.
    all_variables: HashMap<String, Vec<VariableInContext>>,

    /// Stack of contexts; the base context is always the first item
    contexts: Vec<Context>,
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet {
            all_variables: HashMap::new(),
            contexts: vec![Context::default()],
        }
    }
}

impl VariableSet {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> VariableSet {
        Default::default()
    }

    /// Gets a reference to the visible variable with the given name.
    #[must_use]
    pub fn get<N>(&self, name: &N) -> Option<&Variable>
    where
        String: Borrow<N>,
        N: Hash + Eq + ?Sized,
    {
        Some(&self.all_variables.get(name)?.last()?.variable)
    }

    /// Gets the value of the given variable, if set.
    #[must_use]
    pub fn get_scalar<N>(&self, name: &N) -> Option<&str>
    where
        String: Borrow<N>,
        N: Hash + Eq + ?Sized,
    {
        self.get(name)?.value.as_deref()
    }

    fn index_of_topmost_regular_context(contexts: &[Context]) -> usize {
        contexts
            .iter()
            .rposition(|context| matches!(context, Context::Regular { .. }))
            .expect("base context has gone")
    }

    /// Gets a mutable reference to the variable with the given name,
    /// creating a defaulted one if none is visible in the chosen scope.
    ///
    /// - With `Scope::Global`, the visible variable is returned if it is
    ///   in a regular context; if there is none, a new variable is
    ///   created in the base context. A variable found in a volatile
    ///   context is moved down into the regular context the assignment
    ///   should persist in, so that `VAR=x export VAR` works.
    /// - With `Scope::Local`, the search is limited to contexts at or
    ///   above the topmost regular context, and a new variable is
    ///   created in the topmost regular context.
    /// - With `Scope::Volatile`, the topmost context must be volatile,
    ///   and the variable is created or shadowed there.
    ///
    /// This method does not apply the `AllExport` option; use
    /// [`Env::get_or_create_variable`](crate::Env::get_or_create_variable)
    /// for that.
    pub fn get_or_new<S: Into<String>>(&mut self, name: S, scope: Scope) -> VariableRefMut<'_> {
        self.get_or_new_impl(name.into(), scope)
    }

    fn get_or_new_impl(&mut self, name: String, scope: Scope) -> VariableRefMut<'_> {
        let stack = match self.all_variables.entry(name) {
            Vacant(vacant) => vacant.insert(Vec::new()),
            Occupied(occupied) => occupied.into_mut(),
        };
        let context_index = match scope {
            Scope::Global => 0,
            Scope::Local => Self::index_of_topmost_regular_context(&self.contexts),
            Scope::Volatile => self.contexts.len() - 1,
        };

        match scope {
            Scope::Global | Scope::Local => 'found: {
                let mut removed_volatile_variable = None;

                // Find an existing variable in a regular context,
                // migrating any volatile variable above it down.
                while let Some(var) = stack.last_mut() {
                    if var.context_index < context_index {
                        break;
                    }
                    match self.contexts[var.context_index] {
                        Context::Regular { .. } => {
                            if let Some(removed) = removed_volatile_variable {
                                var.variable = removed;
                            }
                            break 'found;
                        }
                        Context::Volatile => {
                            removed_volatile_variable
                                .get_or_insert(stack.pop().unwrap().variable);
                        }
                    }
                }

                stack.push(VariableInContext {
                    variable: removed_volatile_variable.unwrap_or_default(),
                    context_index,
                });
            }

            Scope::Volatile => {
                assert!(
                    matches!(self.contexts[context_index], Context::Volatile),
                    "no volatile context to store the variable",
                );
                match stack.last() {
                    Some(var) if var.context_index == context_index => {}
                    Some(var) => {
                        let variable = var.variable.clone();
                        stack.push(VariableInContext {
                            variable,
                            context_index,
                        });
                    }
                    None => stack.push(VariableInContext {
                        variable: Variable::default(),
                        context_index,
                    }),
                }
            }
        }

        VariableRefMut(&mut stack.last_mut().unwrap().variable)
    }

    /// Unsets a variable.
    ///
    /// All bindings of the variable are removed so that the name is
    /// unset even after enclosing function scopes are popped. Fails if
    /// the visible binding is read-only.
    pub fn unset<N>(&mut self, name: &N) -> Result<Option<Variable>, UnsetError>
    where
        String: Borrow<N>,
        N: Hash + Eq + ToString + ?Sized,
    {
        let Some(stack) = self.all_variables.get_mut(name) else {
            return Ok(None);
        };
        if let Some(var) = stack.last() {
            if let Some(read_only_location) = var.variable.read_only_location {
                return Err(UnsetError {
                    name: name.to_string(),
                    read_only_location,
                });
            }
        }
        let removed = stack.pop().map(|vic| vic.variable);
        stack.clear();
        Ok(removed)
    }

    /// Returns an iterator over the visible variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.all_variables
            .iter()
            .filter_map(|(name, stack)| Some((name.as_str(), &stack.last()?.variable)))
    }

    /// Materializes the environment of a child process.
    ///
    /// The result contains a `NAME=VALUE` string for every visible
    /// variable that is exported and set.
    #[must_use]
    pub fn environ(&self) -> Vec<CString> {
        let mut result: Vec<CString> = self
            .iter()
            .filter(|(_, var)| var.exported)
            .filter_map(|(name, var)| {
                let value = var.value.as_deref()?;
                CString::new(format!("{name}={value}")).ok()
            })
            .collect();
        result.sort();
        result
    }

    /// Pushes a new context onto the stack.
    pub fn push_context(&mut self, context: Context) {
        self.contexts.push(context);
    }

    /// Pops the topmost context, removing the variables defined in it.
    ///
    /// # Panics
    ///
    /// If the topmost context is the base context.
    pub fn pop_context(&mut self) {
        assert!(
            self.contexts.len() > 1,
            "cannot pop the base context",
        );
        self.contexts.pop();
        let remaining = self.contexts.len();
        for stack in self.all_variables.values_mut() {
            while let Some(var) = stack.last() {
                if var.context_index < remaining {
                    break;
                }
                stack.pop();
            }
        }
    }

    /// Returns the number of contexts in the stack.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Returns a reference to the positional parameters.
    ///
    /// Positional parameters are stored in the topmost regular context,
    /// so a function call that pushes a regular context swaps them and a
    /// return restores them.
    #[must_use]
    pub fn positional_params(&self) -> &PositionalParams {
        let index = Self::index_of_topmost_regular_context(&self.contexts);
        match &self.contexts[index] {
            Context::Regular { positional_params } => positional_params,
            Context::Volatile => unreachable!(),
        }
    }

    /// Returns a mutable reference to the positional parameters.
    pub fn positional_params_mut(&mut self) -> &mut PositionalParams {
        let index = Self::index_of_topmost_regular_context(&self.contexts);
        match &mut self.contexts[index] {
            Context::Regular { positional_params } => positional_params,
            Context::Volatile => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn assignment_and_lookup() {
        let mut set = VariableSet::new();
        assert_eq!(set.get_scalar("x"), None);
        set.get_or_new("x", Scope::Global).assign("1").unwrap();
        assert_eq!(set.get_scalar("x"), Some("1"));
        set.get_or_new("x", Scope::Global).assign("2").unwrap();
        assert_eq!(set.get_scalar("x"), Some("2"));
    }

    #[test]
    fn read_only_variables_resist_assignment_and_unset() {
        let mut set = VariableSet::new();
        let mut var = set.get_or_new("x", Scope::Global);
        var.assign("1").unwrap();
        var.make_read_only(Location::dummy());

        let mut var = set.get_or_new("x", Scope::Global);
        assert_matches!(var.assign("2"), Err(AssignError { .. }));
        assert_eq!(set.get_scalar("x"), Some("1"));

        assert_matches!(set.unset("x"), Err(UnsetError { name, .. }) => {
            assert_eq!(name, "x");
        });
        assert_eq!(set.get_scalar("x"), Some("1"));
    }

    #[test]
    fn local_variables_hide_and_restore() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign("outer").unwrap();
        let mut outer_exported = set.get_or_new("e", Scope::Global);
        outer_exported.assign("v").unwrap();
        outer_exported.export(true);

        set.push_context(Context::default());
        set.get_or_new("x", Scope::Local).assign("inner").unwrap();
        set.get_or_new("n", Scope::Local).assign("new").unwrap();
        assert_eq!(set.get_scalar("x"), Some("inner"));
        assert_eq!(set.get_scalar("n"), Some("new"));

        set.pop_context();
        assert_eq!(set.get_scalar("x"), Some("outer"));
        assert_eq!(set.get_scalar("n"), None);
        assert!(set.get("e").unwrap().exported);
    }

    #[test]
    fn global_assignment_updates_visible_local() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign("outer").unwrap();
        set.push_context(Context::default());
        set.get_or_new("x", Scope::Local).assign("local").unwrap();

        // A plain assignment inside a function updates the local.
        set.get_or_new("x", Scope::Global).assign("changed").unwrap();
        assert_eq!(set.get_scalar("x"), Some("changed"));
        set.pop_context();
        assert_eq!(set.get_scalar("x"), Some("outer"));
    }

    #[test]
    fn volatile_assignments_vanish_on_pop() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign("base").unwrap();

        set.push_context(Context::Volatile);
        let mut var = set.get_or_new("x", Scope::Volatile);
        var.assign("temp").unwrap();
        var.export(true);
        assert_eq!(set.get_scalar("x"), Some("temp"));

        set.pop_context();
        assert_eq!(set.get_scalar("x"), Some("base"));
        assert!(!set.get("x").unwrap().exported);
    }

    #[test]
    fn volatile_variable_migrates_on_persistent_assignment() {
        // `x=temp export x` makes the temporary assignment persistent.
        let mut set = VariableSet::new();
        set.push_context(Context::Volatile);
        let mut var = set.get_or_new("x", Scope::Volatile);
        var.assign("temp").unwrap();
        var.export(true);

        set.get_or_new("x", Scope::Global).export(true);
        set.pop_context();
        assert_eq!(set.get_scalar("x"), Some("temp"));
        assert!(set.get("x").unwrap().exported);
    }

    #[test]
    fn environ_lists_exported_set_variables() {
        let mut set = VariableSet::new();
        let mut var = set.get_or_new("A", Scope::Global);
        var.assign("1").unwrap();
        var.export(true);
        set.get_or_new("B", Scope::Global).assign("2").unwrap();
        let mut var = set.get_or_new("C", Scope::Global);
        var.export(true); // exported but unset

        let environ = set.environ();
        assert_eq!(environ, [CString::new("A=1").unwrap()]);
    }

    #[test]
    fn positional_params_swap_with_context() {
        let mut set = VariableSet::new();
        set.positional_params_mut().values = vec!["a".to_string(), "b".to_string()];

        set.push_context(Context::Regular {
            positional_params: PositionalParams::from_values(["c"]),
        });
        assert_eq!(set.positional_params().values, ["c"]);

        set.pop_context();
        assert_eq!(set.positional_params().values, ["a", "b"]);
    }

    #[test]
    fn unset_removes_all_bindings() {
        let mut set = VariableSet::new();
        set.get_or_new("x", Scope::Global).assign("outer").unwrap();
        set.push_context(Context::default());
        set.get_or_new("x", Scope::Local).assign("inner").unwrap();

        set.unset("x").unwrap();
        assert_eq!(set.get_scalar("x"), None);
        set.pop_context();
        assert_eq!(set.get_scalar("x"), None);
    }
}
