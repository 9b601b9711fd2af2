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

//! This crate defines the shell execution environment.
//!
//! A shell execution environment is the collection of data that may
//! affect or be affected by the execution of commands: variables,
//! functions, aliases, options, traps, jobs, and the state of the
//! underlying system. All of it is bundled in the [`Env`] struct, which
//! is passed explicitly through the executor instead of living in
//! process globals. System access goes through the [`system::System`]
//! trait so that most of the shell can be tested against an in-memory
//! implementation.

pub mod builtin;
pub mod function;
pub mod io;
pub mod job;
pub mod option;
pub mod semantics;
pub mod signal;
pub mod stack;
pub mod subshell;
pub mod system;
pub mod trap;
pub mod variable;

use self::builtin::Builtin;
use self::function::FunctionSet;
use self::io::Fd;
use self::job::JobSet;
use self::option::{Option as ShellOption, OptionSet, State};
use self::semantics::ExitStatus;
use self::stack::{Frame, Stack};
use self::system::{Pid, System};
use self::trap::TrapSet;
use self::variable::{Context, Scope, VariableRefMut, VariableSet};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use posh_syntax::alias::AliasSet;

/// Whole shell execution environment
#[derive(Debug)]
pub struct Env {
    /// Aliases defined in the environment
    pub aliases: AliasSet,

    /// Name the shell was invoked as, i.e. the value of `$0`
    pub arg0: String,

    /// Built-in utilities available in the environment
    pub builtins: HashMap<&'static str, Builtin>,

    /// Remembered full pathnames of executed commands
    ///
    /// Populated by command search under the `HashAll` option.
    pub command_paths: HashMap<String, std::ffi::CString>,

    /// Exit status of the last executed command, i.e. `$?`
    pub exit_status: ExitStatus,

    /// Functions defined in the environment
    pub functions: FunctionSet,

    /// Jobs started by the environment
    pub jobs: JobSet,

    /// Process ID of the main shell process, i.e. `$$`
    ///
    /// This value does not change in subshells.
    pub main_pid: Pid,

    /// Shell options
    pub options: OptionSet,

    /// Runtime execution context stack
    pub stack: Stack,

    /// Traps defined in the environment
    pub traps: TrapSet,

    /// Variables and positional parameters
    pub variables: VariableSet,

    /// Interface to the underlying system
    pub system: Box<dyn System>,
}

impl Env {
    /// Creates a new environment on the given system.
    #[must_use]
    pub fn new(system: Box<dyn System>) -> Env {
        let main_pid = system.getpid();
        Env {
            aliases: AliasSet::new(),
            arg0: String::new(),
            builtins: HashMap::new(),
            command_paths: HashMap::new(),
            exit_status: ExitStatus::SUCCESS,
            functions: FunctionSet::new(),
            jobs: JobSet::new(),
            main_pid,
            options: OptionSet::default(),
            stack: Stack::default(),
            traps: TrapSet::new(),
            variables: VariableSet::new(),
            system,
        }
    }

    /// Creates a new environment on a [virtual
    /// system](system::VirtualSystem), for tests.
    #[must_use]
    pub fn new_virtual() -> Env {
        Env::new(Box::new(system::VirtualSystem::new()))
    }

    /// Returns whether the shell is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.options.get(ShellOption::Interactive) == State::On
    }

    /// Gets a mutable reference to a variable, creating it if needed.
    ///
    /// Unlike [`VariableSet::get_or_new`], this function applies the
    /// `AllExport` option: the returned variable is exported if the
    /// option is on.
    pub fn get_or_create_variable<S: Into<String>>(
        &mut self,
        name: S,
        scope: Scope,
    ) -> VariableRefMut<'_> {
        let mut variable = self.variables.get_or_new(name, scope);
        if self.options.get(ShellOption::AllExport) == State::On {
            variable.export(true);
        }
        variable
    }

    /// Pushes a variable context, returning a guard that pops it.
    pub fn push_context(&mut self, context: Context) -> EnvContextGuard<'_> {
        self.variables.push_context(context);
        EnvContextGuard { env: self }
    }

    /// Pushes a runtime stack frame, returning a guard that pops it.
    ///
    /// Unlike [`Stack::push`], the returned guard wraps the whole
    /// environment so that execution can continue through it.
    pub fn push_frame(&mut self, frame: Frame) -> EnvFrameGuard<'_> {
        self.stack.push_raw(frame);
        EnvFrameGuard { env: self }
    }

    /// Downcasts the system to a [`system::VirtualSystem`].
    ///
    /// This is a convenience for tests; it panics if the environment
    /// runs on a different system implementation.
    #[must_use]
    pub fn virtual_system(&self) -> &system::VirtualSystem {
        self.system
            .as_any()
            .downcast_ref()
            .expect("the environment does not run on a VirtualSystem")
    }

    /// Downcasts the system to a mutable [`system::VirtualSystem`].
    ///
    /// This is a convenience for tests; it panics if the environment
    /// runs on a different system implementation.
    pub fn virtual_system_mut(&mut self) -> &mut system::VirtualSystem {
        self.system
            .as_any_mut()
            .downcast_mut()
            .expect("the environment does not run on a VirtualSystem")
    }

    /// Prints an error message to the standard error.
    ///
    /// The message is prefixed with the shell name and followed by a
    /// newline.
    pub fn print_error(&mut self, message: &str) {
        let text = format!("{}: {}\n", self.arg0, message);
        self.print_raw_error(&text);
    }

    /// Prints a string to the standard error as is.
    pub fn print_raw_error(&mut self, text: &str) {
        let mut bytes = text.as_bytes();
        while !bytes.is_empty() {
            match self.system.write(Fd::STDERR, bytes) {
                Ok(count) => bytes = &bytes[count..],
                Err(_) => return,
            }
        }
    }

    /// Writes a string to the given file descriptor, retrying on partial
    /// writes.
    pub fn write_all(&mut self, fd: Fd, text: &[u8]) -> system::Result<()> {
        let mut bytes = text;
        while !bytes.is_empty() {
            let count = self.system.write(fd, bytes)?;
            bytes = &bytes[count..];
        }
        Ok(())
    }
}

/// RAII guard that pops a variable context when dropped
///
/// Returned by [`Env::push_context`]. The guard dereferences to the
/// environment so that execution can continue through it.
#[derive(Debug)]
#[must_use = "the context is popped when the guard is dropped"]
pub struct EnvContextGuard<'a> {
    env: &'a mut Env,
}

impl Deref for EnvContextGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for EnvContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

impl Drop for EnvContextGuard<'_> {
    fn drop(&mut self) {
        self.env.variables.pop_context();
    }
}

/// RAII guard that pops a runtime stack frame when dropped
///
/// Returned by [`Env::push_frame`].
#[derive(Debug)]
#[must_use = "the frame is popped when the guard is dropped"]
pub struct EnvFrameGuard<'a> {
    env: &'a mut Env,
}

impl Deref for EnvFrameGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for EnvFrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

impl Drop for EnvFrameGuard<'_> {
    fn drop(&mut self) {
        let popped = self.env.stack.pop_frame();
        debug_assert!(popped.is_some(), "frame stack underflow");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_guard_pops_context() {
        let mut env = Env::new_virtual();
        env.get_or_create_variable("x", Scope::Global)
            .assign("outer")
            .unwrap();
        {
            let mut env = env.push_context(Context::default());
            env.get_or_create_variable("x", Scope::Local)
                .assign("inner")
                .unwrap();
            assert_eq!(env.variables.get_scalar("x"), Some("inner"));
        }
        assert_eq!(env.variables.get_scalar("x"), Some("outer"));
    }

    #[test]
    fn frame_guard_pops_frame() {
        let mut env = Env::new_virtual();
        {
            let env = env.push_frame(Frame::Loop);
            assert_eq!(env.stack.len(), 1);
        }
        assert_eq!(env.stack.len(), 0);
    }

    #[test]
    fn allexport_marks_new_variables_exported() {
        let mut env = Env::new_virtual();
        env.options.set(ShellOption::AllExport, State::On);
        env.get_or_create_variable("x", Scope::Global)
            .assign("1")
            .unwrap();
        assert!(env.variables.get("x").unwrap().exported);
    }

    #[test]
    fn print_error_goes_to_stderr_with_prefix() {
        let mut env = Env::new_virtual();
        env.arg0 = "posh".to_string();
        env.print_error("something failed");
        assert_eq!(env.virtual_system().stderr(), "posh: something failed\n");
    }
}
