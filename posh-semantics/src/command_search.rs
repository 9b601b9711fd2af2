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

//! Command search
//!
//! The name of a simple command resolves in this order:
//!
//! 1. special built-in,
//! 2. function,
//! 3. other built-in,
//! 4. external utility found by walking `$PATH`.
//!
//! A name containing a slash bypasses the search and is used as a
//! pathname directly. Under the `HashAll` option, resolved pathnames are
//! remembered in [`Env::command_paths`].

use posh_env::builtin::{Builtin, Type};
use posh_env::function::Function;
use posh_env::option::{Option as ShellOption, State};
use posh_env::variable::PATH;
use posh_env::Env;
use std::ffi::CString;
use std::rc::Rc;

/// Result of command search
#[derive(Clone, Debug)]
pub enum Target {
    /// Built-in utility
    Builtin(Builtin),
    /// Function
    Function(Rc<Function>),
    /// External utility
    External {
        /// Path to the utility
        path: CString,
    },
    /// The command was not found.
    NotFound,
}

/// Locates the target for the given command name.
pub fn search(env: &mut Env, name: &str) -> Target {
    if name.contains('/') {
        return match CString::new(name) {
            Ok(path) => Target::External { path },
            Err(_) => Target::NotFound,
        };
    }

    let builtin = env.builtins.get(name).copied();
    if let Some(builtin) = builtin {
        if builtin.r#type == Type::Special {
            return Target::Builtin(builtin);
        }
    }

    if let Some(function) = env.functions.get(name) {
        return Target::Function(Rc::clone(function));
    }

    if let Some(builtin) = builtin {
        return Target::Builtin(builtin);
    }

    match search_path(env, name) {
        Some(path) => Target::External { path },
        None => Target::NotFound,
    }
}

/// Walks `$PATH` for an executable file with the given name.
fn search_path(env: &mut Env, name: &str) -> Option<CString> {
    let hashing = env.options.get(ShellOption::HashAll) == State::On;
    if hashing {
        if let Some(path) = env.command_paths.get(name) {
            return Some(path.clone());
        }
    }

    let search_path = env.variables.get_scalar(PATH).unwrap_or("").to_string();
    for dir in search_path.split(':') {
        let full_path = if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        };
        let Ok(c_path) = CString::new(full_path) else {
            continue;
        };
        if env.system.is_executable_file(&c_path) {
            if hashing {
                env.command_paths.insert(name.to_string(), c_path.clone());
            }
            return Some(c_path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use posh_env::semantics::ExitStatus;
    use posh_env::variable::Scope;
    use posh_syntax::source::Location;

    fn dummy_builtin(r#type: Type) -> Builtin {
        fn execute(
            _env: &mut Env,
            _args: Vec<posh_env::semantics::Field>,
        ) -> posh_env::builtin::Result {
            posh_env::builtin::Result::new(ExitStatus::SUCCESS)
        }
        Builtin { r#type, execute }
    }

    fn dummy_function(name: &str) -> Function {
        use posh_syntax::syntax::{Command, List};
        let list: List = "{ :; }".parse().unwrap();
        let command = &list.0[0].and_or.first.commands[0];
        let body = match &**command {
            Command::Compound(full) => Rc::new(full.clone()),
            _ => unreachable!(),
        };
        Function::new(name, body, Location::dummy())
    }

    fn env_with_path(dir: &str) -> Env {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new(PATH, Scope::Global)
            .assign(dir)
            .unwrap();
        env
    }

    #[test]
    fn special_builtin_beats_function() {
        let mut env = Env::new_virtual();
        env.builtins.insert("set", dummy_builtin(Type::Special));
        env.functions.define(dummy_function("set")).unwrap();
        assert_matches!(search(&mut env, "set"), Target::Builtin(b) => {
            assert_eq!(b.r#type, Type::Special);
        });
    }

    #[test]
    fn function_beats_mandatory_builtin() {
        let mut env = Env::new_virtual();
        env.builtins.insert("cd", dummy_builtin(Type::Mandatory));
        env.functions.define(dummy_function("cd")).unwrap();
        assert_matches!(search(&mut env, "cd"), Target::Function(f) => {
            assert_eq!(f.name, "cd");
        });
    }

    #[test]
    fn path_search_finds_executables() {
        let mut env = env_with_path("/bin:/usr/bin");
        env.virtual_system_mut()
            .executables
            .push("/usr/bin/tool".to_string());
        assert_matches!(search(&mut env, "tool"), Target::External { path } => {
            assert_eq!(path.to_str().unwrap(), "/usr/bin/tool");
        });
        assert_matches!(search(&mut env, "missing"), Target::NotFound);
    }

    #[test]
    fn slash_bypasses_search() {
        let mut env = env_with_path("/bin");
        assert_matches!(search(&mut env, "./local/cmd"), Target::External { path } => {
            assert_eq!(path.to_str().unwrap(), "./local/cmd");
        });
    }

    #[test]
    fn hashall_caches_resolved_paths() {
        let mut env = env_with_path("/bin");
        env.options.set(ShellOption::HashAll, State::On);
        env.virtual_system_mut()
            .executables
            .push("/bin/tool".to_string());
        assert_matches!(search(&mut env, "tool"), Target::External { .. });

        // The cached path survives even if the file disappears.
        env.virtual_system_mut().executables.clear();
        assert_matches!(search(&mut env, "tool"), Target::External { path } => {
            assert_eq!(path.to_str().unwrap(), "/bin/tool");
        });
    }
}
