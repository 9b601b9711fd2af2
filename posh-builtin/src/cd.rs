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

//! Cd built-in
//!
//! **`cd [directory]`** changes the working directory, defaulting to
//! `$HOME`. The operand `-` changes to `$OLDPWD` and prints the new
//! directory. `$PWD` and `$OLDPWD` are updated on success.

use crate::common::{output, report_failure};
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::variable::{Scope, HOME, OLDPWD, PWD};
use posh_env::Env;
use std::ffi::CString;

/// Entry point for executing the `cd` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut print_new_dir = false;
    let target = match args.first() {
        None => match env.variables.get_scalar(HOME) {
            Some(home) => home.to_string(),
            None => return report_failure(env, "cd", "$HOME is not set"),
        },
        Some(field) if field.value == "-" => {
            print_new_dir = true;
            match env.variables.get_scalar(OLDPWD) {
                Some(oldpwd) => oldpwd.to_string(),
                None => return report_failure(env, "cd", "$OLDPWD is not set"),
            }
        }
        Some(field) => field.value.clone(),
    };

    let Ok(c_target) = CString::new(target.clone()) else {
        return report_failure(env, "cd", "invalid directory name");
    };
    let old_dir = env.system.getcwd().unwrap_or_default();
    if let Err(errno) = env.system.chdir(&c_target) {
        return report_failure(env, "cd", &format!("{target}: {errno}"));
    }

    let new_dir = env.system.getcwd().unwrap_or(target);
    let _ = env
        .variables
        .get_or_new(OLDPWD, Scope::Global)
        .assign(old_dir);
    let _ = env
        .variables
        .get_or_new(PWD, Scope::Global)
        .assign(new_dir.clone());

    if print_new_dir {
        return output(env, &format!("{new_dir}\n"));
    }
    Result::new(ExitStatus::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cd_updates_pwd_and_oldpwd() {
        let mut env = Env::new_virtual();
        env.virtual_system_mut().cwd = "/start".to_string();
        let result = main(&mut env, Field::dummies(["/tmp"]));
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_eq!(env.variables.get_scalar(PWD), Some("/tmp"));
        assert_eq!(env.variables.get_scalar(OLDPWD), Some("/start"));
    }

    #[test]
    fn cd_without_operand_goes_home() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new(HOME, Scope::Global)
            .assign("/home/me")
            .unwrap();
        main(&mut env, vec![]);
        assert_eq!(env.variables.get_scalar(PWD), Some("/home/me"));
    }

    #[test]
    fn cd_dash_prints_new_directory() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new(OLDPWD, Scope::Global)
            .assign("/previous")
            .unwrap();
        main(&mut env, Field::dummies(["-"]));
        assert_eq!(env.virtual_system().stdout(), "/previous\n");
    }
}
