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

//! Pwd built-in
//!
//! **`pwd`** prints the pathname of the working directory.

use crate::common::{output, report_failure};
use posh_env::builtin::Result;
use posh_env::semantics::Field;
use posh_env::Env;

/// Entry point for executing the `pwd` built-in
pub fn main(env: &mut Env, _args: Vec<Field>) -> Result {
    match env.system.getcwd() {
        Ok(dir) => output(env, &format!("{dir}\n")),
        Err(errno) => report_failure(env, "pwd", &errno.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pwd_prints_working_directory() {
        let mut env = Env::new_virtual();
        env.virtual_system_mut().cwd = "/somewhere".to_string();
        main(&mut env, vec![]);
        assert_eq!(env.virtual_system().stdout(), "/somewhere\n");
    }
}
