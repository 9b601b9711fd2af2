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

//! Dot (`.`) built-in
//!
//! **`. file`** reads and executes commands from *file* in the current
//! environment. A *file* without a slash is searched for in `$PATH`;
//! unlike command search, the file only needs to be readable. Failure
//! to find or read the file is an error that terminates a
//! non-interactive shell.

use crate::common::report_error;
use enumset::EnumSet;
use posh_env::builtin::Result;
use posh_env::semantics::{ExitStatus, Field};
use posh_env::system::OfdAccess;
use posh_env::variable::PATH;
use posh_env::Env;
use posh_semantics::run_command_string;
use std::ffi::CString;

/// Finds the file to source.
fn find_file(env: &Env, name: &str) -> Option<CString> {
    if name.contains('/') {
        return CString::new(name).ok();
    }
    let search_path = env.variables.get_scalar(PATH).unwrap_or("");
    for dir in search_path.split(':') {
        let path = if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        };
        if let Ok(c_path) = CString::new(path) {
            if env.system.path_exists(&c_path) {
                return Some(c_path);
            }
        }
    }
    // Fall back to the working directory, matching common practice.
    CString::new(name).ok()
}

/// Reads the whole content of a file through the system interface.
fn read_file(env: &mut Env, path: &CString) -> std::result::Result<String, String> {
    let fd = env
        .system
        .open(path, OfdAccess::ReadOnly, EnumSet::empty(), 0)
        .map_err(|errno| format!("cannot open `{}': {errno}", path.to_string_lossy()))?;

    let mut content = Vec::new();
    let mut buffer = [0; 4096];
    loop {
        match env.system.read(fd, &mut buffer) {
            Ok(0) => break,
            Ok(count) => content.extend_from_slice(&buffer[..count]),
            Err(posh_env::system::Errno::EINTR) => continue,
            Err(errno) => {
                let _ = env.system.close(fd);
                return Err(format!(
                    "cannot read `{}': {errno}",
                    path.to_string_lossy()
                ));
            }
        }
    }
    let _ = env.system.close(fd);
    String::from_utf8(content)
        .map_err(|_| format!("`{}' contains invalid data", path.to_string_lossy()))
}

/// Entry point for executing the `.` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some(operand) = args.first() else {
        return report_error(env, ".", "filename operand is missing");
    };

    let Some(path) = find_file(env, &operand.value) else {
        return report_error(env, ".", &format!("`{}' not found", operand.value));
    };

    let content = match read_file(env, &path) {
        Ok(content) => content,
        Err(message) => return report_error(env, ".", &message),
    };

    let divert = run_command_string(env, &content);
    Result::with_exit_status_and_divert(env.exit_status, divert)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_operand_is_an_error() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, vec![]);
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
    }

    #[test]
    fn sources_commands_from_file() {
        let mut env = Env::new_virtual();
        env.virtual_system_mut().create_file("/lib.sh", *b"x=sourced\n");
        let result = main(&mut env, Field::dummies(["/lib.sh"]));
        assert_eq!(result.exit_status(), ExitStatus::SUCCESS);
        assert_eq!(env.variables.get_scalar("x"), Some("sourced"));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let mut env = Env::new_virtual();
        let result = main(&mut env, Field::dummies(["/no/such/file"]));
        assert_eq!(result.exit_status(), ExitStatus::ERROR);
        assert_matches::assert_matches!(
            result.divert(),
            posh_env::semantics::Result::Break(_)
        );
    }
}
