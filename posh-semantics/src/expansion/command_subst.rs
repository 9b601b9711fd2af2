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

//! Command substitution
//!
//! The captured command string is executed in a subshell with its
//! standard output connected to a pipe. The parent reads the pipe until
//! the end of input, waits for the subshell, and strips trailing
//! newlines from the result.

use super::{Error, ErrorCause, Result};
use posh_env::io::Fd;
use posh_env::Env;
use posh_syntax::source::Location;

/// Executes a command substitution and returns its output.
pub fn expand_command_substitution(
    env: &mut Env,
    content: &str,
    location: &Location,
) -> Result<String> {
    let error = |errno| Error {
        cause: ErrorCause::CommandSubstFailed(errno),
        location: *location,
    };

    let (reader, writer) = env.system.pipe().map_err(error)?;

    let child = env
        .run_in_subshell(|env| {
            let _ = env.system.close(reader);
            if writer != Fd::STDOUT {
                let _ = env.system.dup2(writer, Fd::STDOUT);
                let _ = env.system.close(writer);
            }
            crate::runner::run_command_string(env, content)
        })
        .map_err(|errno| {
            let _ = env.system.close(reader);
            let _ = env.system.close(writer);
            error(errno)
        })?;

    let _ = env.system.close(writer);

    let mut output = Vec::new();
    let mut buffer = [0; 4096];
    loop {
        match env.system.read(reader, &mut buffer) {
            Ok(0) => break,
            Ok(count) => output.extend_from_slice(&buffer[..count]),
            Err(posh_env::system::Errno::EINTR) => continue,
            Err(_) => break,
        }
    }
    let _ = env.system.close(reader);

    let _ = env.system.waitpid(child, false);

    let mut output = String::from_utf8_lossy(&output).into_owned();
    while output.ends_with('\n') {
        output.pop();
    }
    Ok(output)
}
