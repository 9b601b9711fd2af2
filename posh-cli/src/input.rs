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

//! Reading command lines from a file descriptor
//!
//! [`FdReader`] implements the lexer's [`Input`] trait over a raw file
//! descriptor. It reads one byte at a time so that the shell never
//! consumes input beyond the newline it needs; commands like `read` and
//! scripts that feed themselves to other utilities depend on that.
//!
//! When interactive, the reader prints `$PS1` before the first line of
//! a command and `$PS2` before continuation lines, and echoes nothing
//! itself; line editing is outside this shell's core.

use posh_syntax::input::{Context, Error, Input};
use std::io::Write;
use std::os::unix::io::RawFd;
use std::rc::Rc;

/// Prompt strings used by an interactive [`FdReader`]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Prompts {
    /// Prompt before the first line of a command (`$PS1`)
    pub primary: String,
    /// Prompt before a continuation line (`$PS2`)
    pub secondary: String,
}

/// Input function reading from a file descriptor
#[derive(Clone, Debug)]
pub struct FdReader {
    fd: RawFd,
    prompts: Option<Prompts>,
}

impl FdReader {
    /// Creates a non-prompting reader for the given file descriptor.
    #[must_use]
    pub fn new(fd: RawFd) -> Self {
        FdReader { fd, prompts: None }
    }

    /// Makes the reader print prompts to the standard error.
    #[must_use]
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = Some(prompts);
        self
    }

    fn print_prompt(&self, context: &Context) {
        if let Some(prompts) = &self.prompts {
            let prompt = if context.is_first_line {
                &prompts.primary
            } else {
                &prompts.secondary
            };
            let _ = std::io::stderr().write_all(prompt.as_bytes());
            let _ = std::io::stderr().flush();
        }
    }
}

/// Input decorator that echoes each line as it is read
///
/// This implements the `Verbose` (`-v`) shell option: the input is
/// written to the standard error before it is parsed.
#[derive(Clone, Debug)]
pub struct Echo<T> {
    inner: T,
}

impl<T> Echo<T> {
    /// Wraps an input function so that its lines are echoed.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Echo { inner }
    }
}

impl<T: Input> Input for Echo<T> {
    fn next_line(&mut self, context: &Context) -> Result<String, Error> {
        let line = self.inner.next_line(context)?;
        let _ = std::io::stderr().write_all(line.as_bytes());
        Ok(line)
    }
}

impl Input for FdReader {
    fn next_line(&mut self, context: &Context) -> Result<String, Error> {
        self.print_prompt(context);

        let mut line = Vec::new();
        loop {
            let mut byte = 0u8;
            let count = unsafe {
                libc::read(self.fd, std::ptr::addr_of_mut!(byte).cast(), 1)
            };
            match count {
                1 => {
                    line.push(byte);
                    if byte == b'\n' {
                        break;
                    }
                }
                0 => break,
                _ => {
                    let error = std::io::Error::last_os_error();
                    if error.kind() == std::io::ErrorKind::Interrupted {
                        // A signal interrupted the read; yield an empty
                        // line so the caller can dispatch traps and
                        // prompt again.
                        return Ok("\n".to_string());
                    }
                    return Err(Rc::new(error));
                }
            }
        }

        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}
