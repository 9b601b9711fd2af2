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

//! Redirection semantics
//!
//! To perform redirections, wrap the environment in a [`RedirGuard`] and
//! call [`perform_redirs`](RedirGuard::perform_redirs). Before modifying
//! a file descriptor, the guard saves the original open file description
//! by duplicating it to a descriptor at or above
//! [`MIN_INTERNAL_FD`]; dropping the guard restores every saved
//! descriptor in reverse order, so applying and undoing a redirection
//! list leaves the descriptor table exactly as it was.
//!
//! For a command executed in a child process (an external command or a
//! pipeline stage), restoration is pointless; the caller uses
//! [`preserve_redirs`](RedirGuard::preserve_redirs) to skip it. The
//! `exec` special built-in uses the same hook to make its redirections
//! permanent.

use crate::expansion::{expand_text, expand_word};
use posh_env::io::{Fd, MIN_INTERNAL_FD};
use posh_env::option::{Option as ShellOption, State};
use posh_env::system::{Errno, OfdAccess, OpenFlag, DEFAULT_FILE_MODE};
use posh_env::Env;
use posh_syntax::source::Location;
use posh_syntax::syntax::{HereDoc, Redir, RedirBody, RedirOp};
use enumset::EnumSet;
use std::ffi::CString;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Types of errors that may occur in a redirection
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorCause {
    /// Expansion of the operand word failed.
    Expansion(crate::expansion::ErrorCause),
    /// The pathname contains a nul byte.
    NulByte,
    /// A file could not be opened.
    OpenFile(String, Errno),
    /// `noclobber` prevented overwriting an existing file.
    Clobber(String),
    /// The operand of `<&` or `>&` is not a file descriptor.
    MalformedFd(String),
    /// The target file descriptor could not be modified.
    FdNotOverwritten(Fd, Errno),
    /// A here-document could not be prepared.
    HereDocUnavailable(Errno),
}

impl std::fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorCause::*;
        match self {
            Expansion(cause) => cause.fmt(f),
            NulByte => "pathname contains a nul byte".fmt(f),
            OpenFile(path, errno) => write!(f, "cannot open file `{path}': {errno}"),
            Clobber(path) => write!(f, "cannot overwrite existing file `{path}'"),
            MalformedFd(value) => write!(f, "{value}: not a valid file descriptor"),
            FdNotOverwritten(fd, errno) => {
                write!(f, "cannot redirect file descriptor {fd}: {errno}")
            }
            HereDocUnavailable(errno) => {
                write!(f, "cannot prepare here-document: {errno}")
            }
        }
    }
}

/// Explanation of a redirection failure
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: ErrorCause,
    pub location: Location,
}

impl From<crate::expansion::Error> for Error {
    fn from(e: crate::expansion::Error) -> Self {
        Error {
            cause: ErrorCause::Expansion(e.cause),
            location: e.location,
        }
    }
}

/// Record of a file descriptor overwritten by a redirection
#[derive(Clone, Copy, Debug)]
struct SavedFd {
    /// Descriptor the redirection targeted
    original: Fd,
    /// Copy of the previous open file description, or `None` if the
    /// descriptor was closed before the redirection
    save: Option<Fd>,
}

/// `Env` wrapper that undoes redirections when dropped
#[derive(Debug)]
#[must_use = "redirections are undone when the guard is dropped"]
pub struct RedirGuard<'e> {
    env: &'e mut Env,
    saves: Vec<SavedFd>,
}

impl Deref for RedirGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for RedirGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

impl Drop for RedirGuard<'_> {
    fn drop(&mut self) {
        self.undo_redirs();
    }
}

impl<'e> RedirGuard<'e> {
    /// Creates a new guard around the environment.
    pub fn new(env: &'e mut Env) -> Self {
        RedirGuard {
            env,
            saves: Vec::new(),
        }
    }

    /// Applies a redirection list in order.
    ///
    /// On error, the redirections already applied stay in effect until
    /// the guard is dropped.
    pub fn perform_redirs<'a, I>(&mut self, redirs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a Redir>,
    {
        for redir in redirs {
            self.perform_redir(redir)?;
        }
        Ok(())
    }

    /// Makes the applied redirections permanent.
    pub fn preserve_redirs(&mut self) {
        for saved in self.saves.drain(..) {
            if let Some(save) = saved.save {
                let _ = self.env.system.close(save);
            }
        }
    }

    fn undo_redirs(&mut self) {
        for saved in self.saves.drain(..).rev() {
            match saved.save {
                Some(save) => {
                    let _ = self.env.system.dup2(save, saved.original);
                    let _ = self.env.system.close(save);
                }
                None => {
                    let _ = self.env.system.close(saved.original);
                }
            }
        }
    }

    /// Saves the open file description currently at `fd`.
    fn save_fd(&mut self, fd: Fd) {
        let save = self.env.system.dup(fd, MIN_INTERNAL_FD).ok();
        self.saves.push(SavedFd { original: fd, save });
    }

    /// Moves the open file description at `from` to `target`.
    fn move_fd(&mut self, from: Fd, target: Fd, location: Location) -> Result<(), Error> {
        if from == target {
            return Ok(());
        }
        let result = self.env.system.dup2(from, target);
        let _ = self.env.system.close(from);
        match result {
            Ok(_) => Ok(()),
            Err(errno) => Err(Error {
                cause: ErrorCause::FdNotOverwritten(target, errno),
                location,
            }),
        }
    }

    fn perform_redir(&mut self, redir: &Redir) -> Result<(), Error> {
        let target = redir.fd_or_default();
        match &redir.body {
            RedirBody::Normal { operator, operand } => {
                let field = expand_word(self.env, operand)?;
                let location = field.origin;
                use RedirOp::*;
                match operator {
                    FdIn | FdOut => {
                        if field.value == "-" {
                            self.save_fd(target);
                            let _ = self.env.system.close(target);
                            return Ok(());
                        }
                        let Ok(source) = field.value.parse() else {
                            return Err(Error {
                                cause: ErrorCause::MalformedFd(field.value),
                                location,
                            });
                        };
                        self.save_fd(target);
                        match self.env.system.dup2(Fd(source), target) {
                            Ok(_) => Ok(()),
                            Err(errno) => Err(Error {
                                cause: ErrorCause::FdNotOverwritten(target, errno),
                                location,
                            }),
                        }
                    }
                    _ => {
                        let fd = self.open_file(*operator, &field.value, location)?;
                        self.save_fd(target);
                        self.move_fd(fd, target, location)
                    }
                }
            }
            RedirBody::HereDoc(here_doc) => {
                let fd = self.open_here_doc(here_doc, redir)?;
                let location = here_doc.delimiter.location;
                self.save_fd(target);
                self.move_fd(fd, target, location)
            }
        }
    }

    /// Opens the file for a file redirection operator.
    fn open_file(
        &mut self,
        operator: RedirOp,
        path: &str,
        location: Location,
    ) -> Result<Fd, Error> {
        use OfdAccess::*;
        use OpenFlag::*;
        let noclobber = self.env.options.get(ShellOption::Clobber) == State::Off;

        let (access, flags) = match operator {
            RedirOp::FileIn => (ReadOnly, EnumSet::empty()),
            RedirOp::FileInOut => (ReadWrite, Create.into()),
            RedirOp::FileOut if noclobber => (WriteOnly, Create | Exclusive),
            RedirOp::FileOut | RedirOp::FileClobber => (WriteOnly, Create | Truncate),
            RedirOp::FileAppend => (WriteOnly, Create | Append),
            RedirOp::FdIn | RedirOp::FdOut => unreachable!("handled by the caller"),
        };

        let Ok(c_path) = CString::new(path) else {
            return Err(Error {
                cause: ErrorCause::NulByte,
                location,
            });
        };
        match self
            .env
            .system
            .open(&c_path, access, flags, DEFAULT_FILE_MODE)
        {
            Ok(fd) => Ok(fd),
            Err(Errno::EEXIST) if noclobber && operator == RedirOp::FileOut => {
                Err(Error {
                    cause: ErrorCause::Clobber(path.to_string()),
                    location,
                })
            }
            Err(errno) => Err(Error {
                cause: ErrorCause::OpenFile(path.to_string(), errno),
                location,
            }),
        }
    }

    /// Prepares a readable file descriptor serving a here-document body.
    ///
    /// The body is served through a pipe when it fits in the pipe's
    /// atomic write size; larger bodies go through an unlinked temporary
    /// file.
    fn open_here_doc(&mut self, here_doc: &HereDoc, _redir: &Redir) -> Result<Fd, Error> {
        let content = here_doc
            .content
            .get()
            .expect("here-document content must have been parsed");
        let body = expand_text(self.env, content)?;
        let location = here_doc.delimiter.location;
        let error = |errno| Error {
            cause: ErrorCause::HereDocUnavailable(errno),
            location,
        };

        if body.len() <= libc::PIPE_BUF {
            let (reader, writer) = self.env.system.pipe().map_err(error)?;
            self.env
                .write_all(writer, body.as_bytes())
                .map_err(error)?;
            self.env.system.close(writer).map_err(error)?;
            Ok(reader)
        } else {
            let fd = self.env.system.open_tmpfile().map_err(error)?;
            self.env.write_all(fd, body.as_bytes()).map_err(error)?;
            self.env.system.rewind(fd).map_err(error)?;
            Ok(fd)
        }
    }
}
