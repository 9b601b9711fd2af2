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

//! System interface
//!
//! All interaction with the underlying operating system goes through the
//! [`System`] trait so that the rest of the shell can be tested without
//! touching the real system. [`RealSystem`](real::RealSystem) performs
//! actual syscalls; [`VirtualSystem`](self::virtual::VirtualSystem)
//! simulates files and file descriptors in memory for unit tests.

use crate::io::Fd;
use crate::semantics::ExitStatus;
use crate::signal;
use enumset::{EnumSet, EnumSetType};
#[doc(no_inline)]
pub use nix::errno::Errno;
#[doc(no_inline)]
pub use nix::sys::wait::WaitStatus;
#[doc(no_inline)]
pub use nix::unistd::Pid;
use std::ffi::{CStr, CString};
use std::fmt::Debug;

pub mod real;
pub mod r#virtual;

pub use self::r#virtual::VirtualSystem;
pub use real::RealSystem;

/// Result of a system call
pub type Result<T> = std::result::Result<T, Errno>;

/// Access mode of an open file description
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OfdAccess {
    /// Open for reading only
    ReadOnly,
    /// Open for writing only
    WriteOnly,
    /// Open for reading and writing
    ReadWrite,
}

/// Flags for opening a file
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
pub enum OpenFlag {
    /// Append on each write (`O_APPEND`)
    Append,
    /// Create the file if it does not exist (`O_CREAT`)
    Create,
    /// Fail if the file exists (`O_EXCL`)
    Exclusive,
    /// Truncate the file to zero length (`O_TRUNC`)
    Truncate,
}

/// How a signal is handled
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Disposition {
    /// Perform the default action for the signal
    Default,
    /// Ignore the signal
    Ignore,
    /// Catch the signal with the shell's flag-setting handler
    ///
    /// The handler is async-signal-safe: it only raises a pending flag
    /// which [`System::caught_signals`] later drains.
    Catch,
}

/// Result of a fork
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ForkResult {
    /// The calling process continues as the parent.
    Parent {
        /// Process ID of the new child
        child: Pid,
    },
    /// The new process starts here.
    Child,
}

/// Default file permission bits for files created by redirections
pub const DEFAULT_FILE_MODE: u32 = 0o666;

/// Abstraction of the operating system the shell runs on
pub trait System: Debug {
    /// Returns `self` as a `dyn Any`, for downcasting in tests.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Returns `self` as a mutable `dyn Any`, for downcasting in tests.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    /// Reads from a file descriptor, blocking until data is available.
    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize>;

    /// Writes to a file descriptor.
    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize>;

    /// Opens a file.
    fn open(
        &mut self,
        path: &CStr,
        access: OfdAccess,
        flags: EnumSet<OpenFlag>,
        mode: u32,
    ) -> Result<Fd>;

    /// Opens an anonymous temporary file that is already unlinked.
    fn open_tmpfile(&mut self) -> Result<Fd>;

    /// Closes a file descriptor.
    ///
    /// Closing an already closed descriptor is not an error.
    fn close(&mut self, fd: Fd) -> Result<()>;

    /// Duplicates a file descriptor to the lowest free descriptor not
    /// less than `min_fd`.
    fn dup(&mut self, from: Fd, min_fd: Fd) -> Result<Fd>;

    /// Duplicates a file descriptor onto a specific descriptor.
    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd>;

    /// Opens an anonymous pipe, returning `(read_end, write_end)`.
    fn pipe(&mut self) -> Result<(Fd, Fd)>;

    /// Tests whether the file descriptor refers to a terminal.
    fn isatty(&self, fd: Fd) -> bool;

    /// Creates a new child process.
    fn fork(&mut self) -> Result<ForkResult>;

    /// Replaces the process image with an external utility.
    ///
    /// This function only returns on failure, with the reason.
    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Errno;

    /// Terminates the process immediately, without unwinding or
    /// flushing any user-space buffers.
    fn exit(&mut self, exit_status: ExitStatus) -> !;

    /// Waits for a child process to change state.
    ///
    /// With `no_hang`, returns `Ok(None)` instead of blocking when no
    /// child has changed state yet.
    fn waitpid(&mut self, target: Pid, no_hang: bool) -> Result<Option<WaitStatus>>;

    /// Sends a signal to a process.
    fn kill(&mut self, pid: Pid, signal: signal::Number) -> Result<()>;

    /// Returns the process ID of the current process.
    fn getpid(&self) -> Pid;

    /// Returns the process ID of the parent process.
    fn getppid(&self) -> Pid;

    /// Moves a process to a process group.
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()>;

    /// Changes the disposition of a signal, returning the previous one.
    fn sigaction(
        &mut self,
        signal: signal::Number,
        disposition: Disposition,
    ) -> Result<Disposition>;

    /// Drains the set of signals caught since the last call.
    fn caught_signals(&mut self) -> Vec<signal::Number>;

    /// Resets the file offset of an open file to the beginning.
    fn rewind(&mut self, fd: Fd) -> Result<()>;

    /// Tests whether the path names an existing file of any type.
    fn path_exists(&self, path: &CStr) -> bool;

    /// Tests whether the path names an executable regular file.
    fn is_executable_file(&self, path: &CStr) -> bool;

    /// Tests whether the path names a directory.
    fn is_directory(&self, path: &CStr) -> bool;

    /// Returns the names of the entries of a directory.
    ///
    /// The result does not include `.` and `..`.
    fn read_dir(&self, path: &CStr) -> Result<Vec<String>>;

    /// Returns the current working directory.
    fn getcwd(&self) -> Result<String>;

    /// Changes the current working directory.
    fn chdir(&mut self, path: &CStr) -> Result<()>;

    /// Returns the home directory of the named user.
    fn home_dir(&self, user: &str) -> Option<String>;
}
