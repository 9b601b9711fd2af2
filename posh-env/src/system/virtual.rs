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

//! System simulated in memory for unit tests
//!
//! [`VirtualSystem`] implements regular files, pipes and file
//! descriptors without touching the real system. Operations that need
//! real child processes (`fork`, `execve`, `waitpid`) fail with
//! `ENOSYS`; tests that exercise those paths are integration-level and
//! use the real system instead.

use super::{Disposition, ForkResult, OfdAccess, OpenFlag, Result, System};
use crate::io::Fd;
use crate::semantics::ExitStatus;
use crate::signal;
use enumset::EnumSet;
use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ffi::{CStr, CString};
use std::rc::Rc;

/// Content of a simulated regular file
pub type FileContent = Rc<RefCell<Vec<u8>>>;

/// Body of an open file description
#[derive(Clone, Debug)]
enum FileBody {
    /// Regular file with a seek offset
    Regular { content: FileContent, offset: usize },
    /// One end of a pipe
    Pipe(Rc<RefCell<VecDeque<u8>>>),
}

/// Simulated open file description
#[derive(Clone, Debug)]
struct OpenFileDescription {
    body: FileBody,
    readable: bool,
    writable: bool,
    append: bool,
}

/// Simulated system
#[derive(Clone, Debug, Default)]
pub struct VirtualSystem {
    /// Regular files, keyed by pathname
    files: HashMap<String, FileContent>,
    /// Open file descriptors
    fds: BTreeMap<i32, OpenFileDescription>,
    /// Recorded signal dispositions
    dispositions: BTreeMap<i32, Disposition>,
    /// Signals to be returned by `caught_signals`
    pub pending_signals: Vec<signal::Number>,
    /// Pathnames reported executable by `is_executable_file`
    pub executables: Vec<String>,
    /// Home directories, keyed by user name
    pub home_dirs: HashMap<String, String>,
    /// Simulated working directory
    pub cwd: String,
}

impl VirtualSystem {
    /// Creates a virtual system with standard input, output and error
    /// open to empty in-memory files.
    #[must_use]
    pub fn new() -> Self {
        let mut system = VirtualSystem {
            cwd: "/".to_string(),
            ..Default::default()
        };
        for fd in 0..3 {
            system.fds.insert(
                fd,
                OpenFileDescription {
                    body: FileBody::Regular {
                        content: Rc::new(RefCell::new(Vec::new())),
                        offset: 0,
                    },
                    readable: fd == 0,
                    writable: fd != 0,
                    append: false,
                },
            );
        }
        system
    }

    /// Creates a regular file with the given content.
    pub fn create_file<P: Into<String>, C: Into<Vec<u8>>>(&mut self, path: P, content: C) {
        self.files
            .insert(path.into(), Rc::new(RefCell::new(content.into())));
    }

    /// Returns the content of a regular file, if it exists.
    #[must_use]
    pub fn file_content(&self, path: &str) -> Option<Vec<u8>> {
        Some(self.files.get(path)?.borrow().clone())
    }

    /// Provides bytes to be read from standard input.
    pub fn feed_stdin<C: Into<Vec<u8>>>(&mut self, content: C) {
        if let Some(ofd) = self.fds.get_mut(&0) {
            if let FileBody::Regular { content: c, .. } = &ofd.body {
                *c.borrow_mut() = content.into();
            }
        }
    }

    /// Returns everything written to standard output so far.
    #[must_use]
    pub fn stdout(&self) -> String {
        self.fd_content(Fd::STDOUT)
    }

    /// Returns everything written to standard error so far.
    #[must_use]
    pub fn stderr(&self) -> String {
        self.fd_content(Fd::STDERR)
    }

    /// Returns the bytes accessible through an open file descriptor.
    #[must_use]
    pub fn fd_content(&self, fd: Fd) -> String {
        match self.fds.get(&fd.0) {
            Some(OpenFileDescription {
                body: FileBody::Regular { content, .. },
                ..
            }) => String::from_utf8_lossy(&content.borrow()).into_owned(),
            Some(OpenFileDescription {
                body: FileBody::Pipe(buffer),
                ..
            }) => {
                let bytes: Vec<u8> = buffer.borrow().iter().copied().collect();
                String::from_utf8_lossy(&bytes).into_owned()
            }
            None => String::new(),
        }
    }

    /// Returns whether the file descriptor is open.
    #[must_use]
    pub fn is_open(&self, fd: Fd) -> bool {
        self.fds.contains_key(&fd.0)
    }

    /// Returns the recorded disposition for a signal.
    #[must_use]
    pub fn disposition(&self, signal: signal::Number) -> Disposition {
        self.dispositions
            .get(&signal.as_raw())
            .copied()
            .unwrap_or(Disposition::Default)
    }

    /// Sets the disposition a signal appears to have had initially.
    pub fn set_initial_disposition(&mut self, signal: signal::Number, disposition: Disposition) {
        self.dispositions.insert(signal.as_raw(), disposition);
    }

    fn min_free_fd(&self, min: i32) -> i32 {
        let mut candidate = min;
        while self.fds.contains_key(&candidate) {
            candidate += 1;
        }
        candidate
    }

    fn is_directory_str(&self, path: &str) -> bool {
        let prefix = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };
        path == "/" || self.files.keys().any(|name| name.starts_with(&prefix))
    }
}

impl System for VirtualSystem {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        let ofd = self.fds.get_mut(&fd.0).ok_or(Errno::EBADF)?;
        if !ofd.readable {
            return Err(Errno::EBADF);
        }
        match &mut ofd.body {
            FileBody::Regular { content, offset } => {
                let content = content.borrow();
                let available = content.len().saturating_sub(*offset);
                let count = available.min(buffer.len());
                buffer[..count].copy_from_slice(&content[*offset..*offset + count]);
                drop(content);
                *offset += count;
                Ok(count)
            }
            FileBody::Pipe(pipe) => {
                let mut pipe = pipe.borrow_mut();
                let count = pipe.len().min(buffer.len());
                for slot in buffer[..count].iter_mut() {
                    *slot = pipe.pop_front().unwrap();
                }
                Ok(count)
            }
        }
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        let ofd = self.fds.get_mut(&fd.0).ok_or(Errno::EBADF)?;
        if !ofd.writable {
            return Err(Errno::EBADF);
        }
        match &mut ofd.body {
            FileBody::Regular { content, offset } => {
                let mut content = content.borrow_mut();
                if ofd.append {
                    *offset = content.len();
                }
                if *offset > content.len() {
                    content.resize(*offset, 0);
                }
                let end = (*offset + buffer.len()).min(content.len());
                content.splice(*offset..end, buffer.iter().copied());
                *offset += buffer.len();
                Ok(buffer.len())
            }
            FileBody::Pipe(pipe) => {
                pipe.borrow_mut().extend(buffer);
                Ok(buffer.len())
            }
        }
    }

    fn open(
        &mut self,
        path: &CStr,
        access: OfdAccess,
        flags: EnumSet<OpenFlag>,
        _mode: u32,
    ) -> Result<Fd> {
        let path = path.to_str().map_err(|_| Errno::EINVAL)?.to_string();

        let existing = self.files.get(&path).cloned();
        if existing.is_some() && flags.contains(OpenFlag::Exclusive) {
            return Err(Errno::EEXIST);
        }
        let content = match existing {
            Some(content) => {
                if flags.contains(OpenFlag::Truncate) {
                    content.borrow_mut().clear();
                }
                content
            }
            None => {
                if !flags.contains(OpenFlag::Create) {
                    return Err(Errno::ENOENT);
                }
                let content = Rc::new(RefCell::new(Vec::new()));
                self.files.insert(path, Rc::clone(&content));
                content
            }
        };

        let fd = self.min_free_fd(0);
        self.fds.insert(
            fd,
            OpenFileDescription {
                body: FileBody::Regular { content, offset: 0 },
                readable: access != OfdAccess::WriteOnly,
                writable: access != OfdAccess::ReadOnly,
                append: flags.contains(OpenFlag::Append),
            },
        );
        Ok(Fd(fd))
    }

    fn open_tmpfile(&mut self) -> Result<Fd> {
        let fd = self.min_free_fd(0);
        self.fds.insert(
            fd,
            OpenFileDescription {
                body: FileBody::Regular {
                    content: Rc::new(RefCell::new(Vec::new())),
                    offset: 0,
                },
                readable: true,
                writable: true,
                append: false,
            },
        );
        Ok(Fd(fd))
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        self.fds.remove(&fd.0);
        Ok(())
    }

    fn dup(&mut self, from: Fd, min_fd: Fd) -> Result<Fd> {
        let ofd = self.fds.get(&from.0).ok_or(Errno::EBADF)?.clone();
        let fd = self.min_free_fd(min_fd.0);
        self.fds.insert(fd, ofd);
        Ok(Fd(fd))
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        let ofd = self.fds.get(&from.0).ok_or(Errno::EBADF)?.clone();
        self.fds.insert(to.0, ofd);
        Ok(to)
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let buffer = Rc::new(RefCell::new(VecDeque::new()));
        let read_end = self.min_free_fd(0);
        self.fds.insert(
            read_end,
            OpenFileDescription {
                body: FileBody::Pipe(Rc::clone(&buffer)),
                readable: true,
                writable: false,
                append: false,
            },
        );
        let write_end = self.min_free_fd(0);
        self.fds.insert(
            write_end,
            OpenFileDescription {
                body: FileBody::Pipe(buffer),
                readable: false,
                writable: true,
                append: false,
            },
        );
        Ok((Fd(read_end), Fd(write_end)))
    }

    fn isatty(&self, _fd: Fd) -> bool {
        false
    }

    fn fork(&mut self) -> Result<ForkResult> {
        Err(Errno::ENOSYS)
    }

    fn execve(&mut self, _path: &CStr, _args: &[CString], _envs: &[CString]) -> Errno {
        Errno::ENOSYS
    }

    fn exit(&mut self, exit_status: ExitStatus) -> ! {
        panic!("VirtualSystem cannot exit the process (status {exit_status})")
    }

    fn waitpid(&mut self, _target: Pid, _no_hang: bool) -> Result<Option<WaitStatus>> {
        Err(Errno::ECHILD)
    }

    fn kill(&mut self, _pid: Pid, _signal: signal::Number) -> Result<()> {
        Err(Errno::ESRCH)
    }

    fn getpid(&self) -> Pid {
        Pid::from_raw(2)
    }

    fn getppid(&self) -> Pid {
        Pid::from_raw(1)
    }

    fn setpgid(&mut self, _pid: Pid, _pgid: Pid) -> Result<()> {
        Ok(())
    }

    fn sigaction(
        &mut self,
        signal: signal::Number,
        disposition: Disposition,
    ) -> Result<Disposition> {
        let old = self
            .dispositions
            .insert(signal.as_raw(), disposition)
            .unwrap_or(Disposition::Default);
        Ok(old)
    }

    fn caught_signals(&mut self) -> Vec<signal::Number> {
        std::mem::take(&mut self.pending_signals)
    }

    fn rewind(&mut self, fd: Fd) -> Result<()> {
        let ofd = self.fds.get_mut(&fd.0).ok_or(Errno::EBADF)?;
        match &mut ofd.body {
            FileBody::Regular { offset, .. } => {
                *offset = 0;
                Ok(())
            }
            FileBody::Pipe(_) => Err(Errno::ESPIPE),
        }
    }

    fn path_exists(&self, path: &CStr) -> bool {
        match path.to_str() {
            Ok(path) => self.files.contains_key(path) || self.is_directory_str(path),
            Err(_) => false,
        }
    }

    fn is_executable_file(&self, path: &CStr) -> bool {
        path.to_str()
            .is_ok_and(|path| self.executables.iter().any(|e| e == path))
    }

    fn is_directory(&self, path: &CStr) -> bool {
        match path.to_str() {
            Ok(path) => self.is_directory_str(path),
            Err(_) => false,
        }
    }

    fn read_dir(&self, path: &CStr) -> Result<Vec<String>> {
        let path = path.to_str().map_err(|_| Errno::EINVAL)?;
        let prefix = if path == "." {
            String::new()
        } else if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };

        let mut names: Vec<String> = self
            .files
            .keys()
            .filter_map(|name| name.strip_prefix(&prefix))
            .map(|rest| match rest.find('/') {
                Some(index) => rest[..index].to_string(),
                None => rest.to_string(),
            })
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn getcwd(&self) -> Result<String> {
        Ok(self.cwd.clone())
    }

    fn chdir(&mut self, path: &CStr) -> Result<()> {
        self.cwd = path.to_str().map_err(|_| Errno::EINVAL)?.to_string();
        Ok(())
    }

    fn home_dir(&self, user: &str) -> Option<String> {
        self.home_dirs.get(user).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_round_trip() {
        let mut system = VirtualSystem::new();
        system.create_file("/tmp/f", *b"hello");

        let path = CString::new("/tmp/f").unwrap();
        let fd = system
            .open(&path, OfdAccess::ReadOnly, EnumSet::empty(), 0o666)
            .unwrap();
        let mut buffer = [0; 16];
        let count = system.read(fd, &mut buffer).unwrap();
        assert_eq!(&buffer[..count], b"hello");
        let count = system.read(fd, &mut buffer).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn create_truncate_and_append() {
        let mut system = VirtualSystem::new();
        let path = CString::new("/f").unwrap();

        let fd = system
            .open(
                &path,
                OfdAccess::WriteOnly,
                OpenFlag::Create | OpenFlag::Truncate,
                0o666,
            )
            .unwrap();
        system.write(fd, b"one").unwrap();
        system.close(fd).unwrap();

        let fd = system
            .open(
                &path,
                OfdAccess::WriteOnly,
                OpenFlag::Create | OpenFlag::Append,
                0o666,
            )
            .unwrap();
        system.write(fd, b"two").unwrap();
        assert_eq!(system.file_content("/f").unwrap(), b"onetwo");
    }

    #[test]
    fn exclusive_open_fails_on_existing_file() {
        let mut system = VirtualSystem::new();
        system.create_file("/f", *b"x");
        let path = CString::new("/f").unwrap();
        let result = system.open(
            &path,
            OfdAccess::WriteOnly,
            OpenFlag::Create | OpenFlag::Exclusive,
            0o666,
        );
        assert_eq!(result, Err(Errno::EEXIST));
    }

    #[test]
    fn pipe_transfers_bytes() {
        let mut system = VirtualSystem::new();
        let (reader, writer) = system.pipe().unwrap();
        system.write(writer, b"data").unwrap();
        let mut buffer = [0; 16];
        let count = system.read(reader, &mut buffer).unwrap();
        assert_eq!(&buffer[..count], b"data");
    }

    #[test]
    fn dup2_makes_both_fds_reach_the_same_file() {
        let mut system = VirtualSystem::new();
        system.write(Fd::STDOUT, b"before ").unwrap();
        system.dup2(Fd::STDOUT, Fd(7)).unwrap();
        system.write(Fd(7), b"after").unwrap();
        assert_eq!(system.stdout(), "before after");
    }

    #[test]
    fn read_dir_lists_immediate_children() {
        let mut system = VirtualSystem::new();
        system.create_file("/dir/a", *b"");
        system.create_file("/dir/b/c", *b"");
        system.create_file("/other", *b"");
        let path = CString::new("/dir").unwrap();
        assert_eq!(system.read_dir(&path).unwrap(), ["a", "b"]);
        assert!(system.is_directory(&path));
    }
}
