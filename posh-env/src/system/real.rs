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

//! Implementation of `System` that actually interacts with the system

use super::{Disposition, ForkResult, OfdAccess, OpenFlag, Result, System};
use crate::io::Fd;
use crate::semantics::ExitStatus;
use crate::signal;
use enumset::EnumSet;
use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::ffi::{c_int, CStr, CString};
use std::sync::atomic::{AtomicBool, Ordering};

/// Upper bound on signal numbers the catching handler supports
const SIGNAL_CAPACITY: usize = 128;

/// Per-signal flags raised by the signal handler
static CAUGHT_SIGNALS: [AtomicBool; SIGNAL_CAPACITY] =
    [const { AtomicBool::new(false) }; SIGNAL_CAPACITY];

/// Flag raised when any signal is caught
static ANY_SIGNAL_CAUGHT: AtomicBool = AtomicBool::new(false);

/// Signal handler installed for [`Disposition::Catch`]
///
/// This function is async-signal-safe: it does not allocate and touches
/// only atomic flags. All real work is deferred to
/// [`System::caught_signals`] callers.
extern "C" fn catch_signal(signal: c_int) {
    if let Ok(index) = usize::try_from(signal) {
        if let Some(flag) = CAUGHT_SIGNALS.get(index) {
            flag.store(true, Ordering::Relaxed);
            ANY_SIGNAL_CAUGHT.store(true, Ordering::Release);
        }
    }
}

/// Implementation of `System` by real system calls
///
/// At most one `RealSystem` should exist in a process since the signal
/// handler state is process-global.
#[derive(Debug)]
pub struct RealSystem(());

impl RealSystem {
    /// Creates an instance of `RealSystem`.
    #[must_use]
    pub fn new() -> Self {
        RealSystem(())
    }
}

impl Default for RealSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RealSystem {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        let count = Errno::result(unsafe {
            libc::read(fd.0, buffer.as_mut_ptr().cast(), buffer.len())
        })?;
        Ok(count as usize)
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        let count = Errno::result(unsafe {
            libc::write(fd.0, buffer.as_ptr().cast(), buffer.len())
        })?;
        Ok(count as usize)
    }

    fn open(
        &mut self,
        path: &CStr,
        access: OfdAccess,
        flags: EnumSet<OpenFlag>,
        mode: u32,
    ) -> Result<Fd> {
        let mut oflag = match access {
            OfdAccess::ReadOnly => libc::O_RDONLY,
            OfdAccess::WriteOnly => libc::O_WRONLY,
            OfdAccess::ReadWrite => libc::O_RDWR,
        };
        for flag in flags {
            oflag |= match flag {
                OpenFlag::Append => libc::O_APPEND,
                OpenFlag::Create => libc::O_CREAT,
                OpenFlag::Exclusive => libc::O_EXCL,
                OpenFlag::Truncate => libc::O_TRUNC,
            };
        }
        let fd = Errno::result(unsafe {
            libc::open(path.as_ptr(), oflag, mode as libc::c_uint)
        })?;
        Ok(Fd(fd))
    }

    fn open_tmpfile(&mut self) -> Result<Fd> {
        let mut template = *b"/tmp/posh.XXXXXX\0";
        let fd = Errno::result(unsafe { libc::mkstemp(template.as_mut_ptr().cast()) })?;
        unsafe { libc::unlink(template.as_ptr().cast()) };
        Ok(Fd(fd))
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        match Errno::result(unsafe { libc::close(fd.0) }) {
            Ok(_) | Err(Errno::EBADF) => Ok(()),
            Err(errno) => Err(errno),
        }
    }

    fn dup(&mut self, from: Fd, min_fd: Fd) -> Result<Fd> {
        let fd = Errno::result(unsafe { libc::fcntl(from.0, libc::F_DUPFD, min_fd.0) })?;
        Ok(Fd(fd))
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        loop {
            match Errno::result(unsafe { libc::dup2(from.0, to.0) }) {
                Ok(fd) => return Ok(Fd(fd)),
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(errno),
            }
        }
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let mut fds = [0; 2];
        Errno::result(unsafe { libc::pipe(fds.as_mut_ptr()) })?;
        Ok((Fd(fds[0]), Fd(fds[1])))
    }

    fn isatty(&self, fd: Fd) -> bool {
        unsafe { libc::isatty(fd.0) != 0 }
    }

    fn fork(&mut self) -> Result<ForkResult> {
        let pid = Errno::result(unsafe { libc::fork() })?;
        if pid == 0 {
            Ok(ForkResult::Child)
        } else {
            Ok(ForkResult::Parent {
                child: Pid::from_raw(pid),
            })
        }
    }

    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Errno {
        let mut argv: Vec<*const libc::c_char> =
            args.iter().map(|arg| arg.as_ptr()).collect();
        argv.push(std::ptr::null());
        let mut envp: Vec<*const libc::c_char> =
            envs.iter().map(|env| env.as_ptr()).collect();
        envp.push(std::ptr::null());

        unsafe { libc::execve(path.as_ptr(), argv.as_ptr(), envp.as_ptr()) };
        Errno::last()
    }

    fn exit(&mut self, exit_status: ExitStatus) -> ! {
        // _exit skips flushing stdio buffers the child may have
        // inherited from the parent.
        unsafe { libc::_exit(exit_status.0) }
    }

    fn waitpid(&mut self, target: Pid, no_hang: bool) -> Result<Option<WaitStatus>> {
        let options = if no_hang { libc::WNOHANG } else { 0 };
        loop {
            let mut status = 0;
            match Errno::result(unsafe {
                libc::waitpid(target.as_raw(), &mut status, options)
            }) {
                Ok(0) => return Ok(None),
                Ok(pid) => {
                    let status = WaitStatus::from_raw(Pid::from_raw(pid), status)?;
                    return Ok(Some(status));
                }
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(errno),
            }
        }
    }

    fn kill(&mut self, pid: Pid, signal: signal::Number) -> Result<()> {
        Errno::result(unsafe { libc::kill(pid.as_raw(), signal.as_raw()) })?;
        Ok(())
    }

    fn getpid(&self) -> Pid {
        Pid::from_raw(unsafe { libc::getpid() })
    }

    fn getppid(&self) -> Pid {
        Pid::from_raw(unsafe { libc::getppid() })
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()> {
        Errno::result(unsafe { libc::setpgid(pid.as_raw(), pgid.as_raw()) })?;
        Ok(())
    }

    fn sigaction(
        &mut self,
        signal: signal::Number,
        disposition: Disposition,
    ) -> Result<Disposition> {
        let handler: libc::sighandler_t = match disposition {
            Disposition::Default => libc::SIG_DFL,
            Disposition::Ignore => libc::SIG_IGN,
            Disposition::Catch => {
                let f: extern "C" fn(c_int) = catch_signal;
                f as usize
            }
        };

        let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
        action.sa_sigaction = handler;
        unsafe { libc::sigemptyset(&mut action.sa_mask) };
        // SA_RESTART is deliberately not set: a caught signal must
        // interrupt blocking reads so the trap can run promptly.

        let mut old: libc::sigaction = unsafe { std::mem::zeroed() };
        Errno::result(unsafe { libc::sigaction(signal.as_raw(), &action, &mut old) })?;

        Ok(match old.sa_sigaction {
            libc::SIG_DFL => Disposition::Default,
            libc::SIG_IGN => Disposition::Ignore,
            _ => Disposition::Catch,
        })
    }

    fn caught_signals(&mut self) -> Vec<signal::Number> {
        if !ANY_SIGNAL_CAUGHT.swap(false, Ordering::Acquire) {
            return Vec::new();
        }
        let mut result = Vec::new();
        for (index, flag) in CAUGHT_SIGNALS.iter().enumerate() {
            if flag.swap(false, Ordering::Relaxed) {
                if let Some(number) = signal::Number::from_raw(index as c_int) {
                    result.push(number);
                }
            }
        }
        result
    }

    fn rewind(&mut self, fd: Fd) -> Result<()> {
        Errno::result(unsafe { libc::lseek(fd.0, 0, libc::SEEK_SET) })?;
        Ok(())
    }

    fn path_exists(&self, path: &CStr) -> bool {
        unsafe { libc::access(path.as_ptr(), libc::F_OK) == 0 }
    }

    fn is_executable_file(&self, path: &CStr) -> bool {
        (unsafe { libc::access(path.as_ptr(), libc::X_OK) == 0 })
            && std::str::from_utf8(path.to_bytes())
                .ok()
                .and_then(|path| std::fs::metadata(path).ok())
                .is_some_and(|metadata| metadata.is_file())
    }

    fn is_directory(&self, path: &CStr) -> bool {
        std::str::from_utf8(path.to_bytes())
            .ok()
            .and_then(|path| std::fs::metadata(path).ok())
            .is_some_and(|metadata| metadata.is_dir())
    }

    fn read_dir(&self, path: &CStr) -> Result<Vec<String>> {
        let path = std::str::from_utf8(path.to_bytes()).map_err(|_| Errno::EINVAL)?;
        let entries = std::fs::read_dir(path)
            .map_err(|e| Errno::from_raw(e.raw_os_error().unwrap_or(libc::EIO)))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Errno::from_raw(e.raw_os_error().unwrap_or(libc::EIO))
            })?;
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn getcwd(&self) -> Result<String> {
        let dir = std::env::current_dir().map_err(|e| {
            Errno::from_raw(e.raw_os_error().unwrap_or(libc::EIO))
        })?;
        dir.into_os_string().into_string().map_err(|_| Errno::EINVAL)
    }

    fn chdir(&mut self, path: &CStr) -> Result<()> {
        Errno::result(unsafe { libc::chdir(path.as_ptr()) })?;
        Ok(())
    }

    fn home_dir(&self, user: &str) -> Option<String> {
        let user = CString::new(user).ok()?;
        let passwd = unsafe { libc::getpwnam(user.as_ptr()) };
        if passwd.is_null() {
            return None;
        }
        let dir = unsafe { CStr::from_ptr((*passwd).pw_dir) };
        Some(dir.to_str().ok()?.to_string())
    }
}
