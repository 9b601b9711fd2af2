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

//! Type definitions for job management
//!
//! Asynchronous commands are registered in the [`JobSet`] keyed by a
//! small job number. The shell reaps their statuses between commands
//! and reports finished jobs under the `Notify` option or before the
//! interactive prompt.

use crate::semantics::ExitStatus;
#[doc(no_inline)]
pub use nix::sys::wait::WaitStatus;
#[doc(no_inline)]
pub use nix::unistd::Pid;
use slab::Slab;

/// Set of processes executing an asynchronous command
///
/// The shell tracks one process per job: the process whose exit status
/// becomes the status of the job.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Job {
    /// Process ID
    pub pid: Pid,

    /// Whether the job runs in its own process group
    pub job_controlled: bool,

    /// Last observed status of the process
    pub status: WaitStatus,

    /// Whether `status` has been reported to the user
    pub status_reported: bool,

    /// String representation of this job for reports
    pub name: String,
}

impl Job {
    /// Creates a new running job for the given process.
    #[must_use]
    pub fn new(pid: Pid) -> Self {
        Job {
            pid,
            job_controlled: false,
            status: WaitStatus::StillAlive,
            status_reported: false,
            name: String::new(),
        }
    }

    /// Returns whether the job has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            WaitStatus::Exited(_, _) | WaitStatus::Signaled(_, _, _)
        )
    }
}

/// Collection of jobs
#[derive(Clone, Debug, Default)]
pub struct JobSet {
    jobs: Slab<Job>,

    /// Process ID of the most recently started asynchronous command
    last_async_pid: Option<Pid>,
}

impl JobSet {
    /// Creates an empty job set.
    #[must_use]
    pub fn new() -> JobSet {
        Default::default()
    }

    /// Adds a job, returning its job number.
    ///
    /// Job numbers start from 1 and are reused after removal.
    pub fn add(&mut self, job: Job) -> usize {
        self.jobs.insert(job) + 1
    }

    /// Returns the job with the given job number.
    #[must_use]
    pub fn get(&self, job_number: usize) -> Option<&Job> {
        job_number.checked_sub(1).and_then(|i| self.jobs.get(i))
    }

    /// Removes the job with the given job number.
    pub fn remove(&mut self, job_number: usize) -> Option<Job> {
        let index = job_number.checked_sub(1)?;
        self.jobs.try_remove(index)
    }

    /// Returns an iterator of job numbers and jobs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.jobs.iter().map(|(i, job)| (i + 1, job))
    }

    /// Returns the number of jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns whether the set has no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Records a new status for the job with the given process ID.
    pub fn update_status(&mut self, pid: Pid, status: WaitStatus) {
        for (_, job) in self.jobs.iter_mut() {
            if job.pid == pid {
                if job.status != status {
                    job.status = status;
                    job.status_reported = false;
                }
                return;
            }
        }
    }

    /// Removes finished jobs, returning a report line for each job whose
    /// final status has not been reported.
    pub fn take_finished_reports(&mut self) -> Vec<String> {
        let finished: Vec<usize> = self
            .jobs
            .iter()
            .filter(|(_, job)| job.is_finished())
            .map(|(i, _)| i)
            .collect();

        let mut reports = Vec::new();
        for index in finished {
            let job = self.jobs.remove(index);
            if !job.status_reported {
                let what = match job.status {
                    WaitStatus::Exited(_, 0) => "Done".to_string(),
                    WaitStatus::Exited(_, code) => format!("Done({code})"),
                    WaitStatus::Signaled(_, signal, _) => format!("Terminated({signal})"),
                    _ => unreachable!("job is finished"),
                };
                reports.push(format!("[{}] {} {}", index + 1, what, job.name));
            }
        }
        reports
    }

    /// Returns the process ID of the most recently started asynchronous
    /// command, i.e. the value of `$!`.
    #[must_use]
    pub fn last_async_pid(&self) -> Option<Pid> {
        self.last_async_pid
    }

    /// Sets the process ID of the most recently started asynchronous
    /// command.
    pub fn set_last_async_pid(&mut self, pid: Pid) {
        self.last_async_pid = Some(pid);
    }

    /// Returns the exit status of the job with the given process ID, if
    /// it has finished.
    #[must_use]
    pub fn exit_status_of(&self, pid: Pid) -> Option<ExitStatus> {
        self.jobs
            .iter()
            .find(|(_, job)| job.pid == pid)
            .and_then(|(_, job)| ExitStatus::from_wait_status(job.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_numbers_start_from_one() {
        let mut set = JobSet::new();
        let n1 = set.add(Job::new(Pid::from_raw(10)));
        let n2 = set.add(Job::new(Pid::from_raw(11)));
        assert_eq!(n1, 1);
        assert_eq!(n2, 2);
        assert_eq!(set.get(1).unwrap().pid, Pid::from_raw(10));
        assert_eq!(set.get(0), None);
    }

    #[test]
    fn status_updates_and_reports() {
        let mut set = JobSet::new();
        let pid = Pid::from_raw(10);
        let mut job = Job::new(pid);
        job.name = "sleep 10&".to_string();
        set.add(job);

        set.update_status(pid, WaitStatus::Exited(pid, 0));
        let reports = set.take_finished_reports();
        assert_eq!(reports, ["[1] Done sleep 10&"]);
        assert!(set.is_empty());
    }

    #[test]
    fn last_async_pid() {
        let mut set = JobSet::new();
        assert_eq!(set.last_async_pid(), None);
        set.set_last_async_pid(Pid::from_raw(42));
        assert_eq!(set.last_async_pid(), Some(Pid::from_raw(42)));
    }
}
