use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use thiserror::Error;

/// Capacity of the background job table.
pub const MAX_JOBS: usize = 100;
/// Stored command text is clipped to this many characters.
pub const MAX_COMMAND_TEXT: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("job table full ({MAX_JOBS} jobs)")]
    TableFull,
    #[error("invalid job number: {0}")]
    NoSuchJob(usize),
    #[error("failed to signal process: {0}")]
    Signal(Errno),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub command: String,
}

/// Registry of background processes. Jobs are addressed by their current
/// 1-based position; removing one renumbers everything after it. Entries are
/// never removed behind the caller's back: a job that has already exited
/// stays listed until it is killed or the shell exits.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> JobTable {
        JobTable { jobs: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Appends a job and returns its 1-based slot.
    pub fn register(&mut self, pid: Pid, command: &str) -> Result<usize, JobError> {
        if self.jobs.len() == MAX_JOBS {
            return Err(JobError::TableFull);
        }
        let command = command.chars().take(MAX_COMMAND_TEXT).collect();
        self.jobs.push(Job { pid, command });
        Ok(self.jobs.len())
    }

    pub fn list(&self) -> impl Iterator<Item = (usize, &Job)> + '_ {
        self.jobs.iter().enumerate().map(|(i, job)| (i + 1, job))
    }

    /// Kills the job in slot `job_number` and removes it, shifting later
    /// entries left. When the signal cannot be delivered the table is left
    /// untouched.
    pub fn terminate(&mut self, job_number: usize) -> Result<Job, JobError> {
        if job_number == 0 || job_number > self.jobs.len() {
            return Err(JobError::NoSuchJob(job_number));
        }
        let pid = self.jobs[job_number - 1].pid;
        signal::kill(pid, Signal::SIGKILL).map_err(JobError::Signal)?;
        Ok(self.jobs.remove(job_number - 1))
    }
}
