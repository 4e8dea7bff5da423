//! Execution context handed to builtins.

use std::sync::Arc;

use nix::unistd::Pid;

use msh_types::{JobError, JobId};

use crate::history::History;
use crate::signals::JobControl;

/// The collaborators a builtin is allowed to touch: the job-control core
/// and the history store. Nothing else of the shell is reachable from here.
pub struct BuiltinContext<'a> {
    /// Job table access and signal forwarding.
    pub jobs: &'a Arc<JobControl>,
    /// The bounded input-line history.
    pub history: &'a mut History,
}

impl BuiltinContext<'_> {
    /// Resolve a `bg`/`fg`/`kill` target word to a pid.
    ///
    /// `%N` names a job id; a bare number is taken as a pid, which must
    /// belong to an occupied slot.
    pub fn resolve_target(&self, word: &str) -> Result<Pid, TargetError> {
        if let Some(digits) = word.strip_prefix('%') {
            let id: i32 = digits.parse().map_err(|_| TargetError::NotANumber)?;
            let pid = self
                .jobs
                .pid_for(JobId(id))
                .map_err(TargetError::Unknown)?;
            Ok(pid)
        } else {
            let raw: i32 = word.parse().map_err(|_| TargetError::NotANumber)?;
            let pid = Pid::from_raw(raw);
            let known = self
                .jobs
                .with_jobs(|jobs| jobs.job_id_by_pid(pid))
                .is_some();
            if known {
                Ok(pid)
            } else {
                Err(TargetError::Unknown(JobError::NoSuchProcess(raw)))
            }
        }
    }
}

/// Why a job target word did not resolve.
#[derive(Debug)]
pub enum TargetError {
    /// The word was not `%N` or a number.
    NotANumber,
    /// Well-formed, but no such job or process is tracked.
    Unknown(JobError),
}

impl std::fmt::Display for TargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetError::NotANumber => f.write_str("argument must be a pid or %jobid"),
            TargetError::Unknown(err) => write!(f, "{err}"),
        }
    }
}
