//! External command launch — fork, exec, and the foreground wait.
//!
//! The launch sequence is where the canonical job-control race lives: a
//! fast-exiting child can be reaped by the child-status handler before the
//! parent has registered it, leaving the handler to delete a job that does
//! not exist yet. The sequence below closes it by blocking `SIGCHLD` from
//! just before `fork` until the table insert has completed:
//!
//! ```text
//! block SIGCHLD ── fork ──┬─ child:  restore mask, setpgid(0,0), execvp
//!                         └─ parent: insert job ── fg? wait_foreground
//!                                                └─ restore mask
//! ```
//!
//! The child takes a fresh process group equal to its own pid, so signals
//! the shell forwards to "the foreground job" land on exactly that job's
//! descendants and never on the shell itself.

use std::ffi::CString;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::waitpid;
use nix::unistd::{execvp, fork, setpgid, ForkResult, Pid};
use thiserror::Error;

use msh_types::{JobError, JobState};

use crate::signals::{block_sigchld, restore_mask, JobControl};

/// Exit status a child reports when its image replacement fails.
const EXIT_NOT_FOUND: i32 = 127;

/// Why a launch did not produce a tracked job.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The job table had no free slot; the forked child was killed and
    /// reaped, leaving no orphan and no table entry.
    #[error(transparent)]
    Table(#[from] JobError),

    /// The process-creation call itself failed. Recoverable: the shell
    /// reports it and keeps reading input.
    #[error("fork failed: {0}")]
    Fork(Errno),

    /// An argument contained an interior nul byte and cannot be exec'd.
    #[error("argument contains an interior nul byte")]
    BadArgv,
}

/// Launch one external command segment as a child process.
///
/// Registers the child in the job table under `command_text` and, for a
/// foreground job, suspends the caller until the signal coordinator reports
/// completion or a stop. Background jobs are reported and left to complete
/// asynchronously.
pub fn launch(
    ctl: &JobControl,
    argv: &[String],
    command_text: &str,
    background: bool,
) -> Result<(), LaunchError> {
    let c_argv: Vec<CString> = argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<_, _>>()
        .map_err(|_| LaunchError::BadArgv)?;
    let Some(program) = c_argv.first() else {
        return Ok(());
    };

    // From here until the insert completes, the child-status handler must
    // not run: it would try to delete a job that is not registered yet.
    let prev = block_sigchld();

    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            restore_mask(&prev);
            // Isolate the job in its own process group (pgid = own pid).
            let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));
            let _ = execvp(program, &c_argv);
            // Only reached when the image replacement failed.
            eprintln!("{}: command not found", argv[0]);
            std::process::exit(EXIT_NOT_FOUND);
        }
        Ok(ForkResult::Parent { child }) => {
            // Also set the group from the parent side: forwarding must not
            // race the child's own setpgid.
            let _ = setpgid(child, child);

            let state = if background {
                JobState::Background
            } else {
                JobState::Foreground
            };
            match ctl.with_jobs(|jobs| jobs.insert(child, state, command_text)) {
                Ok(job_id) => {
                    tracing::debug!(pid = child.as_raw(), %job_id, background, "launched {command_text:?}");
                    if background {
                        restore_mask(&prev);
                        println!("[{job_id}] {child} {command_text}");
                    } else {
                        // SIGCHLD is still blocked, so the marker check and
                        // the sigsuspend inside are a single atomic step.
                        ctl.wait_foreground(child);
                        restore_mask(&prev);
                    }
                    Ok(())
                }
                Err(err) => {
                    // No slot. Don't leak an untracked child: take it down
                    // and reap it here, while the handler is still blocked.
                    let _ = kill(child, Signal::SIGKILL);
                    let _ = waitpid(child, None);
                    restore_mask(&prev);
                    Err(err.into())
                }
            }
        }
        Err(errno) => {
            restore_mask(&prev);
            Err(LaunchError::Fork(errno))
        }
    }
}
