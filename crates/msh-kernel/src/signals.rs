//! Signal coordination between the main shell flow and its children.
//!
//! Two execution contexts share the job table: the main control flow and
//! the child-status signal handler, which the kernel may run at any point,
//! including while the main flow is mid-mutation. There is no thread pool
//! here — the whole discipline is "handler vs. main flow":
//!
//! - Every main-flow access to the table goes through [`JobControl::with_jobs`],
//!   which blocks `SIGCHLD` for the duration and restores the prior mask on
//!   the way out. The handler therefore never observes a half-updated slot.
//! - The handler itself cannot be re-entered by its own signal (sigaction
//!   blocks the handled signal while the handler runs), and it blocks all
//!   signals around its own table mutations.
//! - The foreground marker is a single word-sized atomic — the one cell the
//!   handler may touch without any masking, and the only handshake between
//!   the handler and a waiting [`JobControl::wait_foreground`] caller.
//!
//! Handlers are registered once at startup with [`install`], which hands
//! them exactly the typed context they need (the table and the marker)
//! through a process-wide `OnceLock` — no broader global state.

use std::cell::UnsafeCell;
use std::os::fd::BorrowedFd;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::libc::c_int;
use nix::sys::signal::{
    killpg, sigaction, sigprocmask, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal,
};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use msh_types::{JobError, JobId, JobState};

use crate::jobs::JobTable;

/// The handler context: job table plus foreground marker.
///
/// This is the only state reachable from the signal handlers. All table
/// access from outside a handler must hold `SIGCHLD` blocked; the scoped
/// accessors below enforce that.
pub struct JobControl {
    /// The job table. `UnsafeCell` because the handler mutates it from an
    /// async context; exclusivity is provided by the masking discipline,
    /// not by a lock (a lock could deadlock against the handler).
    jobs: UnsafeCell<JobTable>,
    /// Pid of the foreground job, 0 when there is none. Written by the
    /// dispatcher when a foreground wait begins and by the child-status
    /// handler when that job exits or stops.
    fg_pid: AtomicI32,
}

// SAFETY: the table is only touched (a) from the main flow with SIGCHLD
// blocked, via `with_jobs`, and (b) from the SIGCHLD handler, which cannot
// run concurrently with (a) and is never re-entered by its own signal.
// The marker is a plain atomic. The shell's logic is single-threaded; this
// impl exists so the context can live in an `Arc` shared with the handler
// registration.
unsafe impl Sync for JobControl {}

/// The installed handler context. Set exactly once by `install`.
static INSTALLED: OnceLock<Arc<JobControl>> = OnceLock::new();

impl JobControl {
    /// Create a job-control context with a table of `max_jobs` slots.
    pub fn new(max_jobs: usize) -> Arc<Self> {
        Arc::new(Self {
            jobs: UnsafeCell::new(JobTable::new(max_jobs)),
            fg_pid: AtomicI32::new(0),
        })
    }

    /// Run `f` with exclusive access to the job table.
    ///
    /// Blocks `SIGCHLD` before entering `f` and restores the prior mask
    /// afterwards, so the child-status handler can neither observe nor
    /// mutate the table mid-update. Nesting is harmless: the inner call
    /// restores to the still-blocked outer mask.
    pub fn with_jobs<R>(&self, f: impl FnOnce(&mut JobTable) -> R) -> R {
        let prev = block_sigchld();
        // SAFETY: SIGCHLD is blocked, so the handler cannot run on this
        // thread, and shell logic is single-threaded — no other access.
        let result = f(unsafe { &mut *self.jobs.get() });
        restore_mask(&prev);
        result
    }

    /// Current foreground pid, 0 when no foreground job exists.
    pub fn fg_pid(&self) -> i32 {
        self.fg_pid.load(Ordering::SeqCst)
    }

    /// Mark `pid` as the foreground job.
    pub fn set_foreground(&self, pid: Pid) {
        self.fg_pid.store(pid.as_raw(), Ordering::SeqCst);
    }

    /// Clear the foreground marker.
    pub fn clear_foreground(&self) {
        self.fg_pid.store(0, Ordering::SeqCst);
    }

    /// Suspend the calling context until the foreground job is done.
    ///
    /// Sets the marker to `pid`, then parks in `sigsuspend` with an empty
    /// mask until the child-status handler clears the marker (on exit or
    /// stop). The caller must have `SIGCHLD` blocked on entry: that is what
    /// makes each marker-check-then-suspend step atomic — the signal can
    /// only be delivered inside `suspend`, never between the check and the
    /// sleep. No busy polling, no timeout; a user interrupt cancels the
    /// wait only by being forwarded to the job.
    pub fn wait_foreground(&self, pid: Pid) {
        self.set_foreground(pid);
        let wake = SigSet::empty();
        while self.fg_pid.load(Ordering::SeqCst) != 0 {
            // Always returns EINTR once a handler has run.
            let _ = wake.suspend();
        }
    }

    /// Send `signal` to a job's entire process group.
    ///
    /// Jobs run with their process group id equal to their pid, so group
    /// delivery reaches the job and its descendants but never the shell.
    pub fn signal_group(&self, pid: Pid, signal: Signal) -> Result<(), Errno> {
        killpg(pid, signal)
    }

    /// Resolve a job id to its pid, or fail with a not-found error.
    pub fn pid_for(&self, job_id: JobId) -> Result<Pid, JobError> {
        self.with_jobs(|jobs| jobs.pid_by_job_id(job_id))
            .ok_or(JobError::NoSuchJob(job_id))
    }

    /// Reap every child with a pending status change.
    ///
    /// Loops a non-blocking wait until nothing more is pending: several
    /// children changing status in a short window may coalesce into one
    /// SIGCHLD delivery, and a single reap would silently miss the rest.
    fn reap_children(&self) {
        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        loop {
            match waitpid(None, Some(flags)) {
                Ok(WaitStatus::StillAlive) | Err(_) => break,
                Ok(status) => self.apply_status(status),
            }
        }
    }

    /// Apply one reaped status change to the table and the marker.
    fn apply_status(&self, status: WaitStatus) {
        let Some(pid) = status.pid() else { return };
        match status {
            WaitStatus::Exited(..) | WaitStatus::Signaled(..) => {
                self.mutate_blocked(|jobs| {
                    jobs.remove(pid);
                });
                if self.fg_pid.load(Ordering::SeqCst) == pid.as_raw() {
                    // Wakes the dispatcher parked in wait_foreground.
                    self.fg_pid.store(0, Ordering::SeqCst);
                }
                sio::notice(pid.as_raw(), "Done");
            }
            WaitStatus::Stopped(..) => {
                self.mutate_blocked(|jobs| {
                    jobs.set_state(pid, JobState::Suspended);
                });
                if self.fg_pid.load(Ordering::SeqCst) == pid.as_raw() {
                    // The process is alive but the shell takes the prompt back.
                    self.fg_pid.store(0, Ordering::SeqCst);
                }
                sio::notice(pid.as_raw(), "Stopped");
            }
            WaitStatus::Continued(..) => {
                // Restore the class the job had before it was stopped; a job
                // resumed with `bg` stays Background. The marker is untouched:
                // whoever foregrounds a job sets it before waiting.
                self.mutate_blocked(|jobs| {
                    jobs.resume(pid);
                });
                sio::notice(pid.as_raw(), "Continue");
            }
            _ => {}
        }
    }

    /// Mutate the table with every signal blocked.
    ///
    /// The handler itself cannot be re-entered by SIGCHLD, but other
    /// table-mutating signals are not excluded during its execution.
    fn mutate_blocked(&self, f: impl FnOnce(&mut JobTable)) {
        let mut prev = SigSet::empty();
        let blocked =
            sigprocmask(SigmaskHow::SIG_BLOCK, Some(&SigSet::all()), Some(&mut prev)).is_ok();
        // SAFETY: see the Sync justification on JobControl — either we are
        // in the handler (main flow holds SIGCHLD blocked everywhere it
        // touches the table) or in a test on a private instance.
        f(unsafe { &mut *self.jobs.get() });
        if blocked {
            let _ = sigprocmask(SigmaskHow::SIG_SETMASK, Some(&prev), None);
        }
    }
}

/// Register the child-status, interrupt, and terminal-stop handlers for
/// `ctl`, the one context the handlers will ever see.
///
/// Handlers restart interrupted syscalls (`SA_RESTART`) and carry no extra
/// blocked set — sigaction already keeps each handler from being
/// interrupted by its own signal. Fails if handlers are already installed
/// in this process.
pub fn install(ctl: &Arc<JobControl>) -> Result<()> {
    INSTALLED
        .set(ctl.clone())
        .map_err(|_| anyhow::anyhow!("signal handlers already installed"))?;

    let register = |signal: Signal, handler: extern "C" fn(c_int)| -> Result<()> {
        let action = SigAction::new(
            SigHandler::Handler(handler),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        unsafe { sigaction(signal, &action) }
            .with_context(|| format!("failed to install {signal} handler"))?;
        Ok(())
    };

    register(Signal::SIGCHLD, handle_sigchld)?;
    register(Signal::SIGINT, handle_sigint)?;
    register(Signal::SIGTSTP, handle_sigtstp)?;
    tracing::debug!("job-control signal handlers installed");
    Ok(())
}

/// Block `SIGCHLD` on the calling thread, returning the prior mask.
pub(crate) fn block_sigchld() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGCHLD);
    let mut prev = SigSet::empty();
    if let Err(e) = sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut prev)) {
        tracing::warn!("sigprocmask(SIG_BLOCK) failed: {e}");
    }
    prev
}

/// Restore a mask previously returned by [`block_sigchld`].
pub(crate) fn restore_mask(prev: &SigSet) {
    if let Err(e) = sigprocmask(SigmaskHow::SIG_SETMASK, Some(prev), None) {
        tracing::warn!("sigprocmask(SIG_SETMASK) failed: {e}");
    }
}

fn installed() -> Option<&'static Arc<JobControl>> {
    INSTALLED.get()
}

/// Child-status handler: reap everything pending, then restore errno so an
/// interrupted syscall in the main flow does not see a clobbered value.
extern "C" fn handle_sigchld(_signal: c_int) {
    let saved_errno = Errno::last_raw();
    if let Some(ctl) = installed() {
        ctl.reap_children();
    }
    Errno::set_raw(saved_errno);
}

/// User interrupt: forward to the foreground job's process group. With no
/// foreground job the keystroke is ignored — the shell never signals itself.
extern "C" fn handle_sigint(_signal: c_int) {
    forward_to_foreground(Signal::SIGINT);
}

/// Terminal stop: same forwarding as the interrupt handler.
extern "C" fn handle_sigtstp(_signal: c_int) {
    forward_to_foreground(Signal::SIGTSTP);
}

fn forward_to_foreground(signal: Signal) {
    let saved_errno = Errno::last_raw();
    if let Some(ctl) = installed() {
        let fg = ctl.fg_pid.load(Ordering::SeqCst);
        if fg > 0 {
            // Nothing useful can be done with a failure inside a handler.
            let _ = killpg(Pid::from_raw(fg), signal);
        }
    }
    Errno::set_raw(saved_errno);
}

/// Async-signal-safe notice output.
///
/// The child-status handler may interrupt an in-progress stdio call, so
/// notices bypass buffered I/O entirely: one `write(2)` per notice, built
/// in a stack buffer with no allocation.
mod sio {
    use super::BorrowedFd;

    const STDOUT: i32 = 1;

    /// Write `pid <N> <reason>\n` to stdout.
    pub(super) fn notice(pid: i32, reason: &str) {
        let mut buf = [0u8; 64];
        let mut at = 0;
        at = append(&mut buf, at, b"pid ");
        at = append_u32(&mut buf, at, pid.unsigned_abs());
        at = append(&mut buf, at, b" ");
        at = append(&mut buf, at, reason.as_bytes());
        at = append(&mut buf, at, b"\n");

        // SAFETY: fd 1 is open for the life of the process.
        let fd = unsafe { BorrowedFd::borrow_raw(STDOUT) };
        let _ = nix::unistd::write(fd, &buf[..at]);
    }

    fn append(buf: &mut [u8; 64], at: usize, bytes: &[u8]) -> usize {
        let end = (at + bytes.len()).min(buf.len());
        buf[at..end].copy_from_slice(&bytes[..end - at]);
        end
    }

    fn append_u32(buf: &mut [u8; 64], at: usize, mut n: u32) -> usize {
        let mut digits = [0u8; 10];
        let mut count = 0;
        loop {
            digits[count] = b'0' + (n % 10) as u8;
            n /= 10;
            count += 1;
            if n == 0 {
                break;
            }
        }
        let mut at = at;
        while count > 0 {
            count -= 1;
            if at < buf.len() {
                buf[at] = digits[count];
                at += 1;
            }
        }
        at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(capacity: usize) -> Arc<JobControl> {
        JobControl::new(capacity)
    }

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    #[test]
    fn exited_status_removes_job_and_clears_marker() {
        let ctl = control(4);
        ctl.with_jobs(|jobs| jobs.insert(pid(100), JobState::Foreground, "a"))
            .unwrap();
        ctl.set_foreground(pid(100));

        ctl.apply_status(WaitStatus::Exited(pid(100), 0));

        assert_eq!(ctl.fg_pid(), 0);
        assert!(ctl.with_jobs(|jobs| jobs.is_empty()));
    }

    #[test]
    fn killed_status_removes_job_like_exit() {
        let ctl = control(4);
        ctl.with_jobs(|jobs| jobs.insert(pid(101), JobState::Background, "b"))
            .unwrap();

        ctl.apply_status(WaitStatus::Signaled(pid(101), Signal::SIGTERM, false));

        assert!(ctl.with_jobs(|jobs| jobs.job_id_by_pid(pid(101))).is_none());
        // A background death never touches the marker.
        assert_eq!(ctl.fg_pid(), 0);
    }

    #[test]
    fn stopped_foreground_job_suspends_and_releases_waiter() {
        let ctl = control(4);
        ctl.with_jobs(|jobs| jobs.insert(pid(102), JobState::Foreground, "vi"))
            .unwrap();
        ctl.set_foreground(pid(102));

        ctl.apply_status(WaitStatus::Stopped(pid(102), Signal::SIGTSTP));

        // The marker is cleared even though the process is still alive.
        assert_eq!(ctl.fg_pid(), 0);
        assert_eq!(
            ctl.with_jobs(|jobs| jobs.state_by_pid(pid(102))),
            Some(JobState::Suspended)
        );
    }

    #[test]
    fn continued_job_resumes_prior_class_without_duplicates() {
        let ctl = control(4);
        ctl.with_jobs(|jobs| jobs.insert(pid(103), JobState::Background, "sleep 60"))
            .unwrap();

        ctl.apply_status(WaitStatus::Stopped(pid(103), Signal::SIGSTOP));
        ctl.apply_status(WaitStatus::Continued(pid(103)));

        assert_eq!(
            ctl.with_jobs(|jobs| jobs.state_by_pid(pid(103))),
            Some(JobState::Background)
        );
        assert_eq!(ctl.with_jobs(|jobs| jobs.len()), 1);
        // Resuming a background job must not claim the foreground.
        assert_eq!(ctl.fg_pid(), 0);
    }

    #[test]
    fn stop_of_non_foreground_job_keeps_marker() {
        let ctl = control(4);
        ctl.with_jobs(|jobs| jobs.insert(pid(104), JobState::Foreground, "fg"))
            .unwrap();
        ctl.with_jobs(|jobs| jobs.insert(pid(105), JobState::Background, "bg"))
            .unwrap();
        ctl.set_foreground(pid(104));

        ctl.apply_status(WaitStatus::Stopped(pid(105), Signal::SIGSTOP));

        assert_eq!(ctl.fg_pid(), 104);
        assert_eq!(
            ctl.with_jobs(|jobs| jobs.state_by_pid(pid(104))),
            Some(JobState::Foreground)
        );
    }

    #[test]
    fn status_for_unknown_pid_is_harmless() {
        let ctl = control(2);
        ctl.apply_status(WaitStatus::Exited(pid(999), 0));
        ctl.apply_status(WaitStatus::Continued(pid(999)));
        assert!(ctl.with_jobs(|jobs| jobs.is_empty()));
    }

    #[test]
    fn pid_for_reports_missing_jobs() {
        let ctl = control(2);
        let err = ctl.pid_for(JobId(3)).unwrap_err();
        assert_eq!(err, JobError::NoSuchJob(JobId(3)));
    }
}
