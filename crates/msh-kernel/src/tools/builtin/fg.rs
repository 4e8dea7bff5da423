//! fg — resume a job in the foreground and wait on it.

use nix::sys::signal::Signal;

use msh_types::JobState;

use crate::signals::{block_sigchld, restore_mask};
use crate::tools::{Builtin, BuiltinContext, BuiltinOutcome};

/// Fg builtin: mark a job Foreground, continue its group, and suspend the
/// shell until it exits or stops — exactly like a freshly launched
/// foreground job.
pub struct Fg;

impl Builtin for Fg {
    fn name(&self) -> &'static str {
        "fg"
    }

    fn execute(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        let Some(target) = argv.get(1) else {
            eprintln!("fg: requires a pid or %jobid argument");
            return BuiltinOutcome::Handled;
        };

        let pid = match ctx.resolve_target(target) {
            Ok(pid) => pid,
            Err(err) => {
                eprintln!("fg: {err}");
                return BuiltinOutcome::Handled;
            }
        };

        // SIGCHLD stays blocked from before the continue signal until the
        // wait begins, so the job cannot exit between the two.
        let prev = block_sigchld();
        ctx.jobs
            .with_jobs(|jobs| jobs.set_state(pid, JobState::Foreground));
        if let Err(errno) = ctx.jobs.signal_group(pid, Signal::SIGCONT) {
            eprintln!("fg: {errno}");
            restore_mask(&prev);
            return BuiltinOutcome::Handled;
        }
        ctx.jobs.wait_foreground(pid);
        restore_mask(&prev);

        BuiltinOutcome::Handled
    }
}
