//! kill — send an explicit signal to a job's process group.

use nix::sys::signal::Signal;

use crate::tools::{Builtin, BuiltinContext, BuiltinOutcome};

/// Kill builtin: `kill <signal-number> <pid-or-%jobid>`.
///
/// Recognized signal numbers: 2 (interrupt), 15 (terminate), 18 (continue),
/// 19 (stop). Delivery is to the whole process group, so the signal reaches
/// the job's descendants too.
pub struct Kill;

impl Builtin for Kill {
    fn name(&self) -> &'static str {
        "kill"
    }

    fn execute(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        let (Some(number), Some(target)) = (argv.get(1), argv.get(2)) else {
            eprintln!("kill: usage: kill <signal-number> <pid-or-%jobid>");
            return BuiltinOutcome::Handled;
        };

        let signal = match number.parse::<i32>().ok().and_then(recognized_signal) {
            Some(signal) => signal,
            None => {
                eprintln!("kill: invalid signal number: {number}");
                return BuiltinOutcome::Handled;
            }
        };

        let pid = match ctx.resolve_target(target) {
            Ok(pid) => pid,
            Err(err) => {
                eprintln!("kill: {err}");
                return BuiltinOutcome::Handled;
            }
        };

        if let Err(errno) = ctx.jobs.signal_group(pid, signal) {
            eprintln!("kill: {errno}");
        }
        // State changes and removal flow through the child-status handler,
        // the single path that mutates the table on delivery.
        BuiltinOutcome::Handled
    }
}

fn recognized_signal(number: i32) -> Option<Signal> {
    match number {
        2 => Some(Signal::SIGINT),
        15 => Some(Signal::SIGTERM),
        18 => Some(Signal::SIGCONT),
        19 => Some(Signal::SIGSTOP),
        _ => None,
    }
}
