//! bg — resume a job in the background.

use nix::sys::signal::Signal;

use msh_types::JobState;

use crate::tools::{Builtin, BuiltinContext, BuiltinOutcome};

/// Bg builtin: mark a job Background and send its group a continue signal.
pub struct Bg;

impl Builtin for Bg {
    fn name(&self) -> &'static str {
        "bg"
    }

    fn execute(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        let Some(target) = argv.get(1) else {
            eprintln!("bg: requires a pid or %jobid argument");
            return BuiltinOutcome::Handled;
        };

        let pid = match ctx.resolve_target(target) {
            Ok(pid) => pid,
            Err(err) => {
                eprintln!("bg: {err}");
                return BuiltinOutcome::Handled;
            }
        };

        // Classify first so a continued notification resumes into Background.
        ctx.jobs
            .with_jobs(|jobs| jobs.set_state(pid, JobState::Background));
        if let Err(errno) = ctx.jobs.signal_group(pid, Signal::SIGCONT) {
            eprintln!("bg: {errno}");
            return BuiltinOutcome::Handled;
        }

        let report = ctx.jobs.with_jobs(|jobs| {
            jobs.get(pid)
                .map(|job| (job.job_id, job.command.clone()))
        });
        if let Some((job_id, command)) = report {
            println!("[{job_id}] {pid} {command}");
        }
        BuiltinOutcome::Handled
    }
}
