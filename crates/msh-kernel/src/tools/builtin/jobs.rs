//! jobs — list occupied job table slots.

use crate::tools::{Builtin, BuiltinContext, BuiltinOutcome};

/// Jobs builtin: one line per occupied slot, in slot order.
pub struct Jobs;

impl Builtin for Jobs {
    fn name(&self) -> &'static str {
        "jobs"
    }

    fn execute(&self, _argv: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        let jobs = ctx.jobs.with_jobs(|table| table.jobs());
        for job in jobs {
            println!("[{}] {} {}\t{}", job.id, job.pid, job.state, job.command);
        }
        BuiltinOutcome::Handled
    }
}
