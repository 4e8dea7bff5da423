//! history — list stored input lines.

use crate::tools::{Builtin, BuiltinContext, BuiltinOutcome};

/// History builtin: numbered listing, oldest first.
pub struct HistoryList;

impl Builtin for HistoryList {
    fn name(&self) -> &'static str {
        "history"
    }

    fn execute(&self, _argv: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        for (ordinal, line) in ctx.history.iter().enumerate() {
            println!("{:5}\t{}", ordinal + 1, line);
        }
        BuiltinOutcome::Handled
    }
}
