//! !N — re-submit a history entry.

use crate::tools::{Builtin, BuiltinContext, BuiltinOutcome};

/// Recall builtin: `!N` re-submits the line stored at ordinal N.
///
/// The registry routes every `!`-prefixed word here; the ordinal is parsed
/// out of `argv[0]`.
pub struct Recall;

impl Builtin for Recall {
    fn name(&self) -> &'static str {
        "!"
    }

    fn execute(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome {
        let word = &argv[0];
        let ordinal = word.strip_prefix('!').and_then(|d| d.parse::<usize>().ok());

        match ordinal.and_then(|n| ctx.history.get(n)) {
            Some(line) => BuiltinOutcome::Resubmit(line.to_string()),
            None => {
                eprintln!("{word}: no such command");
                BuiltinOutcome::Handled
            }
        }
    }
}
