//! Core builtin trait and dispatch outcome.

use super::context::BuiltinContext;

/// What a handled builtin asks the dispatcher to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinOutcome {
    /// The command was fully handled; nothing further to execute.
    Handled,
    /// A line of text to re-submit as if freshly entered (history recall).
    Resubmit(String),
}

/// A shell-internal command.
///
/// Builtins receive the full argument vector (name included — the recall
/// builtin parses its ordinal out of `argv[0]`) and typed access to exactly
/// the collaborators they may touch. User-facing messages, including
/// argument errors, are printed directly; a builtin invocation itself never
/// fails.
pub trait Builtin: Send + Sync {
    /// The name the registry resolves (`"!"` matches any `!N` word).
    fn name(&self) -> &'static str;

    /// Execute with the full argv of the command segment.
    fn execute(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> BuiltinOutcome;
}
