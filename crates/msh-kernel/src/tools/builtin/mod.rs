//! Built-in commands for msh.
//!
//! These are always available and run synchronously in the shell's own
//! context; none of them populates the job table.

mod bg;
mod fg;
mod history;
mod jobs;
mod kill;
mod recall;

use super::BuiltinRegistry;

/// Register all built-in commands with the registry.
pub fn register_builtins(registry: &mut BuiltinRegistry) {
    registry.register(bg::Bg);
    registry.register(fg::Fg);
    registry.register(history::HistoryList);
    registry.register(jobs::Jobs);
    registry.register(kill::Kill);
    registry.register(recall::Recall);
}
