//! Builtin name resolution.

use std::collections::HashMap;

use super::context::BuiltinContext;
use super::traits::{Builtin, BuiltinOutcome};

/// Registry mapping builtin names to implementations.
///
/// The dispatcher consults the registry before any process creation:
/// `Some(outcome)` means the segment was a builtin and is done (or wants a
/// re-submit); `None` sends the segment on to fork/exec.
#[derive(Default)]
pub struct BuiltinRegistry {
    builtins: HashMap<&'static str, Box<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builtin under its name.
    pub fn register(&mut self, builtin: impl Builtin + 'static) {
        self.builtins.insert(builtin.name(), Box::new(builtin));
    }

    /// True if the leading argument names a builtin.
    pub fn recognizes(&self, argv0: &str) -> bool {
        self.builtins.contains_key(self.key_for(argv0))
    }

    /// Dispatch an argument vector to its builtin, if it names one.
    pub fn dispatch(
        &self,
        argv: &[String],
        ctx: &mut BuiltinContext<'_>,
    ) -> Option<BuiltinOutcome> {
        let name = argv.first()?;
        self.builtins
            .get(self.key_for(name))
            .map(|builtin| builtin.execute(argv, ctx))
    }

    /// Any `!N` word resolves to the recall builtin.
    fn key_for<'n>(&self, argv0: &'n str) -> &'n str {
        if argv0.starts_with('!') {
            "!"
        } else {
            argv0
        }
    }
}
