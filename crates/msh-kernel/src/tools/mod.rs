//! Builtin command system for msh.
//!
//! Builtins are shell-internal commands that run synchronously in the
//! shell's own context and never create a child process. Each builtin
//! implements the [`Builtin`] trait and lives in its own module under
//! `builtin/`; the [`BuiltinRegistry`] resolves a parsed argument vector to
//! a builtin and reports back to the dispatcher.
//!
//! ```text
//! BuiltinRegistry
//! ├── jobs      (list occupied job slots)
//! ├── history   (list stored input lines)
//! ├── !N        (re-submit history entry N)
//! ├── bg / fg   (resume a job in the background / foreground)
//! └── kill      (send a signal to a job's process group)
//! ```

mod builtin;
mod context;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use context::{BuiltinContext, TargetError};
pub use registry::BuiltinRegistry;
pub use traits::{Builtin, BuiltinOutcome};
