//! msh-kernel: the core of msh.
//!
//! This crate provides:
//!
//! - **Jobs**: the fixed-capacity job table
//! - **Signals**: the signal coordinator — handlers, reaping, the
//!   foreground marker, and the blocking discipline
//! - **Dispatch**: external command launch under correct signal masking
//! - **Tokenizer**: input line → command segments and argument vectors
//! - **History**: the bounded, persisted input-line store
//! - **Tools**: the builtin trait, registry, and builtin commands
//! - **Shell**: the evaluator tying the pieces together

pub mod dispatch;
pub mod history;
pub mod jobs;
pub mod shell;
pub mod signals;
pub mod tokenizer;
pub mod tools;

pub use shell::{EvalOutcome, Shell, ShellConfig};
pub use signals::JobControl;
