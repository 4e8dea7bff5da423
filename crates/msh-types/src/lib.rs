//! Pure data types for msh — job identifiers, states, and errors.
//!
//! This crate is a leaf dependency with no I/O, no unsafe, and no system
//! bindings. It exists so that consumers can reason about job state and
//! the core error taxonomy without pulling in msh-kernel's nix plumbing.

pub mod error;
pub mod job;

// Flat re-exports for convenience
pub use error::*;
pub use job::*;
