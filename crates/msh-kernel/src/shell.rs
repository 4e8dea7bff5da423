//! The Shell — owns and coordinates the core components.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Shell                            │
//! │  ┌─────────────────┐  ┌───────────────┐  ┌────────────┐  │
//! │  │   JobControl    │  │ BuiltinRegistry│ │  History   │  │
//! │  │ (table + marker │  │ (jobs, bg, fg, │ │ (bounded,  │  │
//! │  │  + handlers)    │  │  kill, !N, …)  │ │ persisted) │  │
//! │  └─────────────────┘  └───────────────┘  └────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `evaluate` takes one raw input line through the tokenizer, the builtin
//! interpreter, and the job dispatcher. A capacity or fork failure aborts
//! the remaining segments of that line only; the read loop continues.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use nix::sys::wait::waitpid;
use nix::unistd::Pid;

use msh_types::JobState;

use crate::dispatch::{launch, LaunchError};
use crate::history::{default_history_path, History};
use crate::signals::{block_sigchld, restore_mask, JobControl};
use crate::tokenizer::{split_args, split_segments};
use crate::tools::{register_builtins, BuiltinContext, BuiltinOutcome, BuiltinRegistry};

/// Re-submission depth cap for `!N` recall, against self-referencing lines.
const MAX_RESUBMIT_DEPTH: usize = 16;

/// Shell configuration.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Maximum number of jobs in existence at any point in time.
    pub max_jobs: usize,
    /// Maximum number of characters on a single input line.
    pub max_line: usize,
    /// Maximum number of saved history lines.
    pub max_history: usize,
    /// Where history is loaded from and written back to. `None` disables
    /// persistence (the in-memory store still works).
    pub history_file: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_jobs: 16,
            max_line: 1024,
            max_history: 10,
            history_file: default_history_path(),
        }
    }
}

impl ShellConfig {
    /// Set the job table capacity.
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }

    /// Set the input line length limit.
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    /// Set the history capacity.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Set (or with `None`, disable) the history file.
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }
}

/// What the read loop should do after evaluating a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalOutcome {
    /// Keep reading input.
    Continue,
    /// The user asked to exit.
    Exit,
}

/// The shell core: job control, builtins, and history behind one handle.
pub struct Shell {
    config: ShellConfig,
    jobs: Arc<JobControl>,
    builtins: BuiltinRegistry,
    history: History,
}

impl Shell {
    /// Create a shell from `config`, loading persisted history.
    ///
    /// Signal handlers are not yet active; call
    /// [`install_signal_handlers`](Self::install_signal_handlers) once
    /// before evaluating input.
    pub fn new(config: ShellConfig) -> Self {
        let jobs = JobControl::new(config.max_jobs);
        let mut builtins = BuiltinRegistry::new();
        register_builtins(&mut builtins);

        let history = match &config.history_file {
            Some(path) => History::load(config.max_history, path),
            None => History::new(config.max_history),
        };

        Self {
            config,
            jobs,
            builtins,
            history,
        }
    }

    /// Register the child-status, interrupt, and terminal-stop handlers.
    ///
    /// Must be called exactly once per process, at startup.
    pub fn install_signal_handlers(&self) -> Result<()> {
        crate::signals::install(&self.jobs)
    }

    /// The job-control handle (shared with the signal handlers).
    pub fn job_control(&self) -> &Arc<JobControl> {
        &self.jobs
    }

    /// Evaluate one raw input line.
    pub fn evaluate(&mut self, line: &str) -> EvalOutcome {
        self.evaluate_at(line, 0)
    }

    fn evaluate_at(&mut self, line: &str, depth: usize) -> EvalOutcome {
        if line.len() > self.config.max_line {
            println!("error: reached the maximum line limit");
            return EvalOutcome::Continue;
        }

        // Recalled lines are evaluated, not re-recorded; `!N` words are
        // never stored, so recall cannot chase its own entry.
        if depth == 0 && !line.trim_start().starts_with('!') {
            self.history.add(line);
        }

        for segment in split_segments(line) {
            let argv = split_args(&segment.text);
            let Some(head) = argv.first() else { continue };

            if head == "exit" {
                return EvalOutcome::Exit;
            }

            let outcome = {
                let mut ctx = BuiltinContext {
                    jobs: &self.jobs,
                    history: &mut self.history,
                };
                self.builtins.dispatch(&argv, &mut ctx)
            };
            match outcome {
                Some(BuiltinOutcome::Handled) => continue,
                Some(BuiltinOutcome::Resubmit(text)) => {
                    if depth >= MAX_RESUBMIT_DEPTH {
                        eprintln!("error: recall recursion limit reached");
                        continue;
                    }
                    if self.evaluate_at(&text, depth + 1) == EvalOutcome::Exit {
                        return EvalOutcome::Exit;
                    }
                    continue;
                }
                None => {}
            }

            if let Err(err) = launch(&self.jobs, &argv, &segment.text, segment.background) {
                eprintln!("error: {err}");
                match err {
                    // A full table or a failed fork aborts what is left of
                    // this line; the read loop itself continues.
                    LaunchError::Table(_) | LaunchError::Fork(_) => break,
                    LaunchError::BadArgv => continue,
                }
            }
        }

        EvalOutcome::Continue
    }

    /// Drain outstanding background jobs and persist history.
    ///
    /// Waits for every job still in the Background state to finish, then
    /// writes the history file. Suspended jobs are left behind, as the
    /// reference shell leaves them.
    pub fn shutdown(&mut self) {
        loop {
            let next: Option<Pid> = self.jobs.with_jobs(|jobs| {
                jobs.iter_occupied()
                    .find(|job| job.state == JobState::Background)
                    .map(|job| job.pid)
            });
            let Some(pid) = next else { break };

            let prev = block_sigchld();
            // Already-reaped children surface as an error here; either way
            // the slot is gone afterwards.
            let _ = waitpid(pid, None);
            self.jobs.with_jobs(|jobs| jobs.remove(pid));
            restore_mask(&prev);
        }

        if let Some(path) = &self.config.history_file {
            if let Err(err) = self.history.save(path) {
                tracing::warn!("failed to save history: {err:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msh_types::JobId;

    fn shell() -> Shell {
        // No history file, no installed handlers: pure in-process logic.
        Shell::new(ShellConfig::default().with_history_file(None))
    }

    #[test]
    fn exit_ends_the_loop() {
        let mut shell = shell();
        assert_eq!(shell.evaluate("exit"), EvalOutcome::Exit);
        assert_eq!(shell.evaluate("  exit  "), EvalOutcome::Exit);
    }

    #[test]
    fn blank_lines_do_nothing() {
        let mut shell = shell();
        assert_eq!(shell.evaluate(""), EvalOutcome::Continue);
        assert_eq!(shell.evaluate("   ;  ; "), EvalOutcome::Continue);
        assert!(shell.history.is_empty());
    }

    #[test]
    fn over_long_lines_are_rejected() {
        let mut shell = Shell::new(
            ShellConfig::default()
                .with_max_line(8)
                .with_history_file(None),
        );
        assert_eq!(shell.evaluate("0123456789"), EvalOutcome::Continue);
        // Rejected lines are evaluated no further and not recorded.
        assert!(shell.history.is_empty());
    }

    #[test]
    fn lines_are_recorded_but_recalls_are_not() {
        let mut shell = shell();
        shell.evaluate("history");
        shell.evaluate("!1");
        assert_eq!(shell.history.len(), 1);
        assert_eq!(shell.history.get(1), Some("history"));
    }

    #[test]
    fn recall_out_of_range_creates_no_job() {
        let mut shell = shell();
        shell.evaluate("history");
        assert_eq!(shell.evaluate("!3"), EvalOutcome::Continue);
        assert!(shell.jobs.with_jobs(|jobs| jobs.is_empty()));
    }

    #[test]
    fn recalled_exit_exits() {
        let mut shell = shell();
        shell.evaluate("jobs");
        // Lines are recorded before their segments run, so the exit line
        // is recallable afterwards.
        assert_eq!(shell.evaluate("exit ; jobs"), EvalOutcome::Exit);
        assert_eq!(shell.history.get(2), Some("exit ; jobs"));
        assert_eq!(shell.evaluate("!2"), EvalOutcome::Exit);
    }

    #[test]
    fn builtins_do_not_populate_the_job_table() {
        let mut shell = shell();
        shell.evaluate("jobs");
        shell.evaluate("history");
        shell.evaluate("bg %1");
        shell.evaluate("fg nonsense");
        shell.evaluate("kill 19 %1");
        assert!(shell.jobs.with_jobs(|jobs| jobs.is_empty()));
    }

    #[test]
    fn unknown_targets_leave_state_untouched() {
        let mut shell = shell();
        shell
            .jobs
            .with_jobs(|jobs| jobs.insert(Pid::from_raw(4242), JobState::Background, "fake"))
            .unwrap();

        shell.evaluate("bg %7");
        shell.evaluate("kill 19 9999999");

        assert_eq!(
            shell
                .jobs
                .with_jobs(|jobs| jobs.state_by_pid(Pid::from_raw(4242))),
            Some(JobState::Background)
        );
        assert_eq!(
            shell.jobs.with_jobs(|jobs| jobs.job_id_by_pid(Pid::from_raw(4242))),
            Some(JobId(1))
        );
    }

    #[test]
    fn invalid_signal_number_is_rejected_without_state_change() {
        let mut shell = shell();
        shell
            .jobs
            .with_jobs(|jobs| jobs.insert(Pid::from_raw(5151), JobState::Background, "fake"))
            .unwrap();

        // 9 is not in the recognized set {2, 15, 18, 19}.
        shell.evaluate("kill 9 %1");

        assert_eq!(
            shell
                .jobs
                .with_jobs(|jobs| jobs.state_by_pid(Pid::from_raw(5151))),
            Some(JobState::Background)
        );
    }
}
