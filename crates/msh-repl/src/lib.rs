//! msh REPL — the interactive front end.
//!
//! Wraps the kernel's [`Shell`] in a read–eval loop:
//! - rustyline line editing when stdin is a terminal (prompt `msh> `)
//! - plain buffered reads for piped input and script files
//! - Ctrl-D (or `exit`) leaves the loop; Ctrl-C at the prompt just redraws
//!
//! Job-control signals are live for the whole session: a foreground child
//! gets Ctrl-C / Ctrl-Z forwarded by the kernel's handlers while the REPL
//! itself is suspended in the foreground wait.

use std::io::BufRead;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use msh_kernel::{EvalOutcome, Shell, ShellConfig};

/// Prompt shown while reading interactively.
const PROMPT: &str = "msh> ";

/// REPL state: the shell core plus the line editor's lifetime.
pub struct Repl {
    shell: Shell,
}

impl Repl {
    /// Create a REPL and activate job-control signal handling.
    pub fn new(config: ShellConfig) -> Result<Self> {
        let shell = Shell::new(config);
        shell
            .install_signal_handlers()
            .context("failed to install signal handlers")?;
        Ok(Self { shell })
    }

    /// Interactive loop with line editing.
    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().context("failed to initialize line editor")?;

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let _ = editor.add_history_entry(&line);
                    if self.shell.evaluate(&line) == EvalOutcome::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C with no foreground job: redraw the prompt.
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("failed to read input"),
            }
        }

        self.shell.shutdown();
        Ok(())
    }

    /// Non-interactive loop: evaluate each line from `reader` in order.
    ///
    /// Used for piped stdin and script files. Stops at `exit` or EOF, then
    /// drains background jobs like the interactive loop does.
    pub fn run_reader(&mut self, reader: impl BufRead) -> Result<()> {
        for line in reader.lines() {
            let line = line.context("failed to read input line")?;
            if self.shell.evaluate(&line) == EvalOutcome::Exit {
                break;
            }
        }
        self.shell.shutdown();
        Ok(())
    }

    /// Evaluate a single command string (`msh -c`), then shut down.
    pub fn run_command(&mut self, command: &str) -> Result<()> {
        self.shell.evaluate(command);
        self.shell.shutdown();
        Ok(())
    }
}
