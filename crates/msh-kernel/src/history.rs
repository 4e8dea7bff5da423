//! Bounded command history with file persistence.
//!
//! Stores up to `max_history` input lines, evicting the oldest when full.
//! Entries are addressed by 1-based ordinal (the `history` listing and the
//! `!N` recall builtin). The store loads from its file at startup and is
//! written back at shutdown.

use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default history file name, placed in the user's home directory.
pub const HISTORY_FILE_NAME: &str = ".msh_history";

/// Bounded, ordinal-addressed line store.
#[derive(Debug)]
pub struct History {
    lines: VecDeque<String>,
    max_history: usize,
}

impl History {
    /// Create an empty history holding up to `max_history` lines.
    pub fn new(max_history: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Create a history pre-populated from `path`, ignoring a missing file.
    pub fn load(max_history: usize, path: &Path) -> Self {
        let mut history = Self::new(max_history);
        if let Ok(contents) = fs::read_to_string(path) {
            for line in contents.lines() {
                history.add(line);
            }
        }
        history
    }

    /// Append one line, evicting the oldest entry when at capacity.
    ///
    /// Blank lines are not recorded.
    pub fn add(&mut self, line: &str) {
        let line = line.trim_end_matches('\n');
        if line.trim().is_empty() {
            return;
        }
        if self.lines.len() == self.max_history {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    /// The line at 1-based ordinal `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return None;
        }
        self.lines.get(index - 1).map(String::as_str)
    }

    /// Number of stored lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate stored lines oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Write all stored lines to `path`, one per line.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = fs::File::create(path)
            .with_context(|| format!("failed to open history file {}", path.display()))?;
        for line in &self.lines {
            writeln!(file, "{line}")
                .with_context(|| format!("failed to write history file {}", path.display()))?;
        }
        Ok(())
    }
}

/// Default location for the history file: `~/.msh_history`.
pub fn default_history_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(HISTORY_FILE_NAME))
}
