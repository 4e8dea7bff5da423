//! Job identification and state types.

/// Shell-local identifier for an occupied job table slot.
///
/// Job ids are small positive integers assigned as `slot index + 1` when a
/// job is inserted, and are stable for the job's lifetime. An id is reused
/// once its slot is freed, so callers must not cache one across a
/// remove/insert boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub i32);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a job.
///
/// A job moves between the two running classes and `Suspended` any number
/// of times; removal from the table ends its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// The shell is waiting on this job; it owns the user's attention.
    Foreground,
    /// Running detached; completion is reported asynchronously.
    Background,
    /// Stopped by a signal, resumable with a continue signal.
    Suspended,
}

impl JobState {
    /// True for the two running classes.
    pub fn is_running(self) -> bool {
        !matches!(self, JobState::Suspended)
    }

    /// User-facing label, matching traditional `jobs` output.
    pub fn label(self) -> &'static str {
        match self {
            JobState::Foreground | JobState::Background => "Running",
            JobState::Suspended => "Stopped",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only snapshot of an occupied job slot, for listing.
#[derive(Debug, Clone)]
pub struct JobInfo {
    /// Job id (slot index + 1).
    pub id: JobId,
    /// OS process id.
    pub pid: i32,
    /// State at snapshot time.
    pub state: JobState,
    /// The command text that launched the job.
    pub command: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_states_share_a_label() {
        assert_eq!(JobState::Foreground.label(), "Running");
        assert_eq!(JobState::Background.label(), "Running");
        assert_eq!(JobState::Suspended.label(), "Stopped");
    }

    #[test]
    fn job_id_displays_bare_number() {
        assert_eq!(JobId(3).to_string(), "3");
    }
}
