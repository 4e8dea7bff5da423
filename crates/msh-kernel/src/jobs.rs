//! The job table — a fixed-capacity registry of live child processes.
//!
//! Each slot either holds one [`Job`] or is free; a job's id is its slot
//! index + 1, stable while the slot stays occupied and reused after it is
//! freed. The table performs no synchronization of its own: every caller
//! goes through the blocking discipline in [`crate::signals`], which keeps
//! the child-status handler from observing a half-updated slot.

use nix::unistd::Pid;

use msh_types::{JobError, JobId, JobInfo, JobState};

/// One launched process tracked by the shell.
///
/// The slot owns the command text for exactly the occupied lifetime; it is
/// dropped when the slot is cleared, never earlier.
#[derive(Debug, Clone)]
pub struct Job {
    /// OS process id (also the job's process group id).
    pub pid: Pid,
    /// Slot index + 1.
    pub job_id: JobId,
    /// Current lifecycle state.
    pub state: JobState,
    /// The running class to restore after a stop → continue cycle.
    resume_as: JobState,
    /// Source text of the command segment that produced this job.
    pub command: String,
}

impl Job {
    /// Snapshot for listing.
    pub fn info(&self) -> JobInfo {
        JobInfo {
            id: self.job_id,
            pid: self.pid.as_raw(),
            state: self.state,
            command: self.command.clone(),
        }
    }
}

/// Fixed-capacity, slot-ordered job registry.
#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Option<Job>>,
}

impl JobTable {
    /// Create an empty table with room for `capacity` jobs.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Register a new job in the first free slot, in index order.
    ///
    /// Fails with [`JobError::TableFull`] when every slot is occupied; the
    /// table is unchanged in that case.
    pub fn insert(
        &mut self,
        pid: Pid,
        state: JobState,
        command: &str,
    ) -> Result<JobId, JobError> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(JobError::TableFull {
                capacity: self.slots.len(),
            })?;

        let job_id = JobId(index as i32 + 1);
        let resume_as = if state.is_running() {
            state
        } else {
            JobState::Background
        };
        self.slots[index] = Some(Job {
            pid,
            job_id,
            state,
            resume_as,
            command: command.to_string(),
        });
        Ok(job_id)
    }

    /// Overwrite the state of the job with this pid.
    ///
    /// When the new state is a running class it also becomes the state the
    /// job resumes into after a stop. Returns false if the pid is unknown.
    pub fn set_state(&mut self, pid: Pid, state: JobState) -> bool {
        match self.get_mut(pid) {
            Some(job) => {
                job.state = state;
                if state.is_running() {
                    job.resume_as = state;
                }
                true
            }
            None => false,
        }
    }

    /// Restore a suspended job to the running class it last had.
    ///
    /// Returns the restored state, or `None` if the pid is unknown.
    pub fn resume(&mut self, pid: Pid) -> Option<JobState> {
        let job = self.get_mut(pid)?;
        job.state = job.resume_as;
        Some(job.state)
    }

    /// Free the slot occupied by this pid, dropping its command text.
    ///
    /// Returns false if the pid is unknown.
    pub fn remove(&mut self, pid: Pid) -> bool {
        match self
            .slots
            .iter()
            .position(|s| s.as_ref().map(|job| job.pid) == Some(pid))
        {
            Some(index) => {
                self.slots[index] = None;
                true
            }
            None => false,
        }
    }

    /// Look up the pid behind a job id.
    pub fn pid_by_job_id(&self, job_id: JobId) -> Option<Pid> {
        self.iter_occupied()
            .find(|job| job.job_id == job_id)
            .map(|job| job.pid)
    }

    /// Look up the job id behind a pid.
    pub fn job_id_by_pid(&self, pid: Pid) -> Option<JobId> {
        self.get(pid).map(|job| job.job_id)
    }

    /// Current state of the job with this pid.
    pub fn state_by_pid(&self, pid: Pid) -> Option<JobState> {
        self.get(pid).map(|job| job.state)
    }

    /// Borrow the job with this pid.
    pub fn get(&self, pid: Pid) -> Option<&Job> {
        self.iter_occupied().find(|job| job.pid == pid)
    }

    fn get_mut(&mut self, pid: Pid) -> Option<&mut Job> {
        self.slots
            .iter_mut()
            .filter_map(|s| s.as_mut())
            .find(|job| job.pid == pid)
    }

    /// Read-only traversal of occupied slots in slot order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = &Job> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    /// Snapshots of all occupied slots in slot order.
    pub fn jobs(&self) -> Vec<JobInfo> {
        self.iter_occupied().map(Job::info).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    #[test]
    fn insert_assigns_slot_order_ids() {
        let mut table = JobTable::new(4);
        let a = table.insert(pid(100), JobState::Foreground, "a").unwrap();
        let b = table.insert(pid(101), JobState::Background, "b").unwrap();
        assert_eq!(a, JobId(1));
        assert_eq!(b, JobId(2));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn insert_when_full_fails_without_side_effects() {
        let mut table = JobTable::new(2);
        table.insert(pid(1), JobState::Background, "one").unwrap();
        table.insert(pid(2), JobState::Background, "two").unwrap();

        let err = table.insert(pid(3), JobState::Background, "three");
        assert_eq!(err, Err(JobError::TableFull { capacity: 2 }));

        // B and C are untouched
        assert_eq!(table.len(), 2);
        assert_eq!(table.job_id_by_pid(pid(1)), Some(JobId(1)));
        assert_eq!(table.job_id_by_pid(pid(2)), Some(JobId(2)));
        assert_eq!(table.job_id_by_pid(pid(3)), None);
    }

    #[test]
    fn occupied_count_never_exceeds_capacity() {
        let mut table = JobTable::new(3);
        for round in 0..5 {
            for n in 0..4 {
                let _ = table.insert(pid(round * 10 + n), JobState::Background, "x");
            }
            assert!(table.len() <= table.capacity());
            for n in 0..4 {
                table.remove(pid(round * 10 + n));
            }
        }
        assert!(table.is_empty());
    }

    #[test]
    fn job_ids_are_unique_among_occupied_slots() {
        let mut table = JobTable::new(8);
        for n in 0..8 {
            table.insert(pid(n), JobState::Background, "x").unwrap();
        }
        let mut ids: Vec<i32> = table.iter_occupied().map(|j| j.job_id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn freed_slot_reuses_its_job_id() {
        let mut table = JobTable::new(4);
        table.insert(pid(10), JobState::Background, "a").unwrap();
        table.insert(pid(11), JobState::Background, "b").unwrap();

        assert!(table.remove(pid(10)));
        // Next insert lands in the freed first slot and takes its id.
        let id = table.insert(pid(12), JobState::Background, "c").unwrap();
        assert_eq!(id, JobId(1));
    }

    #[test]
    fn remove_unknown_pid_returns_false() {
        let mut table = JobTable::new(2);
        assert!(!table.remove(pid(99)));
        table.insert(pid(1), JobState::Foreground, "a").unwrap();
        assert!(table.remove(pid(1)));
        // A job is never removed twice under the same identity.
        assert!(!table.remove(pid(1)));
    }

    #[test]
    fn set_state_overwrites_state_only() {
        let mut table = JobTable::new(2);
        table.insert(pid(5), JobState::Foreground, "sleep 10").unwrap();

        assert!(table.set_state(pid(5), JobState::Suspended));
        let job = table.get(pid(5)).unwrap();
        assert_eq!(job.state, JobState::Suspended);
        assert_eq!(job.job_id, JobId(1));
        assert_eq!(job.command, "sleep 10");

        assert!(!table.set_state(pid(6), JobState::Suspended));
    }

    #[test]
    fn resume_restores_prior_running_class() {
        let mut table = JobTable::new(2);
        table.insert(pid(7), JobState::Background, "sleep 60").unwrap();

        table.set_state(pid(7), JobState::Suspended);
        assert_eq!(table.resume(pid(7)), Some(JobState::Background));

        // A foreground job round-trips to foreground.
        table.insert(pid(8), JobState::Foreground, "vi").unwrap();
        table.set_state(pid(8), JobState::Suspended);
        assert_eq!(table.resume(pid(8)), Some(JobState::Foreground));
    }

    #[test]
    fn bg_then_stop_then_resume_stays_background() {
        let mut table = JobTable::new(2);
        table.insert(pid(9), JobState::Foreground, "job").unwrap();
        // Moved to background by the bg builtin, then stopped, then continued.
        table.set_state(pid(9), JobState::Background);
        table.set_state(pid(9), JobState::Suspended);
        assert_eq!(table.resume(pid(9)), Some(JobState::Background));
    }

    #[test]
    fn lookups_cross_reference_pid_and_job_id() {
        let mut table = JobTable::new(4);
        table.insert(pid(21), JobState::Background, "a").unwrap();
        table.insert(pid(22), JobState::Background, "b").unwrap();

        assert_eq!(table.pid_by_job_id(JobId(2)), Some(pid(22)));
        assert_eq!(table.job_id_by_pid(pid(21)), Some(JobId(1)));
        assert_eq!(table.pid_by_job_id(JobId(3)), None);
        assert_eq!(table.job_id_by_pid(pid(23)), None);
    }

    #[test]
    fn jobs_snapshot_preserves_slot_order() {
        let mut table = JobTable::new(4);
        table.insert(pid(31), JobState::Background, "first").unwrap();
        table.insert(pid(32), JobState::Suspended, "second").unwrap();

        let infos = table.jobs();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].pid, 31);
        assert_eq!(infos[0].state, JobState::Background);
        assert_eq!(infos[1].pid, 32);
        assert_eq!(infos[1].command, "second");
    }
}
