//! Core error taxonomy.

use thiserror::Error;

use crate::job::JobId;

/// Errors from job table and job control operations.
///
/// All of these are recoverable: they surface as a user message and leave
/// the job table in a consistent state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Every slot is occupied; the insert had no side effects.
    #[error("job table full ({capacity} jobs)")]
    TableFull { capacity: usize },

    /// No occupied slot carries this job id.
    #[error("{0}: no such job")]
    NoSuchJob(JobId),

    /// No occupied slot carries this pid.
    #[error("({0}): no such process")]
    NoSuchProcess(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_full_names_capacity() {
        let err = JobError::TableFull { capacity: 16 };
        assert_eq!(err.to_string(), "job table full (16 jobs)");
    }

    #[test]
    fn not_found_messages_match_bgfg_conventions() {
        assert_eq!(JobError::NoSuchJob(JobId(4)).to_string(), "4: no such job");
        assert_eq!(
            JobError::NoSuchProcess(1234).to_string(),
            "(1234): no such process"
        );
    }
}
