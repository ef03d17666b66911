use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{JobStatus, OwnerId, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

/// One asynchronous parse task tied to an uploaded exam document.
///
/// Mutated only by the worker executing it; `result` is set iff the job
/// completed, `error_message` iff it failed.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub owner: OwnerId,
    pub filename: String,
    pub status: JobStatus,
    pub progress_percent: u8,
    pub progress_message: Option<String>,
    pub result: Option<Vec<Question>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(owner: OwnerId, filename: String) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            owner,
            filename,
            status: JobStatus::Pending,
            progress_percent: 0,
            progress_message: None,
            result: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
