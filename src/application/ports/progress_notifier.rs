use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::domain::{JobEvent, JobId};

pub type EventStream = BoxStream<'static, JobEvent>;

/// A live client's interest in one job's updates.
///
/// The stream yields events in emission order and ends after a terminal
/// event, or earlier if the publishing side goes away.
pub struct Subscription {
    pub job_id: JobId,
    pub started_at: DateTime<Utc>,
    pub events: EventStream,
}

/// Fan-out delivery of job state changes.
///
/// The job runner only ever calls `notify`; which transport carries the
/// event to a client is not its concern. Any number of subscribers may
/// watch the same job, each receiving the same sequence independently.
pub trait ProgressNotifier: Send + Sync {
    /// Open the channel for a job. Called once, at job creation.
    fn register(&self, job_id: JobId);

    fn notify(&self, job_id: JobId, event: JobEvent);

    /// None when no live channel exists for the job, either because the id
    /// is unknown or because the job already reached a terminal state;
    /// callers fall back to the stored snapshot.
    fn subscribe(&self, job_id: JobId) -> Option<Subscription>;
}
