use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use crate::application::ports::{JobRepository, ProgressNotifier, RepositoryError};
use crate::domain::{Job, JobEvent, JobId, OwnerId, Question};

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// How long to wait for the push channel to produce its first event
    /// before switching to polling.
    pub establish_timeout: Duration,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            establish_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 30,
        }
    }
}

/// Where a watched job ended up, from the client's point of view.
///
/// `CheckBackLater` means both the push channel and the polling budget were
/// exhausted; the job itself keeps running server-side.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    Completed(Vec<Question>),
    Failed(String),
    CheckBackLater,
}

/// Follows one job to a terminal state: push channel first, polling the
/// store as fallback. The in-process counterpart of the browser-side
/// EventSource-with-polling-fallback client.
pub struct JobWatcher {
    repository: Arc<dyn JobRepository>,
    notifier: Arc<dyn ProgressNotifier>,
    config: WatchConfig,
}

impl JobWatcher {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        notifier: Arc<dyn ProgressNotifier>,
        config: WatchConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            config,
        }
    }

    pub async fn watch(&self, job_id: JobId, owner: OwnerId) -> Result<WatchOutcome, WatchError> {
        let job = self
            .repository
            .get_for_owner(job_id, owner)
            .await?
            .ok_or(WatchError::NotFound)?;
        if job.status.is_terminal() {
            return Ok(outcome_from_job(job));
        }

        if let Some(outcome) = self.watch_push_channel(job_id).await {
            return Ok(outcome);
        }

        tracing::debug!(job_id = %job_id.as_uuid(), "Push channel unavailable, polling");
        self.poll(job_id, owner).await
    }

    /// None when the channel never established or went away before the
    /// terminal event; the caller falls back to polling either way.
    async fn watch_push_channel(&self, job_id: JobId) -> Option<WatchOutcome> {
        let mut subscription = self.notifier.subscribe(job_id)?;

        let first = tokio::time::timeout(
            self.config.establish_timeout,
            subscription.events.next(),
        )
        .await;
        let mut event = match first {
            Ok(Some(ev)) => ev,
            Ok(None) | Err(_) => return None,
        };

        loop {
            if let Some(outcome) = outcome_from_event(event) {
                return Some(outcome);
            }
            event = subscription.events.next().await?;
        }
    }

    async fn poll(&self, job_id: JobId, owner: OwnerId) -> Result<WatchOutcome, WatchError> {
        for attempt in 0..self.config.max_poll_attempts {
            let job = self
                .repository
                .get_for_owner(job_id, owner)
                .await?
                .ok_or(WatchError::NotFound)?;
            if job.status.is_terminal() {
                return Ok(outcome_from_job(job));
            }
            if attempt + 1 < self.config.max_poll_attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
        Ok(WatchOutcome::CheckBackLater)
    }
}

fn outcome_from_job(job: Job) -> WatchOutcome {
    match (job.result, job.error_message) {
        (Some(questions), _) => WatchOutcome::Completed(questions),
        (None, Some(message)) => WatchOutcome::Failed(message),
        (None, None) => WatchOutcome::Failed("Job ended without a result".to_string()),
    }
}

fn outcome_from_event(event: JobEvent) -> Option<WatchOutcome> {
    match event {
        JobEvent::Complete { questions } => Some(WatchOutcome::Completed(questions)),
        JobEvent::Failed { message } => Some(WatchOutcome::Failed(message)),
        JobEvent::Progress { .. } => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("job not found")]
    NotFound,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
