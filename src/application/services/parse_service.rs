use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::{
    ExtractOptions, JobPage, JobRepository, ProgressNotifier, RepositoryError,
};
use crate::domain::{Job, JobId, OwnerId, Upload, UploadKind};

use super::ParseMessage;

/// Front door of the job lifecycle: validates uploads, creates jobs and hands
/// them to the worker. Never blocks on extraction; `submit` returns as soon
/// as the job record exists.
pub struct ParseService {
    repository: Arc<dyn JobRepository>,
    notifier: Arc<dyn ProgressNotifier>,
    sender: mpsc::Sender<ParseMessage>,
    max_upload_bytes: u64,
}

impl ParseService {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        notifier: Arc<dyn ProgressNotifier>,
        sender: mpsc::Sender<ParseMessage>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            repository,
            notifier,
            sender,
            max_upload_bytes,
        }
    }

    /// Validates the upload and creates a `pending` job. Validation failures
    /// reject the request synchronously; no job is created for them.
    #[tracing::instrument(skip(self, data), fields(filename = %filename, bytes = data.len()))]
    pub async fn submit(
        &self,
        filename: String,
        data: Vec<u8>,
        owner: OwnerId,
        options: ExtractOptions,
    ) -> Result<JobId, SubmitError> {
        let kind = UploadKind::from_filename(&filename)
            .ok_or_else(|| SubmitError::UnsupportedType(filename.clone()))?;

        if data.is_empty() {
            return Err(SubmitError::EmptyFile);
        }
        if data.len() as u64 > self.max_upload_bytes {
            return Err(SubmitError::FileTooLarge {
                size_bytes: data.len() as u64,
                limit_bytes: self.max_upload_bytes,
            });
        }

        let upload = Upload::new(filename, kind, data.len() as u64);
        let job = Job::new(owner, upload.filename.clone());
        let job_id = job.id;

        self.repository.create(&job).await?;
        self.notifier.register(job_id);

        let msg = ParseMessage {
            job_id,
            upload,
            data,
            options,
        };
        if self.sender.send(msg).await.is_err() {
            // The job row exists but nothing will ever run it; close it out
            // so clients see a terminal state instead of eternal `pending`.
            if let Err(e) = self.repository.fail(job_id, "Parse worker unavailable").await {
                tracing::error!(error = %e, job_id = %job_id.as_uuid(), "Failed to close orphaned job");
            }
            return Err(SubmitError::QueueClosed);
        }

        tracing::info!(job_id = %job_id.as_uuid(), "Parse job enqueued");
        Ok(job_id)
    }

    pub async fn get_status(&self, id: JobId, owner: OwnerId) -> Result<Job, StatusError> {
        self.repository
            .get_for_owner(id, owner)
            .await?
            .ok_or(StatusError::NotFound)
    }

    pub async fn history(
        &self,
        owner: OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<JobPage, RepositoryError> {
        self.repository.list_for_owner(owner, page, page_size).await
    }

    pub async fn delete(&self, id: JobId, owner: OwnerId) -> Result<(), StatusError> {
        if self.repository.delete(id, owner).await? {
            Ok(())
        } else {
            Err(StatusError::NotFound)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("empty file")]
    EmptyFile,
    #[error("file too large: {size_bytes} bytes (limit {limit_bytes})")]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("parse worker unavailable")]
    QueueClosed,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("job not found")]
    NotFound,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
