use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{
    ExtractOptions, JobRepository, ProgressNotifier, QuestionExtractor, RepositoryError,
};
use crate::domain::{JobEvent, JobId, Upload};

pub struct ParseMessage {
    pub job_id: JobId,
    pub upload: Upload,
    pub data: Vec<u8>,
    pub options: ExtractOptions,
}

/// Drives jobs from `pending` to a terminal state.
///
/// One task is spawned per message, so concurrently submitted jobs run
/// independently; each job is enqueued exactly once, so no two runs ever
/// write the same record.
pub struct ParseWorker {
    receiver: mpsc::Receiver<ParseMessage>,
    runner: Arc<JobRun>,
}

struct JobRun {
    extractor: Arc<dyn QuestionExtractor>,
    repository: Arc<dyn JobRepository>,
    notifier: Arc<dyn ProgressNotifier>,
    extraction_timeout: Duration,
}

impl ParseWorker {
    pub fn new(
        receiver: mpsc::Receiver<ParseMessage>,
        extractor: Arc<dyn QuestionExtractor>,
        repository: Arc<dyn JobRepository>,
        notifier: Arc<dyn ProgressNotifier>,
        extraction_timeout: Duration,
    ) -> Self {
        Self {
            receiver,
            runner: Arc::new(JobRun {
                extractor,
                repository,
                notifier,
                extraction_timeout,
            }),
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Parse worker started");
        while let Some(msg) = self.receiver.recv().await {
            let span = tracing::info_span!(
                "parse_job",
                job_id = %msg.job_id.as_uuid(),
                filename = %msg.upload.filename,
            );
            let runner = Arc::clone(&self.runner);
            tokio::spawn(
                async move {
                    if let Err(e) = runner.process_job(msg).await {
                        tracing::error!(error = %e, "Parse job aborted");
                    }
                }
                .instrument(span),
            );
        }
        tracing::info!("Parse worker stopped: channel closed");
    }
}

impl JobRun {
    async fn process_job(&self, msg: ParseMessage) -> Result<(), ParseWorkerError> {
        let job_id = msg.job_id;

        self.repository
            .mark_processing(job_id)
            .await
            .map_err(ParseWorkerError::Repository)?;
        self.report_progress(job_id, 5, "Starting").await?;
        self.report_progress(job_id, 40, "Analyzing document").await?;

        let outcome = tokio::time::timeout(
            self.extraction_timeout,
            self.extractor.extract(&msg.data, &msg.upload, &msg.options),
        )
        .await;

        let result = match outcome {
            Err(_) => Err(format!(
                "Extraction timed out after {}s",
                self.extraction_timeout.as_secs()
            )),
            Ok(Err(e)) => Err(e.to_string()),
            Ok(Ok(questions)) if questions.is_empty() => {
                Err("No questions found in the document".to_string())
            }
            Ok(Ok(questions)) => Ok(questions),
        };

        // Exactly one terminal notification per job: each arm below emits
        // its event once and nothing runs after it.
        match result {
            Ok(questions) => {
                self.report_progress(
                    job_id,
                    90,
                    &format!("Found {} questions, saving", questions.len()),
                )
                .await?;
                self.repository
                    .complete(job_id, &questions)
                    .await
                    .map_err(ParseWorkerError::Repository)?;
                tracing::info!(questions = questions.len(), "Parse job completed");
                self.notifier.notify(job_id, JobEvent::Complete { questions });
            }
            Err(message) => {
                self.repository
                    .fail(job_id, &message)
                    .await
                    .map_err(ParseWorkerError::Repository)?;
                tracing::warn!(error = %message, "Parse job failed");
                self.notifier.notify(job_id, JobEvent::Failed { message });
            }
        }

        Ok(())
    }

    async fn report_progress(
        &self,
        job_id: JobId,
        percent: u8,
        message: &str,
    ) -> Result<(), ParseWorkerError> {
        tracing::debug!(percent, message, "Job progress");
        self.repository
            .update_progress(job_id, percent, message)
            .await
            .map_err(ParseWorkerError::Repository)?;
        self.notifier.notify(
            job_id,
            JobEvent::Progress {
                percent,
                message: message.to_string(),
            },
        );
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseWorkerError {
    #[error("repository: {0}")]
    Repository(RepositoryError),
}
