use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::application::ports::{JobPage, JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, OwnerId, Question};

/// In-memory job store for tests and scaffold mode.
///
/// Enforces the same invariants as the Postgres store: terminal records are
/// never rewritten and progress never decreases.
pub struct MemoryJobRepository {
    jobs: DashMap<JobId, Job>,
}

impl MemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    fn with_job<F>(&self, id: JobId, mutate: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut Job),
    {
        let mut entry = self
            .jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_uuid().to_string()))?;
        if entry.status.is_terminal() {
            return Ok(());
        }
        mutate(&mut entry);
        entry.updated_at = Utc::now();
        Ok(())
    }
}

impl Default for MemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobRepository for MemoryJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        if self.jobs.contains_key(&job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate job id: {}",
                job.id.as_uuid()
            )));
        }
        self.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.get(&id).map(|j| j.clone()))
    }

    async fn get_for_owner(
        &self,
        id: JobId,
        owner: OwnerId,
    ) -> Result<Option<Job>, RepositoryError> {
        Ok(self
            .jobs
            .get(&id)
            .filter(|j| j.owner == owner)
            .map(|j| j.clone()))
    }

    async fn mark_processing(&self, id: JobId) -> Result<(), RepositoryError> {
        self.with_job(id, |job| {
            job.status = JobStatus::Processing;
        })
    }

    async fn update_progress(
        &self,
        id: JobId,
        percent: u8,
        message: &str,
    ) -> Result<(), RepositoryError> {
        self.with_job(id, |job| {
            job.progress_percent = job.progress_percent.max(percent.min(100));
            job.progress_message = Some(message.to_string());
        })
    }

    async fn complete(&self, id: JobId, result: &[Question]) -> Result<(), RepositoryError> {
        self.with_job(id, |job| {
            job.status = JobStatus::Completed;
            job.progress_percent = 100;
            job.result = Some(result.to_vec());
            job.error_message = None;
        })
    }

    async fn fail(&self, id: JobId, error_message: &str) -> Result<(), RepositoryError> {
        self.with_job(id, |job| {
            job.status = JobStatus::Failed;
            job.error_message = Some(error_message.to_string());
            job.result = None;
        })
    }

    async fn list_for_owner(
        &self,
        owner: OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<JobPage, RepositoryError> {
        let mut items: Vec<Job> = self
            .jobs
            .iter()
            .filter(|j| j.owner == owner)
            .map(|j| j.clone())
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = items.len() as u64;
        let page = page.max(1);
        let offset = ((page - 1) * page_size) as usize;
        let items = items
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        Ok(JobPage {
            items,
            total,
            page,
            page_size,
        })
    }

    async fn delete(&self, id: JobId, owner: OwnerId) -> Result<bool, RepositoryError> {
        Ok(self
            .jobs
            .remove_if(&id, |_, job| job.owner == owner)
            .is_some())
    }
}
