use async_trait::async_trait;

use crate::domain::{Job, JobId, OwnerId, Question};

use super::RepositoryError;

#[derive(Debug, Clone)]
pub struct JobPage {
    pub items: Vec<Job>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Durable store of parse jobs.
///
/// Write methods are operation-shaped rather than a generic status update so
/// the terminal invariants (result iff completed, error iff failed, no writes
/// after a terminal state, non-decreasing progress) are enforced in one place.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// Ownership-checked read: an existing job owned by someone else is
    /// indistinguishable from an absent one.
    async fn get_for_owner(&self, id: JobId, owner: OwnerId)
        -> Result<Option<Job>, RepositoryError>;

    async fn mark_processing(&self, id: JobId) -> Result<(), RepositoryError>;

    async fn update_progress(
        &self,
        id: JobId,
        percent: u8,
        message: &str,
    ) -> Result<(), RepositoryError>;

    async fn complete(&self, id: JobId, result: &[Question]) -> Result<(), RepositoryError>;

    async fn fail(&self, id: JobId, error_message: &str) -> Result<(), RepositoryError>;

    async fn list_for_owner(
        &self,
        owner: OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<JobPage, RepositoryError>;

    /// Returns true when a job was deleted, false when nothing matched.
    async fn delete(&self, id: JobId, owner: OwnerId) -> Result<bool, RepositoryError>;
}
