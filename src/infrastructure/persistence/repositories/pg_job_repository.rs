use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobPage, JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, OwnerId, Question};

const TERMINAL_GUARD: &str = "status NOT IN ('completed', 'failed')";

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_job(row: &PgRow) -> Result<Job, RepositoryError> {
    let status: String = read(row, "status")?;
    let status = status
        .parse::<JobStatus>()
        .map_err(RepositoryError::QueryFailed)?;

    let result_json: Option<String> = read(row, "result_json")?;
    let result = match result_json {
        Some(json) => Some(
            serde_json::from_str::<Vec<Question>>(&json)
                .map_err(|e| RepositoryError::QueryFailed(format!("corrupt result_json: {}", e)))?,
        ),
        None => None,
    };

    let progress: i32 = read(row, "progress_percent")?;

    Ok(Job {
        id: JobId::from_uuid(read::<Uuid>(row, "id")?),
        owner: OwnerId::from_uuid(read::<Uuid>(row, "owner_id")?),
        filename: read(row, "filename")?,
        status,
        progress_percent: progress.clamp(0, 100) as u8,
        progress_message: read(row, "progress_message")?,
        result,
        error_message: read(row, "error_message")?,
        created_at: read::<DateTime<Utc>>(row, "created_at")?,
        updated_at: read::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn read<'r, T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>>(
    row: &'r PgRow,
    column: &str,
) -> Result<T, RepositoryError> {
    row.try_get(column)
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id.as_uuid()))]
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, owner_id, filename, status, progress_percent,
                              progress_message, result_json, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.owner.as_uuid())
        .bind(&job.filename)
        .bind(job.status.as_str())
        .bind(job.progress_percent as i32)
        .bind(&job.progress_message)
        .bind(None::<String>)
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn get(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_job).transpose()
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn get_for_owner(
        &self,
        id: JobId,
        owner: OwnerId,
    ) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_job).transpose()
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn mark_processing(&self, id: JobId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE jobs SET status = 'processing', updated_at = $2 \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, message), fields(job_id = %id.as_uuid(), percent))]
    async fn update_progress(
        &self,
        id: JobId,
        percent: u8,
        message: &str,
    ) -> Result<(), RepositoryError> {
        // GREATEST keeps stored progress monotonically non-decreasing even
        // if updates land out of order.
        let sql = format!(
            "UPDATE jobs SET progress_percent = GREATEST(progress_percent, $2), \
             progress_message = $3, updated_at = $4 WHERE id = $1 AND {TERMINAL_GUARD}"
        );
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(percent.min(100) as i32)
            .bind(message)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, result), fields(job_id = %id.as_uuid(), questions = result.len()))]
    async fn complete(&self, id: JobId, result: &[Question]) -> Result<(), RepositoryError> {
        let result_json = serde_json::to_string(result)
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let sql = format!(
            "UPDATE jobs SET status = 'completed', progress_percent = 100, \
             result_json = $2, error_message = NULL, updated_at = $3 \
             WHERE id = $1 AND {TERMINAL_GUARD}"
        );
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(result_json)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, error_message), fields(job_id = %id.as_uuid()))]
    async fn fail(&self, id: JobId, error_message: &str) -> Result<(), RepositoryError> {
        let sql = format!(
            "UPDATE jobs SET status = 'failed', error_message = $2, \
             result_json = NULL, updated_at = $3 WHERE id = $1 AND {TERMINAL_GUARD}"
        );
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(error_message)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(owner = %owner.as_uuid(), page, page_size))]
    async fn list_for_owner(
        &self,
        owner: OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<JobPage, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE owner_id = $1")
            .bind(owner.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let page = page.max(1);
        let offset = ((page - 1) * page_size) as i64;
        let rows = sqlx::query(
            "SELECT * FROM jobs WHERE owner_id = $1 \
             ORDER BY created_at DESC OFFSET $2 LIMIT $3",
        )
        .bind(owner.as_uuid())
        .bind(offset)
        .bind(page_size as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let items = rows
            .iter()
            .map(row_to_job)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(JobPage {
            items,
            total: total.max(0) as u64,
            page,
            page_size,
        })
    }

    #[instrument(skip(self), fields(job_id = %id.as_uuid()))]
    async fn delete(&self, id: JobId, owner: OwnerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
