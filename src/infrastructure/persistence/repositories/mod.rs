mod memory_job_repository;
mod pg_job_repository;

pub use memory_job_repository::MemoryJobRepository;
pub use pg_job_repository::PgJobRepository;
