mod pg_pool;
pub mod repositories;

pub use pg_pool::create_pg_pool;
pub use repositories::{MemoryJobRepository, PgJobRepository};
