mod auth_token;
mod delete_job;
mod health;
mod history;
mod job_status;
mod parse;
mod stream;

pub use auth_token::issue_token_handler;
pub use delete_job::delete_job_handler;
pub use health::health_handler;
pub use history::history_handler;
pub use job_status::{JobStatusResponse, job_status_handler};
pub use parse::parse_handler;
pub use stream::stream_handler;
