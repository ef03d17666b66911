mod job;
mod job_event;
mod job_status;
mod owner;
mod question;
mod upload;

pub use job::{Job, JobId};
pub use job_event::JobEvent;
pub use job_status::JobStatus;
pub use owner::OwnerId;
pub use question::{Difficulty, Question, QuestionType};
pub use upload::{Upload, UploadKind};
