mod authenticator;
mod job_repository;
mod progress_notifier;
mod question_extractor;
mod repository_error;

pub use authenticator::{AuthError, Authenticator, IssuedToken};
pub use job_repository::{JobPage, JobRepository};
pub use progress_notifier::{EventStream, ProgressNotifier, Subscription};
pub use question_extractor::{ExtractOptions, ExtractorError, QuestionExtractor, SpeedHint};
pub use repository_error::RepositoryError;
