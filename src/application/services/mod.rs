mod job_watcher;
mod parse_service;
mod parse_worker;

pub use job_watcher::{JobWatcher, WatchConfig, WatchError, WatchOutcome};
pub use parse_service::{ParseService, StatusError, SubmitError};
pub use parse_worker::{ParseMessage, ParseWorker, ParseWorkerError};
