use serde::Serialize;

use super::Question;

/// A single update on a job's progress channel.
///
/// `Complete` and `Failed` are terminal and mutually exclusive; exactly one
/// of them ends every job's event sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JobEvent {
    Progress { percent: u8, message: String },
    Complete { questions: Vec<Question> },
    Failed { message: String },
}

impl JobEvent {
    /// SSE event name this update is delivered under.
    pub fn name(&self) -> &'static str {
        match self {
            JobEvent::Progress { .. } => "progress",
            JobEvent::Complete { .. } => "complete",
            JobEvent::Failed { .. } => "error_event",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Complete { .. } | JobEvent::Failed { .. })
    }
}
