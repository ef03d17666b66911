use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::domain::{Question, Upload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    pub speed: SpeedHint,
    pub use_vision: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedHint {
    Fast,
    #[default]
    Balanced,
    Quality,
}

impl FromStr for SpeedHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "quality" => Ok(Self::Quality),
            other => Err(format!("Invalid speed hint: {}", other)),
        }
    }
}

impl fmt::Display for SpeedHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Quality => "quality",
        };
        write!(f, "{}", s)
    }
}

/// External service converting document content into structured questions.
///
/// A single call per job: either the full question list comes back or the
/// job fails wholesale. Never retried automatically.
#[async_trait]
pub trait QuestionExtractor: Send + Sync {
    async fn extract(
        &self,
        data: &[u8],
        upload: &Upload,
        options: &ExtractOptions,
    ) -> Result<Vec<Question>, ExtractorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("unsupported content: {0}")]
    UnsupportedContent(String),
}
