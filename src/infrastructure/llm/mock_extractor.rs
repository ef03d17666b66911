use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::application::ports::{ExtractOptions, ExtractorError, QuestionExtractor};
use crate::domain::{Difficulty, Question, QuestionType, Upload};

pub fn sample_questions(count: usize) -> Vec<Question> {
    (1..=count)
        .map(|i| Question {
            text: format!("Solve for x: 2x + {} = {}", i, i * 3),
            kind: QuestionType::Calculation,
            topic: Some("algebra".to_string()),
            difficulty: Some(Difficulty::TH),
            answer: Some(format!("x = {}", i)),
            solution_steps: vec![
                format!("2x = {}", i * 2),
                format!("x = {}", i),
            ],
            order: i as u32,
        })
        .collect()
}

pub struct MockExtractor {
    questions: Vec<Question>,
}

impl MockExtractor {
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionExtractor for MockExtractor {
    async fn extract(
        &self,
        _data: &[u8],
        _upload: &Upload,
        _options: &ExtractOptions,
    ) -> Result<Vec<Question>, ExtractorError> {
        Ok(self.questions.clone())
    }
}

pub struct MockFailingExtractor {
    message: String,
}

impl MockFailingExtractor {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl QuestionExtractor for MockFailingExtractor {
    async fn extract(
        &self,
        _data: &[u8],
        _upload: &Upload,
        _options: &ExtractOptions,
    ) -> Result<Vec<Question>, ExtractorError> {
        Err(ExtractorError::InvalidResponse(self.message.clone()))
    }
}

/// Extractor that blocks until released, for exercising the non-blocking
/// submit contract and in-flight subscriptions.
pub struct GatedExtractor {
    questions: Vec<Question>,
    gate: Arc<Notify>,
}

impl GatedExtractor {
    pub fn new(questions: Vec<Question>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                questions,
                gate: Arc::clone(&gate),
            },
            gate,
        )
    }
}

#[async_trait]
impl QuestionExtractor for GatedExtractor {
    async fn extract(
        &self,
        _data: &[u8],
        _upload: &Upload,
        _options: &ExtractOptions,
    ) -> Result<Vec<Question>, ExtractorError> {
        self.gate.notified().await;
        Ok(self.questions.clone())
    }
}
