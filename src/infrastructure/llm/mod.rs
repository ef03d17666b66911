mod mock_extractor;
mod openai_extractor;
mod response;

pub use mock_extractor::{GatedExtractor, MockExtractor, MockFailingExtractor, sample_questions};
pub use openai_extractor::OpenAiExtractor;
pub use response::parse_question_payload;
