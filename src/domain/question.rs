use serde::{Deserialize, Serialize};

/// A structured math question extracted from an exam document.
///
/// Question text and answers are LaTeX-capable plain strings; classification
/// fields are closed enums validated at the extraction boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub solution_steps: Vec<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    Essay,
    Calculation,
    FillBlank,
    TrueFalse,
}

/// Difficulty bands used in Vietnamese math exams: recognition (NB),
/// comprehension (TH), application (VD), advanced application (VDC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    NB,
    TH,
    VD,
    VDC,
}
