use serde::{Deserialize, Serialize};

/// Parameters of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub role: String,
    pub topic: String,
    pub difficulty: String,
    #[serde(rename = "includeAnswers", default)]
    pub include_answers: bool,
}

/// A single recovered question. The answer is `None` when the caller did
/// not ask for answers or the model emitted JSON null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub answer: Option<String>,
}

impl Question {
    pub fn new(question: impl Into<String>, answer: Option<String>) -> Self {
        Self {
            question: question.into(),
            answer,
        }
    }
}

/// The two question sequences recovered from a completion, in source order.
/// Both sequences are always present; "nothing recovered" is an empty list,
/// never a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    #[serde(rename = "technicalQuestions")]
    pub technical: Vec<Question>,
    #[serde(rename = "behavioralQuestions")]
    pub behavioral: Vec<Question>,
}
