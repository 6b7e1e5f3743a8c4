//! Walks a repaired parse tree for the two question arrays and absorbs
//! every remaining failure mode, so callers always get a [`QuestionSet`].

use serde_json::Value;
use tracing::{error, warn};

use crate::dto::{Question, QuestionSet};
use crate::json_repair::{self, Repair};

/// Number of technical questions a complete completion carries.
pub const EXPECTED_TECHNICAL: usize = 5;
/// Number of behavioral questions a complete completion carries.
pub const EXPECTED_BEHAVIORAL: usize = 3;

/// Shown to the end user when the completion could not be parsed at all.
pub const PLACEHOLDER_TEXT: &str =
    "Error parsing response. The AI response may have been incomplete. Please try again.";

/// Which path the pipeline took to produce a question set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The completion parsed strictly after the lexical repairs.
    Success(QuestionSet),
    /// Bracket balancing ran, possibly degrading to an empty document.
    Partial(QuestionSet),
    /// Nothing could be parsed; the set holds placeholder questions.
    Failed(QuestionSet),
}

impl ParseOutcome {
    pub fn into_questions(self) -> QuestionSet {
        match self {
            ParseOutcome::Success(q) | ParseOutcome::Partial(q) | ParseOutcome::Failed(q) => q,
        }
    }
}

/// Extract questions from a raw completion using the default expected
/// counts. Never fails.
pub fn extract_questions(raw: &str) -> QuestionSet {
    extract_questions_with(raw, EXPECTED_TECHNICAL, EXPECTED_BEHAVIORAL)
}

/// Like [`extract_questions`] with explicit expected counts.
pub fn extract_questions_with(
    raw: &str,
    expected_technical: usize,
    expected_behavioral: usize,
) -> QuestionSet {
    extract_outcome(raw, expected_technical, expected_behavioral).into_questions()
}

/// Full extraction keeping the outcome tag, so callers and tests can tell
/// which recovery path ran.
pub fn extract_outcome(
    raw: &str,
    expected_technical: usize,
    expected_behavioral: usize,
) -> ParseOutcome {
    if raw.trim().is_empty() {
        warn!("empty model response; returning placeholder questions");
        return ParseOutcome::Failed(placeholder_set());
    }

    match json_repair::repair_and_parse(raw) {
        Ok((tree, repair)) => {
            let set = extract_fields(&tree, expected_technical, expected_behavioral);
            match repair {
                Repair::None => ParseOutcome::Success(set),
                Repair::Balanced | Repair::EmptyDocument => ParseOutcome::Partial(set),
            }
        }
        Err(e) => {
            let preview: String = raw.chars().take(1000).collect();
            error!("error parsing model response: {e}. raw (first 1000 chars): {preview}");
            ParseOutcome::Failed(placeholder_set())
        }
    }
}

fn placeholder_set() -> QuestionSet {
    QuestionSet {
        technical: vec![Question::new(PLACEHOLDER_TEXT, None)],
        behavioral: vec![Question::new(PLACEHOLDER_TEXT, None)],
    }
}

fn extract_fields(
    tree: &Value,
    expected_technical: usize,
    expected_behavioral: usize,
) -> QuestionSet {
    let technical = questions_in(tree, "technicalQuestions");
    let behavioral = questions_in(tree, "behavioralQuestions");

    if technical.len() < expected_technical || behavioral.len() < expected_behavioral {
        warn!(
            "incomplete response: {} technical, {} behavioral questions (expected {} and {})",
            technical.len(),
            behavioral.len(),
            expected_technical,
            expected_behavioral
        );
    }

    QuestionSet {
        technical,
        behavioral,
    }
}

fn questions_in(tree: &Value, field: &str) -> Vec<Question> {
    let Some(items) = tree.get(field).and_then(Value::as_array) else {
        warn!("no '{field}' array found in model response");
        return Vec::new();
    };
    items.iter().filter_map(question_from).collect()
}

fn question_from(node: &Value) -> Option<Question> {
    // entries without usable question text are dropped silently
    let question = match node.get("question") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    };
    if question.is_empty() {
        return None;
    }

    let answer = match node.get("answer") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    Some(Question { question, answer })
}
