//! End-to-end properties of the extraction pipeline on whole completions.

use serde_json::Value;
use shared::dto::Question;
use shared::extract::{extract_outcome, extract_questions, ParseOutcome, PLACEHOLDER_TEXT};
use shared::json_repair::strip_fences;

/// A syntactically clean completion must extract exactly what a strict
/// parse of the same document yields; the repair stages are no-ops on it.
#[test]
fn repair_is_idempotent_on_valid_json() {
    let raw = r#"{
        "technicalQuestions": [
            {"question": "What is ownership?", "answer": "Compile-time memory management."},
            {"question": "What is a trait?", "answer": null}
        ],
        "behavioralQuestions": [
            {"question": "Describe a conflict you resolved.", "answer": "STAR format."}
        ]
    }"#;

    let strict: Value = serde_json::from_str(raw).unwrap();
    let set = extract_questions(raw);

    let strict_technical: Vec<&str> = strict["technicalQuestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["question"].as_str().unwrap())
        .collect();
    let extracted_technical: Vec<&str> =
        set.technical.iter().map(|q| q.question.as_str()).collect();

    assert_eq!(extracted_technical, strict_technical);
    assert_eq!(set.technical[1].answer, None);
    assert_eq!(set.behavioral.len(), 1);
}

#[test]
fn language_tag_does_not_change_fence_stripping() {
    let body = "{\"technicalQuestions\": [], \"behavioralQuestions\": []}";
    assert_eq!(
        strip_fences(&format!("```json\n{body}\n```")),
        strip_fences(&format!("```\n{body}\n```"))
    );
}

#[test]
fn comment_markers_inside_literals_survive_extraction() {
    let raw = r#"{"technicalQuestions":[{"question":"Explain // and /* */ in C","answer":null}],"behavioralQuestions":[]}"#;
    let set = extract_questions(raw);
    assert_eq!(set.technical[0].question, "Explain // and /* */ in C");
}

#[test]
fn truncated_completion_recovers_finished_entries_without_raising() {
    let raw = "{\"technicalQuestions\":[{\"question\":\"Q1\",\"answer\":\"A1\"},{\"question\":\"Q2\"";
    let outcome = extract_outcome(raw, 5, 3);
    assert!(matches!(outcome, ParseOutcome::Partial(_)));
    let set = outcome.into_questions();
    assert_eq!(set.technical[0], Question::new("Q1", Some("A1".into())));
}

#[test]
fn fenced_completion_with_prose_on_both_sides() {
    let raw = "Here is the JSON:\n```json\n{\"technicalQuestions\":[{\"question\":\"What is a thread?\",\"answer\":null}],\"behavioralQuestions\":[]}\n```\nHope that helps!";
    let set = extract_questions(raw);
    assert_eq!(set.technical, vec![Question::new("What is a thread?", None)]);
    assert!(set.behavioral.is_empty());
}

#[test]
fn stray_backslash_in_answer_keeps_its_meaning() {
    let raw = r#"{"technicalQuestions":[{"question":"Q","answer":"Use \String class"}],"behavioralQuestions":[]}"#;
    let set = extract_questions(raw);
    assert_eq!(set.technical[0].answer.as_deref(), Some(r"Use \String class"));
}

#[test]
fn refusal_text_degrades_to_one_placeholder_per_category() {
    let set = extract_questions("I cannot help with that.");
    assert_eq!(set.technical.len(), 1);
    assert_eq!(set.behavioral.len(), 1);
    assert_eq!(set.technical[0].question, PLACEHOLDER_TEXT);
    assert_eq!(set.behavioral[0].question, PLACEHOLDER_TEXT);
}
