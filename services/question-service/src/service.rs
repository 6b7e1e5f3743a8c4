//! Orchestration of one generation run: prompt building, temperature
//! selection, the provider call, extraction, and the history append.

use std::sync::Arc;

use tracing::{error, info};

use shared::ai_client::AiProvider;
use shared::dto::{GenerateRequest, QuestionSet};
use shared::error::{AppError, Result};
use shared::extract;
use shared::history::HistoryStore;

const TEMPERATURE_EASY: f32 = 0.6;
const TEMPERATURE_MEDIUM: f32 = 0.7;
const TEMPERATURE_HARD: f32 = 0.8;

pub struct QuestionService {
    provider: Arc<dyn AiProvider>,
    history: Arc<HistoryStore>,
}

impl QuestionService {
    pub fn new(provider: Arc<dyn AiProvider>, history: Arc<HistoryStore>) -> Self {
        Self { provider, history }
    }

    /// Generate a question set for the request. Provider errors propagate;
    /// everything downstream of a successful completion cannot fail.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<QuestionSet> {
        let prompt = build_prompt(request);
        let temperature = temperature_for(&request.difficulty);
        info!("using AI provider: {}", self.provider.name());

        let response = self.provider.generate(&prompt, temperature).await?;
        if response.trim().is_empty() {
            error!("AI provider returned empty response");
            return Err(AppError::EmptyCompletion);
        }

        let questions = extract::extract_questions(&response);
        self.history.append(request, &questions).await;
        Ok(questions)
    }
}

/// Hotter sampling for harder questions; unknown levels get the middle.
pub fn temperature_for(difficulty: &str) -> f32 {
    match difficulty.to_ascii_lowercase().as_str() {
        "easy" => TEMPERATURE_EASY,
        "hard" => TEMPERATURE_HARD,
        _ => TEMPERATURE_MEDIUM,
    }
}

/// The instruction the model sees, including the exact JSON shape the
/// extraction pipeline expects back.
pub fn build_prompt(request: &GenerateRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str("Generate interview questions for the following specifications:\n\n");
    prompt.push_str(&format!("Job Role: {}\n", request.role));
    prompt.push_str(&format!("Topic: {}\n", request.topic));
    prompt.push_str(&format!("Difficulty Level: {}\n\n", request.difficulty));

    prompt.push_str("Please generate:\n");
    prompt.push_str(&format!(
        "- {} technical questions related to {}\n",
        extract::EXPECTED_TECHNICAL,
        request.topic
    ));
    prompt.push_str(&format!(
        "- {} behavioral questions relevant to {}\n\n",
        extract::EXPECTED_BEHAVIORAL,
        request.role
    ));

    if request.include_answers {
        prompt.push_str("Include sample answers for each question.\n\n");
    }

    prompt.push_str("Format your response as a JSON object with this exact structure:\n");
    prompt.push_str("{\n");
    prompt.push_str("  \"technicalQuestions\": [\n");
    prompt.push_str("    {\"question\": \"...\", \"answer\": \"...\"},\n");
    prompt.push_str("    ...\n");
    prompt.push_str("  ],\n");
    prompt.push_str("  \"behavioralQuestions\": [\n");
    prompt.push_str("    {\"question\": \"...\", \"answer\": \"...\"}\n");
    prompt.push_str("    ...\n");
    prompt.push_str("  ]\n");
    prompt.push_str("}\n\n");

    prompt.push_str("Ensure questions are relevant, varied, and appropriate for the difficulty level.");
    if !request.include_answers {
        prompt.push_str(" Set \"answer\" to null for each question.");
    }

    prompt
}
