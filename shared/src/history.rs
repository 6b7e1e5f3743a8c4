//! In-memory history of generation runs.
//!
//! Keeps every run with its request parameters, recovered questions, and a
//! creation timestamp, and answers the queries the frontend needs: most
//! recent N, lookup, delete, and case-insensitive filtering on role, topic,
//! or difficulty.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::dto::{GenerateRequest, Question, QuestionSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub role: String,
    pub topic: String,
    pub difficulty: String,
    #[serde(rename = "technicalQuestions")]
    pub technical: Vec<Question>,
    #[serde(rename = "behavioralQuestions")]
    pub behavioral: Vec<Question>,
    #[serde(rename = "includeAnswers")]
    pub include_answers: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Filter for [`HistoryStore::search`]. The first non-empty criterion wins,
/// in field order.
#[derive(Debug, Default, Clone)]
pub struct HistoryFilter {
    pub role: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
}

pub struct HistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
    next_id: AtomicI64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Store one run, stamping it with an id and the current time.
    pub async fn append(&self, request: &GenerateRequest, questions: &QuestionSet) -> HistoryEntry {
        let entry = HistoryEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            role: request.role.clone(),
            topic: request.topic.clone(),
            difficulty: request.difficulty.clone(),
            technical: questions.technical.clone(),
            behavioral: questions.behavioral.clone(),
            include_answers: request.include_answers,
            created_at: Utc::now(),
        };
        self.entries.write().await.push(entry.clone());
        info!(
            "saved question history for role: {}, topic: {}",
            request.role, request.topic
        );
        entry
    }

    /// The `limit` newest entries, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub async fn get(&self, id: i64) -> Option<HistoryEntry> {
        let entries = self.entries.read().await;
        entries.iter().find(|e| e.id == id).cloned()
    }

    /// Remove an entry; returns whether it existed.
    pub async fn delete(&self, id: i64) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() < before
    }

    /// Entries matching the filter, newest first. Role and topic match on
    /// case-insensitive substrings, difficulty on case-insensitive equality.
    /// An empty filter returns everything.
    pub async fn search(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .rev()
            .filter(|e| matches_filter(e, filter))
            .cloned()
            .collect()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_filter(entry: &HistoryEntry, filter: &HistoryFilter) -> bool {
    if let Some(role) = nonempty(&filter.role) {
        return contains_ci(&entry.role, role);
    }
    if let Some(topic) = nonempty(&filter.topic) {
        return contains_ci(&entry.topic, topic);
    }
    if let Some(difficulty) = nonempty(&filter.difficulty) {
        return entry.difficulty.eq_ignore_ascii_case(difficulty);
    }
    true
}

fn nonempty(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().filter(|s| !s.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
