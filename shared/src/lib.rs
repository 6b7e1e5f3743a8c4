//! Shared building blocks of the interview question generator: settings,
//! error types, DTOs, the resilient JSON repair pipeline, the AI provider
//! clients, and the in-memory generation history.

pub mod ai_client;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod history;
pub mod json_repair;
