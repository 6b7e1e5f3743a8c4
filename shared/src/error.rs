use thiserror::Error;

use crate::ai_client::ProviderError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("AI provider returned empty response")]
    EmptyCompletion,
}

pub type Result<T> = std::result::Result<T, AppError>;
