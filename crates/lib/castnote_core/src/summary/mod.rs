//! Episode summaries.
//!
//! [`SummaryGenerator`] turns episode text into a three-section summary;
//! [`parse_summary`] splits that text into a [`ParsedSummary`].
//!
//! [`ParsedSummary`]: crate::models::podcast::ParsedSummary

pub mod gemini;
pub mod parse;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiSummarizer;
pub use parse::parse_summary;

/// Errors from summary generation.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider returned no text")]
    Empty,
}

/// Generates a summary for a piece of text.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn generate(&self, text: &str) -> Result<String, SummaryError>;
}
