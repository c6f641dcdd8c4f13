//! Error taxonomy for a summarization request.
//!
//! Every variant's `Display` output is the plain-text message shown to the
//! user; causes that should not reach the user are kept in separate fields
//! and only logged.

use thiserror::Error;

/// Sentinel returned when no chunk produced a summary.
pub const SUMMARY_FAILED: &str = "Failed to generate summary";

/// Input rejected before any collaborator is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("Please enter valid text to summarize")]
    Empty,
    #[error("Text too short (minimum {min_chars} characters required)")]
    TooShort { min_chars: usize },
}

/// Request-level failure.
///
/// Failures local to one chunk are not represented here: the aggregator
/// records them as [`ChunkResult::Failed`](crate::models::ChunkResult) and
/// carries on. Only when nothing succeeded does the request fail with
/// [`SummarizeError::AllChunksFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// The inference collaborator could not be constructed.
    #[error("Model unavailable - please try again later")]
    ModelUnavailable { reason: String },

    /// Every chunk failed or was skipped.
    #[error("{}", SUMMARY_FAILED)]
    AllChunksFailed { chunks: usize },

    /// The single whole-text call failed (short inputs are not chunked).
    #[error("Error during processing: {0}")]
    Inference(String),

    /// Cancellation was requested at a chunk boundary.
    #[error("Summarization cancelled after {completed} of {total} chunks")]
    Cancelled { completed: usize, total: usize },
}

impl SummarizeError {
    /// Stable machine-readable code, used by the HTTP API.
    pub fn code(&self) -> &'static str {
        match self {
            SummarizeError::InvalidInput(_) => "invalid_input",
            SummarizeError::ModelUnavailable { .. } => "model_unavailable",
            SummarizeError::AllChunksFailed { .. } => "summary_failed",
            SummarizeError::Inference(_) => "inference_error",
            SummarizeError::Cancelled { .. } => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_plain_text() {
        let empty: SummarizeError = InvalidInput::Empty.into();
        assert_eq!(empty.to_string(), "Please enter valid text to summarize");

        let short: SummarizeError = InvalidInput::TooShort { min_chars: 50 }.into();
        assert_eq!(
            short.to_string(),
            "Text too short (minimum 50 characters required)"
        );

        let model = SummarizeError::ModelUnavailable {
            reason: "HF_API_TOKEN not set".into(),
        };
        assert_eq!(model.to_string(), "Model unavailable - please try again later");

        let all = SummarizeError::AllChunksFailed { chunks: 3 };
        assert_eq!(all.to_string(), SUMMARY_FAILED);
        assert!(!all.to_string().is_empty());
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            SummarizeError::InvalidInput(InvalidInput::Empty),
            SummarizeError::ModelUnavailable { reason: String::new() },
            SummarizeError::AllChunksFailed { chunks: 0 },
            SummarizeError::Inference(String::new()),
            SummarizeError::Cancelled {
                completed: 0,
                total: 1,
            },
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
