//! End-to-end summarization of one document.
//!
//! `validate_input` → short-circuit or `chunk_text` → `aggregate`.
//!
//! Validation is a separate step so that callers can reject bad input
//! before touching any collaborator (cache, model construction).

use crate::aggregate::{aggregate, AggregateOptions, RunHooks};
use crate::chunk::{chunk_text, DEFAULT_MAX_CHUNK_SIZE};
use crate::error::{InvalidInput, SummarizeError};
use crate::models::{ChunkResult, LengthParams};
use crate::summarizer::Summarizer;

/// Minimum trimmed input length accepted for summarization.
pub const DEFAULT_MIN_INPUT_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub max_chunk_size: usize,
    pub min_input_chars: usize,
    pub aggregate: AggregateOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            min_input_chars: DEFAULT_MIN_INPUT_CHARS,
            aggregate: AggregateOptions::default(),
        }
    }
}

/// How a document was summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Short enough for one call on the whole text.
    Direct,
    /// Split into chunks; one entry per chunk.
    Chunked(Vec<ChunkResult>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub summary: String,
    pub route: Route,
}

impl PipelineOutput {
    /// Number of model-sized pieces the input became (1 when direct).
    pub fn chunk_count(&self) -> usize {
        match &self.route {
            Route::Direct => 1,
            Route::Chunked(results) => results.len(),
        }
    }
}

/// Reject empty, whitespace-only, or too-short input.
pub fn validate_input(text: &str, min_input_chars: usize) -> Result<(), InvalidInput> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::Empty);
    }
    if trimmed.chars().count() < min_input_chars {
        return Err(InvalidInput::TooShort {
            min_chars: min_input_chars,
        });
    }
    Ok(())
}

/// Summarize already-validated text.
///
/// Text at or below `max_chunk_size` characters goes to the summarizer
/// once, whole, and its output is returned as-is. Longer text is chunked
/// and aggregated.
///
/// # Errors
///
/// - [`SummarizeError::Inference`] if the single whole-text call fails.
/// - [`SummarizeError::AllChunksFailed`] if no chunk produced a summary.
/// - [`SummarizeError::Cancelled`] if `hooks.cancel` was set.
pub async fn summarize_text(
    text: &str,
    summarizer: &dyn Summarizer,
    params: LengthParams,
    options: &PipelineOptions,
    hooks: RunHooks<'_>,
) -> Result<PipelineOutput, SummarizeError> {
    let max = options.max_chunk_size.max(1);

    if text.chars().count() <= max {
        if hooks.is_cancelled() {
            return Err(SummarizeError::Cancelled {
                completed: 0,
                total: 1,
            });
        }
        tracing::debug!(model = summarizer.model_name(), "summarizing whole text in one call");
        let summary = summarizer
            .summarize(text, params)
            .await
            .map_err(|e| SummarizeError::Inference(e.to_string()))?;
        hooks.report(1, 1);
        return Ok(PipelineOutput {
            summary,
            route: Route::Direct,
        });
    }

    let chunks = chunk_text(text, max);
    tracing::info!(
        chunks = chunks.len(),
        max_chunk_size = max,
        model = summarizer.model_name(),
        "summarizing in chunks"
    );

    let agg = aggregate(&chunks, summarizer, params, &options.aggregate, hooks).await?;
    if agg.is_failure() {
        return Err(SummarizeError::AllChunksFailed {
            chunks: chunks.len(),
        });
    }

    Ok(PipelineOutput {
        summary: agg.summary,
        route: Route::Chunked(agg.results),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::ScriptedSummarizer;
    use crate::models::ChunkProgress;
    use std::sync::Mutex;

    const PARAMS: LengthParams = LengthParams::new(130, 30);

    #[test]
    fn test_validate_empty_and_whitespace() {
        assert_eq!(validate_input("", 50), Err(InvalidInput::Empty));
        assert_eq!(validate_input(" \n\t ", 50), Err(InvalidInput::Empty));
    }

    #[test]
    fn test_validate_too_short() {
        assert_eq!(
            validate_input("short text", 50),
            Err(InvalidInput::TooShort { min_chars: 50 })
        );
        // surrounding whitespace does not count towards the minimum
        let padded = format!("{}{}{}", " ".repeat(60), "short", " ".repeat(60));
        assert!(validate_input(&padded, 50).is_err());
        assert!(validate_input(&"x".repeat(50), 50).is_ok());
    }

    #[tokio::test]
    async fn test_short_text_single_direct_call() {
        let s = ScriptedSummarizer::default();
        let text = "direct ".repeat(20);
        let out = summarize_text(&text, &s, PARAMS, &PipelineOptions::default(), RunHooks::default())
            .await
            .unwrap();

        assert_eq!(out.route, Route::Direct);
        assert_eq!(out.summary, "summary of direct");
        assert_eq!(out.chunk_count(), 1);
        let calls = s.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (text.clone(), PARAMS));
    }

    #[tokio::test]
    async fn test_direct_call_failure_is_inference_error() {
        let s = ScriptedSummarizer::default();
        let text = "FAIL ".repeat(20);
        let err = summarize_text(&text, &s, PARAMS, &PipelineOptions::default(), RunHooks::default())
            .await
            .unwrap_err();
        assert_eq!(err, SummarizeError::Inference("model error".to_string()));
        assert_eq!(err.to_string(), "Error during processing: model error");
    }

    #[tokio::test]
    async fn test_long_text_is_chunked_and_joined() {
        let s = ScriptedSummarizer::default();
        let text = "Hello world. ".repeat(200);
        let seen = Mutex::new(Vec::new());
        let observer = |p: ChunkProgress| seen.lock().unwrap().push(p.fraction());
        let hooks = RunHooks {
            on_progress: Some(&observer),
            cancel: None,
        };
        let out = summarize_text(&text, &s, PARAMS, &PipelineOptions::default(), hooks)
            .await
            .unwrap();

        let chunks = chunk_text(&text, DEFAULT_MAX_CHUNK_SIZE);
        assert!(chunks.len() >= 2);
        assert_eq!(out.chunk_count(), chunks.len());
        let expected: Vec<String> = chunks
            .iter()
            .map(|c| format!("summary of {}", c.text.split_whitespace().next().unwrap()))
            .collect();
        assert_eq!(out.summary, expected.join("\n\n"));
        assert_eq!(seen.lock().unwrap().last().copied(), Some(1.0));
        for (text, _) in s.calls.lock().unwrap().iter() {
            assert!(text.chars().count() <= 1229);
        }
    }

    #[tokio::test]
    async fn test_all_chunks_failing_is_sentinel_error() {
        let s = ScriptedSummarizer::default();
        let text = "FAIL again. ".repeat(200);
        let err = summarize_text(&text, &s, PARAMS, &PipelineOptions::default(), RunHooks::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::AllChunksFailed { chunks } if chunks >= 2));
        assert_eq!(err.to_string(), "Failed to generate summary");
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes() {
        let s = ScriptedSummarizer::default();
        let good = "Good sentence here. ".repeat(10); // 200 chars
        let bad = "FAIL sentence here. ".repeat(10);
        let text = format!("{}\n\n{}\n\n{}", good.trim(), bad.trim(), good.trim());
        let options = PipelineOptions {
            max_chunk_size: 250,
            ..PipelineOptions::default()
        };
        let out = summarize_text(&text, &s, PARAMS, &options, RunHooks::default())
            .await
            .unwrap();

        assert_eq!(out.summary, "summary of Good\n\nsummary of Good");
        match out.route {
            Route::Chunked(results) => {
                assert_eq!(results.len(), 3);
                assert!(matches!(results[1], ChunkResult::Failed { index: 1, .. }));
            }
            Route::Direct => panic!("expected chunked route"),
        }
    }
}
