//! Chunk-wise summary aggregation.
//!
//! Invokes a [`Summarizer`] once per chunk, strictly in index order, and
//! joins the successful outputs with a fixed separator. A chunk that fails
//! is logged and skipped; the request only fails when nothing succeeded,
//! in which case the summary is the [`SUMMARY_FAILED`] sentinel.
//!
//! ```text
//! [c0, c1, c2] ──▶ summarize(c0) ✓ ──▶ summarize(c1) ✗ ──▶ summarize(c2) ✓
//!                                                      │
//!                                  "r0" + separator + "r2"
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{SummarizeError, SUMMARY_FAILED};
use crate::models::{Chunk, ChunkProgress, ChunkResult, LengthParams};
use crate::summarizer::Summarizer;

/// Separator placed between per-chunk summaries.
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Chunks of this many characters or fewer are not worth summarizing.
pub const DEFAULT_MIN_SUBSTANCE_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    pub separator: String,
    /// Chunks no longer than this are skipped without a call. `0` disables.
    pub min_substance_chars: usize,
    /// Give each call `max_length / chunk_count` (floored at 90) instead of
    /// the full budget.
    pub divide_length_budget: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            min_substance_chars: DEFAULT_MIN_SUBSTANCE_CHARS,
            divide_length_budget: false,
        }
    }
}

/// Observer invoked synchronously after each chunk completes.
pub type ProgressFn<'a> = &'a (dyn Fn(ChunkProgress) + Send + Sync);

/// Optional progress observer and cancellation flag for one run.
#[derive(Clone, Copy, Default)]
pub struct RunHooks<'a> {
    pub on_progress: Option<ProgressFn<'a>>,
    /// Checked before each chunk; when set the run stops.
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> RunHooks<'a> {
    pub fn report(&self, completed: usize, total: usize) {
        if let Some(f) = self.on_progress {
            f(ChunkProgress { completed, total });
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::SeqCst))
    }
}

/// Result of aggregating a chunk sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Joined summaries, or [`SUMMARY_FAILED`] when none succeeded.
    pub summary: String,
    /// One entry per input chunk, in index order.
    pub results: Vec<ChunkResult>,
}

impl Aggregation {
    pub fn summarized(&self) -> usize {
        self.count(|r| matches!(r, ChunkResult::Summarized { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, ChunkResult::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, ChunkResult::Failed { .. }))
    }

    /// `true` when no chunk produced a summary.
    pub fn is_failure(&self) -> bool {
        self.summarized() == 0
    }

    fn count(&self, pred: impl Fn(&ChunkResult) -> bool) -> usize {
        self.results.iter().filter(|r| pred(r)).count()
    }
}

/// Summarize each chunk in order and join the successes.
///
/// # Errors
///
/// Only [`SummarizeError::Cancelled`]. Per-chunk failures are recorded in
/// [`Aggregation::results`]; a run where nothing succeeded still returns
/// `Ok` with the sentinel summary so callers can inspect the results.
pub async fn aggregate(
    chunks: &[Chunk],
    summarizer: &dyn Summarizer,
    params: LengthParams,
    options: &AggregateOptions,
    hooks: RunHooks<'_>,
) -> Result<Aggregation, SummarizeError> {
    let total = chunks.len();
    let per_chunk = if options.divide_length_budget {
        params.split_across(total)
    } else {
        params
    };

    let mut results = Vec::with_capacity(total);

    for (completed, chunk) in chunks.iter().enumerate() {
        if hooks.is_cancelled() {
            tracing::info!(completed, total, "summarization cancelled");
            return Err(SummarizeError::Cancelled { completed, total });
        }

        let result = if chunk.size() <= options.min_substance_chars {
            tracing::debug!(chunk = chunk.index, size = chunk.size(), "skipping trivial chunk");
            ChunkResult::Skipped { index: chunk.index }
        } else {
            match summarizer.summarize(&chunk.text, per_chunk).await {
                Ok(text) => ChunkResult::Summarized {
                    index: chunk.index,
                    text,
                },
                Err(e) => {
                    tracing::warn!(
                        chunk = chunk.index,
                        model = summarizer.model_name(),
                        error = %e,
                        "chunk summarization failed, skipping"
                    );
                    ChunkResult::Failed {
                        index: chunk.index,
                        error: e.to_string(),
                    }
                }
            }
        };

        results.push(result);
        hooks.report(completed + 1, total);
    }

    let parts: Vec<&str> = results.iter().filter_map(ChunkResult::summary).collect();
    let summary = if parts.is_empty() {
        SUMMARY_FAILED.to_string()
    } else {
        parts.join(&options.separator)
    };

    Ok(Aggregation { summary, results })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Test double: echoes `"summary of <first word>"`, failing on chunks
    /// whose text contains `FAIL`, and records every call.
    #[derive(Default)]
    pub(crate) struct ScriptedSummarizer {
        pub calls: Mutex<Vec<(String, LengthParams)>>,
    }

    #[async_trait]
    impl Summarizer for ScriptedSummarizer {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn summarize(&self, text: &str, params: LengthParams) -> Result<String> {
            self.calls.lock().unwrap().push((text.to_string(), params));
            if text.contains("FAIL") {
                bail!("model error");
            }
            let first = text.split_whitespace().next().unwrap_or_default();
            Ok(format!("summary of {}", first))
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(i, *t))
            .collect()
    }

    fn no_threshold() -> AggregateOptions {
        AggregateOptions {
            min_substance_chars: 0,
            ..AggregateOptions::default()
        }
    }

    const PARAMS: LengthParams = LengthParams::new(150, 90);

    #[tokio::test]
    async fn failed_chunk_contributes_nothing_and_order_is_kept() {
        let s = ScriptedSummarizer::default();
        let input = chunks(&["alpha text", "beta FAIL", "gamma text"]);
        let agg = aggregate(&input, &s, PARAMS, &no_threshold(), RunHooks::default())
            .await
            .unwrap();

        assert_eq!(agg.summary, "summary of alpha\n\nsummary of gamma");
        assert_eq!(agg.summarized(), 2);
        assert_eq!(agg.failed(), 1);
        assert_eq!(agg.results[1].index(), 1);
        assert_eq!(s.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn all_failures_give_sentinel_not_empty() {
        let s = ScriptedSummarizer::default();
        let input = chunks(&["FAIL one", "FAIL two"]);
        let agg = aggregate(&input, &s, PARAMS, &no_threshold(), RunHooks::default())
            .await
            .unwrap();

        assert_eq!(agg.summary, SUMMARY_FAILED);
        assert!(agg.is_failure());
    }

    #[tokio::test]
    async fn trivial_chunks_skipped_without_invocation() {
        let s = ScriptedSummarizer::default();
        let long = "substantial ".repeat(10);
        let input = chunks(&["tiny", &long]);
        let opts = AggregateOptions {
            min_substance_chars: 100,
            ..AggregateOptions::default()
        };
        let agg = aggregate(&input, &s, PARAMS, &opts, RunHooks::default())
            .await
            .unwrap();

        assert_eq!(agg.skipped(), 1);
        assert_eq!(agg.summary, "summary of substantial");
        let calls = s.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, long);
    }

    #[tokio::test]
    async fn chunk_exactly_at_threshold_is_skipped() {
        let s = ScriptedSummarizer::default();
        let exact = "x".repeat(100);
        let input = chunks(&[&exact]);
        let agg = aggregate(&input, &s, PARAMS, &AggregateOptions::default(), RunHooks::default())
            .await
            .unwrap();
        assert_eq!(agg.skipped(), 1);
        assert_eq!(agg.summary, SUMMARY_FAILED);
    }

    #[tokio::test]
    async fn custom_separator() {
        let s = ScriptedSummarizer::default();
        let input = chunks(&["one a", "two b"]);
        let opts = AggregateOptions {
            separator: " ".to_string(),
            ..no_threshold()
        };
        let agg = aggregate(&input, &s, PARAMS, &opts, RunHooks::default())
            .await
            .unwrap();
        assert_eq!(agg.summary, "summary of one summary of two");
    }

    #[tokio::test]
    async fn progress_is_monotone_and_ends_at_one() {
        let s = ScriptedSummarizer::default();
        let input = chunks(&["a", "FAIL b", "c", "d"]);
        let seen = Mutex::new(Vec::new());
        let observer = |p: ChunkProgress| seen.lock().unwrap().push(p);
        let hooks = RunHooks {
            on_progress: Some(&observer),
            cancel: None,
        };
        let opts = AggregateOptions {
            min_substance_chars: 1,
            ..AggregateOptions::default()
        };
        aggregate(&input, &s, PARAMS, &opts, hooks).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        let fractions: Vec<f64> = seen.iter().map(ChunkProgress::fraction).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert!(fractions[..3].iter().all(|f| *f < 1.0));
        assert_eq!(*fractions.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_call() {
        let s = ScriptedSummarizer::default();
        let input = chunks(&["a", "b", "c"]);
        let cancel = AtomicBool::new(false);
        let observer = |p: ChunkProgress| {
            if p.completed == 1 {
                cancel.store(true, Ordering::SeqCst);
            }
        };
        let hooks = RunHooks {
            on_progress: Some(&observer),
            cancel: Some(&cancel),
        };
        let err = aggregate(&input, &s, PARAMS, &no_threshold(), hooks)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SummarizeError::Cancelled {
                completed: 1,
                total: 3
            }
        );
        assert_eq!(s.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn divided_budget_applies_to_every_call() {
        let s = ScriptedSummarizer::default();
        let input = chunks(&["a", "b"]);
        let opts = AggregateOptions {
            divide_length_budget: true,
            ..no_threshold()
        };
        aggregate(&input, &s, LengthParams::new(300, 200), &opts, RunHooks::default())
            .await
            .unwrap();

        let calls = s.calls.lock().unwrap();
        assert!(calls
            .iter()
            .all(|(_, p)| *p == LengthParams::new(150, 150)));
    }

    #[tokio::test]
    async fn empty_chunk_list_is_a_failure() {
        let s = ScriptedSummarizer::default();
        let agg = aggregate(&[], &s, PARAMS, &no_threshold(), RunHooks::default())
            .await
            .unwrap();
        assert!(agg.is_failure());
        assert_eq!(agg.summary, SUMMARY_FAILED);
    }
}
