//! Summary service: the request-level entry point.
//!
//! [`SummaryService::summarize`] runs one request end to end:
//!
//! 1. Resolve the density preset to [`LengthParams`].
//! 2. Validate the input (no collaborator is touched on failure).
//! 3. Serve a fresh cached result if there is one.
//! 4. Get the shared summarizer from the [`ModelHandle`].
//! 5. Run the core pipeline (direct call or chunk + aggregate).
//! 6. Cache and return a [`SummaryReport`].

use chrono::{DateTime, Utc};
use condense_core::aggregate::RunHooks;
use condense_core::pipeline::{summarize_text, validate_input, PipelineOptions, Route};
use condense_core::{ChunkProgress, ChunkResult, LengthParams, SummarizeError, Summarizer};
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::{CacheKey, SummaryCache};
use crate::config::{Config, Density};
use crate::model::ModelHandle;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::stats::TextStats;

/// Everything the presentation layer needs about one summarization.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryReport {
    pub request_id: String,
    pub summary: String,
    pub model: String,
    pub density: Density,
    pub params: LengthParams,
    /// Pieces the input became; 1 when summarized directly.
    pub chunks: usize,
    pub summarized: usize,
    pub skipped: usize,
    pub failed: usize,
    /// The whole text went to the model in a single call.
    pub direct: bool,
    /// Served from the result cache.
    pub cached: bool,
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Utc>,
    pub input: TextStats,
    pub summary_words: usize,
}

pub struct SummaryService {
    config: Config,
    options: PipelineOptions,
    model: ModelHandle,
    cache: Option<SummaryCache>,
}

impl SummaryService {
    /// Service with the model provider and cache described by `config`.
    pub fn new(config: Config) -> Self {
        let model = ModelHandle::from_config(&config.model);
        Self::with_model(config, model)
    }

    /// Service around a caller-supplied model handle.
    pub fn with_model(config: Config, model: ModelHandle) -> Self {
        Self {
            options: config.pipeline_options(),
            cache: SummaryCache::from_config(&config.cache),
            config,
            model,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn cache(&self) -> Option<&SummaryCache> {
        self.cache.as_ref()
    }

    /// The density to use (falling back to `[presets].default`) and its params.
    pub fn params_for(&self, density: Option<Density>) -> (Density, LengthParams) {
        let density = density.unwrap_or(self.config.presets.default);
        (density, self.config.presets.params(density))
    }

    /// Summarize `text`.
    ///
    /// `cancel` is checked before each model call; `progress` receives one
    /// event per completed chunk and a final event.
    pub async fn summarize(
        &self,
        text: &str,
        density: Option<Density>,
        progress: &dyn ProgressReporter,
        cancel: Option<&AtomicBool>,
    ) -> Result<SummaryReport, SummarizeError> {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("summarize", request_id = %request_id);
        self.run(request_id, text, density, progress, cancel)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        request_id: String,
        text: &str,
        density: Option<Density>,
        progress: &dyn ProgressReporter,
        cancel: Option<&AtomicBool>,
    ) -> Result<SummaryReport, SummarizeError> {
        let started = Instant::now();
        let (density, params) = self.params_for(density);

        validate_input(text, self.options.min_input_chars)?;

        let key = CacheKey::new(text, params);
        if let Some(mut hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            tracing::info!(density = %density, "serving cached summary");
            hit.request_id = request_id;
            hit.cached = true;
            hit.elapsed_ms = elapsed_ms(started);
            progress.report(ProgressEvent::Finished { cached: true });
            return Ok(hit);
        }

        let summarizer = self.model.get()?;

        let observer = |p: ChunkProgress| {
            progress.report(ProgressEvent::Chunk {
                completed: p.completed,
                total: p.total,
            })
        };
        let hooks = RunHooks {
            on_progress: Some(&observer),
            cancel,
        };

        let output = match summarize_text(text, summarizer.as_ref(), params, &self.options, hooks).await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "summarization failed");
                return Err(e);
            }
        };

        let chunks = output.chunk_count();
        let (summarized, skipped, failed) = match &output.route {
            Route::Direct => (1, 0, 0),
            Route::Chunked(results) => tally(results),
        };

        let report = SummaryReport {
            request_id,
            summary_words: output.summary.split_whitespace().count(),
            summary: output.summary,
            model: summarizer.model_name().to_string(),
            density,
            params,
            chunks,
            summarized,
            skipped,
            failed,
            direct: matches!(output.route, Route::Direct),
            cached: false,
            elapsed_ms: elapsed_ms(started),
            generated_at: Utc::now(),
            input: TextStats::of(text),
        };

        tracing::info!(
            chunks,
            summarized,
            skipped,
            failed,
            elapsed_ms = report.elapsed_ms,
            "summary ready"
        );

        if let Some(cache) = &self.cache {
            cache.insert(key, report.clone());
        }
        progress.report(ProgressEvent::Finished { cached: false });

        Ok(report)
    }
}

fn tally(results: &[ChunkResult]) -> (usize, usize, usize) {
    results.iter().fold((0, 0, 0), |(ok, skip, fail), r| match r {
        ChunkResult::Summarized { .. } => (ok + 1, skip, fail),
        ChunkResult::Skipped { .. } => (ok, skip + 1, fail),
        ChunkResult::Failed { .. } => (ok, skip, fail + 1),
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
