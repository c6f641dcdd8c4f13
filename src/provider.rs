//! Summarizer implementations.
//!
//! - **[`HuggingFaceSummarizer`]**: calls the Hugging Face Inference API.
//! - **[`LeadSummarizer`]**: offline, deterministic lead-sentence extraction.
//!
//! `provider = "disabled"` has no implementation: [`create_summarizer`]
//! fails, which callers surface as "model unavailable".
//!
//! # Provider Selection
//!
//! ```rust,no_run
//! # use condense::config::ModelConfig;
//! # use condense::provider::create_summarizer;
//! let config = ModelConfig {
//!     provider: "lead".to_string(),
//!     ..ModelConfig::default()
//! };
//! let summarizer = create_summarizer(&config).unwrap();
//! assert_eq!(summarizer.model_name(), "lead");
//! ```
//!
//! # Failure Policy
//!
//! Each call is attempted exactly once. A non-2xx status, a transport
//! error, or an `{"error": ...}` body fails the call; the aggregator then
//! skips that chunk. There is no retry loop and, unless `timeout_secs` is
//! configured, no timeout.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use condense_core::prompt::PromptTemplate;
use condense_core::{LengthParams, Summarizer};
use std::time::Duration;

use crate::config::ModelConfig;

// ============ Hugging Face Inference API ============

/// Summarizer backed by the Hugging Face Inference API.
///
/// Sends `POST {url}/models/{model}` with the bearer token read from the
/// environment variable named by `model.token_env` (default `HF_API_TOKEN`).
/// Works with both `summarization` models (returning `summary_text`) and
/// `text2text-generation` models (returning `generated_text`).
pub struct HuggingFaceSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    token: String,
    prompt: Option<PromptTemplate>,
}

impl HuggingFaceSummarizer {
    /// Create a new Hugging Face summarizer from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token variable is unset or empty, the prompt
    /// template is invalid, or the HTTP client cannot be built.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("{} environment variable not set", config.token_env))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}/models/{}", config.url.trim_end_matches('/'), config.model),
            model: config.model.clone(),
            token,
            prompt: config.prompt_template()?,
        })
    }

    #[cfg(test)]
    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, text: &str, params: LengthParams) -> Result<String> {
        let inputs = match &self.prompt {
            Some(p) => p.render(text),
            None => text.to_string(),
        };
        let body = request_body(&inputs, params);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Inference API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_inference_response(&json)
    }
}

/// Build the Inference API request body.
fn request_body(inputs: &str, params: LengthParams) -> serde_json::Value {
    serde_json::json!({
        "inputs": inputs,
        "parameters": {
            "max_length": params.max_length,
            "min_length": params.min_length,
            "do_sample": false,
        },
        "options": {
            "wait_for_model": true,
        },
    })
}

/// Extract the generated text from an Inference API response.
///
/// Accepts `[{"summary_text": ...}]`, `[{"generated_text": ...}]`, or the
/// same objects unwrapped. An `{"error": ...}` body is a failure.
pub fn parse_inference_response(json: &serde_json::Value) -> Result<String> {
    if let Some(err) = json.get("error") {
        let msg = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
        bail!("Inference API error: {}", msg);
    }

    let item = match json.as_array() {
        Some(items) => items
            .first()
            .ok_or_else(|| anyhow!("Invalid inference response: empty array"))?,
        None => json,
    };

    item.get("summary_text")
        .or_else(|| item.get("generated_text"))
        .and_then(|t| t.as_str())
        .map(|t| t.trim().to_string())
        .ok_or_else(|| anyhow!("Invalid inference response: missing summary_text/generated_text"))
}

// ============ Lead Summarizer ============

/// Offline summarizer that keeps the leading sentences of the text.
///
/// Takes whole sentences from the start until adding the next one would
/// pass `max_length` words; the first sentence is always kept, cut to
/// `max_length` words if necessary. Useful without network access and in
/// tests.
pub struct LeadSummarizer;

#[async_trait]
impl Summarizer for LeadSummarizer {
    fn model_name(&self) -> &str {
        "lead"
    }

    async fn summarize(&self, text: &str, params: LengthParams) -> Result<String> {
        let summary = lead_summary(text, params.max_length as usize);
        if summary.is_empty() {
            bail!("nothing to summarize");
        }
        Ok(summary)
    }
}

fn lead_summary(text: &str, max_words: usize) -> String {
    let max_words = max_words.max(1);
    let mut picked: Vec<&str> = Vec::new();

    for sentence in split_sentences(text) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if !picked.is_empty() && picked.len() + words.len() > max_words {
            break;
        }
        picked.extend(words);
        if picked.len() >= max_words {
            break;
        }
    }

    picked.truncate(max_words);
    picked.join(" ")
}

/// Split after `.`, `!`, or `?` when followed by whitespace or the end.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                let s = text[start..end].trim();
                if !s.is_empty() {
                    sentences.push(s);
                }
                start = end;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Create the [`Summarizer`] selected by `model.provider`.
///
/// | Config Value | Summarizer |
/// |-------------|------------|
/// | `"huggingface"` | [`HuggingFaceSummarizer`] |
/// | `"lead"` | [`LeadSummarizer`] |
/// | `"disabled"` | error |
pub fn create_summarizer(config: &ModelConfig) -> Result<Box<dyn Summarizer>> {
    match config.provider.as_str() {
        "huggingface" => Ok(Box::new(HuggingFaceSummarizer::new(config)?)),
        "lead" => Ok(Box::new(LeadSummarizer)),
        "disabled" => bail!("Summarization provider is disabled"),
        other => bail!("Unknown model provider: {}", other),
    }
}
