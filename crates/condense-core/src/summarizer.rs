//! The inference collaborator seam.
//!
//! Concrete implementations (Hugging Face Inference API, the offline `lead`
//! summarizer) live in the `condense` application crate. The core only ever
//! awaits one call at a time.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::LengthParams;

/// A black-box text summarization function.
///
/// # Example
///
/// ```rust
/// use anyhow::Result;
/// use async_trait::async_trait;
/// use condense_core::{LengthParams, Summarizer};
///
/// struct FirstWords;
///
/// #[async_trait]
/// impl Summarizer for FirstWords {
///     fn model_name(&self) -> &str { "first-words" }
///
///     async fn summarize(&self, text: &str, params: LengthParams) -> Result<String> {
///         let words: Vec<&str> = text
///             .split_whitespace()
///             .take(params.max_length as usize)
///             .collect();
///         Ok(words.join(" "))
///     }
/// }
/// ```
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Model identifier used in logs and reports (e.g. `"facebook/bart-large-cnn"`).
    fn model_name(&self) -> &str;

    /// Summarize `text` within the given length bounds.
    ///
    /// Called at most once per chunk; an error is never retried.
    async fn summarize(&self, text: &str, params: LengthParams) -> Result<String>;
}
