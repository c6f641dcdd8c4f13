//! Core data models shared by the chunker and the aggregator.

use serde::{Deserialize, Serialize};

/// A bounded-size segment of an input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Zero-based position; defines output order.
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Size in characters (Unicode scalar values, not bytes).
    pub fn size(&self) -> usize {
        self.text.chars().count()
    }
}

/// Outcome of one attempt to summarize a [`Chunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkResult {
    /// The summarizer returned text for this chunk.
    Summarized { index: usize, text: String },
    /// The chunk was below the substance threshold and never sent.
    Skipped { index: usize },
    /// The summarizer failed; the chunk contributes nothing.
    Failed { index: usize, error: String },
}

impl ChunkResult {
    pub fn index(&self) -> usize {
        match self {
            ChunkResult::Summarized { index, .. }
            | ChunkResult::Skipped { index }
            | ChunkResult::Failed { index, .. } => *index,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            ChunkResult::Summarized { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Generation length bounds forwarded to the inference collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LengthParams {
    pub max_length: u32,
    pub min_length: u32,
}

/// Lower bound on a per-chunk `max_length` when the budget is divided.
pub const MIN_CHUNK_MAX_LENGTH: u32 = 90;

impl LengthParams {
    pub const fn new(max_length: u32, min_length: u32) -> Self {
        Self {
            max_length,
            min_length,
        }
    }

    /// Divide the `max_length` budget across `chunks` calls.
    ///
    /// Each call gets `max(90, max_length / chunks)`; `min_length` is
    /// clamped so it never exceeds the resulting maximum.
    pub fn split_across(self, chunks: usize) -> Self {
        let chunks = u32::try_from(chunks.max(1)).unwrap_or(u32::MAX);
        let max_length = (self.max_length / chunks).max(MIN_CHUNK_MAX_LENGTH);
        Self {
            max_length,
            min_length: self.min_length.min(max_length),
        }
    }
}

/// Progress after a chunk completes (summarized, skipped, or failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkProgress {
    pub completed: usize,
    pub total: usize,
}

impl ChunkProgress {
    /// Completed share in `[0.0, 1.0]`. An empty run counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}
