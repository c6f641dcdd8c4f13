//! Paragraph-preserving text chunker with a word-boundary fallback.
//!
//! Splits input text into [`Chunk`]s of at most `max_chunk_size` characters
//! so that each piece fits a summarization model's context. Splitting
//! prefers paragraph boundaries (`\n\n`); when that leaves a chunk far over
//! the limit the whole input is re-chunked on word boundaries instead.
//!
//! Sizes are counted in characters (Unicode scalar values), never bytes.
//!
//! # Algorithm
//!
//! 1. Empty text yields no chunks. Text no longer than `max_chunk_size`
//!    yields a single chunk equal to the input, untouched.
//! 2. Split on `\n\n` and accumulate paragraphs into a buffer, each followed
//!    by a blank line. When `buffer_len + paragraph_len >= max_chunk_size`,
//!    flush the buffer (trimmed) and start a new one with that paragraph.
//! 3. If any paragraph chunk is longer than `max_chunk_size * 1.2`, discard
//!    the paragraph result and restart on the original text in word mode.
//! 4. Word mode joins whitespace-separated words with single spaces and
//!    flushes before the joined length would reach `max_chunk_size`.
//!
//! # Example
//!
//! ```rust
//! use condense_core::chunk::chunk_text;
//!
//! let text = "Hello world. ".repeat(200);
//! let chunks = chunk_text(&text, 1024);
//! assert!(chunks.len() >= 2);
//! assert!(chunks.iter().all(|c| c.size() <= 1229));
//! ```

use crate::models::Chunk;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1024;

const PARAGRAPH_BREAK: &str = "\n\n";

/// Split text into chunks, preferring paragraph boundaries.
///
/// A `max_chunk_size` of zero is treated as one.
///
/// # Guarantees
///
/// - Indices are contiguous: `0, 1, 2, …, N-1`.
/// - For non-empty text no longer than the limit, exactly one chunk equal
///   to the input is returned.
/// - Otherwise no chunk is longer than `max_chunk_size * 1.2`, unless a
///   single word is itself longer (words are never split).
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<Chunk> {
    let max = max_chunk_size.max(1);

    if text.is_empty() {
        return Vec::new();
    }

    if char_len(text) <= max {
        return vec![Chunk::new(0, text)];
    }

    let chunks = chunk_paragraphs(text, max);
    if chunks.iter().any(|c| exceeds_tolerance(c.size(), max)) {
        tracing::debug!(
            max_chunk_size = max,
            "paragraph chunk over tolerance, re-chunking on word boundaries"
        );
        return chunk_words(text, max);
    }

    chunks
}

/// Paragraph-preserving mode.
///
/// Greedily packs `\n\n`-separated paragraphs. A single paragraph longer
/// than the limit becomes its own (oversized) chunk. Paragraph text is kept
/// verbatim apart from whitespace trimmed at chunk edges.
pub fn chunk_paragraphs(text: &str, max_chunk_size: usize) -> Vec<Chunk> {
    let max = max_chunk_size.max(1);
    let mut pieces: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;

    for para in text.split(PARAGRAPH_BREAK) {
        let para_len = char_len(para);

        if buf_len + para_len >= max && !buf.is_empty() {
            pieces.push(buf.trim().to_string());
            buf.clear();
            buf_len = 0;
        }

        buf.push_str(para);
        buf.push_str(PARAGRAPH_BREAK);
        buf_len += para_len + PARAGRAPH_BREAK.len();
    }

    if !buf.is_empty() {
        pieces.push(buf.trim().to_string());
    }

    pieces
        .into_iter()
        .filter(|p| !p.is_empty())
        .enumerate()
        .map(|(i, p)| Chunk::new(i, p))
        .collect()
}

/// Word-boundary mode.
///
/// Whitespace runs collapse to single spaces. A chunk is closed as soon as
/// appending the next word would make its length reach `max_chunk_size`.
pub fn chunk_words(text: &str, max_chunk_size: usize) -> Vec<Chunk> {
    let max = max_chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut words: Vec<&str> = Vec::new();
    let mut len = 0usize;

    for word in text.split_whitespace() {
        let word_len = char_len(word);
        let would_be = if words.is_empty() {
            word_len
        } else {
            len + 1 + word_len
        };

        if would_be >= max && !words.is_empty() {
            chunks.push(Chunk::new(chunks.len(), words.join(" ")));
            words.clear();
            len = word_len;
        } else {
            len = would_be;
        }
        words.push(word);
    }

    if !words.is_empty() {
        chunks.push(Chunk::new(chunks.len(), words.join(" ")));
    }

    chunks
}

/// `true` when `len` is strictly above `max * 1.2`, computed exactly.
pub fn exceeds_tolerance(len: usize, max: usize) -> bool {
    len.saturating_mul(5) > max.saturating_mul(6)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
