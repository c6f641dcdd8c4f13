//! # condense core
//!
//! Pure logic for condense: data models, text chunking, chunk-wise summary
//! aggregation, the [`Summarizer`](summarizer::Summarizer) trait, prompt
//! templating, and the error taxonomy.
//!
//! This crate performs no HTTP, filesystem, or configuration I/O. The
//! inference collaborator is reached only through the `Summarizer` trait,
//! which the `condense` application crate implements for hosted models.

pub mod aggregate;
pub mod chunk;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod summarizer;

pub use error::{InvalidInput, SummarizeError};
pub use models::{Chunk, ChunkProgress, ChunkResult, LengthParams};
pub use summarizer::Summarizer;
