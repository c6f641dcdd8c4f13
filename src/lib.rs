//! # Condense
//!
//! Summarize long documents with a text-generation model that only accepts
//! bounded input.
//!
//! Text that fits the model's window is summarized in one call. Longer text
//! is split into paragraph-preserving chunks (falling back to word
//! boundaries when a paragraph is too long), each chunk is summarized in
//! order, and the partial summaries are joined. A chunk that fails is
//! skipped; the request only fails when no chunk produced anything.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ CLI/HTTP │──▶│  SummaryService  │──▶│ condense-core│
//! └──────────┘   │ cache + model    │   │ chunk + agg. │
//!                └────────┬─────────┘   └──────┬───────┘
//!                         ▼                    ▼
//!                  ┌─────────────┐      ┌─────────────┐
//!                  │ SummaryCache│      │  Summarizer │
//!                  └─────────────┘      │ HF / lead   │
//!                                       └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! condense stats report.txt
//! condense summarize report.txt --density detailed
//! cat notes.md | condense summarize --json
//! condense serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`provider`] | Inference providers |
//! | [`model`] | Lazily constructed shared summarizer |
//! | [`cache`] | TTL result cache |
//! | [`summarize`] | Request-level summary service |
//! | [`progress`] | Progress reporting |
//! | [`stats`] | Text statistics |
//! | [`export`] | Plain-text summary export |
//! | [`server`] | HTTP API server |

pub mod cache;
pub mod config;
pub mod export;
pub mod model;
pub mod progress;
pub mod provider;
pub mod server;
pub mod stats;
pub mod summarize;
