// src/lib.rs
// Public library surface for the CLI and integration tests.

pub mod classify;
pub mod config;
pub mod dedup;
pub mod fingerprint;
pub mod item;
pub mod judge;
pub mod pipeline;
pub mod relevance;
pub mod scoring;
pub mod select;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::CurationConfig;
pub use crate::item::{Category, NewsItem, PublishedAt, SourceType};
pub use crate::judge::{DynLlmClient, JudgeError, LlmClient, MockClient};
pub use crate::pipeline::{Curation, CurationStats, Curator};
