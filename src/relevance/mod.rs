// src/relevance/mod.rs
//! Relevance gate: a cheap keyword layer, then an external judge for the greyzone only.

pub mod judgment;
pub mod keyword;

pub use judgment::{filter_by_judgment, relevance_prompt, JudgmentOutcome};
pub use keyword::{KeywordFilter, KeywordPartition, KeywordVerdict};
