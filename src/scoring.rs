// src/scoring.rs
//! Final score: `raw_score * (base + w_recency * recency + w_content * content)`.
//!
//! `recency` decays linearly from 1.0 to `recency_floor` over `recency_horizon_hours`;
//! `content` is `full_content_factor` for bodies longer than `content_min_chars`
//! characters, `thin_content_factor` otherwise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::NewsItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub base: f64,
    pub recency_weight: f64,
    pub content_weight: f64,
    pub recency_horizon_hours: f64,
    pub recency_floor: f64,
    pub min_age_hours: f64,
    pub content_min_chars: usize,
    pub full_content_factor: f64,
    pub thin_content_factor: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            recency_weight: 0.3,
            content_weight: 0.2,
            recency_horizon_hours: 72.0,
            recency_floor: 0.3,
            min_age_hours: 1.0,
            content_min_chars: 100,
            full_content_factor: 1.0,
            thin_content_factor: 0.7,
        }
    }
}

/// Items dated in the future count as `min_age_hours` old.
pub fn recency_factor(published_at: DateTime<Utc>, now: DateTime<Utc>, w: &ScoringWeights) -> f64 {
    let age_hours = (now - published_at).num_milliseconds() as f64 / 3_600_000.0;
    let age_hours = age_hours.max(w.min_age_hours);
    (1.0 - age_hours / w.recency_horizon_hours).max(w.recency_floor)
}

/// Length is counted in characters, not bytes.
pub fn content_factor(content: &str, w: &ScoringWeights) -> f64 {
    if content.chars().count() > w.content_min_chars {
        w.full_content_factor
    } else {
        w.thin_content_factor
    }
}

pub fn score(item: &NewsItem, now: DateTime<Utc>, w: &ScoringWeights) -> f64 {
    let recency = recency_factor(item.published_at.to_utc(), now, w);
    let content = content_factor(&item.content, w);
    let s = item.raw_score * (w.base + w.recency_weight * recency + w.content_weight * content);
    (s * 1000.0).round() / 1000.0
}

pub fn score_items(mut items: Vec<NewsItem>, now: DateTime<Utc>, w: &ScoringWeights) -> Vec<NewsItem> {
    for item in &mut items {
        item.score = score(item, now, w);
    }
    items
}
