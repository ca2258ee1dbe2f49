// src/dedup.rs
//! Two-pass deduplication.
//!
//! - Exact pass: drop items whose `(title, url)` fingerprint was already seen.
//! - Fuzzy pass: compare lower-cased titles against every accepted item; a pair at or
//!   above the threshold keeps the item with the higher `raw_score` (first seen wins ties).
//!
//! Similarity: `strsim::normalized_levenshtein` in [0,1], 1.0 = identical.
//! The fuzzy pass is O(n²) over survivors, fine for a daily batch of a few hundred items.

use std::collections::HashSet;
use strsim::normalized_levenshtein;
use tracing::debug;

use crate::item::NewsItem;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.75;

/// Items left after both passes, plus how many each pass removed.
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub items: Vec<NewsItem>,
    pub exact_removed: usize,
    pub fuzzy_removed: usize,
}

/// Run the exact pass, then the fuzzy pass.
pub fn deduplicate(items: Vec<NewsItem>, threshold: f64) -> DedupOutcome {
    let before = items.len();
    let exact = dedup_exact(items);
    let after_exact = exact.len();
    let fuzzy = dedup_fuzzy(exact, threshold);
    DedupOutcome {
        exact_removed: before - after_exact,
        fuzzy_removed: after_exact - fuzzy.len(),
        items: fuzzy,
    }
}

/// Keep the first item for every fingerprint, in arrival order.
pub fn dedup_exact(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len());
    for mut item in items {
        let fp = item.ensure_fingerprint().to_string();
        if !seen.insert(fp) {
            debug!(target: "dedup", id = %item.short_id(), "exact duplicate dropped");
            continue;
        }
        keep.push(item);
    }
    keep
}

/// Case-insensitive title similarity.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Collapse near-identical titles. `threshold` must be in (0, 1].
pub fn dedup_fuzzy(items: Vec<NewsItem>, threshold: f64) -> Vec<NewsItem> {
    assert!(
        threshold > 0.0 && threshold <= 1.0,
        "fuzzy dedup threshold must be in (0, 1], got {threshold}"
    );

    let mut accepted: Vec<NewsItem> = Vec::with_capacity(items.len());
    for item in items {
        let hit = accepted
            .iter()
            .position(|seen| title_similarity(&item.title, &seen.title) >= threshold);

        match hit {
            Some(pos) => {
                if item.raw_score > accepted[pos].raw_score {
                    let loser = accepted.remove(pos);
                    debug!(
                        target: "dedup",
                        kept = %item.short_id(),
                        dropped = %loser.short_id(),
                        "fuzzy duplicate replaced by higher raw score"
                    );
                    accepted.push(item);
                } else {
                    debug!(
                        target: "dedup",
                        kept = %accepted[pos].short_id(),
                        dropped = %item.short_id(),
                        "fuzzy duplicate dropped"
                    );
                }
            }
            None => accepted.push(item),
        }
    }
    accepted
}
