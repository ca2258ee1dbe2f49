// src/select.rs
//! Diversity-aware top-N selection.
//!
//! Greedy over score-descending order with three caps: per source type, per concrete
//! source, per category. When the caps leave fewer than N picks, a relaxation pass
//! fills up from the remaining items in score order, so the result length is always
//! `min(N, input)`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::item::{Category, NewsItem, SourceType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    pub max_count: usize,
    pub source_type_share: f64,
    pub category_share: f64,
    /// Lower bound for the share-derived quotas.
    pub min_quota: usize,
    pub max_per_source: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            max_count: 10,
            source_type_share: 0.4,
            category_share: 0.35,
            min_quota: 2,
            max_per_source: 3,
        }
    }
}

/// Per-bucket caps for a target of `n` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quotas {
    pub per_source_type: usize,
    pub per_source: usize,
    pub per_category: usize,
}

impl SelectionPolicy {
    pub fn quotas(&self, n: usize) -> Quotas {
        let share = |s: f64| ((s * n as f64).floor() as usize).max(self.min_quota);
        Quotas {
            per_source_type: share(self.source_type_share),
            per_source: self.max_per_source,
            per_category: share(self.category_share),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub items: Vec<NewsItem>,
    /// Picks that came from the relaxation pass.
    pub relaxed: usize,
}

pub fn select_diverse(mut items: Vec<NewsItem>, max_count: usize, policy: &SelectionPolicy) -> Selection {
    assert!(max_count > 0, "max_count must be positive");
    // stable: equal scores keep arrival order
    items.sort_by(|a, b| b.score.total_cmp(&a.score));

    let q = policy.quotas(max_count);
    let mut by_type: HashMap<SourceType, usize> = HashMap::new();
    let mut by_source: HashMap<&str, usize> = HashMap::new();
    let mut by_category: HashMap<Category, usize> = HashMap::new();
    let mut order: Vec<usize> = Vec::with_capacity(max_count.min(items.len()));
    let mut taken = vec![false; items.len()];

    for (i, item) in items.iter().enumerate() {
        if order.len() == max_count {
            break;
        }
        let category = item.category_or_other();
        let t = by_type.get(&item.source_type).copied().unwrap_or(0);
        let s = by_source.get(item.source.as_str()).copied().unwrap_or(0);
        let c = by_category.get(&category).copied().unwrap_or(0);
        if t < q.per_source_type && s < q.per_source && c < q.per_category {
            *by_type.entry(item.source_type).or_default() += 1;
            *by_source.entry(item.source.as_str()).or_default() += 1;
            *by_category.entry(category).or_default() += 1;
            taken[i] = true;
            order.push(i);
        }
    }

    let greedy = order.len();
    for (i, flag) in taken.iter_mut().enumerate() {
        if order.len() == max_count {
            break;
        }
        if !*flag {
            *flag = true;
            order.push(i);
        }
    }
    let relaxed = order.len() - greedy;
    if relaxed > 0 {
        debug!(target: "select", relaxed, "quotas relaxed to fill the digest");
    }

    // greedy picks first, then relaxation picks; both in score order
    let mut slots: Vec<Option<NewsItem>> = items.into_iter().map(Some).collect();
    let items = order.into_iter().filter_map(|i| slots[i].take()).collect();
    Selection { items, relaxed }
}
