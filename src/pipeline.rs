// src/pipeline.rs
//! One curation run over a finite batch:
//! dedup → keyword gate → judgment (greyzone) → classify → score → select.
//!
//! Nothing in a run is fatal. Judge failures fall back per batch; empty input gives
//! empty output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use crate::classify::{classify_items, llm_category_judge, CategoryJudge, KeywordClassifier};
use crate::config::{CurationConfig, JudgeConfig};
use crate::dedup::deduplicate;
use crate::item::NewsItem;
use crate::judge::{build_llm_client, DispatchOptions, DynLlmClient};
use crate::relevance::{filter_by_judgment, KeywordFilter};
use crate::scoring::score_items;
use crate::select::select_diverse;
use crate::telemetry;

/// Per-stage counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurationStats {
    pub input: usize,
    pub exact_duplicates: usize,
    pub fuzzy_duplicates: usize,
    pub whitelisted: usize,
    pub blacklisted: usize,
    pub greyzone: usize,
    pub judge_approved: usize,
    pub judge_rejected: usize,
    pub relevance_failed_batches: usize,
    pub classify_failed_batches: usize,
    pub keyword_classified: usize,
    pub selected: usize,
    pub relaxed_picks: usize,
}

#[derive(Debug, Clone)]
pub struct Curation {
    pub items: Vec<NewsItem>,
    pub stats: CurationStats,
}

pub struct Curator {
    config: CurationConfig,
    keyword_filter: KeywordFilter,
    classifier: KeywordClassifier,
    llm: Option<DynLlmClient>,
}

impl Curator {
    /// `llm == None` runs keyword-only.
    pub fn new(config: CurationConfig, llm: Option<DynLlmClient>) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            keyword_filter: KeywordFilter::from_config(&config.relevance),
            classifier: KeywordClassifier::new(config.classify.rules.clone()),
            config,
            llm,
        })
    }

    /// Judge built from `[judge]`; providers without a key are skipped.
    pub fn from_config(config: CurationConfig) -> anyhow::Result<Self> {
        let llm = build_llm_client(&config.judge);
        Self::new(config, llm)
    }

    pub fn offline(config: CurationConfig) -> anyhow::Result<Self> {
        Self::new(config, None)
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    pub fn has_judge(&self) -> bool {
        self.llm.is_some()
    }

    /// Curate with the configured `selection.max_count`.
    pub async fn curate(&self, items: Vec<NewsItem>, now: DateTime<Utc>) -> Curation {
        self.curate_top(items, now, self.config.selection.max_count).await
    }

    /// Panics when `max_count == 0`.
    pub async fn curate_top(&self, items: Vec<NewsItem>, now: DateTime<Utc>, max_count: usize) -> Curation {
        assert!(max_count > 0, "max_count must be positive");
        let cfg = &self.config;
        let mut stats = CurationStats {
            input: items.len(),
            ..CurationStats::default()
        };

        let dedup = deduplicate(items, cfg.dedup.fuzzy_threshold);
        stats.exact_duplicates = dedup.exact_removed;
        stats.fuzzy_duplicates = dedup.fuzzy_removed;
        info!(
            target: "pipeline",
            input = stats.input,
            exact = stats.exact_duplicates,
            fuzzy = stats.fuzzy_duplicates,
            remaining = dedup.items.len(),
            by_source_type = ?source_type_counts(&dedup.items),
            "dedup done"
        );

        let parts = self.keyword_filter.partition(dedup.items);
        stats.whitelisted = parts.whitelisted.len();
        stats.blacklisted = parts.blacklisted.len();
        stats.greyzone = parts.greyzone.len();
        info!(
            target: "pipeline",
            whitelisted = stats.whitelisted,
            greyzone = stats.greyzone,
            blacklisted = stats.blacklisted,
            "keyword gate done"
        );

        // both judge layers share one deadline
        let opts = dispatch_options(&cfg.judge);

        let judged = filter_by_judgment(
            parts.greyzone,
            self.llm.as_deref(),
            cfg.relevance.batch_size,
            &opts,
        )
        .await;
        stats.judge_approved = judged.kept.len();
        stats.judge_rejected = judged.rejected;
        stats.relevance_failed_batches = judged.failed_batches;

        let mut relevant = parts.whitelisted;
        relevant.extend(judged.kept);
        info!(
            target: "pipeline",
            relevant = relevant.len(),
            approved = stats.judge_approved,
            rejected = stats.judge_rejected,
            failed_batches = stats.relevance_failed_batches,
            "relevance done"
        );

        let llm_judge = llm_category_judge(self.llm.as_ref());
        let judge = llm_judge.as_ref().map(|j| j as &dyn CategoryJudge);
        let classified = classify_items(
            relevant,
            judge,
            &self.classifier,
            cfg.classify.batch_size,
            &opts,
        )
        .await;
        stats.classify_failed_batches = classified.failed_batches;
        stats.keyword_classified = classified.keyword_assigned;

        let scored = score_items(classified.items, now, &cfg.scoring);
        let selection = select_diverse(scored, max_count, &cfg.selection);
        stats.selected = selection.items.len();
        stats.relaxed_picks = selection.relaxed;
        info!(
            target: "pipeline",
            selected = stats.selected,
            relaxed = stats.relaxed_picks,
            keyword_classified = stats.keyword_classified,
            by_source_type = ?source_type_counts(&selection.items),
            "curation done"
        );

        telemetry::record_run(&stats, now.timestamp());
        Curation {
            items: selection.items,
            stats,
        }
    }
}

fn dispatch_options(judge: &JudgeConfig) -> DispatchOptions {
    DispatchOptions {
        concurrency: judge.concurrency,
        batch_timeout: Duration::from_secs(judge.batch_timeout_secs),
        deadline: Instant::now().checked_add(Duration::from_secs(judge.run_timeout_secs)),
    }
}

fn source_type_counts(items: &[NewsItem]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for it in items {
        *counts.entry(it.source_type.as_str()).or_insert(0) += 1;
    }
    counts
}
