// src/telemetry.rs
//! Curation counters via the `metrics` facade. The host installs the recorder.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::pipeline::CurationStats;

/// One-time metrics registration (so series show up once a recorder is installed).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("curation_items_in_total", "Items received by the curator.");
        describe_counter!(
            "curation_exact_duplicates_total",
            "Items removed by fingerprint deduplication."
        );
        describe_counter!(
            "curation_fuzzy_duplicates_total",
            "Items removed by title-similarity deduplication."
        );
        describe_counter!("curation_blacklisted_total", "Items dropped by the keyword blacklist.");
        describe_counter!("curation_greyzone_total", "Items sent to the relevance judge.");
        describe_counter!(
            "curation_judge_approved_total",
            "Greyzone items kept after judgment."
        );
        describe_counter!(
            "curation_judge_batch_failures_total",
            "Judge batches that failed or timed out (relevance and classification)."
        );
        describe_counter!(
            "curation_classify_fallbacks_total",
            "Items categorized by keyword rules."
        );
        describe_counter!("curation_selected_total", "Items in the final digest.");
        describe_counter!(
            "curation_relaxed_picks_total",
            "Selected items admitted by quota relaxation."
        );
        describe_gauge!("curation_last_run_ts", "Unix ts when the curator last ran.");
    });
}

pub fn record_run(stats: &CurationStats, now_ts: i64) {
    ensure_metrics_described();
    counter!("curation_items_in_total").increment(stats.input as u64);
    counter!("curation_exact_duplicates_total").increment(stats.exact_duplicates as u64);
    counter!("curation_fuzzy_duplicates_total").increment(stats.fuzzy_duplicates as u64);
    counter!("curation_blacklisted_total").increment(stats.blacklisted as u64);
    counter!("curation_greyzone_total").increment(stats.greyzone as u64);
    counter!("curation_judge_approved_total").increment(stats.judge_approved as u64);
    counter!("curation_judge_batch_failures_total")
        .increment((stats.relevance_failed_batches + stats.classify_failed_batches) as u64);
    counter!("curation_classify_fallbacks_total").increment(stats.keyword_classified as u64);
    counter!("curation_selected_total").increment(stats.selected as u64);
    counter!("curation_relaxed_picks_total").increment(stats.relaxed_picks as u64);
    gauge!("curation_last_run_ts").set(now_ts as f64);
}
