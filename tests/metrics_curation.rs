// tests/metrics_curation.rs
#![cfg(feature = "strict-metrics")]
use ai_digest_curator::{CurationConfig, Curator, NewsItem, SourceType};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::test]
async fn counters_exposed_after_a_run() {
    // Install a local recorder for the test
    let handle = PrometheusBuilder::new().install_recorder().expect("recorder");

    let items = vec![
        NewsItem::new("LLM agents ship", "https://a/1", "A", SourceType::Rss, Utc::now()),
        NewsItem::new("LLM agents ship", "https://a/1", "A", SourceType::Rss, Utc::now()),
        NewsItem::new("World cup final tonight", "https://b/1", "B", SourceType::Rss, Utc::now()),
    ];
    let curator = Curator::offline(CurationConfig::default()).unwrap();
    let out = curator.curate(items, Utc::now()).await;
    assert_eq!(out.items.len(), 1);

    // Scrape metrics text and check series presence by substring
    let text = handle.render();
    assert!(text.contains("curation_items_in_total 3"));
    assert!(text.contains("curation_exact_duplicates_total 1"));
    assert!(text.contains("curation_blacklisted_total 1"));
    assert!(text.contains("curation_selected_total 1"));
}
