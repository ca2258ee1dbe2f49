// src/relevance/judgment.rs
//! Second relevance layer: greyzone items go to the external judge in batches.
//!
//! Fail-open: a batch whose call fails or whose answer does not parse is kept whole.

use std::fmt::Write as _;
use tracing::{info, warn};

use crate::item::NewsItem;
use crate::judge::{
    dispatch_batches, parse_verdicts, DispatchOptions, LlmClient, RelevanceVerdict,
    EDITOR_SYSTEM_PROMPT,
};

pub const DEFAULT_JUDGMENT_BATCH_SIZE: usize = 10;
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct JudgmentOutcome {
    pub kept: Vec<NewsItem>,
    pub rejected: usize,
    pub failed_batches: usize,
}

/// Prompt for one batch. Indices are batch-local.
pub fn relevance_prompt(batch: &[NewsItem]) -> String {
    let mut p = String::from(
        "Decide for each news item below whether it is about artificial intelligence \
         (AI/ML research, models, products, companies, tooling, policy or applications).\n\
         Answer ONLY with a JSON array, one entry per item: \
         [{\"index\": <number>, \"relevant\": true|false}]\n\n",
    );
    for (i, item) in batch.iter().enumerate() {
        let snippet: String = item.content.chars().take(SNIPPET_CHARS).collect();
        let _ = writeln!(p, "[{i}] {} | {}", item.title.trim(), snippet.trim());
    }
    p
}

/// Keep the greyzone items the judge marks relevant.
///
/// `llm == None` keeps everything (judgment skipped, fail-open).
pub async fn filter_by_judgment(
    items: Vec<NewsItem>,
    llm: Option<&dyn LlmClient>,
    batch_size: usize,
    opts: &DispatchOptions,
) -> JudgmentOutcome {
    assert!(batch_size > 0, "judgment batch size must be positive");
    if items.is_empty() {
        return JudgmentOutcome::default();
    }
    let Some(llm) = llm else {
        info!(target: "relevance", greyzone = items.len(), "no judge configured, keeping greyzone");
        return JudgmentOutcome {
            kept: items,
            ..JudgmentOutcome::default()
        };
    };

    let batches: Vec<&[NewsItem]> = items.chunks(batch_size).collect();
    let results = dispatch_batches(batches, opts, |_, batch| async move {
        let raw = llm
            .complete(EDITOR_SYSTEM_PROMPT, &relevance_prompt(batch))
            .await?;
        parse_verdicts::<RelevanceVerdict>(&raw)
    })
    .await;

    let mut keep = vec![false; items.len()];
    let mut failed_batches = 0usize;
    for (b, res) in results.into_iter().enumerate() {
        let start = b * batch_size;
        let len = batch_size.min(items.len() - start);
        match res {
            Ok(verdicts) => {
                for v in verdicts.into_iter().filter(|v| v.relevant) {
                    if v.index < len {
                        keep[start + v.index] = true;
                    } else {
                        warn!(target: "relevance", batch = b, index = v.index, "verdict index out of range");
                    }
                }
            }
            Err(_) => {
                failed_batches += 1;
                keep[start..start + len].iter_mut().for_each(|k| *k = true);
            }
        }
    }

    let total = items.len();
    let kept: Vec<NewsItem> = items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, k)| k.then_some(item))
        .collect();
    JudgmentOutcome {
        rejected: total - kept.len(),
        kept,
        failed_batches,
    }
}
