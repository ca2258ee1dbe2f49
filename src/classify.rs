// src/classify.rs
//! Topical classification.
//!
//! Two implementations of the same `CategoryJudge` capability:
//! - `LlmCategoryJudge`: batched prompt to the external judge, `{index, category}` answers.
//! - `KeywordClassifier`: ordered rules, first match wins; never fails.
//!
//! `classify_items` composes them: a failed judge batch falls back to keywords for the
//! items of that batch that have no category yet.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::item::{Category, NewsItem};
use crate::judge::{
    dispatch_batches, parse_verdicts, CategoryVerdict, DispatchOptions, DynLlmClient, JudgeError,
    EDITOR_SYSTEM_PROMPT,
};

pub const DEFAULT_CLASSIFY_BATCH_SIZE: usize = 8;
const SNIPPET_CHARS: usize = 200;

/// One keyword rule: any term present → `category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub terms: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: Category, terms: &[&str]) -> Self {
        Self {
            category,
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Rules in priority order.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            Category::ResearchPaper,
            &[
                "paper", "arxiv", "论文", "research", "study", "icml", "neurips", "iclr", "cvpr",
                "emnlp", " acl ",
            ],
        ),
        CategoryRule::new(
            Category::ProductRelease,
            &[
                "release", "发布", "launch", "announce", "v1.", "v2.", "v3.", "版本", "新版",
            ],
        ),
        CategoryRule::new(
            Category::IndustryNews,
            &[
                "funding",
                "融资",
                "acquisition",
                "并购",
                "policy",
                "regulation",
                "投资",
                "收购",
                "估值",
            ],
        ),
        CategoryRule::new(
            Category::TutorialOpinion,
            &[
                "tutorial", "guide", "教程", "how to", "入门", "实战", "blog", "观点", "分析",
            ],
        ),
        CategoryRule::new(
            Category::OpenSourceProject,
            &[
                "github",
                "repo",
                "open-source",
                "开源",
                "star",
                "fork",
                "trending",
            ],
        ),
    ]
}

/// Batch classification capability. The result has one slot per batch item;
/// `None` means "no usable label for this item".
#[async_trait]
pub trait CategoryJudge: Send + Sync {
    async fn judge_categories(&self, batch: &[NewsItem]) -> Result<Vec<Option<Category>>, JudgeError>;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<CategoryRule>,
}

impl KeywordClassifier {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| CategoryRule {
                category: r.category,
                terms: r
                    .terms
                    .into_iter()
                    .map(|t| t.to_lowercase())
                    .filter(|t| !t.trim().is_empty())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn classify(&self, item: &NewsItem) -> Category {
        let hay = item.haystack();
        self.rules
            .iter()
            .find(|r| r.terms.iter().any(|t| hay.contains(t.as_str())))
            .map(|r| r.category)
            .unwrap_or(Category::Other)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

#[async_trait]
impl CategoryJudge for KeywordClassifier {
    async fn judge_categories(&self, batch: &[NewsItem]) -> Result<Vec<Option<Category>>, JudgeError> {
        Ok(batch.iter().map(|i| Some(self.classify(i))).collect())
    }

    fn name(&self) -> &str {
        "keywords"
    }
}

pub fn classify_prompt(batch: &[NewsItem]) -> String {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    let mut p = format!(
        "Classify each AI news item below into exactly one category from: {}.\n\
         Answer ONLY with a JSON array, one entry per item: \
         [{{\"index\": <number>, \"category\": \"<category>\"}}]\n\n",
        labels.join(", ")
    );
    for (i, item) in batch.iter().enumerate() {
        let snippet: String = item.content.chars().take(SNIPPET_CHARS).collect();
        let _ = writeln!(p, "[{i}] {} | {}", item.title.trim(), snippet.trim());
    }
    p
}

pub struct LlmCategoryJudge {
    llm: DynLlmClient,
}

impl LlmCategoryJudge {
    pub fn new(llm: DynLlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CategoryJudge for LlmCategoryJudge {
    async fn judge_categories(&self, batch: &[NewsItem]) -> Result<Vec<Option<Category>>, JudgeError> {
        let raw = self
            .llm
            .complete(EDITOR_SYSTEM_PROMPT, &classify_prompt(batch))
            .await?;
        let verdicts = parse_verdicts::<CategoryVerdict>(&raw)?;
        let mut out = vec![None; batch.len()];
        for v in verdicts {
            if v.index >= batch.len() {
                warn!(target: "classify", index = v.index, "verdict index out of range");
                continue;
            }
            match v.category.parse::<Category>() {
                Ok(c) => out[v.index] = Some(c),
                Err(e) => debug!(target: "classify", error = %e, "unusable category label"),
            }
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        self.llm.provider_name()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassifyOutcome {
    pub items: Vec<NewsItem>,
    pub failed_batches: usize,
    /// Items whose category came from the keyword rules.
    pub keyword_assigned: usize,
}

/// Assign a category to every item.
///
/// Judge answers overwrite; keyword fallback only fills items that have no category.
pub async fn classify_items(
    mut items: Vec<NewsItem>,
    judge: Option<&dyn CategoryJudge>,
    fallback: &KeywordClassifier,
    batch_size: usize,
    opts: &DispatchOptions,
) -> ClassifyOutcome {
    assert!(batch_size > 0, "classification batch size must be positive");
    let mut failed_batches = 0usize;

    if let Some(judge) = judge.filter(|_| !items.is_empty()) {
        let batches: Vec<&[NewsItem]> = items.chunks(batch_size).collect();
        let results = dispatch_batches(batches, opts, |_, batch| judge.judge_categories(batch)).await;

        for (b, res) in results.into_iter().enumerate() {
            let start = b * batch_size;
            match res {
                Ok(cats) => {
                    for (offset, cat) in cats.into_iter().enumerate() {
                        if let (Some(cat), Some(item)) = (cat, items.get_mut(start + offset)) {
                            item.category = Some(cat);
                        }
                    }
                }
                Err(_) => failed_batches += 1,
            }
        }
        if failed_batches > 0 {
            info!(target: "classify", judge = judge.name(), failed_batches, "falling back to keyword rules");
        }
    }

    let mut keyword_assigned = 0usize;
    for item in items.iter_mut().filter(|i| i.category.is_none()) {
        item.category = Some(fallback.classify(item));
        keyword_assigned += 1;
    }

    ClassifyOutcome {
        items,
        failed_batches,
        keyword_assigned,
    }
}

/// Judge backed by the external LLM, if one is configured.
pub fn llm_category_judge(llm: Option<&DynLlmClient>) -> Option<LlmCategoryJudge> {
    llm.map(|l| LlmCategoryJudge::new(Arc::clone(l)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SourceType;
    use crate::judge::MockClient;
    use chrono::Utc;

    fn mk(title: &str) -> NewsItem {
        NewsItem::new(title, format!("https://x/{title}"), "T", SourceType::Rss, Utc::now())
            .with_content("Test content")
    }

    #[test]
    fn keyword_rules_first_match_wins() {
        let k = KeywordClassifier::default();
        assert_eq!(k.classify(&mk("New paper on arxiv about AI")), Category::ResearchPaper);
        assert_eq!(k.classify(&mk("Release v2.0 of our product")), Category::ProductRelease);
        assert_eq!(k.classify(&mk("Company raises $100M in funding")), Category::IndustryNews);
        assert_eq!(k.classify(&mk("Tutorial: How to use Python")), Category::TutorialOpinion);
        assert_eq!(k.classify(&mk("New trending repo on GitHub")), Category::OpenSourceProject);
        assert_eq!(k.classify(&mk("Random news item")), Category::Other);
        // research outranks release
        assert_eq!(k.classify(&mk("Lab will release the paper")), Category::ResearchPaper);
        assert_eq!(k.classify(&mk("智谱发布新版模型")), Category::ProductRelease);
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let k = KeywordClassifier::new(vec![CategoryRule::new(
            Category::ApplicationCase,
            &["Hospital"],
        )]);
        assert_eq!(k.classify(&mk("AI triage at a hospital")), Category::ApplicationCase);
        assert_eq!(k.classify(&mk("New paper on arxiv")), Category::Other);
    }

    #[tokio::test]
    async fn judge_labels_are_applied_per_index() {
        let mock: DynLlmClient = Arc::new(MockClient::always(Ok(
            r#"[{"index":1,"category":"application-case"},{"index":0,"category":"research-paper"}]"#
                .into(),
        )));
        let judge = LlmCategoryJudge::new(mock);
        let out = classify_items(
            vec![mk("a"), mk("b")],
            Some(&judge),
            &KeywordClassifier::default(),
            8,
            &DispatchOptions::default(),
        )
        .await;
        assert_eq!(out.items[0].category, Some(Category::ResearchPaper));
        assert_eq!(out.items[1].category, Some(Category::ApplicationCase));
        assert_eq!(out.keyword_assigned, 0);
    }

    #[tokio::test]
    async fn failed_batch_falls_back_without_overwriting() {
        let mock: DynLlmClient = Arc::new(MockClient::scripted(vec![
            Ok(r#"[{"index":0,"category":"industry-news"},{"index":1,"category":"other"}]"#.into()),
            Err(JudgeError::Timeout),
        ]));
        let judge = LlmCategoryJudge::new(mock);
        let preset = mk("Random note").with_category(Category::ApplicationCase);
        let items = vec![
            mk("x"),
            mk("y"),
            preset,
            mk("Release v3.1 is out"),
        ];
        let opts = DispatchOptions {
            concurrency: 1,
            ..DispatchOptions::default()
        };
        let out = classify_items(items, Some(&judge), &KeywordClassifier::default(), 2, &opts).await;
        assert_eq!(out.failed_batches, 1);
        assert_eq!(out.items[0].category, Some(Category::IndustryNews));
        assert_eq!(out.items[1].category, Some(Category::Other));
        // pre-assigned category survives the fallback
        assert_eq!(out.items[2].category, Some(Category::ApplicationCase));
        assert_eq!(out.items[3].category, Some(Category::ProductRelease));
        assert_eq!(out.keyword_assigned, 1);
    }

    #[tokio::test]
    async fn unknown_labels_get_keyword_category() {
        let mock: DynLlmClient =
            Arc::new(MockClient::always(Ok(r#"[{"index":0,"category":"gossip"}]"#.into())));
        let judge = LlmCategoryJudge::new(mock);
        let out = classify_items(
            vec![mk("Tutorial: fine-tuning at home")],
            Some(&judge),
            &KeywordClassifier::default(),
            8,
            &DispatchOptions::default(),
        )
        .await;
        assert_eq!(out.items[0].category, Some(Category::TutorialOpinion));
        assert_eq!(out.keyword_assigned, 1);
    }

    #[tokio::test]
    async fn keyword_classifier_is_a_category_judge() {
        let k = KeywordClassifier::default();
        let out = classify_items(
            vec![mk("New trending repo on GitHub")],
            Some(&k),
            &k,
            8,
            &DispatchOptions::default(),
        )
        .await;
        assert_eq!(out.items[0].category, Some(Category::OpenSourceProject));
        assert_eq!(out.failed_batches, 0);
        assert_eq!(out.keyword_assigned, 0);
    }

    #[test]
    fn prompt_lists_taxonomy() {
        let p = classify_prompt(&[mk("a")]);
        for c in Category::ALL {
            assert!(p.contains(c.label()));
        }
        assert!(p.contains("[0] a | Test content"));
    }
}
