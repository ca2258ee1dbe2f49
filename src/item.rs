// src/item.rs
//! The unit of curation: a collected news item plus the fields the pipeline fills in.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::fingerprint::fingerprint;

/// Coarse collection channel of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Rss,
    Github,
    Newsapi,
    Scraper,
    Reddit,
    Twitter,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Rss => "rss",
            SourceType::Github => "github",
            SourceType::Newsapi => "newsapi",
            SourceType::Scraper => "scraper",
            SourceType::Reddit => "reddit",
            SourceType::Twitter => "twitter",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topical taxonomy used by the classifier and the diversity quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ResearchPaper,
    ProductRelease,
    IndustryNews,
    TutorialOpinion,
    OpenSourceProject,
    ApplicationCase,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::ResearchPaper,
        Category::ProductRelease,
        Category::IndustryNews,
        Category::TutorialOpinion,
        Category::OpenSourceProject,
        Category::ApplicationCase,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::ResearchPaper => "research-paper",
            Category::ProductRelease => "product-release",
            Category::IndustryNews => "industry-news",
            Category::TutorialOpinion => "tutorial-opinion",
            Category::OpenSourceProject => "open-source-project",
            Category::ApplicationCase => "application-case",
            Category::Other => "other",
        }
    }

    /// Chinese label used by the digest reports.
    pub fn zh_label(&self) -> &'static str {
        match self {
            Category::ResearchPaper => "论文与研究",
            Category::ProductRelease => "产品与发布",
            Category::IndustryNews => "行业动态",
            Category::TutorialOpinion => "教程与观点",
            Category::OpenSourceProject => "开源项目",
            Category::ApplicationCase => "应用案例",
            Category::Other => "其他",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category label `{0}`")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Accepts `research-paper`, `research_paper`, `Research Paper` and the Chinese labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let norm: String = trimmed
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label() == norm || c.zh_label() == trimmed)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Publication time as delivered by a collector. Feeds do not always carry an offset;
/// naive values are read as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishedAt {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl PublishedAt {
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            PublishedAt::Zoned(dt) => dt.with_timezone(&Utc),
            PublishedAt::Naive(naive) => naive.and_utc(),
        }
    }

    /// Parse RFC 3339, RFC 2822 (RSS `pubDate`) or a naive ISO-like timestamp.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(PublishedAt::Zoned(dt));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(PublishedAt::Zoned(dt));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(PublishedAt::Naive)
    }
}

impl From<DateTime<Utc>> for PublishedAt {
    fn from(dt: DateTime<Utc>) -> Self {
        PublishedAt::Zoned(dt.into())
    }
}

impl From<DateTime<FixedOffset>> for PublishedAt {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        PublishedAt::Zoned(dt)
    }
}

impl From<NaiveDateTime> for PublishedAt {
    fn from(naive: NaiveDateTime) -> Self {
        PublishedAt::Naive(naive)
    }
}

impl Serialize for PublishedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PublishedAt::Zoned(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            PublishedAt::Naive(naive) => {
                serializer.serialize_str(&naive.format(NAIVE_FORMATS[0]).to_string())
            }
        }
    }
}

impl<'de> Deserialize<'de> for PublishedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PublishedAt::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp `{raw}`")))
    }
}

/// A collected news item. Identity fields (`title`, `url`, `source`, `source_type`)
/// are never changed by the pipeline; `fingerprint`, `category` and `score` are filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub source_type: SourceType,
    #[serde(default)]
    pub content: String,
    pub published_at: PublishedAt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Collector-assigned prior in [0,1] (source authority or social signal).
    #[serde(default)]
    pub raw_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
}

impl NewsItem {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        source_type: SourceType,
        published_at: impl Into<PublishedAt>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            source_type,
            content: String::new(),
            published_at: published_at.into(),
            author: None,
            tags: Vec::new(),
            raw_score: 0.0,
            fingerprint: None,
            category: None,
            score: 0.0,
            summary: String::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_raw_score(mut self, raw_score: f64) -> Self {
        self.raw_score = raw_score;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Compute the fingerprint once and memoize it. A fingerprint supplied by the
    /// collector is kept as-is.
    pub fn ensure_fingerprint(&mut self) -> &str {
        if self.fingerprint.is_none() {
            self.fingerprint = Some(fingerprint(&self.title, &self.url));
        }
        self.fingerprint.as_deref().unwrap_or_default()
    }

    pub fn category_or_other(&self) -> Category {
        self.category.unwrap_or(Category::Other)
    }

    /// Lower-cased `title + content`, padded with spaces so terms like `" ai "`
    /// can match at the edges.
    pub fn haystack(&self) -> String {
        format!(" {} {} ", self.title, self.content).to_lowercase()
    }

    /// Short, log-safe identifier (fingerprint prefix).
    pub fn short_id(&self) -> String {
        match &self.fingerprint {
            Some(fp) => fp.chars().take(12).collect(),
            None => fingerprint(&self.title, &self.url).chars().take(12).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item() -> NewsItem {
        NewsItem::new(
            "OpenAI releases GPT-4",
            "https://example.com/1",
            "OpenAI Blog",
            SourceType::Rss,
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let p = PublishedAt::parse("2025-03-01T08:00:00").unwrap();
        assert!(matches!(p, PublishedAt::Naive(_)));
        assert_eq!(
            p.to_utc(),
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
        );

        let spaced = PublishedAt::parse("2025-03-01 08:00:00.250").unwrap();
        assert_eq!(spaced.to_utc().timestamp(), p.to_utc().timestamp());
    }

    #[test]
    fn zoned_timestamps_are_normalized() {
        let p = PublishedAt::parse("2025-03-01T16:00:00+08:00").unwrap();
        assert_eq!(
            p.to_utc(),
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
        );
        let rss = PublishedAt::parse("Sat, 01 Mar 2025 08:00:00 GMT").unwrap();
        assert_eq!(rss.to_utc(), p.to_utc());
        assert!(PublishedAt::parse("yesterday").is_none());
    }

    #[test]
    fn fingerprint_is_memoized() {
        let mut it = item();
        let first = it.ensure_fingerprint().to_string();
        it.title = "changed after the fact".into();
        assert_eq!(it.ensure_fingerprint(), first);
    }

    #[test]
    fn category_labels_parse_in_both_languages() {
        assert_eq!("research-paper".parse::<Category>(), Ok(Category::ResearchPaper));
        assert_eq!("Open Source Project".parse::<Category>(), Ok(Category::OpenSourceProject));
        assert_eq!("行业动态".parse::<Category>(), Ok(Category::IndustryNews));
        assert!("gossip".parse::<Category>().is_err());
    }

    #[test]
    fn json_shape_round_trips_with_defaults() {
        let raw = r#"{
            "title": "Paper drop",
            "url": "https://arxiv.org/abs/1",
            "source": "arXiv",
            "source_type": "rss",
            "published_at": "2025-03-01 08:00:00",
            "raw_score": 0.7
        }"#;
        let it: NewsItem = serde_json::from_str(raw).unwrap();
        assert_eq!(it.category_or_other(), Category::Other);
        assert_eq!(it.score, 0.0);
        assert!(it.content.is_empty());

        let out = serde_json::to_string(&it.with_category(Category::ResearchPaper)).unwrap();
        assert!(out.contains("\"category\":\"research-paper\""));
        assert!(out.contains("\"published_at\":\"2025-03-01T08:00:00\""));
    }
}
