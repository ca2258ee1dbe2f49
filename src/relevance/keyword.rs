// src/relevance/keyword.rs
//! First relevance layer: static term lists, no external calls.
//!
//! Haystack is the lower-cased, space-padded `title + content` (see `NewsItem::haystack`).
//! Matching is plain substring search, so multi-word and CJK terms work without a tokenizer;
//! short ASCII terms carry their own padding (`" ai "`) where a bare substring would
//! hit unrelated words.

use tracing::debug;

use crate::config::RelevanceConfig;
use crate::item::NewsItem;

/// AI/ML vocabulary, labs, models and projects (English + Chinese).
pub const DEFAULT_WHITELIST: &[&str] = &[
    " ai ",
    " ai-",
    "a.i.",
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "neural network",
    "language model",
    "llm",
    "gpt",
    "chatgpt",
    "openai",
    "anthropic",
    "claude",
    "gemini",
    "deepmind",
    "mistral",
    "llama",
    "hugging face",
    "huggingface",
    "transformer model",
    "stable diffusion",
    "diffusion model",
    "midjourney",
    "copilot",
    "generative ai",
    "genai",
    " agi ",
    " rag ",
    "fine-tuning",
    "multimodal",
    "reinforcement learning",
    "computer vision",
    "natural language processing",
    " nlp ",
    "pytorch",
    "tensorflow",
    "ai agent",
    "deepseek",
    "qwen",
    "moonshot ai",
    "人工智能",
    "大模型",
    "机器学习",
    "深度学习",
    "神经网络",
    "智能体",
    "生成式",
    "语言模型",
    "多模态",
    "算力",
    "通义",
    "文心",
    "智谱",
];

/// Sports, entertainment, politics and lifestyle noise.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "football",
    "soccer",
    " nba ",
    " nfl ",
    "premier league",
    "world cup",
    "olympics",
    "celebrity",
    "box office",
    "red carpet",
    "horoscope",
    "recipe",
    "lottery",
    "gossip",
    " election ",
    "presidential campaign",
    "fashion week",
    "足球",
    "篮球",
    "娱乐圈",
    "明星",
    "综艺",
    "选举",
    "星座",
    "彩票",
    "八卦",
];

/// Where the keyword layer routed an item, with the term that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordVerdict {
    Blacklisted(String),
    Whitelisted(String),
    Greyzone,
}

/// Three-way split, stable order within each bucket.
#[derive(Debug, Clone, Default)]
pub struct KeywordPartition {
    pub whitelisted: Vec<NewsItem>,
    pub greyzone: Vec<NewsItem>,
    pub blacklisted: Vec<NewsItem>,
}

#[derive(Debug, Clone)]
pub struct KeywordFilter {
    whitelist: Vec<String>,
    blacklist: Vec<String>,
}

fn clean_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    terms
        .into_iter()
        .map(|t| t.as_ref().to_lowercase())
        .filter(|t| !t.trim().is_empty())
        .collect()
}

impl KeywordFilter {
    /// Terms are lower-cased; blank terms are dropped. Padding spaces are kept.
    pub fn new<I, J, S, T>(whitelist: I, blacklist: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            whitelist: clean_terms(whitelist),
            blacklist: clean_terms(blacklist),
        }
    }

    pub fn from_config(cfg: &RelevanceConfig) -> Self {
        Self::new(&cfg.whitelist, &cfg.blacklist)
    }

    /// Blacklist wins over whitelist.
    pub fn verdict(&self, item: &NewsItem) -> KeywordVerdict {
        let hay = item.haystack();
        if let Some(term) = self.blacklist.iter().find(|t| hay.contains(t.as_str())) {
            return KeywordVerdict::Blacklisted(term.clone());
        }
        if let Some(term) = self.whitelist.iter().find(|t| hay.contains(t.as_str())) {
            return KeywordVerdict::Whitelisted(term.clone());
        }
        KeywordVerdict::Greyzone
    }

    pub fn partition(&self, items: Vec<NewsItem>) -> KeywordPartition {
        let mut out = KeywordPartition::default();
        for item in items {
            match self.verdict(&item) {
                KeywordVerdict::Blacklisted(term) => {
                    debug!(target: "relevance", id = %item.short_id(), %term, "blacklisted");
                    out.blacklisted.push(item);
                }
                KeywordVerdict::Whitelisted(term) => {
                    debug!(target: "relevance", id = %item.short_id(), %term, "whitelisted");
                    out.whitelisted.push(item);
                }
                KeywordVerdict::Greyzone => out.greyzone.push(item),
            }
        }
        out
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(DEFAULT_WHITELIST, DEFAULT_BLACKLIST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SourceType;
    use chrono::Utc;

    fn mk(title: &str, content: &str) -> NewsItem {
        NewsItem::new(title, format!("https://x/{title}"), "T", SourceType::Rss, Utc::now())
            .with_content(content)
    }

    #[test]
    fn blacklist_beats_whitelist() {
        let f = KeywordFilter::default();
        let it = mk("Football club adopts machine learning scouting", "");
        assert_eq!(
            f.verdict(&it),
            KeywordVerdict::Blacklisted("football".into())
        );
    }

    #[test]
    fn whitelist_matches_title_or_content_any_case() {
        let f = KeywordFilter::default();
        assert!(matches!(
            f.verdict(&mk("OpenAI ships a new model", "")),
            KeywordVerdict::Whitelisted(_)
        ));
        assert!(matches!(
            f.verdict(&mk("Weekly roundup", "Notes on Deep Learning compilers")),
            KeywordVerdict::Whitelisted(_)
        ));
        assert!(matches!(
            f.verdict(&mk("国产大模型再次刷新榜单", "")),
            KeywordVerdict::Whitelisted(_)
        ));
        assert!(matches!(
            f.verdict(&mk("AI chips get cheaper", "")),
            KeywordVerdict::Whitelisted(_)
        ));
    }

    #[test]
    fn padded_terms_avoid_substring_noise() {
        let f = KeywordFilter::default();
        // "storage" contains "rag", "selection" contains "election", "said" contains "ai"
        assert_eq!(
            f.verdict(&mk("Storage vendors said selection matters", "")),
            KeywordVerdict::Greyzone
        );
    }

    #[test]
    fn partition_is_complete_and_stable() {
        let f = KeywordFilter::new(["llm"], ["soccer"]);
        let items = vec![
            mk("LLM one", ""),
            mk("plain one", ""),
            mk("soccer llm", ""),
            mk("LLM two", ""),
            mk("plain two", ""),
        ];
        let p = f.partition(items);
        assert_eq!(
            p.whitelisted.iter().map(|i| i.title.as_str()).collect::<Vec<_>>(),
            vec!["LLM one", "LLM two"]
        );
        assert_eq!(
            p.greyzone.iter().map(|i| i.title.as_str()).collect::<Vec<_>>(),
            vec!["plain one", "plain two"]
        );
        assert_eq!(p.blacklisted.len(), 1);
    }

    #[test]
    fn blank_terms_are_ignored() {
        let f = KeywordFilter::new(["", "  "], Vec::<String>::new());
        assert_eq!(f.verdict(&mk("anything", "")), KeywordVerdict::Greyzone);
    }
}
