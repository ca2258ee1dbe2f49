// src/config.rs
//! Curation configuration: one TOML file, every field defaulted.
//!
//! Resolution order: `$CURATION_CONFIG_PATH`, then `config/curation.toml`, then built-in
//! defaults. `CURATION_MAX_COUNT` and `CURATION_FUZZY_THRESHOLD` override the file.

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::classify::{default_rules, CategoryRule, DEFAULT_CLASSIFY_BATCH_SIZE};
use crate::dedup::DEFAULT_FUZZY_THRESHOLD;
use crate::judge::RouteStrategy;
use crate::relevance::judgment::DEFAULT_JUDGMENT_BATCH_SIZE;
use crate::relevance::keyword::{DEFAULT_BLACKLIST, DEFAULT_WHITELIST};
use crate::scoring::ScoringWeights;
use crate::select::SelectionPolicy;

// --- env defaults & names ---
pub const DEFAULT_CURATION_CONFIG_PATH: &str = "config/curation.toml";
pub const ENV_CURATION_CONFIG_PATH: &str = "CURATION_CONFIG_PATH";
pub const ENV_MAX_COUNT: &str = "CURATION_MAX_COUNT";
pub const ENV_FUZZY_THRESHOLD: &str = "CURATION_FUZZY_THRESHOLD";

/// Upper bound for every judge timeout (one day).
pub const MAX_JUDGE_TIMEOUT_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub fuzzy_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub batch_size: usize,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_JUDGMENT_BATCH_SIZE,
            whitelist: DEFAULT_WHITELIST.iter().map(|t| t.to_string()).collect(),
            blacklist: DEFAULT_BLACKLIST.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub batch_size: usize,
    pub rules: Vec<CategoryRule>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_CLASSIFY_BATCH_SIZE,
            rules: default_rules(),
        }
    }
}

/// One OpenAI-compatible endpoint. The key is read from `api_key_env` at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub name: String,
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
}

impl ProviderSettings {
    fn new(name: &str, base_url: &str, model: &str, api_key_env: &str) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            model: model.into(),
            api_key_env: api_key_env.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub enabled: bool,
    pub strategy: RouteStrategy,
    pub concurrency: usize,
    pub batch_timeout_secs: u64,
    /// Shared by the relevance and classification layers.
    pub run_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub providers: Vec<ProviderSettings>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: RouteStrategy::Fallback,
            concurrency: 3,
            batch_timeout_secs: 45,
            run_timeout_secs: 240,
            request_timeout_secs: 40,
            providers: vec![
                ProviderSettings::new(
                    "qwen",
                    "https://dashscope.aliyuncs.com/compatible-mode/v1",
                    "qwen-plus",
                    "QWEN_API_KEY",
                ),
                ProviderSettings::new(
                    "zhipu",
                    "https://open.bigmodel.cn/api/paas/v4",
                    "glm-4-flash",
                    "ZHIPU_API_KEY",
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    pub dedup: DedupConfig,
    pub relevance: RelevanceConfig,
    pub classify: ClassifyConfig,
    pub scoring: ScoringWeights,
    pub selection: SelectionPolicy,
    pub judge: JudgeConfig,
}

impl CurationConfig {
    /// Parse and validate a TOML document. No env overrides.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: CurationConfig = toml::from_str(s).context("parsing curation config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading curation config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// `$CURATION_CONFIG_PATH` (must exist), else `config/curation.toml` if present,
    /// else defaults. Env overrides are applied last.
    pub fn load_default() -> anyhow::Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CURATION_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_CURATION_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from_file(&pb)?
        } else {
            let pb = PathBuf::from(DEFAULT_CURATION_CONFIG_PATH);
            if pb.exists() {
                Self::load_from_file(&pb)?
            } else {
                info!(target: "pipeline", "no config file found, using built-in defaults");
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Unparsable or out-of-range values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(ENV_MAX_COUNT) {
            match parse_max_count_env(Some(raw.clone())) {
                Some(n) => self.selection.max_count = n,
                None => warn!(target: "pipeline", value = %raw, "ignoring invalid {ENV_MAX_COUNT}"),
            }
        }
        if let Ok(raw) = std::env::var(ENV_FUZZY_THRESHOLD) {
            match parse_threshold_env(Some(raw.clone())) {
                Some(t) => self.dedup.fuzzy_threshold = t,
                None => warn!(target: "pipeline", value = %raw, "ignoring invalid {ENV_FUZZY_THRESHOLD}"),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let t = self.dedup.fuzzy_threshold;
        if !(t > 0.0 && t <= 1.0) {
            bail!("dedup.fuzzy_threshold must be in (0, 1], got {t}");
        }
        if self.relevance.batch_size == 0 {
            bail!("relevance.batch_size must be positive");
        }
        if self.classify.batch_size == 0 {
            bail!("classify.batch_size must be positive");
        }
        if self.selection.max_count == 0 {
            bail!("selection.max_count must be positive");
        }
        for (name, share) in [
            ("selection.source_type_share", self.selection.source_type_share),
            ("selection.category_share", self.selection.category_share),
        ] {
            if !(0.0..=1.0).contains(&share) {
                bail!("{name} must be in [0, 1], got {share}");
            }
        }
        if self.selection.max_per_source == 0 {
            bail!("selection.max_per_source must be positive");
        }
        let w = &self.scoring;
        if !(w.recency_horizon_hours.is_finite() && w.recency_horizon_hours > 0.0) {
            bail!("scoring.recency_horizon_hours must be positive");
        }
        if self.judge.concurrency == 0 {
            bail!("judge.concurrency must be positive");
        }
        for (name, secs) in [
            ("judge.batch_timeout_secs", self.judge.batch_timeout_secs),
            ("judge.run_timeout_secs", self.judge.run_timeout_secs),
            ("judge.request_timeout_secs", self.judge.request_timeout_secs),
        ] {
            if secs == 0 || secs > MAX_JUDGE_TIMEOUT_SECS {
                bail!("{name} must be in 1..={MAX_JUDGE_TIMEOUT_SECS}, got {secs}");
            }
        }
        for p in &self.judge.providers {
            if p.name.trim().is_empty() || p.base_url.trim().is_empty() || p.model.trim().is_empty()
            {
                bail!("judge provider entries need name, base_url and model");
            }
        }
        Ok(())
    }
}

fn parse_max_count_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|t| *t > 0.0 && *t <= 1.0)
}
