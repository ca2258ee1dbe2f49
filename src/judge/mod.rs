// src/judge/mod.rs
//! Judge boundary: the external text-completion service used for batch relevance
//! judgment and classification.
//!
//! - `LlmClient` is the one capability the pipeline needs: prompt in, text out, or a typed failure.
//! - `response` turns free text into verdict lists (code fences, stray prose, wrappers).
//! - `dispatch` runs batches with bounded concurrency, per-batch and run-level deadlines,
//!   and returns results in batch order.
//! - `openai` + `router` are the production implementation; `mock` drives tests.

pub mod dispatch;
pub mod mock;
pub mod openai;
pub mod response;
pub mod router;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::JudgeConfig;

pub use dispatch::{dispatch_batches, DispatchOptions};
pub use mock::MockClient;
pub use openai::OpenAiCompatClient;
pub use response::{parse_verdicts, strip_wrapping, CategoryVerdict, RelevanceVerdict};
pub use router::{LlmRouter, RouteStrategy};

/// System prompt shared by every judge call.
pub const EDITOR_SYSTEM_PROMPT: &str = "You are a professional AI news editor.";

/// Why a judge call produced no usable answer. Every variant is recoverable:
/// callers fail open or fall back.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JudgeError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider `{provider}` answered HTTP {status}")]
    Status { provider: String, status: u16 },
    #[error("judge call timed out")]
    Timeout,
    #[error("judge returned an empty response")]
    EmptyResponse,
    #[error("malformed judge response: {0}")]
    Malformed(String),
}

/// Text-completion capability.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, JudgeError>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &str;
}

/// Convenient alias used by callers.
pub type DynLlmClient = Arc<dyn LlmClient>;

/// Build the production judge from configuration.
///
/// * `enabled == false` → `None` (pipeline runs keyword-only).
/// * Providers whose `api_key_env` is unset or empty are skipped.
/// * No usable provider left → `None`.
pub fn build_llm_client(cfg: &JudgeConfig) -> Option<DynLlmClient> {
    if !cfg.enabled {
        info!(target: "judge", "judge disabled in config");
        return None;
    }

    let timeout = Duration::from_secs(cfg.request_timeout_secs);
    let mut clients: Vec<DynLlmClient> = Vec::new();
    for p in &cfg.providers {
        let key = std::env::var(&p.api_key_env).unwrap_or_default();
        if key.trim().is_empty() {
            info!(target: "judge", provider = %p.name, env = %p.api_key_env, "provider skipped: no api key");
            continue;
        }
        match OpenAiCompatClient::new(p, key.trim().to_string(), timeout) {
            Ok(c) => clients.push(Arc::new(c)),
            Err(e) => warn!(target: "judge", provider = %p.name, error = ?e, "provider skipped"),
        }
    }

    let names: Vec<String> = clients
        .iter()
        .map(|c| c.provider_name().to_string())
        .collect();
    let router = LlmRouter::new(clients, cfg.strategy)?;
    info!(target: "judge", providers = ?names, strategy = ?cfg.strategy, "judge ready");
    Some(Arc::new(router))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JudgeConfig, ProviderSettings};

    #[test]
    fn disabled_config_builds_nothing() {
        let cfg = JudgeConfig {
            enabled: false,
            ..JudgeConfig::default()
        };
        assert!(build_llm_client(&cfg).is_none());
    }

    #[serial_test::serial]
    #[test]
    fn providers_without_keys_are_skipped() {
        std::env::remove_var("CURATOR_TEST_MISSING_KEY");
        let cfg = JudgeConfig {
            enabled: true,
            providers: vec![ProviderSettings {
                name: "nokey".into(),
                base_url: "http://127.0.0.1:9".into(),
                model: "m".into(),
                api_key_env: "CURATOR_TEST_MISSING_KEY".into(),
            }],
            ..JudgeConfig::default()
        };
        assert!(build_llm_client(&cfg).is_none());

        std::env::set_var("CURATOR_TEST_MISSING_KEY", "sk-test");
        let client = build_llm_client(&cfg).expect("one provider configured");
        assert_eq!(client.provider_name(), "router");
        std::env::remove_var("CURATOR_TEST_MISSING_KEY");
    }
}
