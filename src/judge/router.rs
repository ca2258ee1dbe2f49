// src/judge/router.rs
//! Multi-provider routing.
//!
//! - `primary`: always the first provider.
//! - `fallback`: first provider, second one if the first fails.
//! - `round_robin`: rotate providers per call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

use super::{DynLlmClient, JudgeError, LlmClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    Primary,
    #[default]
    Fallback,
    RoundRobin,
}

pub struct LlmRouter {
    clients: Vec<DynLlmClient>,
    strategy: RouteStrategy,
    cursor: AtomicUsize,
}

impl LlmRouter {
    /// `None` when there is no client to route to.
    pub fn new(clients: Vec<DynLlmClient>, strategy: RouteStrategy) -> Option<Self> {
        if clients.is_empty() {
            return None;
        }
        Some(Self {
            clients,
            strategy,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn strategy(&self) -> RouteStrategy {
        self.strategy
    }
}

#[async_trait]
impl LlmClient for LlmRouter {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, JudgeError> {
        match self.strategy {
            RouteStrategy::Primary => self.clients[0].complete(system, prompt).await,
            RouteStrategy::RoundRobin => {
                let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.clients.len();
                self.clients[i].complete(system, prompt).await
            }
            RouteStrategy::Fallback => match self.clients[0].complete(system, prompt).await {
                Ok(text) => Ok(text),
                Err(e) if self.clients.len() >= 2 => {
                    warn!(
                        target: "judge",
                        primary = self.clients[0].provider_name(),
                        secondary = self.clients[1].provider_name(),
                        error = %e,
                        "primary provider failed, trying secondary"
                    );
                    self.clients[1].complete(system, prompt).await
                }
                Err(e) => Err(e),
            },
        }
    }

    fn provider_name(&self) -> &str {
        "router"
    }
}
