// src/judge/mock.rs
//! Scriptable in-process judge for tests and offline dry runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{JudgeError, LlmClient};

type Responder = Box<dyn Fn(&str) -> Result<String, JudgeError> + Send + Sync>;

pub struct MockClient {
    name: &'static str,
    responder: Responder,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockClient {
    /// Answer every prompt through `f`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, JudgeError> + Send + Sync + 'static,
    {
        Self {
            name: "mock",
            responder: Box::new(f),
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Same answer every time.
    pub fn always(reply: Result<String, JudgeError>) -> Self {
        Self::from_fn(move |_| reply.clone())
    }

    /// Answers in call order; once exhausted every call fails with `Transport`.
    pub fn scripted(replies: Vec<Result<String, JudgeError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::from_fn(move |_| {
            queue
                .lock()
                .map_err(|_| JudgeError::Transport("mock poisoned".into()))?
                .pop_front()
                .unwrap_or_else(|| Err(JudgeError::Transport("mock script exhausted".into())))
        })
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Sleep before answering (exercises timeouts).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        (self.responder)(prompt)
    }

    fn provider_name(&self) -> &str {
        self.name
    }
}
