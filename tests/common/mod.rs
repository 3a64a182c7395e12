// Shared fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use casegen::auth::Clock;
use casegen::llm::client::LlmClient;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Replies with canned answers in order and records every prompt it sees.
pub struct CannedClient {
    replies: Mutex<VecDeque<anyhow::Result<String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl CannedClient {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    /// First reply succeeds, the second fails with `error`.
    pub fn then_fail(first: &str, error: &str) -> Arc<Self> {
        let mut replies = VecDeque::new();
        replies.push_back(Ok(first.to_string()));
        replies.push_back(Err(anyhow::anyhow!(error.to_string())));
        Arc::new(Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: &str) -> Arc<Self> {
        let replies = VecDeque::from(vec![Err(anyhow::anyhow!(error.to_string()))]);
        Arc::new(Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for CannedClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("no canned reply left")))
    }
}

/// Clock the test moves by hand.
#[derive(Clone)]
pub struct ManualClock(pub Arc<AtomicI64>);

impl ManualClock {
    pub fn at(now: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now)))
    }

    pub fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub const TEN_CASES: &str = "1. adds two positives\n2. adds negatives\n3. adds zero\n4. large ints\n5. floats\n6. strings\n7. None\n8. lists\n9. overflow\n10. commutativity";
