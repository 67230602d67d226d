use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::generator::QuestionFetcher;
use crate::generator::error::FetchError;

/// Scripted fetcher for exercising the question source without a network.
/// Replies are served in order; once the script runs out the default reply
/// repeats.
pub struct MockFetcher {
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    default_reply: Option<String>,
    call_count: AtomicU32,
    last_prompt: Mutex<Option<String>>,
}

impl MockFetcher {
    pub fn with_fixed_reply(reply: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: Some(reply.to_string()),
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Every call fails with a network error.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: None,
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn scripted(replies: Vec<Result<String, FetchError>>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            ..Self::failing()
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl QuestionFetcher for MockFetcher {
    fn fetch(&self, prompt: &str) -> Result<String, FetchError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match scripted {
            Some(reply) => reply,
            None => self
                .default_reply
                .clone()
                .ok_or_else(|| FetchError::Network("connection refused".to_string())),
        }
    }
}
