//! Scripted render engine and retry collaborators for tests without a real typesetter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use tex_pilot::engine::{ChunkedRetry, RenderEngine, SimplifiedRetry};
use tex_pilot::error::{Result, TexPilotError};

#[derive(Debug, Clone)]
pub enum Reply {
    /// Echo the input wrapped in a paragraph.
    Echo,
    Output(String),
    Fail(String),
    /// Never resolves.
    Hang,
    /// Sleep, then echo.
    Slow(Duration),
}

impl Reply {
    async fn resolve(&self, input: &str) -> Result<String> {
        match self {
            Self::Echo => Ok(format!("<p>{}</p>", input)),
            Self::Output(out) => Ok(out.clone()),
            Self::Fail(message) => Err(TexPilotError::engine(message.clone())),
            Self::Hang => std::future::pending::<Result<String>>().await,
            Self::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(format!("<p>{}</p>", input))
            }
        }
    }
}

/// Replies in order; the last reply repeats once the script runs out.
#[derive(Debug)]
pub struct Script {
    replies: Vec<Reply>,
    calls: AtomicUsize,
    args: Mutex<Vec<String>>,
}

impl Script {
    pub fn new(replies: Vec<Reply>) -> Self {
        assert!(!replies.is_empty(), "script needs at least one reply");
        Self {
            replies,
            calls: AtomicUsize::new(0),
            args: Mutex::new(Vec::new()),
        }
    }

    async fn next(&self, input: &str, args: &str) -> Result<String> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        self.args.lock().push(args.to_string());
        let reply = self.replies[idx.min(self.replies.len() - 1)].clone();
        reply.resolve(input).await
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_args(&self) -> Vec<String> {
        self.args.lock().clone()
    }

    pub fn assert_called(&self, times: usize) {
        let count = self.call_count();
        assert_eq!(
            count, times,
            "Expected {} calls, but was called {} times",
            times, count
        );
    }
}

pub struct ScriptedEngine(pub Script);

impl ScriptedEngine {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self(Script::new(replies))
    }

    pub fn echo() -> Self {
        Self::new(vec![Reply::Echo])
    }

    pub fn failing(message: &str) -> Self {
        Self::new(vec![Reply::Fail(message.to_string())])
    }
}

#[async_trait]
impl RenderEngine for ScriptedEngine {
    async fn render(&self, input: &str, args: &str) -> Result<String> {
        self.0.next(input, args).await
    }
}

pub struct ScriptedChunked(pub Script);

impl ScriptedChunked {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self(Script::new(replies))
    }
}

#[async_trait]
impl ChunkedRetry for ScriptedChunked {
    async fn process_in_chunks(&self, input: &str, args: &str) -> Result<String> {
        self.0.next(input, args).await
    }
}

pub struct ScriptedSimplified(pub Script);

impl ScriptedSimplified {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self(Script::new(replies))
    }
}

#[async_trait]
impl SimplifiedRetry for ScriptedSimplified {
    async fn attempt_simplified_conversion(
        &self,
        input: &str,
        simplified_args: &str,
    ) -> Result<String> {
        self.0.next(input, simplified_args).await
    }
}
