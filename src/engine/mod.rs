//! Contracts for the external typesetting pipeline and its retry strategies.
//!
//! - `RenderEngine`: the full conversion (`render(input, args)`)
//! - `ChunkedRetry`: optional chunk-by-chunk retry after resource exhaustion
//! - `SimplifiedRetry`: optional reduced-feature retry after an engine fault
//! - `CommandEngine`: render engine backed by a shell command

mod args;
mod chunking;
mod command;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use args::simplify_args;
pub use chunking::{ChunkingRenderer, split_into_chunks};
pub use command::CommandEngine;

#[async_trait]
pub trait RenderEngine: Send + Sync {
    async fn render(&self, input: &str, args: &str) -> Result<String>;
}

#[async_trait]
pub trait ChunkedRetry: Send + Sync {
    async fn process_in_chunks(&self, input: &str, args: &str) -> Result<String>;
}

#[async_trait]
pub trait SimplifiedRetry: Send + Sync {
    async fn attempt_simplified_conversion(
        &self,
        input: &str,
        simplified_args: &str,
    ) -> Result<String>;
}

/// Simplified retry that re-runs the engine with the reduced argument set.
pub struct SimplifiedRenderer {
    engine: Arc<dyn RenderEngine>,
}

impl SimplifiedRenderer {
    pub fn new(engine: Arc<dyn RenderEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl SimplifiedRetry for SimplifiedRenderer {
    async fn attempt_simplified_conversion(
        &self,
        input: &str,
        simplified_args: &str,
    ) -> Result<String> {
        self.engine.render(input, simplified_args).await
    }
}
