//! Conversion host: the manager the scheduler drives.
//!
//! - `ConversionManager`: input/args sources and the `convert()` entry point
//! - `Presentation`: output and status callbacks (`BufferedPresentation`)
//! - `ConversionPipeline`: assess, render within the sized timeout, recover on failure

mod pipeline;
mod presentation;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use pipeline::{ConversionPipeline, ConversionRecord, ConversionStatus};
pub use presentation::{BufferedPresentation, Presentation};

#[async_trait]
pub trait ConversionManager: Send + Sync + 'static {
    fn input_source(&self) -> String;

    fn args_source(&self) -> String;

    fn presentation(&self) -> Arc<dyn Presentation>;

    async fn convert(&self) -> Result<()>;
}
