use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::error::{Result, TexPilotError};

/// Presentation callbacks owned by the host UI.
pub trait Presentation: Send + Sync {
    fn set_output_display(&self, value: &str) -> Result<()>;

    fn set_status(&self, message: &str) -> Result<()>;

    fn clear_output(&self) -> Result<()>;
}

/// Presentation that keeps the latest output and every status message in memory.
#[derive(Debug, Default)]
pub struct BufferedPresentation {
    output: RwLock<String>,
    statuses: RwLock<Vec<String>>,
    clears: AtomicUsize,
    detached: AtomicBool,
}

impl BufferedPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A detached presentation rejects output updates, as a torn-down display would.
    pub fn set_detached(&self, detached: bool) {
        self.detached.store(detached, Ordering::SeqCst);
    }

    pub fn output(&self) -> String {
        self.output.read().clone()
    }

    pub fn status(&self) -> Option<String> {
        self.statuses.read().last().cloned()
    }

    pub fn status_history(&self) -> Vec<String> {
        self.statuses.read().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl Presentation for BufferedPresentation {
    fn set_output_display(&self, value: &str) -> Result<()> {
        if self.detached.load(Ordering::SeqCst) {
            return Err(TexPilotError::Presentation(
                "output display is detached".to_string(),
            ));
        }
        *self.output.write() = value.to_string();
        Ok(())
    }

    fn set_status(&self, message: &str) -> Result<()> {
        self.statuses.write().push(message.to_string());
        Ok(())
    }

    fn clear_output(&self) -> Result<()> {
        self.output.write().clear();
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
