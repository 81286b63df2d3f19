use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use super::announcement::{ElementId, LiveRegion, Technique};
use crate::error::{Result, TexPilotError};

/// Host surface where announcement elements are mounted and removed.
#[async_trait]
pub trait AnnouncementSurface: Send + Sync {
    async fn mount(&self, region: &LiveRegion) -> Result<()>;

    async fn remove(&self, id: ElementId) -> Result<()>;
}

/// Headless surface that emits announcements as log events.
#[derive(Debug, Default)]
pub struct LogSurface;

#[async_trait]
impl AnnouncementSurface for LogSurface {
    async fn mount(&self, region: &LiveRegion) -> Result<()> {
        // Fanned-out copies of the same message would repeat in the log.
        if matches!(
            region.technique,
            Technique::LiveRegion | Technique::AssertiveRegion
        ) {
            info!(
                role = region.role.as_str(),
                live = region.liveness.as_str(),
                "{}",
                region.text
            );
        }
        Ok(())
    }

    async fn remove(&self, _id: ElementId) -> Result<()> {
        Ok(())
    }
}

/// In-memory surface that hosts can poll for currently mounted regions.
#[derive(Debug, Default)]
pub struct MemorySurface {
    mounted: Mutex<Vec<LiveRegion>>,
    history: Mutex<Vec<LiveRegion>>,
    failing: Mutex<HashSet<Technique>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make mounts of `technique` fail, for hosts that lack it.
    pub fn fail_technique(&self, technique: Technique) {
        self.failing.lock().insert(technique);
    }

    pub fn mounted(&self) -> Vec<LiveRegion> {
        self.mounted.lock().clone()
    }

    pub fn history(&self) -> Vec<LiveRegion> {
        self.history.lock().clone()
    }
}

#[async_trait]
impl AnnouncementSurface for MemorySurface {
    async fn mount(&self, region: &LiveRegion) -> Result<()> {
        if self.failing.lock().contains(&region.technique) {
            return Err(TexPilotError::Announcement(format!(
                "{:?} is not supported by this surface",
                region.technique
            )));
        }
        self.mounted.lock().push(region.clone());
        self.history.lock().push(region.clone());
        Ok(())
    }

    async fn remove(&self, id: ElementId) -> Result<()> {
        self.mounted.lock().retain(|r| r.id != id);
        Ok(())
    }
}
