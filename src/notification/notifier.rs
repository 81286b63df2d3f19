use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use super::announcement::{AnnouncementOptions, ElementId, LiveRegion};
use super::surface::AnnouncementSurface;
use crate::config::NotifierConfig;

#[derive(Clone)]
pub struct AccessibilityNotifier {
    config: NotifierConfig,
    surface: Arc<dyn AnnouncementSurface>,
}

impl AccessibilityNotifier {
    pub fn new(config: NotifierConfig, surface: Arc<dyn AnnouncementSurface>) -> Self {
        Self { config, surface }
    }

    /// Announce `message`. Returns false only for an empty message.
    ///
    /// Mount failures are logged per technique and never propagate. Every
    /// mounted element is removed after the resolved timeout.
    pub async fn announce(&self, message: &str, options: &AnnouncementOptions) -> bool {
        if message.trim().is_empty() {
            debug!("Ignoring empty announcement");
            return false;
        }

        let resolved = options.resolve(&self.config);
        let text = resolved.compose(message.trim());
        let regions: Vec<LiveRegion> = resolved
            .techniques()
            .into_iter()
            .map(|technique| LiveRegion::new(technique, &resolved, text.clone()))
            .collect();

        let mounts = regions.iter().map(|region| async move {
            match self.surface.mount(region).await {
                Ok(()) => Some(region.id),
                Err(e) => {
                    warn!(
                        technique = ?region.technique,
                        error = %e,
                        "Announcement technique failed"
                    );
                    None
                }
            }
        });
        let mounted: Vec<ElementId> = join_all(mounts).await.into_iter().flatten().collect();

        debug!(
            mounted = mounted.len(),
            attempted = regions.len(),
            "Announcement delivered"
        );
        for id in mounted {
            self.schedule_removal(id, resolved.timeout);
        }
        true
    }

    fn schedule_removal(&self, id: ElementId, after: Duration) {
        let surface = Arc::clone(&self.surface);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Err(e) = surface.remove(id).await {
                warn!(%id, error = %e, "Failed to remove announcement element");
            }
        });
    }
}
