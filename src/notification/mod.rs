//! Assistive-technology announcements.
//!
//! Provides transient, screen-reader visible notices:
//! - `AnnouncementOptions`: role, liveness, priority, prefix, timeout
//! - `AnnouncementSurface`: where live regions are mounted (`LogSurface`, `MemorySurface`)
//! - `AccessibilityNotifier`: fan-out and self-removal of announcement regions

mod announcement;
mod notifier;
mod surface;

pub use announcement::{
    AnnouncementOptions, ElementId, LiveRegion, Liveness, Priority, ResolvedOptions, Role,
    Technique,
};
pub use notifier::AccessibilityNotifier;
pub use surface::{AnnouncementSurface, LogSurface, MemorySurface};
