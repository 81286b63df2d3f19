use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::NotifierConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Status,
    Alert,
    Log,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Alert => "alert",
            Self::Log => "log",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    Off,
    Polite,
    Assertive,
}

impl Liveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// How a message is exposed to assistive technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    /// Single region using the caller's role and liveness.
    LiveRegion,
    /// Region carrying `aria-live="assertive"`.
    AssertiveRegion,
    /// Region with `role="status"`.
    StatusRegion,
    /// Focusable, dismissible control that takes focus.
    FocusedControl,
}

impl Technique {
    pub const HIGH_PRIORITY: [Technique; 3] = [
        Technique::AssertiveRegion,
        Technique::StatusRegion,
        Technique::FocusedControl,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "announce-{}", self.0.simple())
    }
}

/// Per-call overrides; unset fields fall back to `NotifierConfig`.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementOptions {
    pub role: Option<Role>,
    pub liveness: Option<Liveness>,
    pub timeout_ms: Option<u64>,
    pub prefix: Option<String>,
    pub priority: Option<Priority>,
}

impl AnnouncementOptions {
    pub fn high_priority() -> Self {
        Self {
            priority: Some(Priority::High),
            ..Default::default()
        }
    }

    pub fn resolve(&self, defaults: &NotifierConfig) -> ResolvedOptions {
        ResolvedOptions {
            role: self.role.unwrap_or(defaults.role),
            liveness: self.liveness.unwrap_or(defaults.liveness),
            timeout: Duration::from_millis(self.timeout_ms.unwrap_or(defaults.timeout_ms)),
            prefix: self.prefix.clone().or_else(|| defaults.prefix.clone()),
            priority: self.priority.unwrap_or(defaults.priority),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub role: Role,
    pub liveness: Liveness,
    pub timeout: Duration,
    pub prefix: Option<String>,
    pub priority: Priority,
}

impl ResolvedOptions {
    pub fn techniques(&self) -> Vec<Technique> {
        match self.priority {
            Priority::High => Technique::HIGH_PRIORITY.to_vec(),
            Priority::Low | Priority::Normal => vec![Technique::LiveRegion],
        }
    }

    pub fn compose(&self, message: &str) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}: {}", prefix, message),
            _ => message.to_string(),
        }
    }
}

/// One mounted announcement element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveRegion {
    pub id: ElementId,
    pub technique: Technique,
    pub role: Role,
    pub liveness: Liveness,
    pub text: String,
}

impl LiveRegion {
    pub fn new(technique: Technique, options: &ResolvedOptions, text: impl Into<String>) -> Self {
        let (role, liveness) = match technique {
            Technique::LiveRegion => (options.role, options.liveness),
            Technique::AssertiveRegion => (Role::Alert, Liveness::Assertive),
            Technique::StatusRegion => (Role::Status, Liveness::Polite),
            Technique::FocusedControl => (Role::Alert, Liveness::Assertive),
        };
        Self {
            id: ElementId::new(),
            technique,
            role,
            liveness,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_defaults() {
        let resolved = AnnouncementOptions::default().resolve(&NotifierConfig::default());
        assert_eq!(resolved.role, Role::Status);
        assert_eq!(resolved.liveness, Liveness::Polite);
        assert_eq!(resolved.priority, Priority::Normal);
        assert_eq!(resolved.timeout, Duration::from_millis(5000));
        assert_eq!(resolved.techniques(), vec![Technique::LiveRegion]);
    }

    #[test]
    fn test_high_priority_fans_out() {
        let resolved = AnnouncementOptions::high_priority().resolve(&NotifierConfig::default());
        assert_eq!(resolved.techniques().len(), 3);
    }

    #[test]
    fn test_compose_with_prefix() {
        let options = AnnouncementOptions {
            prefix: Some("Conversion error".to_string()),
            ..Default::default()
        };
        let resolved = options.resolve(&NotifierConfig::default());
        assert_eq!(resolved.compose("bad"), "Conversion error: bad");
    }
}
