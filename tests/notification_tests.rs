use std::sync::Arc;
use std::time::Duration;

use tex_pilot::config::NotifierConfig;
use tex_pilot::notification::{
    AccessibilityNotifier, AnnouncementOptions, Liveness, MemorySurface, Priority, Role, Technique,
};

fn notifier(config: NotifierConfig) -> (AccessibilityNotifier, Arc<MemorySurface>) {
    let surface = Arc::new(MemorySurface::new());
    (AccessibilityNotifier::new(config, surface.clone()), surface)
}

#[tokio::test]
async fn test_config_defaults_apply_to_announcements() {
    let config = NotifierConfig {
        role: Role::Log,
        prefix: Some("LaTeX".to_string()),
        ..Default::default()
    };
    let (notifier, surface) = notifier(config);

    assert!(notifier.announce("  Converted  ", &AnnouncementOptions::default()).await);

    let history = surface.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::Log);
    assert_eq!(history[0].liveness, Liveness::Polite);
    assert_eq!(history[0].text, "LaTeX: Converted");
}

#[tokio::test]
async fn test_call_options_override_config() {
    let config = NotifierConfig {
        prefix: Some("LaTeX".to_string()),
        ..Default::default()
    };
    let (notifier, surface) = notifier(config);
    let options = AnnouncementOptions {
        role: Some(Role::Alert),
        liveness: Some(Liveness::Assertive),
        prefix: Some(String::new()),
        ..Default::default()
    };

    assert!(notifier.announce("Done", &options).await);

    let region = &surface.history()[0];
    assert_eq!(region.role, Role::Alert);
    assert_eq!(region.liveness, Liveness::Assertive);
    assert_eq!(region.text, "Done");
}

#[tokio::test]
async fn test_high_priority_config_fans_out_by_default() {
    let config = NotifierConfig {
        priority: Priority::High,
        ..Default::default()
    };
    let (notifier, surface) = notifier(config);

    assert!(notifier.announce("Out of memory", &AnnouncementOptions::default()).await);

    let techniques: Vec<Technique> = surface.history().iter().map(|r| r.technique).collect();
    assert_eq!(techniques.len(), 3);
    for technique in Technique::HIGH_PRIORITY {
        assert!(techniques.contains(&technique));
    }
    let status = surface
        .history()
        .into_iter()
        .find(|r| r.technique == Technique::StatusRegion)
        .expect("status region mounted");
    assert_eq!(status.role, Role::Status);
}

#[tokio::test]
async fn test_every_technique_failing_still_succeeds() {
    let (notifier, surface) = notifier(NotifierConfig::default());
    for technique in Technique::HIGH_PRIORITY {
        surface.fail_technique(technique);
    }

    assert!(
        notifier
            .announce("Alert", &AnnouncementOptions::high_priority())
            .await
    );
    assert!(surface.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_announcements_expire_independently() {
    let (notifier, surface) = notifier(NotifierConfig::default());

    notifier
        .announce(
            "first",
            &AnnouncementOptions {
                timeout_ms: Some(1000),
                ..Default::default()
            },
        )
        .await;
    notifier
        .announce(
            "second",
            &AnnouncementOptions {
                timeout_ms: Some(3000),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(surface.mounted().len(), 2);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let mounted = surface.mounted();
    assert_eq!(mounted.len(), 1);
    assert_eq!(mounted[0].text, "second");

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert!(surface.mounted().is_empty());
}

#[tokio::test]
async fn test_element_ids_are_unique() {
    let (notifier, surface) = notifier(NotifierConfig::default());
    notifier
        .announce("Alert", &AnnouncementOptions::high_priority())
        .await;

    let history = surface.history();
    assert_ne!(history[0].id, history[1].id);
    assert_ne!(history[1].id, history[2].id);
    assert!(history[0].id.to_string().starts_with("announce-"));
}
