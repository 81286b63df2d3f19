//! Debounced conversion of an input stream through a fully wired host.

mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use fixtures::documents::BASIC;
use fixtures::mock_engine::{Reply, ScriptedEngine};
use tex_pilot::complexity::StrategyPreferences;
use tex_pilot::config::TexPilotConfig;
use tex_pilot::conversion::ConversionStatus;
use tex_pilot::engine::RenderEngine;
use tex_pilot::host::{Host, HostOptions};
use tex_pilot::notification::MemorySurface;
use tex_pilot::scheduler::ScheduleDecision;

fn host_with(config: TexPilotConfig, engine: Arc<ScriptedEngine>) -> Host {
    let options = HostOptions {
        engine: Some(engine as Arc<dyn RenderEngine>),
        surface: Arc::new(MemorySurface::new()),
        preferences: StrategyPreferences::default(),
        disabled: Vec::new(),
    };
    Host::new(config, options)
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_burst_converts_once() {
    let engine = Arc::new(ScriptedEngine::echo());
    let host = host_with(TexPilotConfig::default(), engine.clone());

    let mut text = String::from("Hello");
    for _ in 0..5 {
        text.push_str(" $x$");
        host.submit(text.clone());
        advance(150).await;
    }
    engine.0.assert_called(0);

    advance(800).await;
    engine.0.assert_called(1);
    assert_eq!(host.presentation().output(), format!("<p>{}</p>", text));
    assert_eq!(host.scheduler().stats().triggers, 5);
    assert!(matches!(
        host.pipeline().last_record().map(|r| r.status),
        Some(ConversionStatus::Succeeded)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_conversion_waits_for_debounce() {
    let engine = Arc::new(ScriptedEngine::echo());
    let host = host_with(TexPilotConfig::default(), engine.clone());

    host.submit(BASIC);
    advance(799).await;
    engine.0.assert_called(0);

    advance(2).await;
    engine.0.assert_called(1);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_input_skips_conversion() {
    let engine = Arc::new(ScriptedEngine::echo());
    let host = host_with(TexPilotConfig::default(), engine.clone());

    host.submit(BASIC);
    advance(900).await;
    engine.0.assert_called(1);
    assert!(!host.presentation().output().is_empty());

    assert_eq!(host.submit(""), ScheduleDecision::ClearedEmpty);
    assert!(host.presentation().output().is_empty());
    advance(2_000).await;
    engine.0.assert_called(1);
}

#[tokio::test(start_paused = true)]
async fn test_large_deletion_uses_fast_debounce() {
    let engine = Arc::new(ScriptedEngine::echo());
    let host = host_with(TexPilotConfig::default(), engine.clone());

    host.submit("x".repeat(2_000));
    advance(900).await;
    engine.0.assert_called(1);

    let decision = host.submit("short");
    assert!(matches!(
        decision,
        ScheduleDecision::Scheduled { delay, .. } if delay == Duration::from_millis(100)
    ));
    advance(101).await;
    engine.0.assert_called(2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_conversion_is_single_flight() {
    let engine = Arc::new(ScriptedEngine::new(vec![Reply::Slow(Duration::from_secs(3))]));
    let host = host_with(TexPilotConfig::default(), engine.clone());

    host.submit("first $a$");
    advance(900).await;
    engine.0.assert_called(1);
    assert!(host.scheduler().snapshot().in_progress);

    host.submit("second $b$");
    advance(1_000).await;
    // Still running: the second trigger was re-armed instead of overlapping.
    engine.0.assert_called(1);
    assert!(host.scheduler().stats().reschedules >= 1);

    advance(3_000).await;
    engine.0.assert_called(2);
    assert_eq!(host.presentation().output(), "<p>first $a$</p>");

    advance(3_000).await;
    assert_eq!(host.presentation().output(), "<p>second $b$</p>");
}

#[tokio::test(start_paused = true)]
async fn test_stuck_conversion_is_reset_then_recovers() {
    let mut config = TexPilotConfig::default();
    // Keep the engine timeout out of the way so only the watchdog can end the run.
    config.complexity.default_timeout_ms = 600_000;
    let engine = Arc::new(ScriptedEngine::new(vec![Reply::Hang, Reply::Echo]));
    let host = host_with(config, engine.clone());

    host.submit("stuck $a$");
    advance(900).await;
    assert!(host.scheduler().snapshot().in_progress);

    host.submit("queued $b$");
    advance(16_000).await;

    let stats = host.scheduler().stats();
    assert_eq!(stats.watchdog_resets, 1);
    let snapshot = host.scheduler().snapshot();
    assert!(!snapshot.in_progress);
    assert!(!snapshot.is_queued);
    assert!(
        host.presentation()
            .status()
            .is_some_and(|s| s.contains("was reset"))
    );
    // The queued trigger was dropped along with the stuck run.
    engine.0.assert_called(1);

    host.submit("fresh $c$");
    advance(900).await;
    engine.0.assert_called(2);
    assert_eq!(host.presentation().output(), "<p>fresh $c$</p>");
}

#[tokio::test(start_paused = true)]
async fn test_engine_failure_is_reported_through_scheduler() {
    let engine = Arc::new(ScriptedEngine::failing("Unknown command \\foo"));
    let host = host_with(TexPilotConfig::default(), engine.clone());

    host.submit("\\foo{bar}");
    advance(900).await;

    let record = host.pipeline().last_record().expect("conversion ran");
    let ConversionStatus::Failed { report } = record.status else {
        panic!("unknown commands are not retried");
    };
    assert!(report.user_message.contains("Unknown LaTeX command"));
    assert!(host.presentation().output().contains("conversion-error"));
    assert!(!host.scheduler().snapshot().in_progress);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_input_mid_conversion_leaves_output_empty() {
    let engine = Arc::new(ScriptedEngine::new(vec![Reply::Slow(Duration::from_secs(2))]));
    let host = host_with(TexPilotConfig::default(), engine.clone());

    host.submit("hello $x$");
    advance(900).await;
    assert!(host.scheduler().snapshot().in_progress);

    assert_eq!(host.submit(""), ScheduleDecision::ClearedEmpty);
    assert!(!host.scheduler().snapshot().in_progress);

    advance(5_000).await;
    assert_eq!(host.presentation().output(), "");
    engine.0.assert_called(1);
}

#[tokio::test(start_paused = true)]
async fn test_direct_run_discards_result_when_input_cleared() {
    let engine = Arc::new(ScriptedEngine::new(vec![Reply::Slow(Duration::from_secs(2))]));
    let host = host_with(TexPilotConfig::default(), engine.clone());

    let clear = async {
        advance(500).await;
        host.pipeline().set_input("");
    };
    let (record, ()) = tokio::join!(host.convert_now("hello $x$"), clear);

    assert!(matches!(record.unwrap().status, ConversionStatus::Skipped));
    assert_eq!(host.presentation().output(), "");
}
