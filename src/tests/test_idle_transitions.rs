use chrono::{Duration, Local};

use super::{desktop_tracker, sample};
use crate::config::settings::TrackerSettings;
use crate::models::category::UNCATEGORIZED;
use crate::tracker::session_tracker::TrackerState;

fn input_driven_settings() -> TrackerSettings {
    // Idleness comes from explicit activity signals, as with a real input
    // hook; samples keep flowing while the user is away.
    TrackerSettings {
        samples_reset_idle: false,
        ..Default::default()
    }
}

#[test]
fn test_idle_threshold_crossing_opens_one_idle_session() {
    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(input_driven_settings(), t0);
    tracker.start(t0);
    tracker.handle_user_activity(t0);
    tracker.handle_tick(sample("Terminal", "cargo", t0), t0);

    // Samples keep arriving but no user activity for 301s.
    for secs in [60, 120, 180, 240, 300, 301] {
        let at = t0 + Duration::seconds(secs);
        tracker.handle_tick(sample("Terminal", "cargo", at), at);
    }

    // The active session finalized as non-idle and an idle session opened.
    {
        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert!(!emitted[0].is_idle);
        assert_eq!(emitted[0].application_name, "Terminal");
    }
    assert_eq!(tracker.state(), TrackerState::TrackingIdle);
    let idle_session = tracker.current_activity(t0 + Duration::seconds(301)).unwrap();
    assert!(idle_session.is_idle);
    assert_eq!(idle_session.window_title, "Idle");

    // Edge-triggered: more idle ticks change nothing.
    for secs in [330, 400, 500] {
        let at = t0 + Duration::seconds(secs);
        tracker.handle_tick(sample("Terminal", "cargo", at), at);
    }
    assert_eq!(emitted.lock().unwrap().len(), 1);
    assert_eq!(tracker.state(), TrackerState::TrackingIdle);
}

#[test]
fn test_activity_signal_closes_idle_session() {
    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(input_driven_settings(), t0);
    tracker.start(t0);
    tracker.handle_user_activity(t0);
    tracker.handle_tick(sample("Terminal", "cargo", t0), t0);

    let t400 = t0 + Duration::seconds(400);
    tracker.handle_tick(sample("Terminal", "cargo", t400), t400);
    assert_eq!(tracker.state(), TrackerState::TrackingIdle);

    let t500 = t0 + Duration::seconds(500);
    tracker.handle_user_activity(t500);
    assert_eq!(tracker.state(), TrackerState::Tracking);

    let emitted = emitted.lock().unwrap();
    assert_eq!(emitted.len(), 2);
    let idle = &emitted[1];
    assert!(idle.is_idle);
    assert_eq!(idle.application_name, "System");
    // Idle time is never categorized.
    assert_eq!(idle.category_id, UNCATEGORIZED);
    assert_eq!(idle.category_confidence, 100);
    // The idle span starts when activity ceased, not when it was noticed.
    assert_eq!(idle.start_time, t0);
    assert_eq!(idle.duration, 500);
}

#[test]
fn test_sampling_gap_recorded_as_idle_span() {
    // Default desktop mode: every successful sample counts as activity, so
    // idleness shows up as a gap in sampling (system asleep).
    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(TrackerSettings::default(), t0);
    tracker.start(t0);

    tracker.handle_tick(sample("Terminal", "cargo", t0), t0);
    let t30 = t0 + Duration::seconds(30);
    tracker.handle_tick(sample("Terminal", "cargo", t30), t30);

    // Machine wakes 10 minutes later; the same tick surfaces the gap as an
    // idle activity and reopens a fresh active session.
    let t630 = t0 + Duration::seconds(630);
    tracker.handle_tick(sample("Terminal", "cargo", t630), t630);
    tracker.stop(t0 + Duration::seconds(660));

    let emitted = emitted.lock().unwrap();
    let idle: Vec<_> = emitted.iter().filter(|a| a.is_idle).collect();
    assert_eq!(idle.len(), 1);
    assert_eq!(idle[0].start_time, t30);
    let active: Vec<_> = emitted.iter().filter(|a| !a.is_idle).collect();
    assert!(!active.is_empty());
}

#[test]
fn test_threshold_update_applies_to_running_tracker() {
    let t0 = Local::now();
    let (mut tracker, _emitted) = desktop_tracker(input_driven_settings(), t0);
    tracker.start(t0);
    tracker.handle_user_activity(t0);
    tracker.handle_tick(sample("Terminal", "cargo", t0), t0);

    // 2 minutes of silence is not idle under the default 300s threshold...
    let t120 = t0 + Duration::seconds(120);
    tracker.handle_tick(sample("Terminal", "cargo", t120), t120);
    assert_eq!(tracker.state(), TrackerState::Tracking);

    // ...but becomes idle immediately once the threshold drops.
    tracker.update_settings(crate::config::settings::SettingsUpdate {
        idle_threshold_secs: Some(60),
        ..Default::default()
    });
    let t121 = t0 + Duration::seconds(121);
    tracker.handle_tick(sample("Terminal", "cargo", t121), t121);
    assert_eq!(tracker.state(), TrackerState::TrackingIdle);
}

#[test]
fn test_idle_tracking_disabled_still_splits_sessions() {
    let settings = TrackerSettings {
        track_idle: false,
        samples_reset_idle: false,
        ..Default::default()
    };
    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(settings, t0);
    tracker.start(t0);
    tracker.handle_user_activity(t0);
    tracker.handle_tick(sample("Terminal", "cargo", t0), t0);

    let t400 = t0 + Duration::seconds(400);
    tracker.handle_tick(sample("Terminal", "cargo", t400), t400);

    // The active session still ends, but no synthetic idle session opens.
    assert_eq!(emitted.lock().unwrap().len(), 1);
    assert!(tracker.current_activity(t400).is_none());
}
