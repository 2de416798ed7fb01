use chrono::{Duration, Local};

use super::{desktop_tracker, sample};
use crate::config::settings::TrackerSettings;
use crate::engine::stats::calculate_productivity_stats;
use crate::models::category::{Category, UNCATEGORIZED};

#[test]
fn test_editor_with_github_title_lands_in_development() {
    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(TrackerSettings::default(), t0);
    tracker.start(t0);

    tracker.handle_tick(sample("Visual Studio Code", "repo - GitHub", t0), t0);
    tracker.stop(t0 + Duration::seconds(60));

    let emitted = emitted.lock().unwrap();
    assert_eq!(emitted.len(), 1);
    let activity = &emitted[0];
    assert_eq!(activity.category_id, "development");
    assert!(activity.category_auto_assigned);
    assert!(activity.category_confidence >= 90, "confidence was {}", activity.category_confidence);
}

#[test]
fn test_unknown_app_falls_back_to_uncategorized() {
    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(TrackerSettings::default(), t0);
    tracker.start(t0);

    tracker.handle_tick(sample("qzx-unheard-of", "scratch", t0), t0);
    tracker.stop(t0 + Duration::seconds(60));

    let emitted = emitted.lock().unwrap();
    assert_eq!(emitted[0].category_id, UNCATEGORIZED);
    assert_eq!(emitted[0].category_confidence, 50);
}

#[test]
fn test_manual_override_survives_finalization() {
    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(TrackerSettings::default(), t0);
    tracker.start(t0);
    tracker.handle_tick(sample("Visual Studio Code", "mockups", t0), t0);

    // The user recategorizes the live activity before it finalizes.
    let live = tracker.current_activity(t0).unwrap();
    tracker.engine_mut().manual_override(live.id, "design").unwrap();

    tracker.stop(t0 + Duration::seconds(60));

    let emitted = emitted.lock().unwrap();
    assert_eq!(emitted[0].id, live.id);
    assert_eq!(emitted[0].category_id, "design");
    assert!(!emitted[0].category_auto_assigned);
    assert_eq!(emitted[0].category_confidence, 100);
}

#[test]
fn test_deleting_category_reassigns_everything_to_uncategorized() {
    use crate::models::category::{MatchKind, Rule, RuleKind};

    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(TrackerSettings::default(), t0);

    tracker.engine_mut().upsert_category(Category {
        id: "design-review".to_string(),
        name: "Design Review".to_string(),
        color: "#EC4899".to_string(),
        icon: "palette".to_string(),
        is_productivity: true,
        productivity_score: 90,
        is_default: false,
        order: 20,
    });
    tracker
        .engine_mut()
        .upsert_rule(Rule {
            id: "flowboard".to_string(),
            category_id: "design-review".to_string(),
            kind: RuleKind::App,
            match_kind: MatchKind::Contains,
            app_pattern: Some("flowboard".to_string()),
            title_pattern: None,
            url_pattern: None,
            priority: 95,
            is_enabled: true,
            is_default: false,
            created_at: t0,
        })
        .unwrap();

    tracker.start(t0);
    tracker.handle_tick(sample("flowboard", "sprint board", t0), t0);
    tracker.stop(t0 + Duration::seconds(60));

    let activities = emitted.lock().unwrap().clone();
    assert_eq!(activities[0].category_id, "design-review");
    // Record an in-memory categorization, then delete the category.
    tracker.engine_mut().categorize(&activities[0]);
    tracker.engine_mut().delete_category("design-review").unwrap();

    // Dependent rules and the pending categorization both fell back.
    assert!(tracker.engine().rules().iter().all(|r| r.category_id != "design-review"));
    let categorization = tracker.engine().categorization(activities[0].id).unwrap();
    assert_eq!(categorization.category_id, UNCATEGORIZED);
}

#[test]
fn test_windowed_stats_over_emitted_activities() {
    let t0 = Local::now();
    let (mut tracker, emitted) = desktop_tracker(TrackerSettings::default(), t0);
    tracker.start(t0);

    tracker.handle_tick(sample("Visual Studio Code", "main.rs", t0), t0);
    let t3600 = t0 + Duration::seconds(3600);
    tracker.handle_tick(sample("Spotify", "lofi beats", t3600), t3600);
    tracker.stop(t0 + Duration::seconds(5400));

    let activities = emitted.lock().unwrap().clone();
    let stats = calculate_productivity_stats(tracker.engine_mut(), &activities, None, None);

    assert_eq!(stats.total_time, 5400);
    assert_eq!(stats.productive_time, 3600);
    assert_eq!(stats.distracting_time, 1800);
    assert_eq!(stats.productivity_score, 67);
    assert_eq!(stats.category_breakdown[0].category_id, "development");

    // Live tracker counters agree on the split.
    let tracker_stats = tracker.stats();
    assert_eq!(tracker_stats.total_tracked_secs, 5400);
    assert_eq!(tracker_stats.productive_secs, 3600);
}

#[test]
fn test_categorization_does_not_rerun_on_continuation() {
    let t0 = Local::now();
    let (mut tracker, _emitted) = desktop_tracker(TrackerSettings::default(), t0);
    tracker.start(t0);

    tracker.handle_tick(sample("Visual Studio Code", "main.rs", t0), t0);
    let first = tracker.current_activity(t0).unwrap();

    let t10 = t0 + Duration::seconds(10);
    tracker.handle_tick(sample("Visual Studio Code", "main.rs", t10), t10);
    let second = tracker.current_activity(t10).unwrap();

    // Same session, same id, same categorization on every continuation tick.
    assert_eq!(first.id, second.id);
    assert_eq!(first.category_id, second.category_id);
    assert_eq!(first.category_confidence, second.category_confidence);
}
