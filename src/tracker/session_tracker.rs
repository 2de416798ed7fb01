use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::settings::{SettingsUpdate, TrackerSettings};
use crate::engine::rules::RuleEngine;
use crate::models::activity::{Activity, ActivitySource, Sample};
use crate::models::session::Session;
use crate::tracker::ActivitySink;
use crate::tracker::idle::{IdleDetector, IdleTransition};
use crate::tracker::normalize;

const IDLE_TITLE: &str = "Idle";
const LOCKED_TITLE: &str = "Screen Locked";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Stopped,
    /// Tracking with an active (or no) session open.
    Tracking,
    /// Tracking, but the user is idle; a synthetic idle session may be open.
    TrackingIdle,
    Paused,
}

/// Running counters over everything this tracker has emitted.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TrackerStats {
    pub total_tracked_secs: i64,
    pub total_idle_secs: i64,
    pub activities_logged: u64,
    pub productive_secs: i64,
    pub distracting_secs: i64,
}

impl TrackerStats {
    pub fn productivity_score(&self) -> u8 {
        if self.total_tracked_secs > 0 {
            ((self.productive_secs as f64 / self.total_tracked_secs as f64) * 100.0).round() as u8
        } else {
            0
        }
    }
}

/// The session state machine.
///
/// Consumes periodic samples, decides session continuation vs. boundary,
/// applies idle transitions, merges focus flicker, and emits finalized
/// activities through the sink. One tracker instance serves both the desktop
/// poller and an event-driven observer; the drive cadence lives in the
/// caller (see [`TrackerDaemon`]).
///
/// All methods take `now` explicitly, so state transitions are deterministic
/// and directly testable.
///
/// [`TrackerDaemon`]: crate::tracker::daemon::TrackerDaemon
pub struct SessionTracker {
    state: TrackerState,
    settings: TrackerSettings,
    engine: RuleEngine,
    idle: IdleDetector,
    source: ActivitySource,
    current_session: Option<Session>,
    last_emitted: Option<Activity>,
    locked_since: Option<DateTime<Local>>,
    sink: Box<dyn ActivitySink>,
    stats: TrackerStats,
}

impl SessionTracker {
    pub fn new(
        mut settings: TrackerSettings,
        engine: RuleEngine,
        sink: Box<dyn ActivitySink>,
        source: ActivitySource,
        now: DateTime<Local>,
    ) -> Self {
        settings.clamp();
        let idle = IdleDetector::new(settings.idle_threshold_secs, now);
        Self {
            state: TrackerState::Stopped,
            settings,
            engine,
            idle,
            source,
            current_session: None,
            last_emitted: None,
            locked_since: None,
            sink,
            stats: TrackerStats::default(),
        }
    }

    // --- lifecycle ---

    pub fn start(&mut self, now: DateTime<Local>) {
        if !matches!(self.state, TrackerState::Stopped | TrackerState::Paused) {
            return;
        }
        self.idle.record_activity(now);
        self.state = TrackerState::Tracking;
        log::info!("Tracking started");
    }

    /// Finalizes any open session before pausing; the activity (if any) is
    /// emitted before this returns.
    pub fn pause(&mut self, now: DateTime<Local>) {
        if !matches!(self.state, TrackerState::Tracking | TrackerState::TrackingIdle) {
            return;
        }
        self.finalize_current(now);
        self.state = TrackerState::Paused;
        log::info!("Tracking paused");
    }

    pub fn resume(&mut self, now: DateTime<Local>) {
        if self.state != TrackerState::Paused {
            return;
        }
        self.idle.record_activity(now);
        self.state = TrackerState::Tracking;
        log::info!("Tracking resumed");
    }

    pub fn stop(&mut self, now: DateTime<Local>) {
        if self.state == TrackerState::Stopped {
            return;
        }
        self.finalize_current(now);
        self.state = TrackerState::Stopped;
        log::info!("Tracking stopped");
    }

    // --- power / session events ---

    pub fn handle_suspend(&mut self, now: DateTime<Local>) {
        self.pause(now);
    }

    pub fn handle_resume(&mut self, now: DateTime<Local>) {
        self.resume(now);
        self.signal_activity(now);
    }

    pub fn handle_lock(&mut self, now: DateTime<Local>) {
        if matches!(self.state, TrackerState::Tracking | TrackerState::TrackingIdle) {
            self.locked_since = Some(now);
        }
        self.pause(now);
    }

    /// Emits the locked span as a synthetic idle activity, then resumes.
    pub fn handle_unlock(&mut self, now: DateTime<Local>) {
        if let Some(since) = self.locked_since.take() {
            if self.settings.track_idle {
                let locked = Session::synthetic_idle(LOCKED_TITLE, since)
                    .finalize(now, self.source, LOCKED_TITLE.to_string());
                if locked.duration >= self.settings.min_activity_duration_secs as i64 {
                    self.emit(locked);
                }
            }
        }
        self.resume(now);
        self.signal_activity(now);
    }

    // --- per-sample algorithm ---

    /// Process one poll tick. `None` means the sampler saw no focused window
    /// (or failed); the open session, if any, is finalized and nothing else
    /// happens this tick.
    pub fn handle_tick(&mut self, sample: Option<Sample>, now: DateTime<Local>) {
        if !matches!(self.state, TrackerState::Tracking | TrackerState::TrackingIdle) {
            return;
        }
        let Some(sample) = sample else {
            self.finalize_current(now);
            return;
        };

        if let Some(IdleTransition::Start { since }) = self.idle.check(sample.timestamp) {
            self.begin_idle(since, now);
        }

        if self.settings.samples_reset_idle {
            self.signal_activity(sample.timestamp);
        }

        if self.state == TrackerState::TrackingIdle {
            // Idle until an activity signal arrives; samples alone do not
            // advance an idle session.
            return;
        }

        if self.needs_new_session(&sample) {
            self.finalize_current(now);
            self.open_session(&sample);
        }
        // Continuation: duration is derived from start_time, nothing to do.
    }

    /// One user-activity timestamp from the host (input event, unlock, ...).
    pub fn handle_user_activity(&mut self, now: DateTime<Local>) {
        if matches!(self.state, TrackerState::Tracking | TrackerState::TrackingIdle) {
            self.signal_activity(now);
        }
    }

    fn signal_activity(&mut self, now: DateTime<Local>) {
        if let Some(IdleTransition::End { idle_secs }) = self.idle.record_activity(now) {
            log::info!("Idle ended after {}s", idle_secs);
            self.finalize_current(now);
            if self.state == TrackerState::TrackingIdle {
                self.state = TrackerState::Tracking;
            }
        }
    }

    fn begin_idle(&mut self, since: DateTime<Local>, now: DateTime<Local>) {
        log::info!("Idle started; last activity at {}", since.format("%H:%M:%S"));
        self.finalize_current(now);
        if self.settings.track_idle {
            self.current_session = Some(Session::synthetic_idle(IDLE_TITLE, since));
        }
        self.state = TrackerState::TrackingIdle;
    }

    /// A new session is needed when nothing is open, the application
    /// changed, or the normalized title changed. Volatile title churn
    /// (counters, clocks) is not a boundary.
    fn needs_new_session(&self, sample: &Sample) -> bool {
        let Some(session) = &self.current_session else {
            return true;
        };
        if session.app_name != sample.app_name {
            return true;
        }
        normalize::normalize_title(&session.window_title) != normalize::normalize_title(&sample.window_title)
    }

    fn open_session(&mut self, sample: &Sample) {
        let mut session = Session::from_sample(sample);
        if self.settings.auto_categorize {
            if let Some(m) =
                self.engine.match_fields(&session.app_name, &session.window_title, session.url.as_deref())
            {
                session.category_id = m.category_id;
                session.category_confidence = m.confidence;
            }
        }
        log::info!("Started session: {} [{}]", session.app_name, session.category_id);
        self.current_session = Some(session);
    }

    fn display_title(&self, session: &Session) -> String {
        match (&session.url, session.is_idle) {
            (Some(url), false) if self.source == ActivitySource::Browser => format!(
                "{} - {}",
                normalize::clean_browser_title(&session.window_title),
                normalize::extract_domain(url)
            ),
            _ => session.window_title.clone(),
        }
    }

    fn finalize_current(&mut self, now: DateTime<Local>) {
        let Some(session) = self.current_session.take() else {
            return;
        };
        let title = self.display_title(&session);
        let mut activity = session.finalize(now, self.source, title);

        // A manual category recorded while the session was open wins over
        // the automatic assignment.
        if let Some(categorization) = self.engine.categorization(activity.id) {
            if !categorization.auto_assigned {
                activity.category_id = categorization.category_id.clone();
                activity.category_auto_assigned = false;
                activity.category_confidence = 100;
            }
        }

        if self.try_merge(&activity) {
            return;
        }
        if activity.duration < self.settings.min_activity_duration_secs as i64 {
            log::debug!("Dropping short session: {} for {}s", activity.application_name, activity.duration);
            return;
        }
        self.emit(activity);
    }

    /// Absorb rapid flicker between two near-identical focus periods:
    /// when the gap since the last emitted activity is small and both the
    /// application and title match, extend that activity instead of
    /// emitting a new one.
    fn try_merge(&mut self, activity: &Activity) -> bool {
        if !self.settings.auto_merge {
            return false;
        }
        let threshold = self.settings.merge_threshold_secs as i64;
        let (merged, delta) = {
            let Some(prev) = self.last_emitted.as_mut() else {
                return false;
            };
            let gap = activity.start_time.signed_duration_since(prev.end_time).num_seconds();
            let same_focus = prev.application_name == activity.application_name
                && prev.window_title == activity.window_title;
            if prev.is_coded || !same_focus || gap < 0 || gap >= threshold {
                return false;
            }

            let previous_duration = prev.duration;
            prev.end_time = activity.end_time;
            prev.duration = prev.end_time.signed_duration_since(prev.start_time).num_seconds();
            (prev.clone(), prev.duration - previous_duration)
        };

        log::debug!("Merged flicker into {} (+{}s)", merged.application_name, delta);
        self.record_time(&merged, delta);
        self.sink.on_activity(&merged); // same id: the collaborator upserts
        true
    }

    fn emit(&mut self, activity: Activity) {
        self.sink.on_activity(&activity);
        self.stats.activities_logged += 1;
        self.record_time(&activity, activity.duration);
        self.last_emitted = Some(activity);
    }

    fn record_time(&mut self, activity: &Activity, delta_secs: i64) {
        if activity.is_idle {
            self.stats.total_idle_secs += delta_secs;
            return;
        }
        self.stats.total_tracked_secs += delta_secs;
        if let Some(category) = self.engine.category(&activity.category_id) {
            if category.is_productivity {
                self.stats.productive_secs += delta_secs;
            } else {
                self.stats.distracting_secs += delta_secs;
            }
        }
    }

    // --- introspection / configuration ---

    /// Live view of the open session with its running duration.
    pub fn current_activity(&self, now: DateTime<Local>) -> Option<Activity> {
        self.current_session
            .as_ref()
            .map(|session| session.clone().finalize(now, self.source, self.display_title(session)))
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Settings take effect from the next tick; the open session survives.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.settings.apply(update);
        self.idle.set_threshold(self.settings.idle_threshold_secs);
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut RuleEngine {
        &mut self.engine
    }
}
