use std::env;
use std::time::Duration;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Tunable knobs for the session tracker.
///
/// Values are clamped here so downstream timer scheduling never sees an
/// out-of-range interval or threshold.
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// How often the sampler is polled.
    pub poll_interval: Duration,
    /// Seconds without user activity before an idle period starts.
    pub idle_threshold_secs: u64,
    /// Sessions shorter than this are noise and never emitted.
    pub min_activity_duration_secs: u64,
    /// Max gap for absorbing focus flicker into the previous activity.
    pub merge_threshold_secs: u64,
    pub auto_categorize: bool,
    pub auto_merge: bool,
    /// Record idle periods as synthetic activities.
    pub track_idle: bool,
    /// Whether a successful sample counts as user activity. On when the
    /// sampler is the only activity signal; hosts that feed real input
    /// events turn it off.
    pub samples_reset_idle: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            idle_threshold_secs: 300,
            min_activity_duration_secs: 10,
            merge_threshold_secs: 30,
            auto_categorize: true,
            auto_merge: true,
            track_idle: true,
            samples_reset_idle: true,
        }
    }
}

fn env_i64(name: &str) -> Option<i64> {
    env::var(name).ok().and_then(|v| v.parse::<i64>().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| v.parse::<bool>().ok())
}

impl TrackerSettings {
    /// Settings from the environment (a `.env` file is honored), falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut settings = Self::default();
        if let Some(ms) = env_i64("FOCUSLINE_POLL_INTERVAL_MS") {
            settings.poll_interval = Duration::from_millis(ms.max(0) as u64);
        }
        if let Some(secs) = env_i64("FOCUSLINE_IDLE_THRESHOLD_SECS") {
            settings.idle_threshold_secs = secs.max(0) as u64;
        }
        if let Some(secs) = env_i64("FOCUSLINE_MIN_ACTIVITY_SECS") {
            settings.min_activity_duration_secs = secs.max(0) as u64;
        }
        if let Some(secs) = env_i64("FOCUSLINE_MERGE_THRESHOLD_SECS") {
            settings.merge_threshold_secs = secs.max(0) as u64;
        }
        if let Some(v) = env_bool("FOCUSLINE_AUTO_CATEGORIZE") {
            settings.auto_categorize = v;
        }
        if let Some(v) = env_bool("FOCUSLINE_AUTO_MERGE") {
            settings.auto_merge = v;
        }
        if let Some(v) = env_bool("FOCUSLINE_TRACK_IDLE") {
            settings.track_idle = v;
        }
        settings.clamp();
        settings
    }

    pub fn clamp(&mut self) {
        self.poll_interval = self.poll_interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
        self.idle_threshold_secs = self.idle_threshold_secs.max(1);
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(poll_interval) = update.poll_interval {
            self.poll_interval = poll_interval;
        }
        if let Some(secs) = update.idle_threshold_secs {
            self.idle_threshold_secs = secs;
        }
        if let Some(secs) = update.min_activity_duration_secs {
            self.min_activity_duration_secs = secs;
        }
        if let Some(secs) = update.merge_threshold_secs {
            self.merge_threshold_secs = secs;
        }
        if let Some(v) = update.auto_categorize {
            self.auto_categorize = v;
        }
        if let Some(v) = update.auto_merge {
            self.auto_merge = v;
        }
        if let Some(v) = update.track_idle {
            self.track_idle = v;
        }
        if let Some(v) = update.samples_reset_idle {
            self.samples_reset_idle = v;
        }
        self.clamp();
    }
}

/// Partial settings change; unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub poll_interval: Option<Duration>,
    pub idle_threshold_secs: Option<u64>,
    pub min_activity_duration_secs: Option<u64>,
    pub merge_threshold_secs: Option<u64>,
    pub auto_categorize: Option<bool>,
    pub auto_merge: Option<bool>,
    pub track_idle: Option<bool>,
    pub samples_reset_idle: Option<bool>,
}
