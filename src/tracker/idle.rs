use chrono::{DateTime, Duration, Local};

/// Edge-triggered idle state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTransition {
    /// User activity ceased at `since`.
    Start { since: DateTime<Local> },
    /// Activity resumed after `idle_secs` of idleness.
    End { idle_secs: i64 },
}

/// Tracks the last observed user activity and raises idle-start / idle-end
/// transitions against a configurable threshold.
///
/// Purely poll-based: the owner feeds timestamps through [`record_activity`]
/// and calls [`check`] on its own schedule, so the detector can sit behind a
/// poll loop or an event-driven host without changes.
///
/// [`record_activity`]: IdleDetector::record_activity
/// [`check`]: IdleDetector::check
#[derive(Debug)]
pub struct IdleDetector {
    last_activity: DateTime<Local>,
    is_idle: bool,
    threshold: Duration,
}

impl IdleDetector {
    pub fn new(threshold_secs: u64, now: DateTime<Local>) -> Self {
        Self {
            last_activity: now,
            is_idle: false,
            threshold: Duration::seconds(threshold_secs.max(1) as i64),
        }
    }

    /// Feed one user-activity timestamp. Resets the idle clock; when the
    /// detector was idle, emits the idle-end transition with the idle
    /// duration.
    pub fn record_activity(&mut self, now: DateTime<Local>) -> Option<IdleTransition> {
        let transition = if self.is_idle {
            self.is_idle = false;
            Some(IdleTransition::End {
                idle_secs: now.signed_duration_since(self.last_activity).num_seconds().max(0),
            })
        } else {
            None
        };
        if now > self.last_activity {
            self.last_activity = now;
        }
        transition
    }

    /// Compare elapsed time against the threshold. Edge-triggered: at most
    /// one idle-start per idle period, no matter how often this is polled.
    pub fn check(&mut self, now: DateTime<Local>) -> Option<IdleTransition> {
        if !self.is_idle && now.signed_duration_since(self.last_activity) >= self.threshold {
            self.is_idle = true;
            return Some(IdleTransition::Start { since: self.last_activity });
        }
        None
    }

    pub fn is_idle(&self) -> bool {
        self.is_idle
    }

    pub fn last_activity(&self) -> DateTime<Local> {
        self.last_activity
    }

    /// Applies to the next comparison; a threshold of zero is raised to one
    /// second so the detector never flaps on every poll.
    pub fn set_threshold(&mut self, threshold_secs: u64) {
        self.threshold = Duration::seconds(threshold_secs.max(1) as i64);
    }
}
