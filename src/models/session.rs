use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::models::activity::{Activity, ActivitySource, Sample};

/// An in-progress, not-yet-finalized candidate activity.
///
/// Owned exclusively by the session tracker: created on a boundary decision,
/// finalized into an [`Activity`] when the focus period ends. At most one
/// session is open per tracker at any time.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub app_name: String,
    pub window_title: String,
    pub process_path: Option<String>,
    pub url: Option<String>,
    pub start_time: DateTime<Local>,
    pub is_idle: bool,
    pub category_id: String,
    pub category_auto_assigned: bool,
    pub category_confidence: u8,
}

impl Session {
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            id: Uuid::new_v4(),
            app_name: sample.app_name.clone(),
            window_title: sample.window_title.clone(),
            process_path: sample.process_path.clone(),
            url: sample.url.clone(),
            start_time: sample.timestamp,
            is_idle: false,
            category_id: crate::models::category::UNCATEGORIZED.to_string(),
            category_auto_assigned: true,
            category_confidence: 50,
        }
    }

    /// Synthetic session covering a period without user activity
    /// ("Idle", "Screen Locked"). Never categorized.
    pub fn synthetic_idle(title: &str, since: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            app_name: "System".to_string(),
            window_title: title.to_string(),
            process_path: None,
            url: None,
            start_time: since,
            is_idle: true,
            category_id: crate::models::category::UNCATEGORIZED.to_string(),
            category_auto_assigned: true,
            category_confidence: 100,
        }
    }

    pub fn duration_secs(&self, now: DateTime<Local>) -> i64 {
        now.signed_duration_since(self.start_time).num_seconds().max(0)
    }

    /// Close the session at `now`, producing the immutable activity record.
    /// `window_title` is the display title, which may differ from the raw
    /// session title for browser-sourced sessions.
    pub fn finalize(self, now: DateTime<Local>, source: ActivitySource, window_title: String) -> Activity {
        let end_time = now.max(self.start_time);
        Activity {
            id: self.id,
            application_name: self.app_name,
            window_title,
            process_path: self.process_path,
            start_time: self.start_time,
            end_time,
            duration: end_time.signed_duration_since(self.start_time).num_seconds(),
            is_coded: false,
            is_idle: self.is_idle,
            category_id: self.category_id,
            category_auto_assigned: self.category_auto_assigned,
            category_confidence: self.category_confidence,
            source,
        }
    }
}
