use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which observer produced a sample or activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivitySource {
    Desktop,
    Browser,
}

/// One raw observation of the foreground window at an instant.
/// Ephemeral: samples are consumed by the session tracker and never stored.
#[derive(Debug, Clone)]
pub struct Sample {
    pub app_name: String,
    pub window_title: String,
    pub url: Option<String>,
    pub process_path: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl Sample {
    pub fn new(app_name: impl Into<String>, window_title: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            app_name: app_name.into(),
            window_title: window_title.into(),
            url: None,
            process_path: None,
            timestamp,
        }
    }
}

/// A finalized, immutable record of one focus period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub application_name: String,
    pub window_title: String,
    pub process_path: Option<String>,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub duration: i64, // in seconds
    pub is_coded: bool,
    pub is_idle: bool,
    pub category_id: String,
    pub category_auto_assigned: bool,
    pub category_confidence: u8,
    pub source: ActivitySource,
}
