use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::models::activity::Activity;
use crate::tracker::ActivitySink;

/// Reference persistence collaborator: one JSON document per line, appended
/// as activities finalize. A merged activity is appended again under its
/// original id; consumers reading the log keep the last record per id.
pub struct JsonlStore {
    file: File,
}

impl JsonlStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
        Ok(Self { file })
    }
}

impl ActivitySink for JsonlStore {
    fn on_activity(&mut self, activity: &Activity) {
        // Storage trouble must not take the tracker down with it.
        let line = match serde_json::to_string(activity) {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to serialize activity {}: {}", activity.id, e);
                return;
            }
        };
        if let Err(e) = writeln!(self.file, "{line}") {
            log::error!("Failed to persist activity {}: {}", activity.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::ActivitySource;
    use chrono::Local;
    use uuid::Uuid;

    #[test]
    fn test_appends_one_line_per_activity() {
        let dir = std::env::temp_dir().join(format!("focusline-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("activities.jsonl");

        let now = Local::now();
        let activity = Activity {
            id: Uuid::new_v4(),
            application_name: "Terminal".to_string(),
            window_title: "cargo".to_string(),
            process_path: None,
            start_time: now,
            end_time: now,
            duration: 0,
            is_coded: false,
            is_idle: false,
            category_id: "development".to_string(),
            category_auto_assigned: true,
            category_confidence: 88,
            source: ActivitySource::Desktop,
        };

        {
            let mut store = JsonlStore::open(&path).unwrap();
            store.on_activity(&activity);
            store.on_activity(&activity);
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Activity = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.id, activity.id);
        assert_eq!(parsed.category_id, "development");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
