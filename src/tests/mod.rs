//! End-to-end scenarios driving the tracker state machine through its
//! public surface, with a capturing sink in place of real storage.

mod test_categorization;
mod test_idle_transitions;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

use crate::config::settings::TrackerSettings;
use crate::engine::rules::RuleEngine;
use crate::models::activity::{Activity, ActivitySource, Sample};
use crate::tracker::ActivitySink;
use crate::tracker::session_tracker::SessionTracker;

type Emitted = Arc<Mutex<Vec<Activity>>>;

fn capture() -> (Emitted, Box<dyn ActivitySink>) {
    let emitted: Emitted = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&emitted);
    let sink = Box::new(move |activity: &Activity| {
        writer.lock().unwrap().push(activity.clone());
    });
    (emitted, sink)
}

fn desktop_tracker(settings: TrackerSettings, now: DateTime<Local>) -> (SessionTracker, Emitted) {
    let (emitted, sink) = capture();
    let tracker = SessionTracker::new(settings, RuleEngine::with_defaults(), sink, ActivitySource::Desktop, now);
    (tracker, emitted)
}

fn sample(app: &str, title: &str, at: DateTime<Local>) -> Option<Sample> {
    Some(Sample::new(app, title, at))
}
