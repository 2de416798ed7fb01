use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Local};
use rdev::{EventType, listen};
use tokio::time;

use crate::config::settings::SettingsUpdate;
use crate::tracker::Sampler;
use crate::tracker::session_tracker::SessionTracker;

/// Drives one [`SessionTracker`] from an injected sampler on a cooperative
/// poll loop. No overlapping polls: the next sample is only requested after
/// the previous one has been fully processed.
pub struct TrackerDaemon<S: Sampler> {
    tracker: SessionTracker,
    sampler: S,
    last_input: Option<Arc<Mutex<DateTime<Local>>>>,
    last_seen_input: DateTime<Local>,
}

impl<S: Sampler> TrackerDaemon<S> {
    pub fn new(tracker: SessionTracker, sampler: S) -> Self {
        Self {
            tracker,
            sampler,
            last_input: None,
            last_seen_input: Local::now(),
        }
    }

    /// Watch real input events on a background thread and feed them to the
    /// idle detector instead of counting every successful sample as user
    /// activity.
    pub fn with_input_monitoring(mut self) -> Self {
        let last_input = Arc::new(Mutex::new(Local::now()));
        Self::start_input_monitoring(Arc::clone(&last_input));
        self.tracker.update_settings(SettingsUpdate {
            samples_reset_idle: Some(false),
            ..Default::default()
        });
        self.last_input = Some(last_input);
        self
    }

    fn start_input_monitoring(last_input: Arc<Mutex<DateTime<Local>>>) {
        std::thread::spawn(move || {
            let callback = move |event: rdev::Event| match event.event_type {
                EventType::KeyPress(_)
                | EventType::KeyRelease(_)
                | EventType::ButtonPress(_)
                | EventType::ButtonRelease(_)
                | EventType::MouseMove { .. } => {
                    *last_input.lock().unwrap() = Local::now();
                }
                _ => {}
            };
            if let Err(error) = listen(callback) {
                log::error!("Input event listener failed: {:?}", error);
            }
        });
    }

    /// Poll until `shutdown` is raised. The open session is finalized and
    /// emitted before this returns, so nothing is lost on shutdown.
    pub async fn run(&mut self, shutdown: Arc<AtomicBool>) -> Result<()> {
        log::info!("Starting tracker daemon");
        self.tracker.start(Local::now());

        loop {
            if shutdown.load(Ordering::Relaxed) {
                log::info!("Received shutdown signal, finalizing");
                break;
            }

            if let Some(last_input) = &self.last_input {
                let last = *last_input.lock().unwrap();
                if last > self.last_seen_input {
                    self.last_seen_input = last;
                    self.tracker.handle_user_activity(last);
                }
            }

            // A failed read must never stop polling; it is just an empty tick.
            let sample = match self.sampler.sample().await {
                Ok(sample) => sample,
                Err(e) => {
                    log::warn!("Sampler failed, skipping this tick: {}", e);
                    None
                }
            };
            self.tracker.handle_tick(sample, Local::now());

            // Re-read each tick so interval changes apply without dropping
            // the open session.
            time::sleep(self.tracker.settings().poll_interval).await;
        }

        self.tracker.stop(Local::now());
        Ok(())
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SessionTracker {
        &mut self.tracker
    }
}
