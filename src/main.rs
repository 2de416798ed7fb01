use std::env;
use std::fs::OpenOptions;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::{Arg, ArgAction, Command};
use dotenvy::dotenv;

use focusline::config::settings::{SettingsUpdate, TrackerSettings};
use focusline::engine::rules::RuleEngine;
use focusline::models::activity::ActivitySource;
use focusline::storage::jsonl::JsonlStore;
use focusline::tracker::daemon::TrackerDaemon;
use focusline::tracker::monitor::AppMonitor;
use focusline::tracker::session_tracker::SessionTracker;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Focusline")
        .version("0.1.0")
        .about("Track and categorize your application usage")
        .arg(
            Arg::new("storage")
                .long("storage")
                .value_name("FILE")
                .help("Activity log file (JSON lines)")
                .default_value("activities.jsonl"),
        )
        .arg(
            Arg::new("idle-threshold")
                .long("idle-threshold")
                .value_name("SECONDS")
                .help("Seconds without input before an idle period starts"),
        )
        .arg(
            Arg::new("poll-interval")
                .long("poll-interval")
                .value_name("MILLISECONDS")
                .help("How often the active window is sampled"),
        )
        .arg(
            Arg::new("min-duration")
                .long("min-duration")
                .value_name("SECONDS")
                .help("Discard activities shorter than this"),
        )
        .arg(
            Arg::new("no-input-monitoring")
                .long("no-input-monitoring")
                .help("Derive idleness from sampling gaps instead of input events")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Load .env file
    dotenv().ok();

    // Debug logging to a file is opt-in via .env
    let debug_enabled = env::var("DEBUG_LOGS_ENABLED")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    if debug_enabled {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open("focusline.log")
            .expect("Failed to open log file");

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("focusline=debug"))
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .init();

        log::info!("=== DEBUG LOGGING ENABLED ===");
        log::info!("Writing logs to focusline.log");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("focusline=info")).init();
    }

    let mut settings = TrackerSettings::from_env();
    let mut update = SettingsUpdate::default();
    if let Some(secs) = matches.get_one::<String>("idle-threshold").and_then(|v| v.parse().ok()) {
        update.idle_threshold_secs = Some(secs);
    }
    if let Some(ms) = matches.get_one::<String>("poll-interval").and_then(|v| v.parse().ok()) {
        update.poll_interval = Some(Duration::from_millis(ms));
    }
    if let Some(secs) = matches.get_one::<String>("min-duration").and_then(|v| v.parse().ok()) {
        update.min_activity_duration_secs = Some(secs);
    }
    settings.apply(update);

    let storage_path = matches.get_one::<String>("storage").expect("has default");
    let store = JsonlStore::open(storage_path)?;
    log::info!("Appending activities to {}", storage_path);

    let tracker = SessionTracker::new(
        settings,
        RuleEngine::with_defaults(),
        Box::new(store),
        ActivitySource::Desktop,
        Local::now(),
    );

    let mut daemon = TrackerDaemon::new(tracker, AppMonitor::new());
    if !matches.get_flag("no-input-monitoring") {
        daemon = daemon.with_input_monitoring();
    }

    // Graceful shutdown: the open session is saved before exit
    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))?;

    daemon.run(shutdown).await?;

    let stats = daemon.tracker().stats();
    println!(
        "Tracked {}s across {} activities ({}s idle), productivity score {}",
        stats.total_tracked_secs,
        stats.activities_logged,
        stats.total_idle_secs,
        stats.productivity_score()
    );

    Ok(())
}
