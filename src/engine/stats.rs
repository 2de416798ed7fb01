use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Local, NaiveDate, Timelike};
use serde::Serialize;

use crate::engine::rules::RuleEngine;
use crate::models::activity::Activity;
use crate::models::category::UNCATEGORIZED;

const TOP_APP_COUNT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub category_id: String,
    pub category_name: String,
    pub color: String,
    pub total_seconds: i64,
    pub percentage: u8,
    pub is_productivity: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppBreakdown {
    pub app_name: String,
    pub category_id: String,
    pub total_seconds: i64,
    pub percentage: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlyBreakdown {
    pub hour: u32, // 0-23
    pub productive_seconds: i64,
    pub distracting_seconds: i64,
    pub uncategorized_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub productivity_score: u8,
    pub total_seconds: i64,
    pub productive_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductivityStats {
    pub total_time: i64,
    pub productive_time: i64,
    pub distracting_time: i64,
    pub uncategorized_time: i64,
    pub productivity_score: u8,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub top_apps: Vec<AppBreakdown>,
    pub hourly_breakdown: Vec<HourlyBreakdown>,
    pub daily_trend: Vec<DailyTrend>,
}

fn percentage(part: i64, whole: i64) -> u8 {
    if whole > 0 {
        ((part as f64 / whole as f64) * 100.0).round() as u8
    } else {
        0
    }
}

/// Aggregate finalized activities into the productivity snapshot consumed by
/// an external stats renderer. Re-categorizes every activity through the
/// engine, so sticky manual overrides are honored; idle activities are
/// excluded from every bucket.
pub fn calculate_productivity_stats(
    engine: &mut RuleEngine,
    activities: &[Activity],
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
) -> ProductivityStats {
    let in_window = |a: &&Activity| {
        if let Some(start) = start {
            if a.start_time < start {
                return false;
            }
        }
        if let Some(end) = end {
            if a.start_time > end {
                return false;
            }
        }
        true
    };

    let mut total_time = 0i64;
    let mut productive_time = 0i64;
    let mut distracting_time = 0i64;
    let mut uncategorized_time = 0i64;

    let mut category_totals: HashMap<String, i64> = HashMap::new();
    let mut app_totals: HashMap<String, (String, i64)> = HashMap::new();
    let mut hourly: [(i64, i64, i64); 24] = [(0, 0, 0); 24];
    let mut daily: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();

    for activity in activities.iter().filter(in_window) {
        if activity.is_idle {
            continue;
        }

        let duration = activity.duration;
        total_time += duration;

        let categorization = engine.categorize(activity);
        // A categorization may outlive its category; fall back like a miss.
        let category = engine.category(&categorization.category_id);
        let category_id = category.map_or(UNCATEGORIZED, |c| c.id.as_str()).to_string();
        let is_productive = category.is_none_or(|c| c.is_productivity);

        *category_totals.entry(category_id.clone()).or_insert(0) += duration;

        let uncategorized = category_id == UNCATEGORIZED;
        if uncategorized {
            uncategorized_time += duration;
        } else if is_productive {
            productive_time += duration;
        } else {
            distracting_time += duration;
        }

        app_totals
            .entry(activity.application_name.clone())
            .and_modify(|(_, seconds)| *seconds += duration)
            .or_insert((category_id.clone(), duration));

        let hour = activity.start_time.hour() as usize;
        if uncategorized {
            hourly[hour].2 += duration;
        } else if is_productive {
            hourly[hour].0 += duration;
        } else {
            hourly[hour].1 += duration;
        }

        let day = daily.entry(activity.start_time.date_naive()).or_insert((0, 0));
        day.1 += duration;
        if is_productive && !uncategorized {
            day.0 += duration;
        }
    }

    // Score over the categorized share of the window; zero when nothing was
    // categorized so an empty or uncategorized-only window never divides by
    // zero.
    let categorized_time = total_time - uncategorized_time;
    let productivity_score = percentage(productive_time, categorized_time);

    let mut category_breakdown: Vec<CategoryBreakdown> = category_totals
        .into_iter()
        .map(|(category_id, seconds)| {
            let category = engine.category(&category_id);
            CategoryBreakdown {
                category_name: category.map_or_else(|| "Unknown".to_string(), |c| c.name.clone()),
                color: category.map_or_else(|| "#9CA3AF".to_string(), |c| c.color.clone()),
                is_productivity: category.is_none_or(|c| c.is_productivity),
                percentage: percentage(seconds, total_time),
                total_seconds: seconds,
                category_id,
            }
        })
        .collect();
    category_breakdown.sort_by_key(|c| std::cmp::Reverse(c.total_seconds));

    let mut top_apps: Vec<AppBreakdown> = app_totals
        .into_iter()
        .map(|(app_name, (category_id, seconds))| AppBreakdown {
            app_name,
            category_id,
            percentage: percentage(seconds, total_time),
            total_seconds: seconds,
        })
        .collect();
    top_apps.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds).then(a.app_name.cmp(&b.app_name)));
    top_apps.truncate(TOP_APP_COUNT);

    let hourly_breakdown = hourly
        .iter()
        .enumerate()
        .map(|(hour, &(productive, distracting, uncategorized))| HourlyBreakdown {
            hour: hour as u32,
            productive_seconds: productive,
            distracting_seconds: distracting,
            uncategorized_seconds: uncategorized,
        })
        .collect();

    let daily_trend = daily
        .into_iter()
        .map(|(date, (productive, total))| DailyTrend {
            date,
            productivity_score: percentage(productive, total),
            total_seconds: total,
            productive_seconds: productive,
        })
        .collect();

    ProductivityStats {
        total_time,
        productive_time,
        distracting_time,
        uncategorized_time,
        productivity_score,
        category_breakdown,
        top_apps,
        hourly_breakdown,
        daily_trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::ActivitySource;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn activity(app: &str, title: &str, start: DateTime<Local>, duration: i64) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            application_name: app.to_string(),
            window_title: title.to_string(),
            process_path: None,
            start_time: start,
            end_time: start + Duration::seconds(duration),
            duration,
            is_coded: false,
            is_idle: false,
            category_id: UNCATEGORIZED.to_string(),
            category_auto_assigned: true,
            category_confidence: 50,
            source: ActivitySource::Desktop,
        }
    }

    fn at(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 11, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_window_scores_zero() {
        let mut engine = RuleEngine::with_defaults();
        let stats = calculate_productivity_stats(&mut engine, &[], None, None);
        assert_eq!(stats.total_time, 0);
        assert_eq!(stats.productivity_score, 0);
    }

    #[test]
    fn test_uncategorized_only_window_scores_zero() {
        let mut engine = RuleEngine::with_defaults();
        let activities = vec![activity("mystery-app", "untitled", at(9), 600)];
        let stats = calculate_productivity_stats(&mut engine, &activities, None, None);
        assert_eq!(stats.total_time, 600);
        assert_eq!(stats.uncategorized_time, 600);
        assert_eq!(stats.productivity_score, 0);
    }

    #[test]
    fn test_productive_and_distracting_split() {
        let mut engine = RuleEngine::with_defaults();
        let activities = vec![
            activity("Visual Studio Code", "main.rs", at(9), 3600),
            activity("Spotify", "playlist", at(10), 1800),
        ];
        let stats = calculate_productivity_stats(&mut engine, &activities, None, None);
        assert_eq!(stats.total_time, 5400);
        assert_eq!(stats.productive_time, 3600);
        assert_eq!(stats.distracting_time, 1800);
        assert_eq!(stats.productivity_score, 67); // 3600/5400

        assert_eq!(stats.hourly_breakdown[9].productive_seconds, 3600);
        assert_eq!(stats.hourly_breakdown[10].distracting_seconds, 1800);
        assert_eq!(stats.daily_trend.len(), 1);
        assert_eq!(stats.daily_trend[0].productivity_score, 67);
    }

    #[test]
    fn test_idle_activities_excluded() {
        let mut engine = RuleEngine::with_defaults();
        let mut idle = activity("System", "Idle", at(12), 1200);
        idle.is_idle = true;
        let activities = vec![activity("Visual Studio Code", "main.rs", at(9), 3600), idle];
        let stats = calculate_productivity_stats(&mut engine, &activities, None, None);
        assert_eq!(stats.total_time, 3600);
        assert_eq!(stats.productivity_score, 100);
    }

    #[test]
    fn test_window_filter_bounds_on_start_time() {
        let mut engine = RuleEngine::with_defaults();
        let activities = vec![
            activity("Visual Studio Code", "early", at(8), 600),
            activity("Visual Studio Code", "late", at(14), 600),
        ];
        let stats = calculate_productivity_stats(&mut engine, &activities, Some(at(10)), Some(at(16)));
        assert_eq!(stats.total_time, 600);
    }

    #[test]
    fn test_manual_override_respected_in_stats() {
        let mut engine = RuleEngine::with_defaults();
        let coding = activity("Visual Studio Code", "main.rs", at(9), 3600);
        engine.manual_override(coding.id, "entertainment").unwrap();
        let stats = calculate_productivity_stats(&mut engine, &[coding], None, None);
        assert_eq!(stats.distracting_time, 3600);
        assert_eq!(stats.productivity_score, 0);
    }

    #[test]
    fn test_top_apps_sorted_and_capped() {
        let mut engine = RuleEngine::with_defaults();
        let mut activities = Vec::new();
        for i in 0..12 {
            activities.push(activity(&format!("app-{i}"), "x", at(9), 100 + i));
        }
        let stats = calculate_productivity_stats(&mut engine, &activities, None, None);
        assert_eq!(stats.top_apps.len(), 10);
        assert_eq!(stats.top_apps[0].app_name, "app-11");
    }
}
