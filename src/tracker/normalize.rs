use std::sync::LazyLock;

use regex::Regex;

static COUNTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\d+\)").unwrap());
static CLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}(:\d{2})?").unwrap());
static BROWSER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*[-–—|]\s*(Google Chrome|Firefox|Safari|Microsoft Edge|Brave).*$").unwrap());
static LAST_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[-–—|]\s*[^-–—|]*$").unwrap());

/// Strip the volatile parts of a window title so a ticking counter or clock
/// does not fragment one logical session into many: parenthesized counts
/// like `(3)` and clock-like substrings (`9:41`, `12:30:05`) are removed,
/// whitespace is collapsed, and the result is lower-cased.
pub fn normalize_title(title: &str) -> String {
    let title = COUNTER.replace_all(title, "");
    let title = CLOCK.replace_all(&title, "");
    title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Trim browser chrome from a tab title: the trailing browser name and the
/// last separator-delimited segment (usually the site name).
pub fn clean_browser_title(title: &str) -> String {
    let title = BROWSER_SUFFIX.replace(title, "");
    let title = LAST_SEGMENT.replace(&title, "");
    let cleaned = title.trim();
    if cleaned.is_empty() {
        "Untitled".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Host portion of a URL, without a leading `www.`. Not a full URL parser;
/// malformed input degrades to "Unknown".
pub fn extract_domain(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = host.split('@').next_back().unwrap_or("");
    let host = host.split(':').next().unwrap_or("");
    if host.is_empty() {
        return "Unknown".to_string();
    }
    host.strip_prefix("www.").unwrap_or(host).to_string()
}
