use regex::RegexBuilder;

use crate::models::category::MatchKind;

/// Outcome of evaluating one pattern against one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    pub matched: bool,
    pub confidence: u8, // 0-100
}

impl PatternMatch {
    pub const MISS: PatternMatch = PatternMatch { matched: false, confidence: 0 };

    pub const fn hit(confidence: u8) -> Self {
        Self { matched: true, confidence }
    }
}

/// Evaluate `pattern` against `text`. Comparison is case-insensitive; callers
/// pass raw strings and must not lower-case beforehand.
///
/// Rules are user-authored, so an invalid regex is never an error: it is
/// logged and treated as a miss.
pub fn match_pattern(text: &str, pattern: &str, kind: MatchKind) -> PatternMatch {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();

    match kind {
        MatchKind::Exact => {
            if text == pattern {
                PatternMatch::hit(100)
            } else {
                PatternMatch::MISS
            }
        }
        MatchKind::Contains => {
            if text.contains(pattern.as_str()) {
                // A pattern covering more of the text is a stronger signal
                // than a generic substring.
                let confidence = if text.is_empty() {
                    100.0
                } else {
                    (60.0 + (pattern.len() as f64 / text.len() as f64) * 40.0).min(100.0)
                };
                PatternMatch::hit(confidence.round() as u8)
            } else {
                PatternMatch::MISS
            }
        }
        MatchKind::StartsWith => {
            if text.starts_with(pattern.as_str()) {
                PatternMatch::hit(90)
            } else {
                PatternMatch::MISS
            }
        }
        MatchKind::EndsWith => {
            if text.ends_with(pattern.as_str()) {
                PatternMatch::hit(90)
            } else {
                PatternMatch::MISS
            }
        }
        MatchKind::Regex => match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => {
                if re.is_match(&text) {
                    PatternMatch::hit(85)
                } else {
                    PatternMatch::MISS
                }
            }
            Err(e) => {
                log::debug!("Ignoring unparsable rule pattern {:?}: {}", pattern, e);
                PatternMatch::MISS
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_is_case_insensitive() {
        assert_eq!(match_pattern("Finder", "finder", MatchKind::Exact), PatternMatch::hit(100));
        assert_eq!(match_pattern("Finder Pro", "finder", MatchKind::Exact), PatternMatch::MISS);
    }

    #[test]
    fn test_contains_rewards_specific_patterns() {
        let generic = match_pattern("Visual Studio Code", "code", MatchKind::Contains);
        let specific = match_pattern("Visual Studio Code", "Visual Studio Code", MatchKind::Contains);
        assert!(generic.matched);
        assert!(specific.matched);
        assert!(specific.confidence > generic.confidence);
        assert_eq!(specific.confidence, 100);
    }

    #[test]
    fn test_boundary_matches_fixed_confidence() {
        assert_eq!(match_pattern("Slack - general", "slack", MatchKind::StartsWith), PatternMatch::hit(90));
        assert_eq!(match_pattern("notes.md - Obsidian", "obsidian", MatchKind::EndsWith), PatternMatch::hit(90));
        assert_eq!(match_pattern("Slack", "general", MatchKind::StartsWith), PatternMatch::MISS);
    }

    #[test]
    fn test_regex_matches_case_insensitively() {
        let m = match_pattern("repo - GitHub", r"git(hub|lab)", MatchKind::Regex);
        assert_eq!(m, PatternMatch::hit(85));
    }

    #[test]
    fn test_invalid_regex_is_a_silent_miss() {
        assert_eq!(match_pattern("anything", "([unclosed", MatchKind::Regex), PatternMatch::MISS);
    }
}
