use std::collections::HashMap;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::matcher::{self, PatternMatch};
use crate::models::activity::Activity;
use crate::models::category::{
    Categorization, Category, Rule, RuleKind, UNCATEGORIZED, default_categories, default_rules,
};

/// Confidence at which the rule scan stops early: a clearly dominant signal
/// makes lower-priority rules irrelevant.
const SHORT_CIRCUIT_CONFIDENCE: u8 = 90;

/// Confidence reported when no rule matches.
const FALLBACK_CONFIDENCE: u8 = 50;

/// The best rule match for a sample's fields.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule_id: String,
    pub category_id: String,
    pub confidence: u8,
}

/// User-defined configuration, as exported/imported. Built-ins are never part
/// of the bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub categories: Vec<Category>,
    pub rules: Vec<Rule>,
}

/// Owns the merged built-in + user-defined categories and rules and resolves
/// the best-matching category for observed samples.
///
/// Rules live in insertion order; evaluation order (priority descending,
/// insertion-stable on ties) is rebuilt on every mutation rather than
/// re-derived per match.
pub struct RuleEngine {
    categories: Vec<Category>,
    rules: Vec<Rule>,
    eval_order: Vec<usize>,
    categorized: HashMap<Uuid, Categorization>,
}

impl RuleEngine {
    /// Engine over the built-in sets merged with user-defined entries.
    /// A user entry whose id collides with a built-in replaces it.
    pub fn new(user_categories: Vec<Category>, user_rules: Vec<Rule>) -> Self {
        let mut engine = Self {
            categories: default_categories(),
            rules: default_rules(),
            eval_order: Vec::new(),
            categorized: HashMap::new(),
        };
        for category in user_categories {
            engine.replace_or_push_category(category);
        }
        for rule in user_rules {
            engine.replace_or_push_rule(rule);
        }
        engine.rebuild_eval_order();
        engine
    }

    pub fn with_defaults() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    fn replace_or_push_category(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }

    fn replace_or_push_rule(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    fn rebuild_eval_order(&mut self) {
        let mut order: Vec<usize> = (0..self.rules.len()).collect();
        // Stable sort: equal priorities keep insertion order.
        order.sort_by_key(|&i| std::cmp::Reverse(self.rules[i].priority));
        self.eval_order = order;
    }

    // --- categorization ---

    /// Categorize one activity. A sticky manual override is returned
    /// unchanged; automatic results are cached per activity id and
    /// recomputed on later passes.
    pub fn categorize(&mut self, activity: &Activity) -> Categorization {
        if let Some(existing) = self.categorized.get(&activity.id) {
            if !existing.auto_assigned {
                return existing.clone();
            }
        }

        let result = match self.match_fields(&activity.application_name, &activity.window_title, None) {
            Some(m) => Categorization {
                activity_id: activity.id,
                category_id: m.category_id,
                auto_assigned: true,
                rule_id: Some(m.rule_id),
                confidence: m.confidence,
                overridden_at: None,
            },
            None => Categorization {
                activity_id: activity.id,
                category_id: UNCATEGORIZED.to_string(),
                auto_assigned: true,
                rule_id: None,
                confidence: FALLBACK_CONFIDENCE,
                overridden_at: None,
            },
        };
        self.categorized.insert(activity.id, result.clone());
        result
    }

    /// Scan enabled rules in priority order for the best match against the
    /// given sample fields. Returns `None` when nothing matches.
    pub fn match_fields(&self, app_name: &str, window_title: &str, url: Option<&str>) -> Option<RuleMatch> {
        let mut best: Option<(usize, u8)> = None;

        for &idx in &self.eval_order {
            let rule = &self.rules[idx];
            if !rule.is_enabled {
                continue;
            }
            let m = self.match_rule(rule, app_name, window_title, url);
            if m.matched && best.is_none_or(|(_, confidence)| m.confidence > confidence) {
                best = Some((idx, m.confidence));
                if m.confidence >= SHORT_CIRCUIT_CONFIDENCE {
                    break;
                }
            }
        }

        best.map(|(idx, confidence)| RuleMatch {
            rule_id: self.rules[idx].id.clone(),
            category_id: self.rules[idx].category_id.clone(),
            confidence,
        })
    }

    fn match_rule(&self, rule: &Rule, app_name: &str, window_title: &str, url: Option<&str>) -> PatternMatch {
        let mut result = match rule.kind {
            RuleKind::App => match &rule.app_pattern {
                Some(pattern) => matcher::match_pattern(app_name, pattern, rule.match_kind),
                None => PatternMatch::MISS,
            },
            RuleKind::Title => match &rule.title_pattern {
                Some(pattern) => matcher::match_pattern(window_title, pattern, rule.match_kind),
                None => PatternMatch::MISS,
            },
            RuleKind::Url => match (url, &rule.url_pattern) {
                (Some(url), Some(pattern)) => matcher::match_pattern(url, pattern, rule.match_kind),
                _ => PatternMatch::MISS,
            },
            RuleKind::Combined => {
                // A declared sub-pattern must match; an absent one counts as
                // a full-confidence match for its sub-part.
                let app = rule
                    .app_pattern
                    .as_deref()
                    .map(|p| matcher::match_pattern(app_name, p, rule.match_kind))
                    .unwrap_or(PatternMatch::hit(100));
                let title = rule
                    .title_pattern
                    .as_deref()
                    .map(|p| matcher::match_pattern(window_title, p, rule.match_kind))
                    .unwrap_or(PatternMatch::hit(100));
                if app.matched && title.matched {
                    PatternMatch::hit(((app.confidence as u16 + title.confidence as u16) / 2) as u8)
                } else {
                    PatternMatch::MISS
                }
            }
        };

        // Declared priority breaks ties between equally specific patterns.
        if result.matched {
            let boosted = result.confidence as i32 + rule.priority / 10;
            result.confidence = boosted.clamp(0, 100) as u8;
        }
        result
    }

    /// Record a manual category choice for an activity. Sticky: a later
    /// automatic pass never replaces it. A second override for the same
    /// activity is rejected unless it repeats the same category.
    pub fn manual_override(&mut self, activity_id: Uuid, category_id: &str) -> EngineResult<Categorization> {
        if !self.categories.iter().any(|c| c.id == category_id) {
            return Err(EngineError::UnknownCategory(category_id.to_string()));
        }
        if let Some(existing) = self.categorized.get(&activity_id) {
            if !existing.auto_assigned {
                if existing.category_id == category_id {
                    return Ok(existing.clone());
                }
                return Err(EngineError::AlreadyOverridden(activity_id));
            }
        }

        let result = Categorization {
            activity_id,
            category_id: category_id.to_string(),
            auto_assigned: false,
            rule_id: None,
            confidence: 100,
            overridden_at: Some(Local::now()),
        };
        self.categorized.insert(activity_id, result.clone());
        Ok(result)
    }

    /// Drop a manual override so the activity can be re-categorized
    /// automatically (or overridden again).
    pub fn clear_override(&mut self, activity_id: Uuid) {
        if let Some(existing) = self.categorized.get(&activity_id) {
            if !existing.auto_assigned {
                self.categorized.remove(&activity_id);
            }
        }
    }

    pub fn categorization(&self, activity_id: Uuid) -> Option<&Categorization> {
        self.categorized.get(&activity_id)
    }

    pub fn clear_categorizations(&mut self) {
        self.categorized.clear();
    }

    // --- category CRUD ---

    /// All categories, display-ordered.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = self.categories.clone();
        categories.sort_by_key(|c| c.order);
        categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn upsert_category(&mut self, category: Category) {
        self.replace_or_push_category(category);
    }

    /// Delete a user-defined category. Rules and recorded categorizations
    /// pointing at it fall back to `uncategorized`.
    pub fn delete_category(&mut self, category_id: &str) -> EngineResult<()> {
        let Some(pos) = self.categories.iter().position(|c| c.id == category_id) else {
            return Err(EngineError::UnknownCategory(category_id.to_string()));
        };
        if self.categories[pos].is_default {
            return Err(EngineError::BuiltinCategory(category_id.to_string()));
        }

        self.categories.remove(pos);
        for rule in &mut self.rules {
            if rule.category_id == category_id {
                rule.category_id = UNCATEGORIZED.to_string();
            }
        }
        for categorization in self.categorized.values_mut() {
            if categorization.category_id == category_id {
                categorization.category_id = UNCATEGORIZED.to_string();
                categorization.auto_assigned = true;
                categorization.rule_id = None;
                categorization.overridden_at = None;
            }
        }
        Ok(())
    }

    // --- rule CRUD ---

    /// All rules in evaluation order.
    pub fn rules(&self) -> Vec<Rule> {
        self.eval_order.iter().map(|&i| self.rules[i].clone()).collect()
    }

    pub fn rules_for_category(&self, category_id: &str) -> Vec<Rule> {
        self.eval_order
            .iter()
            .map(|&i| &self.rules[i])
            .filter(|r| r.category_id == category_id)
            .cloned()
            .collect()
    }

    pub fn upsert_rule(&mut self, rule: Rule) -> EngineResult<()> {
        if !rule.has_pattern() {
            return Err(EngineError::MissingPattern(rule.id.clone()));
        }
        self.replace_or_push_rule(rule);
        self.rebuild_eval_order();
        Ok(())
    }

    pub fn delete_rule(&mut self, rule_id: &str) -> EngineResult<()> {
        let Some(pos) = self.rules.iter().position(|r| r.id == rule_id) else {
            return Err(EngineError::UnknownRule(rule_id.to_string()));
        };
        if self.rules[pos].is_default {
            return Err(EngineError::BuiltinRule(rule_id.to_string()));
        }
        self.rules.remove(pos);
        self.rebuild_eval_order();
        Ok(())
    }

    /// Flip a rule's enabled state, returning the new state.
    pub fn toggle_rule(&mut self, rule_id: &str) -> EngineResult<bool> {
        let Some(rule) = self.rules.iter_mut().find(|r| r.id == rule_id) else {
            return Err(EngineError::UnknownRule(rule_id.to_string()));
        };
        rule.is_enabled = !rule.is_enabled;
        Ok(rule.is_enabled)
    }

    // --- config round-trip ---

    /// User-defined entries only; built-ins are reconstructed at load.
    pub fn export_config(&self) -> EngineConfig {
        EngineConfig {
            categories: self.categories.iter().filter(|c| !c.is_default).cloned().collect(),
            rules: self.rules.iter().filter(|r| !r.is_default).cloned().collect(),
        }
    }

    pub fn import_config(&mut self, config: EngineConfig) -> EngineResult<()> {
        for mut category in config.categories {
            category.is_default = false;
            self.replace_or_push_category(category);
        }
        for mut rule in config.rules {
            rule.is_default = false;
            if !rule.has_pattern() {
                return Err(EngineError::MissingPattern(rule.id));
            }
            self.replace_or_push_rule(rule);
        }
        self.rebuild_eval_order();
        Ok(())
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
