use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved category id. Always present, never deletable.
pub const UNCATEGORIZED: &str = "uncategorized";

/// A user-facing classification bucket with a productivity weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub is_productivity: bool,
    pub productivity_score: u8, // 0-100
    pub is_default: bool,
    pub order: i32,
}

/// Which sample fields a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    App,
    Title,
    Url,
    Combined,
}

/// How a rule pattern is compared against a sample field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    Exact,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
}

/// A pattern-based predicate mapping samples to a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub category_id: String,
    pub kind: RuleKind,
    pub match_kind: MatchKind,
    pub app_pattern: Option<String>,
    pub title_pattern: Option<String>,
    pub url_pattern: Option<String>,
    pub priority: i32,
    pub is_enabled: bool,
    pub is_default: bool,
    pub created_at: DateTime<Local>,
}

impl Rule {
    /// True when the rule carries a pattern for its declared match target.
    pub fn has_pattern(&self) -> bool {
        match self.kind {
            RuleKind::App => self.app_pattern.is_some(),
            RuleKind::Title => self.title_pattern.is_some(),
            RuleKind::Url => self.url_pattern.is_some(),
            RuleKind::Combined => self.app_pattern.is_some() || self.title_pattern.is_some(),
        }
    }
}

/// The categorization decision recorded for one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub activity_id: Uuid,
    pub category_id: String,
    pub auto_assigned: bool,
    pub rule_id: Option<String>,
    pub confidence: u8, // 0-100
    pub overridden_at: Option<DateTime<Local>>,
}

fn category(id: &str, name: &str, color: &str, icon: &str, is_productivity: bool, productivity_score: u8, order: i32) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        icon: icon.to_string(),
        is_productivity,
        productivity_score,
        is_default: true,
        order,
    }
}

/// The built-in category set. Merged with user-defined categories at engine
/// construction; user entries with the same id replace these.
pub fn default_categories() -> Vec<Category> {
    vec![
        category("development", "Development", "#3B82F6", "code", true, 100, 1),
        category("communication", "Communication", "#8B5CF6", "message-circle", true, 70, 2),
        category("design", "Design", "#EC4899", "palette", true, 100, 3),
        category("meetings", "Meetings", "#F59E0B", "users", true, 60, 4),
        category("documentation", "Documentation", "#10B981", "file-text", true, 90, 5),
        category("research", "Research", "#06B6D4", "search", true, 80, 6),
        category("entertainment", "Entertainment", "#EF4444", "play-circle", false, 10, 7),
        category("social-media", "Social Media", "#F97316", "share-2", false, 15, 8),
        category("utilities", "Utilities", "#6B7280", "settings", true, 50, 9),
        category(UNCATEGORIZED, "Uncategorized", "#9CA3AF", "help-circle", true, 50, 100),
    ]
}

fn app_rule(id: &str, category_id: &str, pattern: &str, match_kind: MatchKind, priority: i32) -> Rule {
    Rule {
        id: id.to_string(),
        category_id: category_id.to_string(),
        kind: RuleKind::App,
        match_kind,
        app_pattern: Some(pattern.to_string()),
        title_pattern: None,
        url_pattern: None,
        priority,
        is_enabled: true,
        is_default: true,
        created_at: Local::now(),
    }
}

fn title_rule(id: &str, category_id: &str, pattern: &str, priority: i32) -> Rule {
    Rule {
        id: id.to_string(),
        category_id: category_id.to_string(),
        kind: RuleKind::Title,
        match_kind: MatchKind::Contains,
        app_pattern: None,
        title_pattern: Some(pattern.to_string()),
        url_pattern: None,
        priority,
        is_enabled: true,
        is_default: true,
        created_at: Local::now(),
    }
}

/// The built-in rule table. Browser apps sit at low priority so that
/// title rules (GitHub, YouTube, ...) can override the generic browser match.
pub fn default_rules() -> Vec<Rule> {
    use MatchKind::Contains;
    vec![
        // Development
        app_rule("dev-vscode", "development", "Visual Studio Code", Contains, 100),
        app_rule("dev-code", "development", "Code", Contains, 90),
        app_rule("dev-intellij", "development", "IntelliJ", Contains, 100),
        app_rule("dev-webstorm", "development", "WebStorm", Contains, 100),
        app_rule("dev-pycharm", "development", "PyCharm", Contains, 100),
        app_rule("dev-sublime", "development", "Sublime Text", Contains, 100),
        app_rule("dev-xcode", "development", "Xcode", Contains, 100),
        app_rule("dev-android", "development", "Android Studio", Contains, 100),
        app_rule("dev-cursor", "development", "Cursor", Contains, 100),
        app_rule("dev-terminal", "development", "Terminal", Contains, 80),
        app_rule("dev-iterm", "development", "iTerm", Contains, 80),
        app_rule("dev-vim", "development", "vim", Contains, 80),
        app_rule("dev-neovim", "development", "nvim", Contains, 80),
        app_rule("dev-cmd", "development", "cmd.exe", Contains, 80),
        app_rule("dev-powershell", "development", "PowerShell", Contains, 80),
        title_rule("dev-github-title", "development", "GitHub", 70),
        title_rule("dev-gitlab-title", "development", "GitLab", 70),
        title_rule("dev-bitbucket-title", "development", "Bitbucket", 70),
        title_rule("dev-stackoverflow", "development", "Stack Overflow", 70),
        // Communication
        app_rule("comm-slack", "communication", "Slack", Contains, 100),
        app_rule("comm-teams", "communication", "Microsoft Teams", Contains, 100),
        app_rule("comm-discord", "communication", "Discord", Contains, 100),
        app_rule("comm-outlook", "communication", "Outlook", Contains, 90),
        app_rule("comm-telegram", "communication", "Telegram", Contains, 90),
        app_rule("comm-whatsapp", "communication", "WhatsApp", Contains, 90),
        app_rule("comm-mail", "communication", "Mail", Contains, 80),
        title_rule("comm-gmail", "communication", "Gmail", 90),
        // Design
        app_rule("design-figma", "design", "Figma", Contains, 100),
        app_rule("design-sketch", "design", "Sketch", Contains, 100),
        app_rule("design-photoshop", "design", "Photoshop", Contains, 100),
        app_rule("design-illustrator", "design", "Illustrator", Contains, 100),
        app_rule("design-xd", "design", "Adobe XD", Contains, 100),
        title_rule("design-figma-title", "design", "Figma", 90),
        title_rule("design-canva", "design", "Canva", 90),
        // Meetings
        app_rule("meet-zoom", "meetings", "zoom", Contains, 100),
        app_rule("meet-webex", "meetings", "Webex", Contains, 100),
        app_rule("meet-skype", "meetings", "Skype", Contains, 100),
        app_rule("meet-facetime", "meetings", "FaceTime", Contains, 100),
        title_rule("meet-meet", "meetings", "Google Meet", 100),
        // Documentation
        app_rule("doc-notion", "documentation", "Notion", Contains, 100),
        app_rule("doc-word", "documentation", "Microsoft Word", Contains, 100),
        app_rule("doc-obsidian", "documentation", "Obsidian", Contains, 100),
        app_rule("doc-evernote", "documentation", "Evernote", Contains, 100),
        title_rule("doc-notion-title", "documentation", "Notion", 90),
        title_rule("doc-confluence", "documentation", "Confluence", 100),
        title_rule("doc-gdocs", "documentation", "Google Docs", 100),
        // Research: generic browser matches, low priority on purpose
        app_rule("research-chrome", "research", "Google Chrome", Contains, 30),
        app_rule("research-firefox", "research", "Firefox", Contains, 30),
        app_rule("research-safari", "research", "Safari", Contains, 30),
        app_rule("research-edge", "research", "Microsoft Edge", Contains, 30),
        app_rule("research-brave", "research", "Brave", Contains, 30),
        // Entertainment
        app_rule("ent-spotify", "entertainment", "Spotify", Contains, 100),
        title_rule("ent-youtube", "entertainment", "YouTube", 80),
        title_rule("ent-netflix", "entertainment", "Netflix", 100),
        title_rule("ent-twitch", "entertainment", "Twitch", 100),
        title_rule("ent-prime", "entertainment", "Prime Video", 100),
        // Social media
        title_rule("social-twitter", "social-media", "Twitter", 100),
        title_rule("social-x", "social-media", "/ X", 90),
        title_rule("social-facebook", "social-media", "Facebook", 100),
        title_rule("social-instagram", "social-media", "Instagram", 100),
        title_rule("social-linkedin", "social-media", "LinkedIn", 100),
        title_rule("social-reddit", "social-media", "Reddit", 100),
        title_rule("social-tiktok", "social-media", "TikTok", 100),
        // Utilities
        app_rule("util-finder", "utilities", "Finder", MatchKind::Exact, 80),
        app_rule("util-explorer", "utilities", "Explorer", Contains, 80),
        app_rule("util-settings", "utilities", "Settings", Contains, 80),
        app_rule("util-1password", "utilities", "1Password", Contains, 90),
    ]
}
