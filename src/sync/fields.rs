use std::collections::{HashMap, HashSet};

/// Wire name (snake_case) paired with its UI name (camelCase).
///
/// Dotted names address one level of nesting into a parent object keyed by
/// the prefix; the consumer performs the actual merge.
const FIELD_PAIRS: &[(&str, &str)] = &[
    // Content generation
    ("content_filtering", "contentFiltering"),
    ("meme_generation", "memeGeneration"),
    ("sentiment_analysis", "sentimentAnalysis"),
    ("content_approval_required", "contentApprovalRequired"),
    ("max_daily_posts", "maxDailyPosts"),
    ("min_time_between_posts", "minTimeBetweenPosts"),
    // Language
    ("language_style", "languageStyle"),
    ("persona", "persona"),
    ("emoji_usage", "emojiUsage"),
    ("hashtag_usage", "hashtagUsage"),
    ("max_hashtags_per_post", "maxHashtagsPerPost"),
    // Platforms
    ("platform_settings", "platformSettings"),
    ("cross_posting", "crossPosting"),
    ("platform_rotation", "platformRotation"),
    // Engagement
    ("auto_reply", "autoReply"),
    ("reply_to_mentions", "replyToMentions"),
    ("engage_with_comments", "engageWithComments"),
    ("max_daily_replies", "maxDailyReplies"),
    ("engagement_hours", "engagementHours"),
    ("engagement_hours.start", "engagementHours.start"),
    ("engagement_hours.end", "engagementHours.end"),
    ("engagement_hours.timezone", "engagementHours.timezone"),
    // Community
    ("community_guidelines", "communityGuidelines"),
    ("blocked_users", "blockedUsers"),
    ("blocked_keywords", "blockedKeywords"),
    ("auto_moderation", "autoModeration"),
    ("spam_detection", "spamDetection"),
    // Analytics
    ("tracking_enabled", "trackingEnabled"),
    ("analytics_granularity", "analyticsGranularity"),
    ("performance_alerts", "performanceAlerts"),
    ("alert_thresholds", "alertThresholds"),
    ("alert_thresholds.engagement_rate", "alertThresholds.engagementRate"),
    ("alert_thresholds.sentiment_score", "alertThresholds.sentimentScore"),
    ("alert_thresholds.response_time", "alertThresholds.responseTime"),
    // AI behavior
    ("ai_creativity_level", "aiCreativityLevel"),
    ("ai_response_speed", "aiResponseSpeed"),
    ("ai_memory_retention", "aiMemoryRetention"),
    ("ai_learning_enabled", "aiLearningEnabled"),
    // Internationalization
    ("origin_timezone", "originTimezone"),
    ("origin_continent", "originContinent"),
    ("primary_language", "primaryLanguage"),
    ("date_format", "dateFormat"),
    ("time_format", "timeFormat"),
    ("holiday_awareness", "holidayAwareness"),
    // Risk management
    ("risk_level", "riskLevel"),
    ("compliance_check_level", "complianceCheckLevel"),
    ("content_backup_enabled", "contentBackupEnabled"),
    ("emergency_stop_enabled", "emergencyStopEnabled"),
    // Rate limiting
    ("rate_limiting_enabled", "rateLimitingEnabled"),
    ("rate_limits", "rateLimits"),
    ("rate_limits.posts_per_day", "rateLimits.postsPerDay"),
    ("rate_limits.replies_per_day", "rateLimits.repliesPerDay"),
    ("rate_limits.likes_per_day", "rateLimits.likesPerDay"),
];

/// Bidirectional map between wire and UI field names.
#[derive(Debug)]
pub struct FieldMap {
    wire_to_ui: HashMap<&'static str, &'static str>,
    ui_to_wire: HashMap<&'static str, &'static str>,
    nested_parents: HashSet<&'static str>,
}

impl FieldMap {
    pub fn new() -> Self {
        let mut wire_to_ui = HashMap::new();
        let mut ui_to_wire = HashMap::new();
        let mut nested_parents = HashSet::new();

        for (wire, ui) in FIELD_PAIRS {
            wire_to_ui.insert(*wire, *ui);
            ui_to_wire.insert(*ui, *wire);
            if let Some((parent, _)) = wire.split_once('.') {
                nested_parents.insert(parent);
            }
        }

        Self {
            wire_to_ui,
            ui_to_wire,
            nested_parents,
        }
    }

    /// UI -> wire. Unknown names pass through unchanged so new UI fields can
    /// reach the backend before the map catches up.
    pub fn to_wire(&self, ui: &str) -> String {
        match self.ui_to_wire.get(ui) {
            Some(wire) => (*wire).to_string(),
            None => {
                log::debug!("[FIELDS] no wire mapping for {ui}, passing through");
                ui.to_string()
            }
        }
    }

    /// Wire -> UI. Unknown wire names are refused: applying a guessed name
    /// would corrupt the cached snapshot, so the caller must skip the field.
    pub fn to_ui(&self, wire: &str) -> Option<&'static str> {
        let ui = self.wire_to_ui.get(wire).copied();
        if ui.is_none() {
            log::warn!("[FIELDS] unknown wire field {wire}, skipping");
        }
        ui
    }

    /// Whether a wire-named object field has translated child keys.
    pub fn has_nested(&self, wire_parent: &str) -> bool {
        self.nested_parents.contains(wire_parent)
    }

    #[cfg(test)]
    pub fn pairs() -> &'static [(&'static str, &'static str)] {
        FIELD_PAIRS
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijection_round_trips_every_wire_name() {
        let map = FieldMap::new();
        for (wire, _) in FieldMap::pairs() {
            let ui = map.to_ui(wire).expect("known wire name must map");
            assert_eq!(map.to_wire(ui), *wire, "round trip failed for {wire}");
        }
    }

    #[test]
    fn no_duplicate_names_on_either_side() {
        let pairs = FieldMap::pairs();
        let wires: HashSet<_> = pairs.iter().map(|(w, _)| w).collect();
        let uis: HashSet<_> = pairs.iter().map(|(_, u)| u).collect();
        assert_eq!(wires.len(), pairs.len());
        assert_eq!(uis.len(), pairs.len());
    }

    #[test]
    fn unknown_ui_name_passes_through() {
        let map = FieldMap::new();
        assert_eq!(map.to_wire("futureSetting"), "futureSetting");
    }

    #[test]
    fn unknown_wire_name_is_refused() {
        let map = FieldMap::new();
        assert_eq!(map.to_ui("brand_new_server_field"), None);
    }

    #[test]
    fn nested_parents_are_detected() {
        let map = FieldMap::new();
        assert!(map.has_nested("engagement_hours"));
        assert!(map.has_nested("rate_limits"));
        assert!(!map.has_nested("platform_settings"));
    }
}
