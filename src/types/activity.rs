use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single edit activity as supplied by the host application's activity
/// feed. Read-only, externally sourced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityForDiff {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Activities without a page identifier are dropped during grouping.
    pub page_id: Option<String>,
    pub resource_title: String,
    pub change_group_id: Option<String>,
    pub ai_conversation_id: Option<String>,
    pub is_ai_generated: bool,
    pub actor_email: String,
    pub actor_display_name: String,
    /// Content snapshot recorded at this activity, when the feed has one.
    pub content: Option<String>,
}

/// A cluster of activities treated as one logical edit for diffing.
///
/// Activities are sorted ascending by timestamp; `first`/`last` are the
/// sorted boundary elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDiffGroup {
    pub group_key: String,
    pub first: ActivityForDiff,
    pub last: ActivityForDiff,
    pub activities: Vec<ActivityForDiff>,
}

impl ActivityDiffGroup {
    /// Earliest recorded content snapshot in the group, if any.
    pub fn earliest_content(&self) -> Option<&str> {
        self.activities
            .iter()
            .find_map(|a| a.content.as_deref())
    }
}
