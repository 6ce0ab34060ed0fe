use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::activity::ActivityDiffGroup;

/// Line-level structure of a generated diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Lines only present after the change.
    pub additions: usize,
    /// Lines only present before the change.
    pub deletions: usize,
    pub unchanged: usize,
    pub total_changes: usize,
}

impl DiffStats {
    pub fn new(additions: usize, deletions: usize, unchanged: usize) -> Self {
        Self {
            additions,
            deletions,
            unchanged,
            total_changes: additions + deletions + unchanged,
        }
    }

    /// Ranking score used when re-fitting already-generated diffs to a
    /// budget: churn, ignoring untouched lines.
    pub fn change_weight(&self) -> usize {
        self.additions + self.deletions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// The materialized diff for one collapsed activity group.
///
/// Fully self-contained and serializable; this is the unit handed to any
/// downstream presentation or LLM-prompting layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedDiff {
    pub page_id: String,
    pub page_title: String,
    pub change_group_id: Option<String>,
    pub ai_conversation_id: Option<String>,
    /// Number of activities folded into this diff.
    pub collapsed_count: usize,
    pub time_range: TimeRange,
    /// Distinct actor display names, in first-seen order.
    pub actors: Vec<String>,
    pub unified_diff: String,
    pub stats: DiffStats,
    pub is_ai_generated: bool,
    /// True when the diff text was cut short of the full diff.
    pub truncated: bool,
}

/// Size constraints for one allocation run, in output characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffBudget {
    /// Ceiling on total emitted diff text.
    pub total: usize,
    /// Ceiling on any single diff's text.
    pub per_item: usize,
    /// Floor below which a truncated diff is not worth emitting.
    pub min_useful: usize,
}

/// Input to the allocator before a diff is generated.
#[derive(Debug, Clone)]
pub struct DiffRequest {
    pub page_id: String,
    pub before_content: Option<String>,
    pub after_content: Option<String>,
    pub group: ActivityDiffGroup,
    pub drive_id: String,
    /// Explicit priority; when absent the allocator estimates one from
    /// the change magnitude.
    pub priority: Option<f64>,
}
