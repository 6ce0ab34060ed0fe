//! Unified-diff generation for collapsed activity groups.

use similar::{ChangeTag, TextDiff};

use crate::types::{ActivityDiffGroup, DiffStats, StackedDiff, TimeRange};

/// Policy constants for diff generation. The defaults mirror the host
/// application's; both are tunable, not architectural invariants.
#[derive(Debug, Clone, Copy)]
pub struct DiffLimits {
    /// Content larger than this skips line-level diffing entirely.
    pub large_content_threshold: usize,
    /// Assumed average line length when approximating stats for
    /// oversized content.
    pub approx_line_bytes: usize,
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self {
            large_content_threshold: 50 * 1024,
            approx_line_bytes: 80,
        }
    }
}

/// Generate the diff for one group with default limits.
pub fn generate_stacked_diff(
    before: Option<&str>,
    after: Option<&str>,
    group: &ActivityDiffGroup,
) -> Option<StackedDiff> {
    generate_stacked_diff_with(&DiffLimits::default(), before, after, group)
}

/// Generate the diff for one group.
///
/// Returns `None` when both sides are null/empty or textually identical;
/// empty diffs are never materialized. Pure creation and pure deletion
/// are degenerate single-sided diffs with nonzero additions/deletions.
pub fn generate_stacked_diff_with(
    limits: &DiffLimits,
    before: Option<&str>,
    after: Option<&str>,
    group: &ActivityDiffGroup,
) -> Option<StackedDiff> {
    let before_text = before.unwrap_or("");
    let after_text = after.unwrap_or("");

    if before_text == after_text {
        return None;
    }

    let (unified_diff, stats) =
        if before_text.len() > limits.large_content_threshold
            || after_text.len() > limits.large_content_threshold
        {
            oversize_diff(limits, before_text, after_text)
        } else {
            line_diff(before_text, after_text)
        };

    let mut actors: Vec<String> = Vec::new();
    let mut is_ai_generated = false;
    for activity in &group.activities {
        if !actors.iter().any(|a| a == &activity.actor_display_name) {
            actors.push(activity.actor_display_name.clone());
        }
        is_ai_generated |= activity.is_ai_generated;
    }

    Some(StackedDiff {
        page_id: group.first.page_id.clone().unwrap_or_default(),
        page_title: group.last.resource_title.clone(),
        change_group_id: group.first.change_group_id.clone(),
        ai_conversation_id: group.first.ai_conversation_id.clone(),
        collapsed_count: group.activities.len(),
        time_range: TimeRange {
            from: group.first.timestamp,
            to: group.last.timestamp,
        },
        actors,
        unified_diff,
        stats,
        is_ai_generated,
        truncated: false,
    })
}

fn line_diff(before: &str, after: &str) -> (String, DiffStats) {
    let diff = TextDiff::from_lines(before, after);

    let mut additions = 0;
    let mut deletions = 0;
    let mut unchanged = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => additions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => unchanged += 1,
        }
    }

    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header("before", "after")
        .to_string();

    (unified, DiffStats::new(additions, deletions, unchanged))
}

/// Stats-only fallback for content too large to diff line by line.
/// Additions/deletions are approximated from the byte-length delta.
fn oversize_diff(limits: &DiffLimits, before: &str, after: &str) -> (String, DiffStats) {
    let delta = after.len() as i64 - before.len() as i64;
    let approx_lines = |bytes: i64| -> usize {
        if bytes <= 0 {
            0
        } else {
            (bytes as usize).div_ceil(limits.approx_line_bytes)
        }
    };

    let mut additions = approx_lines(delta);
    let mut deletions = approx_lines(-delta);
    if additions == 0 && deletions == 0 {
        // Same length, different bytes: report one changed line each way.
        additions = 1;
        deletions = 1;
    }

    let body = format!(
        "--- before\n+++ after\n@@ content too large to diff in full (before: {} bytes, after: {} bytes) @@\n",
        before.len(),
        after.len()
    );

    (body, DiffStats::new(additions, deletions, 0))
}
