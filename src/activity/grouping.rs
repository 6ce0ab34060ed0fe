//! Clustering of edit activities into logical change groups.

use std::collections::HashMap;

use tracing::trace;

use crate::types::{ActivityDiffGroup, ActivityForDiff};

/// Grouping key, in priority order: AI conversation, explicit change
/// group, else singleton.
fn group_key(activity: &ActivityForDiff, page_id: &str) -> String {
    if let Some(conv) = &activity.ai_conversation_id {
        return format!("ai:{page_id}:{conv}");
    }
    if let Some(group) = &activity.change_group_id {
        return format!("cg:{page_id}:{group}");
    }
    format!("single:{}", activity.id)
}

/// Cluster a chronological activity list into diff groups.
///
/// Activities without a page identifier are dropped. Each distinct key
/// yields one group; groups appear in first-encounter order, and within
/// a group activities are sorted ascending by timestamp with
/// `first`/`last` taken post-sort.
pub fn group_activities_for_diff(activities: Vec<ActivityForDiff>) -> Vec<ActivityDiffGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<ActivityForDiff>> = HashMap::new();

    for activity in activities {
        let page_id = match &activity.page_id {
            Some(p) => p.clone(),
            None => {
                trace!(activity = %activity.id, "dropping activity without page id");
                continue;
            }
        };

        let key = group_key(&activity, &page_id);
        let bucket = buckets.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        bucket.push(activity);
    }

    order
        .into_iter()
        .filter_map(|key| {
            // Buckets are created with at least one member.
            let mut members = buckets.remove(&key)?;
            members.sort_by_key(|a| a.timestamp);

            let first = members.first()?.clone();
            let last = members.last()?.clone();

            Some(ActivityDiffGroup {
                group_key: key,
                first,
                last,
                activities: members,
            })
        })
        .collect()
}
