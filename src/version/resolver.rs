//! Before/after content-ref resolution for page revisions and stacked
//! activity groups.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::{ContentRef, PageVersion};
use crate::version::{GroupKey, VersionError, VersionQuery};

#[derive(Debug, Clone)]
pub struct ResolveVersionRequest {
    pub page_id: String,
    pub change_group_id: String,
    /// Content ref recorded on the triggering activity, used as the
    /// "before" side when present.
    pub activity_content_ref: Option<ContentRef>,
}

/// One request of a stacked (collapsed) group. The before ref is the
/// group's earliest recorded content reference, since a stacked group
/// may span multiple intervening revisions.
#[derive(Debug, Clone)]
pub struct StackedResolveEntry {
    pub page_id: String,
    pub change_group_id: String,
    pub first_content_ref: Option<ContentRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVersionPair {
    pub page_id: String,
    pub change_group_id: String,
    pub before_content_ref: Option<ContentRef>,
    pub after_content_ref: ContentRef,
    pub before_revision: u64,
    pub after_revision: u64,
}

/// Resolves version records into before/after content-ref pairs over an
/// abstract latest-version lookup.
pub struct VersionResolver<'a, Q: VersionQuery> {
    query: &'a Q,
}

impl<'a, Q: VersionQuery> VersionResolver<'a, Q> {
    pub fn new(query: &'a Q) -> Self {
        Self { query }
    }

    /// Resolve a single page/change-group pair. `None` when the pair has
    /// no version: a normal outcome, not an error.
    pub fn resolve_version_content(
        &self,
        request: &ResolveVersionRequest,
    ) -> Result<Option<ResolvedVersionPair>, VersionError> {
        let version = match self
            .query
            .latest_version(&request.page_id, &request.change_group_id)?
        {
            Some(v) => v,
            None => return Ok(None),
        };

        Ok(Some(ResolvedVersionPair {
            page_id: request.page_id.clone(),
            change_group_id: request.change_group_id.clone(),
            before_content_ref: request.activity_content_ref.clone(),
            after_content_ref: version.content_ref,
            // Clamped at 0, never negative.
            before_revision: version.page_revision.saturating_sub(1),
            after_revision: version.page_revision,
        }))
    }

    /// Resolve many requests with one bulk lookup.
    ///
    /// Change-group ids are deduplicated before querying; groups without
    /// a matching version are simply absent from the result map.
    pub fn batch_resolve_version_content(
        &self,
        requests: &[ResolveVersionRequest],
    ) -> Result<HashMap<String, ResolvedVersionPair>, VersionError> {
        let deduped = dedup_by_group(requests, |r| (&r.page_id, &r.change_group_id));
        let keys: Vec<GroupKey> = deduped
            .iter()
            .map(|r| GroupKey {
                page_id: r.page_id.clone(),
                change_group_id: r.change_group_id.clone(),
            })
            .collect();

        let versions = self.query.latest_versions(&keys)?;
        debug!(
            requested = requests.len(),
            deduped = keys.len(),
            matched = versions.len(),
            "batch version resolution"
        );

        let by_group: HashMap<&str, &PageVersion> = versions
            .iter()
            .filter_map(|v| v.change_group_id.as_deref().map(|cg| (cg, v)))
            .collect();

        let mut resolved = HashMap::new();
        for request in deduped {
            if let Some(version) = by_group.get(request.change_group_id.as_str()) {
                resolved.insert(
                    request.change_group_id.clone(),
                    ResolvedVersionPair {
                        page_id: request.page_id.clone(),
                        change_group_id: request.change_group_id.clone(),
                        before_content_ref: request.activity_content_ref.clone(),
                        after_content_ref: version.content_ref.clone(),
                        before_revision: version.page_revision.saturating_sub(1),
                        after_revision: version.page_revision,
                    },
                );
            }
        }

        Ok(resolved)
    }

    /// Resolve stacked groups: the before ref comes from each entry's
    /// earliest recorded content reference, not from `revision - 1`.
    pub fn resolve_stacked_version_content(
        &self,
        entries: &[StackedResolveEntry],
    ) -> Result<HashMap<String, ResolvedVersionPair>, VersionError> {
        let deduped = dedup_by_group(entries, |e| (&e.page_id, &e.change_group_id));
        let keys: Vec<GroupKey> = deduped
            .iter()
            .map(|e| GroupKey {
                page_id: e.page_id.clone(),
                change_group_id: e.change_group_id.clone(),
            })
            .collect();

        let versions = self.query.latest_versions(&keys)?;

        let by_group: HashMap<&str, &PageVersion> = versions
            .iter()
            .filter_map(|v| v.change_group_id.as_deref().map(|cg| (cg, v)))
            .collect();

        let mut resolved = HashMap::new();
        for entry in deduped {
            if let Some(version) = by_group.get(entry.change_group_id.as_str()) {
                resolved.insert(
                    entry.change_group_id.clone(),
                    ResolvedVersionPair {
                        page_id: entry.page_id.clone(),
                        change_group_id: entry.change_group_id.clone(),
                        before_content_ref: entry.first_content_ref.clone(),
                        after_content_ref: version.content_ref.clone(),
                        before_revision: version.page_revision.saturating_sub(1),
                        after_revision: version.page_revision,
                    },
                );
            }
        }

        Ok(resolved)
    }
}

/// First occurrence wins per (page, change group) pair.
fn dedup_by_group<'t, T, F>(items: &'t [T], key: F) -> Vec<&'t T>
where
    F: Fn(&'t T) -> (&'t String, &'t String),
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|&item| {
            let (page, group) = key(item);
            seen.insert((page.clone(), group.clone()))
        })
        .collect()
}
