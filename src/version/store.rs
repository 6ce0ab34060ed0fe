//! Persistence seams for page-version rows.
//!
//! The host application owns the actual relational storage; this crate
//! only needs an insert sink and a latest-by-revision lookup. A
//! caller-supplied transaction handle is just another [`VersionStore`]
//! passed in place of the default one.

use std::sync::RwLock;

use crate::types::PageVersion;
use crate::version::VersionError;

/// Insert sink for immutable version rows.
pub trait VersionStore: Send + Sync {
    fn insert_version(&self, version: PageVersion) -> Result<(), VersionError>;
}

/// A (page, change group) pair used by bulk lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub page_id: String,
    pub change_group_id: String,
}

/// Latest-version lookup capability.
///
/// `latest_versions` must be satisfiable as one bulk query so resolver
/// batches never degenerate into one round trip per item.
pub trait VersionQuery: Send + Sync {
    /// Most recent version for the pair, ordered by revision descending.
    fn latest_version(
        &self,
        page_id: &str,
        change_group_id: &str,
    ) -> Result<Option<PageVersion>, VersionError>;

    /// Bulk variant: at most one version per key, keys without a match
    /// simply absent from the result.
    fn latest_versions(&self, keys: &[GroupKey]) -> Result<Vec<PageVersion>, VersionError>;
}

/// In-memory version store, the reference backend for tests and
/// embedded use. Implements both the insert sink and the lookup seam.
#[derive(Debug, Default)]
pub struct MemoryVersionStore {
    rows: RwLock<Vec<PageVersion>>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn latest_in(rows: &[PageVersion], page_id: &str, change_group_id: &str) -> Option<PageVersion> {
        rows.iter()
            .filter(|v| v.page_id == page_id && v.change_group_id.as_deref() == Some(change_group_id))
            .max_by_key(|v| v.page_revision)
            .cloned()
    }
}

impl VersionStore for MemoryVersionStore {
    fn insert_version(&self, version: PageVersion) -> Result<(), VersionError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| VersionError::Backend("version rows poisoned".into()))?;
        rows.push(version);
        Ok(())
    }
}

impl VersionQuery for MemoryVersionStore {
    fn latest_version(
        &self,
        page_id: &str,
        change_group_id: &str,
    ) -> Result<Option<PageVersion>, VersionError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| VersionError::Backend("version rows poisoned".into()))?;
        Ok(Self::latest_in(&rows, page_id, change_group_id))
    }

    fn latest_versions(&self, keys: &[GroupKey]) -> Result<Vec<PageVersion>, VersionError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| VersionError::Backend("version rows poisoned".into()))?;

        Ok(keys
            .iter()
            .filter_map(|k| Self::latest_in(&rows, &k.page_id, &k.change_group_id))
            .collect())
    }
}
