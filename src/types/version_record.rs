use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::identifiers::{ContentRef, StateHash};

/// Reserved key under which compression metadata is merged into a
/// version's metadata map.
pub const COMPRESSION_METADATA_KEY: &str = "compression";

/// An immutable record of one committed page edit.
///
/// Created once, never mutated; ordered per page by `page_revision`
/// (monotonically increasing, gaps allowed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageVersion {
    pub id: String,
    pub page_id: String,
    pub drive_id: String,
    pub content_ref: ContentRef,
    pub content_format: String,
    /// Original, uncompressed content size in bytes.
    pub content_size: usize,
    pub page_revision: u64,
    pub state_hash: StateHash,
    pub change_group_id: Option<String>,
    pub change_group_type: Option<String>,
    pub created_by: Option<String>,
    pub source: String,
    pub label: Option<String>,
    pub reason: Option<String>,
    /// Caller-supplied metadata plus a `compression` sub-object under
    /// [`COMPRESSION_METADATA_KEY`].
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}
