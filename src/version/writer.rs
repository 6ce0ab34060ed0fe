//! Creation of immutable page-version records.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::store::{BlobStore, CompressionMode, ContentStore, WriteOptions};
use crate::types::{ContentRef, PageVersion, StateHash, COMPRESSION_METADATA_KEY};
use crate::version::{VersionError, VersionStore};

/// Page state fields folded into the canonical state hash.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub title: String,
    pub parent_id: Option<String>,
    pub position: Option<i64>,
    pub is_trashed: bool,
    pub page_type: String,
    /// Optional fields (e.g. AI provider/model/system prompt). A key's
    /// mere presence changes the digest.
    pub optional: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CreateVersionInput {
    pub page_id: String,
    pub drive_id: String,
    pub content: String,
    /// Detected from content shape when not supplied.
    pub content_format: Option<String>,
    /// Monotonic per page; the host owns the counter.
    pub page_revision: u64,
    pub state: PageState,
    pub change_group_id: Option<String>,
    pub change_group_type: Option<String>,
    pub created_by: Option<String>,
    pub source: String,
    pub label: Option<String>,
    pub reason: Option<String>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateVersionOptions {
    pub compress: CompressionMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedVersion {
    pub id: String,
    pub content_ref: ContentRef,
    /// Original, uncompressed size in bytes.
    pub content_size: usize,
    pub compressed: bool,
    pub stored_size: usize,
    pub compression_ratio: f64,
}

/// Writes version rows backed by content-store blobs.
///
/// Holds a default persistence handle; [`VersionWriter::create_version_in`]
/// accepts a caller-supplied handle (e.g. one scoped to an external atomic
/// transaction) in its place, with the identical return contract. If that
/// transaction aborts, the already-written content blob is orphaned but
/// harmless: content-addressed blobs are re-creatable, not corruption.
pub struct VersionWriter<'a, B: BlobStore, V: VersionStore> {
    content: &'a ContentStore<B>,
    versions: &'a V,
}

impl<'a, B: BlobStore, V: VersionStore> VersionWriter<'a, B, V> {
    pub fn new(content: &'a ContentStore<B>, versions: &'a V) -> Self {
        Self { content, versions }
    }

    pub fn create_version(
        &self,
        input: CreateVersionInput,
        options: &CreateVersionOptions,
    ) -> Result<CreatedVersion, VersionError> {
        self.create_version_in(self.versions, input, options)
    }

    pub fn create_version_in(
        &self,
        versions: &dyn VersionStore,
        input: CreateVersionInput,
        options: &CreateVersionOptions,
    ) -> Result<CreatedVersion, VersionError> {
        let format = input
            .content_format
            .clone()
            .unwrap_or_else(|| detect_content_format(&input.content).to_string());

        let written = self.content.write(
            &input.content,
            &format,
            &WriteOptions {
                compress: options.compress,
            },
        )?;

        let state_hash = compute_state_hash(&input.state, &written.content_ref, &input.drive_id);

        // Caller metadata survives; compression lands under its reserved key.
        let mut metadata = input.metadata;
        metadata.insert(
            COMPRESSION_METADATA_KEY.to_string(),
            json!({
                "compressed": written.compressed,
                "original_size": written.size,
                "stored_size": written.stored_size,
                "compression_ratio": written.compression_ratio,
            }),
        );

        let id = uuid::Uuid::new_v4().to_string();
        let version = PageVersion {
            id: id.clone(),
            page_id: input.page_id,
            drive_id: input.drive_id,
            content_ref: written.content_ref.clone(),
            content_format: format,
            content_size: written.size,
            page_revision: input.page_revision,
            state_hash,
            change_group_id: input.change_group_id,
            change_group_type: input.change_group_type,
            created_by: input.created_by,
            source: input.source,
            label: input.label,
            reason: input.reason,
            metadata,
            created_at: Utc::now(),
        };

        debug!(
            page = %version.page_id,
            revision = version.page_revision,
            r = version.content_ref.as_str(),
            "version created"
        );

        versions.insert_version(version)?;

        Ok(CreatedVersion {
            id,
            content_ref: written.content_ref,
            content_size: written.size,
            compressed: written.compressed,
            stored_size: written.stored_size,
            compression_ratio: written.compression_ratio,
        })
    }
}

/// Deterministic digest over a canonical ordering of the version state.
///
/// Fixed fields are hashed in a fixed order; `Option` fields encode their
/// presence explicitly, and optional extras are hashed as sorted
/// `key=value` lines, so changing any field (or merely adding one)
/// changes the digest.
pub fn compute_state_hash(state: &PageState, content_ref: &ContentRef, drive_id: &str) -> StateHash {
    let mut hasher = Sha256::new();

    let mut line = |key: &str, value: &str| {
        hasher.update(key.as_bytes());
        hasher.update([b'=']);
        hasher.update(value.as_bytes());
        hasher.update([b'\n']);
    };

    line("title", &state.title);
    line("content_ref", content_ref.as_str());
    match &state.parent_id {
        Some(p) => line("parent_id", &format!("+{p}")),
        None => line("parent_id", "-"),
    }
    match state.position {
        Some(p) => line("position", &format!("+{p}")),
        None => line("position", "-"),
    }
    line("is_trashed", if state.is_trashed { "1" } else { "0" });
    line("type", &state.page_type);
    line("drive_id", drive_id);

    // BTreeMap iteration gives the sorted canonical order.
    for (key, value) in &state.optional {
        line(&format!("opt:{key}"), value);
    }

    StateHash::from_hasher(hasher)
}

/// Best-effort content format detection from structural markers.
pub fn detect_content_format(content: &str) -> &'static str {
    let trimmed = content.trim_start();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(content) {
            // Rich-text documents are JSON with a top-level doc node.
            if value.get("type").and_then(Value::as_str) == Some("doc") {
                return "richtext";
            }
            return "json";
        }
    }

    if trimmed.starts_with('<') && trimmed.contains('>') {
        return "html";
    }

    "text"
}
