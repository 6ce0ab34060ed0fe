//! Content-addressed blob storage with a threshold compression policy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, EncodedContent};
use crate::store::{BlobStore, StoreError};
use crate::types::ContentRef;

const BLOB_PREFIX: &str = "blob:";
const META_PREFIX: &str = "meta:";

/// Per-write compression policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    /// Compress iff the content meets the codec threshold.
    #[default]
    Auto,
    Force,
    Disable,
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub compress: CompressionMode,
}

/// Sidecar record persisted next to every blob.
///
/// Carries the write-time compressed flag; decoding trusts this flag
/// rather than sniffing payload bytes, so raw content that begins with
/// marker-like bytes cannot be misclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub compressed: bool,
    pub original_size: usize,
    pub stored_size: usize,
}

impl BlobMetadata {
    /// `stored_size / original_size`; 1.0 when the original is empty.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            1.0
        } else {
            self.stored_size as f64 / self.original_size as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub content_ref: ContentRef,
    /// Original, uncompressed size in bytes.
    pub size: usize,
    pub compressed: bool,
    pub stored_size: usize,
    pub compression_ratio: f64,
}

impl WriteOutcome {
    fn from_metadata(content_ref: ContentRef, meta: BlobMetadata) -> Self {
        Self {
            content_ref,
            size: meta.original_size,
            compressed: meta.compressed,
            stored_size: meta.stored_size,
            compression_ratio: meta.compression_ratio(),
        }
    }
}

/// Content-addressed store over an abstract [`BlobStore`].
///
/// Blobs are immutable once written; writing content whose ref already
/// exists is a no-op returning the recorded metadata, which makes writes
/// idempotent and convergent under arbitrary concurrency.
#[derive(Debug)]
pub struct ContentStore<B: BlobStore> {
    blobs: B,
}

impl<B: BlobStore> ContentStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    /// Write `content` in `format`, returning its ref and compression
    /// metadata. The ref is a digest over `(format, content)`, so two
    /// formats of identical text never collide.
    pub fn write(
        &self,
        content: &str,
        format: &str,
        options: &WriteOptions,
    ) -> Result<WriteOutcome, StoreError> {
        if format.is_empty() {
            return Err(StoreError::InvalidInput("content format must not be empty"));
        }

        let content_ref = ContentRef::compute(format, content.as_bytes());

        // Idempotent no-op for an already-stored ref.
        if let Some(meta) = self.lookup_metadata(&content_ref)? {
            debug!(r = content_ref.as_str(), "content already stored, skipping write");
            return Ok(WriteOutcome::from_metadata(content_ref, meta));
        }

        let encoded = encode(content, options.compress)?;
        let meta = BlobMetadata {
            compressed: encoded.compressed,
            original_size: encoded.original_size,
            stored_size: encoded.stored_size,
        };

        // Payload first, sidecar second: a ref only becomes readable once
        // its metadata exists, so readers never see a half-written pair.
        self.blobs
            .put(&format!("{BLOB_PREFIX}{content_ref}"), &encoded.bytes)?;
        self.blobs.put(
            &format!("{META_PREFIX}{content_ref}"),
            &serde_json::to_vec(&meta)?,
        )?;

        debug!(
            r = content_ref.as_str(),
            size = meta.original_size,
            compressed = meta.compressed,
            "content stored"
        );

        Ok(WriteOutcome::from_metadata(content_ref, meta))
    }

    /// Read content back by ref.
    pub fn read(&self, ref_str: &str) -> Result<String, StoreError> {
        let content_ref = ContentRef::parse(ref_str)?;
        let meta = self.require_metadata(&content_ref)?;

        let payload = self
            .blobs
            .get(&format!("{BLOB_PREFIX}{content_ref}"))?
            .ok_or_else(|| {
                StoreError::CorruptData(format!("metadata present but payload missing for {content_ref}"))
            })?;

        Ok(codec::decompress_if_needed(&payload, meta.compressed)?)
    }

    pub fn is_compressed(&self, ref_str: &str) -> Result<bool, StoreError> {
        let content_ref = ContentRef::parse(ref_str)?;
        Ok(self.require_metadata(&content_ref)?.compressed)
    }

    pub fn metadata(&self, ref_str: &str) -> Result<BlobMetadata, StoreError> {
        let content_ref = ContentRef::parse(ref_str)?;
        self.require_metadata(&content_ref)
    }

    fn lookup_metadata(&self, content_ref: &ContentRef) -> Result<Option<BlobMetadata>, StoreError> {
        match self.blobs.get(&format!("{META_PREFIX}{content_ref}"))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn require_metadata(&self, content_ref: &ContentRef) -> Result<BlobMetadata, StoreError> {
        self.lookup_metadata(content_ref)?
            .ok_or_else(|| StoreError::NotFound(content_ref.as_str().to_string()))
    }
}

fn encode(content: &str, mode: CompressionMode) -> Result<EncodedContent, StoreError> {
    match mode {
        CompressionMode::Auto => Ok(codec::compress_if_needed(content)?),
        CompressionMode::Disable => Ok(raw_encoding(content)),
        CompressionMode::Force => {
            // Forcing compression of empty content degrades to raw; the
            // codec rejects empty input outright.
            if content.is_empty() {
                return Ok(raw_encoding(content));
            }
            let out = codec::compress(content)?;
            Ok(EncodedContent {
                bytes: out.data,
                compressed: true,
                original_size: out.original_size,
                stored_size: out.compressed_size,
            })
        }
    }
}

fn raw_encoding(content: &str) -> EncodedContent {
    let bytes = content.as_bytes().to_vec();
    let size = bytes.len();
    EncodedContent {
        bytes,
        compressed: false,
        original_size: size,
        stored_size: size,
    }
}
