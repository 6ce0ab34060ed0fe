pub mod blob;
pub mod content;

use thiserror::Error;

use crate::codec::CodecError;
use crate::types::RefParseError;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use content::{BlobMetadata, CompressionMode, ContentStore, WriteOptions, WriteOutcome};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed ref string on read/introspect. Caller bug; fails fast.
    #[error("Invalid content ref: {0}")]
    InvalidReference(#[from] RefParseError),
    /// Well-formed ref with no backing blob. An error for direct reads,
    /// since the caller asserted the ref should exist.
    #[error("No stored content for ref {0}")]
    NotFound(String),
    #[error("Invalid store input: {0}")]
    InvalidInput(&'static str),
    #[error("Corrupt stored content: {0}")]
    CorruptData(String),
    #[error("Blob backend error: {0}")]
    Backend(#[from] std::io::Error),
    #[error("Blob metadata encoding error: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl From<CodecError> for StoreError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidInput(msg) => StoreError::InvalidInput(msg),
            CodecError::CorruptData(msg) => StoreError::CorruptData(msg),
        }
    }
}
