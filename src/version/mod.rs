pub mod resolver;
pub mod store;
pub mod writer;

use thiserror::Error;

use crate::store::StoreError;

pub use resolver::{
    ResolveVersionRequest, ResolvedVersionPair, StackedResolveEntry, VersionResolver,
};
pub use store::{GroupKey, MemoryVersionStore, VersionQuery, VersionStore};
pub use writer::{
    compute_state_hash, detect_content_format, CreateVersionInput, CreateVersionOptions,
    CreatedVersion, PageState, VersionWriter,
};

#[derive(Debug, Error)]
pub enum VersionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Version backend error: {0}")]
    Backend(String),
}
