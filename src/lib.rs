//! Content-addressable page version store with budgeted diff generation.
//!
//! `pagediff-core` provides deduplicated, optionally-compressed content
//! storage keyed by content hash, immutable page-version records with
//! canonical state hashing, before/after resolution for single and stacked
//! edit groups, bounded unified-diff generation, and a budget allocator
//! that fits many competing diffs into a fixed output window (e.g. an LLM
//! context slice). Storage writes are idempotent; diff generation and
//! budget allocation are pure — identical inputs always produce identical
//! outputs.

pub mod activity;
pub mod budget;
pub mod codec;
pub mod diff;
pub mod store;
pub mod types;
pub mod version;
