use std::sync::Arc;
use std::thread;

use pagediff_core::store::{
    CompressionMode, ContentStore, FsBlobStore, MemoryBlobStore, StoreError, WriteOptions,
};
use tempfile::tempdir;

fn store() -> ContentStore<MemoryBlobStore> {
    ContentStore::new(MemoryBlobStore::new())
}

#[test]
fn write_read_roundtrip_uncompressed() {
    let store = store();
    let content = "small note";

    let outcome = store
        .write(content, "text", &WriteOptions::default())
        .unwrap();
    assert!(!outcome.compressed);
    assert_eq!(outcome.size, content.len());
    assert_eq!(outcome.stored_size, content.len());
    assert_eq!(outcome.compression_ratio, 1.0);

    let restored = store.read(outcome.content_ref.as_str()).unwrap();
    assert_eq!(restored, content);
}

#[test]
fn write_read_roundtrip_compressed() {
    let store = store();
    let content = "a paragraph of page content, repeated. ".repeat(200);

    let outcome = store
        .write(&content, "text", &WriteOptions::default())
        .unwrap();
    assert!(outcome.compressed);
    assert_eq!(outcome.size, content.len());
    assert!(outcome.stored_size < content.len());
    assert!(outcome.compression_ratio < 1.0);

    let restored = store.read(outcome.content_ref.as_str()).unwrap();
    assert_eq!(restored, content);
    assert!(store.is_compressed(outcome.content_ref.as_str()).unwrap());
}

#[test]
fn empty_content_roundtrips() {
    let store = store();

    let outcome = store.write("", "text", &WriteOptions::default()).unwrap();
    assert!(!outcome.compressed);
    assert_eq!(outcome.size, 0);
    assert_eq!(outcome.compression_ratio, 1.0);

    assert_eq!(store.read(outcome.content_ref.as_str()).unwrap(), "");
}

#[test]
fn same_content_different_format_gets_different_refs() {
    let store = store();

    let a = store
        .write("{\"k\": 1}", "json", &WriteOptions::default())
        .unwrap();
    let b = store
        .write("{\"k\": 1}", "text", &WriteOptions::default())
        .unwrap();

    assert_ne!(a.content_ref, b.content_ref);
}

#[test]
fn duplicate_write_is_an_idempotent_noop() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let store = ContentStore::new(Arc::clone(&blobs));
    let content = "identical content";

    let first = store
        .write(content, "text", &WriteOptions::default())
        .unwrap();
    let keys_after_first = blobs.len();

    let second = store
        .write(content, "text", &WriteOptions::default())
        .unwrap();

    assert_eq!(first.content_ref, second.content_ref);
    assert_eq!(first.size, second.size);
    assert_eq!(first.compressed, second.compressed);
    assert_eq!(blobs.len(), keys_after_first, "no duplicate storage");
}

#[test]
fn concurrent_identical_writers_converge_on_one_ref() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let store = Arc::new(ContentStore::new(Arc::clone(&blobs)));
    let content = "concurrently written page body ".repeat(100);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let content = content.clone();
            thread::spawn(move || {
                store
                    .write(&content, "text", &WriteOptions::default())
                    .unwrap()
                    .content_ref
            })
        })
        .collect();

    let refs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(refs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(blobs.len(), 2, "payload + sidecar for exactly one blob");

    let restored = store.read(refs[0].as_str()).unwrap();
    assert_eq!(restored, content);
}

#[test]
fn malformed_ref_is_invalid_reference() {
    let store = store();

    let uppercase = "A".repeat(64);
    let nonhex = "g".repeat(64);
    for bad in ["nope", "", "ABC", uppercase.as_str(), nonhex.as_str()] {
        let err = store.read(bad).unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference(_)), "ref {bad:?}");
    }
}

#[test]
fn wellformed_missing_ref_is_not_found() {
    let store = store();
    let missing = "0".repeat(64);

    assert!(matches!(store.read(&missing), Err(StoreError::NotFound(_))));
    assert!(matches!(store.is_compressed(&missing), Err(StoreError::NotFound(_))));
    assert!(matches!(store.metadata(&missing), Err(StoreError::NotFound(_))));
}

#[test]
fn compression_can_be_forced_and_disabled() {
    let store = store();

    let forced = store
        .write(
            "tiny",
            "text",
            &WriteOptions {
                compress: CompressionMode::Force,
            },
        )
        .unwrap();
    assert!(forced.compressed);
    assert_eq!(store.read(forced.content_ref.as_str()).unwrap(), "tiny");

    let disabled = store
        .write(
            &"x".repeat(8192),
            "text",
            &WriteOptions {
                compress: CompressionMode::Disable,
            },
        )
        .unwrap();
    assert!(!disabled.compressed);
    assert_eq!(disabled.stored_size, 8192);
}

#[test]
fn metadata_reports_write_time_facts() {
    let store = store();
    let content = "m".repeat(4096);

    let outcome = store
        .write(&content, "text", &WriteOptions::default())
        .unwrap();
    let meta = store.metadata(outcome.content_ref.as_str()).unwrap();

    assert!(meta.compressed);
    assert_eq!(meta.original_size, 4096);
    assert_eq!(meta.stored_size, outcome.stored_size);
    assert!(meta.compression_ratio() < 1.0);
}

#[test]
fn filesystem_backend_roundtrips() {
    let dir = tempdir().unwrap();
    let store = ContentStore::new(FsBlobStore::open(dir.path().join("blobs")).unwrap());
    let content = "persisted to disk ".repeat(100);

    let outcome = store
        .write(&content, "text", &WriteOptions::default())
        .unwrap();
    let restored = store.read(outcome.content_ref.as_str()).unwrap();
    assert_eq!(restored, content);
}
