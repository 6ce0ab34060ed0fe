use chrono::Utc;
use pagediff_core::types::{ContentRef, PageVersion};
use pagediff_core::version::{
    compute_state_hash, MemoryVersionStore, PageState, ResolveVersionRequest,
    StackedResolveEntry, VersionResolver, VersionStore,
};
use serde_json::Map;

fn version(page_id: &str, change_group_id: &str, revision: u64, body: &str) -> PageVersion {
    let content_ref = ContentRef::compute("text", body.as_bytes());
    let state = PageState {
        title: format!("{page_id} r{revision}"),
        page_type: "document".into(),
        ..PageState::default()
    };
    let state_hash = compute_state_hash(&state, &content_ref, "drive-1");

    PageVersion {
        id: format!("{page_id}:{revision}"),
        page_id: page_id.into(),
        drive_id: "drive-1".into(),
        content_ref,
        content_format: "text".into(),
        content_size: body.len(),
        page_revision: revision,
        state_hash,
        change_group_id: Some(change_group_id.into()),
        change_group_type: None,
        created_by: None,
        source: "editor".into(),
        label: None,
        reason: None,
        metadata: Map::new(),
        created_at: Utc::now(),
    }
}

fn request(page_id: &str, change_group_id: &str) -> ResolveVersionRequest {
    ResolveVersionRequest {
        page_id: page_id.into(),
        change_group_id: change_group_id.into(),
        activity_content_ref: None,
    }
}

#[test]
fn resolves_the_most_recent_version() {
    let store = MemoryVersionStore::new();
    store.insert_version(version("p1", "cg1", 1, "first")).unwrap();
    store.insert_version(version("p1", "cg1", 5, "fifth")).unwrap();
    store.insert_version(version("p1", "cg1", 3, "third")).unwrap();

    let resolver = VersionResolver::new(&store);
    let pair = resolver
        .resolve_version_content(&request("p1", "cg1"))
        .unwrap()
        .expect("a version exists");

    assert_eq!(pair.after_revision, 5);
    assert_eq!(pair.before_revision, 4);
    assert_eq!(
        pair.after_content_ref,
        ContentRef::compute("text", b"fifth")
    );
    assert_eq!(pair.before_content_ref, None);
}

#[test]
fn activity_ref_becomes_the_before_side() {
    let store = MemoryVersionStore::new();
    store.insert_version(version("p1", "cg1", 2, "after")).unwrap();

    let snapshot_ref = ContentRef::compute("text", b"before snapshot");
    let resolver = VersionResolver::new(&store);
    let pair = resolver
        .resolve_version_content(&ResolveVersionRequest {
            activity_content_ref: Some(snapshot_ref.clone()),
            ..request("p1", "cg1")
        })
        .unwrap()
        .unwrap();

    assert_eq!(pair.before_content_ref, Some(snapshot_ref));
}

#[test]
fn revision_zero_clamps_before_revision_at_zero() {
    let store = MemoryVersionStore::new();
    store.insert_version(version("p1", "cg1", 0, "genesis")).unwrap();

    let resolver = VersionResolver::new(&store);
    let pair = resolver
        .resolve_version_content(&request("p1", "cg1"))
        .unwrap()
        .unwrap();

    assert_eq!(pair.after_revision, 0);
    assert_eq!(pair.before_revision, 0, "never negative");
}

#[test]
fn missing_version_resolves_to_none() {
    let store = MemoryVersionStore::new();
    let resolver = VersionResolver::new(&store);

    let resolved = resolver
        .resolve_version_content(&request("p1", "cg-unknown"))
        .unwrap();
    assert!(resolved.is_none());
}

#[test]
fn batch_resolution_deduplicates_and_skips_missing_groups() {
    let store = MemoryVersionStore::new();
    store.insert_version(version("p1", "cg1", 2, "one")).unwrap();
    store.insert_version(version("p2", "cg2", 7, "two")).unwrap();

    let resolver = VersionResolver::new(&store);
    let requests = vec![
        request("p1", "cg1"),
        request("p1", "cg1"), // duplicate group id in one batch
        request("p2", "cg2"),
        request("p3", "cg-missing"),
    ];

    let resolved = resolver.batch_resolve_version_content(&requests).unwrap();

    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved["cg1"].after_revision, 2);
    assert_eq!(resolved["cg2"].after_revision, 7);
    assert!(!resolved.contains_key("cg-missing"));
}

#[test]
fn stacked_resolution_uses_the_groups_first_recorded_ref() {
    let store = MemoryVersionStore::new();
    store.insert_version(version("p1", "cg1", 9, "latest")).unwrap();

    let earliest = ContentRef::compute("text", b"earliest snapshot");
    let resolver = VersionResolver::new(&store);
    let resolved = resolver
        .resolve_stacked_version_content(&[StackedResolveEntry {
            page_id: "p1".into(),
            change_group_id: "cg1".into(),
            first_content_ref: Some(earliest.clone()),
        }])
        .unwrap();

    let pair = &resolved["cg1"];
    // The before side is the stacked group's earliest ref, not rev - 1.
    assert_eq!(pair.before_content_ref, Some(earliest));
    assert_eq!(pair.after_revision, 9);
    assert_eq!(
        pair.after_content_ref,
        ContentRef::compute("text", b"latest")
    );
}
