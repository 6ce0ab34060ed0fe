use chrono::{TimeZone, Utc};
use pagediff_core::types::{DiffStats, StackedDiff, TimeRange};

#[test]
fn stacked_diff_serialization_matches_golden_snapshot() {
    let ts_from = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let ts_to = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

    let diff = StackedDiff {
        page_id: "p1".into(),
        page_title: "Launch plan".into(),
        change_group_id: Some("cg1".into()),
        ai_conversation_id: None,
        collapsed_count: 2,
        time_range: TimeRange {
            from: ts_from,
            to: ts_to,
        },
        actors: vec!["Ada".into(), "Grace".into()],
        unified_diff: "--- before\n+++ after\n@@ -1 +1 @@\n-old\n+new\n".into(),
        stats: DiffStats::new(1, 1, 0),
        is_ai_generated: true,
        truncated: false,
    };

    let json_str = serde_json::to_string_pretty(&diff).unwrap();

    const EXPECTED_JSON: &str = r#"{
      "page_id": "p1",
      "page_title": "Launch plan",
      "change_group_id": "cg1",
      "ai_conversation_id": null,
      "collapsed_count": 2,
      "time_range": {
        "from": "2024-05-01T09:00:00Z",
        "to": "2024-05-01T09:30:00Z"
      },
      "actors": [
        "Ada",
        "Grace"
      ],
      "unified_diff": "--- before\n+++ after\n@@ -1 +1 @@\n-old\n+new\n",
      "stats": {
        "additions": 1,
        "deletions": 1,
        "unchanged": 0,
        "total_changes": 2
      },
      "is_ai_generated": true,
      "truncated": false
    }"#;

    let normalize = |s: &str| {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
    };
    assert_eq!(
        normalize(&json_str),
        normalize(EXPECTED_JSON),
        "JSON structure mismatch against golden snapshot"
    );

    let roundtripped: StackedDiff = serde_json::from_str(&json_str).unwrap();
    assert_eq!(roundtripped, diff);
}

#[test]
fn diff_stats_totals_are_consistent() {
    let stats = DiffStats::new(12, 3, 40);
    assert_eq!(stats.total_changes, 55);
    assert_eq!(stats.change_weight(), 15);
}
