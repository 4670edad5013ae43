//! Integration test: append-only journal store.

use chrono::{Duration, Utc};
use contact_journal_core::{
    FeedbackRecord, InsightType, InteractionRecord, JournalRecord, JournalStore, StorageScope,
};
use std::io::Write;

fn interaction(kind: &str, comfort: &str) -> JournalRecord {
    InteractionRecord::new(kind, comfort, None).into()
}

fn with_timestamp(mut record: JournalRecord, ts: &str) -> JournalRecord {
    match &mut record {
        JournalRecord::Interaction(r) => r.timestamp = ts.to_string(),
        JournalRecord::Feedback(r) => r.timestamp = ts.to_string(),
    }
    record
}

#[tokio::test]
async fn first_append_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JournalStore::new(dir.path());
    let scope = StorageScope::Global;

    let path = store.journal_path(&scope, "u1").unwrap();
    assert!(!path.exists());

    store
        .append(&scope, "u1", &interaction("Met New Person", "Neutral"))
        .await
        .unwrap();
    assert!(path.exists());
    assert_eq!(path, dir.path().join("interactions").join("u1.jsonl"));

    let records = store.read_all(&scope, "u1").await.unwrap();
    assert_eq!(records.len(), 1);
    let only = records[0].as_interaction().unwrap();
    assert_eq!(only.interaction_type, "Met New Person");
    assert_eq!(only.comfort_level, "Neutral");
    assert!(only.id.starts_with("int_"));
    assert!(records[0].timestamp_utc().is_some());
}

#[tokio::test]
async fn read_all_preserves_append_order_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JournalStore::new(dir.path());
    let scope = StorageScope::from_app_id(Some("social")).unwrap();

    let first = interaction("Initiated Conversation", "Comfortable");
    let feedback: JournalRecord = FeedbackRecord::new(
        vec![first.id().to_string()],
        "Nice work reaching out.",
        InsightType::Encouragement,
    )
    .into();
    let second: JournalRecord = InteractionRecord::new(
        "Did a Favor",
        "Very Comfortable",
        Some("carried groceries\nfor a neighbour".to_string()),
    )
    .into();

    let appended = vec![first, feedback, second];
    for record in &appended {
        store.append(&scope, "u1", record).await.unwrap();
    }

    assert_eq!(store.read_all(&scope, "u1").await.unwrap(), appended);
    assert!(dir
        .path()
        .join("apps/social/interactions/u1.jsonl")
        .exists());
}

#[tokio::test]
async fn recent_returns_last_interactions_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = JournalStore::new(dir.path());
    let scope = StorageScope::Global;

    let mut ids = Vec::new();
    for i in 0..5 {
        let record = interaction(&format!("kind-{i}"), "Neutral");
        ids.push(record.id().to_string());
        store.append(&scope, "u1", &record).await.unwrap();
        let fb: JournalRecord =
            FeedbackRecord::new(vec![record.id().to_string()], "ok", InsightType::Observation).into();
        store.append(&scope, "u1", &fb).await.unwrap();
    }

    let recent = store.recent(&scope, "u1", 3).await.unwrap();
    let recent_ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(recent_ids, vec![ids[4].as_str(), ids[3].as_str(), ids[2].as_str()]);

    let all = store.recent(&scope, "u1", 50).await.unwrap();
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = JournalStore::new(dir.path());
    let scope = StorageScope::Global;

    let good_a = interaction("Met New Person", "Neutral");
    let good_b = interaction("Listened Intently", "Comfortable");
    store.append(&scope, "u1", &good_a).await.unwrap();

    let path = store.journal_path(&scope, "u1").unwrap();
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{{\"id\": \"broken\", \"recordType\": ").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "{{\"recordType\":\"unknown\",\"id\":\"x\",\"timestamp\":\"t\"}}").unwrap();
    drop(file);

    store.append(&scope, "u1", &good_b).await.unwrap();

    let records = store.read_all(&scope, "u1").await.unwrap();
    assert_eq!(records, vec![good_a, good_b]);
}

#[tokio::test]
async fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JournalStore::new(dir.path());
    let scope = StorageScope::Tenant("nobody-here".to_string());

    assert!(store.read_all(&scope, "ghost").await.unwrap().is_empty());
    assert!(store.recent(&scope, "ghost", 10).await.unwrap().is_empty());
    assert!(store.since(&scope, "ghost", Utc::now()).await.unwrap().is_empty());
    assert!(!dir.path().join("apps").exists());
}

#[tokio::test]
async fn since_filters_by_timestamp_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = JournalStore::new(dir.path());
    let scope = StorageScope::Global;

    let old = with_timestamp(interaction("Met New Person", "Neutral"), "2024-01-01T08:00:00.000Z");
    let edge = with_timestamp(
        FeedbackRecord::new(vec![], "ok", InsightType::Suggestion).into(),
        "2024-02-01T00:00:00.000Z",
    );
    let newer = with_timestamp(interaction("Did a Favor", "Comfortable"), "2024-03-05T12:30:00.000Z");
    for r in [&old, &edge, &newer] {
        store.append(&scope, "u1", r).await.unwrap();
    }

    let threshold = "2024-02-01T00:00:00Z".parse().unwrap();
    let records = store.since(&scope, "u1", threshold).await.unwrap();
    assert_eq!(records, vec![edge, newer]);

    let future = Utc::now() + Duration::days(365);
    assert!(store.since(&scope, "u1", future).await.unwrap().is_empty());
}

#[tokio::test]
async fn unsafe_user_key_is_rejected_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let store = JournalStore::new(dir.path());

    let err = store
        .append(&StorageScope::Global, "../escape", &interaction("x", "y"))
        .await
        .unwrap_err();
    assert_eq!(err.problems()[0].field, "userKey");
    assert!(!dir.path().join("interactions").exists());
}
