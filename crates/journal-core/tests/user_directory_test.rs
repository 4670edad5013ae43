//! Integration test: user directory lookup order and tolerance of bad files.

use contact_journal_core::{StorageScope, UserDirectory};

fn write(path: &std::path::Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[tokio::test]
async fn global_map_wins_then_tenant_map() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("users.json"),
        r#"{"alex":{"name":"Alex","created":"2024-01-01T00:00:00.000Z"}}"#,
    );
    write(
        &dir.path().join("apps/recovery/users.json"),
        r#"{"alex":{"name":"Alex (recovery)","created":"2024-02-01"},"sam":{"name":"Sam","created":"2024-02-02"}}"#,
    );
    let users = UserDirectory::new(dir.path());
    let recovery = StorageScope::Tenant("recovery".to_string());

    assert_eq!(users.find("alex", &recovery).await.unwrap().name, "Alex");
    assert_eq!(users.find("sam", &recovery).await.unwrap().name, "Sam");
    assert!(users.find("sam", &StorageScope::Global).await.is_none());
    assert_eq!(users.users(&recovery).await.len(), 2);
}

#[tokio::test]
async fn missing_or_corrupt_maps_are_empty() {
    let dir = tempfile::tempdir().unwrap();
    let users = UserDirectory::new(dir.path());
    assert!(users.users(&StorageScope::Global).await.is_empty());

    write(&dir.path().join("users.json"), "{ broken");
    assert!(users.users(&StorageScope::Global).await.is_empty());
    assert!(users.get(&StorageScope::Global, "alex").await.is_none());
}

#[tokio::test]
async fn one_incomplete_entry_does_not_hide_the_others() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("users.json"),
        r#"{
            "alex": {"name":"Alex","created":"2024-01-01T00:00:00.000Z"},
            "legacy": {"name":"Old"},
            "junk": 42
        }"#,
    );
    let users = UserDirectory::new(dir.path());

    let alex = users.find("alex", &StorageScope::Global).await.unwrap();
    assert_eq!(alex.name, "Alex");
    let legacy = users.find("legacy", &StorageScope::Global).await.unwrap();
    assert_eq!(legacy.name, "Old");
    assert_eq!(legacy.created, "");
    assert!(users.find("junk", &StorageScope::Global).await.is_none());
    assert_eq!(users.users(&StorageScope::Global).await.len(), 2);
}
