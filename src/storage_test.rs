use super::*;

fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("portal-session-{}.json", uuid::Uuid::new_v4()))
}

fn tiers() -> (Arc<MemoryStore>, Arc<MemoryStore>, TieredStore) {
    let persistent = Arc::new(MemoryStore::new());
    let session = Arc::new(MemoryStore::new());
    let store = TieredStore::new(persistent.clone(), session.clone());
    (persistent, session, store)
}

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    store.set("token", "t1");
    assert_eq!(store.get("token").unwrap().as_deref(), Some("t1"));
    assert_eq!(store.len(), 1);
    store.remove("token");
    assert!(store.get("token").unwrap().is_none());
    assert!(store.is_empty());
}

#[test]
fn memory_store_overwrites() {
    let store = MemoryStore::new();
    store.set("k", "a");
    store.set("k", "b");
    assert_eq!(store.get("k").unwrap().as_deref(), Some("b"));
}

// =============================================================================
// FileStore
// =============================================================================

#[test]
fn file_store_missing_file_is_empty() {
    let store = FileStore::new(temp_path());
    assert!(store.get(TOKEN_KEY).unwrap().is_none());
}

#[test]
fn file_store_persists_across_instances() {
    let path = temp_path();
    FileStore::new(&path).set(TOKEN_KEY, "t1");
    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
    reopened.remove(TOKEN_KEY);
    assert!(!path.exists());
}

#[test]
fn file_store_keeps_other_keys_on_remove() {
    let path = temp_path();
    let store = FileStore::new(&path);
    store.set(TOKEN_KEY, "t1");
    store.set(USER_KEY, r#"{"id":"1"}"#);
    store.remove(TOKEN_KEY);
    assert!(store.get(TOKEN_KEY).unwrap().is_none());
    assert_eq!(store.get(USER_KEY).unwrap().as_deref(), Some(r#"{"id":"1"}"#));
    store.remove(USER_KEY);
}

#[test]
fn file_store_garbage_file_is_an_error_until_replaced() {
    let path = temp_path();
    std::fs::write(&path, "not json at all").unwrap();
    let store = FileStore::new(&path);
    assert!(matches!(store.get(TOKEN_KEY), Err(StorageError::Format(_))));

    store.set(TOKEN_KEY, "t2");
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t2"));
    store.remove(TOKEN_KEY);
}

#[test]
fn file_store_non_string_value_is_an_error() {
    let path = temp_path();
    std::fs::write(&path, r#"{"token":"t1","user":5}"#).unwrap();
    let store = FileStore::new(&path);
    assert!(store.get(TOKEN_KEY).is_err());
    assert!(store.get(USER_KEY).is_err());

    store.remove(TOKEN_KEY);
    assert!(!path.exists());
}

#[test]
fn file_store_creates_parent_directories() {
    let dir = std::env::temp_dir().join(format!("portal-session-dir-{}", uuid::Uuid::new_v4()));
    let path = dir.join("nested").join("store.json");
    let store = FileStore::new(&path);
    store.set(TOKEN_KEY, "t3");
    assert!(path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

// =============================================================================
// TieredStore
// =============================================================================

#[test]
fn tiered_prefers_persistent_tier() {
    let (persistent, session, store) = tiers();
    persistent.set(TOKEN_KEY, "remembered");
    session.set(TOKEN_KEY, "session-only");
    assert_eq!(store.get_preferred(TOKEN_KEY).unwrap().as_deref(), Some("remembered"));
}

#[test]
fn tiered_falls_back_to_session_tier() {
    let (_persistent, session, store) = tiers();
    session.set(TOKEN_KEY, "session-only");
    assert_eq!(store.get_preferred(TOKEN_KEY).unwrap().as_deref(), Some("session-only"));
}

#[test]
fn tiered_pair_never_mixes_tiers() {
    let (persistent, session, store) = tiers();
    persistent.set(TOKEN_KEY, "stale-token");
    session.set(TOKEN_KEY, "fresh");
    session.set(USER_KEY, r#"{"id":"2","role":"admin"}"#);

    let (token, user) = store.get_preferred_pair(TOKEN_KEY, USER_KEY).unwrap();
    assert_eq!(token.as_deref(), Some("stale-token"));
    assert!(user.is_none());
}

#[test]
fn tiered_pair_uses_session_tier_when_persistent_is_empty() {
    let (_persistent, session, store) = tiers();
    session.set(TOKEN_KEY, "fresh");
    session.set(USER_KEY, "u");

    let pair = store.get_preferred_pair(TOKEN_KEY, USER_KEY).unwrap();
    assert_eq!(pair, (Some("fresh".to_owned()), Some("u".to_owned())));
}

#[test]
fn tiered_pair_reports_unreadable_persistent_tier() {
    let path = temp_path();
    std::fs::write(&path, "[1, 2").unwrap();
    let store = TieredStore::with_file(&path);
    assert!(store.get_preferred_pair(TOKEN_KEY, USER_KEY).is_err());
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn tiered_set_and_clear_hit_both_tiers() {
    let (persistent, session, store) = tiers();

    store.set_both(TOKEN_KEY, "t1");
    assert_eq!(persistent.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
    assert_eq!(session.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));

    store.clear_both(TOKEN_KEY);
    assert!(persistent.is_empty());
    assert!(session.is_empty());
}

#[test]
fn tiered_with_file_round_trips() {
    let path = temp_path();
    let store = TieredStore::with_file(&path);
    store.set_both(USER_KEY, "u");
    assert_eq!(
        TieredStore::with_file(&path).get_preferred(USER_KEY).unwrap().as_deref(),
        Some("u")
    );
    store.clear_both(USER_KEY);
    assert!(!path.exists());
}
