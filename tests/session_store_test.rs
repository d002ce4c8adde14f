//! Tests for the session store over the in-memory backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::advance;
use tokio_util::sync::CancellationToken;

use mastermind::{
    KeyValueStore, MemoryStore, SessionStore, StoreError, StoreErrorKind, StoreKey, Ttl, TtlDefaults,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Score {
    player: String,
    points: u32,
}

fn score(points: u32) -> Score {
    Score {
        player: "ada".to_string(),
        points,
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Store with no default expirations, so each test controls TTLs explicitly.
fn setup_store() -> SessionStore<Arc<MemoryStore>> {
    SessionStore::new(Arc::new(MemoryStore::new()), TtlDefaults::default()).with_diagnostics(true)
}

#[tokio::test]
async fn test_set_then_get_with_equivalent_keys() {
    let store = setup_store();
    let cancel = CancellationToken::new();

    store
        .set("  Game  42 ", &score(7), Ttl::default(), &cancel)
        .await
        .expect("Set failed");

    let found: Option<Score> = store.get("game:42", &cancel).await.expect("Get failed");
    assert_eq!(found, Some(score(7)));

    let by_segments: Option<Score> = store
        .get(["GAME", " 42"], &cancel)
        .await
        .expect("Get failed");
    assert_eq!(by_segments, Some(score(7)));
}

#[tokio::test]
async fn test_missing_key_is_none() {
    let store = setup_store();
    let found: Option<Score> = store
        .get("nothing-here", &CancellationToken::new())
        .await
        .expect("Get failed");
    assert!(found.is_none());
}

#[tokio::test]
async fn test_blank_key_is_invalid() {
    let store = setup_store();
    let cancel = CancellationToken::new();

    let err = store.get::<Score>("   ", &cancel).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::InvalidKey);

    let err = store
        .set(StoreKey::segments(Vec::<String>::new()), &score(1), Ttl::default(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::InvalidKey);

    let err = store.remove(["", "  "], &cancel).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::InvalidKey);
}

#[tokio::test]
async fn test_remove_deletes_and_tolerates_absent_keys() {
    let store = setup_store();
    let cancel = CancellationToken::new();

    store.set("k", &score(1), Ttl::default(), &cancel).await.expect("Set failed");
    store.remove("K", &cancel).await.expect("Remove failed");
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_none());

    store.remove("k", &cancel).await.expect("Second remove failed");
}

#[tokio::test]
async fn test_value_of_wrong_shape_is_serialization_error() {
    let store = setup_store();
    let cancel = CancellationToken::new();

    store.set("k", &"just text", Ttl::default(), &cancel).await.expect("Set failed");
    let err = store.get::<Score>("k", &cancel).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::Serialization);
}

#[tokio::test(start_paused = true)]
async fn test_absolute_expiration() {
    let store = setup_store();
    let cancel = CancellationToken::new();

    store
        .set("k", &score(1), Ttl::new(Some(secs(10)), None), &cancel)
        .await
        .expect("Set failed");

    advance(secs(9)).await;
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_some());

    advance(secs(2)).await;
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_sliding_expiration_renews_on_read() {
    let store = setup_store();
    let cancel = CancellationToken::new();

    store
        .set("k", &score(1), Ttl::new(None, Some(secs(10))), &cancel)
        .await
        .expect("Set failed");

    advance(secs(6)).await;
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_some());
    advance(secs(6)).await;
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_some());

    advance(secs(11)).await;
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_sliding_never_outlives_absolute() {
    let store = setup_store();
    let cancel = CancellationToken::new();

    store
        .set("k", &score(1), Ttl::new(Some(secs(15)), Some(secs(10))), &cancel)
        .await
        .expect("Set failed");

    advance(secs(6)).await;
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_some());
    advance(secs(6)).await;
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_some());

    advance(secs(4)).await;
    assert!(store.get::<Score>("k", &cancel).await.expect("Get failed").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_store_defaults_apply_and_zero_disables() {
    let backend = Arc::new(MemoryStore::new());
    let store = SessionStore::new(
        Arc::clone(&backend),
        TtlDefaults {
            absolute: secs(5),
            sliding: Duration::ZERO,
        },
    );
    let cancel = CancellationToken::new();

    store.set("defaulted", &score(1), Ttl::default(), &cancel).await.expect("Set failed");
    store
        .set("forever", &score(2), Ttl::new(Some(Duration::ZERO), None), &cancel)
        .await
        .expect("Set failed");

    advance(secs(6)).await;
    assert!(store.get::<Score>("defaulted", &cancel).await.expect("Get failed").is_none());
    assert_eq!(
        store.get::<Score>("forever", &cancel).await.expect("Get failed"),
        Some(score(2))
    );
    assert_eq!(backend.len().expect("Lock poisoned"), 1);
}

#[tokio::test]
async fn test_get_or_create_runs_factory_once() {
    let store = setup_store();
    let cancel = CancellationToken::new();
    let counter = AtomicUsize::new(0);
    let calls = &counter;

    for _ in 0..2 {
        let value: Option<Score> = store
            .get_or_create(
                "lazy",
                move |_cancel| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, StoreError>(Some(score(3)))
                },
                Ttl::default(),
                &cancel,
            )
            .await
            .expect("Get or create failed");
        assert_eq!(value, Some(score(3)));
    }

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_or_create_does_not_store_none() {
    let backend = Arc::new(MemoryStore::new());
    let store = SessionStore::new(Arc::clone(&backend), TtlDefaults::default());
    let cancel = CancellationToken::new();

    let value: Option<Score> = store
        .get_or_create(
            "absent",
            |_cancel| async { Ok::<_, StoreError>(None) },
            Ttl::default(),
            &cancel,
        )
        .await
        .expect("Get or create failed");

    assert!(value.is_none());
    assert!(backend.is_empty().expect("Lock poisoned"));
}

#[derive(Debug, PartialEq)]
enum LookupError {
    Unavailable,
    Store(StoreErrorKind),
}

impl From<StoreError> for LookupError {
    fn from(err: StoreError) -> Self {
        LookupError::Store(err.kind)
    }
}

#[tokio::test]
async fn test_get_or_create_returns_factory_error_unchanged() {
    let backend = Arc::new(MemoryStore::new());
    let store = SessionStore::new(Arc::clone(&backend), TtlDefaults::default());
    let cancel = CancellationToken::new();

    let result: Result<Option<Score>, LookupError> = store
        .get_or_create(
            "failing",
            |_cancel| async { Err(LookupError::Unavailable) },
            Ttl::default(),
            &cancel,
        )
        .await;

    assert_eq!(result.unwrap_err(), LookupError::Unavailable);
    assert!(backend.is_empty().expect("Lock poisoned"));
}

#[tokio::test]
async fn test_cancelled_token_stops_operations() {
    let backend = Arc::new(MemoryStore::new());
    let store = SessionStore::new(Arc::clone(&backend), TtlDefaults::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = store.set("k", &score(1), Ttl::default(), &cancel).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::Cancelled);
    assert!(backend.is_empty().expect("Lock poisoned"));

    let err = store.get::<Score>("k", &cancel).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::Cancelled);
}

#[tokio::test]
async fn test_empty_stored_bytes_read_as_miss() {
    let backend = Arc::new(MemoryStore::new());
    backend
        .set("blank", Vec::new(), Default::default())
        .await
        .expect("Set failed");

    let store = SessionStore::new(Arc::clone(&backend), TtlDefaults::default());
    let found: Option<Score> = store.get("blank", &CancellationToken::new()).await.expect("Get failed");
    assert!(found.is_none());
}
