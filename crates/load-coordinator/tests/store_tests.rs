use std::path::PathBuf;

use brick_types::ErrorKind;
use chrono::{TimeZone, Utc};
use load_coordinator::{
    content_identity, CoordinatorEvent, DocumentRef, DocumentStore, FileStore, LoadError,
    LoadOutcome, LoadPayload, StoreError,
};

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("brickyard-store-{}", uuid::Uuid::new_v4()))
}

// ── FileStore ────────────────────────────────────────────────────────────

#[test]
fn stored_names_carry_slug_and_timestamp() {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(
        FileStore::stored_name("Small Red Car", at),
        "small-red-car-20240102T030405000Z.ldr"
    );
    assert_eq!(
        FileStore::stored_name("", at),
        "untitled-20240102T030405000Z.ldr"
    );
}

#[tokio::test]
async fn write_then_read_returns_the_document() {
    let dir = scratch_dir();
    let store = FileStore::new(&dir);
    let reference = store.write("Small Red Car", "0 STEP\n").await.unwrap();
    assert!(reference.as_str().starts_with("small-red-car-"));
    assert_eq!(store.read(&reference).await.unwrap(), "0 STEP\n");
    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn missing_file_is_an_io_error_with_source() {
    let store = FileStore::new(scratch_dir());
    let err = store.read(&DocumentRef::new("nope.ldr")).await.unwrap_err();
    match &err {
        StoreError::Io { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
        }
        other => panic!("expected Io, got {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(LoadError::from(err).kind(), ErrorKind::Io);
}

#[tokio::test]
async fn references_cannot_escape_the_root() {
    let store = FileStore::new(scratch_dir());
    for bad in ["../secret.ldr", "/etc/passwd", "", "a/../../b.ldr"] {
        let err = store.read(&DocumentRef::new(bad)).await.unwrap_err();
        assert!(
            matches!(err, StoreError::InvalidReference { .. }),
            "{bad:?} gave {err:?}"
        );
    }
}

// ── Requests ─────────────────────────────────────────────────────────────

#[test]
fn identities_hash_content() {
    let a = LoadPayload::Source("let b = Builder();".into());
    let b = LoadPayload::Source("let b = Builder();".into());
    let c = LoadPayload::Document("let b = Builder();".into());
    assert_eq!(a.identity(), b.identity());
    assert_ne!(a.identity(), c.identity());
    assert_eq!(a.identity(), content_identity("source", "let b = Builder();"));
    // "source:" plus 64 hex digits.
    assert_eq!(a.identity().len(), 7 + 64);
    assert_eq!(
        LoadPayload::Stored(DocumentRef::new("car.ldr")).identity(),
        "stored:car.ldr"
    );
}

#[test]
fn events_and_outcomes_serialize_tagged() {
    let event = CoordinatorEvent::LoadFailed {
        generation: 3,
        kind: ErrorKind::Timeout,
        message: "too slow".into(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "LoadFailed");
    assert_eq!(json["kind"], "timeout");

    let outcome = LoadOutcome::Stale {
        generation: 1,
        latest: 2,
    };
    let back: LoadOutcome =
        serde_json::from_str(&serde_json::to_string(&outcome).unwrap()).unwrap();
    assert_eq!(back, outcome);
}
