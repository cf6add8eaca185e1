mod common;

use common::TestApp;
use std::sync::Arc;
use outreach_booking::{
    domain::models::booking::Booking,
    domain::ports::{BookingRepository, DocumentStore, Expected},
    infra::repositories::{
        document_booking_repo::{DocumentBookingRepo, BOOKINGS_KEY, LEGACY_SLOTS_KEY},
        sqlite_document_store::SqliteDocumentStore,
    },
    error::AppError,
};

#[tokio::test]
async fn test_versioned_document_writes() {
    let app = TestApp::new().await;
    let store = SqliteDocumentStore::new(app.pool.clone());

    assert!(store.get("doc").await.unwrap().is_none());

    let v1 = store.set("doc", "first", Expected::Absent).await.unwrap();
    assert_eq!(v1, 1);

    let again = store.set("doc", "second", Expected::Absent).await;
    assert!(matches!(again, Err(AppError::StoreConflict)));

    let v2 = store.set("doc", "second", Expected::Version(v1)).await.unwrap();
    assert_eq!(v2, 2);

    let stale = store.set("doc", "third", Expected::Version(v1)).await;
    assert!(matches!(stale, Err(AppError::StoreConflict)));

    let v3 = store.set("doc", "forced", Expected::Any).await.unwrap();
    assert_eq!(v3, 3);

    let doc = store.get("doc").await.unwrap().unwrap();
    assert_eq!(doc.value, "forced");
    assert_eq!(doc.version, 3);
}

#[tokio::test]
async fn test_version_on_missing_document_conflicts() {
    let app = TestApp::new().await;
    let store = SqliteDocumentStore::new(app.pool.clone());

    let res = store.set("missing", "x", Expected::Version(4)).await;
    assert!(matches!(res, Err(AppError::StoreConflict)));
}

#[tokio::test]
async fn test_fields_are_versioned_independently() {
    let app = TestApp::new().await;
    let store = SqliteDocumentStore::new(app.pool.clone());

    store.set_field("roster", "b", "{\"n\":2}", Expected::Absent).await.unwrap();
    store.set_field("roster", "a", "{\"n\":1}", Expected::Absent).await.unwrap();
    let a2 = store.set_field("roster", "a", "{\"n\":11}", Expected::Version(1)).await.unwrap();
    assert_eq!(a2, 2);

    // The whole-document slot under the same key is separate.
    assert!(store.get("roster").await.unwrap().is_none());

    let fields = store.get_fields("roster").await.unwrap();
    let names: Vec<&str> = fields.iter().map(|(f, _)| f.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(fields[0].1.version, 2);
    assert_eq!(fields[1].1.version, 1);

    assert!(store.delete_field("roster", "a").await.unwrap());
    assert!(!store.delete_field("roster", "a").await.unwrap());
    assert!(store.get_field("roster", "a").await.unwrap().is_none());

    let empty = store.set_field("roster", "", "x", Expected::Any).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_booking_commit_keeps_legacy_mirror_in_sync() {
    let app = TestApp::new().await;
    let store = SqliteDocumentStore::new(app.pool.clone());
    let service = &app.state.booking_service;

    let first = service.book(service.validate(common_request("2026-02-02-09:00", "phone")).unwrap()).await.unwrap();
    service.book(service.validate(common_request("2026-02-09-13:30", "video")).unwrap()).await.unwrap();

    let mirror = store.get(LEGACY_SLOTS_KEY).await.unwrap().unwrap();
    let slots: Vec<String> = serde_json::from_str(&mirror.value).unwrap();
    assert_eq!(slots, vec!["2026-02-02-09:00", "2026-02-09-13:30"]);

    let full = store.get(BOOKINGS_KEY).await.unwrap().unwrap();
    assert_eq!(full.version, 2);

    service.remove_by_id(&first.id).await.unwrap();
    let mirror = store.get(LEGACY_SLOTS_KEY).await.unwrap().unwrap();
    let slots: Vec<String> = serde_json::from_str(&mirror.value).unwrap();
    assert_eq!(slots, vec!["2026-02-09-13:30"]);
}

#[tokio::test]
async fn test_concurrent_requests_never_overfill_a_slot() {
    let app = TestApp::new().await;
    let service = app.state.booking_service.clone();

    // Feb 2 has capacity 1 and Avery is the only one covering 09:00.
    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                let request = service.validate(common_request("2026-02-02-09:00", "phone")).unwrap();
                service.book(request).await
            })
        })
        .collect();

    let mut successes = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::NoVolunteerAvailable) | Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(service.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_linked_write_is_all_or_nothing() {
    let app = TestApp::new().await;
    let store = SqliteDocumentStore::new(app.pool.clone());

    let v1 = store.set_linked("main", "a", Expected::Absent, "shadow", "A").await.unwrap();
    assert_eq!(v1, 1);

    let stale = store.set_linked("main", "b", Expected::Absent, "shadow", "B").await;
    assert!(matches!(stale, Err(AppError::StoreConflict)));
    assert_eq!(store.get("main").await.unwrap().unwrap().value, "a");
    assert_eq!(store.get("shadow").await.unwrap().unwrap().value, "A");

    store.set_linked("main", "c", Expected::Version(v1), "shadow", "C").await.unwrap();
    assert_eq!(store.get("shadow").await.unwrap().unwrap().value, "C");
}

#[tokio::test]
async fn test_mirror_follows_the_last_committed_list() {
    let app = TestApp::new().await;
    let store = Arc::new(SqliteDocumentStore::new(app.pool.clone()));
    let repo = DocumentBookingRepo::new(store.clone());
    let service = &app.state.booking_service;

    let a = service.validate(common_request("2026-02-02-09:00", "phone")).unwrap();
    let first = service.book(a).await.unwrap();
    let snapshot = repo.snapshot().await.unwrap();

    let mut moved: Booking = first.clone();
    moved.slot = "2026-02-09-10:00".parse().unwrap();
    repo.commit(&[moved], snapshot.version).await.unwrap();

    // A writer still holding the old version loses and leaves no trace.
    let lost = repo.commit(&[first], snapshot.version).await;
    assert!(matches!(lost, Err(AppError::StoreConflict)));

    let full: Vec<Booking> = serde_json::from_str(&store.get(BOOKINGS_KEY).await.unwrap().unwrap().value).unwrap();
    let mirror: Vec<String> = serde_json::from_str(&store.get(LEGACY_SLOTS_KEY).await.unwrap().unwrap().value).unwrap();
    let expected: Vec<String> = full.iter().map(|b| b.slot.to_string()).collect();
    assert_eq!(mirror, expected);
    assert_eq!(mirror, vec!["2026-02-09-10:00"]);
}

fn common_request(slot: &str, method: &str) -> outreach_booking::domain::services::booking_service::BookingRequest {
    outreach_booking::domain::services::booking_service::BookingRequest {
        slot: slot.to_string(),
        contact_method: Some(method.to_string()),
        name: "Jamie".to_string(),
        contact: if method == "video" { "jamie@example.org".to_string() } else { "555-123-4567".to_string() },
        reminder_email: None,
    }
}
