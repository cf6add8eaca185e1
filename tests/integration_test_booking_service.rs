mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{date, TestApp};
use outreach_booking::{
    domain::models::auth::{Principal, Role},
    domain::models::booking::Booking,
    domain::models::slot::ContactMethod,
    domain::services::booking_service::BookingRequest,
    domain::services::notification_service::{NoticeKind, CONFIRMATION_SUBJECT, REMINDER_SUBJECT},
    error::AppError,
};

fn request(slot: &str, method: Option<&str>, contact: &str) -> BookingRequest {
    BookingRequest {
        slot: slot.to_string(),
        contact_method: method.map(str::to_string),
        name: "Jamie Rivera".to_string(),
        contact: contact.to_string(),
        reminder_email: None,
    }
}

fn phone(slot: &str) -> BookingRequest {
    request(slot, Some("phone"), "(555) 123-4567")
}

async fn book(app: &TestApp, req: BookingRequest) -> Result<Booking, AppError> {
    let service = &app.state.booking_service;
    service.book(service.validate(req)?).await
}

fn actor(id: &str, role: Role) -> Principal {
    Principal { id: id.to_string(), name: id.to_string(), role }
}

#[tokio::test]
async fn test_validation_happens_before_the_store() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    let err = service.validate(phone("2026-02-02-9:00")).unwrap_err();
    assert_eq!(err.reason(), Some("invalid-slot"));

    let err = service.validate(request("2026-02-02-09:00", None, "555 123 4567")).unwrap_err();
    assert_eq!(err.reason(), Some("missing-contact-method"));

    let err = service.validate(request("2026-02-02-09:00", Some("fax"), "555 123 4567")).unwrap_err();
    assert_eq!(err.reason(), Some("missing-contact-method"));

    let err = service.validate(request("2026-02-02-09:00", Some("phone"), "call me")).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = service.validate(request("2026-02-02-09:00", Some("video"), "not-an-email")).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut blank_name = phone("2026-02-02-09:00");
    blank_name.name = "   ".to_string();
    assert!(matches!(service.validate(blank_name), Err(AppError::Validation(_))));

    let ok = service.validate(request("2026-02-02-09:00", Some("discord"), "jamie_r")).unwrap();
    assert_eq!(ok.method, ContactMethod::Chat);

    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_book_remove_and_rebook() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    let first = book(&app, phone("2026-02-02-09:00")).await.unwrap();
    assert_eq!(first.volunteer_id, "vol-a");
    assert_eq!(first.volunteer_name, "Avery");

    let second = book(&app, phone("2026-02-02-09:00")).await;
    assert!(matches!(second, Err(AppError::NoVolunteerAvailable)));

    let removed = service.remove_by_slot("2026-02-02-09:00", None).await.unwrap();
    assert_eq!(removed.id, first.id);

    let again = book(&app, phone("2026-02-02-09:00")).await.unwrap();
    assert_eq!(again.volunteer_id, "vol-a");
    assert_eq!(service.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_by_slot_can_target_a_volunteer() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    book(&app, phone("2026-02-09-10:00")).await.unwrap();
    book(&app, phone("2026-02-09-10:00")).await.unwrap();

    let removed = service.remove_by_slot("2026-02-09-10:00", Some("vol-c")).await.unwrap();
    assert_eq!(removed.volunteer_id, "vol-c");

    let left = service.list().await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].volunteer_id, "vol-b");

    assert!(matches!(
        service.remove_by_slot("2026-02-09-10:00", Some("vol-c")).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(service.remove_by_slot("garbage", None).await, Err(AppError::InvalidSlot(_))));
}

#[tokio::test]
async fn test_clear_date_and_clear_all() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    book(&app, phone("2026-02-02-09:00")).await.unwrap();
    book(&app, phone("2026-02-02-10:00")).await.unwrap();
    book(&app, phone("2026-02-09-10:00")).await.unwrap();

    assert_eq!(service.clear_date(date("2026-02-02")).await.unwrap(), 2);
    assert_eq!(service.clear_date(date("2026-02-02")).await.unwrap(), 0);
    assert_eq!(service.list().await.unwrap().len(), 1);

    assert_eq!(service.clear_all().await.unwrap(), 1);
    assert!(service.list().await.unwrap().is_empty());
    assert_eq!(service.clear_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_manual_booking_paths() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    let validated = service.validate(phone("2026-02-03-08:00")).unwrap();
    assert!(matches!(
        service.add_manual(validated.clone(), None).await,
        Err(AppError::NoVolunteerAvailable)
    ));

    let forced = service.add_manual(validated.clone(), Some("vol-b".to_string())).await.unwrap();
    assert_eq!(forced.volunteer_id, "vol-b");
    assert_eq!(forced.volunteer_name, "Blake");

    assert!(matches!(
        service.add_manual(validated, Some("vol-c".to_string())).await,
        Err(AppError::Conflict(_))
    ));

    let chat = service.validate(request("2026-02-03-09:00", Some("chat"), "jamie_r")).unwrap();
    assert!(matches!(
        service.add_manual(chat, Some("no-such-person".to_string())).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(service.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_replace_all_enforces_invariants() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    let a = book(&app, phone("2026-02-09-10:00")).await.unwrap();
    let mut twin = a.clone();
    twin.id = "copy".to_string();

    assert!(matches!(service.replace_all(vec![a.clone(), twin]).await, Err(AppError::Validation(_))));
    assert_eq!(service.list().await.unwrap().len(), 1);

    let mut moved = a.clone();
    moved.slot = "2026-02-10-11:00".parse().unwrap();
    assert_eq!(service.replace_all(vec![moved]).await.unwrap(), 1);
    assert_eq!(service.list().await.unwrap()[0].slot.to_string(), "2026-02-10-11:00");
}

#[tokio::test]
async fn test_completion_rules() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    let b = book(&app, phone("2026-02-02-09:00")).await.unwrap();

    let err = service.complete(&b.id, &actor("vol-b", Role::Volunteer)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let done = service.complete(&b.id, &actor("vol-a", Role::Volunteer)).await.unwrap();
    assert!(done.completed);
    assert_eq!(done.completed_by.as_deref(), Some("vol-a"));
    let stamped = done.completed_at;

    let again = service.complete(&b.id, &actor("admin", Role::Admin)).await.unwrap();
    assert_eq!(again.completed_at, stamped);
    assert_eq!(again.completed_by.as_deref(), Some("vol-a"));

    assert!(matches!(
        service.complete("nope", &actor("admin", Role::Admin)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_assignments_for_lists_only_own_bookings_in_slot_order() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    // Blake, then Casey (less loaded), then Blake again on the tie.
    book(&app, phone("2026-02-09-15:00")).await.unwrap();
    book(&app, phone("2026-02-02-10:00")).await.unwrap();
    book(&app, phone("2026-02-09-08:00")).await.unwrap();
    book(&app, phone("2026-02-09-12:00")).await.unwrap();

    let mine = service.assignments_for("vol-b").await.unwrap();
    let slots: Vec<String> = mine.iter().map(|b| b.slot.to_string()).collect();
    assert_eq!(slots, vec!["2026-02-09-12:00", "2026-02-09-15:00"]);

    assert_eq!(service.assignments_for("vol-c").await.unwrap().len(), 1);
    assert_eq!(service.assignments_for("vol-a").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reminders_are_sent_once() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;
    let tz = app.state.config.timezone;

    let mut with_email = phone("2026-02-02-09:00");
    with_email.reminder_email = Some("jamie@example.org".to_string());
    let reminded = book(&app, with_email).await.unwrap();
    book(&app, phone("2026-02-02-10:00")).await.unwrap();

    // 09:00 New York is 14:00 UTC.
    let now = Utc.with_ymd_and_hms(2026, 2, 2, 2, 0, 0).unwrap();
    let due = service.due_reminders(now, Duration::hours(24), tz).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, reminded.id);

    let too_early = Utc.with_ymd_and_hms(2026, 1, 30, 12, 0, 0).unwrap();
    assert!(service.due_reminders(too_early, Duration::hours(24), tz).await.unwrap().is_empty());

    assert!(app.state.notification_service.send(&due[0], NoticeKind::Reminder).await.unwrap());
    assert_eq!(service.mark_reminded(&[reminded.id.clone()]).await.unwrap(), 1);
    assert_eq!(service.mark_reminded(&[reminded.id.clone()]).await.unwrap(), 0);

    assert!(service.due_reminders(now, Duration::hours(24), tz).await.unwrap().is_empty());

    let sent = app.email.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "jamie@example.org");
    assert_eq!(sent[0].subject, REMINDER_SUBJECT);
    assert!(sent[0].html_body.contains("Jamie Rivera"));
    assert!(sent[0].attachment_name.is_none());
}

#[tokio::test]
async fn test_confirmation_attaches_invite_and_skips_bookings_without_email() {
    let app = TestApp::new().await;
    let notifications = &app.state.notification_service;

    let video = book(&app, request("2026-02-02-09:00", Some("video"), "jamie@example.org")).await.unwrap();
    assert!(notifications.send(&video, NoticeKind::Confirmation).await.unwrap());

    let phone_only = book(&app, phone("2026-02-09-09:00")).await.unwrap();
    assert!(!notifications.send(&phone_only, NoticeKind::Confirmation).await.unwrap());

    let sent = app.email.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, CONFIRMATION_SUBJECT);
    assert!(sent[0].html_body.contains("Avery"));
    assert_eq!(sent[0].attachment_name.as_deref(), Some("outreach-call.ics"));
}

#[tokio::test]
async fn test_projection_through_the_service() {
    let app = TestApp::new().await;
    let service = &app.state.booking_service;

    book(&app, phone("2026-02-02-09:00")).await.unwrap();

    let days = service.project(None, None).await.unwrap();
    assert_eq!(days.len(), 15);

    let feb2 = days.iter().find(|d| d.date == date("2026-02-02")).unwrap();
    assert_eq!(feb2.capacity, 1);
    let nine = feb2.slots.iter().find(|s| s.time == "09:00").unwrap();
    assert!(!nine.is_available);
    assert_eq!(nine.booked_count, 1);

    let feb9 = days.iter().find(|d| d.date == date("2026-02-09")).unwrap();
    assert_eq!(feb9.capacity, 2);

    assert!(matches!(
        service.project(Some(date("2026-02-10")), Some(date("2026-02-01"))).await,
        Err(AppError::Validation(_))
    ));
}
